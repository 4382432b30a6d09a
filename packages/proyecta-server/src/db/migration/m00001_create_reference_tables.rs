use crate::db::entities::{
    project_statuses, roles, task_priorities, task_statuses, transaction_types,
};
use sea_orm::sea_query::Table;
use sea_orm::{DbErr, DeriveMigrationName};
use sea_orm_migration::{MigrationTrait, SchemaManager, schema};

#[derive(DeriveMigrationName)]
pub(crate) struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let roles_table = Table::create()
            .table(roles::Entity)
            .if_not_exists()
            .col(schema::pk_auto(roles::Column::Id))
            .col(schema::string_uniq(roles::Column::Name))
            .to_owned();

        let project_statuses_table = Table::create()
            .table(project_statuses::Entity)
            .if_not_exists()
            .col(schema::pk_auto(project_statuses::Column::Id))
            .col(schema::string_uniq(project_statuses::Column::Name))
            .to_owned();

        let task_statuses_table = Table::create()
            .table(task_statuses::Entity)
            .if_not_exists()
            .col(schema::pk_auto(task_statuses::Column::Id))
            .col(schema::string_uniq(task_statuses::Column::Name))
            .to_owned();

        let task_priorities_table = Table::create()
            .table(task_priorities::Entity)
            .if_not_exists()
            .col(schema::pk_auto(task_priorities::Column::Id))
            .col(schema::string_uniq(task_priorities::Column::Name))
            .to_owned();

        // nature 取值为 Ingreso / Gasto
        let transaction_types_table = Table::create()
            .table(transaction_types::Entity)
            .if_not_exists()
            .col(schema::pk_auto(transaction_types::Column::Id))
            .col(schema::string_uniq(transaction_types::Column::Name))
            .col(schema::string_len(transaction_types::Column::Nature, 16))
            .to_owned();

        manager.create_table(roles_table).await?;
        manager.create_table(project_statuses_table).await?;
        manager.create_table(task_statuses_table).await?;
        manager.create_table(task_priorities_table).await?;
        manager.create_table(transaction_types_table).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(transaction_types::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(task_priorities::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(task_statuses::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(project_statuses::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(roles::Entity).to_owned())
            .await
    }
}
