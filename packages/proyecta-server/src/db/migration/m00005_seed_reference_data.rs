use crate::db::entities::transaction_types::TransactionNature;
use crate::db::entities::{
    project_statuses, roles, task_priorities, task_statuses, transaction_types,
};
use crate::db::reference::{PROJECT_STATUSES, TASK_PRIORITIES, TASK_STATUSES};
use proyecta_core::roles as role_names;
use sea_orm::{ActiveValue::Set, DbErr, DeriveMigrationName, EntityTrait};
use sea_orm_migration::{MigrationTrait, SchemaManager};

const TRANSACTION_TYPES: [(&str, TransactionNature); 4] = [
    ("Donación", TransactionNature::Income),
    ("Financiación de proyecto", TransactionNature::Income),
    ("Pago a proveedor", TransactionNature::Expense),
    ("Gasto operativo", TransactionNature::Expense),
];

#[derive(DeriveMigrationName)]
pub(crate) struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        roles::Entity::insert_many(role_names::ALL.iter().map(|name| roles::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }))
        .exec(db)
        .await?;

        project_statuses::Entity::insert_many(PROJECT_STATUSES.iter().map(|name| {
            project_statuses::ActiveModel {
                name: Set(name.to_string()),
                ..Default::default()
            }
        }))
        .exec(db)
        .await?;

        task_statuses::Entity::insert_many(TASK_STATUSES.iter().map(|name| {
            task_statuses::ActiveModel {
                name: Set(name.to_string()),
                ..Default::default()
            }
        }))
        .exec(db)
        .await?;

        task_priorities::Entity::insert_many(TASK_PRIORITIES.iter().map(|name| {
            task_priorities::ActiveModel {
                name: Set(name.to_string()),
                ..Default::default()
            }
        }))
        .exec(db)
        .await?;

        transaction_types::Entity::insert_many(TRANSACTION_TYPES.iter().map(|(name, nature)| {
            transaction_types::ActiveModel {
                name: Set(name.to_string()),
                nature: Set(*nature),
                ..Default::default()
            }
        }))
        .exec(db)
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        transaction_types::Entity::delete_many().exec(db).await?;
        task_priorities::Entity::delete_many().exec(db).await?;
        task_statuses::Entity::delete_many().exec(db).await?;
        project_statuses::Entity::delete_many().exec(db).await?;
        roles::Entity::delete_many().exec(db).await?;

        Ok(())
    }
}
