use super::restrict_fk;
use crate::db::entities::{
    financial_transactions, project_members, project_statuses, projects, task_assignees,
    task_priorities, task_statuses, tasks, transaction_types, users,
};
use sea_orm::sea_query::{Index, Table};
use sea_orm::{DbErr, DeriveMigrationName};
use sea_orm_migration::{MigrationTrait, SchemaManager, schema};

#[derive(DeriveMigrationName)]
pub(crate) struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let projects_table = Table::create()
            .table(projects::Entity)
            .if_not_exists()
            .col(schema::pk_auto(projects::Column::Id))
            .col(schema::string(projects::Column::Name))
            .col(schema::text_null(projects::Column::Description))
            .col(schema::integer(projects::Column::StatusId))
            .col(schema::uuid(projects::Column::CreatorId))
            .col(schema::timestamp_with_time_zone(projects::Column::PlannedStart))
            .col(schema::timestamp_with_time_zone_null(projects::Column::PlannedEnd))
            .col(schema::timestamp_with_time_zone_null(projects::Column::ActualEnd))
            .col(schema::timestamp_with_time_zone(projects::Column::CreatedAt))
            .foreign_key(&mut restrict_fk(
                "fk_projects_status",
                projects::Entity,
                projects::Column::StatusId,
                project_statuses::Entity,
                project_statuses::Column::Id,
            ))
            .foreign_key(&mut restrict_fk(
                "fk_projects_creator",
                projects::Entity,
                projects::Column::CreatorId,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        let project_members_table = Table::create()
            .table(project_members::Entity)
            .if_not_exists()
            .col(schema::integer(project_members::Column::ProjectId))
            .col(schema::uuid(project_members::Column::UserId))
            .col(schema::timestamp_with_time_zone(project_members::Column::JoinedAt))
            .primary_key(
                Index::create()
                    .col(project_members::Column::ProjectId)
                    .col(project_members::Column::UserId),
            )
            .foreign_key(&mut restrict_fk(
                "fk_project_members_project",
                project_members::Entity,
                project_members::Column::ProjectId,
                projects::Entity,
                projects::Column::Id,
            ))
            .foreign_key(&mut restrict_fk(
                "fk_project_members_user",
                project_members::Entity,
                project_members::Column::UserId,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        let tasks_table = Table::create()
            .table(tasks::Entity)
            .if_not_exists()
            .col(schema::pk_auto(tasks::Column::Id))
            .col(schema::integer(tasks::Column::ProjectId))
            .col(schema::string(tasks::Column::Name))
            .col(schema::integer(tasks::Column::StatusId))
            .col(schema::integer(tasks::Column::PriorityId))
            .col(schema::timestamp_with_time_zone_null(tasks::Column::DueDate))
            .col(schema::timestamp_with_time_zone(tasks::Column::CreatedAt))
            .foreign_key(&mut restrict_fk(
                "fk_tasks_project",
                tasks::Entity,
                tasks::Column::ProjectId,
                projects::Entity,
                projects::Column::Id,
            ))
            .foreign_key(&mut restrict_fk(
                "fk_tasks_status",
                tasks::Entity,
                tasks::Column::StatusId,
                task_statuses::Entity,
                task_statuses::Column::Id,
            ))
            .foreign_key(&mut restrict_fk(
                "fk_tasks_priority",
                tasks::Entity,
                tasks::Column::PriorityId,
                task_priorities::Entity,
                task_priorities::Column::Id,
            ))
            .to_owned();

        let task_assignees_table = Table::create()
            .table(task_assignees::Entity)
            .if_not_exists()
            .col(schema::integer(task_assignees::Column::TaskId))
            .col(schema::uuid(task_assignees::Column::UserId))
            .col(schema::timestamp_with_time_zone(task_assignees::Column::AssignedAt))
            .primary_key(
                Index::create()
                    .col(task_assignees::Column::TaskId)
                    .col(task_assignees::Column::UserId),
            )
            .foreign_key(&mut restrict_fk(
                "fk_task_assignees_task",
                task_assignees::Entity,
                task_assignees::Column::TaskId,
                tasks::Entity,
                tasks::Column::Id,
            ))
            .foreign_key(&mut restrict_fk(
                "fk_task_assignees_user",
                task_assignees::Entity,
                task_assignees::Column::UserId,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        // project_id 为空表示与项目无关的收支
        let financial_transactions_table = Table::create()
            .table(financial_transactions::Entity)
            .if_not_exists()
            .col(schema::pk_auto(financial_transactions::Column::Id))
            .col(schema::integer(financial_transactions::Column::TypeId))
            .col(schema::integer_null(financial_transactions::Column::ProjectId))
            .col(schema::uuid(financial_transactions::Column::RegisteredBy))
            .col(schema::double(financial_transactions::Column::Amount))
            .col(schema::timestamp_with_time_zone(
                financial_transactions::Column::OccurredAt,
            ))
            .col(schema::text_null(financial_transactions::Column::Description))
            .foreign_key(&mut restrict_fk(
                "fk_financial_transactions_type",
                financial_transactions::Entity,
                financial_transactions::Column::TypeId,
                transaction_types::Entity,
                transaction_types::Column::Id,
            ))
            .foreign_key(&mut restrict_fk(
                "fk_financial_transactions_project",
                financial_transactions::Entity,
                financial_transactions::Column::ProjectId,
                projects::Entity,
                projects::Column::Id,
            ))
            .foreign_key(&mut restrict_fk(
                "fk_financial_transactions_user",
                financial_transactions::Entity,
                financial_transactions::Column::RegisteredBy,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        manager.create_table(projects_table).await?;
        manager.create_table(project_members_table).await?;
        manager.create_table(tasks_table).await?;
        manager.create_table(task_assignees_table).await?;
        manager.create_table(financial_transactions_table).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(financial_transactions::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(task_assignees::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(tasks::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(project_members::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(projects::Entity).to_owned())
            .await
    }
}
