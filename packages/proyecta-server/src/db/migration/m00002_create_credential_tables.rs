use super::restrict_fk;
use crate::db::entities::{audit_events, notifications, roles, user_roles, user_sessions, users};
use sea_orm::sea_query::{Index, Table};
use sea_orm::{DbErr, DeriveMigrationName};
use sea_orm_migration::{MigrationTrait, SchemaManager, schema};

#[derive(DeriveMigrationName)]
pub(crate) struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let users_table = Table::create()
            .table(users::Entity)
            .if_not_exists()
            .col(schema::pk_uuid(users::Column::Id))
            .col(schema::string(users::Column::FullName))
            .col(schema::string_uniq(users::Column::NationalId))
            .col(schema::string_uniq(users::Column::Email))
            .col(schema::string(users::Column::PasswordHash))
            .col(schema::string_len(users::Column::Status, 16))
            .col(schema::timestamp_with_time_zone(users::Column::CreatedAt))
            .to_owned();

        // 一个用户可以持有多个角色
        let user_roles_table = Table::create()
            .table(user_roles::Entity)
            .if_not_exists()
            .col(schema::uuid(user_roles::Column::UserId))
            .col(schema::integer(user_roles::Column::RoleId))
            .col(schema::timestamp_with_time_zone(user_roles::Column::AssignedAt))
            .primary_key(
                Index::create()
                    .col(user_roles::Column::UserId)
                    .col(user_roles::Column::RoleId),
            )
            .foreign_key(&mut restrict_fk(
                "fk_user_roles_user",
                user_roles::Entity,
                user_roles::Column::UserId,
                users::Entity,
                users::Column::Id,
            ))
            .foreign_key(&mut restrict_fk(
                "fk_user_roles_role",
                user_roles::Entity,
                user_roles::Column::RoleId,
                roles::Entity,
                roles::Column::Id,
            ))
            .to_owned();

        let user_sessions_table = Table::create()
            .table(user_sessions::Entity)
            .if_not_exists()
            .col(schema::pk_auto(user_sessions::Column::Id))
            .col(schema::uuid(user_sessions::Column::UserId))
            .col(schema::timestamp_with_time_zone(user_sessions::Column::StartedAt))
            .col(schema::boolean(user_sessions::Column::LoginSuccess))
            .foreign_key(&mut restrict_fk(
                "fk_user_sessions_user",
                user_sessions::Entity,
                user_sessions::Column::UserId,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        let audit_events_table = Table::create()
            .table(audit_events::Entity)
            .if_not_exists()
            .col(schema::pk_auto(audit_events::Column::Id))
            .col(schema::uuid(audit_events::Column::UserId))
            .col(schema::string(audit_events::Column::Action))
            .col(schema::string(audit_events::Column::Target))
            .col(schema::text_null(audit_events::Column::Detail))
            .col(schema::timestamp_with_time_zone(audit_events::Column::CreatedAt))
            .foreign_key(&mut restrict_fk(
                "fk_audit_events_user",
                audit_events::Entity,
                audit_events::Column::UserId,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        let notifications_table = Table::create()
            .table(notifications::Entity)
            .if_not_exists()
            .col(schema::pk_auto(notifications::Column::Id))
            .col(schema::uuid(notifications::Column::RecipientId))
            .col(schema::text(notifications::Column::Message))
            .col(schema::boolean(notifications::Column::Read).default(false))
            .col(schema::timestamp_with_time_zone(notifications::Column::CreatedAt))
            .foreign_key(&mut restrict_fk(
                "fk_notifications_recipient",
                notifications::Entity,
                notifications::Column::RecipientId,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        manager.create_table(users_table).await?;
        manager.create_table(user_roles_table).await?;
        manager.create_table(user_sessions_table).await?;
        manager.create_table(audit_events_table).await?;
        manager.create_table(notifications_table).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(notifications::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(audit_events::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(user_sessions::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(user_roles::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(users::Entity).to_owned())
            .await
    }
}
