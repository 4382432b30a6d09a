use super::restrict_fk;
use crate::db::entities::{
    asset_maintenances, assets, beneficiaries, campaigns, document_signatures, document_versions,
    documents, files, users,
};
use sea_orm::sea_query::Table;
use sea_orm::{DbErr, DeriveMigrationName};
use sea_orm_migration::{MigrationTrait, SchemaManager, schema};

#[derive(DeriveMigrationName)]
pub(crate) struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let files_table = Table::create()
            .table(files::Entity)
            .if_not_exists()
            .col(schema::pk_auto(files::Column::Id))
            .col(schema::uuid(files::Column::UploadedBy))
            .col(schema::string(files::Column::FileName))
            .col(schema::timestamp_with_time_zone(files::Column::CreatedAt))
            .foreign_key(&mut restrict_fk(
                "fk_files_user",
                files::Entity,
                files::Column::UploadedBy,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        let beneficiaries_table = Table::create()
            .table(beneficiaries::Entity)
            .if_not_exists()
            .col(schema::pk_auto(beneficiaries::Column::Id))
            .col(schema::uuid(beneficiaries::Column::RegisteredBy))
            .col(schema::string(beneficiaries::Column::FullName))
            .col(schema::timestamp_with_time_zone(beneficiaries::Column::CreatedAt))
            .foreign_key(&mut restrict_fk(
                "fk_beneficiaries_user",
                beneficiaries::Entity,
                beneficiaries::Column::RegisteredBy,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        let campaigns_table = Table::create()
            .table(campaigns::Entity)
            .if_not_exists()
            .col(schema::pk_auto(campaigns::Column::Id))
            .col(schema::uuid(campaigns::Column::ResponsibleId))
            .col(schema::string(campaigns::Column::Name))
            .col(schema::timestamp_with_time_zone(campaigns::Column::CreatedAt))
            .foreign_key(&mut restrict_fk(
                "fk_campaigns_user",
                campaigns::Entity,
                campaigns::Column::ResponsibleId,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        let documents_table = Table::create()
            .table(documents::Entity)
            .if_not_exists()
            .col(schema::pk_auto(documents::Column::Id))
            .col(schema::uuid(documents::Column::CreatorId))
            .col(schema::string(documents::Column::Title))
            .col(schema::timestamp_with_time_zone(documents::Column::CreatedAt))
            .foreign_key(&mut restrict_fk(
                "fk_documents_creator",
                documents::Entity,
                documents::Column::CreatorId,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        let document_versions_table = Table::create()
            .table(document_versions::Entity)
            .if_not_exists()
            .col(schema::pk_auto(document_versions::Column::Id))
            .col(schema::integer(document_versions::Column::DocumentId))
            .col(schema::uuid(document_versions::Column::UserId))
            .col(schema::integer(document_versions::Column::Version))
            .col(schema::timestamp_with_time_zone(document_versions::Column::CreatedAt))
            .foreign_key(&mut restrict_fk(
                "fk_document_versions_document",
                document_versions::Entity,
                document_versions::Column::DocumentId,
                documents::Entity,
                documents::Column::Id,
            ))
            .foreign_key(&mut restrict_fk(
                "fk_document_versions_user",
                document_versions::Entity,
                document_versions::Column::UserId,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        let document_signatures_table = Table::create()
            .table(document_signatures::Entity)
            .if_not_exists()
            .col(schema::pk_auto(document_signatures::Column::Id))
            .col(schema::integer(document_signatures::Column::DocumentId))
            .col(schema::uuid(document_signatures::Column::SignerId))
            .col(schema::timestamp_with_time_zone(document_signatures::Column::SignedAt))
            .foreign_key(&mut restrict_fk(
                "fk_document_signatures_document",
                document_signatures::Entity,
                document_signatures::Column::DocumentId,
                documents::Entity,
                documents::Column::Id,
            ))
            .foreign_key(&mut restrict_fk(
                "fk_document_signatures_signer",
                document_signatures::Entity,
                document_signatures::Column::SignerId,
                users::Entity,
                users::Column::Id,
            ))
            .to_owned();

        let assets_table = Table::create()
            .table(assets::Entity)
            .if_not_exists()
            .col(schema::pk_auto(assets::Column::Id))
            .col(schema::string(assets::Column::Name))
            .col(schema::timestamp_with_time_zone(assets::Column::CreatedAt))
            .to_owned();

        let asset_maintenances_table = Table::create()
            .table(asset_maintenances::Entity)
            .if_not_exists()
            .col(schema::pk_auto(asset_maintenances::Column::Id))
            .col(schema::integer(asset_maintenances::Column::AssetId))
            .col(schema::timestamp_with_time_zone(
                asset_maintenances::Column::ScheduledFor,
            ))
            .foreign_key(&mut restrict_fk(
                "fk_asset_maintenances_asset",
                asset_maintenances::Entity,
                asset_maintenances::Column::AssetId,
                assets::Entity,
                assets::Column::Id,
            ))
            .to_owned();

        manager.create_table(files_table).await?;
        manager.create_table(beneficiaries_table).await?;
        manager.create_table(campaigns_table).await?;
        manager.create_table(documents_table).await?;
        manager.create_table(document_versions_table).await?;
        manager.create_table(document_signatures_table).await?;
        manager.create_table(assets_table).await?;
        manager.create_table(asset_maintenances_table).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(asset_maintenances::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(assets::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(document_signatures::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(document_versions::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(documents::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(campaigns::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(beneficiaries::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(files::Entity).to_owned())
            .await
    }
}
