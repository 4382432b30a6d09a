use crate::db::migration::{
    m00001_create_reference_tables, m00002_create_credential_tables, m00003_create_project_tables,
    m00004_create_record_tables, m00005_seed_reference_data,
};
use sea_orm::{DbConn, DbErr};
use sea_orm_migration::{MigrationTrait, MigratorTrait};
use tracing::info;

/// Brings the schema up to date and seeds reference data on first run.
pub(crate) async fn initial(db_cnn: &DbConn) -> Result<(), DbErr> {
    Migrator::up(db_cnn, None).await?;
    info!("database migrations applied");
    Ok(())
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m00001_create_reference_tables::Migration),
            Box::new(m00002_create_credential_tables::Migration),
            Box::new(m00003_create_project_tables::Migration),
            Box::new(m00004_create_record_tables::Migration),
            Box::new(m00005_seed_reference_data::Migration),
        ]
    }
}
