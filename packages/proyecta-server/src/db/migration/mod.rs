pub(crate) mod m00001_create_reference_tables;
pub(crate) mod m00002_create_credential_tables;
pub(crate) mod m00003_create_project_tables;
pub(crate) mod m00004_create_record_tables;
pub(crate) mod m00005_seed_reference_data;

use sea_orm::sea_query::{ForeignKey, ForeignKeyAction, ForeignKeyCreateStatement, IntoIden};

/// Foreign key that refuses to delete a referenced row while dependents exist.
pub(crate) fn restrict_fk<T, C, R, RC>(
    name: &str,
    table: T,
    column: C,
    ref_table: R,
    ref_column: RC,
) -> ForeignKeyCreateStatement
where
    T: IntoIden + 'static,
    C: IntoIden + 'static,
    R: IntoIden + 'static,
    RC: IntoIden + 'static,
{
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(ref_table, ref_column)
        .on_delete(ForeignKeyAction::Restrict)
        .on_update(ForeignKeyAction::Cascade)
        .to_owned()
}
