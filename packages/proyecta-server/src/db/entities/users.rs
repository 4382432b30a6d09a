use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    #[sea_orm(unique)]
    pub national_id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub status: UserStatus,
    pub created_at: DateTimeUtc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserStatus {
    #[sea_orm(string_value = "Activo")]
    Active,
    #[sea_orm(string_value = "Inactivo")]
    Inactive,
}

impl UserStatus {
    /// Parses the wire value, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case(proyecta_core::status::ACTIVE) {
            Some(Self::Active)
        } else if value.eq_ignore_ascii_case(proyecta_core::status::INACTIVE) {
            Some(Self::Inactive)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => proyecta_core::status::ACTIVE,
            Self::Inactive => proyecta_core::status::INACTIVE,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
