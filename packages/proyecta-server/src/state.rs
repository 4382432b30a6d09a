use crate::services::auth::password::PasswordHasher;
use crate::services::auth::session::SessionCodec;
use sea_orm::DatabaseConnection;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) db: DatabaseConnection,
    pub(crate) sessions: SessionCodec,
    pub(crate) passwords: PasswordHasher,
}
