pub(crate) mod auth;
pub(crate) mod dashboard;
pub(crate) mod users;
