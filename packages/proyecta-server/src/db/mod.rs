pub(crate) mod entities;
pub(crate) mod initialize;
mod migration;
pub(crate) mod reference;
pub(crate) mod user_ops;
