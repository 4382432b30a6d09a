//! Session authentication: password checks, signed session tokens and
//! role-based access control.

pub(crate) mod gate;
pub(crate) mod password;
pub(crate) mod session;
pub(crate) mod user;
