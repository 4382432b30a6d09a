pub mod client;
pub mod error;

pub use client::ProyectaClient;
pub use error::{SdkError, SdkResult};
pub use proyecta_core::*;
