pub mod demo;
pub mod error;
pub mod ga;
pub mod handlers;
pub mod models;

pub use error::GaError;
