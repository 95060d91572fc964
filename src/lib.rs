pub mod assistant;
pub mod config;
pub mod error;
pub mod image;
pub mod llm;
pub mod server;
pub mod session;

pub use error::{Error, Result};
