pub mod config;
pub mod entities;
pub mod error;
pub mod log;
pub mod types;

pub use config::Config;
pub use entities::*;
pub use error::HansardError;
pub use log::*;
pub use types::*;
