pub mod config;
pub mod error;
pub mod event;

pub use config::TaggerConfig;
pub use error::*;
pub use event::*;
