pub mod advisory;
pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::PalaverConfig;
pub use error::{PalaverError, Result};
pub use events::SessionEvent;
pub use types::*;
