pub mod config;
pub mod error;
pub mod turn;

pub use config::ChatConfig;
pub use error::*;
pub use turn::*;
