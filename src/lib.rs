// detailed implementation
pub mod config;
pub mod error;
pub mod init;
pub mod networks;
pub mod utils;

pub use config::QNetworkConfig;
pub use error::ModelError;
pub use networks::{Parameter, QNetwork};
