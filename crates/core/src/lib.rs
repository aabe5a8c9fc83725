pub mod config;
pub mod error;

pub use config::{load_dotenv, AwsCredentials, Config, ProvisionParams};
pub use error::*;
