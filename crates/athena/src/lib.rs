pub mod config;
pub mod client;
pub mod error;
pub mod result;
pub mod service;
pub mod query_step;

pub use config::AthenaConfig;
pub use client::AthenaClient;
pub use error::AthenaError;
pub use result::{DatabaseMetadata, QueryId, QueryMetadata, QueryRequest};
pub use service::QueryService;
pub use query_step::{QueryStep, QueryStepParams, StepReceipt};
