// tangent-api: Async client for the endpoint that writes tuned values back into source files

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::SaveClient;
pub use error::Error;
pub use models::{ErrorBody, SaveRequest};
pub use transport::TransportConfig;
