//! Client for the ticketing API with transparent, single-flight session renewal.

pub mod api;
mod client;
pub mod config;
pub mod errors;
pub mod request;
pub mod session;
pub mod telemetry;
pub mod transport;
pub mod types;

pub use client::SessionClient;
pub use config::{ClientConfig, ConfigLocation};
pub use errors::Error;
pub use request::{Body, FormPart, RequestDescriptor, Response};
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
mod tests;
