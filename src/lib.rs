pub mod api;
pub mod cert;
pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod fields;
pub mod model;
pub mod notify;
pub mod xml;

#[cfg(test)]
mod tests;

pub use api::Outcome;
pub use client::{Envelope, WxPayClient};
pub use config::{ClientConfig, ClientConfigBuilder, ClientIpProvider};
pub use error::WxPayError;
pub use fields::{FieldMap, FieldMapExt, FieldValue};
pub use model::cert::CertPair;
