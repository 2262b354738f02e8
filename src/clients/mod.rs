//! Client modules for the Tencent Cloud API

pub mod api_client;
pub mod signature;

pub use api_client::{CloudApi, Connector, HttpConnector, ScfApiClient};
