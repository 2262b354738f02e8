//! Configuration and request types shared by the client.

pub mod config;
pub mod models;
