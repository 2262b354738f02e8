//! tencentserverless - call Tencent Cloud SCF functions as if they were local.
//!
//! Every call becomes one `Invoke` request against the SCF API 3.0. The
//! response envelope is unwrapped into the function's return value, or into
//! an [`ScfError`] telling apart:
//! - the API rejecting the call (`ScfError::RemoteApi`),
//! - the function failing (`ScfError::InvokedFunction`),
//! - an envelope the client does not understand (`ScfError::InternalServer`).
//!
//! Region and credentials come from the client or, when unset, from
//! `TENCENTCLOUD_REGION`, `TENCENTCLOUD_SECRETID`, `TENCENTCLOUD_SECRETKEY`
//! and `TENCENTCLOUD_SESSIONTOKEN`. Inside SCF (`TENCENTCLOUD_RUNENV=SCF`)
//! the internal endpoint is used.
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use tencentserverless::{Client, InvokeRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     tencentserverless::setup_logging();
//!
//!     let client = Client::new().region("ap-guangzhou");
//!
//!     // Explicit request
//!     let result = client
//!         .invoke(InvokeRequest::new("hello").data(json!({"name": "scf"})))
//!         .await?;
//!     println!("{result}");
//!
//!     // Keyword-style call; `qualifier` selects the version
//!     let sum = tencentserverless::scf_call!(client, add, a = 1, b = 2, qualifier = "2").await?;
//!     println!("{sum}");
//!
//!     Ok(())
//! }
//! ```

pub mod clients;
pub mod core;
pub mod errors;
pub mod response;
pub mod scf;

pub use crate::core::config::{ClientOptions, Credential, Endpoint, HttpProfile, ResolvedConfig};
pub use crate::core::models::{InvocationType, InvokeRequest, LogType};
pub use errors::ScfError;
pub use scf::{Client, FunctionHandle, invoke};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

/// Configure structured logging with JSON output.
///
/// Installs a tracing-subscriber JSON formatter; call it once at startup.
/// Calling it again is a no-op.
///
/// # Example
///
/// ```
/// tencentserverless::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}
