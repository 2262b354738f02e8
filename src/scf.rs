//! SCF invocation client
//!
//! [`Client`] turns a function name plus JSON arguments into one `Invoke`
//! call and maps the response envelope to a value or an [`ScfError`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::clients::{Connector, HttpConnector};
use crate::core::config::{ClientOptions, ResolvedConfig};
use crate::core::models::{DEFAULT_NAMESPACE, DEFAULT_QUALIFIER, InvokeRequest};
use crate::errors::ScfError;
use crate::response::interpret_response;

pub const INVOKE_ACTION: &str = "Invoke";

/// Keyword arguments that steer the invocation instead of being sent as data.
const KEY_LOG_TYPE: &str = "log_type";
const KEY_INVOCATION_TYPE: &str = "invocation_type";
const KEY_QUALIFIER: &str = "qualifier";
const KEY_NAMESPACE: &str = "namespace";

/// Client for invoking SCF functions.
///
/// Region and credentials left unset here are read from the environment on
/// every call, so a single client follows environment changes and can be
/// shared between tasks.
#[derive(Clone)]
pub struct Client {
    options: ClientOptions,
    connector: Arc<dyn Connector>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("region", &self.options.region)
            .field("secret_id", &self.options.secret_id)
            .finish_non_exhaustive()
    }
}

impl Client {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ClientOptions::default())
    }

    #[must_use]
    pub fn with_options(options: ClientOptions) -> Self {
        Self {
            options,
            connector: Arc::new(HttpConnector),
        }
    }

    /// Replace the transport, e.g. with a recording fake in tests.
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.options = self.options.region(region);
        self
    }

    #[must_use]
    pub fn secret_id(mut self, secret_id: impl Into<String>) -> Self {
        self.options = self.options.secret_id(secret_id);
        self
    }

    #[must_use]
    pub fn secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.options = self.options.secret_key(secret_key);
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.options = self.options.token(token);
        self
    }

    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Region, credentials and endpoint as the next call would use them.
    #[must_use]
    pub fn resolve_config(&self) -> ResolvedConfig {
        self.options.resolve()
    }

    /// Invoke a function and return its `RetMsg`.
    ///
    /// # Errors
    ///
    /// - `ScfError::InvalidRequest` if the request is malformed.
    /// - `ScfError::RemoteApi` if the cloud API rejects the call.
    /// - `ScfError::InvokedFunction` if the function itself fails.
    /// - `ScfError::InternalServer` if the response cannot be understood.
    /// - `ScfError::HttpError` if the request cannot be delivered.
    pub async fn invoke(&self, request: InvokeRequest) -> Result<Value, ScfError> {
        self.invoke_with_config(&self.resolve_config(), request).await
    }

    /// Invoke using an already resolved configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Client::invoke`].
    pub async fn invoke_with_config(
        &self,
        config: &ResolvedConfig,
        request: InvokeRequest,
    ) -> Result<Value, ScfError> {
        let params = serde_json::to_value(request.to_action_params()?)?;

        debug!(
            function = %request.function_name,
            namespace = %request.namespace,
            qualifier = %request.qualifier,
            region = %config.region,
            endpoint = %config.profile.endpoint,
            "Invoking SCF function"
        );

        #[cfg(feature = "debug-logs")]
        debug!("Invoke params: {}", params);

        let api = self.connector.connect(config)?;
        let raw = api.call(INVOKE_ACTION, &params).await?;
        let result = interpret_response(&raw)?;

        info!(function = %request.function_name, "SCF function returned");
        Ok(result)
    }

    /// Invoke a function and deserialize its result.
    ///
    /// SCF returns function results as JSON text, so a string `RetMsg` is
    /// parsed before deserializing; if it is not JSON, the string itself is
    /// used.
    ///
    /// # Errors
    ///
    /// Same as [`Client::invoke`], plus `ScfError::SerializationError` if the
    /// result does not fit `T`.
    pub async fn invoke_json<T: DeserializeOwned>(
        &self,
        request: InvokeRequest,
    ) -> Result<T, ScfError> {
        let ret_msg = self.invoke(request).await?;
        let value = match ret_msg {
            Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
            other => other,
        };
        Ok(serde_json::from_value(value)?)
    }

    /// Address a remote function by name.
    #[must_use]
    pub fn call(&self, function_name: impl Into<String>) -> FunctionHandle<'_> {
        FunctionHandle {
            client: self,
            function_name: function_name.into(),
        }
    }

    /// Alias of [`Client::call`].
    #[must_use]
    pub fn function(&self, function_name: impl Into<String>) -> FunctionHandle<'_> {
        self.call(function_name)
    }
}

/// A remote function bound to a client, invoked with keyword arguments.
#[derive(Debug, Clone)]
pub struct FunctionHandle<'a> {
    client: &'a Client,
    function_name: String,
}

impl FunctionHandle<'_> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.function_name
    }

    /// Build the request for `kwargs`.
    ///
    /// `log_type`, `invocation_type`, `qualifier` and `namespace` are taken
    /// out of the map and applied to the request; whatever remains is sent
    /// as the function's data.
    ///
    /// # Errors
    ///
    /// Returns `ScfError::InvalidRequest` if a control value is not a string
    /// or names an unknown option.
    pub fn request(&self, mut kwargs: Map<String, Value>) -> Result<InvokeRequest, ScfError> {
        let mut request = InvokeRequest::new(self.function_name.clone())
            .namespace(DEFAULT_NAMESPACE)
            .qualifier(DEFAULT_QUALIFIER);

        if let Some(log_type) = take_str(&mut kwargs, KEY_LOG_TYPE)? {
            request = request.log_type(log_type.parse()?);
        }
        if let Some(invocation_type) = take_str(&mut kwargs, KEY_INVOCATION_TYPE)? {
            request = request.invocation_type(invocation_type.parse()?);
        }
        if let Some(qualifier) = take_str(&mut kwargs, KEY_QUALIFIER)? {
            request = request.qualifier(qualifier);
        }
        if let Some(namespace) = take_str(&mut kwargs, KEY_NAMESPACE)? {
            request = request.namespace(namespace);
        }

        Ok(request.data(Value::Object(kwargs)))
    }

    /// Invoke with keyword arguments.
    ///
    /// # Errors
    ///
    /// See [`FunctionHandle::request`] and [`Client::invoke`].
    pub async fn invoke(&self, kwargs: Map<String, Value>) -> Result<Value, ScfError> {
        let request = self.request(kwargs)?;
        self.client.invoke(request).await
    }

    /// Invoke with a JSON object of keyword arguments.
    ///
    /// # Errors
    ///
    /// Returns `ScfError::InvalidRequest` if `kwargs` is neither an object nor
    /// null, otherwise as [`FunctionHandle::invoke`].
    pub async fn invoke_value(&self, kwargs: Value) -> Result<Value, ScfError> {
        match kwargs {
            Value::Object(map) => self.invoke(map).await,
            Value::Null => self.invoke(Map::new()).await,
            other => Err(ScfError::InvalidRequest(format!(
                "keyword arguments must be a JSON object, got {other}"
            ))),
        }
    }
}

fn take_str(kwargs: &mut Map<String, Value>, key: &str) -> Result<Option<String>, ScfError> {
    match kwargs.remove(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(ScfError::InvalidRequest(format!(
            "{key} must be a string, got {other}"
        ))),
    }
}

/// Invoke a function once with a throwaway client.
///
/// # Errors
///
/// Same as [`Client::invoke`].
pub async fn invoke(options: ClientOptions, request: InvokeRequest) -> Result<Value, ScfError> {
    Client::with_options(options).invoke(request).await
}

/// Call a remote function with keyword-style arguments.
///
/// ```no_run
/// # async fn run() -> Result<(), tencentserverless::ScfError> {
/// let client = tencentserverless::Client::new();
/// let _sum = tencentserverless::scf_call!(client, add, a = 1, b = 2, qualifier = "v2").await?;
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! scf_call {
    ($client:expr, $function:ident $(, $key:ident = $value:expr)* $(,)?) => {{
        let client = &$client;
        #[allow(unused_mut)]
        let mut kwargs = $crate::__private::serde_json::Map::new();
        $(
            kwargs.insert(
                ::std::string::String::from(stringify!($key)),
                $crate::__private::serde_json::json!($value),
            );
        )*
        async move { client.call(stringify!($function)).invoke(kwargs).await }
    }};
}
