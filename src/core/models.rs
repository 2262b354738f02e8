use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::errors::ScfError;

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_QUALIFIER: &str = "$LATEST";

/// Whether the invocation log tail is returned with the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogType {
    #[default]
    None,
    Tail,
}

impl LogType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogType::None => "None",
            LogType::Tail => "Tail",
        }
    }
}

impl FromStr for LogType {
    type Err = ScfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(LogType::None),
            "Tail" => Ok(LogType::Tail),
            other => Err(ScfError::InvalidRequest(format!(
                "unknown log_type '{other}', expected 'None' or 'Tail'"
            ))),
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous (`RequestResponse`) or fire-and-forget (`Event`) invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationType {
    #[default]
    RequestResponse,
    Event,
}

impl InvocationType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InvocationType::RequestResponse => "RequestResponse",
            InvocationType::Event => "Event",
        }
    }
}

impl FromStr for InvocationType {
    type Err = ScfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RequestResponse" => Ok(InvocationType::RequestResponse),
            "Event" => Ok(InvocationType::Event),
            other => Err(ScfError::InvalidRequest(format!(
                "unknown invocation_type '{other}', expected 'RequestResponse' or 'Event'"
            ))),
        }
    }
}

impl fmt::Display for InvocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single function invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRequest {
    pub function_name: String,
    pub namespace: String,
    pub log_type: LogType,
    pub qualifier: String,
    pub invocation_type: InvocationType,
    /// Passed to the function as its client context.
    pub data: Option<Value>,
}

impl InvokeRequest {
    #[must_use]
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            log_type: LogType::default(),
            qualifier: DEFAULT_QUALIFIER.to_string(),
            invocation_type: InvocationType::default(),
            data: None,
        }
    }

    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn log_type(mut self, log_type: LogType) -> Self {
        self.log_type = log_type;
        self
    }

    #[must_use]
    pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = qualifier.into();
        self
    }

    #[must_use]
    pub fn invocation_type(mut self, invocation_type: InvocationType) -> Self {
        self.invocation_type = invocation_type;
        self
    }

    #[must_use]
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Build the parameters of the `Invoke` action.
    ///
    /// # Errors
    ///
    /// Returns `ScfError::InvalidRequest` if the function name is empty.
    pub fn to_action_params(&self) -> Result<InvokeParams, ScfError> {
        if self.function_name.trim().is_empty() {
            return Err(ScfError::InvalidRequest(
                "function_name must not be empty".to_string(),
            ));
        }

        Ok(InvokeParams {
            namespace: self.namespace.clone(),
            log_type: self.log_type,
            client_context: self.client_context()?,
            qualifier: self.qualifier.clone(),
            invocation_type: self.invocation_type,
            function_name: self.function_name.clone(),
        })
    }

    // Null and `{}` carry nothing, so no context is sent for them.
    fn client_context(&self) -> Result<Option<String>, ScfError> {
        match &self.data {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) if map.is_empty() => Ok(None),
            Some(data) => Ok(Some(serde_json::to_string(data)?)),
        }
    }
}

/// Wire form of the `Invoke` action parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeParams {
    pub namespace: String,
    pub log_type: LogType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_context: Option<String>,
    pub qualifier: String,
    pub invocation_type: InvocationType,
    pub function_name: String,
}
