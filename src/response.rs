//! Interpretation of the `Invoke` response envelope.
//!
//! The envelope is `{"Response": {...}}` holding either an `Error` object or
//! a `Result` object with `InvokeResult` and `RetMsg`.

use serde_json::Value;
use tracing::warn;

use crate::errors::{INTERNAL_ERROR_CODE, ScfError};

const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal server error";

/// Outcome codes reported in `InvokeResult`.
const INVOKE_HANDLED_EXCEPTION: i64 = 1;
const INVOKE_PLATFORM_FAILURE: i64 = -1;

/// Turn a raw `Invoke` response body into the function's return value.
///
/// # Errors
///
/// - `ScfError::RemoteApi` when the envelope carries an `Error` object.
/// - `ScfError::InvokedFunction` when the function raised or the platform
///   failed to run it.
/// - `ScfError::InternalServer` when the envelope is not understood.
pub fn interpret_response(raw: &str) -> Result<Value, ScfError> {
    let envelope: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Invoke response is not valid JSON: {}", e);
            return Err(internal_error(None, Value::String(raw.to_string())));
        }
    };

    let Some(response) = envelope.get("Response") else {
        return Err(internal_error(None, envelope));
    };
    let request_id = response
        .get("RequestId")
        .and_then(Value::as_str)
        .map(str::to_string);

    if let Some(error) = response.get("Error") {
        let code = error
            .get("Code")
            .map(text_of)
            .unwrap_or_default();
        let message = error
            .get("Message")
            .map(text_of)
            .unwrap_or_default();
        warn!(code = %code, request_id = ?request_id, "Tencent Cloud API rejected Invoke");
        return Err(ScfError::RemoteApi {
            code,
            message,
            request_id,
        });
    }

    let Some(invoke_result) = response
        .get("Result")
        .and_then(|result| result.get("InvokeResult"))
    else {
        warn!(request_id = ?request_id, "Invoke result is missing InvokeResult");
        return Err(internal_error(request_id, envelope));
    };

    let ret_msg = response["Result"].get("RetMsg").cloned().unwrap_or(Value::Null);

    match outcome_code(invoke_result) {
        Some(INVOKE_HANDLED_EXCEPTION) => {
            let err = handled_exception(&ret_msg, request_id, envelope.clone());
            warn!("Invoked function raised: {}", err);
            Err(err)
        }
        Some(INVOKE_PLATFORM_FAILURE) => {
            warn!(request_id = ?request_id, "Platform failed to run the function");
            Err(ScfError::InvokedFunction {
                code: INTERNAL_ERROR_CODE,
                message: text_of(&ret_msg),
                stack_trace: String::new(),
                request_id,
                response: envelope,
            })
        }
        _ => Ok(ret_msg),
    }
}

fn internal_error(request_id: Option<String>, response: Value) -> ScfError {
    ScfError::InternalServer {
        code: INTERNAL_ERROR_CODE,
        message: INTERNAL_SERVER_ERROR_MESSAGE.to_string(),
        request_id,
        response,
    }
}

// `RetMsg` holds the exception as JSON text:
// {"errorCode": .., "errorMessage": .., "stackTrace": ..}
fn handled_exception(ret_msg: &Value, request_id: Option<String>, response: Value) -> ScfError {
    let details = match ret_msg {
        Value::String(text) => serde_json::from_str::<Value>(text).ok(),
        Value::Object(_) => Some(ret_msg.clone()),
        _ => None,
    };

    let Some(details) = details.filter(Value::is_object) else {
        return ScfError::InvokedFunction {
            code: INTERNAL_ERROR_CODE,
            message: text_of(ret_msg),
            stack_trace: String::new(),
            request_id,
            response,
        };
    };

    ScfError::InvokedFunction {
        code: details
            .get("errorCode")
            .and_then(code_of)
            .unwrap_or(INTERNAL_ERROR_CODE),
        message: details.get("errorMessage").map(text_of).unwrap_or_default(),
        stack_trace: details.get("stackTrace").map(text_of).unwrap_or_default(),
        request_id,
        response,
    }
}

// `1.0` and `1` are the same outcome.
fn outcome_code(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

fn code_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
