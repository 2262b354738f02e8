use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::{Arc, Mutex};
use tencentserverless::clients::{CloudApi, Connector};
use tencentserverless::core::config::{
    ENV_RUN_ENV, ENV_SECRET_ID, INTERNAL_ENDPOINT, PUBLIC_ENDPOINT,
};
use tencentserverless::{
    Client, ClientOptions, InvocationType, InvokeRequest, LogType, ResolvedConfig, ScfError,
    scf_call,
};

/// Returns a canned body and records what it was asked to do.
#[derive(Default)]
struct RecordingConnector {
    body: String,
    configs: Mutex<Vec<ResolvedConfig>>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

struct RecordingApi {
    body: String,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

#[async_trait]
impl CloudApi for RecordingApi {
    async fn call(&self, action: &str, params: &Value) -> Result<String, ScfError> {
        self.calls
            .lock()
            .unwrap()
            .push((action.to_string(), params.clone()));
        Ok(self.body.clone())
    }
}

impl Connector for RecordingConnector {
    fn connect(&self, config: &ResolvedConfig) -> Result<Arc<dyn CloudApi>, ScfError> {
        self.configs.lock().unwrap().push(config.clone());
        Ok(Arc::new(RecordingApi {
            body: self.body.clone(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

impl RecordingConnector {
    fn returning(body: Value) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_string(),
            ..Self::default()
        })
    }

    fn params(&self) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, params)| params.clone())
            .collect()
    }
}

fn success_body() -> Value {
    json!({"Response": {"RequestId": "r0", "Result": {"InvokeResult": 0, "RetMsg": {"ok": true}}}})
}

fn client_with(connector: &Arc<RecordingConnector>) -> Client {
    Client::new()
        .region("ap-shanghai")
        .secret_id("AKIDtest")
        .secret_key("secret")
        .with_connector(connector.clone())
}

#[tokio::test]
async fn test_invoke_sends_invoke_action_with_params() {
    let connector = RecordingConnector::returning(success_body());
    let client = client_with(&connector);

    let result = client
        .invoke(
            InvokeRequest::new("hello")
                .namespace("prod")
                .qualifier("3")
                .log_type(LogType::Tail)
                .invocation_type(InvocationType::Event)
                .data(json!({"name": "scf"})),
        )
        .await
        .unwrap();

    assert_eq!(result, json!({"ok": true}));

    let calls = connector.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (action, params) = &calls[0];
    assert_eq!(action, "Invoke");
    assert_eq!(
        params,
        &json!({
            "Namespace": "prod",
            "LogType": "Tail",
            "ClientContext": "{\"name\":\"scf\"}",
            "Qualifier": "3",
            "InvocationType": "Event",
            "FunctionName": "hello",
        })
    );

    let configs = connector.configs.lock().unwrap();
    assert_eq!(configs[0].region, "ap-shanghai");
    assert_eq!(configs[0].credential.secret_id.as_deref(), Some("AKIDtest"));
    assert_eq!(configs[0].profile.req_timeout.as_secs(), 300);
    assert!(configs[0].profile.keep_alive);
}

#[tokio::test]
async fn test_invoke_with_config_uses_given_endpoint() {
    let connector = RecordingConnector::returning(success_body());
    let client = Client::new().with_connector(connector.clone());

    let internal = ClientOptions::default().resolve_with(|key| match key {
        k if k == ENV_RUN_ENV => Some("SCF".to_string()),
        k if k == ENV_SECRET_ID => Some("AKIDenv".to_string()),
        _ => None,
    });
    client
        .invoke_with_config(&internal, InvokeRequest::new("hello"))
        .await
        .unwrap();

    let public = ClientOptions::default().resolve_with(|_| None);
    client
        .invoke_with_config(&public, InvokeRequest::new("hello"))
        .await
        .unwrap();

    let configs = connector.configs.lock().unwrap();
    assert_eq!(configs[0].profile.endpoint, INTERNAL_ENDPOINT);
    assert_eq!(configs[0].credential.secret_id.as_deref(), Some("AKIDenv"));
    assert_eq!(configs[0].region, "ap-guangzhou");
    assert_eq!(configs[1].profile.endpoint, PUBLIC_ENDPOINT);
    assert_eq!(configs[1].credential.secret_id, None);
}

#[tokio::test]
async fn test_remote_api_error() {
    let connector = RecordingConnector::returning(
        json!({"Response": {"Error": {"Code": "X", "Message": "Y"}, "RequestId": "r1"}}),
    );
    let client = client_with(&connector);

    match client.invoke(InvokeRequest::new("hello")).await.unwrap_err() {
        ScfError::RemoteApi {
            code,
            message,
            request_id,
        } => {
            assert_eq!(code, "X");
            assert_eq!(message, "Y");
            assert_eq!(request_id.as_deref(), Some("r1"));
        }
        other => panic!("Expected RemoteApi, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_invoked_function_errors() {
    let handled = RecordingConnector::returning(json!({"Response": {"Result": {
        "InvokeResult": 1,
        "RetMsg": "{\"errorCode\":5,\"errorMessage\":\"boom\"}"
    }}}));
    match client_with(&handled)
        .invoke(InvokeRequest::new("hello"))
        .await
        .unwrap_err()
    {
        ScfError::InvokedFunction {
            code,
            message,
            stack_trace,
            ..
        } => {
            assert_eq!(code, 5);
            assert_eq!(message, "boom");
            assert!(stack_trace.is_empty());
        }
        other => panic!("Expected InvokedFunction, got: {other:?}"),
    }

    let platform = RecordingConnector::returning(
        json!({"Response": {"Result": {"InvokeResult": -1, "RetMsg": "platform failure"}}}),
    );
    match client_with(&platform)
        .invoke(InvokeRequest::new("hello"))
        .await
        .unwrap_err()
    {
        ScfError::InvokedFunction { code, message, .. } => {
            assert_eq!(code, -1);
            assert_eq!(message, "platform failure");
        }
        other => panic!("Expected InvokedFunction, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_invoke_result_is_internal_server_error() {
    let connector = RecordingConnector::returning(json!({"Response": {"Result": {}}}));
    let err = client_with(&connector)
        .invoke(InvokeRequest::new("hello"))
        .await
        .unwrap_err();

    assert!(err.is_internal_server());
    assert_eq!(err.code_string().as_deref(), Some("-1"));
}

#[tokio::test]
async fn test_empty_function_name_never_reaches_the_api() {
    let connector = RecordingConnector::returning(success_body());
    let err = client_with(&connector)
        .invoke(InvokeRequest::new(""))
        .await
        .unwrap_err();

    assert!(matches!(err, ScfError::InvalidRequest(_)));
    assert!(connector.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_call_sugar_matches_explicit_invoke() {
    let connector = RecordingConnector::returning(success_body());
    let client = client_with(&connector);

    let mut kwargs = Map::new();
    kwargs.insert("a".to_string(), json!(1));
    kwargs.insert("qualifier".to_string(), json!("v2"));
    client.call("foo").invoke(kwargs).await.unwrap();

    client
        .invoke(InvokeRequest::new("foo").qualifier("v2").data(json!({"a": 1})))
        .await
        .unwrap();

    scf_call!(client, foo, a = 1, qualifier = "v2").await.unwrap();

    client
        .function("foo")
        .invoke_value(json!({"a": 1, "qualifier": "v2"}))
        .await
        .unwrap();

    let params = connector.params();
    assert_eq!(params.len(), 4);
    assert!(params.iter().all(|p| p == &params[0]));
    assert_eq!(params[0]["FunctionName"], "foo");
    assert_eq!(params[0]["Qualifier"], "v2");
    assert_eq!(params[0]["Namespace"], "default");
    assert_eq!(params[0]["LogType"], "None");
    assert_eq!(params[0]["InvocationType"], "RequestResponse");
    assert_eq!(params[0]["ClientContext"], "{\"a\":1}");
}

#[tokio::test]
async fn test_call_sugar_without_arguments_sends_no_context() {
    let connector = RecordingConnector::returning(success_body());
    let client = client_with(&connector);

    scf_call!(client, ping).await.unwrap();

    let params = connector.params();
    assert_eq!(params[0]["FunctionName"], "ping");
    assert!(params[0].get("ClientContext").is_none());
}

#[tokio::test]
async fn test_invoke_value_rejects_non_object_arguments() {
    let connector = RecordingConnector::returning(success_body());
    let client = client_with(&connector);

    let err = client.call("foo").invoke_value(json!([1, 2])).await.unwrap_err();
    assert!(matches!(err, ScfError::InvalidRequest(_)));
}

#[derive(Debug, Deserialize, PartialEq)]
struct Greeting {
    message: String,
}

#[tokio::test]
async fn test_invoke_json_parses_string_ret_msg() {
    let connector = RecordingConnector::returning(json!({"Response": {"Result": {
        "InvokeResult": 0,
        "RetMsg": "{\"message\":\"hi\"}"
    }}}));
    let greeting: Greeting = client_with(&connector)
        .invoke_json(InvokeRequest::new("hello"))
        .await
        .unwrap();
    assert_eq!(
        greeting,
        Greeting {
            message: "hi".to_string()
        }
    );

    let connector = RecordingConnector::returning(json!({"Response": {"Result": {
        "InvokeResult": 0,
        "RetMsg": "plain text"
    }}}));
    let text: String = client_with(&connector)
        .invoke_json(InvokeRequest::new("hello"))
        .await
        .unwrap();
    assert_eq!(text, "plain text");
}
