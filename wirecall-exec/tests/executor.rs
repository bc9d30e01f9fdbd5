use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use url::Url;
use wirecall_core::validate::BucketNameValidator;
use wirecall_core::{
    BindError, Binder, Binding, CallArgs, Endpoint, Headers, JsonCodec, Method, Payload, Request,
    Response,
};
use wirecall_exec::classify::ErrorBody;
use wirecall_exec::filter::FilterError;
use wirecall_exec::retry::RetryConfig;
use wirecall_exec::transform::{JsonTransform, ReturnVoid};
use wirecall_exec::{
    BackoffRetry, ClassifierTable, CommandExecutor, ExecError, ExecutorConfig, NoRetry, Operation,
    OperationDescriptor, PoolConfig, RequestFilter, RestClient, Sentinel, Transport,
    TransportError, WorkerPool,
};

struct ScriptedTransport {
    script: Mutex<VecDeque<Result<Response, TransportError>>>,
    seen: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<Response, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<Request> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: Request,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<Response, TransportError> {
        self.seen.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("script exhausted".to_string())))
    }
}

struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn send(
        &self,
        _request: Request,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<Response, TransportError> {
        std::future::pending().await
    }
}

/// Stamps each attempt with a counter so re-filtering is observable.
#[derive(Debug, Default)]
struct AttemptStamp(AtomicUsize);

impl RequestFilter for AttemptStamp {
    fn filter(&self, mut request: Request) -> Result<Request, FilterError> {
        let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        request.headers_mut().append("X-Attempt", n.to_string());
        Ok(request)
    }
}

#[derive(Debug)]
struct Rejecting;

impl RequestFilter for Rejecting {
    fn filter(&self, _request: Request) -> Result<Request, FilterError> {
        Err(FilterError::new("rejecting", "no credentials"))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn resp(status: u16, body: &str) -> Result<Response, TransportError> {
    Ok(Response::new(status, Headers::new(), body.as_bytes().to_vec()))
}

fn redirect(status: u16, location: &str) -> Result<Response, TransportError> {
    let headers: Headers = [("Location", location)].into_iter().collect();
    Ok(Response::new(status, headers, Vec::new()))
}

fn executor(transport: Arc<dyn Transport>) -> CommandExecutor {
    let pool = WorkerPool::current(&PoolConfig::default()).unwrap();
    CommandExecutor::new(transport, pool, ExecutorConfig::default())
}

fn client(transport: Arc<dyn Transport>) -> RestClient {
    let binder = Binder::new(
        Endpoint::parse("https://servers.api.example.com/v1.0/10001786").unwrap(),
        Arc::new(JsonCodec),
    );
    RestClient::new(binder, executor(transport))
}

fn fast_retry(max_attempts: u32) -> BackoffRetry {
    BackoffRetry::new(RetryConfig {
        max_attempts,
        base_delay: Duration::ZERO,
        ..RetryConfig::default()
    })
}

fn get(url: &str) -> Request {
    Request::new(Method::Get, Url::parse(url).unwrap())
}

fn list_servers() -> OperationDescriptor {
    OperationDescriptor::builder("ListServers", Method::Get, "/servers")
        .retry(fast_retry(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn success_is_decoded_by_transform() {
    let transport = ScriptedTransport::new(vec![resp(200, r#"{"servers":[]}"#)]);
    let client = client(transport.clone());
    let op = Operation::new(Arc::new(list_servers()), JsonTransform::<serde_json::Value>::new());

    let value = client.submit(&op, &CallArgs::new()).unwrap().await.unwrap();
    assert_eq!(value, json!({"servers": []}));

    let seen = transport.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].request_line(),
        "GET https://servers.api.example.com/v1.0/10001786/servers HTTP/1.1"
    );
}

#[tokio::test]
async fn not_found_maps_to_void_success() {
    let transport = ScriptedTransport::new(vec![resp(404, "")]);
    let client = client(transport.clone());
    let desc = OperationDescriptor::builder("DeleteServer", Method::Delete, "/servers/{id}")
        .bind(Binding::path(0, "id"))
        .classifier(ClassifierTable::new().not_found_as(Sentinel::Void))
        .build()
        .unwrap();
    let op = Operation::new(Arc::new(desc), ReturnVoid);

    let handle = client.submit(&op, &CallArgs::new().arg(7)).unwrap();
    handle.await.unwrap();
    assert_eq!(
        transport.seen()[0].request_line(),
        "DELETE https://servers.api.example.com/v1.0/10001786/servers/7 HTTP/1.1"
    );
}

#[tokio::test]
async fn not_found_null_for_optional_lookup() {
    let transport = ScriptedTransport::new(vec![resp(404, "")]);
    let client = client(transport);
    let desc = OperationDescriptor::builder("GetServer", Method::Get, "/servers/{id}")
        .bind(Binding::path(0, "id"))
        .classifier(ClassifierTable::new().not_found_as(Sentinel::Null))
        .build()
        .unwrap();
    let op: Operation<Option<serde_json::Value>> =
        Operation::new(Arc::new(desc), JsonTransform::new());

    let found = client.submit(&op, &CallArgs::new().arg(7)).unwrap().await.unwrap();
    assert_eq!(found, None);
}

#[tokio::test]
async fn sentinel_without_mapping_keeps_protocol_error() {
    let transport = ScriptedTransport::new(vec![resp(404, r#"{"message":"no such server"}"#)]);
    let client = client(transport);
    let desc = OperationDescriptor::builder("GetName", Method::Get, "/servers/{id}/name")
        .bind(Binding::path(0, "id"))
        .classifier(ClassifierTable::new().not_found_as(Sentinel::Null))
        .build()
        .unwrap();
    let op: Operation<String> = Operation::new(Arc::new(desc), JsonTransform::new());

    let err = client.submit(&op, &CallArgs::new().arg(7)).unwrap().await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn terminal_status_carries_parsed_error_body() {
    let transport = ScriptedTransport::new(vec![resp(
        400,
        r#"{"badRequest":{"code":400},"message":"invalid flavor"}"#,
    )]);
    let client = client(transport.clone());
    let op = Operation::new(Arc::new(list_servers()), ReturnVoid);

    let err = client.submit(&op, &CallArgs::new()).unwrap().await.unwrap_err();
    match err {
        ExecError::Protocol(p) => {
            assert_eq!(p.status, 400);
            assert_eq!(p.attempts, 1);
            assert!(!p.retryable);
            assert_eq!(p.operation.as_str(), "ListServers");
            match p.body {
                Some(ErrorBody::Json(ref v)) => assert_eq!(v["badRequest"]["code"], 400),
                ref other => panic!("expected json body, got {other:?}"),
            }
            assert!(p.to_string().contains("invalid flavor"));
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
    assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn retryable_statuses_are_resent_until_success() {
    let transport = ScriptedTransport::new(vec![
        resp(503, "busy"),
        resp(429, "slow down"),
        resp(200, r#"{"ok":true}"#),
    ]);
    let op = Operation::new(Arc::new(list_servers()), JsonTransform::<serde_json::Value>::new());
    let exec = executor(transport.clone());

    let value = exec
        .execute(get("https://api.example.com/servers"), &op)
        .await
        .unwrap();
    assert_eq!(value, json!({"ok": true}));
    assert_eq!(transport.seen().len(), 3);
}

#[tokio::test]
async fn retries_stop_at_max_attempts() {
    init_tracing();
    let transport = ScriptedTransport::new((0..10).map(|_| resp(503, "busy")).collect());
    let desc = OperationDescriptor::builder("ListServers", Method::Get, "/servers")
        .retry(fast_retry(3))
        .build()
        .unwrap();
    let op = Operation::new(Arc::new(desc), ReturnVoid);

    let err = executor(transport.clone())
        .execute(get("https://api.example.com/servers"), &op)
        .await
        .unwrap_err();
    match err {
        ExecError::Protocol(p) => {
            assert_eq!(p.status, 503);
            assert_eq!(p.attempts, 3);
            assert!(p.retryable);
        }
        other => panic!("expected protocol error, got {other:?}"),
    }
    assert_eq!(transport.seen().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn retry_after_header_delays_the_resend() {
    let headers: Headers = [("Retry-After", "2")].into_iter().collect();
    let transport = ScriptedTransport::new(vec![
        Ok(Response::new(429, headers, Vec::new())),
        resp(204, ""),
    ]);
    let op = Operation::new(Arc::new(list_servers()), ReturnVoid);

    let start = tokio::time::Instant::now();
    executor(transport.clone())
        .execute(get("https://api.example.com/servers"), &op)
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert_eq!(transport.seen().len(), 2);
}

#[tokio::test]
async fn transport_errors_are_not_retried_by_default() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::Connect("connection refused".to_string())),
        resp(200, ""),
    ]);
    let op = Operation::new(Arc::new(list_servers()), ReturnVoid);

    let err = executor(transport.clone())
        .execute(get("https://api.example.com/servers"), &op)
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert_eq!(
        err,
        ExecError::Transport(TransportError::Connect("connection refused".to_string()))
    );
    assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn transport_errors_retried_when_policy_opts_in() {
    let transport = ScriptedTransport::new(vec![Err(TransportError::Timeout), resp(200, "")]);
    let desc = OperationDescriptor::builder("ListServers", Method::Get, "/servers")
        .retry(BackoffRetry::new(RetryConfig {
            base_delay: Duration::ZERO,
            retry_transport_errors: true,
            ..RetryConfig::default()
        }))
        .build()
        .unwrap();
    let op = Operation::new(Arc::new(desc), ReturnVoid);

    executor(transport.clone())
        .execute(get("https://api.example.com/servers"), &op)
        .await
        .unwrap();
    assert_eq!(transport.seen().len(), 2);
}

#[tokio::test]
async fn redirect_rewrites_target_from_relative_location() {
    init_tracing();
    let transport = ScriptedTransport::new(vec![redirect(302, "/v2/servers?page=2"), resp(200, "")]);
    let op = Operation::new(Arc::new(list_servers()), ReturnVoid);

    executor(transport.clone())
        .execute(get("https://api.example.com/v1/servers"), &op)
        .await
        .unwrap();
    let seen = transport.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(
        seen[1].request_line(),
        "GET https://api.example.com/v2/servers?page=2 HTTP/1.1"
    );
}

#[tokio::test]
async fn see_other_switches_to_get_without_payload() {
    let transport = ScriptedTransport::new(vec![
        redirect(303, "https://status.example.com/jobs/1"),
        resp(200, ""),
    ]);
    let op = Operation::new(Arc::new(list_servers()), ReturnVoid);
    let mut req = Request::new(Method::Post, Url::parse("https://api.example.com/jobs").unwrap());
    req.set_payload(Payload::new(b"{}".to_vec(), "application/json"));

    executor(transport.clone()).execute(req, &op).await.unwrap();
    let seen = transport.seen();
    assert_eq!(seen[1].request_line(), "GET https://status.example.com/jobs/1 HTTP/1.1");
    assert!(seen[1].payload().is_none());
    assert!(seen[1].headers().get("Content-Length").is_none());
}

#[tokio::test]
async fn redirect_loop_is_bounded() {
    let transport =
        ScriptedTransport::new((0..10).map(|_| redirect(301, "/elsewhere")).collect());
    let desc = OperationDescriptor::builder("ListServers", Method::Get, "/servers")
        .retry(BackoffRetry::new(RetryConfig {
            max_redirects: 2,
            ..RetryConfig::default()
        }))
        .build()
        .unwrap();
    let op = Operation::new(Arc::new(desc), ReturnVoid);

    let err = executor(transport.clone())
        .execute(get("https://api.example.com/servers"), &op)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(301));
    assert_eq!(transport.seen().len(), 3);
}

#[tokio::test]
async fn no_retry_policy_fails_first_retryable_response() {
    let transport = ScriptedTransport::new(vec![resp(503, ""), resp(200, "")]);
    let desc = OperationDescriptor::builder("CreateServer", Method::Post, "/servers")
        .retry(NoRetry)
        .build()
        .unwrap();
    let op = Operation::new(Arc::new(desc), ReturnVoid);

    let err = executor(transport.clone())
        .execute(get("https://api.example.com/servers"), &op)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(transport.seen().len(), 1);
}

#[tokio::test]
async fn filters_run_on_every_attempt_against_the_unfiltered_request() {
    let transport = ScriptedTransport::new(vec![resp(503, ""), resp(200, "")]);
    let desc = OperationDescriptor::builder("ListServers", Method::Get, "/servers")
        .filter(AttemptStamp::default())
        .retry(fast_retry(5))
        .build()
        .unwrap();
    let op = Operation::new(Arc::new(desc), ReturnVoid);

    executor(transport.clone())
        .execute(get("https://api.example.com/servers"), &op)
        .await
        .unwrap();
    let seen = transport.seen();
    assert_eq!(seen[0].headers().get_all("X-Attempt").collect::<Vec<_>>(), vec!["1"]);
    assert_eq!(seen[1].headers().get_all("X-Attempt").collect::<Vec<_>>(), vec!["2"]);
}

#[tokio::test]
async fn filter_failure_is_terminal_and_nothing_is_sent() {
    let transport = ScriptedTransport::new(vec![resp(200, "")]);
    let desc = OperationDescriptor::builder("ListServers", Method::Get, "/servers")
        .filter(Rejecting)
        .build()
        .unwrap();
    let op = Operation::new(Arc::new(desc), ReturnVoid);

    let err = executor(transport.clone())
        .execute(get("https://api.example.com/servers"), &op)
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Filter(ref f) if f.filter == "rejecting"));
    assert!(transport.seen().is_empty());
}

#[tokio::test]
async fn decode_failure_is_reported() {
    let transport = ScriptedTransport::new(vec![resp(200, "not json")]);
    let op = Operation::new(Arc::new(list_servers()), JsonTransform::<serde_json::Value>::new());

    let err = executor(transport)
        .execute(get("https://api.example.com/servers"), &op)
        .await
        .unwrap_err();
    assert!(matches!(err, ExecError::Decode(_)));
}

#[tokio::test]
async fn invalid_arguments_fail_before_dispatch() {
    let transport = ScriptedTransport::new(vec![resp(200, "")]);
    let client = client(transport.clone());
    let desc = OperationDescriptor::builder("CreateBucket", Method::Put, "/{bucket}")
        .bind(Binding::path(0, "bucket").validate_with(BucketNameValidator::default()))
        .build()
        .unwrap();
    let op = Operation::new(Arc::new(desc), ReturnVoid);

    let err = client
        .submit(&op, &CallArgs::new().arg("my..bucket"))
        .err()
        .unwrap();
    assert!(matches!(err, BindError::Validation { index: 0, .. }));
    assert!(transport.seen().is_empty());
}

#[tokio::test]
async fn cancelled_command_resolves_as_cancelled() {
    let op = Operation::new(Arc::new(list_servers()), ReturnVoid);
    let handle = executor(Arc::new(HangingTransport)).execute(get("https://api.example.com/"), &op);

    tokio::task::yield_now().await;
    handle.cancel();
    assert_eq!(handle.await.unwrap_err(), ExecError::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn pool_bounds_concurrent_commands() {
    struct Gauge {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Transport for Gauge {
        async fn send(
            &self,
            _request: Request,
            _timeout: Duration,
            _max_response_bytes: usize,
        ) -> Result<Response, TransportError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Response::new(200, Headers::new(), Vec::new()))
        }
    }

    let gauge = Arc::new(Gauge {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let pool = WorkerPool::current(&PoolConfig { max_concurrency: 2 }).unwrap();
    let exec = CommandExecutor::new(gauge.clone(), pool, ExecutorConfig::default());
    let op = Operation::new(Arc::new(list_servers()), ReturnVoid);

    let handles: Vec<_> = (0..6)
        .map(|i| exec.execute(get(&format!("https://api.example.com/servers/{i}")), &op))
        .collect();
    for h in handles {
        h.await.unwrap();
    }
    assert_eq!(gauge.peak.load(Ordering::SeqCst), 2);
}
