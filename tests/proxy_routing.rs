//! Proxy routing and credential placement.
//!
//! The stub backend plays a forward proxy: for plain HTTP targets the client
//! sends the absolute-form request line to it.

use proxy_probe::config::{AuthConfig, AuthScope};
use proxy_probe::http::{Operation, Runner};

mod common;

// "probe:hunter2"
const BASIC_CREDENTIALS: &str = "Basic cHJvYmU6aHVudGVyMg==";

fn target() -> url::Url {
    url::Url::parse("http://egress.example.invalid/ip").unwrap()
}

fn credentials(scope: AuthScope) -> Option<AuthConfig> {
    Some(AuthConfig {
        username: "probe".into(),
        password: "hunter2".into(),
        scope,
    })
}

#[tokio::test]
async fn test_http_proxy_receives_absolute_request() {
    let (proxy_addr, seen) = common::start_fixed_backend(200, "192.0.2.10").await;

    let mut config = common::test_config();
    config.proxy.http = Some(format!("http://{}", proxy_addr));

    let outcome = Runner::new(&config).unwrap().execute(&Operation::get(target())).await;

    assert!(outcome.success, "{:?}", outcome);
    assert_eq!(outcome.body.as_deref(), Some("192.0.2.10"));

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].request_line(), "GET http://egress.example.invalid/ip HTTP/1.1");
    assert!(seen[0].header("user-agent").unwrap().starts_with("Mozilla/5.0"));
    assert_eq!(seen[0].header("accept-language").as_deref(), Some("en-US,en;q=0.8"));
}

#[tokio::test]
async fn test_http_override_replaces_relay() {
    let (proxy_addr, seen) = common::start_fixed_backend(200, "ok").await;

    let mut config = common::test_config();
    // Nothing listens here; the override must win for http:// targets.
    config.proxy.relay = Some("socks5h://127.0.0.1:1".into());
    config.proxy.http = Some(format!("http://{}", proxy_addr));

    let outcome = Runner::new(&config).unwrap().execute(&Operation::get(target())).await;

    assert!(outcome.success, "{:?}", outcome);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_proxy_scoped_credentials() {
    let (proxy_addr, seen) = common::start_fixed_backend(200, "ok").await;

    let mut config = common::test_config();
    config.proxy.http = Some(format!("http://{}", proxy_addr));
    config.proxy.auth = credentials(AuthScope::Proxy);

    let outcome = Runner::new(&config).unwrap().execute(&Operation::get(target())).await;
    assert!(outcome.success);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen[0].header("proxy-authorization").as_deref(), Some(BASIC_CREDENTIALS));
    assert_eq!(seen[0].header("authorization"), None);
}

#[tokio::test]
async fn test_origin_scoped_credentials() {
    let (addr, seen) = common::start_fixed_backend(200, "ok").await;

    let mut config = common::test_config();
    config.proxy.auth = credentials(AuthScope::Origin);

    let url = url::Url::parse(&format!("http://{}/ip", addr)).unwrap();
    let outcome = Runner::new(&config).unwrap().execute(&Operation::get(url)).await;
    assert!(outcome.success);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen[0].header("authorization").as_deref(), Some(BASIC_CREDENTIALS));
    assert_eq!(seen[0].header("proxy-authorization"), None);
}

#[tokio::test]
async fn test_proxy_auth_rejection_is_reported() {
    let (proxy_addr, _) = common::start_fixed_backend(407, "Proxy Authentication Required").await;

    let mut config = common::test_config();
    config.proxy.http = Some(format!("http://{}", proxy_addr));

    let outcome = Runner::new(&config).unwrap().execute(&Operation::get(target())).await;

    assert!(!outcome.success);
    assert_eq!(outcome.status, Some(407));
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.exit_status(), 1);
}

#[tokio::test]
async fn test_tunnel_auth_rejection_is_transport_failure() {
    let (proxy_addr, seen) = common::start_fixed_backend(407, "Proxy Authentication Required").await;

    let mut config = common::test_config();
    config.proxy.https = Some(format!("http://{}", proxy_addr));

    let url = url::Url::parse("https://egress.example.invalid/ip").unwrap();
    let outcome = Runner::new(&config).unwrap().execute(&Operation::get(url)).await;

    assert!(!outcome.success);
    assert_eq!(outcome.status, None);
    assert_eq!(outcome.attempts, 1);
    assert!(outcome.error.is_some());
    assert_eq!(outcome.exit_status(), 1);

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1, "407 on CONNECT must not be retried");
    assert!(
        seen[0].request_line().starts_with("CONNECT egress.example.invalid:443"),
        "{}",
        seen[0].request_line()
    );
}

#[tokio::test]
async fn test_unreachable_relay_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = common::test_config();
    config.proxy.relay = Some(format!("socks5h://{}", addr));

    let outcome = Runner::new(&config).unwrap().execute(&Operation::get(target())).await;

    assert!(!outcome.success);
    assert_eq!(outcome.status, None);
    assert_eq!(outcome.attempts, 1);
    assert!(outcome.error.is_some());
}
