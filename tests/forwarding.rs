//! End-to-end forwarding through a real listener.

use std::time::Duration;

use tiny_proxy::config::schema::DEFAULT_USER_AGENT;
use tiny_proxy::ProxyConfig;

mod common;

#[tokio::test]
async fn rewrites_request_for_origin() {
    let (origin, mut requests) = common::start_canned_origin(common::ok_response("hello")).await;
    let (proxy, shutdown) = common::start_proxy(ProxyConfig::default()).await;

    let response = common::get(
        proxy,
        origin,
        "/hub/index.html?q=1",
        &[
            "Host: somewhere.else",
            "Accept: text/html",
            "user-agent: curl/8.0",
            "X-Dup: first",
            "CONNECTION: keep-alive",
            "Cookie: a=b",
            "proxy-connection: keep-alive",
            "X-Dup: second",
        ],
    )
    .await;
    assert_eq!(response, common::ok_response("hello"));

    let forwarded = String::from_utf8(requests.recv().await.unwrap()).unwrap();
    let expected = format!(
        "GET /hub/index.html?q=1 HTTP/1.0\r\n\
         Host: {origin}\r\n\
         User-Agent: {DEFAULT_USER_AGENT}\r\n\
         Connection: close\r\n\
         Proxy-Connection: close\r\n\
         Accept: text/html\r\n\
         X-Dup: first\r\n\
         Cookie: a=b\r\n\
         X-Dup: second\r\n\
         \r\n"
    );
    assert_eq!(forwarded, expected);

    shutdown.trigger();
}

#[tokio::test]
async fn injected_headers_appear_once() {
    let (origin, mut requests) = common::start_canned_origin(common::ok_response("x")).await;
    let (proxy, shutdown) = common::start_proxy(ProxyConfig::default()).await;

    common::get(proxy, origin, "/", &["HOST: a", "Host: b", "User-Agent: c"]).await;

    let forwarded = String::from_utf8(requests.recv().await.unwrap()).unwrap();
    for name in tiny_proxy::http::INJECTED_HEADERS {
        let count = forwarded
            .lines()
            .filter(|l| {
                l.split_once(':')
                    .is_some_and(|(n, _)| n.eq_ignore_ascii_case(name))
            })
            .count();
        assert_eq!(count, 1, "{name} should appear exactly once in {forwarded:?}");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn relays_bytes_exactly_around_chunk_bound() {
    let mut config = ProxyConfig::default();
    config.relay.chunk_size = 1024;
    let (proxy, shutdown) = common::start_proxy(config).await;

    for len in [19, 700, 1024, 1025, 50_000] {
        let body = common::canned_bytes(len);
        let (origin, _requests) = common::start_canned_origin(body.clone()).await;

        let response = common::get(proxy, origin, "/blob", &[]).await;
        assert_eq!(response.len(), len);
        assert_eq!(response, body, "mismatch for {len} bytes");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn relays_objects_larger_than_default_chunk() {
    let (proxy, shutdown) = common::start_proxy(ProxyConfig::default()).await;
    let body = common::canned_bytes(350 * 1024);
    let (origin, _requests) = common::start_canned_origin(body.clone()).await;

    let response = common::get(proxy, origin, "/large", &[]).await;
    assert_eq!(response, body);

    shutdown.trigger();
}

#[tokio::test]
async fn repeated_requests_are_identical() {
    let (origin, mut requests) = common::start_canned_origin(common::ok_response("same every time")).await;
    let (proxy, shutdown) = common::start_proxy(ProxyConfig::default()).await;

    let first = common::get(proxy, origin, "/same", &["Accept: */*"]).await;
    let first_forwarded = requests.recv().await.unwrap();
    for _ in 0..5 {
        let again = common::get(proxy, origin, "/same", &["Accept: */*"]).await;
        assert_eq!(again, first);
        assert_eq!(requests.recv().await.unwrap(), first_forwarded);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn default_port_when_target_has_none() {
    let mut config = ProxyConfig::default();
    let (origin, mut requests) = common::start_canned_origin(common::ok_response("ported")).await;
    config.upstream.default_port = origin.port().to_string();
    let (proxy, shutdown) = common::start_proxy(config).await;

    let response = common::send_raw(proxy, b"GET http://127.0.0.1/ported HTTP/1.0\r\n\r\n").await;
    assert_eq!(response, common::ok_response("ported"));

    let forwarded = String::from_utf8(requests.recv().await.unwrap()).unwrap();
    assert!(forwarded.contains(&format!("Host: 127.0.0.1:{}\r\n", origin.port())));

    shutdown.trigger();
}

#[tokio::test]
async fn works_as_reqwest_http_proxy() {
    let body = "through the proxy";
    let origin_response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let (origin, mut requests) = common::start_canned_origin(origin_response.into_bytes()).await;
    let (proxy, shutdown) = common::start_proxy(ProxyConfig::default()).await;

    let client = reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(format!("http://{proxy}")).unwrap())
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    let res = client
        .get(format!("http://{origin}/via-reqwest"))
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), body);

    let forwarded = String::from_utf8(requests.recv().await.unwrap()).unwrap();
    assert!(forwarded.starts_with("GET /via-reqwest HTTP/1.0\r\n"));

    shutdown.trigger();
}
