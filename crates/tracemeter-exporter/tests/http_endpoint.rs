//! End-to-end tests over a real listener.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tracemeter_core::{CallerRef, ObjectRef, TraceEvent};
use tracemeter_exporter::config::ExporterConfig;
use tracemeter_exporter::{Exporter, MetricRegistry, ServerState};

struct HttpResponse {
    status: u16,
    head: String,
    body: String,
}

async fn request(addr: SocketAddr, method: &str, path: &str) -> std::io::Result<HttpResponse> {
    let mut stream = TcpStream::connect(addr).await?;
    let req = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(req.as_bytes()).await?;
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;

    let text = String::from_utf8_lossy(&buf).to_string();
    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    let status = head.split_whitespace().nth(1).unwrap().parse().unwrap();
    Ok(HttpResponse {
        status,
        head: head.to_ascii_lowercase(),
        body: body.to_string(),
    })
}

fn local(collect_defaults: bool) -> ExporterConfig {
    let mut cfg = ExporterConfig::with_port(0);
    cfg.exporter.host = "127.0.0.1".into();
    cfg.exporter.collect_defaults = collect_defaults;
    cfg
}

#[tokio::test]
async fn metrics_endpoint_serves_trace_counter() {
    let exporter = Exporter::start(local(false)).await.unwrap();
    assert_eq!(exporter.state(), ServerState::Listening);
    let addr = exporter.local_addr().unwrap();

    let tf = exporter.create_trace_function(["baz"]).unwrap();

    let res = request(addr, "GET", "/metrics").await.unwrap();
    assert!(res
        .body
        .contains("# HELP trace_counter Counts how many times a function has been traced"));

    tf.trace(&TraceEvent::new(
        ObjectRef::new("SomeModule", "1"),
        CallerRef::new("foo", "some_module.rs").with_prop("baz", 42),
    ));

    let res = request(addr, "GET", "/metrics").await.unwrap();
    assert_eq!(res.status, 200);
    assert!(res.head.contains("content-type: text/plain; version=0.0.4"));

    let line = res
        .body
        .lines()
        .find(|l| l.contains("caller_props_baz=\"42\""))
        .expect("labelled line");
    assert!(line.starts_with("trace_counter{"));
    assert!(line.ends_with(" 1"));

    exporter.stop().await.unwrap();
}

#[tokio::test]
async fn other_paths_get_empty_response() {
    let exporter = Exporter::start(local(false)).await.unwrap();
    let addr = exporter.local_addr().unwrap();
    exporter.create_timer_function().unwrap().record("x", 1.0);

    let res = request(addr, "GET", "/").await.unwrap();
    assert_eq!(res.status, 200);
    assert!(res.body.is_empty());
    assert!(!res.head.contains("content-type"));

    let res = request(addr, "GET", "/metrics/extra").await.unwrap();
    assert_eq!(res.status, 200);
    assert!(res.body.is_empty());

    let res = request(addr, "POST", "/metrics").await.unwrap();
    assert_eq!(res.status, 200);
    assert!(res.body.is_empty());

    exporter.stop().await.unwrap();
}

#[tokio::test]
async fn timer_visible_over_http() {
    let exporter = Exporter::start(local(false)).await.unwrap();
    let addr = exporter.local_addr().unwrap();
    let timer = exporter.create_timer_function().unwrap();
    timer.record("foobar", 200.0);

    let res = request(addr, "GET", "/metrics").await.unwrap();
    let line = res
        .body
        .lines()
        .find(|l| l.starts_with("timer_counter{name=\"foobar\"}"))
        .unwrap();
    let value: f64 = line.rsplit(' ').next().unwrap().parse().unwrap();
    assert!(value >= 200.0);

    exporter.stop().await.unwrap();
}

#[tokio::test]
async fn stop_releases_port() {
    let exporter = Exporter::start(local(false)).await.unwrap();
    let addr = exporter.local_addr().unwrap();
    assert_eq!(request(addr, "GET", "/metrics").await.unwrap().status, 200);

    exporter.stop().await.unwrap();
    assert_eq!(exporter.state(), ServerState::Stopped);
    assert!(TcpStream::connect(addr).await.is_err());

    // Port is free again.
    let rebound = TcpListener::bind(addr).await;
    assert!(rebound.is_ok());
}

#[tokio::test]
async fn stop_is_idempotent() {
    let exporter = Exporter::start(local(false)).await.unwrap();
    exporter.create_trace_function(Vec::<String>::new()).unwrap();
    exporter.create_memory_function(Vec::<String>::new()).unwrap();
    exporter.stop().await.unwrap();
    exporter.stop().await.unwrap();

    // Never started, never created anything.
    let mut cfg = ExporterConfig::default();
    cfg.exporter.collect_defaults = false;
    let idle = Exporter::start(cfg).await.unwrap();
    idle.stop().await.unwrap();
}

#[tokio::test]
async fn bind_failure_propagates() {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();

    let mut cfg = local(false);
    cfg.exporter.port = Some(port);
    let err = Exporter::start(cfg).await.err().expect("must fail");
    assert_eq!(err.kind().as_str(), "BIND");
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn collect_defaults_adds_process_metrics() {
    let exporter = Exporter::start(local(true)).await.unwrap();
    let addr = exporter.local_addr().unwrap();
    let res = request(addr, "GET", "/metrics").await.unwrap();
    assert!(res.body.contains("process_cpu_seconds_total"));
    exporter.stop().await.unwrap();

    let quiet = Exporter::start(local(false)).await.unwrap();
    let res = request(quiet.local_addr().unwrap(), "GET", "/metrics").await.unwrap();
    assert!(!res.body.contains("process_cpu_seconds_total"));
    quiet.stop().await.unwrap();
}

#[tokio::test]
async fn external_server_mounts_router() {
    let exporter = Exporter::builder(local(false))
        .external_server()
        .start()
        .await
        .unwrap();
    assert_eq!(exporter.state(), ServerState::Stopped);
    assert!(exporter.local_addr().is_none());

    exporter
        .create_trace_function(Vec::<String>::new())
        .unwrap()
        .trace(&TraceEvent::new(
            ObjectRef::new("A", "1"),
            CallerRef::new("f", "f.rs"),
        ));

    // The embedding application owns the listener.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = exporter.router();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let res = request(addr, "GET", "/metrics").await.unwrap();
    assert_eq!(res.status, 200);
    assert_eq!(res.body, exporter.metrics().unwrap());

    server.abort();
    exporter.stop().await.unwrap();
}

#[tokio::test]
async fn shared_registry_survives_stop() {
    let shared = MetricRegistry::new();
    let outside = prometheus::IntCounter::new("outside_total", "registered by the owner").unwrap();
    outside.inc();
    shared.inner().register(Box::new(outside.clone())).unwrap();

    let cfg = || {
        let mut c = ExporterConfig::default();
        c.exporter.collect_defaults = false;
        c
    };
    let a = Exporter::builder(cfg()).registry(shared.clone()).start().await.unwrap();
    let b = Exporter::builder(cfg()).registry(shared.clone()).start().await.unwrap();

    a.create_trace_function(Vec::<String>::new()).unwrap();
    let timer = b.create_timer_function().unwrap();
    timer.record("kept", 3.0);

    let dup = b.create_trace_function(Vec::<String>::new()).err().expect("must fail");
    assert_eq!(dup.kind().as_str(), "DUPLICATE_METRIC");

    a.stop().await.unwrap();
    a.stop().await.unwrap();

    let text = shared.render().unwrap();
    assert!(text.contains("outside_total 1"));
    assert!(text.contains("timer_counter{name=\"kept\"} 3"));
    assert!(!shared.contains("trace_counter"));

    // The name is free again.
    b.create_trace_function(Vec::<String>::new()).unwrap();
    b.stop().await.unwrap();
    assert!(shared.render().unwrap().contains("outside_total 1"));
}
