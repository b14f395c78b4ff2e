// ABOUTME: Integration tests for the HTTP health probe.
// ABOUTME: Serves scripted status codes from a local TCP listener.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anthony_deploy::diagnostics::{Diagnostics, WarningKind};
use anthony_deploy::health::{HealthProbe, ProbeOutcome};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn fast_probe() -> HealthProbe {
    HealthProbe::with_timing(
        Duration::ZERO,
        5,
        Duration::from_secs(2),
        Duration::from_millis(10),
    )
}

/// Answer each connection with the next status in `statuses`, repeating the
/// last one. Returns the URL and a request counter.
async fn serve(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let status = statuses[n.min(statuses.len() - 1)];

            let mut buf = vec![0u8; 4096];
            let mut request = Vec::new();
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(read) => request.extend_from_slice(&buf[..read]),
                }
            }

            let response = format!(
                "HTTP/1.1 {status} Status\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}/health/"), hits)
}

#[tokio::test]
async fn healthy_on_third_attempt() {
    let (url, hits) = serve(vec![503, 503, 200]).await;
    let mut diag = Diagnostics::default();

    let outcome = fast_probe().probe_url(&url, &mut diag).await;

    assert_eq!(outcome, ProbeOutcome::Healthy { attempt: 3 });
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert!(!diag.has_warnings());
}

#[tokio::test]
async fn healthy_on_first_attempt() {
    let (url, _hits) = serve(vec![200]).await;
    let mut diag = Diagnostics::default();

    let outcome = fast_probe().probe_url(&url, &mut diag).await;

    assert_eq!(outcome, ProbeOutcome::Healthy { attempt: 1 });
}

#[tokio::test]
async fn persistent_errors_exhaust_attempts() {
    let (url, hits) = serve(vec![500]).await;
    let mut diag = Diagnostics::default();

    let outcome = fast_probe().probe_url(&url, &mut diag).await;

    assert_eq!(outcome, ProbeOutcome::Unhealthy { attempts: 5 });
    assert_eq!(hits.load(Ordering::SeqCst), 5);
    assert!(diag.has(WarningKind::HealthCheck));
}

#[tokio::test]
async fn no_listener_is_unhealthy_with_warning() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let mut diag = Diagnostics::default();

    let outcome = fast_probe()
        .probe_url(&format!("http://{addr}/health/"), &mut diag)
        .await;

    assert_eq!(outcome, ProbeOutcome::Unhealthy { attempts: 5 });
    let warning = &diag.warnings()[0];
    assert_eq!(warning.kind, WarningKind::HealthCheck);
    assert_eq!(warning.message, "Health check failed after 5 attempts");
}

#[tokio::test]
async fn slow_endpoint_times_out_per_attempt() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    let probe = HealthProbe::with_timing(
        Duration::ZERO,
        2,
        Duration::from_millis(50),
        Duration::from_millis(10),
    );
    let mut diag = Diagnostics::default();

    let outcome = probe
        .probe_url(&format!("http://{addr}/health/"), &mut diag)
        .await;

    assert_eq!(outcome, ProbeOutcome::Unhealthy { attempts: 2 });
    assert!(diag.has(WarningKind::HealthCheck));
}
