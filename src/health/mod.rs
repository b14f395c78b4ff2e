// ABOUTME: Post-deploy HTTP health probe with bounded retries.
// ABOUTME: Polls the application's health endpoint and only ever warns on failure.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::Empty;
use hyper::{Request, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::diagnostics::{Diagnostics, Warning};
use crate::types::Environment;

pub const HEALTH_URL: &str = "http://localhost:8000/health/";

/// Health endpoint for environments served from this machine.
pub fn health_url(environment: Environment) -> Option<&'static str> {
    match environment {
        Environment::Local | Environment::Docker => Some(HEALTH_URL),
        Environment::Kubernetes | Environment::Github => None,
    }
}

/// Result of a health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The environment has no known health endpoint.
    NotApplicable,
    /// A 2xx response arrived on this attempt (1-based).
    Healthy { attempt: u32 },
    /// No attempt succeeded.
    Unhealthy { attempts: u32 },
}

/// Timing for the health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthProbe {
    /// Wait before the first attempt.
    pub settle: Duration,
    pub attempts: u32,
    pub attempt_timeout: Duration,
    /// Wait after each failed attempt.
    pub retry_pause: Duration,
}

impl Default for HealthProbe {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(10),
            attempts: 5,
            attempt_timeout: Duration::from_secs(10),
            retry_pause: Duration::from_secs(5),
        }
    }
}

impl HealthProbe {
    pub fn with_timing(
        settle: Duration,
        attempts: u32,
        attempt_timeout: Duration,
        retry_pause: Duration,
    ) -> Self {
        Self {
            settle,
            attempts,
            attempt_timeout,
            retry_pause,
        }
    }

    /// Probe the environment's health endpoint, if it has one.
    pub async fn probe(&self, environment: Environment, diag: &mut Diagnostics) -> ProbeOutcome {
        tracing::info!("Performing health check...");

        match health_url(environment) {
            Some(url) => self.probe_url(url, diag).await,
            None => {
                tracing::info!("Health check not applicable for this environment");
                ProbeOutcome::NotApplicable
            }
        }
    }

    /// Probe an explicit URL.
    pub async fn probe_url(&self, url: &str, diag: &mut Diagnostics) -> ProbeOutcome {
        let uri: Uri = match url.parse() {
            Ok(uri) => uri,
            Err(e) => {
                diag.warn(Warning::health_check(format!(
                    "Health check failed: invalid URL {url}: {e}"
                )));
                return ProbeOutcome::Unhealthy { attempts: 0 };
            }
        };

        tokio::time::sleep(self.settle).await;

        for attempt in 1..=self.attempts {
            match tokio::time::timeout(self.attempt_timeout, get_status(&uri)).await {
                Ok(Ok(status)) if status.is_success() => {
                    tracing::info!("Health check passed!");
                    return ProbeOutcome::Healthy { attempt };
                }
                Ok(Ok(status)) => tracing::debug!("Health endpoint returned {}", status),
                Ok(Err(e)) => tracing::debug!("Health request failed: {}", e),
                Err(_) => tracing::debug!(
                    "Health request timed out after {:?}",
                    self.attempt_timeout
                ),
            }

            tracing::info!("Health check attempt {} failed, retrying...", attempt);
            tokio::time::sleep(self.retry_pause).await;
        }

        diag.warn(Warning::health_check(format!(
            "Health check failed after {} attempts",
            self.attempts
        )));
        ProbeOutcome::Unhealthy {
            attempts: self.attempts,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ProbeError {
    #[error("health URL has no host")]
    MissingHost,

    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("invalid request: {0}")]
    Request(String),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),
}

/// One GET over a fresh HTTP/1 connection.
async fn get_status(uri: &Uri) -> Result<StatusCode, ProbeError> {
    let host = uri.host().ok_or(ProbeError::MissingHost)?;
    let port = uri.port_u16().unwrap_or(80);

    let stream = TcpStream::connect((host, port))
        .await
        .map_err(ProbeError::Connect)?;
    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("health probe connection error: {}", e);
        }
    });

    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    let authority = uri.authority().map(|a| a.as_str()).unwrap_or(host);

    let req = Request::builder()
        .method("GET")
        .uri(path)
        .header(hyper::header::HOST, authority)
        .body(Empty::<Bytes>::new())
        .map_err(|e| ProbeError::Request(e.to_string()))?;

    let resp = sender.send_request(req).await?;
    Ok(resp.status())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_local_targets_have_health_urls() {
        assert_eq!(health_url(Environment::Local), Some(HEALTH_URL));
        assert_eq!(health_url(Environment::Docker), Some(HEALTH_URL));
        assert_eq!(health_url(Environment::Kubernetes), None);
        assert_eq!(health_url(Environment::Github), None);
    }

    #[test]
    fn default_timing() {
        let probe = HealthProbe::default();
        assert_eq!(probe.settle, Duration::from_secs(10));
        assert_eq!(probe.attempts, 5);
        assert_eq!(probe.attempt_timeout, Duration::from_secs(10));
        assert_eq!(probe.retry_pause, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn not_applicable_environment_skips_probe() {
        let mut diag = Diagnostics::default();
        let outcome = HealthProbe::default()
            .probe(Environment::Github, &mut diag)
            .await;
        assert_eq!(outcome, ProbeOutcome::NotApplicable);
        assert!(!diag.has_warnings());
    }

    #[tokio::test]
    async fn invalid_url_warns_without_attempts() {
        let mut diag = Diagnostics::default();
        let outcome = HealthProbe::default()
            .probe_url("not a url", &mut diag)
            .await;
        assert_eq!(outcome, ProbeOutcome::Unhealthy { attempts: 0 });
        assert!(diag.has_warnings());
    }
}
