//! Prometheus exposition format and the HTTP endpoint serving it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use postfix_exporter::{MetricsServer, QueueCollector, SnapshotStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SnapshotStore::new();
//!     let server = MetricsServer::bind("0.0.0.0:9706", "/metrics").await?;
//!
//!     // Metrics available at http://localhost:9706/metrics
//!     server.serve(QueueCollector::new(store)).await;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::fmt::Write;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{header, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};

use crate::collector::{GaugeSample, QueueCollector};
use crate::error::{ExporterError, Result};

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render gauge samples in the Prometheus text exposition format.
///
/// Every sample gets its own HELP and TYPE header; no labels are emitted.
pub fn format_prometheus(samples: &[GaugeSample]) -> String {
    let mut output = String::new();

    for sample in samples {
        // Writing to a String cannot fail
        let _ = writeln!(output, "# HELP {} {}", sample.desc.name, sample.desc.help);
        let _ = writeln!(output, "# TYPE {} gauge", sample.desc.name);
        let _ = writeln!(output, "{} {}", sample.desc.name, sample.value);
    }

    output
}

/// Static landing page linking to the metrics path.
pub fn landing_page(metrics_path: &str) -> String {
    format!(
        "<html>
<head><title>Postfix Exporter</title></head>
<body>
<h1>Postfix Exporter</h1>
<p><a href='{metrics_path}'>Metrics</a></p>
</body>
</html>
"
    )
}

/// HTTP server exposing a [`QueueCollector`] to scrapers.
///
/// The listener is bound by [`MetricsServer::bind`], so an address that is
/// already in use is reported before any serving starts.
#[derive(Debug)]
pub struct MetricsServer {
    listener: TcpListener,
    metrics_path: String,
}

impl MetricsServer {
    /// Bind the listener.
    ///
    /// Accepts anything tokio can resolve, plus the `:PORT` shorthand for
    /// all interfaces.
    pub async fn bind(addr: &str, metrics_path: impl Into<String>) -> Result<Self> {
        let resolved = normalize_listen_addr(addr);
        let listener = TcpListener::bind(resolved.as_str())
            .await
            .map_err(|source| ExporterError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        Ok(Self {
            listener,
            metrics_path: metrics_path.into(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests forever.
    ///
    /// Each connection runs on its own task; every request to the metrics
    /// path runs one collection. Accept errors such as running out of file
    /// descriptors are logged and retried with a growing delay.
    pub async fn serve(self, collector: QueueCollector) {
        let collector = Arc::new(collector);
        let metrics_path: Arc<str> = Arc::from(self.metrics_path);
        let listener = self.listener;

        accept_loop(
            || listener.accept(),
            |(stream, peer): (TcpStream, SocketAddr)| {
                let io = TokioIo::new(stream);
                let collector = collector.clone();
                let metrics_path = metrics_path.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                        let collector = collector.clone();
                        let metrics_path = metrics_path.clone();

                        async move { handle_request(&req, &metrics_path, &collector) }
                    });

                    if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                        tracing::debug!(peer = %peer, error = %e, "Connection error");
                    }
                });
            },
        )
        .await
    }
}

/// Delay between failed accepts, doubling from 5ms up to 1s.
#[derive(Debug, Default)]
struct AcceptBackoff {
    delay: Option<Duration>,
}

impl AcceptBackoff {
    const MIN: Duration = Duration::from_millis(5);
    const MAX: Duration = Duration::from_secs(1);

    fn next_delay(&mut self) -> Duration {
        let delay = match self.delay {
            None => Self::MIN,
            Some(d) => (d * 2).min(Self::MAX),
        };
        self.delay = Some(delay);
        delay
    }

    fn reset(&mut self) {
        self.delay = None;
    }
}

/// Hand every accepted connection to `handle`. Never returns.
async fn accept_loop<S, A, Fut, H>(mut accept: A, mut handle: H)
where
    A: FnMut() -> Fut,
    Fut: Future<Output = io::Result<S>>,
    H: FnMut(S),
{
    let mut backoff = AcceptBackoff::default();

    loop {
        match accept().await {
            Ok(conn) => {
                backoff.reset();
                handle(conn);
            }
            Err(e) => {
                let delay = backoff.next_delay();
                tracing::warn!(
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Failed to accept connection"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Expand the `:PORT` shorthand to `0.0.0.0:PORT`.
pub fn normalize_listen_addr(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{}", addr)
    } else {
        addr.to_string()
    }
}

fn handle_request<B>(
    req: &Request<B>,
    metrics_path: &str,
    collector: &QueueCollector,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path();

    let (status, content_type, body) = if path == metrics_path {
        let body = format_prometheus(&collector.collect());
        (StatusCode::OK, CONTENT_TYPE, body)
    } else if path == "/" {
        (
            StatusCode::OK,
            "text/html; charset=utf-8",
            landing_page(metrics_path),
        )
    } else if path == "/health" || path == "/healthz" {
        (StatusCode::OK, "text/plain", "OK".to_string())
    } else {
        (StatusCode::NOT_FOUND, "text/plain", "Not Found".to_string())
    };

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static(content_type));
    Ok(response)
}
