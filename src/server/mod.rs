//! Dashboard HTTP server.
//!
//! Serves the dashboard page and the JSON it polls, plus a Prometheus
//! endpoint and a health probe.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chronywatch::server::{serve, Dashboard, ServerConfig};
//! use chronywatch::{Collector, CommandSource};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = ServerConfig::builder().listen_addr("127.0.0.1:5000").build();
//!     let collector = Collector::new(Arc::new(CommandSource::chronyc()));
//!     let dashboard = Arc::new(Dashboard::new(collector, &config));
//!
//!     let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
//!     serve(listener, dashboard, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await;
//!     Ok(())
//! }
//! ```

mod metrics;

pub use metrics::format_prometheus;

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::collector::Collector;

const DASHBOARD_TEMPLATE: &str = include_str!("dashboard.html");

const ROUTES: &[&str] = &["/", "/index.html", "/data", "/metrics", "/health", "/healthz"];

/// Configuration for the dashboard server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:5000")
    pub listen_addr: String,
    /// How often the dashboard page polls `/data`
    pub refresh: Duration,
    /// Optional namespace prefix for `/metrics` series
    pub namespace: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            refresh: Duration::from_secs(1),
            namespace: None,
        }
    }
}

impl ServerConfig {
    /// Create a new builder for ServerConfig.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    listen_addr: Option<String>,
    refresh: Option<Duration>,
    namespace: Option<String>,
}

impl ServerConfigBuilder {
    /// Set the listen address.
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = Some(addr.into());
        self
    }

    /// Set the page refresh interval.
    pub fn refresh(mut self, refresh: Duration) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Set the namespace prefix for metrics.
    pub fn namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = Some(ns.into());
        self
    }

    /// Build the ServerConfig.
    pub fn build(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            listen_addr: self.listen_addr.unwrap_or(defaults.listen_addr),
            refresh: self.refresh.unwrap_or(defaults.refresh),
            namespace: self.namespace,
        }
    }
}

/// Request routing on top of a [`Collector`].
#[derive(Debug)]
pub struct Dashboard {
    collector: Collector,
    page: String,
    namespace: Option<String>,
}

impl Dashboard {
    pub fn new(collector: Collector, config: &ServerConfig) -> Self {
        let page = DASHBOARD_TEMPLATE.replace("__REFRESH_MS__", &config.refresh.as_millis().to_string());
        Self {
            collector,
            page,
            namespace: config.namespace.clone(),
        }
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    /// Produce the response for a request line.
    ///
    /// `/data` and `/metrics` each run exactly one collection. `/data`
    /// takes the fingerprint a viewer last rendered as `?since=`, so
    /// `changed` is answered for that viewer alone.
    pub async fn respond(&self, method: &Method, uri: &Uri) -> Response<Full<Bytes>> {
        let path = uri.path();
        if *method != Method::GET {
            return if ROUTES.contains(&path) {
                text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
            } else {
                text(StatusCode::NOT_FOUND, "Not Found")
            };
        }

        match path {
            "/" | "/index.html" => response(
                StatusCode::OK,
                "text/html; charset=utf-8",
                Bytes::from(self.page.clone()),
            ),
            "/data" => {
                let since = uri.query().and_then(|q| query_param(q, "since"));
                let report = self.collector.collect_since(since).await;
                match serde_json::to_vec(&report) {
                    Ok(body) => {
                        let mut ok = response(StatusCode::OK, "application/json", Bytes::from(body));
                        ok.headers_mut()
                            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
                        ok
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to serialize report");
                        text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    }
                }
            }
            "/metrics" => {
                let report = self.collector.collect().await;
                response(
                    StatusCode::OK,
                    "text/plain; version=0.0.4; charset=utf-8",
                    Bytes::from(format_prometheus(&report, self.namespace.as_deref())),
                )
            }
            "/health" | "/healthz" => text(StatusCode::OK, "OK"),
            _ => text(StatusCode::NOT_FOUND, "Not Found"),
        }
    }
}

/// Accept connections until `shutdown` completes.
///
/// Each connection is served on its own task. Accept and connection
/// errors are logged and never stop the loop.
pub async fn serve<F>(listener: TcpListener, dashboard: Arc<Dashboard>, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    if let Ok(addr) = listener.local_addr() {
        info!(%addr, source = dashboard.collector().source().description(), "dashboard listening");
    }

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            },
            _ = &mut shutdown => {
                info!("dashboard shutting down");
                return;
            }
        };

        let io = TokioIo::new(stream);
        let dashboard = dashboard.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let dashboard = dashboard.clone();
                async move {
                    debug!(method = %req.method(), path = req.uri().path(), "request");
                    Ok::<_, Infallible>(dashboard.respond(req.method(), req.uri()).await)
                }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                warn!(%peer, error = %e, "connection error");
            }
        });
    }
}

/// First value of `name` in a query string. Fingerprints are hex, so
/// no percent-decoding is needed.
fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

fn response(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn text(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    response(status, "text/plain; charset=utf-8", Bytes::from_static(body.as_bytes()))
}
