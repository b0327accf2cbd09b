//! HTTP server for the dashboard page
//!
//! `tablero serve` → loads the dataset once, then answers each request from
//! the same read-only `Dashboard`.

use crate::dashboard::{Dashboard, DashboardUpdate, FilterOptions};
use crate::filter::FilterSelection;
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: String) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Where the served dataset came from, reported by /api/health
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub source: String,
    pub records: usize,
    pub loaded_at: String,
}

impl Health {
    pub fn for_dashboard(dashboard: &Dashboard) -> Self {
        Self {
            source: dashboard.dataset().source().to_string(),
            records: dashboard.dataset().len(),
            loaded_at: dashboard.dataset().loaded_at().to_rfc3339(),
        }
    }
}

// Dashboard page; talks to /api/dashboard and draws the chart specs with Plotly
const DASHBOARD_HTML: &str = include_str!("dashboard.html");

/// A response before it is handed to tiny_http
#[derive(Debug, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_string(value).unwrap_or_else(|e| {
            format!(r#"{{"ok":false,"data":null,"error":"serialization failed: {}"}}"#, e)
        });
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }
}

/// Route one request. Pure apart from logging, so it can be tested without
/// a socket.
pub fn route(method: &Method, url: &str, dashboard: &Dashboard, health: &Health) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    match (method, path) {
        // Serve dashboard UI
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Reply {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: DASHBOARD_HTML.to_string(),
        },

        // API: recompute for the selection in the query string
        (&Method::Get, "/api/dashboard") => {
            let update: DashboardUpdate = match FilterSelection::from_query(query) {
                Ok(selection) => dashboard.render(&selection),
                Err(e) => {
                    warn!(error = %e, query, "unparseable selection, showing defaults");
                    DashboardUpdate::fallback()
                }
            };
            Reply::json(200, &ApiResponse::success(update))
        }

        // API: option lists only
        (&Method::Get, "/api/options") => {
            let options: FilterOptions = dashboard.options();
            Reply::json(200, &ApiResponse::success(options))
        }

        (&Method::Get, "/api/health") => Reply::json(200, &ApiResponse::success(health)),

        // 404
        _ => Reply::json(404, &ApiResponse::<()>::failure(format!("Not found: {}", path))),
    }
}

/// Start the dashboard server and block serving requests
pub fn start_dashboard_server(host: &str, port: u16, dashboard: &Dashboard) -> std::io::Result<()> {
    let addr = format!("{}:{}", host, port);
    let server = Server::http(&addr)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let health = Health::for_dashboard(dashboard);

    info!(
        %addr,
        source = %health.source,
        records = health.records,
        "dashboard listening"
    );

    // One request at a time; the dashboard is never mutated
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, dashboard, &health) {
            warn!(error = %e, "failed to send response");
        }
    }

    Ok(())
}

fn handle_request(request: Request, dashboard: &Dashboard, health: &Health) -> std::io::Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();
    debug!(%method, %url, "request");

    let reply = route(&method, &url, dashboard, health);
    let header = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
        .map_err(|_| std::io::Error::other("invalid header"))?;
    let response = Response::from_string(reply.body)
        .with_status_code(reply.status)
        .with_header(header);
    request.respond(response)
}
