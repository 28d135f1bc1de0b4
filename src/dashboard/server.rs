//! Minimal HTTP server for the dashboard
//! One tokio task per connection; each request is answered from the shared state.

use super::filter::DashboardFilter;
use super::metrics::{detail_csv, summarize};
use super::render;
use super::DashboardState;
use crate::error::Result;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub attachment: Option<&'static str>,
    pub body: Vec<u8>,
}

impl Response {
    fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            attachment: None,
            body: body.into(),
        }
    }

    fn json(status: u16, value: serde_json::Value) -> Self {
        Self::new(status, "application/json", value.to_string())
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        create_response(self.status, self.content_type, self.attachment, &self.body)
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Internal Server Error",
    }
}

fn create_response(status: u16, content_type: &str, attachment: Option<&str>, body: &[u8]) -> Vec<u8> {
    let disposition = attachment
        .map(|name| format!("Content-Disposition: attachment; filename=\"{}\"\r\n", name))
        .unwrap_or_default();
    let mut out = format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: {}; charset=utf-8\r\n\
         {}\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        status,
        status_text(status),
        content_type,
        disposition,
        body.len()
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}

pub async fn serve(addr: &str, state: DashboardState) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("✅ Dashboard listening on http://{}", listener.local_addr()?);
    let state = Arc::new(Mutex::new(state));

    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("📥 Connection from {}", peer);
        tokio::spawn(handle_connection(stream, Arc::clone(&state)));
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<Mutex<DashboardState>>) {
    let mut buffer = [0; 8192];
    match stream.read(&mut buffer).await {
        Ok(size) => {
            let request = String::from_utf8_lossy(&buffer[..size]);
            let response = handle_request(&state, &request);
            if let Err(e) = stream.write_all(&response.to_bytes()).await {
                error!("Failed to write response: {}", e);
            }
        }
        Err(e) => error!("Failed to read from stream: {}", e),
    }
}

/// Routes one raw HTTP request.
pub fn handle_request(state: &Mutex<DashboardState>, request: &str) -> Response {
    let Some(request_line) = request.lines().next() else {
        return Response::error(400, "empty request");
    };
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        return Response::error(400, "malformed request line");
    }
    let (method, target) = (parts[0], parts[1]);
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    info!("{} {}", method, path);

    if method != "GET" {
        return Response::error(405, "only GET is supported");
    }
    let filter = DashboardFilter::from_query(query);

    let mut guard = match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.refresh();
    let data = guard.data();

    let result = match path {
        "/" | "/index.html" => summarize(data, &filter).and_then(|summary| {
            let options = data.options()?;
            Ok(Response::new(200, "text/html", render::page(&summary, &options)))
        }),
        "/api/summary" => summarize(data, &filter)
            .and_then(|summary| Ok(Response::new(200, "application/json", serde_json::to_vec(&summary)?))),
        "/api/options" => data
            .options()
            .and_then(|options| Ok(Response::new(200, "application/json", serde_json::to_vec(&options)?))),
        "/download/detail.csv" => detail_csv(data, &filter).map(|body| Response {
            attachment: Some("detail.csv"),
            ..Response::new(200, "text/csv", body)
        }),
        "/api/health" => Ok(Response::json(
            200,
            json!({
                "status": "ok",
                "order_lines": data.lines.height(),
                "orders": data.orders.height(),
                "source": data.dir.display().to_string(),
            }),
        )),
        _ => Ok(Response::error(404, "not found")),
    };

    result.unwrap_or_else(|e| {
        error!("{} {} failed: {}", method, path, e);
        Response::error(500, &e.to_string())
    })
}
