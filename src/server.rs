//! HTTP front end for audits
//!
//! - POST /audit  - `{repository_identifier, tasks}` in, updated tasks out
//! - GET /health  - liveness check
//!
//! Each request is handled on its own thread, so health checks stay responsive while an
//! audit is running.

use crate::audit::AuditService;
use crate::domain::AuditRequest;
use anyhow::Result;
use serde_json::json;
use std::io::{Cursor, Read};
use tiny_http::{Header, Method, Request, Response, Server};

/// Bind `addr` and serve until the listener shuts down.
pub fn serve<S: AuditService>(addr: &str, service: &S) -> Result<()> {
    let server = bind(addr)?;
    tracing::info!("Listening on http://{}", addr);
    serve_on(&server, service);
    Ok(())
}

pub fn bind(addr: &str) -> Result<Server> {
    Server::http(addr).map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}"))
}

pub fn serve_on<S: AuditService + ?Sized>(server: &Server, service: &S) {
    std::thread::scope(|scope| {
        for request in server.incoming_requests() {
            scope.spawn(move || {
                if let Err(e) = handle_request(request, service) {
                    tracing::warn!("Error handling request: {}", e);
                }
            });
        }
    });
}

fn handle_request<S: AuditService + ?Sized>(mut request: Request, service: &S) -> Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();

    let mut body = String::new();
    let (status, payload) = match request.as_reader().read_to_string(&mut body) {
        Ok(_) => route(service, &method, &url, &body),
        Err(e) => (400, error_body(&format!("Failed to read body: {e}"))),
    };

    tracing::info!("{} {} -> {}", method, url, status);
    request.respond(json_response(status, payload))?;
    Ok(())
}

/// Dispatch one request, returning the status code and JSON body.
pub fn route<S: AuditService + ?Sized>(
    service: &S,
    method: &Method,
    url: &str,
    body: &str,
) -> (u16, String) {
    let path = url.split('?').next().unwrap_or("");

    match (method, path) {
        (Method::Get, "/health") => (200, json!({ "status": "ok" }).to_string()),
        (Method::Post, "/audit") => {
            let request: AuditRequest = match serde_json::from_str(body) {
                Ok(r) => r,
                Err(e) => return (400, error_body(&format!("Invalid request body: {e}"))),
            };

            match service.audit(&request) {
                Ok(tasks) => match serde_json::to_string(&tasks) {
                    Ok(json) => (200, json),
                    Err(e) => (500, error_body(&e.to_string())),
                },
                Err(e) => {
                    tracing::error!("Audit of {} failed: {}", request.repository_identifier, e);
                    (500, error_body(&e.to_string()))
                }
            }
        }
        _ => (404, error_body("Not found")),
    }
}

fn error_body(message: &str) -> String {
    json!({ "error": message }).to_string()
}

fn json_response(status: u16, payload: String) -> Response<Cursor<Vec<u8>>> {
    let response = Response::from_string(payload).with_status_code(status);
    match Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
