// ABOUTME: Preview server for the impact-slides application
// ABOUTME: Serves the generated gallery and exported PNGs over local HTTP

use crate::errors::{Result, SlideError};
use log::{debug, error, info};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Content type for a served file, based on its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .as_deref()
    {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Map a request URL onto a file inside `root`, refusing to leave it.
pub fn resolve_request_path(root: &Path, index: &str, url: &str) -> Option<PathBuf> {
    let url_path = url.split(['?', '#']).next().unwrap_or("/");
    let clean = url_path.trim_start_matches('/');
    if clean.is_empty() {
        return Some(root.join(index));
    }

    let relative = Path::new(clean);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(root.join(relative))
}

fn respond_file(request: Request, file_path: &Path) {
    let response = match fs::read(file_path) {
        Ok(content) => {
            let mut response = Response::from_data(content);
            if let Ok(header) = Header::from_bytes("Content-Type", content_type_for(file_path)) {
                response = response.with_header(header);
            }
            request.respond(response)
        }
        Err(e) => {
            error!("Failed to read file {:?}: {}", file_path, e);
            request.respond(
                Response::from_string(format!("Failed to read file: {}", e))
                    .with_status_code(StatusCode(500)),
            )
        }
    };
    if let Err(e) = response {
        error!("Failed to send response: {}", e);
    }
}

/// Serve `root` on `port` until the process is stopped. `/` maps to `index`.
pub fn serve_directory(root: &Path, index: &str, port: u16) -> Result<()> {
    let server = Server::http(format!("127.0.0.1:{}", port))
        .map_err(|e| SlideError::ServeError(format!("Failed to start HTTP server: {}", e)))?;

    info!("Preview server listening on http://localhost:{}", port);
    println!("Preview available at http://localhost:{} (Press Ctrl+C to stop)", port);

    for request in server.incoming_requests() {
        let url = request.url().to_string();
        match resolve_request_path(root, index, &url) {
            Some(file_path) if file_path.is_file() => {
                debug!("Request for {} -> {:?}", url, file_path);
                respond_file(request, &file_path);
            }
            _ => {
                debug!("Request for {} -> 404", url);
                let response =
                    Response::from_string("404 Not Found").with_status_code(StatusCode(404));
                if let Err(e) = request.respond(response) {
                    error!("Failed to send response: {}", e);
                }
            }
        }
    }

    Ok(())
}
