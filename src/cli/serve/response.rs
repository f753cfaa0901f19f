//! HTTP response handlers.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::embed::serve::{ERROR_HTML, ErrorVars, HMR_JS, HmrVars, NOT_FOUND_HTML, NotFoundVars};
use crate::reload::HMR_CLIENT_PATH;
use crate::utils::html::inject_into_head;
use crate::utils::mime::{self, types};

/// Respond with a file from the output tree, or the 500 page when it
/// cannot be read.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);
    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    match fs::read(path).with_context(|| format!("failed to read {}", path.display())) {
        Ok(body) => send_body(request, 200, content_type, body),
        Err(e) => respond_error(request, &e, ws_port),
    }
}

/// Respond with the 404 page. In dev mode it carries the reload client, so
/// the page refreshes once the missing document is written.
pub fn respond_not_found(request: Request, ws_port: Option<u16>) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 404, types::HTML);
    }

    let path = request.url().to_string();
    let mut body = NOT_FOUND_HTML.render(&NotFoundVars { path });
    if ws_port.is_some() {
        inject_into_head(&mut body, &hmr_script_tag());
    }
    send_body(request, 404, types::HTML, body.into_bytes())
}

/// Respond with the 500 page describing `error`.
pub fn respond_error(request: Request, error: &anyhow::Error, ws_port: Option<u16>) -> Result<()> {
    let path = request.url().to_string();
    let mut body = ERROR_HTML.render(&ErrorVars {
        path,
        message: format!("{error:#}"),
    });
    if ws_port.is_some() {
        inject_into_head(&mut body, &hmr_script_tag());
    }
    send_body(request, 500, types::HTML, body.into_bytes())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with the live reload client, bound to `ws_port`.
pub fn respond_hmr_js(request: Request, ws_port: u16) -> Result<()> {
    let body = HMR_JS.render(&HmrVars { ws_port });
    send_body(request, 200, types::JAVASCRIPT, body.into_bytes())
}

fn hmr_script_tag() -> String {
    format!("<script src=\"{HMR_CLIENT_PATH}\"></script>\n")
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = with_content_type(Response::empty(StatusCode(status)), content_type);
    request.respond(response)?;
    Ok(())
}

fn send_body(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body).with_status_code(StatusCode(status));
    request.respond(with_content_type(response, content_type))?;
    Ok(())
}

fn with_content_type<R: Read>(response: Response<R>, content_type: &'static str) -> Response<R> {
    match Header::from_bytes("Content-Type", content_type) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
