//! WebSocket endpoints for live reload.
//!
//! The listener on `ws_port` accepts connections on its own thread,
//! completes the handshake for the `/hmr` path and hands the socket to
//! `WsActor`. The dev HTTP server upgrades `/hmr` requests as well, through
//! [`upgrade_http`], so same-origin clients can subscribe too.

use std::io::ErrorKind;
use std::net::{IpAddr, TcpListener, TcpStream};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Request as HttpRequest, Response as HttpResponse};
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::handshake::derive_accept_key;
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Role;

use super::HMR_SOCKET_PATH;
use crate::actor::messages::WsMsg;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the listener and start the acceptor thread.
///
/// Returns the port actually bound, which may be above `base_port` when it
/// was taken.
pub fn start_ws_server(interface: IpAddr, base_port: u16, ws_tx: mpsc::Sender<WsMsg>) -> Result<u16> {
    let (listener, port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "connection from {}", addr);
                    let Some(ws) = handshake(stream) else {
                        continue;
                    };
                    if ws_tx.blocking_send(WsMsg::AddClient(Box::new(ws))).is_err() {
                        // WsActor is gone: the dev server is shutting down
                        break;
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    Ok(port)
}

/// Complete the upgrade for `/hmr`; anything else is answered with 404.
fn handshake(stream: TcpStream) -> Option<WebSocket<TcpStream>> {
    // Handshake runs blocking; polling reads afterwards do not
    stream.set_nonblocking(false).ok()?;

    let check_path = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        if req.uri().path() == HMR_SOCKET_PATH {
            Ok(resp)
        } else {
            let mut err = ErrorResponse::new(Some(format!("expected {HMR_SOCKET_PATH}")));
            *err.status_mut() = StatusCode::NOT_FOUND;
            Err(err)
        }
    };

    match tungstenite::accept_hdr(stream, check_path) {
        Ok(ws) => {
            ws.get_ref().set_nonblocking(true).ok()?;
            Some(ws)
        }
        Err(e) => {
            crate::debug!("reload"; "handshake failed: {}", e);
            None
        }
    }
}

/// Answer an HTTP `/hmr` request with the WebSocket upgrade and subscribe
/// the socket. Requests that are not WebSocket handshakes get 400.
pub fn upgrade_http(request: HttpRequest, ws_tx: &mpsc::Sender<WsMsg>) -> Result<()> {
    let header = |name: &'static str| {
        request
            .headers()
            .iter()
            .find(|h| h.field.equiv(name))
            .map(|h| h.value.as_str().to_owned())
    };
    let wants_ws = header("Upgrade").is_some_and(|v| v.eq_ignore_ascii_case("websocket"));
    let Some(key) = header("Sec-WebSocket-Key").filter(|_| wants_ws) else {
        request.respond(HttpResponse::from_string("expected a WebSocket handshake").with_status_code(400))?;
        return Ok(());
    };

    let accept = Header::from_bytes("Sec-WebSocket-Accept", derive_accept_key(key.as_bytes()))
        .map_err(|()| anyhow!("invalid accept key"))?;
    let stream = request.upgrade("websocket", HttpResponse::empty(101).with_header(accept));
    let ws = WebSocket::from_raw_socket(stream, Role::Server, None);

    ws_tx
        .blocking_send(WsMsg::AddClient(Box::new(ws)))
        .map_err(|_| anyhow!("live reload is shutting down"))
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.map_or_else(
        || anyhow::anyhow!("no port available"),
        anyhow::Error::from,
    ))
    .with_context(|| format!("failed to bind live-reload socket after {max_retries} attempts"))
}
