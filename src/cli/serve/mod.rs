//! HTTP server for `serve` and `dev`.
//!
//! `serve` answers from the output tree as it is. `dev` builds first, starts
//! the actor system, serves the live reload client at `/hmr.js` and accepts
//! live reload sockets at `/hmr`.

mod lifecycle;
mod path;
mod response;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};
use tokio::sync::mpsc;

use crate::actor::Coordinator;
use crate::cli::build::build_site;
use crate::config::SiteConfig;
use crate::core::{is_shutdown, register_server};
use crate::page::BuildMode;
use crate::actor::messages::WsMsg;
use crate::reload::server::upgrade_http;
use crate::reload::{HMR_CLIENT_PATH, HMR_SOCKET_PATH};
use crate::utils::path::url::split_path_suffix;
use crate::{debug, log};

/// Request handler pool size
const REQUEST_THREADS: usize = 4;

/// What the request handlers need, shared across the pool.
struct ServeState {
    root: PathBuf,
    /// Live reload port; `None` outside `dev`.
    ws_port: Option<u16>,
    /// Where `/hmr` upgrades go; `None` outside `dev`.
    ws_tx: Option<mpsc::Sender<WsMsg>>,
}

/// Serve the output directory without building or watching.
pub fn serve(config: Arc<SiteConfig>) -> Result<()> {
    let root = config.output_dir().to_path_buf();
    if !root.is_dir() {
        log!("warn"; "{} does not exist, run `dess build` first", root.display());
    }

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server), None);
    log!("serve"; "http://{}", addr);

    let state = ServeState {
        root,
        ws_port: None,
        ws_tx: None,
    };
    run_request_loop(&server, Arc::new(state))
}

/// Build, watch and serve with live reload.
pub fn dev(config: Arc<SiteConfig>) -> Result<()> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    let mut coordinator =
        Coordinator::with_config(Arc::clone(&config)).with_shutdown_signal(shutdown_rx);
    let ws_port = coordinator.bind_ws()?;
    let ws_tx = coordinator.ws_sender();
    coordinator.watch()?;

    let report = build_site(&config, BuildMode::Development).context("initial build failed")?;
    if !report.failed.is_empty() {
        log!("warn"; "{} of {} pages failed, fix and save to rebuild", report.failed.len(), report.total());
    }

    register_server(Arc::clone(&server), Some(shutdown_tx));
    let actors = lifecycle::spawn_actors(coordinator);
    log!("serve"; "http://{}", addr);
    debug!("reload"; "client at {}, socket on port {}", HMR_CLIENT_PATH, ws_port);

    let state = ServeState {
        root: config.output_dir().to_path_buf(),
        ws_port: Some(ws_port),
        ws_tx: Some(ws_tx),
    };
    let result = run_request_loop(&server, Arc::new(state));
    lifecycle::wait_for_shutdown(Some(actors));
    result
}

/// Accept requests until the server is unblocked, handling them on a small
/// rayon pool.
fn run_request_loop(server: &Server, state: Arc<ServeState>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let state = Arc::clone(&state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {:#}", e);
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, state: &ServeState) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    let (url_path, _) = split_path_suffix(request.url());
    debug!("serve"; "{} {}", request.method(), url_path);

    if let Some(port) = state.ws_port
        && url_path == HMR_CLIENT_PATH
    {
        return response::respond_hmr_js(request, port);
    }
    if let Some(ws_tx) = &state.ws_tx
        && url_path == HMR_SOCKET_PATH
    {
        return upgrade_http(request, ws_tx);
    }

    match path::resolve_path(request.url(), &state.root) {
        Some(file) => response::respond_file(request, &file, state.ws_port),
        None => response::respond_not_found(request, state.ws_port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Read, Write};
    use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream};
    use tempfile::TempDir;

    /// Serve `root` on an ephemeral port; the server stops when the guard drops.
    struct TestServer {
        server: Arc<Server>,
        addr: SocketAddr,
        handle: Option<std::thread::JoinHandle<()>>,
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            self.server.unblock();
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }

    fn start(root: &std::path::Path, ws_port: Option<u16>) -> TestServer {
        start_with(root, ws_port, None)
    }

    fn start_with(
        root: &std::path::Path,
        ws_port: Option<u16>,
        ws_tx: Option<mpsc::Sender<WsMsg>>,
    ) -> TestServer {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (server, addr) = lifecycle::bind_with_retry(localhost, 0).unwrap();
        let server = Arc::new(server);
        let state = Arc::new(ServeState {
            root: root.to_path_buf(),
            ws_port,
            ws_tx,
        });
        let handle = std::thread::spawn({
            let server = Arc::clone(&server);
            move || run_request_loop(&server, state).unwrap()
        });
        TestServer {
            server,
            addr,
            handle: Some(handle),
        }
    }

    fn get(addr: SocketAddr, path: &str) -> (u16, String) {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(stream, "GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        let status = response[9..12].parse().unwrap();
        (status, response)
    }

    fn output() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        fs::write(dir.path().join("index.html"), "<p>home</p>").unwrap();
        fs::write(dir.path().join("blog/post1.html"), "<p>post</p>").unwrap();
        dir
    }

    #[test]
    fn test_serves_pages_without_extension() {
        let dir = output();
        let server = start(dir.path(), None);

        let (status, body) = get(server.addr, "/blog/post1");
        assert_eq!(status, 200);
        assert!(body.contains("<p>post</p>"));
        assert!(body.contains("text/html"));

        let (status, body) = get(server.addr, "/");
        assert_eq!(status, 200);
        assert!(body.contains("<p>home</p>"));
    }

    #[test]
    fn test_not_found_page() {
        let dir = output();
        let server = start(dir.path(), None);
        let (status, body) = get(server.addr, "/nope");
        assert_eq!(status, 404);
        assert!(body.contains("<code>/nope</code>"));
        assert!(!body.contains(HMR_CLIENT_PATH));
    }

    #[test]
    fn test_hmr_client_only_in_dev() {
        let dir = output();
        let plain = start(dir.path(), None);
        assert_eq!(get(plain.addr, HMR_CLIENT_PATH).0, 404);

        let dev = start(dir.path(), Some(40123));
        let (status, body) = get(dev.addr, HMR_CLIENT_PATH);
        assert_eq!(status, 200);
        assert!(body.contains("application/javascript"));
        assert!(body.contains(":40123/hmr"));

        let (_, body) = get(dev.addr, "/nope");
        assert!(body.contains("<script src=\"/hmr.js\"></script>"));
    }

    #[test]
    fn test_hmr_socket_on_http_port() {
        let dir = output();
        let plain = start(dir.path(), None);
        assert_eq!(get(plain.addr, HMR_SOCKET_PATH).0, 404);

        let (tx, mut rx) = mpsc::channel(4);
        let dev = start_with(dir.path(), Some(40124), Some(tx));
        assert_eq!(get(dev.addr, HMR_SOCKET_PATH).0, 400);

        let url = format!("ws://{}{HMR_SOCKET_PATH}", dev.addr);
        let (_client, _) = tungstenite::connect(url).unwrap();
        assert!(matches!(rx.blocking_recv(), Some(WsMsg::AddClient(_))));
    }
}
