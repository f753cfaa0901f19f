//! Actor Coordinator - Wires up the Live Reload Actor System
//!
//! A thin orchestrator: creates channels, binds the WebSocket listener,
//! starts the watcher and runs the actors until shutdown.
//!
//! ```text
//! FsActor --> CompilerActor --> WsActor
//!  (watch)      (rebuild)      (broadcast)
//! ```
//!
//! `bind_ws` and `watch` run on the caller's thread, before the initial
//! build, so the HTTP server knows the real WebSocket port and no change
//! made during that build is missed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, TryRecvError};
use tokio::sync::mpsc;

use super::compiler::CompilerActor;
use super::fs::FsActor;
use super::messages::{CompilerMsg, WsMsg};
use super::ws::WsActor;
use crate::config::SiteConfig;
use crate::reload::server::start_ws_server;

/// Channel buffer size
const CHANNEL_BUFFER: usize = 32;

/// How long actors get to drain after shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

pub struct Coordinator {
    config: Arc<SiteConfig>,
    shutdown_rx: Option<Receiver<()>>,
    compiler_tx: mpsc::Sender<CompilerMsg>,
    compiler_rx: mpsc::Receiver<CompilerMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    ws_rx: mpsc::Receiver<WsMsg>,
    fs: Option<FsActor>,
}

impl Coordinator {
    pub fn with_config(config: Arc<SiteConfig>) -> Self {
        let (compiler_tx, compiler_rx) = mpsc::channel(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel(CHANNEL_BUFFER);
        Self {
            config,
            shutdown_rx: None,
            compiler_tx,
            compiler_rx,
            ws_tx,
            ws_rx,
            fs: None,
        }
    }

    /// Set shutdown signal receiver
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Start the WebSocket listener. Returns the port actually bound.
    pub fn bind_ws(&self) -> Result<u16> {
        let serve = &self.config.serve;
        let port = start_ws_server(serve.interface, serve.ws_port, self.ws_tx.clone())?;
        if port != serve.ws_port {
            crate::log!("reload"; "port {} in use, using {} instead", serve.ws_port, port);
        }
        crate::debug!("reload"; "ws://{}:{}", serve.interface, port);
        Ok(port)
    }

    /// Sender for subscribers accepted outside the WebSocket listener.
    pub fn ws_sender(&self) -> mpsc::Sender<WsMsg> {
        self.ws_tx.clone()
    }

    /// Start watching the source tree. Events queue until `run`.
    pub fn watch(&mut self) -> Result<()> {
        let fs = FsActor::new(&self.config.src_dir, self.compiler_tx.clone())
            .with_context(|| format!("failed to watch {}", self.config.src_dir.display()))?;
        self.fs = Some(fs);
        Ok(())
    }

    /// Run the actor system until shutdown.
    pub async fn run(self) -> Result<()> {
        let Self {
            config,
            shutdown_rx,
            compiler_tx,
            compiler_rx,
            ws_tx,
            ws_rx,
            fs,
        } = self;

        let fs = fs.context("watcher not started")?;
        let compiler = CompilerActor::new(compiler_rx, ws_tx.clone(), config);
        let ws = WsActor::new(ws_rx);

        crate::debug!("actor"; "start");
        let fs_handle = tokio::spawn(fs.run());
        let compiler_handle = tokio::spawn(compiler.run());
        let ws_handle = tokio::spawn(ws.run());

        if let Some(rx) = shutdown_rx {
            // crossbeam receiver, so poll instead of await
            while let Err(TryRecvError::Empty) = rx.try_recv() {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            crate::debug!("actor"; "shutdown signal received");
        } else {
            tokio::select! {
                _ = compiler_handle => {}
                _ = ws_handle => {}
            }
            return Ok(());
        }

        // Let an in-flight rebuild finish, then close every client
        let _ = compiler_tx.send(CompilerMsg::Shutdown).await;
        let _ = tokio::time::timeout(SHUTDOWN_GRACE, compiler_handle).await;
        let _ = ws_tx.send(WsMsg::Shutdown).await;
        let _ = tokio::time::timeout(SHUTDOWN_GRACE, ws_handle).await;
        fs_handle.abort();

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
