//! WebSocket Actor - Live Reload Broadcast
//!
//! ```text
//! ws acceptor --[AddClient]--> WsActor <--[Refresh]-- CompilerActor
//!                                 |
//!                                 +--{"type":"refresh"}--> every subscriber
//! ```

use tokio::sync::mpsc;

use super::messages::WsMsg;
use crate::reload::{HotReloadMessage, LiveReload};

pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    reload: LiveReload,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self::with_reload(rx, LiveReload::new())
    }

    /// Use an existing subscriber set.
    pub fn with_reload(rx: mpsc::Receiver<WsMsg>, reload: LiveReload) -> Self {
        Self { rx, reload }
    }

    /// Run until shutdown or until every sender is gone.
    pub async fn run(mut self) {
        self.reload.spawn_close_poller();

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::AddClient(conn) => self.reload.subscribe(conn),
                WsMsg::Refresh => {
                    let sent = self.reload.broadcast(&HotReloadMessage::Refresh);
                    crate::debug!("reload"; "refresh sent to {} clients", sent);
                }
                WsMsg::Shutdown => break,
            }
        }

        crate::debug!("ws"; "closing {} clients", self.reload.len());
        self.reload.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::channel::tests::FakeConnection;

    #[tokio::test]
    async fn test_refresh_and_shutdown() {
        let (tx, rx) = mpsc::channel(8);
        let reload = LiveReload::new();
        let actor = tokio::spawn(WsActor::with_reload(rx, reload.clone()).run());

        let (a, b) = (FakeConnection::default(), FakeConnection::default());
        *b.fail_sends.lock() = true;
        tx.send(WsMsg::AddClient(Box::new(a.clone()))).await.unwrap();
        tx.send(WsMsg::AddClient(Box::new(b.clone()))).await.unwrap();
        tx.send(WsMsg::Refresh).await.unwrap();
        tx.send(WsMsg::Shutdown).await.unwrap();
        actor.await.unwrap();

        assert_eq!(*a.sent.lock(), vec![r#"{"type":"refresh"}"#.to_string()]);
        assert!(b.sent.lock().is_empty());
        assert!(reload.is_empty());
    }
}
