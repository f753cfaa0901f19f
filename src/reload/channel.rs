//! Live-reload subscriber set.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tiny_http::ReadWrite;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::message::HotReloadMessage;

/// How often the background loop checks subscribers for a close.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// An open subscriber connection.
pub trait Connection: Send {
    fn send_text(&mut self, text: &str) -> anyhow::Result<()>;

    /// Drain pending input without blocking; `true` once the peer is gone.
    fn poll_closed(&mut self) -> bool;

    fn close(&mut self) {}
}

impl Connection for WebSocket<TcpStream> {
    fn send_text(&mut self, text: &str) -> anyhow::Result<()> {
        send_text(self, text)
    }

    fn poll_closed(&mut self) -> bool {
        loop {
            match self.read() {
                Ok(Message::Close(_)) => return true,
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => {
                    return false;
                }
                Err(_) => return true,
            }
        }
    }

    fn close(&mut self) {
        close(self);
    }
}

/// A socket upgraded by the HTTP server. Its stream can only be read
/// blocking, so a gone peer is noticed when a send fails.
impl Connection for WebSocket<Box<dyn ReadWrite + Send>> {
    fn send_text(&mut self, text: &str) -> anyhow::Result<()> {
        send_text(self, text)
    }

    fn poll_closed(&mut self) -> bool {
        false
    }

    fn close(&mut self) {
        close(self);
    }
}

fn send_text<S: Read + Write>(ws: &mut WebSocket<S>, text: &str) -> anyhow::Result<()> {
    ws.send(Message::Text(text.to_owned().into()))?;
    Ok(())
}

fn close<S: Read + Write>(ws: &mut WebSocket<S>) {
    let _ = ws.close(None);
    let _ = ws.flush();
}

type Clients = Mutex<Vec<Box<dyn Connection>>>;

/// The set of open subscribers. Cheap to clone; clones share the set.
#[derive(Clone, Default)]
pub struct LiveReload {
    clients: Arc<Clients>,
}

impl LiveReload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, conn: Box<dyn Connection>) {
        let mut clients = self.clients.lock();
        clients.push(conn);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }

    /// Send `msg` to every subscriber. A failed send drops that subscriber
    /// and delivery continues. Returns the number of successful sends.
    pub fn broadcast(&self, msg: &HotReloadMessage) -> usize {
        let text = msg.to_json();
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return 0;
        }

        let mut delivered = 0;
        clients.retain_mut(|client| match client.send_text(&text) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", delivered);
        delivered
    }

    /// Remove subscribers whose peer has closed.
    pub fn prune_closed(&self) {
        self.clients.lock().retain_mut(|client| !client.poll_closed());
    }

    /// Close and forget every subscriber.
    pub fn close_all(&self) {
        for mut client in self.clients.lock().drain(..) {
            client.close();
        }
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Prune closed subscribers in a background thread until every
    /// `LiveReload` handle sharing this set has been dropped.
    pub fn spawn_close_poller(&self) {
        let clients: Weak<Clients> = Arc::downgrade(&self.clients);
        std::thread::spawn(move || {
            loop {
                std::thread::sleep(POLL_INTERVAL);
                let Some(clients) = clients.upgrade() else {
                    break;
                };
                LiveReload { clients }.prune_closed();
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// In-memory connection recording what it was sent.
    #[derive(Clone, Default)]
    pub struct FakeConnection {
        pub sent: Arc<Mutex<Vec<String>>>,
        pub fail_sends: Arc<Mutex<bool>>,
        pub closed: Arc<Mutex<bool>>,
    }

    impl Connection for FakeConnection {
        fn send_text(&mut self, text: &str) -> anyhow::Result<()> {
            if *self.fail_sends.lock() {
                anyhow::bail!("broken pipe");
            }
            self.sent.lock().push(text.to_string());
            Ok(())
        }

        fn poll_closed(&mut self) -> bool {
            *self.closed.lock()
        }
    }

    #[test]
    fn test_broadcast_reaches_every_subscriber_once() {
        let reload = LiveReload::new();
        let (a, b) = (FakeConnection::default(), FakeConnection::default());
        reload.subscribe(Box::new(a.clone()));
        reload.subscribe(Box::new(b.clone()));

        assert_eq!(reload.broadcast(&HotReloadMessage::Refresh), 2);
        assert_eq!(*a.sent.lock(), vec![r#"{"type":"refresh"}"#]);
        assert_eq!(*b.sent.lock(), vec![r#"{"type":"refresh"}"#]);
    }

    #[test]
    fn test_failed_send_drops_only_that_subscriber() {
        let reload = LiveReload::new();
        let (a, b) = (FakeConnection::default(), FakeConnection::default());
        reload.subscribe(Box::new(a.clone()));
        reload.subscribe(Box::new(b.clone()));

        *a.fail_sends.lock() = true;
        assert_eq!(reload.broadcast(&HotReloadMessage::Refresh), 1);
        assert_eq!(reload.len(), 1);
        assert!(a.sent.lock().is_empty());
        assert_eq!(b.sent.lock().len(), 1);

        reload.broadcast(&HotReloadMessage::Refresh);
        assert_eq!(b.sent.lock().len(), 2);
    }

    #[test]
    fn test_prune_closed() {
        let reload = LiveReload::new();
        let (a, b) = (FakeConnection::default(), FakeConnection::default());
        reload.subscribe(Box::new(a.clone()));
        reload.subscribe(Box::new(b));
        *a.closed.lock() = true;

        reload.prune_closed();
        assert_eq!(reload.len(), 1);
        reload.close_all();
        assert!(reload.is_empty());
    }

    #[test]
    fn test_broadcast_without_subscribers() {
        assert_eq!(LiveReload::new().broadcast(&HotReloadMessage::Refresh), 0);
    }
}
