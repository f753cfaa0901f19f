//! FileSystem Actor
//!
//! Watches the source tree and forwards debounced batches to the
//! CompilerActor. The watcher starts in `new`, so events raised during the
//! initial build are buffered rather than lost.
//!
//! ```text
//! notify → std channel → bridge thread → Debouncer → CompilerMsg::Changes
//! ```

use std::path::Path;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::CompilerMsg;

mod debouncer;

#[cfg(test)]
mod tests;

use debouncer::Debouncer;

pub struct FsActor {
    /// Sync -> async bridge input
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Must be kept alive for events to flow
    _watcher: RecommendedWatcher,
    compiler_tx: mpsc::Sender<CompilerMsg>,
    debouncer: Debouncer,
}

impl FsActor {
    pub fn new(root: &Path, compiler_tx: mpsc::Sender<CompilerMsg>) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        crate::debug!("watch"; "watching {}", root.display());

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            compiler_tx,
            debouncer: Debouncer::new(),
        })
    }

    /// Run until the CompilerActor goes away.
    pub async fn run(self) {
        let Self {
            notify_rx,
            _watcher,
            compiler_tx,
            mut debouncer,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let Some(batch) = debouncer.take_if_ready() else {
                        continue;
                    };
                    for (path, kind) in &batch {
                        crate::debug!("watch"; "{}: {}", kind.label(), path.display());
                    }
                    if compiler_tx.send(CompilerMsg::Changes(batch)).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}
