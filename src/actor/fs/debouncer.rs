use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::actor::messages::ChangeKind;
use crate::utils::path::normalize_path;

/// Quiet window after the last event before a batch is released.
pub(super) const DEBOUNCE_MS: u64 = 300;

/// Timing and per-path deduplication. No classification.
pub(super) struct Debouncer {
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
        }
    }

    /// Record a notify event.
    ///
    /// - Removed then Created/Modified: restored, keep the new kind
    /// - Modified then Removed: Removed
    /// - Created then Removed: nothing happened, drop the path
    /// - otherwise the first event wins
    ///
    /// A rename is a removal of the old name and a creation of the new one.
    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;
        use notify::event::{ModifyKind, RenameMode};

        let kinds: &[ChangeKind] = match event.kind {
            EventKind::Create(_) => &[ChangeKind::Created],
            EventKind::Remove(_) => &[ChangeKind::Removed],
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => &[ChangeKind::Removed],
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => &[ChangeKind::Created],
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                &[ChangeKind::Removed, ChangeKind::Created]
            }
            // Backends that can't tell the halves apart
            EventKind::Modify(ModifyKind::Name(_)) => &[],
            EventKind::Modify(_) => &[ChangeKind::Modified],
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for (i, path) in event.paths.iter().enumerate() {
            if is_temp_file(path) {
                continue;
            }
            let kind = kinds.get(i).or(kinds.last()).copied().unwrap_or_else(|| {
                if path.exists() {
                    ChangeKind::Created
                } else {
                    ChangeKind::Removed
                }
            });
            let path = normalize_path(path);

            match self.changes.get(&path).copied() {
                None => {
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Removed) if kind != ChangeKind::Removed => {
                    self.changes.insert(path, kind);
                }
                Some(ChangeKind::Modified) if kind == ChangeKind::Removed => {
                    self.changes.insert(path, ChangeKind::Removed);
                }
                Some(ChangeKind::Created) if kind == ChangeKind::Removed => {
                    crate::debug!("watch"; "discard created+removed: {}", path.display());
                    self.changes.remove(&path);
                }
                Some(_) => continue,
            }
            self.last_event = Some(Instant::now());
        }
    }

    /// Take the batch once the quiet window has elapsed.
    pub(super) fn take_if_ready(&mut self) -> Option<Vec<(PathBuf, ChangeKind)>> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;

        let mut batch: Vec<_> = std::mem::take(&mut self.changes).into_iter().collect();
        batch.sort_by(|a, b| a.0.cmp(&b.0));
        Some(batch)
    }

    pub(super) fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
            && !self.changes.is_empty()
    }

    /// Time until the current window could close.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };
        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}

/// Editor artifacts: swap/backup files, `~` suffixes, dotfiles.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "swx" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
        || name.starts_with('#')
}
