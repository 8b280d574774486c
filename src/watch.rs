//! Per-path file watching.
//!
//! The reconciliation engine only toggles live mode; what "live mode" is
//! made of belongs to the host. `FileWatcher` is the building block a real
//! host puts behind its [`LiveModeAdapter`](crate::host::LiveModeAdapter):
//! enabling live mode on a resource watches its backing path, disabling it
//! unwatches. Reacting to the resulting events (reloading, prompting) stays
//! with the host.

use crate::error::HostError;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{self, Receiver};

/// A change observed on a watched path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Modified(PathBuf),
    Removed(PathBuf),
}

pub struct FileWatcher {
    watcher: RecommendedWatcher,
    rx: Receiver<FileEvent>,
}

impl FileWatcher {
    pub fn new() -> Result<Self, HostError> {
        let (tx, rx) = mpsc::channel(100);

        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let Ok(event) = res else { return };
                let kind = event.kind.clone();
                for path in event.paths {
                    let mapped = match kind {
                        EventKind::Create(_) | EventKind::Modify(_) => FileEvent::Modified(path),
                        EventKind::Remove(_) => FileEvent::Removed(path),
                        _ => continue,
                    };
                    let _ = tx.blocking_send(mapped);
                }
            },
            Config::default(),
        )
        .map_err(HostError::InitWatcher)?;

        Ok(Self { watcher, rx })
    }

    pub fn watch(&mut self, path: &Path) -> Result<(), HostError> {
        self.watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|source| HostError::Watch {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn unwatch(&mut self, path: &Path) -> Result<(), HostError> {
        self.watcher
            .unwatch(path)
            .map_err(|source| HostError::Watch {
                path: path.to_path_buf(),
                source,
            })
    }

    pub async fn next_event(&mut self) -> Option<FileEvent> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[tokio::test]
    async fn reports_modifications_to_a_watched_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "one").unwrap();

        let mut watcher = FileWatcher::new().unwrap();
        watcher.watch(&path).unwrap();

        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap();
        file.write_all(b"two").unwrap();
        file.sync_all().unwrap();
        drop(file);

        let seen = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match watcher.next_event().await {
                    Some(FileEvent::Modified(p)) if p == path => break p,
                    Some(_) => continue,
                    None => panic!("watcher channel closed"),
                }
            }
        })
        .await
        .expect("no modification event within timeout");
        assert_eq!(seen, path);
    }

    #[tokio::test]
    async fn watching_a_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.txt");

        let mut watcher = FileWatcher::new().unwrap();
        let err = watcher.watch(&missing).unwrap_err();
        assert!(matches!(err, HostError::Watch { .. }));
    }
}
