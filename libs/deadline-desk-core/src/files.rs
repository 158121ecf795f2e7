use crate::models::order::{ClientId, Deliverable, DeliveryStage};
use std::fs;
use std::path::PathBuf;

/// Read-only lookup of deliverable files prepared outside the chat.
pub trait FileStore: Send {
    fn locate(&self, client: ClientId, stage: DeliveryStage) -> Option<Deliverable>;
}

/// Finds `<clientId>_<stage>.<ext>` inside a directory.
#[derive(Debug, Clone)]
pub struct DirFileStore {
    root: PathBuf,
}

impl DirFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileStore for DirFileStore {
    fn locate(&self, client: ClientId, stage: DeliveryStage) -> Option<Deliverable> {
        let wanted = format!("{}_{}", client, stage);
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Deliverables dir {} unreadable: {}", self.root.display(), e);
                return None;
            }
        };

        let mut matches: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.file_stem().and_then(|s| s.to_str()) == Some(wanted.as_str()))
            .collect();
        matches.sort();

        matches
            .into_iter()
            .next()
            .map(|path| Deliverable::Stored { path })
    }
}

/// File store that never has anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFileStore;

impl FileStore for NoFileStore {
    fn locate(&self, _client: ClientId, _stage: DeliveryStage) -> Option<Deliverable> {
        None
    }
}
