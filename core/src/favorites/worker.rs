use std::thread;

use tokio::sync::{mpsc, oneshot};

use super::persistence::{decode, encode, STORAGE_KEY};
use crate::models::FavoritesCollection;
use crate::storage::KeyValueStorage;
use crate::Result;

pub(crate) enum PersistCommand {
    Save(FavoritesCollection),
    Flush(oneshot::Sender<()>),
}

/// Handle for scheduling favorites writes on the persistence worker.
///
/// Sends never block. If the worker is gone the write is logged and dropped.
#[derive(Clone)]
pub struct PersistenceHandle {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistenceHandle {
    /// Schedule a write of the whole collection
    pub fn save(&self, favorites: FavoritesCollection) {
        if self.tx.send(PersistCommand::Save(favorites)).is_err() {
            tracing::error!("Favorites persistence worker is gone; write dropped");
        }
    }

    /// Block until every write scheduled before this call has been attempted.
    ///
    /// Must not be called from inside an async runtime.
    pub fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.blocking_recv();
    }
}

/// Background thread that owns the storage: rehydrates once, then applies
/// writes in the order they were scheduled.
struct PersistenceWorker {
    rx: mpsc::UnboundedReceiver<PersistCommand>,
    storage: Box<dyn KeyValueStorage>,
}

impl PersistenceWorker {
    fn run(mut self, rehydrated: oneshot::Sender<Option<FavoritesCollection>>) {
        tracing::debug!("Favorites persistence worker started");

        let restored = self.rehydrate();
        let _ = rehydrated.send(restored);

        while let Some(command) = self.rx.blocking_recv() {
            // Only the newest snapshot matters; collapse whatever is queued.
            let mut latest = None;
            let mut waiting = Vec::new();
            Self::absorb(command, &mut latest, &mut waiting);
            while let Ok(next) = self.rx.try_recv() {
                Self::absorb(next, &mut latest, &mut waiting);
            }

            if let Some(favorites) = latest {
                self.write(&favorites);
            }
            for done in waiting {
                let _ = done.send(());
            }
        }

        tracing::debug!("Favorites persistence worker shutting down");
    }

    fn absorb(
        command: PersistCommand,
        latest: &mut Option<FavoritesCollection>,
        waiting: &mut Vec<oneshot::Sender<()>>,
    ) {
        match command {
            PersistCommand::Save(favorites) => *latest = Some(favorites),
            PersistCommand::Flush(done) => waiting.push(done),
        }
    }

    fn rehydrate(&mut self) -> Option<FavoritesCollection> {
        let raw = match self.storage.read(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::info!("No stored favorites, starting empty");
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read stored favorites: {}", e);
                return None;
            }
        };

        match decode(&raw) {
            Ok(favorites) => {
                tracing::info!("Restored {} favorites", favorites.total_count());
                Some(favorites)
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored favorites: {}", e);
                None
            }
        }
    }

    fn write(&mut self, favorites: &FavoritesCollection) {
        let result = encode(favorites).and_then(|raw| self.storage.write(STORAGE_KEY, &raw));
        match result {
            Ok(()) => tracing::debug!("Persisted {} favorites", favorites.total_count()),
            Err(e) => tracing::error!("Failed to persist favorites: {}", e),
        }
    }
}

/// Start the persistence worker for `storage`.
///
/// Returns the write handle and a receiver that resolves once rehydration
/// finished, with the restored collection if there was one.
pub(crate) fn spawn_worker(
    storage: Box<dyn KeyValueStorage>,
) -> Result<(PersistenceHandle, oneshot::Receiver<Option<FavoritesCollection>>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let (rehydrated_tx, rehydrated_rx) = oneshot::channel();

    let worker = PersistenceWorker { rx, storage };
    thread::Builder::new()
        .name("favorites-persistence".to_string())
        .spawn(move || worker.run(rehydrated_tx))?;

    Ok((PersistenceHandle { tx }, rehydrated_rx))
}
