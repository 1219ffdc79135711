use tokio::sync::oneshot::{self, error::TryRecvError};

use super::worker::{spawn_worker, PersistenceHandle};
use crate::models::{
    Character, EntityKind, Episode, Favoritable, FavoriteEntry, FavoritesCollection, Location,
};
use crate::storage::KeyValueStorage;
use crate::Result;

/// The user's favorites, partitioned by kind.
///
/// All operations run on the caller's thread and return immediately. Every
/// mutation schedules a write of the whole collection on a background
/// worker; write failures are logged and never undo the in-memory change.
///
/// Rehydration from storage happens once, right after construction. Until
/// [`FavoritesStore::is_loaded`] reports true the collection is not
/// authoritative yet, and callers should show a loading state rather than
/// "no favorites".
///
/// There is no cross-process coordination: two stores over the same storage
/// simply overwrite each other's writes.
pub struct FavoritesStore {
    favorites: FavoritesCollection,
    loaded: bool,
    mutated_before_load: bool,
    rehydration: Option<oneshot::Receiver<Option<FavoritesCollection>>>,
    persistence: PersistenceHandle,
}

impl FavoritesStore {
    /// Create an empty store over `storage` and start rehydrating from it
    pub fn open<S: KeyValueStorage + 'static>(storage: S) -> Result<Self> {
        let (persistence, rehydration) = spawn_worker(Box::new(storage))?;
        Ok(Self {
            favorites: FavoritesCollection::default(),
            loaded: false,
            mutated_before_load: false,
            rehydration: Some(rehydration),
            persistence,
        })
    }

    /// Whether rehydration has finished
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Apply the rehydration result if it has arrived. Never blocks.
    /// Returns the loaded flag.
    pub fn poll_rehydration(&mut self) -> bool {
        if let Some(rx) = self.rehydration.as_mut() {
            match rx.try_recv() {
                Ok(restored) => {
                    self.rehydration = None;
                    self.finish_rehydration(restored);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => {
                    self.rehydration = None;
                    self.finish_rehydration(None);
                }
            }
        }
        self.loaded
    }

    /// Block until rehydration has finished.
    ///
    /// Must not be called from inside an async runtime.
    pub fn wait_until_loaded(&mut self) {
        if let Some(rx) = self.rehydration.take() {
            let restored = rx.blocking_recv().unwrap_or(None);
            self.finish_rehydration(restored);
        }
    }

    fn finish_rehydration(&mut self, restored: Option<FavoritesCollection>) {
        if let Some(favorites) = restored {
            self.favorites = favorites;
            if self.mutated_before_load {
                // Storage may now hold the pre-load edits; realign it.
                self.persist();
            }
        }
        self.loaded = true;
        self.mutated_before_load = false;
    }

    /// The whole collection
    pub fn favorites(&self) -> &FavoritesCollection {
        &self.favorites
    }

    /// Entries of one kind, in insertion order
    pub fn entries(&self, kind: EntityKind) -> &[FavoriteEntry] {
        self.favorites.partition(kind)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entries(kind).len()
    }

    /// Add (or refresh) an entity. Any existing entry with the same id is
    /// replaced and the new one goes to the end of its kind's list.
    pub fn add<E: Favoritable + ?Sized>(&mut self, entity: &E) {
        let entry = FavoriteEntry::from_entity(entity);
        if !Self::accepts_id(entry.id) {
            return;
        }

        let partition = self.favorites.partition_mut(entry.kind());
        partition.retain(|existing| existing.id != entry.id);
        partition.push(entry);
        self.after_mutation();
    }

    /// Remove an entry; removing something that is not a favorite is a no-op
    pub fn remove(&mut self, kind: EntityKind, id: u32) {
        if !Self::accepts_id(id) {
            return;
        }

        self.favorites.partition_mut(kind).retain(|existing| existing.id != id);
        self.after_mutation();
    }

    pub fn is_favorite(&self, kind: EntityKind, id: u32) -> bool {
        self.favorites.contains(kind, id)
    }

    /// Flip membership of an entity. Returns whether it is a favorite now.
    pub fn toggle<E: Favoritable + ?Sized>(&mut self, entity: &E) -> bool {
        let kind = entity.favorite_kind();
        let id = entity.favorite_id();
        if self.is_favorite(kind, id) {
            self.remove(kind, id);
        } else {
            self.add(entity);
        }
        self.is_favorite(kind, id)
    }

    /// Number of favorites across all kinds
    pub fn total_count(&self) -> usize {
        self.favorites.total_count()
    }

    /// Drop every favorite of every kind
    pub fn clear_all(&mut self) {
        self.favorites = FavoritesCollection::default();
        self.after_mutation();
    }

    /// Block until every write scheduled so far has been attempted.
    ///
    /// Must not be called from inside an async runtime.
    pub fn flush(&self) {
        self.persistence.flush();
    }

    pub fn add_character(&mut self, character: &Character) {
        self.add(character);
    }

    pub fn remove_character(&mut self, id: u32) {
        self.remove(EntityKind::Character, id);
    }

    pub fn is_character_favorite(&self, id: u32) -> bool {
        self.is_favorite(EntityKind::Character, id)
    }

    pub fn toggle_character(&mut self, character: &Character) -> bool {
        self.toggle(character)
    }

    pub fn add_episode(&mut self, episode: &Episode) {
        self.add(episode);
    }

    pub fn remove_episode(&mut self, id: u32) {
        self.remove(EntityKind::Episode, id);
    }

    pub fn is_episode_favorite(&self, id: u32) -> bool {
        self.is_favorite(EntityKind::Episode, id)
    }

    pub fn toggle_episode(&mut self, episode: &Episode) -> bool {
        self.toggle(episode)
    }

    pub fn add_location(&mut self, location: &Location) {
        self.add(location);
    }

    pub fn remove_location(&mut self, id: u32) {
        self.remove(EntityKind::Location, id);
    }

    pub fn is_location_favorite(&self, id: u32) -> bool {
        self.is_favorite(EntityKind::Location, id)
    }

    pub fn toggle_location(&mut self, location: &Location) -> bool {
        self.toggle(location)
    }

    fn accepts_id(id: u32) -> bool {
        debug_assert!(id > 0, "favorite ids are positive");
        if id == 0 {
            tracing::warn!("Ignoring favorite operation with id 0");
            return false;
        }
        true
    }

    fn after_mutation(&mut self) {
        if !self.loaded {
            self.mutated_before_load = true;
        }
        self.persist();
    }

    fn persist(&self) {
        self.persistence.save(self.favorites.clone());
    }
}
