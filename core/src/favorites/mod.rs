//! The favorites store: the user's favorite characters, episodes and
//! locations, kept in memory and mirrored to a durable key/value slot.

mod persistence;
mod store;
mod worker;

pub use persistence::{decode, encode, STORAGE_KEY, STORAGE_VERSION};
pub use store::FavoritesStore;
pub use worker::PersistenceHandle;
