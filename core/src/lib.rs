//! Core library for rickdex: catalog models, the favorites store and its
//! persistence, and the client for the remote Rick and Morty catalog.

pub mod catalog;
pub mod error;
pub mod favorites;
pub mod models;
pub mod storage;
pub mod testing;

pub use error::{Error, Result};
