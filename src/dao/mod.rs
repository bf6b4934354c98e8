//! Persistence layer: entities, the [`game_store::GameStore`] trait, and its
//! PostgREST and in-memory backends.

pub mod game_store;
pub mod models;
pub mod storage;
