//! # Repository Module
//!
//! Database repository implementations for the local store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LocalBackend                                                           │
//! │       │                                                                 │
//! │       │  db.state().load::<Catalog>("products")                         │
//! │       ▼                                                                 │
//! │  StateRepository                                                        │
//! │  ├── load(&self, key)                                                   │
//! │  ├── save(&self, key, value)                                            │
//! │  ├── save_all(&self, entries)   (one transaction)                       │
//! │  └── remove(&self, key)                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite `collections` table                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod state;
