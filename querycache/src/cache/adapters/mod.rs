//! Adapters between the framework's cache capability and the shared engine.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                  Persistence Framework                  │
//! │                                                         │
//! │  One Cache per mapper namespace ("orders", "users")    │
//! └───────────────────────────┬─────────────────────────────┘
//!                             │
//!                             ▼
//! ┌────────────────────────────────────────────────────────┐
//! │                     NamedCache                          │
//! │                                                         │
//! │  Display key → string key                               │
//! │  namespace id → group tag                               │
//! │  Pending → cancel_update + miss                         │
//! └───────────────────────────┬─────────────────────────────┘
//!                             │
//!                             ▼
//! ┌────────────────────────────────────────────────────────┐
//! │              Arc<dyn CacheEngine> (shared)              │
//! └────────────────────────────────────────────────────────┘
//! ```

mod named;

pub use named::NamedCache;
