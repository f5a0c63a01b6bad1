//! Hiroba chat server library.
//!
//! REST endpoints manage users and channels, chat history is stored in SQLite,
//! and live delivery happens over one WebSocket per connection. The connection
//! hub (`infrastructure::hub`) owns the registry of live clients and fans
//! messages out within a channel; each client runs a read pump and a write pump
//! (`ui::client`).

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
