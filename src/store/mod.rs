//! Handoff store — PostgreSQL backend for one-time token handoffs.
//!
//! Shares the same database as the rest of the app backend, so records
//! written by the bridge page's store call are visible to the shell's
//! claim call with no coordination beyond the storage engine's own
//! upsert/delete atomicity.

pub mod db;
pub mod purge;

pub use db::TokenStore;
pub use purge::purge_daemon;
