//! # Repository Layer
//!
//! Data access abstraction for the durable session store. A thin `mod.rs`
//! re-exporting a single concrete implementation, backed by the unified
//! `sessions` table this engine persists to.

pub mod session_repository;

pub use session_repository::{PgSessionRepository, SessionRepository};

#[cfg(test)]
pub use session_repository::MockSessionRepository;
