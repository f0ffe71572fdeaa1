//! # Service Layer
//!
//! The session orchestrator that sequences the codec, durable repository,
//! fast-access index, and credentials verifier into the four session
//! operations. A thin `mod.rs` re-exporting one concrete service struct.

pub mod session_engine;

pub use session_engine::SessionEngine;
