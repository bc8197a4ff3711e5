//! Session persistence.
//!
//! [`MemoryStore`] is the in-process implementation of
//! `coral_core::PositionStore`; the engine is its only writer.

mod memory;

pub use memory::MemoryStore;
