//! Trait seams for external collaborators.

mod exchange;
mod store;

pub use exchange::Exchange;
pub use store::PositionStore;
