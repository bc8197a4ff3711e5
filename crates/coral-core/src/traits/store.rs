//! Position store trait: the narrow query contract over durable sessions.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::types::{NewSession, RiskConfig, Session};

/// Durable record of trade sessions and the singleton risk configuration.
///
/// The engine is the sole writer of session lifecycle transitions. Writes
/// must be atomic with respect to the read that triggered them; the
/// single-active-cycle scheduling assumption makes a per-store lock
/// sufficient.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// All currently OPEN sessions, in insertion order.
    async fn open_sessions(&self) -> Result<Vec<Session>, StoreError>;

    /// The OPEN session for a symbol, if any. The engine maintains the
    /// invariant of at most one.
    async fn session_for_symbol(&self, symbol: &str) -> Result<Option<Session>, StoreError>;

    /// Record a freshly opened session, returning it with its issued id.
    async fn insert_session(&self, new: NewSession) -> Result<Session, StoreError>;

    /// Close a session: set exit price/timestamp and status CLOSED.
    ///
    /// Idempotent: closing an already-CLOSED session is a no-op that
    /// returns the stored row unchanged, never a double-exit.
    async fn close_session(
        &self,
        id: i64,
        sell_price: Decimal,
        sell_timestamp: i64,
    ) -> Result<Session, StoreError>;

    /// Sessions closed at or after the cutoff (Unix seconds), for the
    /// notification summary.
    async fn closed_since(&self, cutoff: i64) -> Result<Vec<Session>, StoreError>;

    /// Snapshot of the operator-controlled risk configuration.
    async fn risk_config(&self) -> Result<RiskConfig, StoreError>;
}
