//! In-memory position store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use coral_core::error::StoreError;
use coral_core::traits::PositionStore;
use coral_core::types::{NewSession, RiskConfig, Session, SessionStatus};

struct Inner {
    sessions: Vec<Session>,
    risk: RiskConfig,
    next_id: i64,
}

/// Position store backed by process memory.
///
/// Sessions live for the process lifetime only. Ids are monotonic, and
/// every mutation happens under one lock so a read-then-write transition
/// in the engine observes a consistent view.
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new(risk: RiskConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                sessions: Vec::new(),
                risk,
                next_id: 1,
            })),
        }
    }

    /// Replace the operator risk configuration.
    pub fn set_risk_config(&self, risk: RiskConfig) {
        let mut inner = self.lock();
        inner.risk = risk;
    }

    /// Every session ever recorded, open and closed, in insertion order.
    pub fn all_sessions(&self) -> Vec<Session> {
        self.lock().sessions.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // No mutation here leaves the state half-written, so a poisoned
        // guard still holds consistent data.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(RiskConfig::default())
    }
}

#[async_trait]
impl PositionStore for MemoryStore {
    async fn open_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .sessions
            .iter()
            .filter(|s| s.is_open())
            .cloned()
            .collect())
    }

    async fn session_for_symbol(&self, symbol: &str) -> Result<Option<Session>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .sessions
            .iter()
            .find(|s| s.is_open() && s.symbol == symbol)
            .cloned())
    }

    async fn insert_session(&self, new: NewSession) -> Result<Session, StoreError> {
        let mut inner = self.lock();
        let session = Session {
            id: inner.next_id,
            symbol: new.symbol,
            buy_price: new.buy_price,
            quantity: new.quantity,
            buy_timestamp: new.buy_timestamp,
            status: SessionStatus::Open,
            sell_price: None,
            sell_timestamp: None,
        };
        inner.next_id += 1;
        inner.sessions.push(session.clone());
        debug!(id = session.id, symbol = %session.symbol, "session opened");
        Ok(session)
    }

    async fn close_session(
        &self,
        id: i64,
        sell_price: Decimal,
        sell_timestamp: i64,
    ) -> Result<Session, StoreError> {
        let mut inner = self.lock();
        let session = inner
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::SessionNotFound(id))?;

        if session.status == SessionStatus::Closed {
            warn!(id, "close requested for already closed session");
            return Ok(session.clone());
        }

        session.status = SessionStatus::Closed;
        session.sell_price = Some(sell_price);
        session.sell_timestamp = Some(sell_timestamp);
        debug!(id, symbol = %session.symbol, %sell_price, "session closed");
        Ok(session.clone())
    }

    async fn closed_since(&self, cutoff: i64) -> Result<Vec<Session>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .sessions
            .iter()
            .filter(|s| {
                s.status == SessionStatus::Closed
                    && s.sell_timestamp.map(|t| t >= cutoff).unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn risk_config(&self) -> Result<RiskConfig, StoreError> {
        Ok(self.lock().risk.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_session(symbol: &str) -> NewSession {
        NewSession {
            symbol: symbol.to_string(),
            buy_price: dec!(100),
            quantity: dec!(2),
            buy_timestamp: 1_000,
        }
    }

    #[tokio::test]
    async fn test_insert_issues_monotonic_ids() {
        let store = MemoryStore::default();
        let a = store.insert_session(new_session("BTCUSDT")).await.unwrap();
        let b = store.insert_session(new_session("ETHUSDT")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(a.is_open());
    }

    #[tokio::test]
    async fn test_session_for_symbol_sees_only_open() {
        let store = MemoryStore::default();
        let session = store.insert_session(new_session("BTCUSDT")).await.unwrap();

        assert!(store
            .session_for_symbol("BTCUSDT")
            .await
            .unwrap()
            .is_some());
        assert!(store.session_for_symbol("ETHUSDT").await.unwrap().is_none());

        store.close_session(session.id, dec!(110), 2_000).await.unwrap();
        assert!(store.session_for_symbol("BTCUSDT").await.unwrap().is_none());
        assert!(store.open_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_double_close_keeps_first_exit() {
        let store = MemoryStore::default();
        let session = store.insert_session(new_session("BTCUSDT")).await.unwrap();

        let first = store
            .close_session(session.id, dec!(110), 2_000)
            .await
            .unwrap();
        let second = store
            .close_session(session.id, dec!(90), 3_000)
            .await
            .unwrap();

        assert_eq!(first.sell_price, Some(dec!(110)));
        assert_eq!(second.sell_price, Some(dec!(110)));
        assert_eq!(second.sell_timestamp, Some(2_000));
    }

    #[tokio::test]
    async fn test_close_unknown_session() {
        let store = MemoryStore::default();
        assert!(matches!(
            store.close_session(99, dec!(1), 0).await,
            Err(StoreError::SessionNotFound(99))
        ));
    }

    #[tokio::test]
    async fn test_closed_since_cutoff() {
        let store = MemoryStore::default();
        let a = store.insert_session(new_session("AUSDT")).await.unwrap();
        let b = store.insert_session(new_session("BUSDT")).await.unwrap();
        store.close_session(a.id, dec!(110), 1_500).await.unwrap();
        store.close_session(b.id, dec!(120), 5_000).await.unwrap();

        let recent = store.closed_since(2_000).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].symbol, "BUSDT");
    }

    #[tokio::test]
    async fn test_risk_config_snapshot() {
        let store = MemoryStore::default();
        let initial = store.risk_config().await.unwrap();
        assert!(!initial.allow_buy);

        let mut updated = initial.clone();
        updated.allow_buy = true;
        updated.budget = dec!(500);
        store.set_risk_config(updated);

        let seen = store.risk_config().await.unwrap();
        assert!(seen.allow_buy);
        assert_eq!(seen.budget, dec!(500));
    }
}
