use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;

use super::ScoreStore;
use crate::dao::storage::{StorageError, StorageResult};

/// Process-local balances keyed by participant name.
#[derive(Clone, Default)]
pub struct MemoryScoreStore {
    balances: Arc<DashMap<String, i64>>,
}

impl MemoryScoreStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn credit_now(&self, participant: &str, amount: u32) -> StorageResult<i64> {
        let mut balance = self.balances.entry(participant.to_owned()).or_insert(0);
        *balance = balance
            .checked_add(i64::from(amount))
            .ok_or_else(|| StorageError::Overflow {
                participant: participant.to_owned(),
            })?;
        Ok(*balance)
    }
}

impl ScoreStore for MemoryScoreStore {
    fn credit(&self, participant: &str, amount: u32) -> BoxFuture<'static, StorageResult<i64>> {
        let result = self.credit_now(participant, amount);
        Box::pin(async move { result })
    }

    fn balance(&self, participant: &str) -> BoxFuture<'static, StorageResult<i64>> {
        let balance = self
            .balances
            .get(participant)
            .map(|entry| *entry)
            .unwrap_or(0);
        Box::pin(async move { Ok(balance) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn credit_accumulates_per_participant() {
        let store = MemoryScoreStore::new();
        assert_eq!(store.credit("user", 50).await.unwrap(), 50);
        assert_eq!(store.credit("user", 25).await.unwrap(), 75);
        assert_eq!(store.balance("user").await.unwrap(), 75);
        assert_eq!(store.balance("other").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn zero_credit_creates_account() {
        let store = MemoryScoreStore::new();
        assert_eq!(store.credit("user", 0).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn overflow_is_reported() {
        let store = MemoryScoreStore::new();
        store.balances.insert("rich".into(), i64::MAX);
        assert!(matches!(
            store.credit("rich", 1).await,
            Err(StorageError::Overflow { .. })
        ));
    }
}
