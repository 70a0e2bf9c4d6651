mod memory;

use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

pub use self::memory::MemoryScoreStore;

/// Abstraction over the point balances of chat participants.
pub trait ScoreStore: Send + Sync {
    /// Add `amount` points to `participant` and return the new balance.
    fn credit(&self, participant: &str, amount: u32) -> BoxFuture<'static, StorageResult<i64>>;
    /// Current balance of `participant` (zero when unknown).
    fn balance(&self, participant: &str) -> BoxFuture<'static, StorageResult<i64>>;
}
