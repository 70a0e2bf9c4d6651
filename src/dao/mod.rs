//! Storage backends.

/// Participant point balances.
pub mod score_store;
/// Storage error types shared by score stores.
pub mod storage;
