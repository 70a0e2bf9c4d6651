//! Engine orchestration on top of the shared state.

/// Start, stop and skip commands.
pub mod commands;
/// Outbound chat capability.
pub mod chat;
/// Question lifecycle orchestration around the session lock.
pub mod engine;
/// User-visible chat text.
pub mod messages;
/// Periodic tick and supervisor loops.
pub mod scheduler;
