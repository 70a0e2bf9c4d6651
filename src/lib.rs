//! Library crate for chat-trivia, exposing modules for the binary and integration tests.

pub mod config;
pub mod dao;
pub mod error;
pub mod matcher;
pub mod question;
pub mod scoreboard;
pub mod services;
pub mod sources;
pub mod state;
