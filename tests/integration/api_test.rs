//! API endpoint integration tests
//!
//! Exercises the conversations and messages endpoints against a real Postgres
//! database (`TEST_DATABASE_URL`) with a scripted LLM provider.

#![allow(dead_code)]

mod common;
mod conversations;
mod messages;
