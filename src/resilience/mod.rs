//! Resilience helpers for callers that drive the client in a loop.

pub mod retry;
