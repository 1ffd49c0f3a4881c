//! Application layer containing the core business logic orchestration.
//!
//! `SettlementEngine` holds the pure balance and settlement computations.
//! `LedgerService` is the primary entry point for user actions: it validates
//! them, appends them to the store and builds read views from snapshots.

pub mod engine;
pub mod service;
pub mod session;
pub mod views;
