//! Core domain types and logic.

pub mod issue;
pub mod ledger;
pub mod reconcile;
pub mod ticket;
pub mod error;
