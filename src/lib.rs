//! Wallet transaction-processing and risk engine: moves money between
//! accounts under per-account serialization, computes tiered fees, runs
//! fraud/AML/velocity checks ahead of settlement and supports admin-approved
//! reversals via compensating transactions.

pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;

pub use config::Settings;
pub use engine::{Collaborators, WalletEngine};
pub use error::{AppError, Result};
