//! SmartAICopy - AI content optimization with pay-per-use unlocking
//!
//! This library provides the core functionality for the SmartAICopy service:
//! the optimization submission pipeline, the client-side payment flow state
//! machine, payment provider integration, and webhook reconciliation.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod flow;
pub mod handlers;
pub mod id;
pub mod models;
pub mod pagination;
pub mod payments;
pub mod pricing;
pub mod rewrite;
