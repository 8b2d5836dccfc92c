//! # Domain Module
//!
//! Contains the business logic of the settlement tracker.
//!
//! This module encapsulates the rules for recording livestock settlements and
//! deriving their totals. It works against the storage repositories and knows
//! nothing about HTTP or HTML.
//!
//! ## Module Organization
//!
//! - **cost_allocator**: freight split across (date, partner) groups and
//!   recomputation of derived totals
//! - **transaction_service**: records transactions with their type breakdown
//! - **partner_service**: partner registration and listing
//! - **catalog_service**: active livestock types
//! - **report_service**: display table and per-partner summaries
//! - **export_service**: CSV export of the display table
//!
//! ## Business Rules
//!
//! - `total = total_weight_kg * price_per_kg + freight_cost / n` where n is
//!   the size of the transaction's (date, partner) group
//! - `value_per_unit = total / quantity`
//! - Adding a member to a group recomputes every member of every group
//! - Partner names are trimmed, uppercased and unique

pub mod catalog_service;
pub mod commands;
pub mod cost_allocator;
pub mod errors;
pub mod export_service;
pub mod models;
pub mod partner_service;
pub mod report_service;
pub mod transaction_service;

pub use catalog_service::*;
pub use commands::*;
pub use cost_allocator::*;
pub use errors::*;
pub use export_service::*;
pub use partner_service::*;
pub use report_service::*;
pub use transaction_service::*;
