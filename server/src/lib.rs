//! Livestock settlement tracker: records sales per partner, splits freight
//! across same-day transactions and serves the report over HTTP.

pub mod backend;
pub mod config;
