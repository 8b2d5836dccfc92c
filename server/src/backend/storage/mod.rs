//! # Storage Module
//!
//! Handles all data access for the settlement tracker.
//!
//! Persistence itself belongs to the hosted database; this module provides
//! the client side of it. The `RecordStore` trait is the seam: the domain
//! layer only sees typed repositories built on top of it, so the remote
//! REST store and the in-memory store are interchangeable.
//!
//! ## Implementations
//!
//! - **SupabaseStore**: PostgREST over HTTP (reqwest)
//! - **MemoryStore**: in-process tables for local runs and tests

pub mod memory;
pub mod repositories;
pub mod supabase;
pub mod traits;

// Re-export the main types that other modules need
pub use memory::MemoryStore;
pub use repositories::{
    BreakdownRepository,
    CatalogRepository,
    PartnerRepository,
    TransactionRepository,
};
pub use supabase::SupabaseStore;
pub use traits::{Filter, RecordStore, Row, SelectQuery, StoreError, Table};
