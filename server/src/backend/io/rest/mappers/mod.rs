//! Conversions between domain models and the shared DTOs.

pub mod catalog_mapper;
pub mod partner_mapper;
pub mod report_mapper;

pub use catalog_mapper::*;
pub use partner_mapper::*;
pub use report_mapper::*;
