pub mod breakdown;
pub mod livestock_type;
pub mod partner;
pub mod transaction;
