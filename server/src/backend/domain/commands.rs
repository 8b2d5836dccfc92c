//! Domain-level command types.
//! The REST layer parses forms and JSON bodies into these before calling the
//! services, so no stringly-typed input reaches the domain.

pub mod transactions {
    use chrono::NaiveDate;

    use crate::backend::domain::cost_allocator::ReconcileSummary;
    use crate::backend::domain::models::transaction::Transaction;

    /// One livestock-type line submitted with a transaction. Lines missing
    /// either the type or the quantity are skipped by the recorder.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct BreakdownEntry {
        pub type_id: Option<i64>,
        pub quantity: Option<i64>,
        pub notes: Option<String>,
    }

    /// Input for recording a new transaction.
    #[derive(Debug, Clone, PartialEq)]
    pub struct CreateTransactionCommand {
        pub date: NaiveDate,
        pub partner_id: i64,
        pub quantity: i64,
        pub total_weight_kg: f64,
        pub price_per_kg: f64,
        pub freight_cost: f64,
        pub commission: f64,
        pub breakdown: Vec<BreakdownEntry>,
    }

    /// Result of recording a transaction.
    #[derive(Debug, Clone)]
    pub struct TransactionRecorded {
        pub transaction: Transaction,
        pub breakdown_saved: usize,
        pub breakdown_skipped: usize,
        pub breakdown_failed: usize,
        /// None when the follow-up reconciliation could not run at all
        pub reconcile: Option<ReconcileSummary>,
    }
}

pub mod partners {
    /// Input for registering a partner.
    #[derive(Debug, Clone)]
    pub struct CreatePartnerCommand {
        pub name: String,
    }
}

pub mod reports {
    use chrono::NaiveDate;

    /// Narrowing applied to the report table and summaries.
    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    pub struct ReportFilter {
        pub partner_id: Option<i64>,
        pub date: Option<NaiveDate>,
    }
}
