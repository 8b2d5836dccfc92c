use crate::backend::domain::commands::reports::ReportFilter;
use crate::backend::domain::cost_allocator::ReconcileSummary;
use shared::{ReconcileResponse, ReportRequest};

/// Mapper for report filters and reconciliation results.
pub struct ReportMapper;

impl ReportMapper {
    pub fn to_filter(request: ReportRequest) -> ReportFilter {
        ReportFilter {
            partner_id: request.partner_id,
            date: request.date,
        }
    }

    pub fn to_reconcile_dto(summary: ReconcileSummary) -> ReconcileResponse {
        ReconcileResponse {
            groups: summary.groups,
            updated: summary.updated,
            failed: summary.failed,
        }
    }
}
