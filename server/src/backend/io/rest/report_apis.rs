//! # JSON and Export Endpoints
//!
//! Read access to the report, partners and catalog, an on-demand
//! reconciliation trigger, and the CSV download.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use shared::{CreatePartnerRequest, ReportRequest};
use tracing::{error, info};

use crate::backend::domain::commands::partners::CreatePartnerCommand;
use crate::backend::io::rest::error_response;
use crate::backend::io::rest::mappers::{CatalogMapper, PartnerMapper, ReportMapper};
use crate::backend::io::rest::page_apis::PageQuery;
use crate::backend::AppState;

/// Table and summaries as JSON
pub async fn get_report(State(state): State<AppState>, Query(request): Query<ReportRequest>) -> Response {
    info!("GET /api/report - request: {:?}", request);

    match state.report_service.build_report(&ReportMapper::to_filter(request)).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => {
            error!("Failed to build report: {}", e);
            error_response(e)
        }
    }
}

/// List partners ordered by name
pub async fn list_partners(State(state): State<AppState>) -> Response {
    info!("GET /api/socios");

    match state.partner_service.list_partners().await {
        Ok(partners) => (StatusCode::OK, Json(PartnerMapper::to_partner_list_dto(partners))).into_response(),
        Err(e) => {
            error!("Failed to list partners: {}", e);
            error_response(e)
        }
    }
}

/// Register a partner
pub async fn create_partner_json(
    State(state): State<AppState>,
    Json(request): Json<CreatePartnerRequest>,
) -> Response {
    info!("POST /api/socios - request: {:?}", request);

    match state
        .partner_service
        .create_partner(CreatePartnerCommand { name: request.name })
        .await
    {
        Ok(partner) => (StatusCode::CREATED, Json(PartnerMapper::to_create_partner_dto(partner))).into_response(),
        Err(e) => {
            error!("Failed to create partner: {}", e);
            error_response(e)
        }
    }
}

/// Active livestock types
pub async fn list_types(State(state): State<AppState>) -> Response {
    info!("GET /api/tipos");

    match state.catalog_service.list_active_types().await {
        Ok(types) => (StatusCode::OK, Json(CatalogMapper::to_catalog_list_dto(types))).into_response(),
        Err(e) => {
            error!("Failed to list livestock types: {}", e);
            error_response(e)
        }
    }
}

/// Recompute derived values for every stored transaction
pub async fn reconcile(State(state): State<AppState>) -> Response {
    info!("POST /api/recalcular");

    match state.cost_allocator.reconcile_all().await {
        Ok(summary) => (StatusCode::OK, Json(ReportMapper::to_reconcile_dto(summary))).into_response(),
        Err(e) => {
            error!("Reconciliation failed: {}", e);
            error_response(e)
        }
    }
}

/// Download the filtered table as CSV
pub async fn export_csv(State(state): State<AppState>, Query(query): Query<PageQuery>) -> Response {
    let filter = query.to_filter();
    info!("GET /export.csv - filter: {:?}", filter);

    let table = match state.report_service.build_table(&filter).await {
        Ok(table) => table,
        Err(e) => {
            error!("Failed to build table for export: {}", e);
            return error_response(e);
        }
    };

    let today = chrono::Local::now().date_naive();
    match state.export_service.export_table_csv(&table, today) {
        Ok(export) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export.filename),
                ),
            ],
            export.content,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to export CSV: {}", e);
            error_response(e)
        }
    }
}
