//! # Page Endpoints
//!
//! The HTML report page and the two forms it posts. Writes redirect back to
//! the page (303) with the outcome carried in a flash cookie.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::backend::domain::commands::partners::CreatePartnerCommand;
use crate::backend::domain::commands::reports::ReportFilter;
use crate::backend::domain::errors::DomainError;
use crate::backend::io::rest::flash::{clear_cookie, FlashMessage};
use crate::backend::io::rest::forms::{parse_date, parse_transaction_form, FormFields};
use crate::backend::io::rest::html::{filter_query, render_page, PageView};
use crate::backend::io::rest::mappers::{CatalogMapper, PartnerMapper};
use crate::backend::AppState;

pub const TRANSACTION_SAVED: &str = "✅ Registro guardado correctamente";

/// Page filters as typed by the user; blank or unparseable values mean
/// "no filter"
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub socio_id: Option<String>,
    pub fecha: Option<String>,
}

impl PageQuery {
    pub fn to_filter(&self) -> ReportFilter {
        ReportFilter {
            partner_id: self.socio_id.as_deref().and_then(|v| v.trim().parse().ok()),
            date: self.fecha.as_deref().and_then(parse_date),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CreatePartnerForm {
    #[serde(default)]
    pub nombre: String,
}

fn redirect_with_flash(state: &AppState, location: &str, flash: &FlashMessage) -> Response {
    (
        [(header::SET_COOKIE, state.flash_signer.set_cookie(flash))],
        Redirect::to(location),
    )
        .into_response()
}

/// Render the report page
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    headers: HeaderMap,
) -> Response {
    let filter = query.to_filter();
    info!("GET / - filter: {:?}", filter);

    let flash = state.flash_signer.read(&headers);

    let partners = match state.partner_service.list_partners().await {
        Ok(partners) => partners.into_iter().map(PartnerMapper::to_dto).collect(),
        Err(e) => {
            error!("Failed to list partners: {}", e);
            Vec::new()
        }
    };
    let types = match state.catalog_service.list_active_types().await {
        Ok(types) => types.into_iter().map(CatalogMapper::to_dto).collect(),
        Err(e) => {
            error!("Failed to list livestock types: {}", e);
            Vec::new()
        }
    };
    let report = match state.report_service.build_report(&filter).await {
        Ok(report) => Some(report),
        Err(e) => {
            error!("Failed to build report: {}", e);
            None
        }
    };

    let view = PageView {
        flash: flash.as_ref(),
        partners: &partners,
        types: &types,
        filter,
        table: report.as_ref().map(|r| &r.table),
        summaries: report.as_ref().map(|r| r.summaries.as_slice()).unwrap_or(&[]),
    };

    match render_page(&view) {
        Ok(html) if flash.is_some() => ([(header::SET_COOKIE, clear_cookie())], Html(html)).into_response(),
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error rendering page").into_response()
        }
    }
}

/// Record a transaction from the page form
pub async fn create_transaction(State(state): State<AppState>, Form(pairs): Form<Vec<(String, String)>>) -> Response {
    let fields = FormFields::new(pairs);
    info!(
        "POST / - socio_id={:?}, fecha={:?}",
        fields.get("socio_id"),
        fields.get("fecha")
    );

    let back_to = ReportFilter {
        partner_id: fields.get("socio_id").and_then(|v| v.parse().ok()),
        date: fields.get("fecha").and_then(parse_date),
    };
    let location = format!("/{}", filter_query(&back_to));

    let outcome = match parse_transaction_form(&fields) {
        Ok(command) => state.transaction_service.create_transaction(command).await,
        Err(e) => Err(e),
    };

    let flash = match outcome {
        Ok(recorded) => {
            if recorded.breakdown_failed > 0 {
                warn!(
                    "Transaction id={} saved with {} breakdown lines missing",
                    recorded.transaction.id, recorded.breakdown_failed
                );
            }
            match recorded.reconcile {
                Some(_) => FlashMessage::success(TRANSACTION_SAVED),
                None => FlashMessage::success(format!(
                    "{} (no se pudieron recalcular los totales)",
                    TRANSACTION_SAVED
                )),
            }
        }
        Err(e) => {
            error!("Failed to create transaction: {}", e);
            FlashMessage::danger(format!("❌ Error al guardar registro: {}", e))
        }
    };

    redirect_with_flash(&state, &location, &flash)
}

/// Register a partner from the page form
pub async fn create_partner(State(state): State<AppState>, Form(form): Form<CreatePartnerForm>) -> Response {
    info!("POST /crear_socio - nombre={:?}", form.nombre);

    match state
        .partner_service
        .create_partner(CreatePartnerCommand { name: form.nombre })
        .await
    {
        Ok(partner) => {
            let flash = FlashMessage::success(format!("✅ Socio {} creado", partner.name));
            redirect_with_flash(&state, "/", &flash)
        }
        Err(e @ (DomainError::Validation(_) | DomainError::Conflict(_))) => {
            warn!("Partner rejected: {}", e);
            (super::error_status(&e), format!("⚠️ {}", e)).into_response()
        }
        Err(e) => {
            error!("Failed to create partner: {}", e);
            (super::error_status(&e), format!("❌ Error al crear socio: {}", e)).into_response()
        }
    }
}
