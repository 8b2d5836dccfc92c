//! # Backend Module
//!
//! Contains all non-startup logic of the livestock settlement tracker.
//!
//! This module is the orchestration layer that brings together:
//! - **Domain**: cost allocation, transaction recording, reports and partners
//! - **Storage**: the record store client and typed repositories
//! - **IO**: the HTTP surface (HTML page, JSON API, CSV export)
//!
//! ## Architecture
//!
//! ```text
//! Browser / API client
//!     ↓
//! IO Layer (axum handlers, forms, flash cookies)
//!     ↓
//! Domain Layer (services, cost allocator)
//!     ↓
//! Storage Layer (repositories over a RecordStore)
//! ```

pub mod domain;
pub mod io;
pub mod storage;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::backend::domain::{
    CatalogService, CostAllocator, ExportService, PartnerService, ReportService, TransactionService,
};
use crate::backend::io::rest::flash::FlashSigner;
use crate::backend::storage::{
    BreakdownRepository, CatalogRepository, MemoryStore, PartnerRepository, RecordStore, SupabaseStore,
    TransactionRepository,
};
use crate::config::{AppConfig, StoreBackend};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub transaction_service: TransactionService,
    pub partner_service: PartnerService,
    pub catalog_service: CatalogService,
    pub report_service: ReportService,
    pub export_service: ExportService,
    pub cost_allocator: CostAllocator,
    pub flash_signer: FlashSigner,
}

impl AppState {
    /// Wire every service on top of one record store
    pub fn from_store(store: Arc<dyn RecordStore>, secret_key: &str) -> Result<Self> {
        let flash_signer =
            FlashSigner::new(secret_key).map_err(|e| anyhow::anyhow!("invalid flash signing key: {}", e))?;
        let partner_repository = PartnerRepository::new(store.clone());
        let catalog_repository = CatalogRepository::new(store.clone());
        let transaction_repository = TransactionRepository::new(store.clone());
        let breakdown_repository = BreakdownRepository::new(store);

        let cost_allocator = CostAllocator::new(transaction_repository.clone());

        Ok(Self {
            transaction_service: TransactionService::new(
                transaction_repository.clone(),
                breakdown_repository.clone(),
                cost_allocator.clone(),
            ),
            partner_service: PartnerService::new(partner_repository.clone()),
            catalog_service: CatalogService::new(catalog_repository.clone()),
            report_service: ReportService::new(
                partner_repository,
                catalog_repository,
                transaction_repository,
                breakdown_repository,
            ),
            export_service: ExportService::new(),
            cost_allocator,
            flash_signer,
        })
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up record store");
    let store: Arc<dyn RecordStore> = match config.store.backend() {
        StoreBackend::Supabase => {
            let url = config.store.url.as_deref().context("store url is not configured")?;
            let api_key = config
                .store
                .api_key
                .as_deref()
                .context("store api key is not configured")?;
            info!("Using hosted store at {}", url);
            Arc::new(
                SupabaseStore::new(url, api_key, config.store.timeout()).context("failed to build store client")?,
            )
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; records are lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    info!("Setting up domain services");
    AppState::from_store(store, &config.secret_key)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, static_dir: &Path) -> Router {
    let api_routes = Router::new()
        .route("/report", get(io::get_report))
        .route("/socios", get(io::list_partners).post(io::create_partner_json))
        .route("/tipos", get(io::list_types))
        .route("/recalcular", post(io::reconcile));

    Router::new()
        .route("/", get(io::index).post(io::create_transaction))
        .route("/crear_socio", post(io::create_partner))
        .route("/export.csv", get(io::export_csv))
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
