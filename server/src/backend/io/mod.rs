//! # IO Module
//!
//! Interface layer between browsers or API clients and the domain logic.
//!
//! Translates HTTP requests (query strings, urlencoded forms, JSON) into
//! domain commands and formats domain results as HTML, JSON or CSV. Domain
//! errors become status codes or flash messages here; nothing below this
//! layer knows about HTTP.
//!
//! ## Supported Operations
//!
//! - **GET /**: report page, filtered by `socio_id` and `fecha`
//! - **POST /**: record a transaction, then redirect back to the page
//! - **POST /crear_socio**: register a partner
//! - **GET /api/report**, **GET|POST /api/socios**, **GET /api/tipos**,
//!   **POST /api/recalcular**: JSON access
//! - **GET /export.csv**: filtered table as CSV

pub mod rest;

pub use rest::*;
