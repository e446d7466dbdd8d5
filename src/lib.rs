//! Painel de Crédito PJ
//!
//! Terminal client for the business-credit analytics platform: searches a
//! company by id or CNPJ, resolves it against the core API, and renders the
//! dashboard panels (score, macro indicators, relationship network, credit
//! decisions) from independent view-state stores.
//!
//! # Modules
//!
//! - `api_client`: Core API HTTP client.
//! - `auth`: Local auth-token store.
//! - `circuit_breaker`: Circuit breaker for outbound API calls.
//! - `config`: Configuration management.
//! - `dashboard`: Dashboard view component.
//! - `decisoes`: Decision list views and summaries.
//! - `empresa`: Company detail view component.
//! - `errors`: Error handling types.
//! - `kpis`: KPI summary view.
//! - `macro_chart`: Macro series reconciliation.
//! - `models`: Core API payload models.
//! - `panels`: Panel state machine and cancellation.
//! - `rede`: Relationship-network graph adaptation.
//! - `render`: Pure state-to-text renderers.
//! - `resolver`: Company identifier normalization and resolution.
//! - `route`: Route and query-parameter state.
//! - `score`: Score normalization and history series.

pub mod api_client;
pub mod auth;
pub mod circuit_breaker;
pub mod config;
pub mod dashboard;
pub mod decisoes;
pub mod empresa;
pub mod errors;
pub mod kpis;
pub mod macro_chart;
pub mod models;
pub mod panels;
pub mod rede;
pub mod render;
pub mod resolver;
pub mod route;
pub mod score;
