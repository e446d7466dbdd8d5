//! Company identifier resolution.
//!
//! Search input arrives as anything from a formatted CNPJ
//! (`12.345.678/0001-95`) to a bare internal code. This module normalizes the
//! input to a canonical identifier and resolves it against the core API:
//! direct lookup first, then a scan of the company list, then per-candidate
//! lookups. Resolution always yields *some* string; an unresolved input is
//! returned unchanged and the caller treats empty follow-up fetches as
//! "company not found".

use crate::api_client::CoreApiClient;
use crate::errors::{AppError, ResultExt};
use crate::models::EmpresaSummary;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Prefix for symbolic company codes used when the input is shorter than a
/// full CNPJ.
pub const SYMBOLIC_PREFIX: &str = "CNPJ_";

/// Normalizes free-text search input to a canonical identifier.
///
/// - 14 or more digits: the last 14, zero-padded, as a CNPJ digit string.
/// - 1 to 13 digits: `CNPJ_` plus the last 5 digits zero-padded to 5.
/// - No digits: the trimmed input upper-cased, treated as an opaque code.
/// - Blank input: `None`. Never fails.
pub fn canonical_identifier(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let digits = digits_of(trimmed);
    if !digits.is_empty() {
        if digits.len() >= 14 {
            let last14 = &digits[digits.len() - 14..];
            return Some(format!("{:0>14}", last14));
        }
        let suffix = &digits[digits.len().saturating_sub(5)..];
        return Some(format!("{}{:0>5}", SYMBOLIC_PREFIX, suffix));
    }

    Some(trimmed.to_uppercase())
}

/// Plausible lookup keys for a raw identifier, deduplicated in insertion
/// order. The order matters: it decides which id wins when more than one
/// candidate matches.
pub fn candidate_identifiers(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let mut raw_candidates = vec![trimmed.to_string(), trimmed.to_uppercase()];

    let digits = digits_of(trimmed);
    if !digits.is_empty() {
        raw_candidates.push(digits.clone());
        let last14 = &digits[digits.len().saturating_sub(14)..];
        raw_candidates.push(format!("{:0>14}", last14));
        let suffix = &digits[digits.len().saturating_sub(5)..];
        raw_candidates.push(format!("{}{:0>5}", SYMBOLIC_PREFIX, suffix));
    }

    let mut candidates: Vec<String> = Vec::new();
    for candidate in raw_candidates {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

fn digits_of(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Resolves user-supplied identifiers to the backend's authoritative company
/// id, with short-lived caches in front of the network.
pub struct EmpresaResolver {
    client: CoreApiClient,
    /// raw trimmed input -> resolved id.
    resolved_cache: Cache<String, String>,
    /// Single-slot cache for the full company list.
    empresas_cache: Cache<(), Arc<Vec<EmpresaSummary>>>,
}

impl EmpresaResolver {
    pub fn new(client: CoreApiClient) -> Self {
        Self {
            client,
            resolved_cache: Cache::builder()
                .time_to_live(Duration::from_secs(600))
                .max_capacity(10_000)
                .build(),
            empresas_cache: Cache::builder()
                .time_to_live(Duration::from_secs(300))
                .max_capacity(1)
                .build(),
        }
    }

    /// The cached company list, fetching it on a cold cache.
    pub async fn empresas(&self) -> Result<Arc<Vec<EmpresaSummary>>, AppError> {
        if let Some(cached) = self.empresas_cache.get(&()).await {
            return Ok(cached);
        }

        let list = Arc::new(
            self.client
                .list_empresas()
                .await
                .context("Fetching company list")?,
        );
        self.empresas_cache.insert((), list.clone()).await;
        Ok(list)
    }

    /// Resolves a raw identifier to the authoritative company id.
    ///
    /// Resolution order, first success wins:
    /// 1. direct lookup of the trimmed input;
    /// 2. scan of the company list against the candidate set (id match, then
    ///    CNPJ match, then digit-only CNPJ match);
    /// 3. direct lookup of each candidate in insertion order.
    ///
    /// Always returns a string; when nothing matches, the trimmed input is
    /// handed back unchanged.
    pub async fn resolve(&self, raw: &str) -> String {
        let trimmed = raw.trim().to_string();
        if trimmed.is_empty() {
            return trimmed;
        }

        if let Some(hit) = self.resolved_cache.get(&trimmed).await {
            tracing::debug!("Resolver cache hit: {} -> {}", trimmed, hit);
            return hit;
        }

        let resolved = self.resolve_uncached(&trimmed).await;
        self.resolved_cache
            .insert(trimmed, resolved.clone())
            .await;
        resolved
    }

    async fn resolve_uncached(&self, trimmed: &str) -> String {
        // 1. Direct lookup of the original input
        match self.client.get_empresa(trimmed).await {
            Ok(empresa) => {
                if let Some(id) = empresa.effective_id() {
                    tracing::debug!("✓ Resolved {} directly -> {}", trimmed, id);
                    return id.to_string();
                }
            }
            Err(e) => {
                tracing::debug!("Direct lookup failed for {}: {}", trimmed, e);
            }
        }

        let candidates = candidate_identifiers(trimmed);

        // 2. Scan the company list
        match self.empresas().await {
            Ok(empresas) => {
                if let Some(id) = scan_empresas(&empresas, &candidates) {
                    tracing::debug!("✓ Resolved {} via list scan -> {}", trimmed, id);
                    return id;
                }
            }
            Err(e) => {
                tracing::warn!("Company list scan unavailable: {}", e);
            }
        }

        // 3. Per-candidate direct lookups
        for candidate in &candidates {
            if let Ok(empresa) = self.client.get_empresa(candidate).await {
                if let Some(id) = empresa.effective_id() {
                    tracing::debug!("✓ Resolved {} via candidate {} -> {}", trimmed, candidate, id);
                    return id.to_string();
                }
            }
        }

        tracing::debug!("Could not resolve {}, returning input unchanged", trimmed);
        trimmed.to_string()
    }
}

/// Scans the company list for a candidate match: case-insensitive id match
/// first, then case-insensitive CNPJ match, then digit-only CNPJ match.
fn scan_empresas(empresas: &[EmpresaSummary], candidates: &[String]) -> Option<String> {
    let lowered: Vec<String> = candidates.iter().map(|c| c.to_lowercase()).collect();

    for empresa in empresas {
        let id = empresa.id.trim();
        if !id.is_empty() && lowered.contains(&id.to_lowercase()) {
            return Some(id.to_string());
        }
    }

    for empresa in empresas {
        if let Some(cnpj) = empresa.cnpj.as_deref().map(str::trim) {
            if !cnpj.is_empty() && lowered.contains(&cnpj.to_lowercase()) {
                return empresa.effective_id().map(|id| id.to_string());
            }
        }
    }

    let digit_candidates: Vec<String> = candidates
        .iter()
        .map(|c| digits_of(c))
        .filter(|d| !d.is_empty())
        .collect();
    for empresa in empresas {
        if let Some(cnpj) = empresa.cnpj.as_deref() {
            let cnpj_digits = digits_of(cnpj);
            if !cnpj_digits.is_empty() && digit_candidates.contains(&cnpj_digits) {
                return empresa.effective_id().map(|id| id.to_string());
            }
        }
    }

    None
}
