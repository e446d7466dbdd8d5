use crate::circuit_breaker::{create_api_circuit_breaker, ApiCircuitBreaker};
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{
    Decisao, EmpresaSummary, MacroSerieResponse, NovaDecisaoRequest, RedeResponse, ScoreResponse,
};
use failsafe::futures::CircuitBreaker;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Client for the credit-platform core API.
///
/// All reads are idempotent; request failures never panic and map into
/// [`AppError`] so callers can scope them to one UI region.
#[derive(Clone)]
pub struct CoreApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    breaker: Arc<ApiCircuitBreaker>,
}

impl CoreApiClient {
    /// Creates a new `CoreApiClient` from the loaded configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration (base URL, timeout).
    /// * `token` - Optional auth token, sent as a bearer header when present.
    pub fn new(config: &Config, token: Option<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create core API client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token,
            breaker: Arc::new(create_api_circuit_breaker()),
        })
    }

    /// Lists every known company.
    pub async fn list_empresas(&self) -> Result<Vec<EmpresaSummary>, AppError> {
        let url = format!("{}/empresas", self.base_url);
        self.get_json(&url, "empresas").await
    }

    /// Fetches a single company by id or CNPJ.
    pub async fn get_empresa(&self, id_or_cnpj: &str) -> Result<EmpresaSummary, AppError> {
        let url = format!("{}/empresas/{}", self.base_url, id_or_cnpj);
        self.get_json(&url, "empresa").await
    }

    /// Fetches the current score payload for a company.
    pub async fn get_empresa_score(&self, id_or_cnpj: &str) -> Result<ScoreResponse, AppError> {
        let url = format!("{}/empresas/{}/score", self.base_url, id_or_cnpj);
        self.get_json(&url, "score").await
    }

    /// Fetches the relationship network for a company.
    pub async fn get_empresa_rede(&self, id_or_cnpj: &str) -> Result<RedeResponse, AppError> {
        let url = format!("{}/empresas/{}/rede", self.base_url, id_or_cnpj);
        self.get_json(&url, "rede").await
    }

    /// Fetches one or many macro series.
    ///
    /// The `serie` query parameter repeats once per requested alias. The
    /// backend answers with a JSON array for multi-series requests but a bare
    /// object for single-series ones; both shapes are accepted here.
    pub async fn get_macro_series(
        &self,
        series: &[&str],
        from: &str,
        horizonte: u32,
    ) -> Result<Vec<MacroSerieResponse>, AppError> {
        let horizonte_str = horizonte.to_string();
        let mut params: Vec<(&str, &str)> =
            series.iter().map(|serie| ("serie", *serie)).collect();
        params.push(("from", from));
        params.push(("horizonte", horizonte_str.as_str()));

        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(&format!("{}/macro", self.base_url), &params)
            .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        let payload: serde_json::Value = self.get_json(url.as_str(), "macro").await?;

        match payload {
            serde_json::Value::Array(_) => serde_json::from_value(payload).map_err(|e| {
                AppError::InvalidPayload(format!("Failed to parse macro response: {}", e))
            }),
            serde_json::Value::Object(_) => {
                let single: MacroSerieResponse =
                    serde_json::from_value(payload).map_err(|e| {
                        AppError::InvalidPayload(format!("Failed to parse macro response: {}", e))
                    })?;
                Ok(vec![single])
            }
            other => Err(AppError::InvalidPayload(format!(
                "Unexpected macro response shape: {}",
                other
            ))),
        }
    }

    /// Lists decision records, optionally filtered by company.
    pub async fn list_decisoes(
        &self,
        empresa_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Decisao>, AppError> {
        let limit_str = limit.to_string();
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(id) = empresa_id {
            params.push(("empresaId", id));
        }
        params.push(("limit", limit_str.as_str()));

        let url = reqwest::Url::parse_with_params(&format!("{}/decisoes", self.base_url), &params)
            .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        self.get_json(url.as_str(), "decisoes").await
    }

    /// Requests a new credit decision for a company.
    pub async fn create_decisao(&self, empresa_id: &str) -> Result<Decisao, AppError> {
        let url = format!("{}/decisoes", self.base_url);
        tracing::info!("Requesting new decision for empresa {}", empresa_id);

        let body = NovaDecisaoRequest {
            empresa_id: empresa_id.to_string(),
        };

        let request = self
            .request(Method::POST, &url)
            .header("Content-Type", "application/json")
            .json(&body);
        let response = self.dispatch(request).await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Decision creation failed {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::InvalidPayload(format!("Failed to parse created decision: {}", e))
        })
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(ref token) = self.token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder
    }

    /// Sends a request through the circuit breaker. An open circuit rejects
    /// immediately instead of piling more load onto a failing backend.
    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, AppError> {
        match self.breaker.call(request.send()).await {
            Ok(response) => Ok(response),
            Err(failsafe::Error::Inner(e)) => {
                Err(AppError::ExternalApiError(format!("Request failed: {}", e)))
            }
            Err(failsafe::Error::Rejected) => Err(AppError::ExternalApiError(
                "Core API circuit breaker open, request rejected".to_string(),
            )),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T, AppError> {
        tracing::debug!("GET {} ({})", url, what);

        let response = self.dispatch(self.request(Method::GET, url)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("{} not found", what)));
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Core API returned {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::InvalidPayload(format!("Failed to parse {} response: {}", what, e))
        })
    }
}
