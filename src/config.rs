use serde::Deserialize;

/// Default base URL used in development when `CREDITO_API_URL` is not set.
/// Production deployments point this at the same-origin `/api` path behind
/// their proxy, e.g. `https://painel.example.com/api/v1`.
const DEV_API_BASE_URL: &str = "http://localhost:8080/api/v1";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub macro_horizonte: u32,
    pub macro_window_months: u32,
    pub decisoes_limit: u32,
    pub token_path: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            api_base_url: std::env::var("CREDITO_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("CREDITO_API_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })
                .transpose()?
                .unwrap_or_else(|| DEV_API_BASE_URL.to_string()),
            request_timeout_secs: std::env::var("CREDITO_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("CREDITO_REQUEST_TIMEOUT_SECS must be a valid number")
                })?,
            macro_horizonte: std::env::var("CREDITO_MACRO_HORIZONTE")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CREDITO_MACRO_HORIZONTE must be a valid number"))?,
            macro_window_months: std::env::var("CREDITO_MACRO_WINDOW_MONTHS")
                .unwrap_or_else(|_| "12".to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("CREDITO_MACRO_WINDOW_MONTHS must be a valid number")
                })?,
            decisoes_limit: std::env::var("CREDITO_DECISOES_LIMIT")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("CREDITO_DECISOES_LIMIT must be a valid number"))?,
            token_path: std::env::var("CREDITO_TOKEN_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| ".pj_token".to_string()),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Core API base URL: {}", config.api_base_url);
        tracing::debug!("Request timeout: {}s", config.request_timeout_secs);
        tracing::debug!(
            "Macro window: {} months, horizon {}",
            config.macro_window_months,
            config.macro_horizonte
        );

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEV_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            macro_horizonte: 6,
            macro_window_months: 12,
            decisoes_limit: 50,
            token_path: ".pj_token".to_string(),
        }
    }
}
