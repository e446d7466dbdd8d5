//! Dashboard view: score card for the first known company, macro chart,
//! decision summary, and relationship network, each behind its own panel.

use crate::api_client::CoreApiClient;
use crate::config::Config;
use crate::decisoes::decision_summary;
use crate::macro_chart::{build_macro_chart, default_macro_series, match_requested_series, MacroChart};
use crate::panels::{CancelToken, Panel, PanelState};
use crate::rede::{rede_graph_data, GraphData};
use crate::render::{
    render_alertas_panel, render_macro_panel, render_rede_panel, render_score_panel,
    ScorePanelData,
};
use crate::resolver::EmpresaResolver;
use crate::score::{score_subtitle, score_to_percent};
use chrono::Months;
use std::sync::{Arc, Mutex};

pub struct DashboardView {
    client: CoreApiClient,
    resolver: Arc<EmpresaResolver>,
    config: Config,
    pub score: Panel<ScorePanelData>,
    pub macro_panel: Panel<MacroChart>,
    pub alertas: Panel<Vec<(String, u32)>>,
    pub rede: Panel<Option<GraphData>>,
    current: Mutex<CancelToken>,
}

impl DashboardView {
    pub fn new(client: CoreApiClient, resolver: Arc<EmpresaResolver>, config: Config) -> Self {
        Self {
            client,
            resolver,
            config,
            score: Panel::new(),
            macro_panel: Panel::new(),
            alertas: Panel::new(),
            rede: Panel::new(),
            current: Mutex::new(CancelToken::new()),
        }
    }

    /// Runs one full dashboard load. The four regions fetch concurrently and
    /// complete independently; a newer load supersedes this one, whose late
    /// completions are then discarded.
    pub async fn load(&self) {
        let token = self.supersede();

        tokio::join!(
            self.load_empresas_chain(&token),
            self.load_macro(&token),
            self.load_alertas(&token),
        );
    }

    /// View teardown: in-flight completions must not touch state anymore.
    pub fn teardown(&self) {
        self.current
            .lock()
            .expect("dashboard cancel token lock poisoned")
            .cancel();
    }

    /// Search term cleared externally: panels return to their initial state.
    pub fn clear(&self) {
        self.teardown();
        self.score.clear();
        self.macro_panel.clear();
        self.alertas.clear();
        self.rede.clear();
    }

    fn supersede(&self) -> CancelToken {
        let token = CancelToken::new();
        {
            let mut current = self
                .current
                .lock()
                .expect("dashboard cancel token lock poisoned");
            current.cancel();
            *current = token.clone();
        }
        self.score.begin();
        self.macro_panel.begin();
        self.alertas.begin();
        self.rede.begin();
        token
    }

    async fn load_empresas_chain(&self, token: &CancelToken) {
        match self.resolver.empresas().await {
            Ok(lista) => {
                let first_id = lista
                    .first()
                    .and_then(|empresa| empresa.effective_id())
                    .map(str::to_string);

                match first_id {
                    Some(id) => {
                        tokio::join!(self.load_score(token, &id), self.load_rede(token, &id));
                    }
                    None => {
                        let msg = "Nenhuma empresa encontrada.".to_string();
                        self.score.complete(token, PanelState::Error(msg.clone()));
                        self.rede.complete(token, PanelState::Error(msg));
                    }
                }
            }
            Err(e) => {
                tracing::error!("Erro ao buscar empresas: {}", e);
                let msg = "Nao foi possivel carregar as empresas.".to_string();
                self.score.complete(token, PanelState::Error(msg.clone()));
                self.rede.complete(token, PanelState::Error(msg));
            }
        }
    }

    async fn load_score(&self, token: &CancelToken, empresa_id: &str) {
        match self.client.get_empresa_score(empresa_id).await {
            Ok(score) => {
                let data = ScorePanelData {
                    percent: score_to_percent(score.score),
                    subtitle: score_subtitle(Some(&score)),
                    faixa: score.faixa.clone(),
                };
                self.score.complete(token, PanelState::Ready(data));
            }
            Err(e) => {
                tracing::error!("Erro ao carregar score: {}", e);
                self.score.complete(
                    token,
                    PanelState::Error("Nao foi possivel carregar o score.".to_string()),
                );
            }
        }
    }

    async fn load_rede(&self, token: &CancelToken, empresa_id: &str) {
        match self.client.get_empresa_rede(empresa_id).await {
            Ok(response) => {
                self.rede
                    .complete(token, PanelState::Ready(rede_graph_data(&response)));
            }
            Err(e) => {
                tracing::error!("Erro ao carregar rede: {}", e);
                self.rede.complete(
                    token,
                    PanelState::Error("Nao foi possivel carregar a rede.".to_string()),
                );
            }
        }
    }

    async fn load_macro(&self, token: &CancelToken) {
        let series = default_macro_series();
        let from = default_from_date(self.config.macro_window_months);

        match self
            .client
            .get_macro_series(&series, &from, self.config.macro_horizonte)
            .await
        {
            Ok(payload) => {
                let matched = match_requested_series(&series, payload);
                let chart = build_macro_chart(&matched);
                self.macro_panel.complete(token, PanelState::Ready(chart));
            }
            Err(e) => {
                tracing::error!("Erro ao carregar macro: {}", e);
                self.macro_panel.complete(
                    token,
                    PanelState::Error(
                        "Nao foi possivel carregar dados macroeconomicos.".to_string(),
                    ),
                );
            }
        }
    }

    async fn load_alertas(&self, token: &CancelToken) {
        match self
            .client
            .list_decisoes(None, self.config.decisoes_limit)
            .await
        {
            Ok(lista) => {
                self.alertas
                    .complete(token, PanelState::Ready(decision_summary(&lista)));
            }
            Err(e) => {
                tracing::error!("Erro ao carregar alertas: {}", e);
                self.alertas.complete(
                    token,
                    PanelState::Error(
                        "Nao foi possivel carregar o resumo das decisoes.".to_string(),
                    ),
                );
            }
        }
    }

    /// Renders the whole dashboard from the current panel states.
    pub fn render(&self) -> String {
        [
            render_score_panel(&self.score.get()),
            render_macro_panel(&self.macro_panel.get()),
            render_alertas_panel(&self.alertas.get()),
            render_rede_panel(&self.rede.get()),
        ]
        .join("\n\n")
    }
}

/// Start of the macro window: today minus the configured number of months,
/// as an ISO date.
pub fn default_from_date(window_months: u32) -> String {
    let today = chrono::Utc::now().date_naive();
    today
        .checked_sub_months(Months::new(window_months))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}
