//! Company detail view: score history, relationship network, and decisions,
//! one tab at a time, all fetched against the resolved company id.

use crate::api_client::CoreApiClient;
use crate::config::Config;
use crate::decisoes::{decisoes_view, DecisaoView};
use crate::panels::{CancelToken, Panel, PanelState};
use crate::rede::{rede_graph_data, GraphData};
use crate::render::{
    render_decisoes_panel, render_rede_panel, render_score_history_panel, ScoreHistoryData,
};
use crate::resolver::EmpresaResolver;
use crate::route::{display_identifier, return_term, Route, Tab, TabSelection};
use crate::score::{build_score_history, score_subtitle, score_to_percent};
use std::sync::{Arc, Mutex};

pub struct EmpresaView {
    client: CoreApiClient,
    resolver: Arc<EmpresaResolver>,
    config: Config,
    /// Identifier as it appeared in the route, before resolution.
    pub identifier: String,
    pub selection: TabSelection,
    /// Search term carried in the query string, restored on back-navigation.
    pub term: Option<String>,
    pub score: Panel<ScoreHistoryData>,
    pub rede: Panel<Option<GraphData>>,
    pub decisoes: Panel<Vec<DecisaoView>>,
    current: Mutex<CancelToken>,
}

impl EmpresaView {
    pub fn new(
        client: CoreApiClient,
        resolver: Arc<EmpresaResolver>,
        config: Config,
        identifier: String,
        selection: TabSelection,
        term: Option<String>,
    ) -> Self {
        Self {
            client,
            resolver,
            config,
            identifier,
            selection,
            term,
            score: Panel::new(),
            rede: Panel::new(),
            decisoes: Panel::new(),
            current: Mutex::new(CancelToken::new()),
        }
    }

    /// Resolves the route identifier once, then loads the three tabs
    /// concurrently. Each tab completes on its own; a failure in one never
    /// blocks the others.
    pub async fn load(&self) {
        let token = self.supersede();

        let resolved = self.resolver.resolve(&self.identifier).await;
        tracing::debug!("Empresa {} resolved to {}", self.identifier, resolved);

        tokio::join!(
            self.load_score_historico(&token, &resolved),
            self.load_rede(&token, &resolved),
            self.load_decisoes(&token, &resolved),
        );
    }

    pub fn teardown(&self) {
        self.current
            .lock()
            .expect("empresa cancel token lock poisoned")
            .cancel();
    }

    fn supersede(&self) -> CancelToken {
        let token = CancelToken::new();
        {
            let mut current = self
                .current
                .lock()
                .expect("empresa cancel token lock poisoned");
            current.cancel();
            *current = token.clone();
        }
        self.score.begin();
        self.rede.begin();
        self.decisoes.begin();
        token
    }

    async fn load_score_historico(&self, token: &CancelToken, empresa_id: &str) {
        let score = match self.client.get_empresa_score(empresa_id).await {
            Ok(score) => Some(score),
            Err(e) => {
                tracing::error!("Erro ao carregar score: {}", e);
                None
            }
        };
        let decisoes = match self
            .client
            .list_decisoes(Some(empresa_id), self.config.decisoes_limit)
            .await
        {
            Ok(lista) => lista,
            Err(e) => {
                tracing::warn!("Erro ao carregar decisoes do historico: {}", e);
                Vec::new()
            }
        };

        // An id that resolves nowhere shows up here as empty fetches.
        if score.is_none() && decisoes.is_empty() {
            self.score.complete(
                token,
                PanelState::Error("Empresa nao encontrada.".to_string()),
            );
            return;
        }

        match build_score_history(score.as_ref(), &decisoes, empresa_id) {
            Some(history) => {
                let percent = match score.as_ref() {
                    Some(info) => Some(score_to_percent(info.score)),
                    None => history.last_value(),
                };
                let data = ScoreHistoryData {
                    percent,
                    subtitle: score_subtitle(score.as_ref()),
                    history,
                };
                self.score.complete(token, PanelState::Ready(data));
            }
            None => {
                self.score.complete(
                    token,
                    PanelState::Error(
                        "Nao foi possivel encontrar historico de score para esta empresa."
                            .to_string(),
                    ),
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
                    PanelState::Error(
                        "Nao foi possivel carregar a rede desta empresa.".to_string(),
                    ),
                );
            }
        }
    }

    async fn load_decisoes(&self, token: &CancelToken, empresa_id: &str) {
        match self
            .client
            .list_decisoes(Some(empresa_id), self.config.decisoes_limit)
            .await
        {
            Ok(lista) => {
                let rows = decisoes_view(&lista, empresa_id);
                self.decisoes.complete(token, PanelState::Ready(rows));
            }
            Err(e) => {
                tracing::error!("Erro ao carregar decisoes: {}", e);
                self.decisoes.complete(
                    token,
                    PanelState::Error("Nao foi possivel carregar as decisoes.".to_string()),
                );
            }
        }
    }

    /// Dashboard route to return to, with the search term restored.
    pub fn back_route(&self) -> Route {
        Route::Dashboard {
            term: return_term(self.term.as_deref(), &self.identifier),
        }
    }

    /// Renders the heading plus the selected tab (or the focused tab in solo
    /// mode).
    pub fn render(&self) -> String {
        let mut sections = vec![format!("Empresa {}", display_identifier(&self.identifier))];

        if self.selection.solo {
            sections.push(self.selection.selected.solo_title().to_string());
        } else {
            let tabs = [Tab::Score, Tab::Rede, Tab::Decisoes]
                .iter()
                .map(|tab| {
                    if *tab == self.selection.selected {
                        format!("[{}]", tab.key())
                    } else {
                        tab.key().to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join("  ");
            sections.push(tabs);
        }

        let panel = match self.selection.selected {
            Tab::Score => render_score_history_panel(&self.score.get()),
            Tab::Rede => render_rede_panel(&self.rede.get()),
            Tab::Decisoes => render_decisoes_panel(&self.decisoes.get()),
        };
        sections.push(panel);

        sections.join("\n\n")
    }
}
