//! KPI summary view: aggregates over the decision history.

use crate::api_client::CoreApiClient;
use crate::config::Config;
use crate::decisoes::format_brl;
use crate::models::Decisao;
use crate::panels::{CancelToken, Panel, PanelState};
use crate::score::score_to_percent;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct KpiSummary {
    pub total: usize,
    pub aprovadas: usize,
    /// Approval rate in percent.
    pub taxa_aprovacao: f64,
    /// Mean score in percent, over decisions that carry a score.
    pub score_medio: Option<f64>,
    /// Sum of approved credit limits.
    pub limite_aprovado: f64,
}

pub fn kpi_summary(lista: &[Decisao]) -> KpiSummary {
    let total = lista.len();
    let aprovadas = lista
        .iter()
        .filter(|dec| dec.aprovacao.unwrap_or(false))
        .count();

    let scores: Vec<f64> = lista
        .iter()
        .filter(|dec| dec.score.map(f64::is_finite).unwrap_or(false))
        .map(|dec| score_to_percent(dec.score))
        .collect();
    let score_medio = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    let limite_aprovado = lista
        .iter()
        .filter(|dec| dec.aprovacao.unwrap_or(false))
        .filter_map(|dec| dec.limite)
        .filter(|limite| limite.is_finite())
        .sum();

    let taxa_aprovacao = if total == 0 {
        0.0
    } else {
        aprovadas as f64 / total as f64 * 100.0
    };

    KpiSummary {
        total,
        aprovadas,
        taxa_aprovacao,
        score_medio,
        limite_aprovado,
    }
}

pub struct KpisView {
    client: CoreApiClient,
    config: Config,
    pub panel: Panel<KpiSummary>,
    current: Mutex<CancelToken>,
}

impl KpisView {
    pub fn new(client: CoreApiClient, config: Config) -> Self {
        Self {
            client,
            config,
            panel: Panel::new(),
            current: Mutex::new(CancelToken::new()),
        }
    }

    pub async fn load(&self) {
        let token = CancelToken::new();
        {
            let mut current = self
                .current
                .lock()
                .expect("kpis cancel token lock poisoned");
            current.cancel();
            *current = token.clone();
        }
        self.panel.begin();

        match self
            .client
            .list_decisoes(None, self.config.decisoes_limit)
            .await
        {
            Ok(lista) => {
                self.panel
                    .complete(&token, PanelState::Ready(kpi_summary(&lista)));
            }
            Err(e) => {
                tracing::error!("Erro ao carregar KPIs: {}", e);
                self.panel.complete(
                    &token,
                    PanelState::Error("Nao foi possivel carregar os indicadores.".to_string()),
                );
            }
        }
    }

    pub fn render(&self) -> String {
        let body = match self.panel.get() {
            PanelState::Initial => "--".to_string(),
            PanelState::Loading => "Carregando indicadores...".to_string(),
            PanelState::Error(msg) => format!("! {}", msg),
            PanelState::Ready(summary) => {
                let score_medio = match summary.score_medio {
                    Some(score) => format!("{:.1}%", score),
                    None => "--".to_string(),
                };
                [
                    format!("Decisoes analisadas: {}", summary.total),
                    format!(
                        "Aprovacoes: {} ({:.1}%)",
                        summary.aprovadas, summary.taxa_aprovacao
                    ),
                    format!("Score medio: {}", score_medio),
                    format!("Limite aprovado: {}", format_brl(summary.limite_aprovado)),
                ]
                .join("\n")
            }
        };
        format!("== Indicadores ==\n{}", body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decisao(aprovacao: bool, score: Option<f64>, limite: Option<f64>) -> Decisao {
        Decisao {
            empresa_id: "EMP_1".to_string(),
            aprovacao: Some(aprovacao),
            score,
            limite,
            ..Default::default()
        }
    }

    #[test]
    fn summary_aggregates_decisions() {
        let lista = vec![
            decisao(true, Some(0.8), Some(100_000.0)),
            decisao(false, Some(0.4), Some(50_000.0)),
            decisao(true, None, Some(200_000.0)),
            decisao(true, Some(f64::NAN), None),
        ];

        let summary = kpi_summary(&lista);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.aprovadas, 3);
        assert_eq!(summary.taxa_aprovacao, 75.0);
        assert_eq!(summary.score_medio, Some(60.0));
        assert_eq!(summary.limite_aprovado, 300_000.0);
    }

    #[test]
    fn empty_history_has_no_average_score() {
        let summary = kpi_summary(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.taxa_aprovacao, 0.0);
        assert_eq!(summary.score_medio, None);
    }
}
