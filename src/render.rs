//! Pure state-to-text mapping.
//!
//! Each renderer is a pure function from a panel state to its rendered block;
//! no renderer touches the network or mutates state. The strings mirror the
//! product's pt-BR copy.

use crate::decisoes::DecisaoView;
use crate::macro_chart::MacroChart;
use crate::panels::PanelState;
use crate::rede::{GraphData, GRAPH_OPTIONS};
use crate::score::ScoreHistory;

/// Score card on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ScorePanelData {
    pub percent: f64,
    pub subtitle: String,
    pub faixa: Option<String>,
}

/// Score tab on the company page.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreHistoryData {
    pub percent: Option<f64>,
    pub subtitle: String,
    pub history: ScoreHistory,
}

fn render_state<T>(
    title: &str,
    state: &PanelState<T>,
    loading_text: &str,
    ready: impl Fn(&T) -> String,
) -> String {
    let body = match state {
        PanelState::Initial => "--".to_string(),
        PanelState::Loading => loading_text.to_string(),
        PanelState::Error(msg) => format!("! {}", msg),
        PanelState::Ready(data) => ready(data),
    };
    format!("== {} ==\n{}", title, body)
}

pub fn render_score_panel(state: &PanelState<ScorePanelData>) -> String {
    render_state("Score", state, "Carregando score...", |data| {
        let mut lines = vec![format!("Score atual: {:.1}%", data.percent)];
        if let Some(faixa) = data.faixa.as_deref() {
            lines.push(format!("Faixa: {}", faixa));
        }
        lines.push(data.subtitle.clone());
        lines.join("\n")
    })
}

pub fn render_score_history_panel(state: &PanelState<ScoreHistoryData>) -> String {
    render_state(
        "Score e Historico",
        state,
        "Carregando score...",
        |data| {
            let mut lines = Vec::new();
            match data.percent {
                Some(percent) => lines.push(format!("Score atual: {:.1}%", percent)),
                None => lines.push("Score atual: --%".to_string()),
            }
            lines.push(data.subtitle.clone());
            lines.push("Evolucao do Score:".to_string());
            for (label, value) in data.history.categories.iter().zip(&data.history.values) {
                lines.push(format!("  {}  {:.1}%", label, value));
            }
            lines.join("\n")
        },
    )
}

pub fn render_macro_panel(state: &PanelState<MacroChart>) -> String {
    render_state(
        "Macro (Selic / IPCA / PIB)",
        state,
        "Carregando dados macroeconomicos...",
        |chart| {
            if chart.is_empty() {
                return "Sem dados macroeconomicos.".to_string();
            }

            let mut lines = Vec::new();
            let header = std::iter::once("Data".to_string())
                .chain(chart.series.iter().map(|s| s.name.clone()))
                .collect::<Vec<_>>()
                .join(" | ");
            lines.push(header);

            for (row, label) in chart.categories.iter().enumerate() {
                let values = chart
                    .series
                    .iter()
                    .map(|serie| match serie.data.get(row).copied().flatten() {
                        Some(value) => format!("{:.2}", value),
                        None => "--".to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" | ");
                lines.push(format!("{} | {}", label, values));
            }

            for (name, segment) in &chart.previsoes {
                let points = segment
                    .labels
                    .iter()
                    .zip(&segment.values)
                    .map(|(label, value)| match value {
                        Some(value) => format!("{} {:.2}", label, value),
                        None => format!("{} --", label),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!("Previsao {}: {}", name, points));
            }

            if !chart.fontes.is_empty() {
                lines.push(format!("Fonte: {}", chart.fontes.join("; ")));
            }
            lines.join("\n")
        },
    )
}

pub fn render_rede_panel(state: &PanelState<Option<GraphData>>) -> String {
    render_state(
        "Rede Financeira",
        state,
        "Carregando rede...",
        |graph| match graph {
            None => "Sem dados de rede para esta empresa.".to_string(),
            Some(graph) => {
                let arrow = if GRAPH_OPTIONS.edge_arrows == "to" {
                    "->"
                } else {
                    "--"
                };
                let mut lines = vec![format!(
                    "{} empresas conectadas, {} ligacoes",
                    graph.nodes.len(),
                    graph.edges.len()
                )];
                for node in &graph.nodes {
                    match node.value {
                        Some(value) => lines.push(format!("  ({}) {} [{}]", node.id, node.label, value)),
                        None => lines.push(format!("  ({}) {}", node.id, node.label)),
                    }
                }
                for edge in &graph.edges {
                    match edge.value {
                        Some(value) => {
                            lines.push(format!("  {} {} {} [{}]", edge.from, arrow, edge.to, value))
                        }
                        None => lines.push(format!("  {} {} {}", edge.from, arrow, edge.to)),
                    }
                }
                lines.join("\n")
            }
        },
    )
}

pub fn render_decisoes_panel(state: &PanelState<Vec<DecisaoView>>) -> String {
    render_state(
        "Decisoes",
        state,
        "Carregando decisoes...",
        |rows| {
            if rows.is_empty() {
                return "Nenhuma decisao encontrada para esta empresa.".to_string();
            }

            let mut lines = Vec::new();
            for row in rows {
                lines.push(format!("* {}", row.label));
                lines.push(format!("  Score: {}%", row.score_percent));
                lines.push(format!("  Limite: {}", row.limite_format));
                lines.push(format!("  Data: {}", row.data_format));
                if let Some(motivo) = row.motivo.as_deref() {
                    lines.push(format!("  Motivo: {}", motivo));
                }
            }
            lines.join("\n")
        },
    )
}

pub fn render_alertas_panel(state: &PanelState<Vec<(String, u32)>>) -> String {
    render_state(
        "Resumo de Decisoes",
        state,
        "Carregando resumo...",
        |counts| {
            counts
                .iter()
                .map(|(label, count)| format!("{}: {}", label, count))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}
