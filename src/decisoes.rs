//! Decision list views and the dashboard decision summary.

use crate::models::Decisao;
use crate::score::{parse_datetime, score_to_percent};

/// One rendered row of the decisions panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisaoView {
    pub id: i64,
    pub label: String,
    pub motivo: Option<String>,
    /// Score as a percent string with one decimal, e.g. "82.0".
    pub score_percent: String,
    /// Credit limit formatted as BRL.
    pub limite_format: String,
    /// Decision timestamp as dd/mm/yyyy hh:mm, "--" when unparseable.
    pub data_format: String,
}

/// Decision label with the approval-flag fallback.
pub fn decisao_label(dec: &Decisao) -> String {
    match dec.decisao.as_deref().filter(|d| !d.is_empty()) {
        Some(label) => label.to_string(),
        None => {
            if dec.aprovacao.unwrap_or(false) {
                "APROVADO".to_string()
            } else {
                "REPROVADO".to_string()
            }
        }
    }
}

/// Rows for one company: filtered by the resolved id, newest first.
pub fn decisoes_view(lista: &[Decisao], empresa_id: &str) -> Vec<DecisaoView> {
    let mut filtered: Vec<&Decisao> = lista
        .iter()
        .filter(|dec| dec.empresa_id == empresa_id)
        .collect();
    filtered.sort_by_key(|dec| {
        std::cmp::Reverse(
            dec.dt_decisao
                .as_deref()
                .and_then(parse_datetime)
                .map(|d| d.and_utc().timestamp_millis())
                .unwrap_or(i64::MIN),
        )
    });

    filtered
        .into_iter()
        .map(|dec| DecisaoView {
            id: dec.id,
            label: decisao_label(dec),
            motivo: dec.motivo.clone(),
            score_percent: format!("{:.1}", score_to_percent(dec.score)),
            limite_format: format_brl(dec.limite.unwrap_or(0.0)),
            data_format: format_decisao_date(dec.dt_decisao.as_deref()),
        })
        .collect()
}

/// Counts decisions per label for the dashboard summary chart, first-seen
/// order. An empty list yields a single "Sem dados" bucket so the chart never
/// renders without categories.
pub fn decision_summary(lista: &[Decisao]) -> Vec<(String, u32)> {
    let mut counts: Vec<(String, u32)> = Vec::new();
    for dec in lista {
        let label = decisao_label(dec);
        match counts.iter_mut().find(|(known, _)| *known == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    if counts.is_empty() {
        counts.push(("Sem dados".to_string(), 0));
    }
    counts
}

/// Formats a value as BRL the way the browser's pt-BR locale does:
/// `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let safe = if value.is_finite() { value } else { 0.0 };
    let negative = safe < 0.0;
    let cents = (safe.abs() * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, ch) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, frac)
}

fn format_decisao_date(value: Option<&str>) -> String {
    match value.and_then(parse_datetime) {
        Some(date) => date.format("%d/%m/%Y %H:%M").to_string(),
        None => "--".to_string(),
    }
}
