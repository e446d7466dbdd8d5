//! Score normalization and score-history series building.

use crate::models::{Decisao, ScoreResponse};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Normalizes the ambiguous wire score to a percentage.
///
/// Values above 1 are taken as already-percent, anything else as a 0-1
/// fraction. Missing or non-finite input defaults to 0 instead of
/// propagating.
pub fn score_to_percent(value: Option<f64>) -> f64 {
    let numeric = match value {
        Some(v) if v.is_finite() => v,
        _ => return 0.0,
    };

    let percent = if numeric > 1.0 { numeric } else { numeric * 100.0 };
    (percent * 100.0).round() / 100.0
}

/// Model/version subtitle shown under the score, e.g. "Modelo rf-baseline - v1.0.0".
pub fn score_subtitle(score: Option<&ScoreResponse>) -> String {
    let Some(info) = score else {
        return "Sem dados disponiveis".to_string();
    };

    let mut parts: Vec<String> = Vec::new();
    if let Some(modelo) = info.modelo.as_deref().filter(|m| !m.is_empty()) {
        parts.push(format!("Modelo {}", modelo));
    }
    if let Some(versao) = info.versao.as_deref().filter(|v| !v.is_empty()) {
        parts.push(format!("v{}", versao));
    }

    if parts.is_empty() {
        "Sem detalhes do modelo".to_string()
    } else {
        parts.join(" - ")
    }
}

/// Chart-ready score evolution: one label and one percent value per point,
/// in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreHistory {
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

impl ScoreHistory {
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }
}

/// Merges the score payload's own history with the company's decision scores
/// into one chronologically ordered series.
///
/// Points with a parseable timestamp sort by time; undated points receive
/// synthetic keys that push them after every dated point. Returns `None` when
/// no point at all can be built, which the caller surfaces as "no score
/// history for this company".
pub fn build_score_history(
    score: Option<&ScoreResponse>,
    decisoes: &[Decisao],
    empresa_id: &str,
) -> Option<ScoreHistory> {
    let mut points: BTreeMap<i64, (String, f64)> = BTreeMap::new();
    let mut fallback_key = i64::MAX;

    let mut upsert = |date: Option<NaiveDateTime>,
                      fallback_label: String,
                      raw_value: Option<f64>,
                      points: &mut BTreeMap<i64, (String, f64)>| {
        let numeric = score_to_percent(raw_value);
        let sort_key = match date {
            Some(d) => d.and_utc().timestamp_millis(),
            None => {
                let key = fallback_key;
                fallback_key -= 1;
                key
            }
        };
        let label = match date {
            Some(d) => format_date_label(d),
            None => {
                if fallback_label.is_empty() {
                    format!("P{}", points.len() + 1)
                } else {
                    fallback_label
                }
            }
        };
        points.insert(sort_key, (label, numeric));
    };

    if let Some(info) = score {
        if let Some(historico) = info.historico.as_ref().filter(|h| !h.is_empty()) {
            let timestamps: &[String] = info
                .historico_timestamps
                .as_deref()
                .unwrap_or(&[]);
            for (index, point) in historico.iter().enumerate() {
                let target_date = timestamps.get(index).and_then(|ts| parse_datetime(ts));
                upsert(target_date, format!("P{}", index + 1), *point, &mut points);
            }
        }
    }

    let mut history: Vec<&Decisao> = decisoes
        .iter()
        .filter(|dec| dec.empresa_id == empresa_id)
        .collect();
    history.sort_by_key(|dec| {
        dec.dt_decisao
            .as_deref()
            .and_then(parse_datetime)
            .map(|d| d.and_utc().timestamp_millis())
            .unwrap_or(i64::MIN)
    });

    for dec in history {
        let decision_date = dec.dt_decisao.as_deref().and_then(parse_datetime);
        let fallback_label = dec.dt_decisao.clone().unwrap_or_default();
        upsert(decision_date, fallback_label, dec.score, &mut points);
    }

    if points.is_empty() {
        if let Some(info) = score {
            let date = info
                .ultima_atualizacao_score
                .as_deref()
                .and_then(parse_datetime);
            upsert(date, "Atual".to_string(), info.score, &mut points);
        }
    }

    if points.is_empty() {
        return None;
    }

    let mut categories = Vec::with_capacity(points.len());
    let mut values = Vec::with_capacity(points.len());
    for (label, value) in points.into_values() {
        categories.push(label);
        values.push(value);
    }

    Some(ScoreHistory { categories, values })
}

/// Parses the timestamp shapes the backend emits: RFC 3339, bare
/// `YYYY-MM-DDTHH:MM:SS`, and bare dates.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}

fn format_date_label(date: NaiveDateTime) -> String {
    date.format("%d/%m/%Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decisao(empresa: &str, dt: &str, score: f64) -> Decisao {
        Decisao {
            empresa_id: empresa.to_string(),
            dt_decisao: Some(dt.to_string()),
            score: Some(score),
            ..Default::default()
        }
    }

    #[test]
    fn fraction_scores_become_percentages() {
        assert_eq!(score_to_percent(Some(0.82)), 82.0);
    }

    #[test]
    fn percent_scores_pass_through() {
        assert_eq!(score_to_percent(Some(82.0)), 82.0);
    }

    #[test]
    fn missing_and_non_finite_scores_default_to_zero() {
        assert_eq!(score_to_percent(None), 0.0);
        assert_eq!(score_to_percent(Some(f64::NAN)), 0.0);
        assert_eq!(score_to_percent(Some(f64::INFINITY)), 0.0);
    }

    #[test]
    fn subtitle_joins_model_and_version() {
        let score = ScoreResponse {
            modelo: Some("rf-baseline".to_string()),
            versao: Some("1.0.0".to_string()),
            ..Default::default()
        };
        assert_eq!(score_subtitle(Some(&score)), "Modelo rf-baseline - v1.0.0");
        assert_eq!(score_subtitle(None), "Sem dados disponiveis");
    }

    #[test]
    fn history_merges_decisions_in_date_order() {
        let score = ScoreResponse {
            historico: Some(vec![Some(0.4)]),
            historico_timestamps: Some(vec!["2024-01-10".to_string()]),
            ..Default::default()
        };
        let decisoes = vec![
            decisao("EMP_1", "2024-03-01T12:00:00", 0.6),
            decisao("EMP_1", "2024-02-01T12:00:00", 0.5),
            decisao("EMP_2", "2024-04-01T12:00:00", 0.9),
        ];

        let history = build_score_history(Some(&score), &decisoes, "EMP_1").unwrap();
        assert_eq!(history.values, vec![40.0, 50.0, 60.0]);
        assert_eq!(history.last_value(), Some(60.0));
    }

    #[test]
    fn history_falls_back_to_current_score_point() {
        let score = ScoreResponse {
            score: Some(0.7),
            ..Default::default()
        };
        let history = build_score_history(Some(&score), &[], "EMP_1").unwrap();
        assert_eq!(history.categories, vec!["Atual".to_string()]);
        assert_eq!(history.values, vec![70.0]);
    }

    #[test]
    fn history_without_any_points_is_none() {
        assert!(build_score_history(None, &[], "EMP_1").is_none());
    }
}
