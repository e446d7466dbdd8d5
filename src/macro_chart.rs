//! Macro series reconciliation.
//!
//! Each requested macro indicator (selic, ipca, pib) comes back with its own
//! historical and forecast timestamp axes. The chart widget wants one sorted
//! category axis shared by every series, with `null` in the slots a series
//! does not cover. This module matches responses back to the requested
//! aliases, builds the unified axis, and aligns every series to it.

use crate::models::MacroSerieResponse;
use crate::score::parse_datetime;

/// Display names for the macro series the dashboard requests by default.
pub const MACRO_SERIES_CONFIG: &[(&str, &str)] = &[
    ("selic", "Selic (%)"),
    ("ipca", "IPCA (%)"),
    ("pib", "PIB (%)"),
];

/// Aliases requested by the dashboard macro panel.
pub fn default_macro_series() -> Vec<&'static str> {
    MACRO_SERIES_CONFIG.iter().map(|(id, _)| *id).collect()
}

/// One chart line: display name plus values aligned to the shared category
/// axis (`None` marks a label the series does not cover).
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub data: Vec<Option<f64>>,
}

/// Chart-ready merge result for the macro panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MacroChart {
    pub series: Vec<LineSeries>,
    pub categories: Vec<String>,
    /// Forecast continuation per series, linked to the historical segment.
    pub previsoes: Vec<(String, SeriesSegment)>,
    /// Deduplicated source attributions, first-seen order.
    pub fontes: Vec<String>,
}

impl MacroChart {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// A contiguous run of points from one series, used to hand the forecast
/// continuation to the renderer separately from the historical line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesSegment {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

/// Matches response entries back to the requested aliases.
///
/// Entries are keyed case-insensitively by `serieId`, falling back to
/// `requestedSerie`. Requested aliases come first (paired with `None` when the
/// backend returned nothing for them), then keyed extras the caller did not
/// ask for, then unkeyed fallback entries as `serie_N`.
pub fn match_requested_series(
    requested: &[&str],
    payload: Vec<MacroSerieResponse>,
) -> Vec<(String, Option<MacroSerieResponse>)> {
    let mut keyed: Vec<(String, MacroSerieResponse)> = Vec::new();
    let mut fallback: Vec<(String, Option<MacroSerieResponse>)> = Vec::new();

    for item in payload {
        let key = item
            .serie_id
            .as_deref()
            .or(item.requested_serie.as_deref())
            .unwrap_or("")
            .to_lowercase();
        if key.is_empty() {
            fallback.push((format!("serie_{}", fallback.len()), Some(item)));
        } else {
            keyed.push((key, item));
        }
    }

    let mut mapped: Vec<(String, Option<MacroSerieResponse>)> = Vec::new();
    for requested_id in requested {
        let wanted = requested_id.to_lowercase();
        let found = keyed
            .iter()
            .position(|(key, _)| *key == wanted)
            .map(|index| keyed.remove(index).1);
        mapped.push((requested_id.to_string(), found));
    }

    // Keyed extras the caller did not request are still charted.
    for (key, item) in keyed {
        mapped.push((key, Some(item)));
    }

    mapped.extend(fallback);
    mapped
}

/// Canonical category label: ISO date truncated to day when parseable, the
/// raw text otherwise.
pub fn format_macro_label(value: &str) -> String {
    match parse_datetime(value) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => value.to_string(),
    }
}

/// Merges matched series into one chart dataset on a shared sorted axis.
///
/// Series missing their historical value or timestamp arrays contribute no
/// points and are silently excluded. For a label covered by both segments of
/// one series, the historical value wins.
pub fn build_macro_chart(entries: &[(String, Option<MacroSerieResponse>)]) -> MacroChart {
    let valid: Vec<(&str, &MacroSerieResponse)> = entries
        .iter()
        .filter_map(|(id, data)| data.as_ref().map(|d| (id.as_str(), d)))
        .filter(|(_, data)| data.serie.is_some() && data.historico_timestamps.is_some())
        .collect();

    if valid.is_empty() {
        return MacroChart::default();
    }

    let mut categories: Vec<String> = Vec::new();
    for (_, data) in &valid {
        for ts in data.historico_timestamps.as_deref().unwrap_or(&[]) {
            let label = format_macro_label(ts);
            if !categories.contains(&label) {
                categories.push(label);
            }
        }
        for ts in data.forecast_timestamps.as_deref().unwrap_or(&[]) {
            let label = format_macro_label(ts);
            if !categories.contains(&label) {
                categories.push(label);
            }
        }
    }

    categories.sort_by(|a, b| match (parse_datetime(a), parse_datetime(b)) {
        (Some(da), Some(db)) => da.cmp(&db).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    });

    let mut series = Vec::with_capacity(valid.len());
    let mut previsoes: Vec<(String, SeriesSegment)> = Vec::new();
    let mut fontes: Vec<String> = Vec::new();

    for (id, data) in &valid {
        let historico = labeled_values(
            data.historico_timestamps.as_deref().unwrap_or(&[]),
            data.serie.as_deref().unwrap_or(&[]),
        );
        let forecast = labeled_values(
            data.forecast_timestamps.as_deref().unwrap_or(&[]),
            data.forecast.as_deref().unwrap_or(&[]),
        );

        let dataset = categories
            .iter()
            .map(|label| {
                lookup(&historico, label)
                    .or_else(|| lookup(&forecast, label))
            })
            .collect();

        let name = resolve_macro_label(id, data.descricao.as_deref());
        if let Some(segment) = forecast_segment(data) {
            previsoes.push((name.clone(), segment));
        }
        series.push(LineSeries {
            name,
            data: dataset,
        });

        if let Some(fonte) = data.fonte.as_deref().filter(|f| !f.is_empty()) {
            if !fontes.iter().any(|known| known == fonte) {
                fontes.push(fonte.to_string());
            }
        }
    }

    MacroChart {
        series,
        categories,
        previsoes,
        fontes,
    }
}

/// Display name for a series: configured label for recognized ids, then the
/// payload description, then the upper-cased id.
pub fn resolve_macro_label(id: &str, descricao: Option<&str>) -> String {
    let lowered = id.to_lowercase();
    if let Some((_, label)) = MACRO_SERIES_CONFIG
        .iter()
        .find(|(config_id, _)| *config_id == lowered)
    {
        return label.to_string();
    }
    if let Some(descricao) = descricao.filter(|d| !d.is_empty()) {
        return descricao.to_string();
    }
    id.to_uppercase()
}

/// Forecast continuation for one series: the forecast points with the last
/// historical point prepended, unless the boundary labels already match
/// (avoids a duplicate point while keeping the rendered line continuous).
pub fn forecast_segment(data: &MacroSerieResponse) -> Option<SeriesSegment> {
    let historico = labeled_values(
        data.historico_timestamps.as_deref().unwrap_or(&[]),
        data.serie.as_deref().unwrap_or(&[]),
    );
    let forecast = labeled_values(
        data.forecast_timestamps.as_deref().unwrap_or(&[]),
        data.forecast.as_deref().unwrap_or(&[]),
    );

    if forecast.is_empty() {
        return None;
    }

    let mut labels: Vec<String> = Vec::with_capacity(forecast.len() + 1);
    let mut values: Vec<Option<f64>> = Vec::with_capacity(forecast.len() + 1);

    if let Some((last_label, last_value)) = historico.last() {
        if *last_label != forecast[0].0 {
            labels.push(last_label.clone());
            values.push(Some(*last_value));
        }
    }

    for (label, value) in forecast {
        labels.push(label);
        values.push(Some(value));
    }

    Some(SeriesSegment { labels, values })
}

/// Pairs timestamps with their finite values, dropping slots whose value is
/// missing or non-finite.
fn labeled_values(timestamps: &[String], values: &[Option<f64>]) -> Vec<(String, f64)> {
    timestamps
        .iter()
        .enumerate()
        .filter_map(|(index, ts)| {
            let value = values.get(index).copied().flatten()?;
            if !value.is_finite() {
                return None;
            }
            Some((format_macro_label(ts), value))
        })
        .collect()
}

fn lookup(pairs: &[(String, f64)], label: &str) -> Option<f64> {
    pairs
        .iter()
        .find(|(known, _)| known == label)
        .map(|(_, value)| *value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serie(
        id: &str,
        historico: &[(&str, f64)],
        forecast: &[(&str, f64)],
    ) -> MacroSerieResponse {
        MacroSerieResponse {
            serie_id: Some(id.to_string()),
            serie: Some(historico.iter().map(|(_, v)| Some(*v)).collect()),
            historico_timestamps: Some(historico.iter().map(|(ts, _)| ts.to_string()).collect()),
            forecast: Some(forecast.iter().map(|(_, v)| Some(*v)).collect()),
            forecast_timestamps: Some(forecast.iter().map(|(ts, _)| ts.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn disjoint_series_share_the_sorted_union_axis() {
        let entries = vec![
            (
                "selic".to_string(),
                Some(serie("selic", &[("2024-01-01", 10.5)], &[])),
            ),
            (
                "ipca".to_string(),
                Some(serie("ipca", &[("2024-02-01", 4.2)], &[])),
            ),
        ];

        let chart = build_macro_chart(&entries);
        assert_eq!(chart.categories, vec!["2024-01-01", "2024-02-01"]);
        assert_eq!(chart.series[0].data, vec![Some(10.5), None]);
        assert_eq!(chart.series[1].data, vec![None, Some(4.2)]);
    }

    #[test]
    fn historical_value_wins_over_forecast_for_shared_label() {
        let entries = vec![(
            "selic".to_string(),
            Some(serie(
                "selic",
                &[("2024-01-01", 10.5)],
                &[("2024-01-01", 99.0), ("2024-02-01", 10.0)],
            )),
        )];

        let chart = build_macro_chart(&entries);
        assert_eq!(chart.series[0].data, vec![Some(10.5), Some(10.0)]);

        // The continuation segment keeps the historical boundary point once
        let (name, segment) = &chart.previsoes[0];
        assert_eq!(name, "Selic (%)");
        assert_eq!(segment.labels, vec!["2024-01-01", "2024-02-01"]);
    }

    #[test]
    fn degenerate_series_are_excluded_without_failing() {
        let broken = MacroSerieResponse {
            serie_id: Some("pib".to_string()),
            ..Default::default()
        };
        let entries = vec![
            ("pib".to_string(), Some(broken)),
            (
                "selic".to_string(),
                Some(serie("selic", &[("2024-01-01", 10.5)], &[])),
            ),
        ];

        let chart = build_macro_chart(&entries);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].name, "Selic (%)");
    }

    #[test]
    fn non_finite_values_never_enter_the_chart() {
        let response = MacroSerieResponse {
            serie_id: Some("selic".to_string()),
            serie: Some(vec![Some(f64::NAN), Some(10.0), None]),
            historico_timestamps: Some(vec![
                "2024-01-01".to_string(),
                "2024-02-01".to_string(),
                "2024-03-01".to_string(),
            ]),
            ..Default::default()
        };

        let chart = build_macro_chart(&[("selic".to_string(), Some(response))]);
        assert_eq!(chart.categories, vec!["2024-01-01", "2024-02-01", "2024-03-01"]);
        assert_eq!(chart.series[0].data, vec![None, Some(10.0), None]);
    }

    #[test]
    fn unparseable_labels_sort_lexicographically_after_dates() {
        let response = serie(
            "selic",
            &[("T3", 1.0), ("2024-05-01", 2.0), ("T1", 3.0)],
            &[],
        );

        let chart = build_macro_chart(&[("selic".to_string(), Some(response))]);
        assert_eq!(chart.categories, vec!["2024-05-01", "T1", "T3"]);
    }

    #[test]
    fn matching_honors_serie_id_and_requested_serie_case_insensitively() {
        let by_id = MacroSerieResponse {
            serie_id: Some("SELIC".to_string()),
            ..Default::default()
        };
        let by_request = MacroSerieResponse {
            requested_serie: Some("Ipca".to_string()),
            ..Default::default()
        };
        let unkeyed = MacroSerieResponse::default();
        let extra = MacroSerieResponse {
            serie_id: Some("cambio".to_string()),
            ..Default::default()
        };

        let matched =
            match_requested_series(&["selic", "ipca"], vec![by_id, by_request, unkeyed, extra]);

        let keys: Vec<&str> = matched.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(keys, vec!["selic", "ipca", "cambio", "serie_0"]);
        assert!(matched[0].1.is_some());
        assert!(matched[1].1.is_some());
    }

    #[test]
    fn missing_requested_series_map_to_none() {
        let matched = match_requested_series(&["selic"], Vec::new());
        assert_eq!(matched.len(), 1);
        assert!(matched[0].1.is_none());
    }

    #[test]
    fn forecast_segment_prepends_last_historical_point() {
        let data = serie(
            "selic",
            &[("2024-01-01", 10.5), ("2024-02-01", 10.25)],
            &[("2024-03-01", 10.0)],
        );

        let segment = forecast_segment(&data).unwrap();
        assert_eq!(segment.labels, vec!["2024-02-01", "2024-03-01"]);
        assert_eq!(segment.values, vec![Some(10.25), Some(10.0)]);
    }

    #[test]
    fn forecast_segment_skips_duplicate_boundary_label() {
        let data = serie(
            "selic",
            &[("2024-02-01", 10.25)],
            &[("2024-02-01", 10.25), ("2024-03-01", 10.0)],
        );

        let segment = forecast_segment(&data).unwrap();
        assert_eq!(segment.labels, vec!["2024-02-01", "2024-03-01"]);
    }

    #[test]
    fn macro_labels_truncate_to_day() {
        assert_eq!(format_macro_label("2024-01-15T12:30:00"), "2024-01-15");
        assert_eq!(format_macro_label("sem data"), "sem data");
    }
}
