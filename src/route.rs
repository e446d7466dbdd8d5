//! Route and query-parameter state.
//!
//! View state that survives reloads lives in the path and query string:
//! which company is open, which tab is selected, whether a tab is focused in
//! solo mode, and the search term to restore on back-navigation. Parsing and
//! serialization are inverse pure functions so views never hand-build paths.

use crate::resolver::canonical_identifier;
use regex::Regex;

/// Company detail tabs, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Score,
    Rede,
    Decisoes,
}

impl Tab {
    pub fn key(&self) -> &'static str {
        match self {
            Tab::Score => "score",
            Tab::Rede => "rede",
            Tab::Decisoes => "decisoes",
        }
    }

    /// Heading used when the tab is focused in solo mode.
    pub fn solo_title(&self) -> &'static str {
        match self {
            Tab::Score => "Score e Historico",
            Tab::Rede => "Rede Financeira",
            Tab::Decisoes => "Decisoes",
        }
    }

    /// Case-insensitive key normalization; unknown keys are rejected.
    pub fn from_raw(raw: &str) -> Option<Tab> {
        match raw.trim().to_lowercase().as_str() {
            "score" => Some(Tab::Score),
            "rede" => Some(Tab::Rede),
            "decisoes" => Some(Tab::Decisoes),
            _ => None,
        }
    }
}

/// Selected tab plus solo-mode flag, derived from the `tab`/`focus` query
/// parameters. `focus` wins over `tab`; invalid keys fall back to the first
/// tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabSelection {
    pub selected: Tab,
    pub solo: bool,
}

pub fn tab_selection(tab: Option<&str>, focus: Option<&str>) -> TabSelection {
    if let Some(focused) = focus.and_then(Tab::from_raw) {
        return TabSelection {
            selected: focused,
            solo: true,
        };
    }

    TabSelection {
        selected: tab.and_then(Tab::from_raw).unwrap_or(Tab::Score),
        solo: false,
    }
}

/// Application routes, mirroring the SPA's URL space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard { term: Option<String> },
    Kpis,
    Empresa {
        identifier: String,
        /// Whether the identifier entered via the `/empresa/cnpj/` path.
        cnpj_route: bool,
        tab: Option<Tab>,
        focus: Option<Tab>,
        term: Option<String>,
    },
}

/// Parses a path (with optional query string). Unknown paths fall back to the
/// dashboard, like the router's wildcard redirect.
pub fn parse_route(path: &str) -> Route {
    let (raw_path, raw_query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    };

    let mut term = None;
    let mut tab = None;
    let mut focus = None;
    if let Some(query) = raw_query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "term" => term = Some(value.into_owned()).filter(|t| !t.trim().is_empty()),
                "tab" => tab = Tab::from_raw(&value),
                "focus" => focus = Tab::from_raw(&value),
                _ => {}
            }
        }
    }

    let segments: Vec<&str> = raw_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        ["login"] => Route::Login,
        [] | ["dashboard"] => Route::Dashboard { term },
        ["kpis"] => Route::Kpis,
        ["empresa", "cnpj", cnpj] => Route::Empresa {
            identifier: (*cnpj).to_string(),
            cnpj_route: true,
            tab,
            focus,
            term,
        },
        ["empresa", id] => Route::Empresa {
            identifier: (*id).to_string(),
            cnpj_route: false,
            tab,
            focus,
            term,
        },
        _ => Route::Dashboard { term },
    }
}

/// Serializes a route back to a path with query string.
pub fn route_to_path(route: &Route) -> String {
    match route {
        Route::Login => "/login".to_string(),
        Route::Kpis => "/kpis".to_string(),
        Route::Dashboard { term } => {
            let mut path = "/dashboard".to_string();
            if let Some(term) = term.as_deref().filter(|t| !t.trim().is_empty()) {
                path.push('?');
                path.push_str(
                    &url::form_urlencoded::Serializer::new(String::new())
                        .append_pair("term", term)
                        .finish(),
                );
            }
            path
        }
        Route::Empresa {
            identifier,
            cnpj_route,
            tab,
            focus,
            term,
        } => {
            let mut path = if *cnpj_route {
                format!("/empresa/cnpj/{}", identifier)
            } else {
                format!("/empresa/{}", identifier)
            };

            let mut query = url::form_urlencoded::Serializer::new(String::new());
            let mut has_query = false;
            if let Some(tab) = tab {
                query.append_pair("tab", tab.key());
                has_query = true;
            }
            if let Some(focus) = focus {
                query.append_pair("focus", focus.key());
                has_query = true;
            }
            if let Some(term) = term.as_deref().filter(|t| !t.trim().is_empty()) {
                query.append_pair("term", term);
                has_query = true;
            }
            if has_query {
                path.push('?');
                path.push_str(&query.finish());
            }
            path
        }
    }
}

/// Search dispatch: canonicalizes the term and picks the empresa route the
/// way the dashboard search bar does. `None` when the term is blank.
pub fn route_for_search(term: &str) -> Option<Route> {
    let canonical = canonical_identifier(term)?;

    let cnpj_route = canonical.starts_with("CNPJ_")
        || Regex::new(r"^\d{14}$").unwrap().is_match(&canonical);

    Some(Route::Empresa {
        identifier: canonical,
        cnpj_route,
        tab: None,
        focus: None,
        term: None,
    })
}

/// Heading form of an identifier: `CNPJ_00042` renders as `CNPJ 00042`.
pub fn display_identifier(value: &str) -> String {
    if value.is_empty() {
        return value.to_string();
    }
    Regex::new(r"(?i)^CNPJ_")
        .unwrap()
        .replace(value, "CNPJ ")
        .into_owned()
}

/// Term to carry back to the dashboard on back-navigation: the explicit
/// `term` parameter, else the route identifier, else its display form.
pub fn return_term(term: Option<&str>, identifier: &str) -> Option<String> {
    if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
        return Some(term.to_string());
    }

    let candidate = identifier.trim();
    if !candidate.is_empty() {
        return Some(candidate.to_string());
    }

    let readable = display_identifier(identifier);
    let readable = readable.trim();
    if readable.is_empty() {
        None
    } else {
        Some(readable.to_string())
    }
}
