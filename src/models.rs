use serde::{Deserialize, Serialize};

// ============ Core API payloads ============

/// Company summary as served by `GET /empresas`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmpresaSummary {
    /// Authoritative company identifier (CNPJ digits or symbolic code).
    pub id: String,
    /// CNPJ, when distinct from the id.
    pub cnpj: Option<String>,
    /// CNAE classification description.
    pub ds_cnae: Option<String>,
    /// Founding date (ISO date).
    pub dt_abrt: Option<String>,
}

impl EmpresaSummary {
    /// Identifier to show and to key panel fetches on: the id, falling back
    /// to the CNPJ when the id is blank.
    pub fn effective_id(&self) -> Option<&str> {
        let id = self.id.trim();
        if !id.is_empty() {
            return Some(id);
        }
        self.cnpj
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Score payload from `GET /empresas/{id}/score`.
///
/// The `score` field is ambiguous on the wire: either a 0-1 fraction or an
/// already-percent value. Normalization lives in [`crate::score`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreResponse {
    pub empresa_id: Option<String>,
    pub score: Option<f64>,
    /// Risk band label ("baixo", "médio", "alto").
    pub faixa: Option<String>,
    pub modelo: Option<String>,
    pub versao: Option<String>,
    /// Historical score values, aligned to `historico_timestamps`.
    pub historico: Option<Vec<Option<f64>>>,
    pub historico_timestamps: Option<Vec<String>>,
    pub ultima_atualizacao_score: Option<String>,
    /// Per-feature contribution map, passed through untouched.
    pub explicacoes: Option<serde_json::Value>,
}

/// Node or edge identifier; the backend emits both strings and numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphId::Text(s) => write!(f, "{}", s),
            GraphId::Int(n) => write!(f, "{}", n),
            GraphId::Float(n) => write!(f, "{}", n),
        }
    }
}

/// Raw relationship-network node from `GET /empresas/{id}/rede`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedeNode {
    pub id: Option<GraphId>,
    pub label: Option<String>,
    pub value: Option<f64>,
}

/// Raw relationship-network edge. Endpoints arrive under `from`/`to` or
/// `source`/`target` depending on the producer; weights under `value` or
/// `weight`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedeEdge {
    pub id: Option<GraphId>,
    pub from: Option<GraphId>,
    pub source: Option<GraphId>,
    pub to: Option<GraphId>,
    pub target: Option<GraphId>,
    pub value: Option<f64>,
    pub weight: Option<f64>,
}

/// Graph payload from `GET /empresas/{id}/rede`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedeResponse {
    pub nodes: Vec<RedeNode>,
    pub edges: Vec<RedeEdge>,
}

/// One macroeconomic series from `GET /macro`, with historical and forecast
/// segments on independent timestamp axes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MacroSerieResponse {
    /// Historical values, aligned to `historico_timestamps`.
    pub serie: Option<Vec<Option<f64>>>,
    /// Forecast values, aligned to `forecast_timestamps`.
    pub forecast: Option<Vec<Option<f64>>>,
    pub historico_timestamps: Option<Vec<String>>,
    pub forecast_timestamps: Option<Vec<String>>,
    pub horizonte: Option<u32>,
    /// Human-readable source attribution.
    pub fonte: Option<String>,
    pub serie_id: Option<String>,
    /// Echo of the requested series alias, when the source renamed it.
    pub requested_serie: Option<String>,
    pub descricao: Option<String>,
    pub ultima_atualizacao: Option<String>,
}

/// Credit decision record from `GET /decisoes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Decisao {
    pub id: i64,
    pub empresa_id: String,
    pub dt_decisao: Option<String>,
    pub score: Option<f64>,
    pub aprovacao: Option<bool>,
    pub limite: Option<f64>,
    pub moeda: Option<String>,
    pub motivo: Option<String>,
    /// Decision label ("APROVADO", "REPROVADO", ...); derived from
    /// `aprovacao` when absent.
    pub decisao: Option<String>,
}

/// Body for `POST /decisoes`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaDecisaoRequest {
    pub empresa_id: String,
}
