use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_TOPK: u32 = 8;

// ---------- Form input ----------

/// Submitted form, already normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub partida_prevista: String,  // trimmed only
    pub empresa_aerea: String,     // e.g. "GLO"
    pub aerodromo_origem: String,  // e.g. "SBGR"
    pub aerodromo_destino: String, // e.g. "SBRJ"
    pub codigo_tipo_linha: String, // N, C, I or G
    #[serde(skip)]
    pub topk: u32,
}

impl FormInput {
    /// Builds the input from raw `(name, value)` form fields. Missing string
    /// fields become empty, a missing or unusable `topk` becomes `default_topk`.
    pub fn from_fields<I, K, V>(fields: I, default_topk: u32) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let text = |k: &str| map.get(k).map(String::as_str).unwrap_or("");
        let code = |k: &str| text(k).trim().to_uppercase();

        let topk = match map.get("topk").map(|s| s.trim()) {
            None | Some("") => default_topk,
            Some(raw) => raw.parse::<u32>().unwrap_or_else(|_| {
                tracing::warn!("topk {:?} is not a count; using {}", raw, default_topk);
                default_topk
            }),
        };

        Self {
            partida_prevista: text("partida_prevista").trim().to_string(),
            empresa_aerea: code("empresa_aerea"),
            aerodromo_origem: code("aerodromo_origem"),
            aerodromo_destino: code("aerodromo_destino"),
            codigo_tipo_linha: code("codigo_tipo_linha"),
            topk,
        }
    }

    pub fn to_request(&self) -> PredictRequest {
        PredictRequest {
            dados: self.clone(),
            topk: self.topk,
        }
    }
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub dados: FormInput,
    pub topk: u32,
}

// ---------- Line type ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    DomesticMixed,
    DomesticCargo,
    InternationalMixed,
    InternationalCargo,
}

impl LineType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "N" => Some(Self::DomesticMixed),
            "C" => Some(Self::DomesticCargo),
            "I" => Some(Self::InternationalMixed),
            "G" => Some(Self::InternationalCargo),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DomesticMixed => "Doméstica Mista",
            Self::DomesticCargo => "Doméstica Cargueira",
            Self::InternationalMixed => "Internacional Mista",
            Self::InternationalCargo => "Internacional Cargueira",
        }
    }

    pub fn is_international(self) -> bool {
        matches!(self, Self::InternationalMixed | Self::InternationalCargo)
    }
}

/// Human label for a line-type code; unknown codes display as themselves.
pub fn line_type_label(code: &str) -> &str {
    LineType::from_code(code).map(LineType::label).unwrap_or(code)
}

// ---------- Prediction response ----------

pub const LABEL_DELAYED: &str = "atrasado";
pub const LABEL_ON_TIME: &str = "no_prazo";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<i64>,
    #[serde(default)]
    pub label: String, // "atrasado" | "no_prazo"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proba_atraso: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain_local: Option<ExplainLocal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain_local_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain_global: Option<Vec<GlobalImportance>>,
}

impl PredictionResponse {
    pub fn top_features(&self) -> &[LocalContribution] {
        self.explain_local
            .as_ref()
            .map(|e| e.top_features.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplainLocal {
    #[serde(default)]
    pub top_features: Vec<LocalContribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalContribution {
    pub feature: String,
    pub contribution: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>, // "increase" | "decrease"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalImportance {
    #[serde(default)]
    pub feature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Body of `GET /explain/global`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalExplanation {
    #[serde(default)]
    pub explain_global: Vec<GlobalImportance>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub modelo_carregado: bool,
    pub modelo_path_ok: bool,
    pub version: String,
}
