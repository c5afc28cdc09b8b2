//! Stand-in for the prediction service, speaking the same contract.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::types::{
    ExplainLocal, GlobalExplanation, GlobalImportance, HealthStatus, LineType, LocalContribution,
    PredictionResponse, DEFAULT_TOPK, LABEL_DELAYED, LABEL_ON_TIME,
};

const VERSION: &str = "2.0";

const REQUIRED_RAW_COLS: [&str; 5] = [
    "partida_prevista",
    "empresa_aerea",
    "aerodromo_origem",
    "aerodromo_destino",
    "codigo_tipo_linha",
];

// ---------- Server state ----------

#[derive(Clone, Default)]
pub struct MockService {
    /// Served by `/explain/global`; 404 when absent.
    pub explain_global: Option<Arc<Vec<GlobalImportance>>>,
    /// Also embed the ranking in every `/predict` reply.
    pub embed_global: bool,
}

impl MockService {
    pub fn with_global(features: &[(&str, f64)]) -> Self {
        let ranked = features
            .iter()
            .map(|(f, imp)| GlobalImportance {
                feature: f.to_string(),
                importance: Some(*imp),
                method: Some("xgboost_gain".to_string()),
            })
            .collect();
        Self {
            explain_global: Some(Arc::new(ranked)),
            embed_global: false,
        }
    }

    pub fn embedding_global(mut self) -> Self {
        self.embed_global = true;
        self
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/predict", post(predict))
            .route("/explain/global", get(explain_global))
            .route("/health", get(health))
            .with_state(self)
    }
}

type Rejection = (StatusCode, Json<Value>);

fn bad_request(detail: String) -> Rejection {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail })))
}

// ---------- Scoring ----------

fn departure_hour(partida: &str) -> Option<u32> {
    // "2024-03-01 10:30:00" or "2024-03-01T10:30"
    let time = partida.split(|c| c == ' ' || c == 'T').nth(1)?;
    time.split(':').next()?.parse().ok()
}

fn airline_delay_mean(airline: &str) -> f64 {
    // stable pseudo-average in [0.05, 0.35] per airline code
    let sum: u32 = airline.bytes().map(u32::from).sum();
    0.05 + f64::from(sum % 31) / 100.0
}

fn score(dados: &Value, topk: usize) -> PredictionResponse {
    let field = |k: &str| dados.get(k).and_then(Value::as_str).unwrap_or("");
    let line = field("codigo_tipo_linha");
    let international = LineType::from_code(line).is_some_and(LineType::is_international);
    let hour = departure_hour(field("partida_prevista")).unwrap_or(12);

    let c_line = if international { 0.9 } else { -0.4 };
    let c_hour = if hour >= 18 { 0.6 } else { -0.2 };
    let c_airline = (airline_delay_mean(field("empresa_aerea")) - 0.15) * 4.0;
    let bias = -0.34;

    let mut contribs = vec![
        LocalContribution {
            feature: format!("cat__codigo_tipo_linha_{}", line),
            contribution: c_line,
            direction: None,
            value: Some(1.0),
        },
        LocalContribution {
            feature: "num__hora_partida".to_string(),
            contribution: c_hour,
            direction: None,
            value: Some(f64::from(hour)),
        },
        LocalContribution {
            feature: "num__media_atraso_empresa".to_string(),
            contribution: c_airline,
            direction: None,
            value: Some(airline_delay_mean(field("empresa_aerea"))),
        },
    ];
    for c in contribs.iter_mut() {
        let dir = if c.contribution >= 0.0 { "increase" } else { "decrease" };
        c.direction = Some(dir.to_string());
    }
    contribs.sort_by(|a, b| b.contribution.abs().total_cmp(&a.contribution.abs()));
    contribs.truncate(topk);

    let margin = bias + c_line + c_hour + c_airline;
    let proba = 1.0 / (1.0 + (-margin).exp());
    let pred = i64::from(proba >= 0.5);

    PredictionResponse {
        prediction: Some(pred),
        label: if pred == 1 { LABEL_DELAYED } else { LABEL_ON_TIME }.to_string(),
        proba_atraso: Some(proba),
        explain_local: Some(ExplainLocal {
            top_features: contribs,
            bias: Some(bias),
        }),
        explain_local_error: None,
        explain_global: None,
    }
}

// ---------- Handlers ----------

async fn predict(
    State(svc): State<MockService>,
    Json(payload): Json<Value>,
) -> Result<Json<PredictionResponse>, Rejection> {
    let dados = payload
        .get("dados")
        .ok_or_else(|| bad_request("Payload deve conter a chave 'dados'.".to_string()))?;

    let missing: Vec<&str> = REQUIRED_RAW_COLS
        .iter()
        .copied()
        .filter(|c| dados.get(*c).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(bad_request(format!(
            "Faltando colunas obrigatórias: {:?}",
            missing
        )));
    }

    let origem = dados["aerodromo_origem"].as_str().unwrap_or("");
    let destino = dados["aerodromo_destino"].as_str().unwrap_or("");
    if !origem.is_empty() && origem == destino {
        return Err(bad_request(
            "Origem e destino devem ser aeroportos diferentes".to_string(),
        ));
    }

    let topk = payload
        .get("topk")
        .and_then(Value::as_u64)
        .unwrap_or(u64::from(DEFAULT_TOPK)) as usize;

    let mut resp = score(dados, topk);
    if svc.embed_global {
        resp.explain_global = svc.explain_global.as_ref().map(|g| g.as_ref().clone());
    }
    tracing::info!(
        "mock predict {}->{} label={} proba={:?}",
        origem,
        destino,
        resp.label,
        resp.proba_atraso
    );
    Ok(Json(resp))
}

async fn explain_global(
    State(svc): State<MockService>,
) -> Result<Json<GlobalExplanation>, Rejection> {
    match &svc.explain_global {
        Some(g) => Ok(Json(GlobalExplanation {
            explain_global: g.as_ref().clone(),
        })),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Arquivo de explicabilidade global não encontrado." })),
        )),
    }
}

async fn health(State(svc): State<MockService>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "UP".to_string(),
        message: "FlightOnTime API is running".to_string(),
        modelo_carregado: true,
        modelo_path_ok: svc.explain_global.is_some(),
        version: VERSION.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_parsing() {
        assert_eq!(departure_hour("2024-03-01 19:05:00"), Some(19));
        assert_eq!(departure_hour("2024-03-01T07:30"), Some(7));
        assert_eq!(departure_hour("2024-03-01"), None);
    }

    #[test]
    fn international_evening_leans_delayed() {
        let late = score(
            &json!({"partida_prevista": "2024-03-01 21:00:00", "empresa_aerea": "GLO",
                    "codigo_tipo_linha": "I"}),
            8,
        );
        assert_eq!(late.label, LABEL_DELAYED);

        let early = score(
            &json!({"partida_prevista": "2024-03-01 08:00:00", "empresa_aerea": "GLO",
                    "codigo_tipo_linha": "N"}),
            2,
        );
        assert_eq!(early.label, LABEL_ON_TIME);
        assert_eq!(early.top_features().len(), 2);
    }
}
