use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::types::{GlobalExplanation, HealthStatus, PredictRequest, PredictionResponse};

/// Status and body exactly as the service sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Talks to the prediction service. `Err` means no reply was obtained at all.
pub trait PredictTransport: Send + Sync {
    fn post_predict<'a>(&'a self, req: &'a PredictRequest) -> BoxFuture<'a, Result<RawReply>>;
    fn get_global<'a>(&'a self) -> BoxFuture<'a, Result<RawReply>>;
    fn get_health<'a>(&'a self) -> BoxFuture<'a, Result<RawReply>>;
}

/// Body must be JSON; non-2xx turns into `Application` carrying that JSON.
pub fn decode_reply<T: DeserializeOwned>(reply: RawReply) -> Result<T> {
    let body: serde_json::Value = serde_json::from_str(&reply.body)?;
    if !reply.is_success() {
        return Err(PanelError::Application {
            status: reply.status,
            body,
        });
    }
    Ok(serde_json::from_value(body)?)
}

pub async fn predict<T: PredictTransport + ?Sized>(
    transport: &T,
    req: &PredictRequest,
) -> Result<PredictionResponse> {
    decode_reply(transport.post_predict(req).await?)
}

pub async fn global_explanation<T: PredictTransport + ?Sized>(
    transport: &T,
) -> Result<GlobalExplanation> {
    decode_reply(transport.get_global().await?)
}

pub async fn health<T: PredictTransport + ?Sized>(transport: &T) -> Result<HealthStatus> {
    decode_reply(transport.get_health().await?)
}

// ---------- reqwest ----------

pub struct HttpTransport {
    client: reqwest::Client,
    predict_url: String,
    global_url: String,
    health_url: String,
}

impl HttpTransport {
    pub fn new(cfg: &PanelConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = cfg.connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        let base = cfg.base_url.trim_end_matches('/');
        Ok(Self {
            client: builder.build()?,
            predict_url: format!("{}{}", base, cfg.predict_path),
            global_url: format!("{}{}", base, cfg.explain_global_path),
            health_url: format!("{}{}", base, cfg.health_path),
        })
    }

    async fn read(resp: reqwest::Response) -> Result<RawReply> {
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(RawReply { status, body })
    }
}

impl PredictTransport for HttpTransport {
    fn post_predict<'a>(&'a self, req: &'a PredictRequest) -> BoxFuture<'a, Result<RawReply>> {
        async move {
            // .json() sets Content-Type: application/json
            let resp = self.client.post(self.predict_url.as_str()).json(req).send().await?;
            Self::read(resp).await
        }
        .boxed()
    }

    fn get_global<'a>(&'a self) -> BoxFuture<'a, Result<RawReply>> {
        async move {
            let resp = self.client.get(self.global_url.as_str()).send().await?;
            Self::read(resp).await
        }
        .boxed()
    }

    fn get_health<'a>(&'a self) -> BoxFuture<'a, Result<RawReply>> {
        async move {
            let resp = self.client.get(self.health_url.as_str()).send().await?;
            Self::read(resp).await
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_success_keeps_json_body() {
        let err = decode_reply::<PredictionResponse>(RawReply {
            status: 400,
            body: r#"{"detail":"Payload deve conter a chave 'dados'."}"#.into(),
        })
        .unwrap_err();
        match &err {
            PanelError::Application { status, body } => {
                assert_eq!(*status, 400);
                assert_eq!(body["detail"], "Payload deve conter a chave 'dados'.");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            err.alert_message(),
            r#"Erro: {"detail":"Payload deve conter a chave 'dados'."}"#
        );
    }

    #[test]
    fn unparseable_body_is_transport_side() {
        let err = decode_reply::<PredictionResponse>(RawReply {
            status: 502,
            body: "<html>bad gateway</html>".into(),
        })
        .unwrap_err();
        assert!(matches!(err, PanelError::MalformedBody(_)));
        assert!(err.alert_message().starts_with("Falha ao chamar a API: "));
    }
}
