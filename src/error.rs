use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    /// Request never got an answer, or the answer could not be read.
    #[error("{0}")]
    Transport(String),

    #[error("malformed JSON body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// Service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Application {
        status: u16,
        body: serde_json::Value,
    },

    #[error("config: {0}")]
    Config(String),

    #[error("chart: {0}")]
    Chart(String),
}

impl From<reqwest::Error> for PanelError {
    fn from(err: reqwest::Error) -> Self {
        PanelError::Transport(err.to_string())
    }
}

impl PanelError {
    /// Text shown in the blocking alert.
    pub fn alert_message(&self) -> String {
        match self {
            PanelError::Application { body, .. } => format!("Erro: {}", body),
            other => format!("Falha ao chamar a API: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PanelError>;
