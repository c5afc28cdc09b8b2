use serde::Deserialize;
use std::fs;

use crate::error::{PanelError, Result};
use crate::types::DEFAULT_TOPK;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PanelConfig {
    pub base_url: String,
    pub predict_path: String,
    pub explain_global_path: String,
    pub health_path: String,
    pub default_topk: u32,
    /// Ask `GET /explain/global` when a prediction carries no global ranking.
    pub fetch_global_fallback: bool,
    pub connect_timeout_ms: Option<u64>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            predict_path: "/predict".to_string(),
            explain_global_path: "/explain/global".to_string(),
            health_path: "/health".to_string(),
            default_topk: DEFAULT_TOPK,
            fetch_global_fallback: false,
            connect_timeout_ms: None,
        }
    }
}

impl PanelConfig {
    pub fn load(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| PanelError::Config(format!("cannot read {}: {}", path, e)))?;
        serde_json::from_str(&data)
            .map_err(|e| PanelError::Config(format!("invalid config JSON in {}: {}", path, e)))
    }

    /// `PANEL_CONFIG` file if set, then `PREDICT_BASE_URL` / `PANEL_TOPK` on top.
    pub fn from_env() -> Result<Self> {
        let mut cfg = match std::env::var("PANEL_CONFIG") {
            Ok(path) => Self::load(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(
            std::env::var("PREDICT_BASE_URL").ok(),
            std::env::var("PANEL_TOPK").ok(),
        )?;
        Ok(cfg)
    }

    fn apply_overrides(&mut self, base_url: Option<String>, topk: Option<String>) -> Result<()> {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(raw) = topk {
            self.default_topk = raw
                .trim()
                .parse()
                .map_err(|_| PanelError::Config(format!("PANEL_TOPK {:?} is not a count", raw)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: PanelConfig =
            serde_json::from_str(r#"{"base_url":"http://api:9000","fetch_global_fallback":true}"#)
                .unwrap();
        assert_eq!(cfg.base_url, "http://api:9000");
        assert!(cfg.fetch_global_fallback);
        assert_eq!(cfg.predict_path, "/predict");
        assert_eq!(cfg.default_topk, 8);
    }

    #[test]
    fn overrides_apply() {
        let mut cfg = PanelConfig::default();
        cfg.apply_overrides(Some("http://x:1".into()), Some(" 12 ".into()))
            .unwrap();
        assert_eq!(cfg.base_url, "http://x:1");
        assert_eq!(cfg.default_topk, 12);
        assert!(cfg.apply_overrides(None, Some("many".into())).is_err());
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = PanelConfig::load("/nonexistent/panel.json").unwrap_err();
        assert!(matches!(err, PanelError::Config(_)));
    }
}
