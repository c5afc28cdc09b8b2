use serde::Serialize;

use crate::error::Result;
use crate::render::normalize_feature_name;
use crate::types::LocalContribution;

pub const POSITIVE_COLOR: &str = "#22c55e";
pub const NEGATIVE_COLOR: &str = "#ef4444";

/// Horizontal bar chart of local feature contributions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<&'static str>,
}

impl ChartSpec {
    pub fn local_contributions(features: &[LocalContribution]) -> Self {
        let labels = features
            .iter()
            .map(|f| normalize_feature_name(&f.feature).to_string())
            .collect();
        let values: Vec<f64> = features.iter().map(|f| f.contribution).collect();
        let colors = values.iter().map(|v| bar_color(*v)).collect();
        Self { labels, values, colors }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Tooltip text for one bar.
    pub fn tooltip_label(value: f64) -> String {
        format!(" {:.4}", value)
    }
}

pub fn bar_color(contribution: f64) -> &'static str {
    if contribution >= 0.0 {
        POSITIVE_COLOR
    } else {
        NEGATIVE_COLOR
    }
}

// ---------- Surface ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub u64);

/// Whatever actually draws charts (canvas binding, terminal, test recorder).
pub trait ChartSurface: Send {
    fn create(&mut self, spec: &ChartSpec) -> Result<ChartHandle>;
    fn destroy(&mut self, handle: ChartHandle);
}

/// Owns the one chart drawn on a surface. The old instance is destroyed
/// before the replacement is created.
pub struct LocalChart<S> {
    surface: S,
    current: Option<ChartHandle>,
}

impl<S: ChartSurface> LocalChart<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            current: None,
        }
    }

    pub fn render(&mut self, features: &[LocalContribution]) -> Result<ChartHandle> {
        let spec = ChartSpec::local_contributions(features);
        if let Some(old) = self.current.take() {
            self.surface.destroy(old);
        }
        let handle = self.surface.create(&spec)?;
        self.current = Some(handle);
        Ok(handle)
    }

    pub fn current(&self) -> Option<ChartHandle> {
        self.current
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
