//! Result panel for the FlightOnTime delay predictor: turns a submitted form
//! into a `/predict` call and renders label, probability, local contribution
//! chart and the global insight paragraph.

pub mod chart;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod mock;
pub mod render;
pub mod terminal;
pub mod types;

pub use chart::{ChartHandle, ChartSpec, ChartSurface, LocalChart};
pub use client::{HttpTransport, PredictTransport, RawReply};
pub use config::PanelConfig;
pub use error::PanelError;
pub use handler::{FormHandler, ResultView, SubmitOutcome};
pub use render::{build_global_insight, format_label, normalize_feature_name, RenderedResult};
pub use types::{FormInput, PredictRequest, PredictionResponse};
