use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::chart::{ChartHandle, ChartSurface, LocalChart};
use crate::client::{self, PredictTransport};
use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::render::{LabelBadge, RenderedResult};
use crate::types::{FormInput, PredictionResponse};

/// The host document's result panel.
pub trait ResultView: Send {
    fn reveal(&mut self);
    fn set_label_badge(&mut self, badge: &LabelBadge);
    fn set_probability(&mut self, text: &str);
    /// Receives markup; values inside are already escaped.
    fn set_insight_markup(&mut self, markup: &str);
    fn scroll_into_view(&mut self);
    /// Blocking notification.
    fn alert(&mut self, message: &str);
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Rendered {
        result: RenderedResult,
        chart: Option<ChartHandle>,
    },
    /// Alerted; the panel kept what it showed before.
    Failed(PanelError),
    /// A newer submission started while this one was in flight.
    Superseded,
}

struct Panel<V, S> {
    view: V,
    chart: LocalChart<S>,
}

pub struct FormHandler<T, V, S> {
    transport: T,
    cfg: PanelConfig,
    generation: AtomicU64,
    panel: Mutex<Panel<V, S>>,
}

impl<T, V, S> FormHandler<T, V, S>
where
    T: PredictTransport,
    V: ResultView,
    S: ChartSurface,
{
    pub fn new(transport: T, view: V, surface: S, cfg: PanelConfig) -> Self {
        Self {
            transport,
            cfg,
            generation: AtomicU64::new(0),
            panel: Mutex::new(Panel {
                view,
                chart: LocalChart::new(surface),
            }),
        }
    }

    /// Handles one submit of raw `(name, value)` form fields.
    pub async fn submit<I, K, Val>(&self, fields: I) -> SubmitOutcome
    where
        I: IntoIterator<Item = (K, Val)>,
        K: Into<String>,
        Val: Into<String>,
    {
        let form = FormInput::from_fields(fields, self.cfg.default_topk);
        self.submit_form(form).await
    }

    pub async fn submit_form(&self, form: FormInput) -> SubmitOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            "submit #{} {} {}->{} line={} topk={}",
            generation,
            form.empresa_aerea,
            form.aerodromo_origem,
            form.aerodromo_destino,
            form.codigo_tipo_linha,
            form.topk
        );

        let outcome = self.fetch(&form).await;
        self.apply(generation, &form, outcome)
    }

    async fn fetch(&self, form: &FormInput) -> Result<PredictionResponse> {
        let mut resp = client::predict(&self.transport, &form.to_request()).await?;

        if let Some(err) = &resp.explain_local_error {
            tracing::warn!("service could not explain locally: {}", err);
        }

        if resp.explain_global.is_none() && self.cfg.fetch_global_fallback {
            match client::global_explanation(&self.transport).await {
                Ok(g) => resp.explain_global = Some(g.explain_global),
                Err(e) => tracing::warn!("global explanation unavailable: {}", e),
            }
        }
        Ok(resp)
    }

    fn apply(
        &self,
        generation: u64,
        form: &FormInput,
        outcome: Result<PredictionResponse>,
    ) -> SubmitOutcome {
        let mut panel = self.panel.lock();

        // Checked under the lock so two late replies can't interleave renders.
        let latest = self.generation.load(Ordering::SeqCst);
        if generation != latest {
            tracing::debug!("dropping reply #{} (latest is #{})", generation, latest);
            return SubmitOutcome::Superseded;
        }

        let resp = match outcome {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("submit #{} failed: {}", generation, e);
                panel.view.alert(&e.alert_message());
                return SubmitOutcome::Failed(e);
            }
        };

        let result = RenderedResult::from_response(&resp, form);
        let Panel { view, chart } = &mut *panel;

        view.reveal();
        view.set_label_badge(&result.label);
        view.set_probability(&result.probability);
        let drawn = match chart.render(resp.top_features()) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("local chart not drawn: {}", e);
                None
            }
        };
        view.set_insight_markup(&result.insight_markup);
        view.scroll_into_view();

        tracing::info!(
            "submit #{} rendered: {} / {}",
            generation,
            result.label.text,
            result.probability
        );
        SubmitOutcome::Rendered {
            result,
            chart: drawn,
        }
    }

    /// Read access to the panel and its chart, e.g. for assertions.
    pub fn inspect<R>(&self, f: impl FnOnce(&V, &LocalChart<S>) -> R) -> R {
        let panel = self.panel.lock();
        f(&panel.view, &panel.chart)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
