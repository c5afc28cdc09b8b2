use crate::chart::{ChartHandle, ChartSpec, ChartSurface};
use crate::error::{PanelError, Result};
use crate::handler::ResultView;
use crate::render::LabelBadge;

const BAR_WIDTH: usize = 30;

/// Prints the panel to stdout as it changes.
#[derive(Default)]
pub struct TerminalView;

impl ResultView for TerminalView {
    fn reveal(&mut self) {
        println!("{}", "=".repeat(60));
    }

    fn set_label_badge(&mut self, badge: &LabelBadge) {
        println!("[ {} ]  ({} on {})", badge.text, badge.palette.color, badge.palette.background);
    }

    fn set_probability(&mut self, text: &str) {
        println!("[ {} ]", text);
    }

    fn set_insight_markup(&mut self, markup: &str) {
        println!("\n{}", unescape_basic(markup));
    }

    fn scroll_into_view(&mut self) {
        println!("{}", "=".repeat(60));
    }

    fn alert(&mut self, message: &str) {
        eprintln!("!! {}", message);
    }
}

fn unescape_basic(markup: &str) -> String {
    markup
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Draws bars as text; positive bars grow right of the axis, negative left.
#[derive(Default)]
pub struct TextChart {
    next: u64,
    live: Option<ChartHandle>,
}

impl TextChart {
    pub fn draw(spec: &ChartSpec) -> Vec<String> {
        let max = spec
            .values
            .iter()
            .fold(0.0_f64, |m, v| m.max(v.abs()));
        let name_w = spec.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        spec.labels
            .iter()
            .zip(&spec.values)
            .map(|(label, v)| {
                let len = if max > 0.0 {
                    ((v.abs() / max) * BAR_WIDTH as f64).round() as usize
                } else {
                    0
                };
                let (left, right) = if *v >= 0.0 {
                    (" ".repeat(BAR_WIDTH), "+".repeat(len))
                } else {
                    (format!("{:>w$}", "-".repeat(len), w = BAR_WIDTH), String::new())
                };
                format!(
                    "{:<nw$} {}|{:<bw$}{}",
                    label,
                    left,
                    right,
                    ChartSpec::tooltip_label(*v),
                    nw = name_w,
                    bw = BAR_WIDTH
                )
            })
            .collect()
    }
}

impl ChartSurface for TextChart {
    fn create(&mut self, spec: &ChartSpec) -> Result<ChartHandle> {
        if self.live.is_some() {
            return Err(PanelError::Chart("previous chart still live".to_string()));
        }
        self.next += 1;
        let handle = ChartHandle(self.next);
        println!("\nContribution");
        if spec.is_empty() {
            println!("  (sem contribuições locais)");
        }
        for line in Self::draw(spec) {
            println!("  {}", line);
        }
        self.live = Some(handle);
        Ok(handle)
    }

    fn destroy(&mut self, handle: ChartHandle) {
        if self.live == Some(handle) {
            self.live = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_largest() {
        let spec = ChartSpec {
            labels: vec!["a".into(), "bb".into()],
            values: vec![0.5, -1.0],
            colors: vec!["#22c55e", "#ef4444"],
        };
        let lines = TextChart::draw(&spec);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("a  "));
        assert_eq!(lines[0].matches('+').count(), 15);
        assert_eq!(lines[1].matches('-').count(), 31); // 30 bar + sign
        assert!(lines[1].ends_with(" -1.0000"));
    }

    #[test]
    fn second_create_needs_destroy() {
        let spec = ChartSpec {
            labels: vec![],
            values: vec![],
            colors: vec![],
        };
        let mut chart = TextChart::default();
        let h = chart.create(&spec).unwrap();
        assert!(chart.create(&spec).is_err());
        chart.destroy(h);
        assert!(chart.create(&spec).is_ok());
    }
}
