use crate::types::{line_type_label, FormInput, GlobalImportance, PredictionResponse, LABEL_DELAYED};

pub const GLOBAL_UNAVAILABLE: &str =
    "A explicabilidade global não está disponível para este modelo.";

const OPENING: &str = "Na leitura global do modelo, os fatores mais relevantes para a previsão de atraso são relacionados ao perfil operacional do voo e ao histórico médio de atraso associado à companhia aérea.";
const COMPANY_AVERAGE: &str = "Além disso, a média histórica de atraso da companhia atua como um indicador agregado de confiabilidade operacional, reforçando que padrões recorrentes de performance tendem a se refletir nas probabilidades previstas pelo modelo.";
const CLOSING: &str = "Em termos práticos, esse insight pode apoiar decisões operacionais (planejamento, gestão de risco e priorização de monitoramento) ao destacar quais aspectos estruturais mais pesam na previsão.";

const LINE_TYPE_MARKER: &str = "codigo_tipo_linha";
const COMPANY_AVERAGE_MARKER: &str = "media_atraso_empresa";

// ---------- Badges ----------

pub fn format_label(label: &str) -> &'static str {
    if label == LABEL_DELAYED {
        "Atrasado"
    } else {
        "No Prazo"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub color: &'static str,
    pub border_color: &'static str,
}

pub const DANGER: Palette = Palette {
    background: "#ffe4e6",
    color: "#9f1239",
    border_color: "rgba(159,18,57,0.18)",
};

pub const SUCCESS: Palette = Palette {
    background: "#dcfce7",
    color: "#166534",
    border_color: "rgba(22,101,52,0.18)",
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelBadge {
    pub text: String,
    pub palette: Palette,
}

pub fn label_badge(label: &str) -> LabelBadge {
    LabelBadge {
        text: format!("Label: {}", format_label(label)),
        palette: if label == LABEL_DELAYED { DANGER } else { SUCCESS },
    }
}

pub fn probability_badge(proba: Option<f64>) -> String {
    match proba {
        // ties round up, as the browser's toFixed does
        Some(p) => format!("Probabilidade de Atraso: {:.2}%", (p * 10_000.0).round() / 100.0),
        None => "Probabilidade de Atraso: —".to_string(),
    }
}

// ---------- Feature names ----------

/// `cat__codigo_tipo_linha_N` -> `codigo_tipo_linha_N`. Only one leading
/// pipeline prefix is removed.
pub fn normalize_feature_name(feature: &str) -> &str {
    feature
        .strip_prefix("cat__")
        .or_else(|| feature.strip_prefix("num__"))
        .unwrap_or(feature)
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------- Global insight ----------

/// Builds the insight paragraph (markup) from the ranked global importances.
/// Ranking is taken as delivered; every interpolated value is escaped.
pub fn build_global_insight(explain_global: Option<&[GlobalImportance]>, form: &FormInput) -> String {
    let ranked = match explain_global {
        Some(list) if !list.is_empty() => list,
        _ => return GLOBAL_UNAVAILABLE.to_string(),
    };

    let f1 = ranked.first().map(|g| normalize_feature_name(&g.feature)).unwrap_or("");
    let f2 = ranked.get(1).map(|g| normalize_feature_name(&g.feature)).unwrap_or("");

    let code = match form.codigo_tipo_linha.trim() {
        "" => "N",
        c => c,
    };

    let mentions_line_type = f1.contains(LINE_TYPE_MARKER) || f2.contains(LINE_TYPE_MARKER);
    let mentions_company =
        f1.contains(COMPANY_AVERAGE_MARKER) || f2.contains(COMPANY_AVERAGE_MARKER);

    let mut parts: Vec<String> = vec![OPENING.to_string()];

    if mentions_line_type {
        parts.push(format!(
            "Em especial, o tipo de linha (ex.: {} – {}) aparece como um dos principais direcionadores do comportamento do modelo, indicando que o contexto operacional (doméstico/internacional e passageiro/carga) influencia significativamente o risco estimado.",
            escape_html(code),
            escape_html(line_type_label(code)),
        ));
    }

    if mentions_company {
        parts.push(COMPANY_AVERAGE.to_string());
    }

    if !mentions_line_type && !mentions_company {
        let name1 = if f1.is_empty() { "variável 1" } else { f1 };
        let name2 = if f2.is_empty() { "variável 2" } else { f2 };
        parts.push(format!(
            "Neste modelo, as duas variáveis globais mais influentes são: \"{}\" e \"{}\".",
            escape_html(&name1.replace('_', " ")),
            escape_html(&name2.replace('_', " ")),
        ));
    }

    parts.push(CLOSING.to_string());
    parts.join(" ")
}

// ---------- Full result ----------

/// Everything the result panel shows for one successful response,
/// except the chart, which lives on its own surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    pub label: LabelBadge,
    pub probability: String,
    pub insight_markup: String,
}

impl RenderedResult {
    pub fn from_response(resp: &PredictionResponse, form: &FormInput) -> Self {
        Self {
            label: label_badge(&resp.label),
            probability: probability_badge(resp.proba_atraso),
            insight_markup: build_global_insight(resp.explain_global.as_deref(), form),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_TOPK;

    fn global(names: &[&str]) -> Vec<GlobalImportance> {
        names
            .iter()
            .map(|n| GlobalImportance {
                feature: n.to_string(),
                importance: None,
                method: None,
            })
            .collect()
    }

    fn form_with_line(code: &str) -> FormInput {
        FormInput::from_fields([("codigo_tipo_linha", code)], DEFAULT_TOPK)
    }

    #[test]
    fn label_is_delayed_only_for_exact_value() {
        assert_eq!(format_label("atrasado"), "Atrasado");
        assert_eq!(format_label("no_prazo"), "No Prazo");
        assert_eq!(format_label("Atrasado"), "No Prazo");
        assert_eq!(format_label(""), "No Prazo");
        assert_eq!(label_badge("atrasado").palette, DANGER);
        assert_eq!(label_badge("no_prazo").palette, SUCCESS);
        assert_eq!(label_badge("no_prazo").text, "Label: No Prazo");
    }

    #[test]
    fn prefixes_are_stripped_once() {
        assert_eq!(normalize_feature_name("cat__codigo_tipo_linha_N"), "codigo_tipo_linha_N");
        assert_eq!(normalize_feature_name("num__media_atraso_empresa"), "media_atraso_empresa");
        assert_eq!(normalize_feature_name("num__cat__x"), "cat__x");
        assert_eq!(normalize_feature_name("hora_partida"), "hora_partida");
        assert_eq!(normalize_feature_name("x_num__y"), "x_num__y");
    }

    #[test]
    fn probability_formats_two_decimals() {
        assert_eq!(probability_badge(Some(0.6789)), "Probabilidade de Atraso: 67.89%");
        assert_eq!(probability_badge(Some(1.0)), "Probabilidade de Atraso: 100.00%");
        assert_eq!(probability_badge(Some(0.00625)), "Probabilidade de Atraso: 0.63%");
        assert_eq!(probability_badge(Some(0.0)), "Probabilidade de Atraso: 0.00%");
        assert_eq!(probability_badge(None), "Probabilidade de Atraso: —");
    }

    #[test]
    fn missing_global_explanation_is_unavailable() {
        let form = form_with_line("N");
        assert_eq!(build_global_insight(None, &form), GLOBAL_UNAVAILABLE);
        assert_eq!(build_global_insight(Some(&[][..]), &form), GLOBAL_UNAVAILABLE);
    }

    #[test]
    fn line_type_and_company_sentences() {
        let g = global(&["cat__codigo_tipo_linha_N", "num__media_atraso_empresa", "num__hora"]);
        let text = build_global_insight(Some(g.as_slice()), &form_with_line("N"));
        assert!(text.starts_with(OPENING));
        assert!(text.contains("o tipo de linha (ex.: N – Doméstica Mista)"));
        assert!(text.contains(COMPANY_AVERAGE));
        assert!(!text.contains("Neste modelo"));
        assert!(text.ends_with(CLOSING));
    }

    #[test]
    fn fallback_names_top_two() {
        let g = global(&["num__foo", "num__bar"]);
        let text = build_global_insight(Some(g.as_slice()), &form_with_line("I"));
        assert!(text.contains(
            "Neste modelo, as duas variáveis globais mais influentes são: \"foo\" e \"bar\"."
        ));
        assert!(text.starts_with(OPENING));
        assert!(text.ends_with(CLOSING));
        assert!(!text.contains("tipo de linha"));
        assert!(!text.contains(COMPANY_AVERAGE));

        let g = global(&["num__dia_da_semana"]);
        let text = build_global_insight(Some(g.as_slice()), &form_with_line("I"));
        assert!(text.contains("\"dia da semana\" e \"variável 2\""));

        let g = global(&["num__say_\"hi\"", "num__ok"]);
        let text = build_global_insight(Some(g.as_slice()), &form_with_line("I"));
        assert!(text.contains("são: \"say &quot;hi&quot;\" e \"ok\"."));
    }

    #[test]
    fn unknown_line_code_and_markup_are_escaped() {
        let g = global(&["cat__codigo_tipo_linha_X", "num__hora"]);
        let text = build_global_insight(Some(g.as_slice()), &form_with_line("<b>"));
        assert!(text.contains("(ex.: &lt;B&gt; – &lt;B&gt;)"));
        assert!(!text.contains("<B>"));

        let g = global(&["num__<script>", "num__ok"]);
        let text = build_global_insight(Some(g.as_slice()), &form_with_line("N"));
        assert!(text.contains("&lt;script&gt;"));
    }

    #[test]
    fn blank_line_code_reads_as_domestic_mixed() {
        let g = global(&["num__media_atraso_empresa", "cat__codigo_tipo_linha_C"]);
        let text = build_global_insight(Some(g.as_slice()), &form_with_line(""));
        assert!(text.contains("(ex.: N – Doméstica Mista)"));
    }
}
