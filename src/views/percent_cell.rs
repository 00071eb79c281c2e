// ============================================================================
// SLA PERCENT CELL - Celda de % SLA en 4 modos
// ============================================================================

use serde_json::Value;
use std::f64::consts::PI;

/// Radio del gauge circular (viewBox 44x44)
pub const GAUGE_RADIUS: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PercentMode {
    #[default]
    Text,
    Circular,
    Vertical,
    Horizontal,
}

impl PercentMode {
    pub const ALL: [PercentMode; 4] = [
        PercentMode::Text,
        PercentMode::Circular,
        PercentMode::Vertical,
        PercentMode::Horizontal,
    ];

    /// Valor guardado en la config (`texto`, `circular`...). Desconocido = texto.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "circular" => PercentMode::Circular,
            "vertical" => PercentMode::Vertical,
            "horizontal" => PercentMode::Horizontal,
            _ => PercentMode::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PercentMode::Text => "texto",
            PercentMode::Circular => "circular",
            PercentMode::Vertical => "vertical",
            PercentMode::Horizontal => "horizontal",
        }
    }
}

/// "85.7%" o 85.7 → [0, 100]; lo no numérico vale 0
pub fn parse_percent(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_percent_str(s),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).map_or(0.0, |n| n.clamp(0.0, 100.0))
}

pub fn parse_percent_text(raw: &str) -> f64 {
    parse_percent(&Value::String(raw.to_string()))
}

/// Prefijo numérico más largo (como parseFloat)
fn parse_percent_str(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('%', "");
    let cleaned = cleaned.trim();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in cleaned.char_indices() {
        let ok = c.is_ascii_digit() || (c == '.' && !seen_dot) || (i == 0 && (c == '-' || c == '+'));
        if !ok {
            break;
        }
        seen_dot |= c == '.';
        end = i + c.len_utf8();
    }
    cleaned[..end].parse().ok()
}

/// Geometría ya calculada para pintar la celda
#[derive(Debug, Clone, PartialEq)]
pub enum PercentCell {
    Text { label: String },
    Circular { label: String, title: String, circumference: f64, dash_offset: f64 },
    Vertical { label: String, title: String, fill_height_pct: f64 },
    Horizontal { label: String, title: String, fill_width_pct: f64 },
}

impl PercentCell {
    pub fn build(value: &Value, mode: PercentMode) -> Self {
        let pct = parse_percent(value);
        let title = format!("{:.1}%", pct);
        let label = format!("{:.0}%", pct);
        match mode {
            PercentMode::Text => PercentCell::Text { label: title },
            PercentMode::Circular => {
                let circumference = 2.0 * PI * GAUGE_RADIUS;
                PercentCell::Circular {
                    label,
                    title,
                    circumference,
                    dash_offset: circumference - (pct / 100.0) * circumference,
                }
            }
            PercentMode::Vertical => PercentCell::Vertical { label, title, fill_height_pct: pct },
            PercentMode::Horizontal => PercentCell::Horizontal { label, title, fill_width_pct: pct },
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PercentCell::Text { label }
            | PercentCell::Circular { label, .. }
            | PercentCell::Vertical { label, .. }
            | PercentCell::Horizontal { label, .. } => label,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn render_percent_cell(cell: &PercentCell) -> Result<web_sys::Element, wasm_bindgen::JsValue> {
    use crate::dom::ElementBuilder;

    let bar = |modifier: &str, title: &str, style: String| -> Result<web_sys::Element, wasm_bindgen::JsValue> {
        let fill = ElementBuilder::new("div")?.class("sla-pct-cell__fill").attr("style", &style)?.build();
        let track = ElementBuilder::new("div")?.class("sla-pct-cell__track").child(fill)?.build();
        let label = ElementBuilder::new("span")?.class("sla-pct-cell__label").text(cell.label()).build();
        Ok(ElementBuilder::new("div")?
            .class(&format!("sla-pct-cell sla-pct-cell--{}", modifier))
            .attr("title", title)?
            .child(track)?
            .child(label)?
            .build())
    };

    match cell {
        PercentCell::Text { label } => Ok(ElementBuilder::new("span")?
            .class("sla-pct-cell sla-pct-cell--texto")
            .text(label)
            .build()),
        PercentCell::Circular { label, title, circumference, dash_offset } => {
            let svg = format!(
                r#"<svg class="sla-pct-cell__svg" viewBox="0 0 44 44" width="44" height="44"><circle class="sla-pct-cell__circle-bg" cx="22" cy="22" r="{r}" fill="none" stroke-width="4"/><circle class="sla-pct-cell__circle-fill" cx="22" cy="22" r="{r}" fill="none" stroke-width="4" stroke-dasharray="{c}" stroke-dashoffset="{o}" transform="rotate(-90 22 22)"/></svg><span class="sla-pct-cell__label">{label}</span>"#,
                r = GAUGE_RADIUS,
                c = circumference,
                o = dash_offset,
                label = label,
            );
            Ok(ElementBuilder::new("div")?
                .class("sla-pct-cell sla-pct-cell--circular")
                .attr("title", title)?
                .html(&svg)
                .build())
        }
        PercentCell::Vertical { title, fill_height_pct, .. } => {
            bar("vertical", title, format!("height: {}%", fill_height_pct))
        }
        PercentCell::Horizontal { title, fill_width_pct, .. } => {
            bar("horizontal", title, format!("width: {}%", fill_width_pct))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!("85.7%"), 85.7)]
    #[case(json!(150), 100.0)]
    #[case(json!("abc"), 0.0)]
    #[case(json!(-3), 0.0)]
    #[case(json!(" 42 % "), 42.0)]
    #[case(json!("12.5abc"), 12.5)]
    #[case(json!(null), 0.0)]
    fn parses_and_clamps(#[case] input: Value, #[case] expected: f64) {
        assert!((parse_percent(&input) - expected).abs() < 1e-9);
    }

    #[test]
    fn circular_gauge_offset_tracks_percent() {
        let PercentCell::Circular { label, circumference, dash_offset, .. } =
            PercentCell::build(&json!("85.7%"), PercentMode::Circular)
        else {
            panic!("esperaba gauge circular");
        };
        assert_eq!(label, "86%");
        let expected = circumference - 0.857 * circumference;
        assert!((dash_offset - expected).abs() < 1e-9);
        assert!((circumference - 2.0 * PI * 18.0).abs() < 1e-9);
    }

    #[rstest]
    #[case("Circular", PercentMode::Circular)]
    #[case(" VERTICAL ", PercentMode::Vertical)]
    #[case("horizontal", PercentMode::Horizontal)]
    #[case("Texto", PercentMode::Text)]
    fn mode_names_ignore_case(#[case] raw: &str, #[case] expected: PercentMode) {
        assert_eq!(PercentMode::parse(raw), expected);
    }

    #[test]
    fn saved_names_parse_back_to_the_same_mode() {
        for mode in PercentMode::ALL {
            assert_eq!(PercentMode::parse(mode.as_str()), mode);
        }
    }

    #[test]
    fn text_mode_uses_one_decimal_and_unknown_mode_is_text() {
        assert_eq!(PercentMode::parse("pizza"), PercentMode::Text);
        let cell = PercentCell::build(&json!(90), PercentMode::parse("texto"));
        assert_eq!(cell.label(), "90.0%");
        assert_eq!(parse_percent_text("100%"), 100.0);
    }
}
