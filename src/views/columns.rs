// ============================================================================
// COLUMNS - Descriptores declarativos de columnas
// ============================================================================

use crate::services::DrillDownKind;
use crate::views::percent_cell::{PercentCell, PercentMode};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRenderer {
    Text,
    SlaPercent(PercentMode),
    /// Número que abre un detalle si es > 0
    DrillDown(DrillDownKind),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    pub index: usize,
    pub label: String,
    pub renderer: CellRenderer,
    pub filterable: bool,
}

impl ColumnDescriptor {
    pub fn text(index: usize, label: &str) -> Self {
        Self { index, label: label.to_string(), renderer: CellRenderer::Text, filterable: true }
    }

    pub fn with_renderer(mut self, renderer: CellRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }
}

/// Celda ya resuelta por su renderer
#[derive(Debug, Clone, PartialEq)]
pub enum CellView {
    Text(String),
    Percent(PercentCell),
    DrillDown { value: String, kind: DrillDownKind },
}

impl CellView {
    pub fn is_clickable(&self) -> bool {
        matches!(self, CellView::DrillDown { .. })
    }
}

pub fn render_cell(column: &ColumnDescriptor, value: &str) -> CellView {
    match column.renderer {
        CellRenderer::Text => CellView::Text(value.to_string()),
        CellRenderer::SlaPercent(mode) => {
            CellView::Percent(PercentCell::build(&serde_json::Value::String(value.to_string()), mode))
        }
        CellRenderer::DrillDown(kind) => {
            let count: f64 = value.trim().parse().unwrap_or(0.0);
            if count > 0.0 {
                CellView::DrillDown { value: value.to_string(), kind }
            } else {
                CellView::Text(value.to_string())
            }
        }
    }
}

/// Columnas de la tabla de motoristas. El índice 0 es la posición de la
/// fila; el resto apunta a los valores de `IndicatorRow::display_values`.
pub fn driver_columns(header: &[String], percent_mode: PercentMode) -> Vec<ColumnDescriptor> {
    const DEFAULT_LABELS: [&str; 7] =
        ["Motorista", "Base", "Entregues", "Não entregues", "Total", "% SLA", "Entrada galpão"];

    let mut columns = vec![ColumnDescriptor::text(0, "#")];
    for (i, default_label) in DEFAULT_LABELS.into_iter().enumerate() {
        let label = header.get(i).map(String::as_str).unwrap_or(default_label);
        let column = ColumnDescriptor::text(i + 1, label);
        let column = match i {
            2 => column.with_renderer(CellRenderer::DrillDown(DrillDownKind::Delivered)),
            3 => column.with_renderer(CellRenderer::DrillDown(DrillDownKind::NotDelivered)),
            5 => column.with_renderer(CellRenderer::SlaPercent(percent_mode)),
            6 => column
                .with_renderer(CellRenderer::DrillDown(DrillDownKind::WarehouseEntries))
                .not_filterable(),
            _ => column,
        };
        columns.push(column);
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drill_down_only_clickable_when_positive() {
        let column = ColumnDescriptor::text(3, "Não entregues")
            .with_renderer(CellRenderer::DrillDown(DrillDownKind::NotDelivered));
        assert!(render_cell(&column, "4").is_clickable());
        assert!(!render_cell(&column, "0").is_clickable());
        assert!(!render_cell(&column, "n/a").is_clickable());
    }

    #[test]
    fn driver_columns_map_renderers_by_position() {
        let columns = driver_columns(&[], PercentMode::Circular);
        assert_eq!(columns.len(), 8);
        assert_eq!(columns[2].label, "Base");
        assert_eq!(columns[6].renderer, CellRenderer::SlaPercent(PercentMode::Circular));
        assert_eq!(columns[4].renderer, CellRenderer::DrillDown(DrillDownKind::NotDelivered));
        assert!(!columns[7].filterable);
    }

    #[test]
    fn percent_column_renders_gauge() {
        let column = ColumnDescriptor::text(6, "% SLA").with_renderer(CellRenderer::SlaPercent(PercentMode::Text));
        assert_eq!(
            render_cell(&column, "85.7%"),
            CellView::Percent(PercentCell::Text { label: "85.7%".into() })
        );
    }
}
