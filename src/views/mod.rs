// ============================================================================
// VIEWS - Descriptores de celdas (puros) + render DOM (solo wasm32)
// ============================================================================

pub mod columns;
pub mod percent_cell;

#[cfg(target_arch = "wasm32")]
pub mod banners;
#[cfg(target_arch = "wasm32")]
pub mod indicator_table;

pub use columns::{driver_columns, render_cell, CellRenderer, CellView, ColumnDescriptor};
#[cfg(target_arch = "wasm32")]
pub use percent_cell::render_percent_cell;
pub use percent_cell::{parse_percent, PercentCell, PercentMode};
