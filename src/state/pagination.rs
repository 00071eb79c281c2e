// ============================================================================
// PAGINATION - Página actual, tamaño de página y total de filas
// ============================================================================
// La página siempre queda en [1, page_count]; page_count nunca es 0.
// ============================================================================

use crate::config::{valid_rows_per_page, ROWS_PER_PAGE_OPTIONS};

/// Página actual (1-based) y tamaño de página de una tabla
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    rows_per_page: u32,
    total_rows: u64,
}

/// Cantidad de páginas; una tabla vacía tiene una
pub fn page_count(total_rows: u64, rows_per_page: u32) -> u32 {
    let per_page = u64::from(rows_per_page.max(1));
    let pages = total_rows.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

impl Pagination {
    /// `preferred` viene de la config del usuario; si no es válido, `fallback`
    pub fn new(preferred: Option<u32>, fallback: u32) -> Self {
        Self {
            page: 1,
            rows_per_page: valid_rows_per_page(preferred, fallback),
            total_rows: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn rows_per_page(&self) -> u32 {
        self.rows_per_page
    }

    pub fn total_rows(&self) -> u64 {
        self.total_rows
    }

    pub fn page_count(&self) -> u32 {
        page_count(self.total_rows, self.rows_per_page)
    }

    /// Ajusta el total y re-encaja la página actual
    pub fn set_total_rows(&mut self, total: u64) {
        self.total_rows = total;
        self.page = self.page.clamp(1, self.page_count());
    }

    pub fn go_to(&mut self, page: u32) -> u32 {
        self.page = page.clamp(1, self.page_count());
        self.page
    }

    /// Solo acepta tamaños permitidos; cualquier cambio vuelve a la página 1
    pub fn set_rows_per_page(&mut self, rows_per_page: u32) -> bool {
        if !ROWS_PER_PAGE_OPTIONS.contains(&rows_per_page) {
            log::warn!("⚠️ Tamaño de página no permitido: {}", rows_per_page);
            return false;
        }
        self.rows_per_page = rows_per_page;
        self.page = 1;
        true
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Rango [start, end) de la página actual sobre `len` filas locales
    pub fn slice_bounds(&self, len: usize) -> (usize, usize) {
        let per_page = self.rows_per_page as usize;
        let start = (self.page as usize - 1).saturating_mul(per_page).min(len);
        (start, (start + per_page).min(len))
    }
}
