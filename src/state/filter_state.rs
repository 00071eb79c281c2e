// ============================================================================
// FILTER STATE - Filtros de una pantalla (fecha, bases, ciudades, columnas)
// ============================================================================
// Creado vacío por pantalla; solo cambia con toggle/clear. Cada mutación
// devuelve si algo cambió para que la tabla vuelva a la página 1.
// ============================================================================

use std::collections::{BTreeMap, BTreeSet};

use crate::models::Period;
use crate::services::IndicatorQuery;
use crate::utils::dates::today_utc;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    dates: Vec<String>,
    bases: BTreeSet<String>,
    cities: Vec<String>,
    period: Period,
    column_filters: BTreeMap<usize, Vec<String>>,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Fechas (selección única) ----

    /// Reemplaza la selección por `date`. Volver a elegir la misma la mantiene.
    pub fn select_date(&mut self, date: &str) -> bool {
        if self.dates.len() == 1 && self.dates[0] == date {
            return false;
        }
        self.dates = vec![date.to_string()];
        true
    }

    pub fn clear_dates(&mut self) -> bool {
        let changed = !self.dates.is_empty();
        self.dates.clear();
        changed
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Sin selección explícita se usa la fecha de hoy (UTC)
    pub fn effective_dates(&self) -> Vec<String> {
        if self.dates.is_empty() {
            vec![today_utc()]
        } else {
            self.dates.clone()
        }
    }

    // ---- Bases ----

    pub fn toggle_base(&mut self, base: &str) -> bool {
        if !self.bases.remove(base) {
            self.bases.insert(base.to_string());
        }
        true
    }

    pub fn set_bases<I: IntoIterator<Item = String>>(&mut self, bases: I) -> bool {
        let next: BTreeSet<String> = bases.into_iter().collect();
        let changed = next != self.bases;
        self.bases = next;
        changed
    }

    pub fn clear_bases(&mut self) -> bool {
        let changed = !self.bases.is_empty();
        self.bases.clear();
        changed
    }

    /// Bases seleccionadas, ordenadas
    pub fn bases(&self) -> Vec<String> {
        self.bases.iter().cloned().collect()
    }

    // ---- Ciudades ----

    pub fn toggle_city(&mut self, city: &str) -> bool {
        match self.cities.iter().position(|c| c == city) {
            Some(i) => {
                self.cities.remove(i);
            }
            None => self.cities.push(city.to_string()),
        }
        true
    }

    /// Selecciona todas las opciones conocidas
    pub fn select_all_cities(&mut self, options: &[String]) -> bool {
        let changed = self.cities != options;
        self.cities = options.to_vec();
        changed
    }

    pub fn deselect_all_cities(&mut self) -> bool {
        let changed = !self.cities.is_empty();
        self.cities.clear();
        changed
    }

    pub fn clear_cities(&mut self) -> bool {
        self.deselect_all_cities()
    }

    /// Quita ciudades que ya no están entre las opciones
    pub fn retain_cities(&mut self, options: &[String]) -> bool {
        let before = self.cities.len();
        self.cities.retain(|c| options.contains(c));
        before != self.cities.len()
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    // ---- Período ----

    pub fn set_period(&mut self, period: Period) -> bool {
        let changed = self.period != period;
        self.period = period;
        changed
    }

    pub fn period(&self) -> Period {
        self.period
    }

    // ---- Filtros por columna ----

    pub fn toggle_column_value(&mut self, column: usize, value: &str) -> bool {
        let value = value.trim().to_string();
        let values = self.column_filters.entry(column).or_default();
        match values.iter().position(|v| *v == value) {
            Some(i) => {
                values.remove(i);
            }
            None => values.push(value),
        }
        if values.is_empty() {
            self.column_filters.remove(&column);
        }
        true
    }

    /// Reemplaza la selección de una columna; vacía = sin filtro
    pub fn set_column_values(&mut self, column: usize, values: Vec<String>) -> bool {
        let values: Vec<String> = values.iter().map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).collect();
        if values.is_empty() {
            return self.clear_column(column);
        }
        if self.column_values(column) == values.as_slice() {
            return false;
        }
        self.column_filters.insert(column, values);
        true
    }

    pub fn clear_column(&mut self, column: usize) -> bool {
        self.column_filters.remove(&column).is_some()
    }

    pub fn clear_all_columns(&mut self) -> bool {
        let changed = !self.column_filters.is_empty();
        self.column_filters.clear();
        changed
    }

    pub fn column_values(&self, column: usize) -> &[String] {
        self.column_filters
            .get(&column)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn active_columns(&self) -> Vec<usize> {
        self.column_filters.keys().copied().collect()
    }

    /// La fila pasa si en cada columna activa su valor está entre los elegidos
    pub fn matches_row<S: AsRef<str>>(&self, cells: &[S]) -> bool {
        self.column_filters.iter().all(|(column, selected)| {
            let cell = cells.get(*column).map(|c| normalize(c.as_ref())).unwrap_or_default();
            selected.iter().any(|s| normalize(s) == cell)
        })
    }

    pub fn apply<'a, T, F>(&self, rows: &'a [T], cells_of: F) -> Vec<&'a T>
    where
        F: Fn(usize, &T) -> Vec<String>,
    {
        rows.iter()
            .enumerate()
            .filter(|(i, row)| self.matches_row(&cells_of(*i, row)))
            .map(|(_, row)| row)
            .collect()
    }

    /// Consulta de indicadores con el filtro actual
    pub fn indicator_query(&self) -> IndicatorQuery {
        IndicatorQuery {
            dates: self.effective_dates(),
            bases: self.bases(),
            period: self.period,
            cities: self.cities.clone(),
        }
    }
}

/// Valores distintos de una columna, sin vacíos, orden sin distinguir mayúsculas
pub fn unique_column_values<S: AsRef<str>>(rows: &[Vec<S>], column: usize) -> Vec<String> {
    let mut values: Vec<String> = Vec::new();
    for row in rows {
        let Some(cell) = row.get(column).map(|c| c.as_ref().trim()) else {
            continue;
        };
        if !cell.is_empty() && !values.iter().any(|v| v == cell) {
            values.push(cell.to_string());
        }
    }
    values.sort_by_cached_key(|v| v.to_lowercase());
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn setting_column_values_replaces_selection() {
        let mut filters = FilterState::new();
        filters.toggle_column_value(2, "BNU SC");
        assert!(filters.set_column_values(2, vec![" CWB PR ".to_string()]));
        assert_eq!(filters.column_values(2), ["CWB PR"]);
        assert!(!filters.set_column_values(2, vec!["CWB PR".to_string()]));
        assert!(filters.set_column_values(2, Vec::new()));
        assert!(filters.active_columns().is_empty());
    }

    #[test]
    fn toggling_a_base_twice_is_identity() {
        let mut filters = FilterState::new();
        filters.set_bases(vec!["CWB PR".to_string(), "BNU SC".to_string()]);
        let before = filters.clone();

        filters.toggle_base("JVL SC");
        filters.toggle_base("JVL SC");
        assert_eq!(filters, before);
    }

    #[test]
    fn removing_a_base_keeps_the_rest_sorted() {
        let mut filters = FilterState::new();
        filters.toggle_base("CWB PR");
        filters.toggle_base("BNU SC");
        assert_eq!(filters.bases(), vec!["BNU SC", "CWB PR"]);

        filters.toggle_base("CWB PR");
        assert_eq!(filters.bases(), vec!["BNU SC"]);
    }

    #[test]
    fn date_is_single_select_and_reselect_keeps_it() {
        let mut filters = FilterState::new();
        assert!(filters.select_date("2026-02-08"));
        assert!(filters.select_date("2026-02-09"));
        assert_eq!(filters.dates(), ["2026-02-09"]);

        assert!(!filters.select_date("2026-02-09"));
        assert_eq!(filters.dates(), ["2026-02-09"]);
    }

    #[test]
    fn empty_dates_default_to_today() {
        let filters = FilterState::new();
        assert_eq!(filters.effective_dates(), vec![today_utc()]);
    }

    #[test]
    fn column_entry_is_removed_when_emptied() {
        let mut filters = FilterState::new();
        filters.toggle_column_value(2, " BNU SC ");
        assert_eq!(filters.column_values(2), ["BNU SC"]);

        filters.toggle_column_value(2, "BNU SC");
        assert!(filters.active_columns().is_empty());
        assert!(!filters.clear_column(2));
    }

    #[rstest]
    #[case(vec!["1", "João", " bnu sc "], true)]
    #[case(vec!["2", "Maria", "CWB PR"], false)]
    #[case(vec!["3"], false)]
    fn column_match_is_trimmed_and_case_insensitive(#[case] cells: Vec<&str>, #[case] expected: bool) {
        let mut filters = FilterState::new();
        filters.toggle_column_value(2, "BNU SC");
        assert_eq!(filters.matches_row(&cells), expected);
    }

    #[test]
    fn cities_select_all_deselect_all_and_retain() {
        let options = vec!["Blumenau".to_string(), "Gaspar".to_string()];
        let mut filters = FilterState::new();
        filters.select_all_cities(&options);
        assert_eq!(filters.cities(), options.as_slice());

        assert!(filters.retain_cities(&options[..1]));
        assert_eq!(filters.cities(), ["Blumenau"]);

        assert!(filters.deselect_all_cities());
        assert!(filters.cities().is_empty());
    }

    #[test]
    fn indicator_query_reflects_filters() {
        let mut filters = FilterState::new();
        filters.select_date("2026-02-08");
        filters.set_period(Period::Pm);
        filters.toggle_city("Blumenau");
        let query = filters.indicator_query();
        assert_eq!(query.to_query_string().encode(), "datas=2026-02-08&periodo=PM&cidades=Blumenau");
    }

    #[test]
    fn unique_values_are_sorted_case_insensitively() {
        let rows = vec![
            vec!["1", "beta"],
            vec!["2", "Alpha"],
            vec!["3", " beta "],
            vec!["4", ""],
        ];
        assert_eq!(unique_column_values(&rows, 1), vec!["Alpha", "beta"]);
    }
}
