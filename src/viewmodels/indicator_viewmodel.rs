// ============================================================================
// INDICATOR VIEWMODEL - Indicadores SLA por base y por motorista
// ============================================================================
// Cada cambio de filtro dispara un fetch nuevo; gana el último. Éxito =
// reemplazo atómico de header + listas; error = todo vacío.
// Filtros por columna, orden y paginación de motoristas son locales.
// ============================================================================

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

use crate::models::session::CONFIG_KEY_SLA_PERCENT_MODE;
use crate::models::{DrillDownResponse, IndicatorRow, IndicatorsResponse, Period};
use crate::services::{ApiError, AuthService, DrillDownKind, DrillDownQuery, IndicatorQuery, SlaService};
use crate::state::{
    unique_column_values, AnchorRect, AnchoredMenu, AppContext, DriverSort, FilterState, Pagination,
    PointerTarget, RequestGenerations, SessionStore,
};
use crate::utils::constants::{NO_BASE_LABEL, SLA_BASE_FILTER_STORAGE_KEY};
use crate::utils::storage::KeyValueStorage;
use crate::views::{driver_columns, ColumnDescriptor, PercentMode};

/// Columna de la tabla de motoristas con la base
pub const BASE_COLUMN: usize = 2;

/// Clave de la config con las bases elegidas por defecto
pub const CONFIG_KEY_SLA_BASES: &str = "bases_sla";

/// Detalle abierto desde una celda numérica de un motorista
#[derive(Debug, Clone, PartialEq)]
pub struct DrillDownDetail {
    pub kind: DrillDownKind,
    pub driver: String,
    pub base: String,
    pub response: DrillDownResponse,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndicatorSnapshot {
    pub loading: bool,
    pub header: Vec<String>,
    pub by_base: Vec<IndicatorRow>,
    pub by_driver: Vec<IndicatorRow>,
    /// Filas visibles (filtro por columna + orden + página), con su posición 1-based
    pub visible_drivers: Vec<(usize, IndicatorRow)>,
    pub filtered_driver_count: usize,
    /// Resumen por base recalculado con los motoristas filtrados
    pub filtered_by_base: Vec<IndicatorRow>,
    pub page: u32,
    pub page_count: u32,
    pub rows_per_page: u32,
    pub city_options: Vec<String>,
    pub base_options: Vec<String>,
    pub percent_mode: PercentMode,
    pub sort: DriverSort,
    pub detail: Option<DrillDownDetail>,
}

struct IndicatorState {
    loading: bool,
    data: IndicatorsResponse,
    /// Motoristas sin filtro de ciudad: fuente de las opciones de ciudad
    all_drivers: Vec<IndicatorRow>,
    /// Bases conocidas cuando no había bases seleccionadas
    base_options: Vec<String>,
    filters: FilterState,
    pagination: Pagination,
    sort: DriverSort,
    /// La base guardada del filtro por columna se aplica una sola vez
    base_filter_restored: bool,
    column_menu: AnchoredMenu<usize>,
    cities_menu: AnchoredMenu,
    bases_menu: AnchoredMenu,
    percent_mode: PercentMode,
    detail: Option<DrillDownDetail>,
}

#[derive(Clone)]
pub struct IndicatorViewModel {
    sla: SlaService,
    auth: AuthService,
    session: SessionStore,
    storage: Rc<dyn KeyValueStorage>,
    state: Rc<RefCell<IndicatorState>>,
    generations: RequestGenerations,
}

/// Celdas de un motorista como las ve el filtro por columna (0 = posición)
pub fn driver_cells(position: usize, row: &IndicatorRow) -> Vec<String> {
    let mut cells = vec![position.to_string()];
    cells.extend(row.display_values());
    cells
}

/// Suma entregues/não entregues por base; % con un decimal
pub fn summarize_by_base<'a>(drivers: impl IntoIterator<Item = &'a IndicatorRow>) -> Vec<IndicatorRow> {
    let mut summary: Vec<IndicatorRow> = Vec::new();
    for driver in drivers {
        let base = driver.base_label();
        let index = match summary.iter().position(|b| b.nome == base) {
            Some(index) => index,
            None => {
                summary.push(IndicatorRow { nome: base.clone(), base: Some(base), ..Default::default() });
                summary.len() - 1
            }
        };
        summary[index].delivered += driver.delivered;
        summary[index].not_delivered += driver.not_delivered;
    }
    for base in &mut summary {
        let total = base.delivered + base.not_delivered;
        base.total = Some(total);
        base.sla_percent = if total > 0 {
            (base.delivered as f64 / total as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };
    }
    summary
}

impl IndicatorViewModel {
    pub fn new(ctx: &AppContext) -> Self {
        let session = ctx.session.get_session();
        let preferred = session.as_ref().and_then(|s| s.rows_per_page_pref());
        let percent_mode = session
            .as_ref()
            .and_then(|s| s.config_value(CONFIG_KEY_SLA_PERCENT_MODE))
            .and_then(Value::as_str)
            .map(PercentMode::parse)
            .unwrap_or_default();

        let mut filters = FilterState::new();
        let saved_bases = session
            .as_ref()
            .and_then(|s| s.config_value(CONFIG_KEY_SLA_BASES))
            .and_then(Value::as_array)
            .map(|bases| bases.iter().filter_map(Value::as_str).map(str::to_string).collect::<Vec<_>>());
        if let Some(bases) = saved_bases {
            filters.set_bases(bases);
        }

        Self {
            sla: ctx.sla.clone(),
            auth: ctx.auth.clone(),
            session: ctx.session.clone(),
            storage: ctx.storage.clone(),
            state: Rc::new(RefCell::new(IndicatorState {
                loading: false,
                data: IndicatorsResponse::default(),
                all_drivers: Vec::new(),
                base_options: Vec::new(),
                filters,
                pagination: Pagination::new(preferred, ctx.config.default_indicator_rows_per_page),
                sort: DriverSort::load(ctx.storage.as_ref()),
                base_filter_restored: false,
                column_menu: AnchoredMenu::new(),
                cities_menu: AnchoredMenu::new(),
                bases_menu: AnchoredMenu::new(),
                percent_mode,
                detail: None,
            })),
            generations: RequestGenerations::new(),
        }
    }

    pub fn filters(&self) -> FilterState {
        self.state.borrow().filters.clone()
    }

    pub fn query(&self) -> IndicatorQuery {
        self.state.borrow().filters.indicator_query()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    // ========================================================================
    // FETCH
    // ========================================================================

    /// Trae los indicadores del filtro actual. Si alguna ciudad elegida ya no
    /// está entre las opciones, se quita y se vuelve a pedir.
    pub async fn refresh(&self) {
        loop {
            if !self.fetch_once().await {
                return;
            }
            if !self.prune_cities() {
                return;
            }
            log::debug!("🏙️ Ciudades fuera de las opciones, recargando");
        }
    }

    /// Quita las ciudades que ya no son opción; true si quitó alguna
    fn prune_cities(&self) -> bool {
        let mut state = self.state.borrow_mut();
        let options = Self::city_options_of(&state);
        let pruned = state.filters.retain_cities(&options);
        if pruned {
            state.pagination.reset();
        }
        pruned
    }

    /// Devuelve true si el resultado se aplicó
    async fn fetch_once(&self) -> bool {
        let ticket = self.generations.begin();
        let query = {
            let mut state = self.state.borrow_mut();
            state.loading = true;
            // Con carga en curso no queda abierto el menú de columna
            state.column_menu.close();
            state.filters.indicator_query()
        };
        let token = self.session.token();

        let result = self.fetch_both(token.as_deref(), &query).await;

        if !self.generations.is_current(ticket) {
            log::debug!("⏭️ Indicadores viejos descartados");
            return false;
        }

        let mut state = self.state.borrow_mut();
        state.loading = false;
        match result {
            Ok((data, all_drivers)) => {
                if query.bases.is_empty() {
                    state.base_options = data.by_base.iter().map(|b| b.nome.clone()).collect();
                }
                log::info!(
                    "📊 Indicadores: {} bases, {} motoristas",
                    data.by_base.len(),
                    data.by_driver.len()
                );
                state.data = data;
                state.all_drivers = all_drivers;
                self.restore_base_filter(&mut state);
                let filtered = Self::filtered_count(&state);
                state.pagination.set_total_rows(filtered as u64);
                true
            }
            Err(e) => {
                log::error!("❌ Error cargando indicadores: {}", e);
                state.data = IndicatorsResponse::default();
                state.all_drivers.clear();
                state.pagination.set_total_rows(0);
                false
            }
        }
    }

    async fn fetch_both(
        &self,
        token: Option<&str>,
        query: &IndicatorQuery,
    ) -> Result<(IndicatorsResponse, Vec<IndicatorRow>), ApiError> {
        let data = self.sla.indicators(token, query).await?;
        let all_drivers = if query.cities.is_empty() {
            data.by_driver.clone()
        } else {
            self.sla.indicators(token, &query.without_cities()).await?.by_driver
        };
        Ok((data, all_drivers))
    }

    /// Primera carga con motoristas: vuelve a aplicar la base guardada si sigue existiendo
    fn restore_base_filter(&self, state: &mut IndicatorState) {
        if state.base_filter_restored || state.data.by_driver.is_empty() {
            return;
        }
        state.base_filter_restored = true;
        let Some(saved) = self.storage.get_item(SLA_BASE_FILTER_STORAGE_KEY) else {
            return;
        };
        let saved = saved.trim();
        if saved.is_empty() || !state.data.by_driver.iter().any(|d| d.base_label() == saved) {
            return;
        }
        log::info!("🏷️ Filtro de base restaurado: {}", saved);
        state.filters.set_column_values(BASE_COLUMN, vec![saved.to_string()]);
    }

    /// Teardown: nada que llegue después se aplica
    pub fn teardown(&self) {
        self.generations.cancel();
    }

    // ========================================================================
    // FILTROS (cada cambio vuelve a la página 1 y recarga)
    // ========================================================================

    async fn mutate_and_refresh(&self, mutate: impl FnOnce(&mut FilterState) -> bool) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = mutate(&mut state.filters);
            if changed {
                state.pagination.reset();
            }
            changed
        };
        if changed {
            self.refresh().await;
        }
    }

    pub async fn select_date(&self, date: &str) {
        self.mutate_and_refresh(|f| f.select_date(date)).await;
    }

    pub async fn clear_dates(&self) {
        self.mutate_and_refresh(FilterState::clear_dates).await;
    }

    pub async fn set_period(&self, period: Period) {
        self.mutate_and_refresh(|f| f.set_period(period)).await;
    }

    pub async fn toggle_base(&self, base: &str) {
        self.mutate_and_refresh(|f| f.toggle_base(base)).await;
    }

    pub async fn clear_bases(&self) {
        self.mutate_and_refresh(FilterState::clear_bases).await;
    }

    pub async fn toggle_city(&self, city: &str) {
        self.mutate_and_refresh(|f| f.toggle_city(city)).await;
    }

    pub async fn select_all_cities(&self) {
        let options = self.city_options();
        self.mutate_and_refresh(|f| f.select_all_cities(&options)).await;
    }

    pub async fn deselect_all_cities(&self) {
        self.mutate_and_refresh(FilterState::deselect_all_cities).await;
    }

    // ========================================================================
    // FILTROS POR COLUMNA (locales; solo recargan si podan ciudades)
    // ========================================================================

    /// La columna de base es de selección única y se recuerda en storage
    pub async fn toggle_column_value(&self, column: usize, value: &str) {
        let storage = self.storage.clone();
        self.mutate_columns(|filters| {
            if column != BASE_COLUMN {
                return filters.toggle_column_value(column, value);
            }
            let value = value.trim();
            if filters.column_values(BASE_COLUMN).iter().any(|v| v == value) {
                remember_base_filter(storage.as_ref(), None);
                filters.clear_column(BASE_COLUMN)
            } else {
                remember_base_filter(storage.as_ref(), Some(value));
                filters.set_column_values(BASE_COLUMN, vec![value.to_string()])
            }
        })
        .await;
    }

    pub async fn clear_column(&self, column: usize) {
        if column == BASE_COLUMN {
            remember_base_filter(self.storage.as_ref(), None);
        }
        self.state.borrow_mut().column_menu.close();
        self.mutate_columns(|filters| filters.clear_column(column)).await;
    }

    async fn mutate_columns(&self, mutate: impl FnOnce(&mut FilterState) -> bool) {
        {
            let mut state = self.state.borrow_mut();
            if !mutate(&mut state.filters) {
                return;
            }
            state.pagination.reset();
            let filtered = Self::filtered_count(&state);
            state.pagination.set_total_rows(filtered as u64);
        }
        if self.prune_cities() {
            log::debug!("🏙️ Filtro de base dejó ciudades fuera, recargando");
            self.refresh().await;
        }
    }

    /// Guarda las bases actuales como predeterminadas en la config del usuario
    pub async fn save_bases_config(&self) -> Result<(), ApiError> {
        let bases = self.state.borrow().filters.bases();
        let mut patch = Map::new();
        patch.insert(CONFIG_KEY_SLA_BASES.to_string(), Value::from(bases));
        self.session.update_config(&self.auth, patch).await
    }

    /// Cambia el modo del % SLA y lo guarda en la config del usuario
    pub async fn set_percent_mode(&self, mode: PercentMode) -> Result<(), ApiError> {
        self.state.borrow_mut().percent_mode = mode;
        let mut patch = Map::new();
        patch.insert(CONFIG_KEY_SLA_PERCENT_MODE.to_string(), Value::from(mode.as_str()));
        self.session.update_config(&self.auth, patch).await
    }

    // ========================================================================
    // ORDEN Y PAGINACIÓN (locales)
    // ========================================================================

    pub fn set_sort(&self, sort: DriverSort) {
        self.state.borrow_mut().sort = sort;
        sort.save(self.storage.as_ref());
    }

    pub fn go_to_page(&self, page: u32) -> u32 {
        self.state.borrow_mut().pagination.go_to(page)
    }

    pub fn set_rows_per_page(&self, rows_per_page: u32) -> bool {
        self.state.borrow_mut().pagination.set_rows_per_page(rows_per_page)
    }

    // ========================================================================
    // MENÚS
    // ========================================================================

    pub fn toggle_column_menu(&self, column: usize, anchor: AnchorRect) {
        self.state.borrow_mut().column_menu.toggle(column, anchor);
    }

    pub fn toggle_cities_menu(&self, anchor: AnchorRect) {
        self.state.borrow_mut().cities_menu.toggle((), anchor);
    }

    pub fn toggle_bases_menu(&self, anchor: AnchorRect) {
        self.state.borrow_mut().bases_menu.toggle((), anchor);
    }

    pub fn set_column_search(&self, text: &str) {
        self.state.borrow_mut().column_menu.set_search(text);
    }

    pub fn set_cities_search(&self, text: &str) {
        self.state.borrow_mut().cities_menu.set_search(text);
    }

    /// pointerdown del documento, ya clasificado para cada menú.
    /// Devuelve true si cerró alguno.
    pub fn on_pointer_down(&self, column: PointerTarget, cities: PointerTarget, bases: PointerTarget) -> bool {
        let mut state = self.state.borrow_mut();
        let column = state.column_menu.on_pointer_down(column);
        let cities = state.cities_menu.on_pointer_down(cities);
        let bases = state.bases_menu.on_pointer_down(bases);
        column || cities || bases
    }

    pub fn column_menu(&self) -> AnchoredMenu<usize> {
        self.state.borrow().column_menu.clone()
    }

    pub fn cities_menu(&self) -> AnchoredMenu {
        self.state.borrow().cities_menu.clone()
    }

    pub fn bases_menu(&self) -> AnchoredMenu {
        self.state.borrow().bases_menu.clone()
    }

    /// Opciones del menú de columna abierto, filtradas por la búsqueda
    pub fn open_column_options(&self) -> Vec<String> {
        let state = self.state.borrow();
        let Some(column) = state.column_menu.open_key() else {
            return Vec::new();
        };
        let rows: Vec<Vec<String>> = state
            .data
            .by_driver
            .iter()
            .enumerate()
            .map(|(i, row)| driver_cells(i + 1, row))
            .collect();
        let options = unique_column_values(&rows, column);
        state.column_menu.visible_options(&options).into_iter().cloned().collect()
    }

    pub fn visible_city_options(&self) -> Vec<String> {
        let options = self.city_options();
        let state = self.state.borrow();
        state.cities_menu.visible_options(&options).into_iter().cloned().collect()
    }

    // ========================================================================
    // DRILL-DOWN
    // ========================================================================

    /// Consulta de drill-down para una celda (motorista + base) con el filtro actual
    pub fn drill_down_query(&self, driver: &str, base: &str) -> DrillDownQuery {
        let base = if base.trim() == NO_BASE_LABEL { "" } else { base };
        DrillDownQuery {
            driver: driver.to_string(),
            base: base.to_string(),
            filter: self.query(),
        }
    }

    pub async fn drill_down(
        &self,
        kind: DrillDownKind,
        driver: &str,
        base: &str,
    ) -> Result<DrillDownResponse, ApiError> {
        let query = self.drill_down_query(driver, base);
        let token = self.session.token();
        self.sla.drill_down(token.as_deref(), kind, &query).await
    }

    /// Trae el detalle y lo deja abierto; un error cierra el anterior
    pub async fn open_drill_down(&self, kind: DrillDownKind, driver: &str, base: &str) -> Result<(), ApiError> {
        let result = self.drill_down(kind, driver, base).await;
        let mut state = self.state.borrow_mut();
        match result {
            Ok(response) => {
                log::info!("🔎 {} filas de {:?} para {}", response.data.len(), kind, driver);
                state.detail = Some(DrillDownDetail {
                    kind,
                    driver: driver.to_string(),
                    base: base.to_string(),
                    response,
                });
                Ok(())
            }
            Err(e) => {
                log::error!("❌ Drill-down falló: {}", e);
                state.detail = None;
                Err(e)
            }
        }
    }

    pub fn close_drill_down(&self) {
        self.state.borrow_mut().detail = None;
    }

    // ========================================================================
    // DERIVADOS
    // ========================================================================

    /// Ciudades de los motoristas (sin filtro de ciudad), restringidas a las
    /// bases del filtro de columna de base
    pub fn city_options(&self) -> Vec<String> {
        Self::city_options_of(&self.state.borrow())
    }

    fn city_options_of(state: &IndicatorState) -> Vec<String> {
        let selected_bases: Vec<String> = state
            .filters
            .column_values(BASE_COLUMN)
            .iter()
            .map(|b| b.trim().to_lowercase())
            .collect();

        let mut cities: Vec<String> = Vec::new();
        for driver in &state.all_drivers {
            if !selected_bases.is_empty() {
                let base = driver.base_label().to_lowercase();
                if !selected_bases.contains(&base) {
                    continue;
                }
            }
            for city in &driver.cidades {
                if !city.trim().is_empty() && !cities.contains(city) {
                    cities.push(city.clone());
                }
            }
        }
        cities.sort_by_cached_key(|c| c.to_lowercase());
        cities
    }

    /// Motoristas que pasan el filtro por columna, en el orden del servidor
    fn column_filtered(state: &IndicatorState) -> Vec<(usize, IndicatorRow)> {
        state
            .data
            .by_driver
            .iter()
            .enumerate()
            .map(|(i, row)| (i + 1, row))
            .filter(|(position, row)| state.filters.matches_row(&driver_cells(*position, row)))
            .map(|(position, row)| (position, row.clone()))
            .collect()
    }

    fn filtered_drivers(state: &IndicatorState) -> Vec<(usize, IndicatorRow)> {
        let mut drivers = Self::column_filtered(state);
        state.sort.sort(&mut drivers, |(_, row)| row);
        drivers
    }

    fn filtered_count(state: &IndicatorState) -> usize {
        Self::column_filtered(state).len()
    }

    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        let state = self.state.borrow();
        driver_columns(&state.data.header, state.percent_mode)
    }

    pub fn snapshot(&self) -> IndicatorSnapshot {
        let state = self.state.borrow();
        let filtered = Self::filtered_drivers(&state);
        let (start, end) = state.pagination.slice_bounds(filtered.len());
        IndicatorSnapshot {
            loading: state.loading,
            header: state.data.header.clone(),
            by_base: state.data.by_base.clone(),
            by_driver: state.data.by_driver.clone(),
            visible_drivers: filtered[start..end].to_vec(),
            filtered_driver_count: filtered.len(),
            filtered_by_base: summarize_by_base(Self::column_filtered(&state).iter().map(|(_, row)| row)),
            page: state.pagination.page(),
            page_count: state.pagination.page_count(),
            rows_per_page: state.pagination.rows_per_page(),
            city_options: Self::city_options_of(&state),
            base_options: state.base_options.clone(),
            percent_mode: state.percent_mode,
            sort: state.sort,
            detail: state.detail.clone(),
        }
    }
}

fn remember_base_filter(storage: &dyn KeyValueStorage, base: Option<&str>) {
    let result = match base {
        Some(base) => storage.set_item(SLA_BASE_FILTER_STORAGE_KEY, base),
        None => storage.remove_item(SLA_BASE_FILTER_STORAGE_KEY),
    };
    if let Err(e) = result {
        log::warn!("⚠️ No se pudo guardar el filtro de base: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Session;
    use crate::services::transport::{HttpRequest, HttpResponse, RequestBody, Transport, TransportError};
    use crate::state::{SortDirection, SortKey};
    use crate::state::app_state::testing::test_context;
    use async_trait::async_trait;
    use futures::executor::block_on;
    use serde_json::json;

    fn driver(nome: &str, base: &str, cidades: &[&str]) -> Value {
        json!({"nome": nome, "base": base, "totalEntregues": 8, "naoEntregues": 2,
               "percentualSla": 80.0, "cidades": cidades})
    }

    fn indicators(drivers: Vec<Value>) -> Value {
        json!({"header": ["Motorista", "Base"], "porBase": [{"nome": "BNU SC"}, {"nome": "CWB PR"}],
               "porMotorista": drivers})
    }

    fn today_query(extra: &str) -> String {
        format!("datas={}{}", crate::utils::dates::today_utc(), extra)
    }

    #[test]
    fn refresh_replaces_lists_and_defaults_to_today() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        t.transport.push_json(200, indicators(vec![driver("Ana", "BNU SC", &["Blumenau"])]));

        block_on(vm.refresh());

        let snap = vm.snapshot();
        assert!(!snap.loading);
        assert_eq!(snap.by_base.len(), 2);
        assert_eq!(snap.by_driver[0].nome, "Ana");
        assert_eq!(snap.base_options, vec!["BNU SC", "CWB PR"]);
        assert_eq!(snap.rows_per_page, 25);
        let url = t.transport.last_request().unwrap().url;
        assert!(url.ends_with(&today_query("")), "{}", url);
    }

    #[test]
    fn failure_resets_everything_to_empty() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        t.transport.push_json(200, indicators(vec![driver("Ana", "BNU SC", &[])]));
        block_on(vm.refresh());

        t.transport.push_json(500, json!({"detail": "erro"}));
        block_on(vm.select_date("2026-02-08"));

        let snap = vm.snapshot();
        assert!(snap.by_base.is_empty());
        assert!(snap.by_driver.is_empty());
        assert!(snap.header.is_empty());
        assert!(snap.city_options.is_empty());
    }

    #[test]
    fn city_filter_triggers_unfiltered_driver_fetch() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        t.transport.push_json(200, indicators(vec![driver("Ana", "BNU SC", &["Blumenau", "Gaspar"])]));
        block_on(vm.refresh());

        t.transport.push_json(200, indicators(vec![driver("Ana", "BNU SC", &["Blumenau"])]));
        t.transport.push_json(
            200,
            indicators(vec![driver("Ana", "BNU SC", &["Blumenau", "Gaspar"]), driver("Rui", "CWB PR", &["Curitiba"])]),
        );
        block_on(vm.toggle_city("Blumenau"));

        let urls: Vec<String> = t.transport.requests().into_iter().map(|r| r.url).collect();
        assert!(urls[1].ends_with(&today_query("&cidades=Blumenau")));
        assert!(urls[2].ends_with(&today_query("")));
        assert_eq!(vm.city_options(), vec!["Blumenau", "Curitiba", "Gaspar"]);
    }

    #[test]
    fn city_options_follow_base_column_filter() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        t.transport.push_json(
            200,
            indicators(vec![
                driver("Ana", "BNU SC", &["Gaspar", "blumenau"]),
                driver("Rui", " CWB PR ", &["Curitiba"]),
            ]),
        );
        block_on(vm.refresh());

        block_on(vm.toggle_column_value(BASE_COLUMN, "cwb pr"));
        assert_eq!(vm.city_options(), vec!["Curitiba"]);
        let snap = vm.snapshot();
        assert_eq!(snap.filtered_driver_count, 1);
        assert_eq!(snap.visible_drivers[0].0, 2);
        assert_eq!(t.storage.get_item(SLA_BASE_FILTER_STORAGE_KEY).as_deref(), Some("cwb pr"));

        block_on(vm.clear_column(BASE_COLUMN));
        assert_eq!(vm.city_options(), vec!["blumenau", "Curitiba", "Gaspar"]);
        assert_eq!(t.storage.get_item(SLA_BASE_FILTER_STORAGE_KEY), None);
        // Sin ciudades elegidas no hay nada que podar: solo el fetch inicial
        assert_eq!(t.transport.requests().len(), 1);
    }

    #[test]
    fn base_column_filter_prunes_selected_city_and_refetches() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        let both = || indicators(vec![driver("Ana", "BNU SC", &["Blumenau"]), driver("Rui", "CWB PR", &["Curitiba"])]);
        t.transport.push_json(200, both());
        block_on(vm.refresh());

        t.transport.push_json(200, indicators(vec![driver("Ana", "BNU SC", &["Blumenau"])]));
        t.transport.push_json(200, both());
        block_on(vm.toggle_city("Blumenau"));
        assert_eq!(vm.filters().cities(), ["Blumenau"]);

        t.transport.push_json(200, both());
        block_on(vm.toggle_column_value(BASE_COLUMN, "CWB PR"));

        assert!(vm.filters().cities().is_empty());
        assert_eq!(t.transport.requests().len(), 4);
        assert!(t.transport.last_request().unwrap().url.ends_with(&today_query("")));
        let snap = vm.snapshot();
        assert_eq!(snap.page, 1);
        assert_eq!(snap.filtered_driver_count, 1);
        assert_eq!(snap.visible_drivers[0].1.nome, "Rui");
    }

    #[test]
    fn base_column_is_single_choice() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        t.transport.push_json(200, indicators(vec![driver("Ana", "BNU SC", &[]), driver("Rui", "CWB PR", &[])]));
        block_on(vm.refresh());

        block_on(vm.toggle_column_value(BASE_COLUMN, "BNU SC"));
        block_on(vm.toggle_column_value(BASE_COLUMN, "CWB PR"));
        assert_eq!(vm.filters().column_values(BASE_COLUMN), ["CWB PR"]);
        assert_eq!(t.storage.get_item(SLA_BASE_FILTER_STORAGE_KEY).as_deref(), Some("CWB PR"));

        block_on(vm.toggle_column_value(BASE_COLUMN, "CWB PR"));
        assert!(vm.filters().column_values(BASE_COLUMN).is_empty());
        assert_eq!(t.storage.get_item(SLA_BASE_FILTER_STORAGE_KEY), None);
    }

    #[test]
    fn saved_base_filter_is_restored_once_when_base_exists() {
        let t = test_context(Some("t"));
        t.storage.set_item(SLA_BASE_FILTER_STORAGE_KEY, " CWB PR ").unwrap();
        let vm = IndicatorViewModel::new(&t.ctx);
        t.transport.push_json(200, indicators(vec![]));
        block_on(vm.refresh());
        assert!(vm.filters().active_columns().is_empty());

        t.transport.push_json(200, indicators(vec![driver("Ana", "BNU SC", &[]), driver("Rui", "CWB PR", &[])]));
        block_on(vm.refresh());
        assert_eq!(vm.filters().column_values(BASE_COLUMN), ["CWB PR"]);
        assert_eq!(vm.snapshot().filtered_driver_count, 1);

        block_on(vm.clear_column(BASE_COLUMN));
        t.transport.push_json(200, indicators(vec![driver("Rui", "CWB PR", &[])]));
        block_on(vm.refresh());
        assert!(vm.filters().active_columns().is_empty());
    }

    #[test]
    fn unknown_saved_base_is_ignored() {
        let t = test_context(Some("t"));
        t.storage.set_item(SLA_BASE_FILTER_STORAGE_KEY, "JVL SC").unwrap();
        let vm = IndicatorViewModel::new(&t.ctx);
        t.transport.push_json(200, indicators(vec![driver("Ana", "BNU SC", &[])]));
        block_on(vm.refresh());
        assert!(vm.filters().active_columns().is_empty());
    }

    #[test]
    fn sort_orders_visible_drivers_and_is_remembered() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        let mut low = driver("Ana", "BNU SC", &[]);
        low["percentualSla"] = json!(40.0);
        t.transport.push_json(200, indicators(vec![low, driver("Rui", "CWB PR", &[]), driver("bia", "BNU SC", &[])]));
        block_on(vm.refresh());

        let names = |vm: &IndicatorViewModel| -> Vec<String> {
            vm.snapshot().visible_drivers.into_iter().map(|(_, row)| row.nome).collect()
        };
        assert_eq!(names(&vm), vec!["Ana", "bia", "Rui"]);

        vm.set_sort(DriverSort::new(SortKey::SlaPercent, SortDirection::Asc));
        assert_eq!(names(&vm), vec!["Ana", "Rui", "bia"]);
        // Posición = orden del servidor
        assert_eq!(vm.snapshot().visible_drivers[1].0, 2);

        let again = IndicatorViewModel::new(&t.ctx);
        assert_eq!(again.snapshot().sort, DriverSort::new(SortKey::SlaPercent, SortDirection::Asc));
    }

    #[test]
    fn base_summary_follows_column_filters() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        let no_base = json!({"nome": "Zé", "totalEntregues": 1, "naoEntregues": 2, "percentualSla": 33.3});
        t.transport.push_json(
            200,
            indicators(vec![driver("Ana", "BNU SC", &[]), driver("Bia", " BNU SC", &[]), driver("Rui", "CWB PR", &[]), no_base]),
        );
        block_on(vm.refresh());

        let summary = vm.snapshot().filtered_by_base;
        let names: Vec<&str> = summary.iter().map(|b| b.nome.as_str()).collect();
        assert_eq!(names, vec!["BNU SC", "CWB PR", NO_BASE_LABEL]);
        assert_eq!((summary[0].delivered, summary[0].not_delivered, summary[0].total()), (16, 4, 20));
        assert_eq!(summary[0].sla_percent, 80.0);
        assert_eq!(summary[2].sla_percent, 33.3);

        block_on(vm.toggle_column_value(1, "Ana"));
        let summary = vm.snapshot().filtered_by_base;
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].total(), 10);
        // El resumen del servidor no cambia
        assert_eq!(vm.snapshot().by_base.len(), 2);
    }

    #[test]
    fn selected_city_outside_options_is_pruned_and_refetched() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        // Ciudad elegida que ya no aparece en la lista completa
        t.transport.push_json(200, indicators(vec![]));
        t.transport.push_json(200, indicators(vec![driver("Ana", "BNU SC", &["Blumenau"])]));
        t.transport.push_json(200, indicators(vec![driver("Ana", "BNU SC", &["Blumenau"])]));
        block_on(vm.toggle_city("Itajaí"));

        assert!(vm.filters().cities().is_empty());
        let last = t.transport.last_request().unwrap().url;
        assert!(last.ends_with(&today_query("")));
        assert_eq!(t.transport.requests().len(), 3);
    }

    /// Dispara otra carga mientras la primera está "en vuelo"
    struct ReentrantTransport {
        vm: RefCell<Option<IndicatorViewModel>>,
        sent: RefCell<u32>,
    }

    #[async_trait(?Send)]
    impl Transport for ReentrantTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            *self.sent.borrow_mut() += 1;
            let first = *self.sent.borrow() == 1;
            if first {
                let vm = self.vm.borrow().clone();
                if let Some(vm) = vm {
                    // Filtro nuevo mientras el primer fetch no volvió
                    vm.state.borrow_mut().filters.set_period(Period::Pm);
                    vm.refresh().await;
                }
                return Ok(HttpResponse::new(200, &indicators(vec![driver("Velho", "X", &[])]).to_string()));
            }
            Ok(HttpResponse::new(200, &indicators(vec![driver("Novo", "Y", &[])]).to_string()))
        }
    }

    #[test]
    fn stale_response_does_not_overwrite_newer_one() {
        let t = test_context(Some("t"));
        let transport = Rc::new(ReentrantTransport { vm: RefCell::new(None), sent: RefCell::new(0) });
        let mut ctx = t.ctx.clone();
        ctx.sla = SlaService::new(crate::services::ApiClient::new("http://api", transport.clone()));
        let vm = IndicatorViewModel::new(&ctx);
        *transport.vm.borrow_mut() = Some(vm.clone());

        block_on(vm.refresh());

        let snap = vm.snapshot();
        assert_eq!(snap.by_driver.len(), 1);
        assert_eq!(snap.by_driver[0].nome, "Novo");
        assert!(!snap.loading);
    }

    #[test]
    fn saved_config_sets_bases_and_percent_mode() {
        let t = test_context(None);
        let mut session = Session::new("t", "ana");
        session.config = Some(
            json!({"bases_sla": ["CWB PR", "BNU SC"], "sla_acompanhamento_pct": "circular"})
                .as_object()
                .unwrap()
                .clone(),
        );
        t.ctx.session.login(session);

        let vm = IndicatorViewModel::new(&t.ctx);
        assert_eq!(vm.filters().bases(), vec!["BNU SC", "CWB PR"]);
        assert_eq!(vm.snapshot().percent_mode, PercentMode::Circular);
        assert_eq!(vm.columns()[6].renderer, crate::views::CellRenderer::SlaPercent(PercentMode::Circular));
    }

    #[test]
    fn percent_mode_change_is_saved_in_user_config() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        t.transport.push_json(200, json!({"config": {"sla_acompanhamento_pct": "circular"}}));

        assert_eq!(block_on(vm.set_percent_mode(PercentMode::Circular)), Ok(()));
        assert_eq!(vm.snapshot().percent_mode, PercentMode::Circular);
        let request = t.transport.last_request().unwrap();
        assert_eq!(request.body, RequestBody::Json(r#"{"config":{"sla_acompanhamento_pct":"circular"}}"#.into()));
        assert_eq!(IndicatorViewModel::new(&t.ctx).snapshot().percent_mode, PercentMode::Circular);
    }

    #[test]
    fn drill_down_detail_opens_and_closes() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        t.transport.push_json(200, json!({"data": [{"_id": "p1", "values": ["JMS1"]}], "header": ["Pedido"]}));

        block_on(vm.open_drill_down(DrillDownKind::Delivered, "Ana", "BNU SC")).unwrap();
        let detail = vm.snapshot().detail.unwrap();
        assert_eq!((detail.kind, detail.driver.as_str()), (DrillDownKind::Delivered, "Ana"));
        assert_eq!(detail.response.header, vec!["Pedido"]);

        t.transport.push_json(500, json!({}));
        assert!(block_on(vm.open_drill_down(DrillDownKind::Delivered, "Ana", "BNU SC")).is_err());
        assert_eq!(vm.snapshot().detail, None);

        t.transport.push_json(200, json!({"data": []}));
        block_on(vm.open_drill_down(DrillDownKind::NotDelivered, "Rui", "CWB PR")).unwrap();
        vm.close_drill_down();
        assert_eq!(vm.snapshot().detail, None);
    }

    #[test]
    fn drill_down_query_uses_current_filter_and_drops_placeholder_base() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        t.transport.push_json(500, json!({}));
        block_on(vm.set_period(Period::Am));

        let query = vm.drill_down_query("Ana", NO_BASE_LABEL);
        assert_eq!(query.to_query_string().encode(), today_query("").replace("datas", "motorista=Ana&datas") + "&periodo=AM");

        t.transport.push_json(200, json!({"data": [{"_id": "p1", "values": ["JMS1"]}], "header": ["Pedido"]}));
        let detail = block_on(vm.drill_down(DrillDownKind::NotDelivered, "Ana", "BNU SC")).unwrap();
        assert_eq!(detail.data[0].id, "p1");
        assert!(t.transport.last_request().unwrap().url.contains("/nao-entregues?motorista=Ana&base=BNU%20SC"));
    }

    #[test]
    fn column_menu_lists_unique_values_of_open_column() {
        let t = test_context(Some("t"));
        let vm = IndicatorViewModel::new(&t.ctx);
        t.transport.push_json(
            200,
            indicators(vec![driver("Ana", "BNU SC", &[]), driver("Rui", "bnu sc", &[]), driver("Zé", "CWB PR", &[])]),
        );
        block_on(vm.refresh());

        vm.toggle_column_menu(BASE_COLUMN, AnchorRect::default());
        assert_eq!(vm.open_column_options(), vec!["BNU SC", "bnu sc", "CWB PR"]);
        vm.set_column_search("cwb");
        assert_eq!(vm.open_column_options(), vec!["CWB PR"]);

        assert!(vm.on_pointer_down(PointerTarget::Outside, PointerTarget::Outside, PointerTarget::Outside));
        assert!(!vm.column_menu().is_open());
        assert!(!vm.on_pointer_down(PointerTarget::Outside, PointerTarget::Outside, PointerTarget::Outside));
        assert!(vm.open_column_options().is_empty());
    }
}
