// ============================================================================
// TABLE VIEWMODEL - Tabla paginada en el servidor (una por TableScope)
// ============================================================================
// Página, filtros y header viven aquí; la vista solo lee `snapshot()`.
// Cada carga lleva un ticket: una respuesta vieja nunca pisa a una nueva.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::{Page, Row, TableScope};
use crate::services::{ApiError, TableService, UploadFile};
use crate::state::{
    AnchoredMenu, AppContext, FilterState, NotificationState, Pagination, RequestGenerations, SessionStore,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSnapshot {
    pub page: Page,
    pub page_count: u32,
    pub loading: bool,
    pub error: Option<String>,
    pub available_dates: Vec<String>,
    pub selected_dates: Vec<String>,
    pub date_menu_open: bool,
}

struct TableState {
    rows: Vec<Row>,
    header: Vec<String>,
    pagination: Pagination,
    filters: FilterState,
    date_menu: AnchoredMenu,
    available_dates: Vec<String>,
    loading: bool,
    error: Option<String>,
}

#[derive(Clone)]
pub struct TableViewModel {
    scope: TableScope,
    tables: TableService,
    session: SessionStore,
    notifications: NotificationState,
    state: Rc<RefCell<TableState>>,
    generations: RequestGenerations,
}

impl TableViewModel {
    /// El tamaño de página inicial sale de `linhas_por_pagina` del usuario
    pub fn new(ctx: &AppContext, scope: TableScope) -> Self {
        let preferred = ctx.session.get_session().and_then(|s| s.rows_per_page_pref());
        Self {
            scope,
            tables: ctx.tables.clone(),
            session: ctx.session.clone(),
            notifications: ctx.notifications.clone(),
            state: Rc::new(RefCell::new(TableState {
                rows: Vec::new(),
                header: Vec::new(),
                pagination: Pagination::new(preferred, ctx.config.default_rows_per_page),
                filters: FilterState::new(),
                date_menu: AnchoredMenu::new(),
                available_dates: Vec::new(),
                loading: false,
                error: None,
            })),
            generations: RequestGenerations::new(),
        }
    }

    pub fn scope(&self) -> TableScope {
        self.scope
    }

    pub fn snapshot(&self) -> TableSnapshot {
        let state = self.state.borrow();
        let pagination = state.pagination;
        TableSnapshot {
            page: Page {
                rows: state.rows.clone(),
                total_rows: pagination.total_rows(),
                current_page: pagination.page(),
                rows_per_page: pagination.rows_per_page(),
                header: state.header.clone(),
            },
            page_count: pagination.page_count(),
            loading: state.loading,
            error: state.error.clone(),
            available_dates: state.available_dates.clone(),
            selected_dates: state.filters.dates().to_vec(),
            date_menu_open: state.date_menu.is_open(),
        }
    }

    /// Carga la página actual con los filtros actuales.
    /// Si el total nuevo deja la página fuera de rango, carga la última válida.
    pub async fn load(&self) {
        while self.load_once().await {}
    }

    /// `true` cuando el total recortó la página y hay que pedirla de nuevo
    async fn load_once(&self) -> bool {
        let ticket = self.generations.begin();
        let (page, per_page, dates) = {
            let mut state = self.state.borrow_mut();
            state.loading = true;
            state.error = None;
            (
                state.pagination.page(),
                state.pagination.rows_per_page(),
                state.filters.dates().to_vec(),
            )
        };

        let token = self.session.token();
        let result = self
            .tables
            .list_page(token.as_deref(), self.scope, page, per_page, &dates)
            .await;

        if !self.generations.is_current(ticket) {
            log::debug!("⏭️ Respuesta vieja de la tabla {} descartada", self.scope);
            return false;
        }

        let mut state = self.state.borrow_mut();
        state.loading = false;
        match result {
            Ok(response) => {
                let total = if self.scope.is_paginated() {
                    response.total
                } else {
                    response.total.max(response.data.len() as u64)
                };
                if let Some(header) = response.header.filter(|h| !h.is_empty()) {
                    state.header = header;
                }
                state.rows = response.data;
                state.pagination.set_total_rows(total);
                log::info!("📋 Tabla {}: {} filas (total {})", self.scope, state.rows.len(), total);
                let clamped = state.pagination.page();
                if clamped != page {
                    log::info!("↩️ Tabla {}: página {} fuera de rango, cargando {}", self.scope, page, clamped);
                    state.rows.clear();
                    return true;
                }
                false
            }
            Err(e) => {
                state.rows.clear();
                state.pagination.set_total_rows(0);
                state.error = Some(e.to_string());
                drop(state);
                self.notify_error(&e);
                false
            }
        }
    }

    pub async fn go_to_page(&self, page: u32) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let before = state.pagination.page();
            state.pagination.go_to(page) != before
        };
        if changed {
            self.load().await;
        }
    }

    pub async fn set_rows_per_page(&self, rows_per_page: u32) {
        let accepted = self.state.borrow_mut().pagination.set_rows_per_page(rows_per_page);
        if accepted {
            self.load().await;
        }
    }

    /// Fechas disponibles para el filtro
    pub async fn load_dates(&self) {
        let token = self.session.token();
        match self.tables.dates(token.as_deref(), self.scope).await {
            Ok(dates) => self.state.borrow_mut().available_dates = dates,
            Err(e) => {
                log::warn!("⚠️ No se pudieron cargar las fechas de {}: {}", self.scope, e);
                self.state.borrow_mut().available_dates.clear();
            }
        }
    }

    pub fn date_menu(&self) -> AnchoredMenu {
        self.state.borrow().date_menu.clone()
    }

    pub fn with_date_menu<R>(&self, f: impl FnOnce(&mut AnchoredMenu) -> R) -> R {
        f(&mut self.state.borrow_mut().date_menu)
    }

    /// Elección en el selector de fecha: cierra el menú y recarga desde la página 1
    pub async fn select_date(&self, date: &str) {
        let changed = {
            let mut state = self.state.borrow_mut();
            state.date_menu.choose();
            state.filters.select_date(date)
        };
        if changed {
            self.state.borrow_mut().pagination.reset();
            self.load().await;
        }
    }

    pub async fn clear_dates(&self) {
        let changed = self.state.borrow_mut().filters.clear_dates();
        if changed {
            self.state.borrow_mut().pagination.reset();
            self.load().await;
        }
    }

    pub async fn delete_all(&self, password: Option<&str>) -> Result<u64, ApiError> {
        let token = self.session.token();
        let result = self.tables.delete_all(token.as_deref(), self.scope, password).await;
        self.after_delete(result).await
    }

    pub async fn delete_row(&self, id: &str, password: Option<&str>) -> Result<u64, ApiError> {
        let token = self.session.token();
        let result = self.tables.delete_row(token.as_deref(), self.scope, id, password).await;
        self.after_delete(result).await
    }

    async fn after_delete(
        &self,
        result: Result<crate::models::DeleteResponse, ApiError>,
    ) -> Result<u64, ApiError> {
        match result {
            Ok(response) => {
                self.notifications
                    .success(&format!("{} registro(s) removido(s)", response.deleted));
                self.load_dates().await;
                self.load().await;
                Ok(response.deleted)
            }
            Err(e) => {
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    /// Sube una planilla y recarga fechas + página 1
    pub async fn upload(&self, file: UploadFile) -> Result<(), ApiError> {
        let token = self.session.token();
        match self.tables.upload(token.as_deref(), self.scope, file).await {
            Ok(response) => {
                let count = response.saved.or(response.inserted).or(response.updated).unwrap_or(0);
                self.notifications.success(&format!("{} registro(s) importado(s)", count));
                self.state.borrow_mut().pagination.reset();
                self.load_dates().await;
                self.load().await;
                Ok(())
            }
            Err(e) => {
                self.notify_error(&e);
                Err(e)
            }
        }
    }

    /// Teardown de la pantalla: respuestas en vuelo se ignoran
    pub fn teardown(&self) {
        self.generations.cancel();
    }

    fn notify_error(&self, error: &ApiError) {
        // El 401 ya cerró la sesión; no hay banner que mostrar
        if !error.is_unauthorized() {
            self.notifications.error(&error.to_string());
        }
    }
}
