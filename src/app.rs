// ============================================================================
// APP - Bootstrap del navegador (wasm32)
// ============================================================================
// Arma el AppContext con las implementaciones del navegador, engancha el
// 401 global y pinta banners + indicadores SLA en los contenedores que
// existan en la página.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::config::CONFIG;
use crate::dom::{append_child, classify_pointer, clear_children, get_element_by_id, OutsidePointerListener};
use crate::services::transport::GlooTransport;
use crate::state::{AppContext, BridgeGuard, PointerTarget};
use crate::utils::navigation::BrowserNavigator;
use crate::utils::storage::BrowserStorage;
use crate::viewmodels::{IndicatorViewModel, UpdateViewModel};
use crate::views::banners::{render_notification, render_update_banner};
use crate::views::indicator_table::{
    column_trigger_id, render_base_table, render_bases_menu, render_cities_menu, render_column_menu,
    render_drill_down, render_driver_table, render_pagination, render_toolbar, BASES_MENU_ID, BASES_TRIGGER_ID,
    CITIES_MENU_ID, CITIES_TRIGGER_ID, COLUMN_MENU_ID,
};

const NOTIFICATION_ROOT: &str = "notification-root";
const UPDATE_ROOT: &str = "update-banner-root";
const SLA_ROOT: &str = "sla-indicadores";

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

struct IndicatorScreen {
    root: Element,
    vm: IndicatorViewModel,
    _outside: OutsidePointerListener,
}

impl Drop for IndicatorScreen {
    fn drop(&mut self) {
        self.vm.teardown();
    }
}

pub struct App {
    ctx: AppContext,
    updates: UpdateViewModel,
    indicators: Option<IndicatorScreen>,
    _bridge: BridgeGuard,
}

impl App {
    fn new() -> Result<Self, JsValue> {
        let ctx = AppContext::new(
            CONFIG.clone(),
            Rc::new(GlooTransport),
            Rc::new(BrowserStorage),
            Rc::new(BrowserNavigator),
        );
        let bridge = ctx.mount_unauthorized_bridge();
        let updates = UpdateViewModel::new(&ctx);

        let indicators = match get_element_by_id(SLA_ROOT) {
            Some(root) if ctx.session.is_authenticated() => Some(mount_indicators(&ctx, root)?),
            _ => None,
        };

        Ok(Self { ctx, updates, indicators, _bridge: bridge })
    }

    fn render(&self) -> Result<(), JsValue> {
        if let Some(root) = get_element_by_id(NOTIFICATION_ROOT) {
            clear_children(&root);
            if let Some(banner) = render_notification(&self.ctx.notifications.current())? {
                append_child(&root, &banner)?;
            }
        }

        if let Some(root) = get_element_by_id(UPDATE_ROOT) {
            clear_children(&root);
            if let Some(banner) = render_update_banner(&self.updates)? {
                append_child(&root, &banner)?;
            }
        }

        if let Some(screen) = &self.indicators {
            let vm = &screen.vm;
            clear_children(&screen.root);
            append_child(&screen.root, &render_toolbar(vm)?)?;
            append_child(&screen.root, &render_base_table(vm)?)?;
            append_child(&screen.root, &render_driver_table(vm)?)?;
            append_child(&screen.root, &render_pagination(vm)?)?;
            let overlays = [
                render_drill_down(vm)?,
                render_column_menu(vm)?,
                render_cities_menu(vm)?,
                render_bases_menu(vm)?,
            ];
            for overlay in overlays.into_iter().flatten() {
                append_child(&screen.root, &overlay)?;
            }
        }
        Ok(())
    }
}

fn mount_indicators(ctx: &AppContext, root: Element) -> Result<IndicatorScreen, JsValue> {
    let vm = IndicatorViewModel::new(ctx);

    let pointer_vm = vm.clone();
    let outside = OutsidePointerListener::attach(move |x, y| {
        let column = match pointer_vm.column_menu().open_key() {
            Some(key) => classify_pointer(
                x,
                y,
                get_element_by_id(COLUMN_MENU_ID).as_ref(),
                get_element_by_id(&column_trigger_id(key)).as_ref(),
            ),
            None => PointerTarget::Outside,
        };
        let cities = classify_pointer(
            x,
            y,
            get_element_by_id(CITIES_MENU_ID).as_ref(),
            get_element_by_id(CITIES_TRIGGER_ID).as_ref(),
        );
        let bases = classify_pointer(
            x,
            y,
            get_element_by_id(BASES_MENU_ID).as_ref(),
            get_element_by_id(BASES_TRIGGER_ID).as_ref(),
        );
        if pointer_vm.on_pointer_down(column, cities, bases) {
            rerender();
        }
    })?;

    let refresh_vm = vm.clone();
    wasm_bindgen_futures::spawn_local(async move {
        refresh_vm.refresh().await;
        rerender();
    });

    Ok(IndicatorScreen { root, vm, _outside: outside })
}

/// Arranque: contexto, listeners y tareas iniciales
pub fn start() -> Result<(), JsValue> {
    let app = App::new()?;

    let session = app.ctx.session.clone();
    let auth = app.ctx.auth.clone();
    let updates = app.updates.clone();

    app.ctx.notifications.subscribe(rerender);
    app.ctx.session.subscribe(rerender);
    app.updates.subscribe(rerender);

    app.render()?;
    APP.with(|cell| *cell.borrow_mut() = Some(app));

    wasm_bindgen_futures::spawn_local(async move {
        session.hydrate_profile(&auth).await;
    });
    wasm_bindgen_futures::spawn_local(async move {
        updates.check().await;
    });
    Ok(())
}

/// Re-render completo de lo montado
pub fn rerender() {
    APP.with(|cell| {
        let Ok(app) = cell.try_borrow() else {
            // Llamado desde dentro de un render: ya se está pintando
            return;
        };
        if let Some(app) = app.as_ref() {
            if let Err(e) = app.render() {
                log::error!("❌ Error re-renderizando: {:?}", e);
            }
        }
    });
}

/// Cierra la pantalla de indicadores (sus respuestas tardías se ignoran)
#[wasm_bindgen]
pub fn unmount_indicators() {
    APP.with(|cell| {
        if let Ok(mut app) = cell.try_borrow_mut() {
            if let Some(app) = app.as_mut() {
                app.indicators = None;
            }
        }
    });
}
