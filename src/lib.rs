// ============================================================================
// TORRE DASHBOARD - FRONTEND MVVM (RUST PURO)
// ============================================================================
// - Views: descriptores de celdas + render DOM
// - ViewModels: tablas paginadas, indicadores SLA, aviso de versión
// - Services: SOLO comunicación API
// - State: sesión, filtros, menús, notificaciones (Rc<RefCell>)
// - Models: estructuras compartidas con el backend
// ============================================================================

pub mod config;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod viewmodels;
pub mod views;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
pub mod dom;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    if config::CONFIG.enable_logging {
        wasm_logger::init(wasm_logger::Config::default());
    }
    log::info!("🚀 Torre Dashboard v{}", config::CONFIG.app_version);

    app::start()
}
