#[cfg(test)]
use std::cell::RefCell;

/// Efecto de navegación de la app
pub trait Navigator {
    /// Navega reemplazando la entrada actual del historial
    fn replace(&self, path: &str);
}

/// Registra las navegaciones (tests)
#[cfg(test)]
#[derive(Default)]
pub struct RecordingNavigator {
    visited: RefCell<Vec<String>>,
}

#[cfg(test)]
impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.borrow().clone()
    }
}

#[cfg(test)]
impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        self.visited.borrow_mut().push(path.to_string());
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserNavigator;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::Navigator;

    /// `location.replace`: el botón atrás no vuelve a la pantalla privada
    #[derive(Clone, Copy, Default)]
    pub struct BrowserNavigator;

    impl Navigator for BrowserNavigator {
        fn replace(&self, path: &str) {
            let Some(window) = web_sys::window() else {
                log::warn!("⚠️ Sin window, no se puede navegar a {}", path);
                return;
            };
            if let Err(e) = window.location().replace(path) {
                log::error!("❌ Error navegando a {}: {:?}", path, e);
            }
        }
    }
}
