// ============================================================================
// STORAGE - Almacenamiento clave/valor duradero
// ============================================================================
// En el navegador es localStorage; en tests, un mapa en memoria.
// ============================================================================

use serde::{de::DeserializeOwned, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

/// Almacenamiento clave/valor de strings (contrato de localStorage)
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove_item(&self, key: &str) -> Result<(), String>;
}

pub fn save_to_storage<T: Serialize>(
    storage: &dyn KeyValueStorage,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let json = serde_json::to_string(value)
        .map_err(|e| format!("Error serializando datos: {}", e))?;
    storage.set_item(key, &json)
}

/// JSON inválido o ausente devuelve None, nunca un error
pub fn load_from_storage<T: DeserializeOwned>(storage: &dyn KeyValueStorage, key: &str) -> Option<T> {
    let json = storage.get_item(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("⚠️ Valor corrupto en storage '{}': {}", key, e);
            None
        }
    }
}

/// Almacenamiento en memoria (tests y entornos sin localStorage)
#[derive(Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.items.borrow_mut().insert(key.to_string(), value.to_string());
        storage
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), String> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStorage;

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::KeyValueStorage;
    use web_sys::{window, Storage};

    /// localStorage del navegador
    #[derive(Clone, Copy, Default)]
    pub struct BrowserStorage;

    fn local_storage() -> Option<Storage> {
        window()?.local_storage().ok()?
    }

    impl KeyValueStorage for BrowserStorage {
        fn get_item(&self, key: &str) -> Option<String> {
            local_storage()?.get_item(key).ok()?
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
            let storage = local_storage().ok_or("No se pudo acceder a localStorage")?;
            storage
                .set_item(key, value)
                .map_err(|_| "Error guardando en localStorage".to_string())
        }

        fn remove_item(&self, key: &str) -> Result<(), String> {
            let storage = local_storage().ok_or("No se pudo acceder a localStorage")?;
            storage
                .remove_item(key)
                .map_err(|_| "Error eliminando de localStorage".to_string())
        }
    }
}
