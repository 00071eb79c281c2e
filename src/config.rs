// ============================================================================
// CONFIG - Configuración resuelta en tiempo de compilación
// ============================================================================
// build.rs copia las claves de .env a rustc-env; aquí se leen con option_env!
// y no se vuelven a resolver en runtime.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Tamaños de página aceptados por las tablas paginadas
pub const ROWS_PER_PAGE_OPTIONS: [u32; 6] = [10, 25, 50, 100, 200, 500];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend_url: String,
    pub app_version: String,
    pub enable_logging: bool,
    /// Tamaño de página por defecto de las tablas del servidor
    pub default_rows_per_page: u32,
    /// Tamaño de página por defecto de la tabla de indicadores SLA
    pub default_indicator_rows_per_page: u32,
    pub notification_timeout_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            enable_logging: true,
            default_rows_per_page: 100,
            default_indicator_rows_per_page: 25,
            notification_timeout_ms: 5000,
        }
    }
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno en tiempo de compilación
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend_url: option_env!("BACKEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_url),
            app_version: option_env!("APP_VERSION")
                .map(|v| v.to_string())
                .unwrap_or(defaults.app_version),
            enable_logging: option_env!("ENABLE_LOGGING")
                .unwrap_or("true")
                .parse()
                .unwrap_or(true),
            default_rows_per_page: option_env!("DEFAULT_ROWS_PER_PAGE")
                .and_then(|v| v.parse().ok())
                .filter(|n| ROWS_PER_PAGE_OPTIONS.contains(n))
                .unwrap_or(defaults.default_rows_per_page),
            default_indicator_rows_per_page: defaults.default_indicator_rows_per_page,
            notification_timeout_ms: defaults.notification_timeout_ms,
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }
}

/// Valida un tamaño de página contra las opciones permitidas
pub fn valid_rows_per_page(candidate: Option<u32>, fallback: u32) -> u32 {
    match candidate {
        Some(n) if ROWS_PER_PAGE_OPTIONS.contains(&n) => n,
        _ => fallback,
    }
}

lazy_static::lazy_static! {
    pub static ref CONFIG: AppConfig = AppConfig::from_env();
}
