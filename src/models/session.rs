use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Clave de la config del usuario con el tamaño de página preferido
pub const CONFIG_KEY_ROWS_PER_PAGE: &str = "linhas_por_pagina";

/// Clave de la config del usuario con el modo de la celda % SLA
pub const CONFIG_KEY_SLA_PERCENT_MODE: &str = "sla_acompanhamento_pct";

/// Sesión autenticada (token + perfil), serializada tal cual en localStorage.
///
/// Los nombres en el JSON son los del backend (`nome`, `foto`, `tabelas`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,

    #[serde(rename = "nome", default)]
    pub profile_name: String,

    #[serde(rename = "foto", default)]
    pub avatar_url: Option<String>,

    /// Ausente hasta la primera hidratación del perfil
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,

    /// Config por tabla (claves "1".."N")
    #[serde(rename = "tabelas", default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<Map<String, Value>>,
}

impl Session {
    pub fn new(token: impl Into<String>, profile_name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            profile_name: profile_name.into(),
            avatar_url: None,
            config: None,
            tables: None,
        }
    }

    /// Tiene token pero todavía no se trajo el perfil completo
    pub fn needs_hydration(&self) -> bool {
        !self.token.is_empty() && self.config.is_none()
    }

    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.as_ref()?.get(key)
    }

    /// `linhas_por_pagina` puede venir como número o como string
    pub fn rows_per_page_pref(&self) -> Option<u32> {
        match self.config_value(CONFIG_KEY_ROWS_PER_PAGE)? {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
