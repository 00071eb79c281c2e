use serde::{Deserialize, Serialize};

/// Respuesta de `/api/check-update`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UpdateInfo {
    pub has_update: bool,
    pub version: Option<String>,
    pub tag_name: Option<String>,
    pub html_url: Option<String>,
    pub name: Option<String>,
}

impl UpdateInfo {
    /// Texto a mostrar en el aviso
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.tag_name.as_deref())
            .unwrap_or_default()
    }
}
