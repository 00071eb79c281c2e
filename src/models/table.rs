use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// TABLE SCOPE - Identificador de colección para el header X-Table-Id
// ============================================================================

/// Colección del backend a la que apunta una petición
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableScope {
    PhoneList,
    Orders,
    QueriedOrders,
    ConsultResults,
    Sla,
}

impl TableScope {
    pub const ALL: [TableScope; 5] = [
        TableScope::PhoneList,
        TableScope::Orders,
        TableScope::QueriedOrders,
        TableScope::ConsultResults,
        TableScope::Sla,
    ];

    /// Valor numérico enviado en `X-Table-Id`
    pub fn id(self) -> u8 {
        match self {
            TableScope::PhoneList => 1,
            TableScope::Orders => 2,
            TableScope::QueriedOrders => 3,
            TableScope::ConsultResults => 4,
            TableScope::Sla => 5,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|scope| scope.id() == id)
    }

    /// Ruta base de la colección
    pub fn base_path(self) -> &'static str {
        match self {
            TableScope::PhoneList => "/api/lista-telefones",
            TableScope::Orders => "/api/importe-tabela-pedidos",
            TableScope::QueriedOrders => "/api/importe-tabela-consulta-bipagems",
            TableScope::ConsultResults => "/api/resultados-consulta/motorista",
            TableScope::Sla => "/api/importe-tabela-sla",
        }
    }

    /// El listado de esta colección acepta `page`/`per_page`
    pub fn is_paginated(self) -> bool {
        !matches!(self, TableScope::PhoneList)
    }

    /// El backend expone `DELETE {base}/{id}`
    pub fn supports_row_delete(self) -> bool {
        matches!(
            self,
            TableScope::PhoneList | TableScope::Orders | TableScope::Sla
        )
    }
}

impl fmt::Display for TableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

// ============================================================================
// ROWS / PAGES
// ============================================================================

/// Celdas como strings: el backend a veces manda números o null
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect())
}

/// Fila tal como la devuelve el servidor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Row {
    #[serde(rename = "_id", default)]
    pub id: String,

    #[serde(default, deserialize_with = "lenient_strings")]
    pub values: Vec<String>,

    /// importDate, createdAt, status...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Row {
    pub fn import_date(&self) -> Option<&str> {
        self.extra.get("importDate")?.as_str()
    }
}

/// Respuesta de los listados paginados
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RowsResponse {
    pub data: Vec<Row>,
    pub total: u64,
    /// Solo viene en la página 1
    pub header: Option<Vec<String>>,
}

/// Página ya validada que consume la tabla
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub rows: Vec<Row>,
    pub total_rows: u64,
    pub current_page: u32,
    pub rows_per_page: u32,
    pub header: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatesResponse {
    pub datas: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeleteResponse {
    pub deleted: u64,
}

/// Resultado de los uploads multipart (cada endpoint rellena lo suyo)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UploadResponse {
    pub saved: Option<u64>,
    pub updated: Option<u64>,
    pub inserted: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scope_ids_are_fixed() {
        let ids: Vec<u8> = TableScope::ALL.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(TableScope::from_id(5), Some(TableScope::Sla));
        assert_eq!(TableScope::from_id(9), None);
        assert_eq!(TableScope::Orders.to_string(), "2");
    }

    #[test]
    fn row_keeps_extra_fields_and_stringifies_cells() {
        let row: Row = serde_json::from_value(json!({
            "_id": "r1",
            "values": ["BNU SC", 12, null],
            "importDate": "2026-02-08"
        }))
        .unwrap();
        assert_eq!(row.values, vec!["BNU SC", "12", ""]);
        assert_eq!(row.import_date(), Some("2026-02-08"));
        assert!(!row.extra.contains_key("_id"));
    }

    #[test]
    fn rows_response_tolerates_missing_fields() {
        let parsed: RowsResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(parsed, RowsResponse::default());
    }
}
