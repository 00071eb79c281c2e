use serde::{Deserialize, Serialize};

use crate::models::table::Row;
use crate::utils::constants::NO_BASE_LABEL;

/// Indicadores SLA de una base o de un motorista.
///
/// `delivered` son los pedidos entregues dentro del SLA y `not_delivered`
/// los que quedaron fuera; `sla_percent` lo calcula el servidor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IndicatorRow {
    pub nome: String,
    pub base: Option<String>,
    pub total: Option<u64>,
    #[serde(rename = "totalEntregues")]
    pub delivered: u64,
    #[serde(rename = "naoEntregues")]
    pub not_delivered: u64,
    #[serde(rename = "percentualSla")]
    pub sla_percent: f64,
    pub cidades: Vec<String>,
    #[serde(rename = "entradasGalpao")]
    pub warehouse_entries: u64,
}

impl IndicatorRow {
    pub fn total(&self) -> u64 {
        self.total.unwrap_or(self.delivered + self.not_delivered)
    }

    /// Base recortada, con etiqueta para motoristas sin base
    pub fn base_label(&self) -> String {
        match self.base.as_deref().map(str::trim) {
            Some(b) if !b.is_empty() => b.to_string(),
            _ => NO_BASE_LABEL.to_string(),
        }
    }

    /// Valores de la tabla de motoristas, en orden de columna (sin el ID)
    pub fn display_values(&self) -> Vec<String> {
        vec![
            self.nome.clone(),
            self.base_label(),
            self.delivered.to_string(),
            self.not_delivered.to_string(),
            self.total().to_string(),
            format!("{}%", self.sla_percent),
            self.warehouse_entries.to_string(),
        ]
    }
}

/// Período por horario de salida para entrega
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Period {
    #[default]
    All,
    Am,
    Pm,
}

impl Period {
    /// Valor del parámetro `periodo`; `All` no se envía
    pub fn query_value(self) -> Option<&'static str> {
        match self {
            Period::All => None,
            Period::Am => Some("AM"),
            Period::Pm => Some("PM"),
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AM" => Period::Am,
            "PM" => Period::Pm,
            _ => Period::All,
        }
    }
}

/// Respuesta de `/api/importe-tabela-sla/indicadores`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IndicatorsResponse {
    pub header: Vec<String>,
    #[serde(rename = "porBase")]
    pub by_base: Vec<IndicatorRow>,
    #[serde(rename = "porMotorista")]
    pub by_driver: Vec<IndicatorRow>,
}

/// Respuesta de los drill-downs (não entregues, entrada no galpão, entregues)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DrillDownResponse {
    pub data: Vec<Row>,
    pub header: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_server_shape() {
        let parsed: IndicatorsResponse = serde_json::from_value(json!({
            "header": ["Motorista"],
            "porBase": [{"nome": "BNU SC", "total": 10, "totalEntregues": 9, "naoEntregues": 1, "percentualSla": 90.0}],
            "porMotorista": [{"nome": "João", "base": " CWB PR ", "totalEntregues": 3, "naoEntregues": 1,
                              "percentualSla": 75.0, "cidades": ["Curitiba"], "entradasGalpao": 2}]
        }))
        .unwrap();
        assert_eq!(parsed.by_base[0].total(), 10);
        let driver = &parsed.by_driver[0];
        assert_eq!(driver.total(), 4);
        assert_eq!(driver.base_label(), "CWB PR");
        assert_eq!(driver.display_values()[5], "75%");
    }

    #[test]
    fn period_all_is_not_sent() {
        assert_eq!(Period::All.query_value(), None);
        assert_eq!(Period::parse("pm"), Period::Pm);
        assert_eq!(Period::parse("Todos"), Period::All);
    }

    #[test]
    fn missing_base_gets_label() {
        let row = IndicatorRow { nome: "X".into(), ..Default::default() };
        assert_eq!(row.base_label(), NO_BASE_LABEL);
    }
}
