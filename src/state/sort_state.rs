// ============================================================================
// SORT STATE - Orden de la tabla de motoristas
// ============================================================================
// Se guarda en storage como {"sortBy": ..., "sortDir": ...}. Un valor
// ausente o corrupto vuelve al orden por nombre ascendente.
// ============================================================================

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::IndicatorRow;
use crate::utils::constants::SLA_SORT_STORAGE_KEY;
use crate::utils::storage::{load_from_storage, save_to_storage, KeyValueStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "nome")]
    Name,
    #[serde(rename = "base")]
    Base,
    #[serde(rename = "total")]
    Total,
    #[serde(rename = "totalEntregues")]
    Delivered,
    #[serde(rename = "naoEntregues")]
    NotDelivered,
    #[serde(rename = "percentualSla")]
    SlaPercent,
}

impl SortKey {
    fn is_numeric(self) -> bool {
        !matches!(self, SortKey::Name | SortKey::Base)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriverSort {
    #[serde(rename = "sortBy")]
    pub key: SortKey,
    #[serde(rename = "sortDir")]
    pub direction: SortDirection,
}

/// Opciones del selector de orden, con su etiqueta
pub static SORT_OPTIONS: [(DriverSort, &str); 12] = [
    (DriverSort::new(SortKey::Name, SortDirection::Asc), "Motorista A→Z"),
    (DriverSort::new(SortKey::Name, SortDirection::Desc), "Motorista Z→A"),
    (DriverSort::new(SortKey::Base, SortDirection::Asc), "Base A→Z"),
    (DriverSort::new(SortKey::Base, SortDirection::Desc), "Base Z→A"),
    (DriverSort::new(SortKey::Total, SortDirection::Desc), "Total (maior)"),
    (DriverSort::new(SortKey::Total, SortDirection::Asc), "Total (menor)"),
    (DriverSort::new(SortKey::Delivered, SortDirection::Desc), "Total entregues (maior)"),
    (DriverSort::new(SortKey::Delivered, SortDirection::Asc), "Total entregues (menor)"),
    (DriverSort::new(SortKey::NotDelivered, SortDirection::Desc), "Não entregues (maior)"),
    (DriverSort::new(SortKey::NotDelivered, SortDirection::Asc), "Não entregues (menor)"),
    (DriverSort::new(SortKey::SlaPercent, SortDirection::Desc), "% SLA (maior)"),
    (DriverSort::new(SortKey::SlaPercent, SortDirection::Asc), "% SLA (menor)"),
];

impl DriverSort {
    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn load(storage: &dyn KeyValueStorage) -> Self {
        load_from_storage(storage, SLA_SORT_STORAGE_KEY).unwrap_or_default()
    }

    pub fn save(&self, storage: &dyn KeyValueStorage) {
        if let Err(e) = save_to_storage(storage, SLA_SORT_STORAGE_KEY, self) {
            log::warn!("⚠️ No se pudo guardar el orden: {}", e);
        }
    }

    fn numeric(&self, row: &IndicatorRow) -> f64 {
        match self.key {
            SortKey::Total => row.total() as f64,
            SortKey::Delivered => row.delivered as f64,
            SortKey::NotDelivered => row.not_delivered as f64,
            SortKey::SlaPercent => row.sla_percent,
            SortKey::Name | SortKey::Base => 0.0,
        }
    }

    pub fn compare(&self, a: &IndicatorRow, b: &IndicatorRow) -> Ordering {
        let ordering = if self.key.is_numeric() {
            self.numeric(a).total_cmp(&self.numeric(b))
        } else {
            let text = |row: &IndicatorRow| match self.key {
                SortKey::Base => row.base_label().to_lowercase(),
                _ => row.nome.to_lowercase(),
            };
            text(a).cmp(&text(b))
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    /// Orden estable: los empates conservan el orden del servidor
    pub fn sort<T>(&self, rows: &mut [T], row_of: impl Fn(&T) -> &IndicatorRow) {
        rows.sort_by(|a, b| self.compare(row_of(a), row_of(b)));
    }
}
