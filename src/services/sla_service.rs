// ============================================================================
// SLA SERVICE - Indicadores y drill-downs del SLA
// ============================================================================

use crate::models::{DrillDownResponse, IndicatorsResponse, Period, TableScope};
use crate::services::api_client::{decode_lenient, require_token, ApiClient, QueryString};
use crate::services::error::ApiError;
use crate::services::transport::HttpMethod;

/// Filtro compuesto que se envía a `/indicadores`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndicatorQuery {
    pub dates: Vec<String>,
    pub bases: Vec<String>,
    pub period: Period,
    pub cities: Vec<String>,
}

impl IndicatorQuery {
    /// Misma consulta sin filtro de ciudades (lista completa de motoristas)
    pub fn without_cities(&self) -> Self {
        Self { cities: Vec::new(), ..self.clone() }
    }

    pub fn to_query_string(&self) -> QueryString {
        QueryString::new()
            .list("datas", &self.dates)
            .list("bases", &self.bases)
            .opt_param("periodo", self.period.query_value())
            .list("cidades", &self.cities)
    }
}

/// Detalle que se abre al hacer clic en una celda numérica
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillDownKind {
    NotDelivered,
    WarehouseEntries,
    Delivered,
}

impl DrillDownKind {
    pub fn path(self) -> &'static str {
        match self {
            DrillDownKind::NotDelivered => "/api/importe-tabela-sla/nao-entregues",
            DrillDownKind::WarehouseEntries => "/api/importe-tabela-sla/entrada-galpao",
            DrillDownKind::Delivered => "/api/importe-tabela-sla/entregues",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DrillDownQuery {
    pub driver: String,
    pub base: String,
    pub filter: IndicatorQuery,
}

impl DrillDownQuery {
    pub fn to_query_string(&self) -> QueryString {
        QueryString::new()
            .param("motorista", self.driver.trim())
            .param("base", self.base.trim())
            .list("datas", &self.filter.dates)
            .opt_param("periodo", self.filter.period.query_value())
            .list("cidades", &self.filter.cities)
    }
}

const INDICATORS_PATH: &str = "/api/importe-tabela-sla/indicadores";

#[derive(Clone)]
pub struct SlaService {
    api: ApiClient,
}

impl SlaService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn indicators(
        &self,
        token: Option<&str>,
        query: &IndicatorQuery,
    ) -> Result<IndicatorsResponse, ApiError> {
        let token = require_token(token)?;
        let path = query.to_query_string().to_path(INDICATORS_PATH);
        let data = self
            .api
            .call(&path, HttpMethod::Get, None, Some(token), Some(TableScope::Sla))
            .await?;
        Ok(decode_lenient(INDICATORS_PATH, data))
    }

    pub async fn drill_down(
        &self,
        token: Option<&str>,
        kind: DrillDownKind,
        query: &DrillDownQuery,
    ) -> Result<DrillDownResponse, ApiError> {
        let token = require_token(token)?;
        let path = query.to_query_string().to_path(kind.path());
        log::debug!("🔎 Drill-down {:?} de {}", kind, query.driver);
        let data = self
            .api
            .call(&path, HttpMethod::Get, None, Some(token), Some(TableScope::Sla))
            .await?;
        Ok(decode_lenient(kind.path(), data))
    }
}
