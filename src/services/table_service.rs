// ============================================================================
// TABLE SERVICE - Endpoints por colección (listado, datas, delete, upload)
// ============================================================================

use serde_json::json;

use crate::models::{DatesResponse, DeleteResponse, RowsResponse, TableScope, UploadResponse};
use crate::services::api_client::{decode_lenient, require_token, ApiClient, QueryString};
use crate::services::error::ApiError;
use crate::services::transport::{HttpMethod, UploadFile};

/// Tipo de importación del SLA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaImport {
    /// Reemplaza lo importado en la fecha
    Save,
    /// Actualiza filas existentes
    Update,
    /// Planilla de entrada no galpão
    WarehouseEntries,
}

impl SlaImport {
    fn path(self) -> String {
        let base = TableScope::Sla.base_path();
        match self {
            SlaImport::Save => base.to_string(),
            SlaImport::Update => format!("{}/atualizar", base),
            SlaImport::WarehouseEntries => format!("{}/entrada-galpao", base),
        }
    }
}

#[derive(Clone)]
pub struct TableService {
    api: ApiClient,
}

impl TableService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Página de filas. La lista de teléfonos no pagina: se ignoran page/per_page.
    pub async fn list_page(
        &self,
        token: Option<&str>,
        scope: TableScope,
        page: u32,
        per_page: u32,
        dates: &[String],
    ) -> Result<RowsResponse, ApiError> {
        let token = require_token(token)?;
        let mut query = QueryString::new();
        if scope.is_paginated() {
            query = query.param("page", page).param("per_page", per_page);
        }
        let path = query.list("datas", dates).to_path(scope.base_path());

        log::debug!("📋 Cargando tabla {} página {}", scope, page);
        let data = self.api.call(&path, HttpMethod::Get, None, Some(token), Some(scope)).await?;
        Ok(decode_lenient(&path, data))
    }

    /// Fechas de importación disponibles para el filtro
    pub async fn dates(&self, token: Option<&str>, scope: TableScope) -> Result<Vec<String>, ApiError> {
        let token = require_token(token)?;
        let path = format!("{}/datas", scope.base_path());
        let data = self.api.call(&path, HttpMethod::Get, None, Some(token), Some(scope)).await?;
        Ok(decode_lenient::<DatesResponse>(&path, data).datas)
    }

    /// Borra toda la colección. La lista de teléfonos exige la contraseña.
    pub async fn delete_all(
        &self,
        token: Option<&str>,
        scope: TableScope,
        password: Option<&str>,
    ) -> Result<DeleteResponse, ApiError> {
        let token = require_token(token)?;
        let path = scope.base_path();
        let body = password.map(|senha| json!({ "senha": senha }));
        let data = self
            .api
            .call(path, HttpMethod::Delete, body.as_ref(), Some(token), Some(scope))
            .await?;
        let result: DeleteResponse = decode_lenient(path, data);
        log::info!("🗑️ Tabla {}: {} filas borradas", scope, result.deleted);
        Ok(result)
    }

    pub async fn delete_row(
        &self,
        token: Option<&str>,
        scope: TableScope,
        id: &str,
        password: Option<&str>,
    ) -> Result<DeleteResponse, ApiError> {
        let token = require_token(token)?;
        if !scope.supports_row_delete() {
            log::warn!("⚠️ La tabla {} no expone borrado por fila", scope);
            return Err(ApiError::RowDeleteUnsupported(scope));
        }
        let path = format!("{}/{}", scope.base_path(), urlencoding::encode(id));
        let body = password.map(|senha| json!({ "senha": senha }));
        let data = self
            .api
            .call(&path, HttpMethod::Delete, body.as_ref(), Some(token), Some(scope))
            .await?;
        Ok(decode_lenient(&path, data))
    }

    /// Sube la planilla de una colección
    pub async fn upload(
        &self,
        token: Option<&str>,
        scope: TableScope,
        file: UploadFile,
    ) -> Result<UploadResponse, ApiError> {
        let token = require_token(token)?;
        let path = match scope {
            TableScope::ConsultResults => format!("{}/atualizar", scope.base_path()),
            _ => scope.base_path().to_string(),
        };
        let data = self.api.upload(&path, file, Some(token), Some(scope)).await?;
        Ok(decode_lenient(&path, data))
    }

    pub async fn upload_sla(
        &self,
        token: Option<&str>,
        kind: SlaImport,
        file: UploadFile,
    ) -> Result<UploadResponse, ApiError> {
        let token = require_token(token)?;
        let path = kind.path();
        let data = self.api.upload(&path, file, Some(token), Some(TableScope::Sla)).await?;
        Ok(decode_lenient(&path, data))
    }
}
