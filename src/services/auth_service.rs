use serde_json::{Map, Value};

use crate::models::{
    AccountResponse, ConfigResponse, CreateAccountRequest, LoginRequest, MeResponse,
    PerfilResponse, TokenResponse, UpdateConfigRequest, UpdatePerfilRequest,
};
use crate::services::api_client::{decode_lenient, require_token, ApiClient};
use crate::services::error::ApiError;
use crate::services::transport::HttpMethod;

const LOGIN_PATH: &str = "/api/auth/login";
const CREATE_ACCOUNT_PATH: &str = "/api/auth/criar-conta";
const ME_PATH: &str = "/api/auth/me";
const CONFIG_PATH: &str = "/api/auth/config";
const PERFIL_PATH: &str = "/api/auth/perfil";

/// Endpoints de autenticación y perfil (sin X-Table-Id)
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn login(&self, nome: &str, senha: &str) -> Result<TokenResponse, ApiError> {
        log::info!("🔐 Login de {}", nome);
        let body = LoginRequest { nome: nome.to_string(), senha: senha.to_string() };
        let data = self.api.call_with(LOGIN_PATH, HttpMethod::Post, &body, None, None).await?;
        Ok(decode_lenient(LOGIN_PATH, data))
    }

    pub async fn create_account(
        &self,
        nome: &str,
        nome_base: &str,
        senha: &str,
    ) -> Result<AccountResponse, ApiError> {
        let body = CreateAccountRequest {
            nome: nome.to_string(),
            nome_base: nome_base.to_string(),
            senha: senha.to_string(),
        };
        let data = self
            .api
            .call_with(CREATE_ACCOUNT_PATH, HttpMethod::Post, &body, None, None)
            .await?;
        log::info!("✅ Cuenta creada: {}", nome);
        Ok(decode_lenient(CREATE_ACCOUNT_PATH, data))
    }

    pub async fn me(&self, token: Option<&str>) -> Result<MeResponse, ApiError> {
        let token = require_token(token)?;
        let data = self.api.call(ME_PATH, HttpMethod::Get, None, Some(token), None).await?;
        Ok(decode_lenient(ME_PATH, data))
    }

    /// Mezcla `patch` en la config guardada en el servidor
    pub async fn update_config(
        &self,
        token: Option<&str>,
        patch: Map<String, Value>,
    ) -> Result<ConfigResponse, ApiError> {
        let token = require_token(token)?;
        let body = UpdateConfigRequest { config: patch };
        let data = self
            .api
            .call_with(CONFIG_PATH, HttpMethod::Patch, &body, Some(token), None)
            .await?;
        Ok(decode_lenient(CONFIG_PATH, data))
    }

    pub async fn update_perfil(&self, token: Option<&str>, foto: &str) -> Result<PerfilResponse, ApiError> {
        let token = require_token(token)?;
        let body = UpdatePerfilRequest { foto: foto.to_string() };
        let data = self
            .api
            .call_with(PERFIL_PATH, HttpMethod::Patch, &body, Some(token), None)
            .await?;
        Ok(decode_lenient(PERFIL_PATH, data))
    }
}
