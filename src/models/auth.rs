use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub nome: String,
    pub senha: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct CreateAccountRequest {
    pub nome: String,
    pub nome_base: String,
    pub senha: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct AccountResponse {
    pub id: String,
    pub nome: String,
    pub nome_base: String,
}

/// Respuesta de `/api/auth/me`. Campos ausentes = "no cambiar".
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct MeResponse {
    pub nome: Option<String>,
    pub foto: Option<String>,
    pub config: Option<Map<String, Value>>,
    pub tabelas: Option<Map<String, Value>>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct UpdateConfigRequest {
    pub config: Map<String, Value>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ConfigResponse {
    pub config: Option<Map<String, Value>>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
pub struct UpdatePerfilRequest {
    pub foto: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct PerfilResponse {
    pub nome: Option<String>,
    pub foto: Option<String>,
}
