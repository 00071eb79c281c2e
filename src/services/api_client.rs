// ============================================================================
// API CLIENT - Punto único de comunicación HTTP con el backend
// ============================================================================
// Inyecta Authorization y X-Table-Id, normaliza errores y dispara el
// handler de 401. NO tiene lógica de negocio.
// ============================================================================

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

use crate::models::TableScope;
use crate::services::error::{normalize_error_message, ApiError};
use crate::services::transport::{HttpMethod, HttpRequest, RequestBody, Transport, UploadFile};

/// Handler invocado ante un 401
pub type UnauthorizedHandler = Rc<dyn Fn()>;

const BODY_PREVIEW_CHARS: usize = 500;

/// Gateway HTTP. Los clones comparten transporte y slot de 401.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Rc<dyn Transport>,
    on_unauthorized: Rc<RefCell<Option<UnauthorizedHandler>>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, transport: Rc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            on_unauthorized: Rc::new(RefCell::new(None)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registra (o con None, desactiva) el handler de 401. Un único slot.
    pub fn set_on_unauthorized(&self, handler: Option<UnauthorizedHandler>) {
        *self.on_unauthorized.borrow_mut() = handler;
    }

    pub fn has_unauthorized_handler(&self) -> bool {
        self.on_unauthorized.borrow().is_some()
    }

    /// Petición JSON. El body que no sea JSON válido se devuelve como `{}`.
    pub async fn call(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<&Value>,
        token: Option<&str>,
        scope: Option<TableScope>,
    ) -> Result<Value, ApiError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        headers.extend(auth_headers(token, scope));

        let request = HttpRequest {
            method,
            url: self.url(path),
            headers,
            body: body.map_or(RequestBody::Empty, |b| RequestBody::Json(b.to_string())),
        };
        self.execute(path, request).await
    }

    /// Igual que `call` pero serializando un struct como body
    pub async fn call_with<B: Serialize>(
        &self,
        path: &str,
        method: HttpMethod,
        body: &B,
        token: Option<&str>,
        scope: Option<TableScope>,
    ) -> Result<Value, ApiError> {
        let value = serde_json::to_value(body).unwrap_or_else(|e| {
            log::error!("❌ Error serializando body de {}: {}", path, e);
            Value::Object(Default::default())
        });
        self.call(path, method, Some(&value), token, scope).await
    }

    /// Upload multipart: sin Content-Type JSON (el navegador pone el boundary)
    pub async fn upload(
        &self,
        path: &str,
        file: UploadFile,
        token: Option<&str>,
        scope: Option<TableScope>,
    ) -> Result<Value, ApiError> {
        log::info!("📤 Subiendo {} ({} bytes) a {}", file.file_name, file.bytes.len(), path);
        let request = HttpRequest {
            method: HttpMethod::Post,
            url: self.url(path),
            headers: auth_headers(token, scope),
            body: RequestBody::Multipart(file),
        };
        self.execute(path, request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, path: &str, request: HttpRequest) -> Result<Value, ApiError> {
        let method = request.method;
        let response = self.transport.send(request).await.map_err(|e| {
            log::error!("❌ {} {}: {}", method, path, e);
            ApiError::Network(if e.0.is_empty() {
                "Could not connect to the server".to_string()
            } else {
                e.0
            })
        })?;

        let (status, ok) = (response.status, response.ok());
        let data = decode_body(path, response.text);

        if !ok {
            if status == 401 {
                self.notify_unauthorized();
            }
            let message = normalize_error_message(status, &data);
            log::warn!("⚠️ {} {} → {}: {}", method, path, status, message);
            return Err(ApiError::Http { status, message });
        }

        Ok(data)
    }

    fn notify_unauthorized(&self) {
        // Se clona fuera del borrow: el handler puede re-registrar el slot
        let handler = self.on_unauthorized.borrow().clone();
        match handler {
            Some(handler) => {
                log::warn!("🔒 401 recibido, cerrando sesión");
                handler();
            }
            None => log::warn!("🔒 401 recibido sin handler registrado"),
        }
    }
}

fn auth_headers(token: Option<&str>, scope: Option<TableScope>) -> Vec<(String, String)> {
    let mut headers = Vec::with_capacity(2);
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
    }
    if let Some(scope) = scope {
        headers.push(("X-Table-Id".to_string(), scope.id().to_string()));
    }
    headers
}

/// Texto → JSON, degradando a `{}` si no se puede leer o parsear
fn decode_body(path: &str, text: Result<String, String>) -> Value {
    let empty = || Value::Object(Default::default());
    let text = match text {
        Ok(text) => text,
        Err(e) => {
            log::error!("❌ Error leyendo respuesta de {}: {}", path, e);
            return empty();
        }
    };
    if text.trim().is_empty() {
        return empty();
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Null) => empty(),
        Ok(value) => value,
        Err(e) => {
            let preview: String = text.chars().take(BODY_PREVIEW_CHARS).collect();
            log::error!("❌ JSON inválido en {}: {} | body: {}", path, e, preview);
            empty()
        }
    }
}

// ============================================================================
// QUERY STRING
// ============================================================================

/// Builder de query string: omite vacíos, listas unidas por coma
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.pairs.push((key.to_string(), value));
        }
        self
    }

    pub fn opt_param(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.param(key, v),
            None => self,
        }
    }

    pub fn list<S: AsRef<str>>(self, key: &str, values: &[S]) -> Self {
        let joined = values
            .iter()
            .map(AsRef::as_ref)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        self.param(key, joined)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Query codificada sin `?`
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `path?query`, o solo `path` si no hay parámetros
    pub fn to_path(&self, path: &str) -> String {
        if self.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self.encode())
        }
    }
}

/// Decodifica un JSON a un tipo de respuesta; si la forma no encaja, Default
pub fn decode_lenient<T: DeserializeOwned + Default>(path: &str, value: Value) -> T {
    serde_json::from_value(value).unwrap_or_else(|e| {
        log::warn!("⚠️ Respuesta de {} con forma inesperada: {}", path, e);
        T::default()
    })
}

/// Exige token para rutas protegidas sin tocar la red
pub fn require_token(token: Option<&str>) -> Result<&str, ApiError> {
    token.filter(|t| !t.is_empty()).ok_or(ApiError::SessionExpired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::transport::MockTransport;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::Cell;

    fn client() -> (ApiClient, Rc<MockTransport>) {
        let transport = Rc::new(MockTransport::new());
        (ApiClient::new("http://api.test/", transport.clone()), transport)
    }

    #[test]
    fn injects_json_auth_and_scope_headers() {
        let (api, transport) = client();
        transport.push_json(200, json!({"datas": []}));

        block_on(api.call("/api/importe-tabela-sla/datas", HttpMethod::Get, None, Some("tok"), Some(TableScope::Sla)))
            .unwrap();

        let req = transport.last_request().unwrap();
        assert_eq!(req.url, "http://api.test/api/importe-tabela-sla/datas");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("Authorization"), Some("Bearer tok"));
        assert_eq!(req.header("X-Table-Id"), Some("5"));
        assert_eq!(req.body, RequestBody::Empty);
    }

    #[test]
    fn unscoped_call_has_no_scope_or_auth_header() {
        let (api, transport) = client();
        transport.push_json(200, json!({"has_update": false}));

        block_on(api.call("/api/check-update", HttpMethod::Get, None, None, None)).unwrap();

        let req = transport.last_request().unwrap();
        assert_eq!(req.header("X-Table-Id"), None);
        assert_eq!(req.header("Authorization"), None);
    }

    #[test]
    fn malformed_body_degrades_to_empty_object() {
        let (api, transport) = client();
        transport.push_response(200, "<html>oops</html>");
        transport.push_response(204, "");

        let first = block_on(api.call("/x", HttpMethod::Get, None, None, None)).unwrap();
        let second = block_on(api.call("/x", HttpMethod::Delete, None, None, None)).unwrap();
        assert_eq!(first, json!({}));
        assert_eq!(second, json!({}));
    }

    #[test]
    fn unreadable_body_on_error_still_yields_status_message() {
        let (api, transport) = client();
        transport.push_unreadable(500, "aborted");

        let err = block_on(api.call("/x", HttpMethod::Get, None, None, None)).unwrap_err();
        assert_eq!(err, ApiError::Http { status: 500, message: "Error 500".into() });
    }

    #[test]
    fn unauthorized_handler_fires_once_before_error_is_returned() {
        let (api, transport) = client();
        transport.push_json(401, json!({"detail": "Token expirado"}));

        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        api.set_on_unauthorized(Some(Rc::new(move || seen.set(seen.get() + 1))));

        let result = block_on(api.call("/api/auth/me", HttpMethod::Get, None, Some("tok"), None));
        // El handler ya corrió cuando el caller recibe el error
        assert_eq!(calls.get(), 1);
        let err = result.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Token expirado");
    }

    #[test]
    fn cleared_slot_disables_unauthorized_handler() {
        let (api, transport) = client();
        transport.push_json(401, json!({}));
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        api.set_on_unauthorized(Some(Rc::new(move || seen.set(seen.get() + 1))));
        api.set_on_unauthorized(None);

        let err = block_on(api.call("/x", HttpMethod::Get, None, Some("t"), None)).unwrap_err();
        assert_eq!(calls.get(), 0);
        assert_eq!(err.to_string(), "Error 401");
    }

    #[test]
    fn network_failure_is_wrapped() {
        let (api, transport) = client();
        transport.push_failure("connection refused");

        let err = block_on(api.call("/x", HttpMethod::Get, None, None, None)).unwrap_err();
        assert_eq!(err, ApiError::Network("connection refused".into()));
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn upload_skips_json_content_type_but_shares_error_path() {
        let (api, transport) = client();
        transport.push_json(401, json!({"message": "expirou"}));
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        api.set_on_unauthorized(Some(Rc::new(move || seen.set(seen.get() + 1))));

        let file = UploadFile::xlsx("sla.xlsx", vec![1, 2, 3]);
        let err = block_on(api.upload("/api/importe-tabela-sla", file.clone(), Some("t"), Some(TableScope::Sla)))
            .unwrap_err();

        let req = transport.last_request().unwrap();
        assert_eq!(req.header("Content-Type"), None);
        assert_eq!(req.header("X-Table-Id"), Some("5"));
        assert_eq!(req.body, RequestBody::Multipart(file));
        assert_eq!(calls.get(), 1);
        assert_eq!(err.to_string(), "expirou");
    }

    #[test]
    fn decode_lenient_falls_back_to_default() {
        #[derive(serde::Deserialize, Default, Debug, PartialEq)]
        struct Total {
            total: u64,
        }
        let parsed: Total = decode_lenient("/x", json!({"total": "muitos"}));
        assert_eq!(parsed, Total::default());
    }

    #[test]
    fn query_string_omits_empty_and_joins_lists() {
        let empty: [&str; 0] = [];
        let query = QueryString::new()
            .list("datas", &["2026-02-08"])
            .list("bases", &empty)
            .opt_param("periodo", None)
            .list("cidades", &["Blumenau", "São José"]);
        assert_eq!(query.encode(), "datas=2026-02-08&cidades=Blumenau%2CS%C3%A3o%20Jos%C3%A9");
        assert_eq!(QueryString::new().param("page", "").to_path("/x"), "/x");
    }

    #[test]
    fn require_token_rejects_missing_or_empty() {
        assert_eq!(require_token(None), Err(ApiError::SessionExpired));
        assert_eq!(require_token(Some("")), Err(ApiError::SessionExpired));
        assert_eq!(require_token(Some("t")), Ok("t"));
    }
}
