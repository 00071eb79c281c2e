// ============================================================================
// TRANSPORT - Envío HTTP crudo (sin lógica de negocio)
// ============================================================================
// En wasm32 usa gloo-net; los tests inyectan MockTransport.
// ============================================================================

use async_trait::async_trait;
#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Archivo a enviar como multipart (campo `file`)
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub const XLSX_CONTENT_TYPE: &'static str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

    pub fn xlsx(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: Self::XLSX_CONTENT_TYPE.to_string(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(String),
    Multipart(UploadFile),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Err si no se pudo leer el body como texto
    pub text: Result<String, String>,
}

impl HttpResponse {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self { status, text: Ok(text.into()) }
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error de transporte: no hubo respuesta
#[derive(Debug, Clone, PartialEq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contrato de envío de una petición HTTP
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// ============================================================================
// MOCK (tests)
// ============================================================================

/// Transporte con respuestas encoladas; registra cada petición enviada
#[cfg(test)]
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, status: u16, body: &str) {
        self.responses
            .borrow_mut()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_response(status, &body.to_string());
    }

    /// Respuesta cuyo body no se pudo leer
    pub fn push_unreadable(&self, status: u16, reason: &str) {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            text: Err(reason.to_string()),
        }));
    }

    pub fn push_failure(&self, message: &str) {
        self.responses
            .borrow_mut()
            .push_back(Err(TransportError(message.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[cfg(test)]
#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no mock response queued".to_string())))
    }
}

// ============================================================================
// GLOO (navegador)
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use gloo::GlooTransport;

#[cfg(target_arch = "wasm32")]
mod gloo {
    use super::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport, TransportError, UploadFile};
    use async_trait::async_trait;
    use gloo_net::http::{Method, RequestBuilder};
    use wasm_bindgen::JsValue;

    #[derive(Clone, Copy, Default)]
    pub struct GlooTransport;

    fn to_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn form_data(file: &UploadFile) -> Result<web_sys::FormData, TransportError> {
        let array = js_sys::Uint8Array::from(file.bytes.as_slice());
        let parts = js_sys::Array::of1(&array);
        let props = web_sys::BlobPropertyBag::new();
        props.set_type(&file.content_type);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &props)
            .map_err(|e| TransportError(format!("{:?}", e)))?;
        let form = web_sys::FormData::new().map_err(|e| TransportError(format!("{:?}", e)))?;
        form.append_with_blob_and_filename("file", &blob, &file.file_name)
            .map_err(|e| TransportError(format!("{:?}", e)))?;
        Ok(form)
    }

    #[async_trait(?Send)]
    impl Transport for GlooTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let mut builder = RequestBuilder::new(&request.url).method(to_method(request.method));
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let built = match &request.body {
                RequestBody::Empty => builder.build(),
                RequestBody::Json(json) => builder.body(JsValue::from_str(json)),
                RequestBody::Multipart(file) => builder.body(form_data(file)?),
            }
            .map_err(|e| TransportError(e.to_string()))?;

            let response = built
                .send()
                .await
                .map_err(|e| TransportError(e.to_string()))?;

            let status = response.status();
            let text = response.text().await.map_err(|e| e.to_string());
            Ok(HttpResponse { status, text })
        }
    }
}
