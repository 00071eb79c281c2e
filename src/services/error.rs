// ============================================================================
// API ERROR - Taxonomía de errores del gateway
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::models::TableScope;

/// Error que devuelve cualquier llamada al backend.
///
/// Los fallos de decodificación no aparecen aquí: el gateway los degrada a
/// un objeto vacío.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Sin respuesta del servidor (DNS, conexión rechazada...)
    #[error("Network error: {0}")]
    Network(String),

    /// Respuesta no-2xx con el mensaje ya normalizado
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Ruta protegida llamada sin token
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// La colección no expone `DELETE {base}/{id}`; no se llega a la red
    #[error("Table {0} does not support deleting single rows")]
    RowDeleteUnsupported(TableScope),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Una entrada de un error de validación (`detail: [{msg, ...}]`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorIssue {
    #[serde(default)]
    pub msg: Option<String>,
}

/// Forma del campo de error de un body no-2xx
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Plain(String),
    Issues(Vec<ErrorIssue>),
    Other(Value),
}

/// Falsy al estilo del backend: null, false, 0 y "" no cuentan como mensaje
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl ErrorBody {
    /// Toma `detail` y si no hay, `message`
    pub fn from_body(body: &Value) -> Option<Self> {
        let field = ["detail", "message"]
            .iter()
            .filter_map(|key| body.get(*key))
            .find(|v| is_present(v))?;

        Some(match field {
            Value::String(s) => ErrorBody::Plain(s.clone()),
            Value::Array(items) => {
                let first_msg = items
                    .first()
                    .and_then(|item| item.get("msg"))
                    .and_then(Value::as_str)
                    .is_some_and(|msg| !msg.is_empty());
                match serde_json::from_value::<Vec<ErrorIssue>>(field.clone()) {
                    Ok(issues) if first_msg => ErrorBody::Issues(issues),
                    _ => ErrorBody::Other(field.clone()),
                }
            }
            other => ErrorBody::Other(other.clone()),
        })
    }

    /// Mensaje único a mostrar al usuario
    pub fn display_message(&self) -> String {
        match self {
            ErrorBody::Plain(s) => s.clone(),
            ErrorBody::Issues(issues) => issues
                .first()
                .and_then(|issue| issue.msg.clone())
                .unwrap_or_default(),
            ErrorBody::Other(value) => value.to_string(),
        }
    }
}

/// Mensaje final de un error HTTP, con "Error {status}" como fallback
pub fn normalize_error_message(status: u16, body: &Value) -> String {
    ErrorBody::from_body(body)
        .map(|b| b.display_message())
        .unwrap_or_else(|| format!("Error {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"detail": "Nome ou senha incorretos"}), "Nome ou senha incorretos")]
    #[case(json!({"message": "Arquivo inválido"}), "Arquivo inválido")]
    #[case(json!({"detail": "", "message": "usa message"}), "usa message")]
    #[case(json!({"detail": [{"msg": "field required", "loc": ["body"]}]}), "field required")]
    #[case(json!({"detail": {"code": 7}}), r#"{"code":7}"#)]
    #[case(json!({}), "Error 422")]
    #[case(json!({"detail": null}), "Error 422")]
    fn normalizes_error_bodies(#[case] body: Value, #[case] expected: &str) {
        assert_eq!(normalize_error_message(422, &body), expected);
    }

    #[test]
    fn issue_without_msg_stringifies_the_list() {
        let body = json!({"detail": [{"loc": ["x"]}]});
        assert_eq!(normalize_error_message(400, &body), r#"[{"loc":["x"]}]"#);
    }

    #[test]
    fn error_display_and_status() {
        let err = ApiError::Http { status: 401, message: "Error 401".into() };
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Error 401");
        assert_eq!(ApiError::Network("down".into()).to_string(), "Network error: down");
        assert_eq!(ApiError::SessionExpired.status(), None);
    }
}
