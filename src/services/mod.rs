pub mod api_client;
pub mod auth_service;
pub mod error;
pub mod sla_service;
pub mod table_service;
pub mod transport;
pub mod update_service;

pub use api_client::{ApiClient, QueryString, UnauthorizedHandler};
pub use auth_service::AuthService;
pub use error::ApiError;
pub use sla_service::{DrillDownKind, DrillDownQuery, IndicatorQuery, SlaService};
pub use table_service::{SlaImport, TableService};
#[cfg(test)]
pub use transport::MockTransport;
pub use transport::{HttpMethod, Transport, UploadFile};
pub use update_service::UpdateService;
