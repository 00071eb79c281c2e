pub mod auth;
pub mod indicator;
pub mod session;
pub mod table;
pub mod update;

pub use auth::*;
pub use indicator::{DrillDownResponse, IndicatorRow, IndicatorsResponse, Period};
pub use session::Session;
pub use table::{DatesResponse, DeleteResponse, Page, Row, RowsResponse, TableScope, UploadResponse};
pub use update::UpdateInfo;
