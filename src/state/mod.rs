// ============================================================================
// STATE MODULE - State Management con Rc<RefCell> + notificaciones
// ============================================================================

pub mod app_state;
pub mod filter_state;
pub mod generation;
pub mod menu_state;
pub mod notification_state;
pub mod pagination;
pub mod reactivity;
pub mod session_state;
pub mod sort_state;
pub mod unauthorized;

pub use app_state::AppContext;
pub use filter_state::{unique_column_values, FilterState};
pub use generation::{RequestGenerations, Ticket};
pub use menu_state::{AnchorRect, AnchoredMenu, PointerTarget};
pub use notification_state::{Notification, NotificationKind, NotificationState};
pub use pagination::{page_count, Pagination};
pub use reactivity::ReactiveState;
pub use session_state::SessionStore;
pub use sort_state::{DriverSort, SortDirection, SortKey, SORT_OPTIONS};
pub use unauthorized::{BridgeGuard, UnauthorizedBridge};
