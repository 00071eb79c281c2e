// ============================================================================
// UNAUTHORIZED BRIDGE - 401 → logout + redirect a /login
// ============================================================================

use std::rc::Rc;

use crate::services::ApiClient;
use crate::state::session_state::SessionStore;
use crate::utils::constants::LOGIN_ROUTE;
use crate::utils::navigation::Navigator;

pub struct UnauthorizedBridge;

impl UnauthorizedBridge {
    /// Registra el handler en el gateway. Al soltar el guard se desregistra.
    pub fn mount(api: &ApiClient, session: SessionStore, navigator: Rc<dyn Navigator>) -> BridgeGuard {
        api.set_on_unauthorized(Some(Rc::new(move || {
            session.logout();
            navigator.replace(LOGIN_ROUTE);
        })));
        log::debug!("🔒 Handler de 401 montado");
        BridgeGuard { api: api.clone() }
    }
}

#[must_use = "al soltar el guard se desregistra el handler de 401"]
pub struct BridgeGuard {
    api: ApiClient,
}

impl Drop for BridgeGuard {
    fn drop(&mut self) {
        self.api.set_on_unauthorized(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Session;
    use crate::services::{HttpMethod, MockTransport};
    use crate::utils::navigation::RecordingNavigator;
    use crate::utils::storage::MemoryStorage;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn unauthorized_response_logs_out_and_redirects() {
        let transport = Rc::new(MockTransport::new());
        let api = ApiClient::new("http://api", transport.clone());
        let session = SessionStore::new(Rc::new(MemoryStorage::new()));
        session.login(Session::new("t", "ana"));
        let navigator = Rc::new(RecordingNavigator::new());

        let _guard = UnauthorizedBridge::mount(&api, session.clone(), navigator.clone());
        transport.push_json(401, json!({"detail": "expired"}));

        let err = block_on(api.call("/api/auth/me", HttpMethod::Get, None, Some("t"), None)).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(session.get_session(), None);
        assert_eq!(navigator.visited(), vec![LOGIN_ROUTE.to_string()]);
    }

    #[test]
    fn dropping_guard_clears_the_slot() {
        let api = ApiClient::new("http://api", Rc::new(MockTransport::new()));
        let session = SessionStore::new(Rc::new(MemoryStorage::new()));
        {
            let _guard = UnauthorizedBridge::mount(&api, session, Rc::new(RecordingNavigator::new()));
            assert!(api.has_unauthorized_handler());
        }
        assert!(!api.has_unauthorized_handler());
    }
}
