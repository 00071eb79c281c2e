// ============================================================================
// APP CONTEXT - Dependencias compartidas de la aplicación
// ============================================================================
// Gateway, sesión, notificaciones y servicios viven aquí (sin globals):
// cada test crea su propio contexto.
// ============================================================================

use std::rc::Rc;

use crate::config::AppConfig;
use crate::services::{ApiClient, AuthService, SlaService, TableService, Transport, UpdateService};
use crate::state::notification_state::NotificationState;
use crate::state::session_state::SessionStore;
use crate::state::unauthorized::{BridgeGuard, UnauthorizedBridge};
use crate::utils::navigation::Navigator;
use crate::utils::storage::KeyValueStorage;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub api: ApiClient,
    pub storage: Rc<dyn KeyValueStorage>,
    pub navigator: Rc<dyn Navigator>,
    pub session: SessionStore,
    pub notifications: NotificationState,
    pub auth: AuthService,
    pub tables: TableService,
    pub sla: SlaService,
    pub updates: UpdateService,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        transport: Rc<dyn Transport>,
        storage: Rc<dyn KeyValueStorage>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        let api = ApiClient::new(config.backend_url(), transport);
        log::info!("🌐 Backend: {}", api.base_url());
        Self {
            session: SessionStore::new(storage.clone()),
            notifications: NotificationState::new(config.notification_timeout_ms),
            auth: AuthService::new(api.clone()),
            tables: TableService::new(api.clone()),
            sla: SlaService::new(api.clone()),
            updates: UpdateService::new(api.clone()),
            config,
            api,
            storage,
            navigator,
        }
    }

    /// Engancha el 401 del gateway al logout + redirect. Mantener el guard vivo.
    pub fn mount_unauthorized_bridge(&self) -> BridgeGuard {
        UnauthorizedBridge::mount(&self.api, self.session.clone(), self.navigator.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::services::MockTransport;
    use crate::utils::navigation::RecordingNavigator;
    use crate::utils::storage::MemoryStorage;

    pub struct TestContext {
        pub ctx: AppContext,
        pub transport: Rc<MockTransport>,
        pub storage: Rc<MemoryStorage>,
        pub navigator: Rc<RecordingNavigator>,
    }

    /// Contexto en memoria; con `token` arranca con sesión iniciada
    pub fn test_context(token: Option<&str>) -> TestContext {
        let transport = Rc::new(MockTransport::new());
        let storage = Rc::new(MemoryStorage::new());
        let navigator = Rc::new(RecordingNavigator::new());
        let config = AppConfig { backend_url: "http://api".into(), ..AppConfig::default() };
        let ctx = AppContext::new(config, transport.clone(), storage.clone(), navigator.clone());
        if let Some(token) = token {
            ctx.session.login(crate::models::Session::new(token, "tester"));
        }
        TestContext { ctx, transport, storage, navigator }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::test_context;
    use crate::services::HttpMethod;
    use crate::utils::constants::LOGIN_ROUTE;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn services_share_the_gateway_and_its_401_slot() {
        let t = test_context(Some("tok"));
        let _guard = t.ctx.mount_unauthorized_bridge();
        t.transport.push_json(401, json!({}));

        let result = block_on(t.ctx.tables.dates(t.ctx.token().as_deref(), crate::models::TableScope::Sla));
        assert!(result.unwrap_err().is_unauthorized());
        assert_eq!(t.ctx.token(), None);
        assert_eq!(t.navigator.visited(), vec![LOGIN_ROUTE.to_string()]);
    }

    #[test]
    fn contexts_are_independent() {
        let a = test_context(Some("a"));
        let b = test_context(None);
        assert_eq!(a.ctx.token().as_deref(), Some("a"));
        assert_eq!(b.ctx.token(), None);
        a.transport.push_json(200, json!({}));
        block_on(a.ctx.api.call("/x", HttpMethod::Get, None, None, None)).unwrap();
        assert!(b.transport.requests().is_empty());
    }
}
