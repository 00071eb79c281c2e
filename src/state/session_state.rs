// ============================================================================
// SESSION STATE - Sesión autenticada persistida en storage
// ============================================================================
// Único dueño de la clave `torre_user`. El resto del código lee y escribe la
// sesión solo a través de SessionStore.
// ============================================================================

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;

use crate::models::Session;
use crate::services::{ApiError, AuthService};
use crate::state::reactivity::ReactiveState;
use crate::utils::constants::SESSION_STORAGE_KEY;
use crate::utils::storage::{load_from_storage, save_to_storage, KeyValueStorage};

#[derive(Clone)]
pub struct SessionStore {
    storage: Rc<dyn KeyValueStorage>,
    session: ReactiveState<Option<Session>>,
    /// Token cuyo perfil ya se pidió (one-shot por token)
    hydrated_token: Rc<RefCell<Option<String>>>,
}

impl SessionStore {
    /// Carga la sesión guardada; JSON corrupto = sin sesión
    pub fn new(storage: Rc<dyn KeyValueStorage>) -> Self {
        let stored = load_from_storage::<Session>(storage.as_ref(), SESSION_STORAGE_KEY);
        if stored.is_some() {
            log::info!("🔑 Sesión restaurada desde storage");
        }
        Self {
            storage,
            session: ReactiveState::new(stored),
            hydrated_token: Rc::new(RefCell::new(None)),
        }
    }

    pub fn get_session(&self) -> Option<Session> {
        self.session.get()
    }

    pub fn token(&self) -> Option<String> {
        self.session.with(|s| s.as_ref().map(|s| s.token.clone()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.with(|s| s.as_ref().is_some_and(|s| !s.token.is_empty()))
    }

    /// Avisa en cada cambio de sesión (login, logout, perfil)
    pub fn subscribe(&self, callback: impl Fn() + 'static) {
        self.session.subscribe(callback);
    }

    pub fn set_session(&self, session: Option<Session>) {
        let persisted = match &session {
            Some(s) => save_to_storage(self.storage.as_ref(), SESSION_STORAGE_KEY, s),
            None => self.storage.remove_item(SESSION_STORAGE_KEY),
        };
        if let Err(e) = persisted {
            log::error!("❌ Error guardando sesión en storage: {}", e);
        }
        self.session.set(session);
    }

    pub fn login(&self, session: Session) {
        log::info!("✅ Sesión iniciada: {}", session.profile_name);
        self.set_session(Some(session));
    }

    pub fn logout(&self) {
        log::info!("👋 Sesión cerrada");
        self.set_session(None);
    }

    /// Login completo: token y luego perfil. Si `/me` falla se guarda lo mínimo.
    pub async fn sign_in(&self, auth: &AuthService, nome: &str, senha: &str) -> Result<Session, ApiError> {
        let token = auth.login(nome, senha).await?.access_token;
        let session = match auth.me(Some(&token)).await {
            Ok(me) => Session {
                token: token.clone(),
                profile_name: me.nome.unwrap_or_else(|| nome.to_string()),
                avatar_url: me.foto,
                config: Some(me.config.unwrap_or_default()),
                tables: me.tabelas,
            },
            Err(e) => {
                log::warn!("⚠️ No se pudo cargar el perfil tras login: {}", e);
                Session::new(token.clone(), nome)
            }
        };
        *self.hydrated_token.borrow_mut() = Some(token);
        self.login(session.clone());
        Ok(session)
    }

    /// Trae `/api/auth/me` una sola vez por token si falta la config.
    /// Los errores se registran y se ignoran.
    pub async fn hydrate_profile(&self, auth: &AuthService) {
        let Some(session) = self.get_session().filter(Session::needs_hydration) else {
            return;
        };
        let token = session.token.clone();
        {
            let mut hydrated = self.hydrated_token.borrow_mut();
            if hydrated.as_deref() == Some(token.as_str()) {
                return;
            }
            // Antes del await: montajes concurrentes no repiten la llamada
            *hydrated = Some(token.clone());
        }

        let me = match auth.me(Some(&token)).await {
            Ok(me) => me,
            Err(e) => {
                log::warn!("⚠️ Hidratación de perfil falló: {}", e);
                return;
            }
        };

        let Some(current) = self.get_session().filter(|s| s.token == token) else {
            log::debug!("🔑 Sesión cambió durante la hidratación, se descarta /me");
            return;
        };
        let merged = Session {
            token: current.token,
            profile_name: me.nome.unwrap_or(current.profile_name),
            avatar_url: me.foto.or(current.avatar_url),
            config: Some(me.config.or(current.config).unwrap_or_default()),
            tables: Some(me.tabelas.or(current.tables).unwrap_or_default()),
        };
        self.set_session(Some(merged));
        log::info!("👤 Perfil hidratado");
    }

    /// Guarda `patch` en la config del servidor y refleja la respuesta
    pub async fn update_config(&self, auth: &AuthService, patch: Map<String, Value>) -> Result<(), ApiError> {
        let token = self.token();
        let response = auth.update_config(token.as_deref(), patch.clone()).await?;
        self.update_current(token.as_deref(), |session| {
            let config = match response.config {
                Some(config) => config,
                None => {
                    let mut config = session.config.take().unwrap_or_default();
                    config.extend(patch);
                    config
                }
            };
            session.config = Some(config);
        });
        Ok(())
    }

    pub async fn update_avatar(&self, auth: &AuthService, foto: &str) -> Result<(), ApiError> {
        let token = self.token();
        let response = auth.update_perfil(token.as_deref(), foto).await?;
        self.update_current(token.as_deref(), |session| {
            session.avatar_url = response.foto.or_else(|| Some(foto.to_string()));
        });
        Ok(())
    }

    /// Aplica la mutación solo si la sesión sigue siendo la del token
    fn update_current(&self, token: Option<&str>, mutate: impl FnOnce(&mut Session)) {
        let Some(mut session) = self.get_session() else {
            return;
        };
        if Some(session.token.as_str()) != token {
            return;
        }
        mutate(&mut session);
        self.set_session(Some(session));
    }
}
