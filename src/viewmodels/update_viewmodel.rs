// ============================================================================
// UPDATE VIEWMODEL - Aviso de versión nueva
// ============================================================================

use std::rc::Rc;

use crate::models::UpdateInfo;
use crate::services::update_service::{dismiss, dismissed_tag, should_show};
use crate::services::UpdateService;
use crate::state::{AppContext, ReactiveState};
use crate::utils::storage::KeyValueStorage;

#[derive(Clone)]
pub struct UpdateViewModel {
    updates: UpdateService,
    storage: Rc<dyn KeyValueStorage>,
    current_version: String,
    visible: ReactiveState<Option<UpdateInfo>>,
}

impl UpdateViewModel {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            updates: ctx.updates.clone(),
            storage: ctx.storage.clone(),
            current_version: ctx.config.app_version.clone(),
            visible: ReactiveState::new(None),
        }
    }

    /// Consulta el servidor y muestra el aviso si corresponde
    pub async fn check(&self) -> bool {
        let Some(info) = self.updates.check_update().await else {
            return false;
        };
        let dismissed = dismissed_tag(self.storage.as_ref());
        if !should_show(&info, &self.current_version, dismissed.as_deref()) {
            return false;
        }
        log::info!(
            "🆕 Versión {} disponible (actual {})",
            info.version.as_deref().unwrap_or_default(),
            self.current_version
        );
        self.visible.set(Some(info));
        true
    }

    pub fn visible(&self) -> Option<UpdateInfo> {
        self.visible.get()
    }

    pub fn subscribe(&self, callback: impl Fn() + 'static) {
        self.visible.subscribe(callback);
    }

    /// Oculta el aviso y no lo vuelve a mostrar para este tag
    pub fn dismiss(&self) {
        let Some(info) = self.visible.get() else {
            return;
        };
        if let Some(tag) = info.tag_name.as_deref() {
            if let Err(e) = dismiss(self.storage.as_ref(), tag) {
                log::warn!("⚠️ No se pudo guardar el aviso descartado: {}", e);
            }
        }
        self.visible.set(None);
    }
}
