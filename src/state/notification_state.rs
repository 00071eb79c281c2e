// ============================================================================
// NOTIFICATION STATE - Banner transitorio único
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use crate::state::reactivity::ReactiveState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    #[default]
    Neutral,
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    /// Sufijo de la clase CSS (`notification--{kind}`)
    pub fn css_suffix(self) -> &'static str {
        match self {
            NotificationKind::Neutral => "neutral",
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub kind: NotificationKind,
    pub visible: bool,
}

impl Notification {
    /// Sin título no se pinta nada
    pub fn should_render(&self) -> bool {
        self.visible && !self.title.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationTicket(u64);

#[derive(Clone)]
pub struct NotificationState {
    current: ReactiveState<Notification>,
    generation: Rc<Cell<u64>>,
    auto_hide_ms: u32,
}

impl NotificationState {
    pub fn new(auto_hide_ms: u32) -> Self {
        Self {
            current: ReactiveState::new(Notification::default()),
            generation: Rc::new(Cell::new(0)),
            auto_hide_ms,
        }
    }

    pub fn current(&self) -> Notification {
        self.current.get()
    }

    pub fn subscribe(&self, callback: impl Fn() + 'static) {
        self.current.subscribe(callback);
    }

    /// Reemplaza la notificación visible y programa su auto-ocultado
    pub fn show(&self, title: &str, kind: NotificationKind, description: &str) -> NotificationTicket {
        let ticket = NotificationTicket(self.generation.get() + 1);
        self.generation.set(ticket.0);
        self.current.set(Notification {
            title: title.to_string(),
            description: description.to_string(),
            kind,
            visible: true,
        });
        self.schedule_auto_hide(ticket);
        ticket
    }

    pub fn success(&self, title: &str) -> NotificationTicket {
        self.show(title, NotificationKind::Success, "")
    }

    pub fn error(&self, title: &str) -> NotificationTicket {
        self.show(title, NotificationKind::Error, "")
    }

    pub fn hide(&self) {
        self.generation.set(self.generation.get() + 1);
        self.current.update(|n| n.visible = false);
    }

    /// Timer vencido: solo oculta si sigue siendo la misma notificación
    pub fn expire(&self, ticket: NotificationTicket) -> bool {
        if self.generation.get() != ticket.0 {
            return false;
        }
        self.current.update(|n| n.visible = false);
        true
    }

    #[cfg(target_arch = "wasm32")]
    fn schedule_auto_hide(&self, ticket: NotificationTicket) {
        let state = self.clone();
        gloo_timers::callback::Timeout::new(self.auto_hide_ms, move || {
            state.expire(ticket);
        })
        .forget();
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn schedule_auto_hide(&self, _ticket: NotificationTicket) {
        log::trace!("auto-hide en {} ms sin timer nativo", self.auto_hide_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn older_timer_does_not_hide_newer_message() {
        let notifications = NotificationState::new(5000);
        let first = notifications.error("Falha ao carregar");
        let second = notifications.success("Importado");

        assert!(!notifications.expire(first));
        assert!(notifications.current().should_render());

        assert!(notifications.expire(second));
        assert!(!notifications.current().visible);
    }

    #[test]
    fn hide_invalidates_pending_timer() {
        let notifications = NotificationState::new(5000);
        let ticket = notifications.show("Oi", NotificationKind::Info, "detalhe");
        notifications.hide();
        assert!(!notifications.expire(ticket));
        assert_eq!(notifications.current().description, "detalhe");
    }
}
