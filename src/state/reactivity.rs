// ============================================================================
// REACTIVITY - Valor compartido + subscribers
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

type Callback = Rc<dyn Fn()>;

/// Valor `Rc<RefCell<T>>` que avisa a sus subscribers en cada cambio.
/// Los clones comparten valor y subscribers.
pub struct ReactiveState<T> {
    value: Rc<RefCell<T>>,
    subscribers: Rc<RefCell<Vec<Callback>>>,
}

impl<T: Clone> ReactiveState<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Copia del valor actual
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Lee sin clonar
    pub fn with<R>(&self, reader: impl FnOnce(&T) -> R) -> R {
        reader(&self.value.borrow())
    }

    pub fn set(&self, new_value: T) {
        *self.value.borrow_mut() = new_value;
        self.notify();
    }

    pub fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut T),
    {
        updater(&mut self.value.borrow_mut());
        self.notify();
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.subscribers.borrow_mut().push(Rc::new(callback));
    }

    fn notify(&self) {
        // Snapshot: un callback puede suscribir o leer el valor
        let callbacks: Vec<Callback> = self.subscribers.borrow().clone();
        for callback in callbacks {
            callback();
        }
    }
}

impl<T> Clone for ReactiveState<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            subscribers: self.subscribers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn clones_share_value_and_subscribers() {
        let state = ReactiveState::new(1);
        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        state.subscribe(move || seen.set(seen.get() + 1));

        let other = state.clone();
        other.set(5);
        state.update(|v| *v += 1);

        assert_eq!(state.get(), 6);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn subscriber_can_read_during_notify() {
        let state = ReactiveState::new(String::new());
        let reader = state.clone();
        let last = Rc::new(RefCell::new(String::new()));
        let sink = last.clone();
        state.subscribe(move || *sink.borrow_mut() = reader.get());

        state.set("ok".into());
        assert_eq!(*last.borrow(), "ok");
    }
}
