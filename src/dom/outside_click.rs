// ============================================================================
// OUTSIDE CLICK - pointerdown global para cerrar menús anclados
// ============================================================================

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, PointerEvent};

use crate::dom::{document, element_rect};
use crate::state::PointerTarget;

const EVENT: &str = "pointerdown";

/// Listener de `pointerdown` en el documento. Se quita al hacer drop,
/// así un menú desmontado no deja handlers colgando.
pub struct OutsidePointerListener {
    document: Document,
    closure: Closure<dyn FnMut(PointerEvent)>,
}

impl OutsidePointerListener {
    /// `handler` recibe las coordenadas de viewport del puntero
    pub fn attach<F>(mut handler: F) -> Result<Self, JsValue>
    where
        F: FnMut(f64, f64) + 'static,
    {
        let document = document().ok_or_else(|| JsValue::from_str("No document"))?;
        let closure = Closure::wrap(Box::new(move |event: PointerEvent| {
            handler(f64::from(event.client_x()), f64::from(event.client_y()));
        }) as Box<dyn FnMut(PointerEvent)>);
        document.add_event_listener_with_callback(EVENT, closure.as_ref().unchecked_ref())?;
        Ok(Self { document, closure })
    }
}

impl Drop for OutsidePointerListener {
    fn drop(&mut self) {
        if let Err(e) = self
            .document
            .remove_event_listener_with_callback(EVENT, self.closure.as_ref().unchecked_ref())
        {
            log::warn!("⚠️ No se pudo quitar el listener {}: {:?}", EVENT, e);
        }
    }
}

/// Clasifica un pointerdown respecto al panel de un menú y su trigger
pub fn classify_pointer(x: f64, y: f64, menu: Option<&Element>, trigger: Option<&Element>) -> PointerTarget {
    PointerTarget::classify(x, y, menu.map(element_rect), trigger.map(element_rect))
}
