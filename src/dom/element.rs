// ============================================================================
// ELEMENT HELPERS - Funciones básicas para manipular DOM
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Window};

use crate::state::AnchorRect;

/// Obtener window global
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Obtener document
pub fn document() -> Option<Document> {
    window()?.document()
}

/// Obtener elemento por ID
pub fn get_element_by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

/// Crear elemento
pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document()
        .ok_or_else(|| JsValue::from_str("No document"))
        .and_then(|doc| doc.create_element(tag))
}

/// Establecer texto (escapado por el navegador)
pub fn set_text_content(element: &Element, text: &str) {
    element.set_text_content(Some(text));
}

/// Agregar hijo
pub fn append_child(parent: &Element, child: &Element) -> Result<(), JsValue> {
    parent.append_child(child).map(|_| ())
}

/// Vacía un contenedor
pub fn clear_children(element: &Element) {
    element.set_inner_html("");
}

/// Establecer atributo
pub fn set_attribute(element: &Element, name: &str, value: &str) -> Result<(), JsValue> {
    element.set_attribute(name, value)
}

/// Rectángulo del elemento en coordenadas de viewport
pub fn element_rect(element: &Element) -> AnchorRect {
    let rect = element.get_bounding_client_rect();
    AnchorRect {
        top: rect.top(),
        left: rect.left(),
        width: rect.width(),
        height: rect.height(),
    }
}

/// Ancla de un menú que se abre justo debajo de su trigger
pub fn anchor_below(trigger: &Element) -> AnchorRect {
    let rect = element_rect(trigger);
    AnchorRect::below_trigger(rect.top, rect.left, rect.width, rect.height)
}
