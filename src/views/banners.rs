// ============================================================================
// BANNERS - Notificación transitoria y aviso de actualización (wasm32)
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom::{on_click, ElementBuilder};
use crate::state::Notification;
use crate::viewmodels::UpdateViewModel;

pub fn render_notification(notification: &Notification) -> Result<Option<Element>, JsValue> {
    if !notification.should_render() {
        return Ok(None);
    }
    let mut banner = ElementBuilder::new("div")?
        .class(&format!("notification notification--{}", notification.kind.css_suffix()))
        .attr("role", "status")?
        .child(ElementBuilder::new("strong")?.text(&notification.title).build())?;
    if !notification.description.is_empty() {
        banner = banner.child(ElementBuilder::new("p")?.text(&notification.description).build())?;
    }
    Ok(Some(banner.build()))
}

pub fn render_update_banner(vm: &UpdateViewModel) -> Result<Option<Element>, JsValue> {
    let Some(info) = vm.visible() else {
        return Ok(None);
    };
    let mut banner = ElementBuilder::new("div")?
        .class("update-banner")
        .child(ElementBuilder::new("span")?.text(&format!("Nova versão disponível: {}", info.display_name())).build())?;
    if let Some(url) = info.html_url.as_deref() {
        let link = ElementBuilder::new("a")?
            .attr("href", url)?
            .attr("target", "_blank")?
            .attr("rel", "noopener noreferrer")?
            .text("Ver novidades")
            .build();
        banner = banner.child(link)?;
    }
    let close = ElementBuilder::new("button")?
        .class("update-banner__close")
        .attr("aria-label", "Fechar")?
        .text("×")
        .build();
    let dismiss_vm = vm.clone();
    on_click(&close, move |_| {
        dismiss_vm.dismiss();
        crate::app::rerender();
    })?;
    Ok(Some(banner.child(close)?.build()))
}
