// ============================================================================
// MENU STATE - Menús flotantes anclados a su trigger
// ============================================================================
// CLOSED → OPEN (click en trigger) → CLOSED (pointerdown fuera, elección
// única o close explícito). Un menú abierto por tipo: abrir otra clave
// reemplaza la anterior.
// ============================================================================

/// Rectángulo de anclaje: `top` es el borde inferior del trigger
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnchorRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl AnchorRect {
    /// Desde el bounding rect del trigger (top, left, width, height)
    pub fn below_trigger(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self { top: top + height, left, width, height }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }
}

/// Dónde cayó un pointerdown respecto al menú
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Inside,
    Trigger,
    Outside,
}

impl PointerTarget {
    /// Clasificación por coordenadas (sin DOM)
    pub fn classify(x: f64, y: f64, menu: Option<AnchorRect>, trigger: Option<AnchorRect>) -> Self {
        if menu.is_some_and(|r| r.contains(x, y)) {
            PointerTarget::Inside
        } else if trigger.is_some_and(|r| r.contains(x, y)) {
            PointerTarget::Trigger
        } else {
            PointerTarget::Outside
        }
    }
}

/// Menú anclado. `K` identifica qué instancia está abierta (p.ej. el
/// índice de columna); para menús únicos se usa `()`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredMenu<K = ()> {
    open_key: Option<K>,
    anchor: Option<AnchorRect>,
    search: String,
}

impl<K> Default for AnchoredMenu<K> {
    fn default() -> Self {
        Self { open_key: None, anchor: None, search: String::new() }
    }
}

impl<K: Copy + PartialEq> AnchoredMenu<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open_key.is_some()
    }

    pub fn open_key(&self) -> Option<K> {
        self.open_key
    }

    pub fn anchor(&self) -> Option<AnchorRect> {
        self.anchor
    }

    pub fn open(&mut self, key: K, anchor: AnchorRect) {
        self.open_key = Some(key);
        self.anchor = Some(anchor);
        self.search.clear();
    }

    pub fn close(&mut self) {
        self.open_key = None;
        self.anchor = None;
        self.search.clear();
    }

    /// Click en el trigger: abre, o cierra si esa misma clave ya estaba abierta
    pub fn toggle(&mut self, key: K, anchor: AnchorRect) {
        if self.open_key == Some(key) {
            self.close();
        } else {
            self.open(key, anchor);
        }
    }

    /// pointerdown en el documento. Devuelve true si cerró el menú.
    /// El trigger no cierra aquí: su click llega después y hace toggle.
    pub fn on_pointer_down(&mut self, target: PointerTarget) -> bool {
        if self.is_open() && target == PointerTarget::Outside {
            self.close();
            return true;
        }
        false
    }

    /// Elección en un menú de selección única: cierra
    pub fn choose(&mut self) {
        self.close();
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Opciones visibles según el texto de búsqueda (substring, sin mayúsculas)
    pub fn visible_options<'a, S: AsRef<str>>(&self, options: &'a [S]) -> Vec<&'a S> {
        let needle = self.search.trim().to_lowercase();
        options
            .iter()
            .filter(|o| needle.is_empty() || o.as_ref().to_lowercase().contains(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> AnchorRect {
        AnchorRect::below_trigger(10.0, 20.0, 100.0, 30.0)
    }

    #[test]
    fn anchor_sits_below_trigger() {
        assert_eq!(rect(), AnchorRect { top: 40.0, left: 20.0, width: 100.0, height: 30.0 });
    }

    #[test]
    fn trigger_click_toggles() {
        let mut menu: AnchoredMenu = AnchoredMenu::new();
        menu.toggle((), rect());
        assert!(menu.is_open());
        menu.toggle((), rect());
        assert!(!menu.is_open());
        assert_eq!(menu.anchor(), None);
    }

    #[test]
    fn outside_pointer_closes_but_inside_and_trigger_do_not() {
        let mut menu: AnchoredMenu = AnchoredMenu::new();
        menu.open((), rect());
        assert!(!menu.on_pointer_down(PointerTarget::Inside));
        assert!(!menu.on_pointer_down(PointerTarget::Trigger));
        assert!(menu.is_open());
        assert!(menu.on_pointer_down(PointerTarget::Outside));
        assert!(!menu.is_open());
    }

    #[test]
    fn opening_another_column_replaces_the_open_one() {
        let mut menu: AnchoredMenu<usize> = AnchoredMenu::new();
        menu.open(2, rect());
        menu.set_search("bnu");
        menu.toggle(4, rect());
        assert_eq!(menu.open_key(), Some(4));
        assert_eq!(menu.search(), "");
    }

    #[test]
    fn closing_resets_search_and_search_filters_options() {
        let options = vec!["BNU SC", "CWB PR", "Blumenau"];
        let mut menu: AnchoredMenu = AnchoredMenu::new();
        menu.open((), rect());
        menu.set_search("bn");
        assert_eq!(menu.visible_options(&options), vec![&"BNU SC"]);
        menu.set_search("");
        assert_eq!(menu.visible_options(&options).len(), 3);

        menu.set_search("cwb");
        menu.choose();
        assert_eq!(menu.search(), "");
    }

    #[test]
    fn classify_by_coordinates() {
        let trigger = AnchorRect { top: 10.0, left: 20.0, width: 100.0, height: 30.0 };
        let menu = Some(rect());
        assert_eq!(PointerTarget::classify(50.0, 50.0, menu, Some(trigger)), PointerTarget::Inside);
        assert_eq!(PointerTarget::classify(50.0, 15.0, menu, Some(trigger)), PointerTarget::Trigger);
        assert_eq!(PointerTarget::classify(500.0, 500.0, menu, Some(trigger)), PointerTarget::Outside);
    }
}
