// ============================================================================
// INDICATOR TABLE - Render de la pantalla de indicadores SLA (wasm32)
// ============================================================================
// Barra de filtros, tabla por base, tabla de motoristas, paginación,
// menús anclados (columna, ciudades, bases) y detalle de drill-down.
// Toda acción pasa por el IndicatorViewModel y termina en rerender().
// ============================================================================

use std::future::Future;

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::config::ROWS_PER_PAGE_OPTIONS;
use crate::dom::{anchor_below, append_child, on_change, on_click, ElementBuilder};
use crate::models::{IndicatorRow, Period};
use crate::state::{AnchorRect, SORT_OPTIONS};
use crate::viewmodels::indicator_viewmodel::{driver_cells, IndicatorViewModel};
use crate::views::{render_cell, render_percent_cell, CellView, ColumnDescriptor, PercentCell, PercentMode};

/// Id del trigger del filtro de una columna
pub fn column_trigger_id(column: usize) -> String {
    format!("sla-col-trigger-{}", column)
}

pub const COLUMN_MENU_ID: &str = "sla-column-menu";
pub const CITIES_MENU_ID: &str = "sla-cities-menu";
pub const CITIES_TRIGGER_ID: &str = "sla-cities-trigger";
pub const BASES_MENU_ID: &str = "sla-bases-menu";
pub const BASES_TRIGGER_ID: &str = "sla-bases-trigger";

/// Corre una acción async del VM y repinta al terminar
fn spawn_then_rerender<F>(task: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(async move {
        task.await;
        crate::app::rerender();
    });
}

fn option(value: &str, label: &str, selected: bool) -> Result<Element, JsValue> {
    let builder = ElementBuilder::new("option")?.attr("value", value)?.text(label);
    if selected {
        return Ok(builder.attr("selected", "selected")?.build());
    }
    Ok(builder.build())
}

fn button(class: &str, label: &str) -> Result<Element, JsValue> {
    Ok(ElementBuilder::new("button")?.class(class).attr("type", "button")?.text(label).build())
}

fn anchored_panel(tag: &str, class: &str, id: &str, anchor: AnchorRect) -> Result<ElementBuilder, JsValue> {
    let style = format!(
        "position: fixed; top: {}px; left: {}px; min-width: {}px",
        anchor.top, anchor.left, anchor.width
    );
    ElementBuilder::new(tag)?.class(class).id(id)?.attr("style", &style)
}

// ============================================================================
// BARRA DE FILTROS
// ============================================================================

/// Fecha, período, bases, ciudades, orden y modo del % SLA
pub fn render_toolbar(vm: &IndicatorViewModel) -> Result<Element, JsValue> {
    let snapshot = vm.snapshot();
    let filters = vm.filters();

    let date = ElementBuilder::new("input")?
        .class("sla-toolbar__date")
        .attr("type", "date")?
        .attr("value", filters.effective_dates().first().map(String::as_str).unwrap_or_default())?
        .build();
    let date_vm = vm.clone();
    on_change(&date, move |value| {
        let vm = date_vm.clone();
        if value.is_empty() {
            spawn_then_rerender(async move { vm.clear_dates().await });
        } else {
            spawn_then_rerender(async move { vm.select_date(&value).await });
        }
    })?;

    let mut period = ElementBuilder::new("select")?.class("sla-toolbar__period");
    for (value, label, choice) in [("Todos", "Todos", Period::All), ("AM", "AM", Period::Am), ("PM", "PM", Period::Pm)] {
        period = period.child(option(value, label, filters.period() == choice)?)?;
    }
    let period = period.build();
    let period_vm = vm.clone();
    on_change(&period, move |value| {
        let vm = period_vm.clone();
        spawn_then_rerender(async move { vm.set_period(Period::parse(&value)).await });
    })?;

    let bases_label = match filters.bases().len() {
        0 => "Bases: todas".to_string(),
        n => format!("Bases ({})", n),
    };
    let bases = ElementBuilder::new("button")?
        .class("sla-toolbar__trigger")
        .id(BASES_TRIGGER_ID)?
        .attr("type", "button")?
        .text(&bases_label)
        .build();
    let (bases_vm, bases_el) = (vm.clone(), bases.clone());
    on_click(&bases, move |_| {
        bases_vm.toggle_bases_menu(anchor_below(&bases_el));
        crate::app::rerender();
    })?;

    let cities_label = match filters.cities().len() {
        0 => "Cidades: todas".to_string(),
        n => format!("Cidades ({})", n),
    };
    let cities = ElementBuilder::new("button")?
        .class("sla-toolbar__trigger")
        .id(CITIES_TRIGGER_ID)?
        .attr("type", "button")?
        .text(&cities_label)
        .build();
    let (cities_vm, cities_el) = (vm.clone(), cities.clone());
    on_click(&cities, move |_| {
        cities_vm.toggle_cities_menu(anchor_below(&cities_el));
        crate::app::rerender();
    })?;

    let mut sort = ElementBuilder::new("select")?.class("sla-toolbar__sort");
    for (index, (option_sort, label)) in SORT_OPTIONS.iter().enumerate() {
        sort = sort.child(option(&index.to_string(), label, *option_sort == snapshot.sort)?)?;
    }
    let sort = sort.build();
    let sort_vm = vm.clone();
    on_change(&sort, move |value| {
        let chosen = value.parse::<usize>().ok().and_then(|i| SORT_OPTIONS.get(i));
        if let Some((chosen, _)) = chosen {
            sort_vm.set_sort(*chosen);
            crate::app::rerender();
        }
    })?;

    let mut mode = ElementBuilder::new("select")?.class("sla-toolbar__percent-mode");
    for choice in PercentMode::ALL {
        mode = mode.child(option(choice.as_str(), choice.as_str(), choice == snapshot.percent_mode)?)?;
    }
    let mode = mode.build();
    let mode_vm = vm.clone();
    on_change(&mode, move |value| {
        let vm = mode_vm.clone();
        spawn_then_rerender(async move {
            if let Err(e) = vm.set_percent_mode(PercentMode::parse(&value)).await {
                log::warn!("⚠️ No se pudo guardar el modo del % SLA: {}", e);
            }
        });
    })?;

    Ok(ElementBuilder::new("div")?
        .class("sla-toolbar")
        .child(date)?
        .child(period)?
        .child(bases)?
        .child(cities)?
        .child(sort)?
        .child(mode)?
        .build())
}

// ============================================================================
// TABLAS
// ============================================================================

/// Tabla por base. Con filtros por columna activos muestra el resumen
/// recalculado con los motoristas visibles.
pub fn render_base_table(vm: &IndicatorViewModel) -> Result<Element, JsValue> {
    let snapshot = vm.snapshot();
    let rows: &[IndicatorRow] = if vm.filters().active_columns().is_empty() {
        &snapshot.by_base
    } else {
        &snapshot.filtered_by_base
    };
    let mut table = ElementBuilder::new("table")?.class("sla-table sla-table--bases");

    let head = ElementBuilder::new("tr")?;
    let head = ["Base", "Entregues", "Não entregues", "Total", "% SLA"]
        .into_iter()
        .try_fold(head, |row, label| row.child(ElementBuilder::new("th")?.text(label).build()))?;
    table = table.child(head.build())?;

    for base in rows {
        let percent = PercentCell::build(&serde_json::Value::from(base.sla_percent), snapshot.percent_mode);
        let row = ElementBuilder::new("tr")?
            .child(ElementBuilder::new("td")?.text(&base.nome).build())?
            .child(ElementBuilder::new("td")?.text(&base.delivered.to_string()).build())?
            .child(ElementBuilder::new("td")?.text(&base.not_delivered.to_string()).build())?
            .child(ElementBuilder::new("td")?.text(&base.total().to_string()).build())?
            .child(ElementBuilder::new("td")?.child(render_percent_cell(&percent)?)?.build())?;
        table = table.child(row.build())?;
    }
    Ok(table.build())
}

/// Tabla de motoristas de la página actual, con drill-down en las celdas numéricas
pub fn render_driver_table(vm: &IndicatorViewModel) -> Result<Element, JsValue> {
    let snapshot = vm.snapshot();
    let columns = vm.columns();
    let active = vm.filters().active_columns();

    let mut head = ElementBuilder::new("tr")?;
    for column in &columns {
        let th = ElementBuilder::new("th")?.text(&column.label);
        if column.filterable {
            let class = if active.contains(&column.index) {
                "sla-col-filter sla-col-filter--active"
            } else {
                "sla-col-filter"
            };
            let trigger = th.class(class).id(&column_trigger_id(column.index))?.build();
            let (vm, index, anchor_el) = (vm.clone(), column.index, trigger.clone());
            on_click(&trigger, move |_| {
                vm.toggle_column_menu(index, anchor_below(&anchor_el));
                crate::app::rerender();
            })?;
            head = head.child(trigger)?;
            continue;
        }
        head = head.child(th.build())?;
    }

    let mut table = ElementBuilder::new("table")?
        .class("sla-table sla-table--drivers")
        .child(head.build())?;

    if snapshot.loading {
        let row = ElementBuilder::new("tr")?
            .child(ElementBuilder::new("td")?.class("sla-table__loading").text("Carregando...").build())?;
        return Ok(table.child(row.build())?.build());
    }

    for (position, driver) in &snapshot.visible_drivers {
        let cells = driver_cells(*position, driver);
        let mut row = ElementBuilder::new("tr")?;
        for column in &columns {
            let value = cells.get(column.index).map(String::as_str).unwrap_or_default();
            row = row.child(render_driver_cell(vm, column, value, driver)?)?;
        }
        table = table.child(row.build())?;
    }
    Ok(table.build())
}

fn render_driver_cell(
    vm: &IndicatorViewModel,
    column: &ColumnDescriptor,
    value: &str,
    driver: &IndicatorRow,
) -> Result<Element, JsValue> {
    let td = ElementBuilder::new("td")?.build();
    match render_cell(column, value) {
        CellView::Text(text) => td.set_text_content(Some(&text)),
        CellView::Percent(cell) => append_child(&td, &render_percent_cell(&cell)?)?,
        CellView::DrillDown { value, kind } => {
            td.set_class_name("sla-cell--clickable");
            td.set_text_content(Some(&value));
            let vm = vm.clone();
            let name = driver.nome.clone();
            let base = driver.base_label();
            on_click(&td, move |_| {
                let vm = vm.clone();
                let (name, base) = (name.clone(), base.clone());
                // El error ya quedó en el log del VM; el detalle queda cerrado
                spawn_then_rerender(async move {
                    let _ = vm.open_drill_down(kind, &name, &base).await;
                });
            })?;
        }
    }
    Ok(td)
}

/// Anterior / siguiente, página actual y filas por página
pub fn render_pagination(vm: &IndicatorViewModel) -> Result<Element, JsValue> {
    let snapshot = vm.snapshot();

    let previous = button("sla-pagination__prev", "‹")?;
    if snapshot.page <= 1 {
        previous.set_attribute("disabled", "disabled")?;
    }
    let (prev_vm, target) = (vm.clone(), snapshot.page.saturating_sub(1));
    on_click(&previous, move |_| {
        prev_vm.go_to_page(target);
        crate::app::rerender();
    })?;

    let next = button("sla-pagination__next", "›")?;
    if snapshot.page >= snapshot.page_count {
        next.set_attribute("disabled", "disabled")?;
    }
    let (next_vm, target) = (vm.clone(), snapshot.page + 1);
    on_click(&next, move |_| {
        next_vm.go_to_page(target);
        crate::app::rerender();
    })?;

    let mut per_page = ElementBuilder::new("select")?.class("sla-pagination__rows");
    for rows in ROWS_PER_PAGE_OPTIONS {
        per_page = per_page.child(option(&rows.to_string(), &rows.to_string(), rows == snapshot.rows_per_page)?)?;
    }
    let per_page = per_page.build();
    let rows_vm = vm.clone();
    on_change(&per_page, move |value| {
        if let Ok(rows) = value.parse::<u32>() {
            if rows_vm.set_rows_per_page(rows) {
                crate::app::rerender();
            }
        }
    })?;

    let status = format!(
        "Página {} de {} · {} motoristas",
        snapshot.page, snapshot.page_count, snapshot.filtered_driver_count
    );
    Ok(ElementBuilder::new("div")?
        .class("sla-pagination")
        .child(previous)?
        .child(ElementBuilder::new("span")?.text(&status).build())?
        .child(next)?
        .child(per_page)?
        .build())
}

// ============================================================================
// MENÚS ANCLADOS
// ============================================================================

/// Menú de valores de la columna abierta
pub fn render_column_menu(vm: &IndicatorViewModel) -> Result<Option<Element>, JsValue> {
    let menu = vm.column_menu();
    let (Some(column), Some(anchor)) = (menu.open_key(), menu.anchor()) else {
        return Ok(None);
    };
    let selected = vm.filters().column_values(column).to_vec();
    let mut list = anchored_panel("ul", "sla-column-menu", COLUMN_MENU_ID, anchor)?;

    let search = ElementBuilder::new("input")?
        .class("sla-column-menu__search")
        .attr("type", "search")?
        .attr("placeholder", "Buscar")?
        .attr("value", menu.search())?
        .build();
    let search_vm = vm.clone();
    on_change(&search, move |text| {
        search_vm.set_column_search(&text);
        crate::app::rerender();
    })?;
    list = list.child(ElementBuilder::new("li")?.child(search)?.build())?;

    let clear = button("sla-column-menu__clear", "Limpar filtro")?;
    let clear_vm = vm.clone();
    on_click(&clear, move |_| {
        let vm = clear_vm.clone();
        spawn_then_rerender(async move { vm.clear_column(column).await });
    })?;
    list = list.child(ElementBuilder::new("li")?.child(clear)?.build())?;

    for value in vm.open_column_options() {
        let class = if selected.iter().any(|s| s.eq_ignore_ascii_case(&value)) {
            "sla-column-menu__option sla-column-menu__option--selected"
        } else {
            "sla-column-menu__option"
        };
        let item = ElementBuilder::new("li")?.class(class).text(&value).build();
        let vm = vm.clone();
        on_click(&item, move |_| {
            let (vm, value) = (vm.clone(), value.clone());
            spawn_then_rerender(async move { vm.toggle_column_value(column, &value).await });
        })?;
        list = list.child(item)?;
    }
    Ok(Some(list.build()))
}

/// Menú de ciudades: búsqueda, todas / ninguna y una opción por ciudad
pub fn render_cities_menu(vm: &IndicatorViewModel) -> Result<Option<Element>, JsValue> {
    let menu = vm.cities_menu();
    let Some(anchor) = menu.anchor().filter(|_| menu.is_open()) else {
        return Ok(None);
    };
    let selected = vm.filters().cities().to_vec();
    let mut list = anchored_panel("ul", "sla-cities-menu", CITIES_MENU_ID, anchor)?;

    let search = ElementBuilder::new("input")?
        .class("sla-cities-menu__search")
        .attr("type", "search")?
        .attr("placeholder", "Buscar cidade")?
        .attr("value", menu.search())?
        .build();
    let search_vm = vm.clone();
    on_change(&search, move |text| {
        search_vm.set_cities_search(&text);
        crate::app::rerender();
    })?;
    list = list.child(ElementBuilder::new("li")?.child(search)?.build())?;

    let all = button("sla-cities-menu__all", "Selecionar todas")?;
    let all_vm = vm.clone();
    on_click(&all, move |_| {
        let vm = all_vm.clone();
        spawn_then_rerender(async move { vm.select_all_cities().await });
    })?;
    let none = button("sla-cities-menu__none", "Limpar")?;
    let none_vm = vm.clone();
    on_click(&none, move |_| {
        let vm = none_vm.clone();
        spawn_then_rerender(async move { vm.deselect_all_cities().await });
    })?;
    list = list.child(ElementBuilder::new("li")?.child(all)?.child(none)?.build())?;

    for city in vm.visible_city_options() {
        let class = if selected.contains(&city) {
            "sla-cities-menu__option sla-cities-menu__option--selected"
        } else {
            "sla-cities-menu__option"
        };
        let item = ElementBuilder::new("li")?.class(class).text(&city).build();
        let vm = vm.clone();
        on_click(&item, move |_| {
            let (vm, city) = (vm.clone(), city.clone());
            spawn_then_rerender(async move { vm.toggle_city(&city).await });
        })?;
        list = list.child(item)?;
    }
    Ok(Some(list.build()))
}

/// Menú de bases: una opción por base conocida, limpiar y guardar como padrão
pub fn render_bases_menu(vm: &IndicatorViewModel) -> Result<Option<Element>, JsValue> {
    let menu = vm.bases_menu();
    let Some(anchor) = menu.anchor().filter(|_| menu.is_open()) else {
        return Ok(None);
    };
    let snapshot = vm.snapshot();
    let selected = vm.filters().bases();
    let mut list = anchored_panel("ul", "sla-bases-menu", BASES_MENU_ID, anchor)?;

    let clear = button("sla-bases-menu__clear", "Todas")?;
    let clear_vm = vm.clone();
    on_click(&clear, move |_| {
        let vm = clear_vm.clone();
        spawn_then_rerender(async move { vm.clear_bases().await });
    })?;
    let save = button("sla-bases-menu__save", "Salvar como padrão")?;
    let save_vm = vm.clone();
    on_click(&save, move |_| {
        let vm = save_vm.clone();
        spawn_then_rerender(async move {
            if let Err(e) = vm.save_bases_config().await {
                log::warn!("⚠️ No se pudieron guardar las bases: {}", e);
            }
        });
    })?;
    list = list.child(ElementBuilder::new("li")?.child(clear)?.child(save)?.build())?;

    for base in snapshot.base_options {
        let class = if selected.contains(&base) {
            "sla-bases-menu__option sla-bases-menu__option--selected"
        } else {
            "sla-bases-menu__option"
        };
        let item = ElementBuilder::new("li")?.class(class).text(&base).build();
        let vm = vm.clone();
        on_click(&item, move |_| {
            let (vm, base) = (vm.clone(), base.clone());
            spawn_then_rerender(async move { vm.toggle_base(&base).await });
        })?;
        list = list.child(item)?;
    }
    Ok(Some(list.build()))
}

// ============================================================================
// DRILL-DOWN
// ============================================================================

/// Tabla con los pedidos del detalle abierto
pub fn render_drill_down(vm: &IndicatorViewModel) -> Result<Option<Element>, JsValue> {
    let Some(detail) = vm.snapshot().detail else {
        return Ok(None);
    };
    let title = format!("{} · {} ({} pedidos)", detail.driver, detail.base, detail.response.data.len());

    let close = button("sla-detail__close", "×")?;
    let close_vm = vm.clone();
    on_click(&close, move |_| {
        close_vm.close_drill_down();
        crate::app::rerender();
    })?;

    let mut head = ElementBuilder::new("tr")?;
    for label in &detail.response.header {
        head = head.child(ElementBuilder::new("th")?.text(label).build())?;
    }
    let mut table = ElementBuilder::new("table")?.class("sla-table sla-detail__table").child(head.build())?;
    for row in &detail.response.data {
        let mut tr = ElementBuilder::new("tr")?;
        for value in &row.values {
            tr = tr.child(ElementBuilder::new("td")?.text(value).build())?;
        }
        table = table.child(tr.build())?;
    }

    Ok(Some(
        ElementBuilder::new("section")?
            .class("sla-detail")
            .child(ElementBuilder::new("h3")?.text(&title).build())?
            .child(close)?
            .child(table.build())?
            .build(),
    ))
}
