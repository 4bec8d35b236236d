use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Window};

use crate::config::{NAV_SCROLL_THRESHOLD, PageConfig};
use crate::dom::{self, ACTIVE_CLASS};
use crate::log;

const SCROLLED_CLASS: &str = "scrolled";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuState {
    open: bool,
}

impl MenuState {
    pub fn new(open: bool) -> Self {
        Self { open }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}

pub fn nav_scrolled(scroll_y: f64) -> bool {
    scroll_y > NAV_SCROLL_THRESHOLD
}

fn apply_menu(hamburger: &Element, links: &Element, open: bool) {
    let _ = hamburger.class_list().toggle_with_force(ACTIVE_CLASS, open);
    let _ = links.class_list().toggle_with_force(ACTIVE_CLASS, open);
}

/// Wires the hamburger control and the links panel. Returns `None` when either is absent.
pub fn bind_menu(
    document: &Document,
    config: &PageConfig,
) -> Result<Option<Rc<RefCell<MenuState>>>, JsValue> {
    let (Some(hamburger), Some(links)) = (
        document.query_selector(config.hamburger)?,
        document.query_selector(config.nav_links)?,
    ) else {
        log::debug("nav: no hamburger menu on page");
        return Ok(None);
    };

    let menu = Rc::new(RefCell::new(MenuState::new(
        links.class_list().contains(ACTIVE_CLASS),
    )));

    {
        let menu = Rc::clone(&menu);
        let hamburger_cb = hamburger.clone();
        let links_cb = links.clone();
        dom::listen(&hamburger, "click", move |_event| {
            let open = menu.borrow_mut().toggle();
            apply_menu(&hamburger_cb, &links_cb, open);
        })?;
    }

    for anchor in dom::query_all(&links, "a")? {
        let menu = Rc::clone(&menu);
        let hamburger_cb = hamburger.clone();
        let links_cb = links.clone();
        dom::listen(&anchor, "click", move |_event| {
            menu.borrow_mut().close();
            apply_menu(&hamburger_cb, &links_cb, false);
        })?;
    }

    Ok(Some(menu))
}

pub fn bind_scrolled(window: &Window, document: &Document, config: &PageConfig) -> Result<bool, JsValue> {
    let Some(nav) = document.query_selector(config.nav)? else {
        log::debug("nav: no navigation bar on page");
        return Ok(false);
    };

    let window_cb = window.clone();
    dom::listen(window, "scroll", move |_event| {
        let scroll_y = window_cb.scroll_y().unwrap_or(0.0);
        let _ = nav
            .class_list()
            .toggle_with_force(SCROLLED_CLASS, nav_scrolled(scroll_y));
    })?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_number_of_toggles_restores_state() {
        for initial in [false, true] {
            let mut menu = MenuState::new(initial);
            for _ in 0..4 {
                menu.toggle();
            }
            assert_eq!(menu.is_open(), initial);
        }
    }

    #[test]
    fn odd_toggle_flips_state() {
        let mut menu = MenuState::default();
        assert!(menu.toggle());
        assert!(!menu.toggle());
        assert!(menu.toggle());
    }

    #[test]
    fn close_is_idempotent() {
        let mut menu = MenuState::new(true);
        menu.close();
        menu.close();
        assert!(!menu.is_open());
    }

    #[test]
    fn scrolled_only_strictly_above_threshold() {
        assert!(!nav_scrolled(0.0));
        assert!(!nav_scrolled(50.0));
        assert!(nav_scrolled(50.5));
        assert!(nav_scrolled(1200.0));
    }
}
