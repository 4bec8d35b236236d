use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

pub mod captcha;
pub mod config;
pub mod contact;
pub mod dom;
pub mod error;
pub mod geometry;
pub mod log;
pub mod nav;
pub mod reveal;

use captcha::CaptchaWidget;
use config::PageConfig;
use contact::ContactForm;
use nav::MenuState;
use reveal::Reveal;

pub struct PageController {
    pub menu: Option<Rc<RefCell<MenuState>>>,
    pub nav_scrolled: bool,
    pub reveal: Option<Rc<RefCell<Reveal>>>,
    pub captcha: Option<Rc<RefCell<CaptchaWidget>>>,
    pub contact: Option<Rc<RefCell<ContactForm>>>,
}

fn guarded<T>(group: &str, result: Result<T, JsValue>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::error(&format!(
                "{} setup failed: {}",
                group,
                log::js_value_to_string(&err)
            ));
            None
        }
    }
}

impl PageController {
    pub fn attach(window: &Window, document: &Document, config: &PageConfig) -> Self {
        let controller = Self {
            menu: guarded("nav menu", nav::bind_menu(document, config)).flatten(),
            nav_scrolled: guarded("nav scroll", nav::bind_scrolled(window, document, config))
                .unwrap_or(false),
            reveal: guarded("reveal", reveal::bind(window, document, config)).flatten(),
            captcha: guarded("captcha", captcha::bind(document, config)).flatten(),
            contact: guarded("contact", contact::bind(document, config)).flatten(),
        };
        log::debug(&format!(
            "page: menu={} scrolled={} reveal={} captcha={} contact={}",
            controller.menu.is_some(),
            controller.nav_scrolled,
            controller.reveal.is_some(),
            controller.captcha.is_some(),
            controller.contact.is_some()
        ));
        controller
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    if let Err(err) = start_impl() {
        log::error(&format!("fatal: {}", log::js_value_to_string(&err)));
    }
}

fn start_impl() -> Result<(), JsValue> {
    let win = dom::window()?;
    let document = dom::document()?;

    if document.ready_state() == "loading" {
        let document_cb = document.clone();
        let mut pending = Some(win);
        dom::listen(&document, "DOMContentLoaded", move |_event| {
            if let Some(win) = pending.take() {
                PageController::attach(&win, &document_cb, &PageConfig::default());
            }
        })?;
    } else {
        PageController::attach(&win, &document, &PageConfig::default());
    }

    Ok(())
}
