use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, FormData, Headers, HtmlButtonElement, HtmlElement, HtmlFormElement, Request,
    RequestInit, Response,
};

use crate::config::{
    FAILURE_BACKGROUND, FAILURE_COLOR, FAILURE_MESSAGE, GENERIC_REJECTION, PageConfig,
    SENDING_LABEL, SENT_LABEL, SUCCESS_BACKGROUND, SUCCESS_COLOR, THANKS_MESSAGE,
};
use crate::dom;
use crate::error::SubmitError;
use crate::log;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Sending,
    Succeeded,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusBanner {
    pub text: &'static str,
    pub background: &'static str,
    pub color: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitView {
    pub banner: StatusBanner,
    pub button_disabled: bool,
    pub button_label: Option<String>,
    pub reset_form: bool,
}

#[derive(Clone, Debug, Default)]
pub struct SubmitFlow {
    status: SubmitStatus,
    original_label: Option<String>,
}

impl SubmitFlow {
    pub fn status(&self) -> SubmitStatus {
        self.status
    }

    /// Enters `Sending`, remembering the button label to restore on failure.
    /// Returns false while a request is already in flight.
    pub fn begin(&mut self, label: Option<String>) -> bool {
        if self.status == SubmitStatus::Sending {
            return false;
        }
        self.status = SubmitStatus::Sending;
        self.original_label = label;
        true
    }

    pub fn finish(&mut self, result: &Result<(), SubmitError>) -> SubmitView {
        match result {
            Ok(()) => {
                self.status = SubmitStatus::Succeeded;
                // The button stays disabled: one send per page visit.
                SubmitView {
                    banner: StatusBanner {
                        text: THANKS_MESSAGE,
                        background: SUCCESS_BACKGROUND,
                        color: SUCCESS_COLOR,
                    },
                    button_disabled: true,
                    button_label: Some(SENT_LABEL.to_string()),
                    reset_form: true,
                }
            }
            Err(_) => {
                self.status = SubmitStatus::Failed;
                SubmitView {
                    banner: StatusBanner {
                        text: FAILURE_MESSAGE,
                        background: FAILURE_BACKGROUND,
                        color: FAILURE_COLOR,
                    },
                    button_disabled: false,
                    button_label: self.original_label.take(),
                    reset_form: false,
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Option<Vec<ErrorEntry>>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    message: Option<String>,
}

/// Turns a non-2xx response into an error, using the first `errors[].message` when present.
pub fn rejection(status: u16, body: &str) -> SubmitError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => {
            let message = parsed
                .errors
                .and_then(|errors| errors.into_iter().next())
                .and_then(|entry| entry.message)
                .unwrap_or_else(|| GENERIC_REJECTION.to_string());
            SubmitError::Rejected { status, message }
        }
        Err(err) => SubmitError::MalformedBody {
            status,
            reason: err.to_string(),
        },
    }
}

fn network_error(err: JsValue) -> SubmitError {
    SubmitError::Network(log::js_value_to_string(&err))
}

fn request_error(err: JsValue) -> SubmitError {
    SubmitError::Request(log::js_value_to_string(&err))
}

async fn post_form(action: &str, data: &FormData) -> Result<(), SubmitError> {
    let headers = Headers::new().map_err(request_error)?;
    headers
        .set("Accept", "application/json")
        .map_err(request_error)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(data);
    init.set_headers(&headers);
    let request = Request::new_with_str_and_init(action, &init).map_err(request_error)?;

    let window = dom::window().map_err(request_error)?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(network_error)?;
    let resp: Response = resp_value.dyn_into().map_err(network_error)?;
    if resp.ok() {
        return Ok(());
    }

    let body = JsFuture::from(resp.text().map_err(network_error)?)
        .await
        .map_err(network_error)?
        .as_string()
        .unwrap_or_default();
    Err(rejection(resp.status(), &body))
}

pub struct ContactForm {
    form: HtmlFormElement,
    submit: Option<HtmlButtonElement>,
    status: Option<HtmlElement>,
    flow: SubmitFlow,
}

impl ContactForm {
    pub fn status(&self) -> SubmitStatus {
        self.flow.status()
    }

    fn show_sending(&self) {
        if let Some(button) = &self.submit {
            button.set_disabled(true);
            button.set_text_content(Some(SENDING_LABEL));
        }
        if let Some(status) = &self.status {
            let _ = status.style().set_property("display", "none");
        }
    }

    /// Applies the outcome of a request to the status region, the form and the button.
    pub fn settle(&mut self, result: &Result<(), SubmitError>) -> SubmitStatus {
        match result {
            Ok(()) => log::debug("contact: message sent"),
            Err(err) => log::error(&format!("contact: {}", err)),
        }
        let view = self.flow.finish(result);
        self.render(&view);
        self.flow.status()
    }

    fn render(&self, view: &SubmitView) {
        if let Some(status) = &self.status {
            status.set_text_content(Some(view.banner.text));
            dom::set_styles(
                status,
                &[
                    ("background", view.banner.background),
                    ("color", view.banner.color),
                    ("display", "block"),
                ],
            );
        }
        if view.reset_form {
            self.form.reset();
        }
        if let Some(button) = &self.submit {
            button.set_disabled(view.button_disabled);
            if let Some(label) = &view.button_label {
                button.set_text_content(Some(label.as_str()));
            }
        }
    }
}

pub async fn submit(contact: Rc<RefCell<ContactForm>>) -> SubmitStatus {
    let request = {
        let mut contact = contact.borrow_mut();
        let label = contact.submit.as_ref().and_then(|b| b.text_content());
        if !contact.flow.begin(label) {
            return contact.flow.status();
        }
        contact.show_sending();
        FormData::new_with_form(&contact.form).map(|data| (contact.form.action(), data))
    };

    let result = match request {
        Ok((action, data)) => post_form(&action, &data).await,
        Err(err) => Err(request_error(err)),
    };

    contact.borrow_mut().settle(&result)
}

/// Intercepts native submission of the contact form. Returns `None` when the form is absent.
pub fn bind(
    document: &Document,
    config: &PageConfig,
) -> Result<Option<Rc<RefCell<ContactForm>>>, JsValue> {
    let Some(form) = document
        .get_element_by_id(config.form_id)
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
    else {
        log::debug("contact: no form on page");
        return Ok(None);
    };

    let contact = Rc::new(RefCell::new(ContactForm {
        form: form.clone(),
        submit: document
            .get_element_by_id(config.submit_id)
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok()),
        status: dom::html_element_by_id(document, config.form_status_id),
        flow: SubmitFlow::default(),
    }));

    {
        let contact = Rc::clone(&contact);
        dom::listen(&form, "submit", move |event| {
            event.prevent_default();
            let contact = Rc::clone(&contact);
            spawn_local(async move {
                submit(contact).await;
            });
        })?;
    }

    Ok(Some(contact))
}
