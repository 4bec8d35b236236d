// Console logging. Debug lines compile to nothing without --features logging.

use wasm_bindgen::{JsCast, JsValue};

#[cfg(not(feature = "logging"))]
#[inline(always)]
pub fn debug(_msg: &str) {}

#[cfg(feature = "logging")]
pub fn debug(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

pub fn error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

pub fn js_value_to_string(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return format!("{}: {}", String::from(err.name()), String::from(err.message()));
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
