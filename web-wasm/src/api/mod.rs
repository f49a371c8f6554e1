//! ブラウザ側のAPI連携

pub mod fetch;

pub use fetch::FetchApi;

use wasm_bindgen::{JsCast, JsValue};

/// JS例外からユーザー向けメッセージを取り出す
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
