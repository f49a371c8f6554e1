//! Business Card Scan Web App (Leptos + WASM)

mod app;
mod components;
pub mod api;
mod camera;
mod config;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    gloo::console::log!("card-scan: api base =", config::api_base().as_str());
    leptos::mount::mount_to_body(app::App);
}
