//! WASM build of the learning store for the browser.
//!
//! The browser keeps the same three keys as the CLI, in `localStorage`,
//! so exports move freely between the two.
//!
//! # Modules
//!
//! - `web_storage`: [`Bucket`](crate::storage::Bucket) over `window.localStorage`
//! - `bindings`: wasm-bindgen exports for JavaScript interop
//!
//! # Usage
//!
//! Built with `wasm-pack build --target web -- --features wasm`:
//!
//! ```javascript
//! import init, { LearnerApp } from './notes_learner.js';
//!
//! await init();
//! const app = new LearnerApp();
//! app.onChange((event) => render(JSON.parse(event)));
//! app.importDocument(markdownText);
//! ```

mod bindings;
mod web_storage;

pub use bindings::LearnerApp;
pub use web_storage::WebStorageBucket;

use wasm_bindgen::prelude::wasm_bindgen;

/// Convert Rust panics into readable errors in the browser console.
#[wasm_bindgen(js_name = initPanicHook)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Version information for the WASM module
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
