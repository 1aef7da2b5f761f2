//! Bucket backed by the browser's `localStorage`.

use wasm_bindgen::JsValue;
use web_sys::Storage;

use crate::storage::{BackendType, Bucket};
use crate::{Error, Result};

/// `window.localStorage` as a [`Bucket`].
pub struct WebStorageBucket {
    storage: Storage,
}

fn js_error(context: &str, value: JsValue) -> Error {
    Error::Storage(format!("{}: {:?}", context, value))
}

impl WebStorageBucket {
    /// Open the current window's `localStorage`.
    pub fn open() -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| Error::Storage("No window available".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| js_error("localStorage is not accessible", e))?
            .ok_or_else(|| Error::Storage("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl Bucket for WebStorageBucket {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| js_error("getItem failed", e))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        // Throws QuotaExceededError when the origin is out of space
        self.storage
            .set_item(key, value)
            .map_err(|e| js_error("setItem failed", e))
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| js_error("removeItem failed", e))
    }

    fn location(&self) -> String {
        "localStorage".to_string()
    }

    fn backend_type(&self) -> &'static str {
        BackendType::Web.as_str()
    }
}
