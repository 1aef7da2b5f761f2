//! JavaScript bindings for the browser store.
//!
//! Collections, progress and stats cross the boundary as JSON strings in
//! the same shape the CLI prints.

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::events::{StoreEvent, SubscriptionId};
use crate::store::Store;
use crate::wasm::WebStorageBucket;

fn to_js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(to_js_error)
}

/// A store over `localStorage`, exposed to JavaScript.
#[wasm_bindgen]
pub struct LearnerApp {
    store: Store<WebStorageBucket>,
    subscriptions: Vec<SubscriptionId>,
}

#[wasm_bindgen]
impl LearnerApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<LearnerApp, JsValue> {
        let bucket = WebStorageBucket::open().map_err(to_js_error)?;
        Ok(Self {
            store: Store::new(bucket),
            subscriptions: Vec::new(),
        })
    }

    /// Register `callback`, called with each event as a JSON string.
    /// Returns a handle for `offChange`.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: Function) -> usize {
        let id = self.store.subscribe(move |event: &StoreEvent| {
            if let Ok(json) = serde_json::to_string(event) {
                let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&json));
            }
        });
        self.subscriptions.push(id);
        self.subscriptions.len() - 1
    }

    #[wasm_bindgen(js_name = offChange)]
    pub fn off_change(&mut self, handle: usize) -> bool {
        match self.subscriptions.get(handle) {
            Some(id) => self.store.unsubscribe(*id),
            None => false,
        }
    }

    #[wasm_bindgen(js_name = allData)]
    pub fn all_data(&self) -> Result<String, JsValue> {
        to_json(&self.store.all_data())
    }

    #[wasm_bindgen(js_name = importDocument)]
    pub fn import_document(&mut self, text: &str) -> Result<String, JsValue> {
        let collection = self.store.import_document(text).map_err(to_js_error)?;
        to_json(&collection)
    }

    pub fn restore(&mut self, exported: &str) -> Result<String, JsValue> {
        let collection = self.store.restore(exported).map_err(to_js_error)?;
        to_json(&collection)
    }

    #[wasm_bindgen(js_name = deleteTopic)]
    pub fn delete_topic(&mut self, topic_id: &str) -> bool {
        self.store.delete_topic(topic_id)
    }

    #[wasm_bindgen(js_name = exportAll)]
    pub fn export_all(&self) -> String {
        self.store.export_all()
    }

    pub fn progress(&self) -> Result<String, JsValue> {
        to_json(&self.store.progress())
    }

    #[wasm_bindgen(js_name = toggleCompletion)]
    pub fn toggle_completion(&mut self, nugget_id: &str) -> bool {
        self.store.toggle_completion(nugget_id)
    }

    #[wasm_bindgen(js_name = markCompleted)]
    pub fn mark_completed(&mut self, nugget_id: &str) -> bool {
        self.store.mark_completed(nugget_id)
    }

    #[wasm_bindgen(js_name = currentStreak)]
    pub fn current_streak(&mut self) -> u32 {
        self.store.current_streak()
    }

    pub fn stats(&mut self, topic_id: Option<String>) -> Result<String, JsValue> {
        to_json(&self.store.stats(topic_id.as_deref()))
    }

    #[wasm_bindgen(js_name = reviewDeck)]
    pub fn review_deck(&self, topic_id: Option<String>) -> Result<String, JsValue> {
        to_json(&self.store.review_deck(topic_id.as_deref(), None))
    }

    pub fn reset(&mut self) {
        self.store.reset();
    }
}
