//! Error types for WebAssembly bridge implementations

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors that can occur in WebAssembly bridge implementations
#[derive(Error, Debug)]
pub enum WasmError {
    /// JavaScript error from web-sys
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// A browser global (`window`, `document`, ...) is missing
    #[error("Browser API not available: {0}")]
    NotAvailable(String),

    /// A created element was not of the expected DOM type
    #[error("Unexpected element type: expected {0}")]
    ElementType(&'static str),

    /// Host options could not be converted from JavaScript
    #[error("Invalid options: {0}")]
    Options(String),
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::NotAvailable(what) => BridgeError::NotAvailable(what),
            WasmError::ElementType(_) => BridgeError::ElementCreation(err.to_string()),
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

impl From<JsValue> for WasmError {
    fn from(js_value: JsValue) -> Self {
        WasmError::JavaScript(js_message(&js_value))
    }
}

impl From<serde_wasm_bindgen::Error> for WasmError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        WasmError::Options(err.to_string())
    }
}

/// Readable message for a thrown JavaScript value.
pub(crate) fn js_message(js_value: &JsValue) -> String {
    if js_value.is_string() {
        js_value
            .as_string()
            .unwrap_or_else(|| "Unknown error".to_string())
    } else if let Some(error) = js_value.dyn_ref::<js_sys::Error>() {
        error.message().into()
    } else {
        format!("{:?}", js_value)
    }
}

/// Wrap a JavaScript failure from `context` as a bridge error.
pub(crate) fn js_error(context: &str, err: JsValue) -> BridgeError {
    BridgeError::OperationFailed(format!("{context}: {}", js_message(&err)))
}
