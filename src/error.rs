use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum FxError {
    #[error("browser global `{0}` is unavailable")]
    MissingGlobal(&'static str),
    #[error("javascript error: {0}")]
    Js(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<JsValue> for FxError {
    fn from(value: JsValue) -> Self {
        let text = value
            .as_string()
            .or_else(|| {
                js_sys::JSON::stringify(&value)
                    .ok()
                    .and_then(|s| s.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        FxError::Js(text)
    }
}

impl From<gloo_net::Error> for FxError {
    fn from(err: gloo_net::Error) -> Self {
        FxError::Network(err.to_string())
    }
}

pub type FxResult<T = ()> = Result<T, FxError>;
