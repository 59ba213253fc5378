//! WebAssembly binding for the fotopro browser UI.
//!
//! Exposes a [`WebSession`] class wrapping
//! [`fotopro_pipeline::Session`]. Structured values (adjustments, image
//! info, control ranges) cross the boundary as JSON strings; pixels cross
//! as raw RGBA `Uint8Array` buffers, ready for `ImageData` on a canvas.
//!
//! Errors are thrown as JSON strings (see [`WebError`]) so the UI can
//! branch on the error kind.

pub mod download;

use fotopro_export::ExportError;
use fotopro_pipeline::{Adjustments, PipelineError, Preset, Session, UnknownPreset};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Errors surfaced to JavaScript.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Export(#[from] ExportError),

    /// JSON crossing the boundary could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    UnknownPreset(#[from] UnknownPreset),

    /// Export was requested before any result was produced.
    #[error("nothing has been processed yet")]
    NothingProcessed,

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    Browser(String),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        Self::Browser(format!("{value:?}"))
    }
}

/// Serde-compatible proxy for `WebError`.
#[derive(Serialize)]
enum WebErrorProxy<'a> {
    Pipeline(&'a PipelineError),
    Export(String),
    Json(String),
    UnknownPreset(&'a str),
    NothingProcessed,
    Browser(&'a str),
}

impl WebError {
    /// JSON form thrown to JavaScript.
    fn to_json(&self) -> String {
        let proxy = match self {
            Self::Pipeline(e) => WebErrorProxy::Pipeline(e),
            Self::Export(e) => WebErrorProxy::Export(e.to_string()),
            Self::Json(e) => WebErrorProxy::Json(e.to_string()),
            Self::UnknownPreset(e) => WebErrorProxy::UnknownPreset(&e.0),
            Self::NothingProcessed => WebErrorProxy::NothingProcessed,
            Self::Browser(msg) => WebErrorProxy::Browser(msg),
        };
        serde_json::to_string(&proxy).unwrap_or_else(|_| format!("{:?}", self.to_string()))
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        log::warn!("{err}");
        Self::from_str(&err.to_json())
    }
}

/// Module entry point: route panics and `log` output to the console.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Slider ranges for every control, as JSON.
///
/// # Errors
///
/// Throws if serialization fails.
#[wasm_bindgen]
pub fn controls() -> Result<String, JsValue> {
    Ok(serde_json::to_string(&Adjustments::CONTROLS).map_err(WebError::from)?)
}

/// One user's editing session.
#[wasm_bindgen]
#[derive(Default)]
pub struct WebSession {
    inner: Session,
}

#[wasm_bindgen]
impl WebSession {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an uploaded file. Returns the image info as JSON.
    ///
    /// # Errors
    ///
    /// Throws on an unsupported extension or undecodable bytes.
    pub fn upload(&mut self, filename: &str, bytes: &[u8]) -> Result<String, JsValue> {
        Ok(self.try_upload(filename, bytes)?)
    }

    /// Replace the adjustments with a JSON object. Missing fields take
    /// their neutral values; out-of-range values are clamped to the
    /// control ranges.
    ///
    /// # Errors
    ///
    /// Throws if the JSON does not describe adjustments.
    #[wasm_bindgen(js_name = setAdjustments)]
    pub fn set_adjustments(&mut self, json: &str) -> Result<(), JsValue> {
        Ok(self.try_set_adjustments(json)?)
    }

    /// Apply a preset by name (`vibrant`, `soft`, `max-sharpness`).
    /// Returns the resulting adjustments as JSON.
    ///
    /// # Errors
    ///
    /// Throws on an unknown preset name.
    #[wasm_bindgen(js_name = applyPreset)]
    pub fn apply_preset(&mut self, name: &str) -> Result<String, JsValue> {
        Ok(self.try_apply_preset(name)?)
    }

    /// Current adjustments as JSON.
    ///
    /// # Errors
    ///
    /// Throws if serialization fails.
    pub fn adjustments(&self) -> Result<String, JsValue> {
        Ok(serde_json::to_string(self.inner.adjustments()).map_err(WebError::from)?)
    }

    /// Run the pipeline and return the result as RGBA pixels. Read
    /// `width` and `height` for the buffer's dimensions.
    ///
    /// # Errors
    ///
    /// Throws if nothing has been uploaded.
    pub fn process(&mut self) -> Result<Vec<u8>, JsValue> {
        Ok(self.try_process()?)
    }

    /// Width of the latest result, or `0` before the first run.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.inner.processed().map_or(0, fotopro_pipeline::DynamicImage::width)
    }

    /// Height of the latest result, or `0` before the first run.
    #[wasm_bindgen(getter)]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.inner.processed().map_or(0, fotopro_pipeline::DynamicImage::height)
    }

    /// Image info of the upload as JSON, if any.
    ///
    /// # Errors
    ///
    /// Throws if serialization fails.
    pub fn info(&self) -> Result<Option<String>, JsValue> {
        Ok(self.try_info()?)
    }

    /// Notice describing why the latest run stopped early, if it did.
    #[wasm_bindgen(js_name = lastFailure)]
    #[must_use]
    pub fn last_failure(&self) -> Option<String> {
        self.inner.last_failure().map(str::to_string)
    }

    /// Encode the latest result and start a browser download.
    ///
    /// # Errors
    ///
    /// Throws if nothing has been processed, encoding fails, or a
    /// browser API call fails.
    pub fn download(&self) -> Result<(), JsValue> {
        let prepared = self.try_prepare_download()?;
        Ok(download::trigger_download(&prepared)?)
    }

    /// The latest result encoded as JPEG.
    ///
    /// # Errors
    ///
    /// Throws if nothing has been processed or encoding fails.
    #[wasm_bindgen(js_name = exportBytes)]
    pub fn export_bytes(&self) -> Result<Vec<u8>, JsValue> {
        Ok(self.try_prepare_download()?.bytes)
    }

    /// Download name for the current upload.
    #[wasm_bindgen(js_name = exportFilename)]
    #[must_use]
    pub fn export_filename(&self) -> Option<String> {
        self.inner.filename().map(fotopro_export::export_filename)
    }
}

impl WebSession {
    fn try_upload(&mut self, filename: &str, bytes: &[u8]) -> Result<String, WebError> {
        let info = self.inner.upload(filename, bytes)?;
        Ok(serde_json::to_string(info)?)
    }

    fn try_info(&self) -> Result<Option<String>, WebError> {
        Ok(self.inner.info().map(serde_json::to_string).transpose()?)
    }

    fn try_set_adjustments(&mut self, json: &str) -> Result<(), WebError> {
        let requested: Adjustments = serde_json::from_str(json)?;
        self.inner.set_adjustments(requested.clamped())?;
        Ok(())
    }

    fn try_apply_preset(&mut self, name: &str) -> Result<String, WebError> {
        let preset: Preset = name.parse()?;
        Ok(serde_json::to_string(self.inner.apply_preset(preset))?)
    }

    fn try_process(&mut self) -> Result<Vec<u8>, WebError> {
        let image = self.inner.process()?;
        Ok(image.to_rgba8().into_raw())
    }

    fn try_prepare_download(&self) -> Result<fotopro_export::Download, WebError> {
        let image = self.inner.processed().ok_or(WebError::NothingProcessed)?;
        let filename = self.inner.filename().unwrap_or("image.jpg");
        Ok(fotopro_export::download(image, filename)?)
    }
}
