//! File download via Blob URLs.
//!
//! Triggers a download by wrapping the encoded bytes in a `Blob`,
//! generating an object URL, and programmatically clicking a temporary
//! `<a>` element. Requires a browser environment.

use fotopro_export::Download;
use wasm_bindgen::JsCast;
use web_sys::BlobPropertyBag;

use crate::WebError;

/// Offer `download` to the user as a file.
///
/// # Errors
///
/// Returns [`WebError::Browser`] if any browser API call fails.
pub fn trigger_download(download: &Download) -> Result<(), WebError> {
    let window = web_sys::window().ok_or_else(|| WebError::Browser("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| WebError::Browser("no document".into()))?;

    let bytes = js_sys::Uint8Array::from(download.bytes.as_slice());
    let parts = js_sys::Array::new();
    parts.push(&bytes);

    let opts = BlobPropertyBag::new();
    opts.set_type(download.mime_type);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| WebError::Browser(format!("failed to cast element: {e:?}")))?;
    anchor.set_href(&url);
    anchor.set_download(&download.filename);

    let body = document
        .body()
        .ok_or_else(|| WebError::Browser("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();

    // The download has started; cleanup failures are not download failures.
    let _ = body.remove_child(&anchor);
    let _ = web_sys::Url::revoke_object_url(&url);

    log::info!("download started: {}", download.filename);
    Ok(())
}
