//! Blob-URL text download used by project export.

/// Offers `contents` to the user as a downloaded file named `file_name`.
///
/// # Errors
///
/// Returns an error when the DOM, Blob or object-URL APIs are unavailable.
pub fn download_text_file(file_name: &str, mime: &str, contents: &str) -> Result<(), String> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::{JsCast, JsValue};

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| "document unavailable".to_string())?;
        let parts = js_sys::Array::of1(&JsValue::from_str(contents));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(mime);
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)
            .map_err(|e| format!("blob creation failed: {e:?}"))?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|e| format!("object url creation failed: {e:?}"))?;
        let anchor = document
            .create_element("a")
            .map_err(|e| format!("anchor creation failed: {e:?}"))?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| "anchor element cast failed".to_string())?;
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.click();
        let _ = web_sys::Url::revoke_object_url(&url);
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (file_name, mime, contents);
        Err("downloads are unavailable outside the browser".to_string())
    }
}
