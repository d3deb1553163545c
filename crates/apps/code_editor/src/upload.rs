//! Reading user-selected files from an `<input type="file">`.

use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement};

/// Files currently selected in `input`, in selection order.
pub(crate) fn selected_files(input: &HtmlInputElement) -> Vec<File> {
    let Some(list) = input.files() else {
        return Vec::new();
    };
    (0..list.length()).filter_map(|index| list.get(index)).collect()
}

/// Reads a file's contents as UTF-8 text.
pub(crate) async fn read_text(file: &File) -> Result<String, String> {
    let text = JsFuture::from(file.text())
        .await
        .map_err(|err| format!("file read failed: {err:?}"))?;
    text.as_string()
        .ok_or_else(|| "file read returned a non-string value".to_string())
}
