//! PDF report downloads.
//!
//! Report endpoints answer a `POST` with the PDF bytes. The bytes are wrapped
//! in a `Blob` and saved through a temporary `<a download>` element.

use chrono::NaiveDate;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use super::api_client::{ApiClient, RequestOptions, Transport};
use crate::error::ApiError;

/// `<kind>_<YYYY-MM-DD>.pdf`, e.g. `acta_mesa_2026-10-16.pdf`.
pub fn report_filename(kind: &str, date: NaiveDate) -> String {
    format!("{}_{}.pdf", kind, date.format("%Y-%m-%d"))
}

/// Generate a report and hand it to the browser as a file download.
/// Returns the file name used.
pub async fn download_report<T: Transport>(
    api: &ApiClient<T>,
    endpoint: &str,
    kind: &str,
) -> Result<String, ApiError> {
    let bytes = api.download(endpoint, RequestOptions::post()).await?;
    let filename = report_filename(kind, crate::utils::today());
    save_bytes(&bytes, &filename, "application/pdf")
        .map_err(|e| ApiError::Decode(format!("could not save {}: {:?}", filename, e)))?;
    log::info!("report saved as {} ({} bytes)", filename, bytes.len());
    Ok(filename)
}

fn save_bytes(bytes: &[u8], filename: &str, mime: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let props = BlobPropertyBag::new();
    props.set_type(mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &props)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();
    Url::revoke_object_url(&url)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert_eq!(report_filename("acta_mesa", date), "acta_mesa_2026-03-08.pdf");
        assert_eq!(report_filename("reporte_mesa_12", date), "reporte_mesa_12_2026-03-08.pdf");
    }
}
