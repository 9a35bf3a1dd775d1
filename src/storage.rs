//! Persisted session data.
//!
//! The dashboard keeps exactly one value across page loads: the auth token in
//! `localStorage`. Every accessor degrades to "no token" when storage is
//! unavailable (private mode, headless tests) instead of failing the page.

use wasm_bindgen::JsValue;
use web_sys::Storage;

use crate::constants::AUTH_TOKEN_KEY;

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Read the persisted auth token, ignoring empty values.
pub fn load_token() -> Option<String> {
    let storage = local_storage()?;
    storage
        .get_item(AUTH_TOKEN_KEY)
        .ok()
        .flatten()
        .filter(|t| !t.is_empty())
}

pub fn store_token(token: &str) -> Result<(), JsValue> {
    match local_storage() {
        Some(storage) => storage.set_item(AUTH_TOKEN_KEY, token),
        None => Err(JsValue::from_str("localStorage is not available")),
    }
}

/// Remove the persisted token. Missing storage counts as already cleared.
pub fn clear_token() {
    if let Some(storage) = local_storage() {
        if let Err(e) = storage.remove_item(AUTH_TOKEN_KEY) {
            log::warn!("failed to clear persisted token: {:?}", e);
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn token_round_trips_and_clears() {
        store_token("jwt-123").unwrap();
        assert_eq!(load_token().as_deref(), Some("jwt-123"));
        clear_token();
        assert_eq!(load_token(), None);
    }

    #[wasm_bindgen_test]
    fn empty_token_reads_as_absent() {
        store_token("").unwrap();
        assert_eq!(load_token(), None);
        clear_token();
    }
}
