//! Best-effort persistence in the browser's `localStorage`.
//!
//! A missing or full storage area is never fatal: failures are logged and the map
//! carries on with what it has in memory.

fn local_storage() -> Option<web_sys::Storage> {
    match web_sys::window()?.local_storage() {
        Ok(storage) => storage,
        Err(error) => {
            tracing::warn!(?error, "local storage is not available");
            None
        }
    }
}

pub(crate) fn load(key: &str) -> Option<String> {
    match local_storage()?.get_item(key) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(key, ?error, "failed to read local storage");
            None
        }
    }
}

pub(crate) fn save(key: &str, value: &str) {
    let Some(storage) = local_storage() else { return };
    if let Err(error) = storage.set_item(key, value) {
        tracing::warn!(key, ?error, "failed to write local storage");
    }
}
