//! Browser LocalStorage for the persisted JSON documents
//!
//! Native builds have no storage: reads find nothing and writes are dropped.

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

/// Stored string under `key`, if any
#[cfg(target_arch = "wasm32")]
pub(crate) fn read(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

/// Store `value` under `key`; false when storage is unavailable or full
#[cfg(target_arch = "wasm32")]
pub(crate) fn write(key: &str, value: &str) -> bool {
    local_storage().is_some_and(|s| s.set_item(key, value).is_ok())
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn read(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn write(_key: &str, _value: &str) -> bool {
    false
}
