/// Wall-clock milliseconds since the Unix epoch.
///
/// Used for cache record timestamps only; nothing orders on it.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}

/// Wall-clock milliseconds since the Unix epoch.
///
/// Used for cache record timestamps only; nothing orders on it.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
