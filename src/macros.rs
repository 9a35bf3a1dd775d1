//! Small crate-wide convenience macros.

/// Debug-level log line routed through the `log` facade.
///
/// Compiles to nothing in release builds so refresh ticks can log freely
/// without bloating the production console.
///
/// ```rust,ignore
/// debug_log!("tick dropped for {}", responsibility);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        if cfg!(debug_assertions) {
            log::debug!($($arg)*);
        }
    };
}

/// Look up an element by id on a `Document`, returning early with `Ok(())`
/// when it is absent. Role pages render into optional template fragments, so
/// a missing node is not an error.
#[macro_export]
macro_rules! element_or_return {
    ($document:expr, $id:expr) => {
        match $document.get_element_by_id($id) {
            Some(el) => el,
            None => return Ok(()),
        }
    };
}
