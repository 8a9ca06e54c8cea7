//! Warnings with colored terminal output.
//!
//! Provides deduplication so a selector that is evaluated many times does not
//! print the same warning on every evaluation. Used by the selector parser to
//! report text it accepts but ignores.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about selector text that was ignored (prints once per unique message).
///
/// # Example
/// ```ignore
/// warn_once("selector", "ignoring \">\" in selector \"div>p\"");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if first_sighting(component, message) {
        eprintln!("{}", format!("[pluck {component}] ⚠ {message}").yellow());
    }
}

/// Record a warning; `true` the first time a given one is seen.
fn first_sighting(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

/// Clear all recorded warnings so they can be printed again.
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
