//! Thread-local cache of anchored regexes
//!
//! Pattern atoms match only at the current position, so every pattern is
//! compiled once as `^(?:pattern)` and reused for the rest of the thread.

use ahash::RandomState;
use hashbrown::HashMap;
use regex::Regex;
use std::cell::RefCell;

thread_local! {
    static REGEX_CACHE: RefCell<HashMap<String, Regex, RandomState>> =
        RefCell::new(HashMap::with_hasher(RandomState::new()));
}

/// Get or compile the anchored form of `pattern`
///
/// Invalid patterns are not cached.
#[inline]
pub fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    REGEX_CACHE.with(|cache| {
        if let Some(regex) = cache.borrow().get(pattern) {
            return Ok(regex.clone());
        }
        let regex = Regex::new(&format!("^(?:{})", pattern))?;
        cache
            .borrow_mut()
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    })
}

/// Clear the cache
pub fn clear_cache() {
    REGEX_CACHE.with(|cache| cache.borrow_mut().clear());
}

/// Number of cached patterns
pub fn cache_size() -> usize {
    REGEX_CACHE.with(|cache| cache.borrow().len())
}
