use std::cell::RefCell;
use std::collections::HashMap;

/// Selector memoization scoped to one page controller.
///
/// Misses are remembered as well, so optional elements are looked up once.
pub struct DomCache<T> {
    entries: RefCell<HashMap<String, Option<T>>>,
}

impl<T: Clone> DomCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn get_or_lookup<F>(&self, selector: &str, lookup: F) -> Option<T>
    where
        F: FnOnce(&str) -> Option<T>,
    {
        if let Some(cached) = self.entries.borrow().get(selector) {
            return cached.clone();
        }
        let found = lookup(selector);
        self.entries
            .borrow_mut()
            .insert(selector.to_string(), found.clone());
        found
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl<T: Clone> Default for DomCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl DomCache<web_sys::Element> {
    pub fn query(&self, document: &web_sys::Document, selector: &str) -> Option<web_sys::Element> {
        self.get_or_lookup(selector, |selector| {
            document.query_selector(selector).ok().flatten()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    #[test]
    fn looks_up_each_selector_once() {
        let cache = DomCache::new();
        let calls = Cell::new(0);
        let lookup = |selector: &str| {
            calls.set(calls.get() + 1);
            Some(selector.len())
        };
        assert_eq!(cache.get_or_lookup("#mobileSidebar", lookup), Some(14));
        assert_eq!(cache.get_or_lookup("#mobileSidebar", lookup), Some(14));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn remembers_misses() {
        let cache: DomCache<u8> = DomCache::new();
        let calls = Cell::new(0);
        for _ in 0..3 {
            let found = cache.get_or_lookup(".toc-sticky-mobile", |_| {
                calls.set(calls.get() + 1);
                None
            });
            assert_eq!(found, None);
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_forces_fresh_lookups() {
        let cache = DomCache::new();
        cache.get_or_lookup("a", |_| Some(1));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_lookup("a", |_| Some(2)), Some(2));
    }
}
