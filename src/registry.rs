//! Selector → factory registry.
//!
//! A `Registry<T>` maps a selector string to a constructor for one product
//! family. Lookups never fail: an unknown selector resolves to the registry's
//! default family and a warning is logged. The constructor for a family runs
//! at most once per registry; later lookups hand out the cached `Arc`.

use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds one factory instance for a family.
pub type Constructor<T> = Arc<dyn Fn() -> Arc<T> + Send + Sync>;

/// How a selector was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Matched,
    Fallback,
}

pub struct Registry<T: ?Sized> {
    family: &'static str,
    default_selector: String,
    default_constructor: Constructor<T>,
    constructors: HashMap<String, Constructor<T>>,
    instances: DashMap<String, Arc<T>>,
}

fn normalize(selector: &str) -> String {
    selector.trim().to_ascii_lowercase()
}

impl<T: ?Sized + Send + Sync> Registry<T> {
    /// Creates a registry whose fallback family is `default_selector`.
    pub fn new<F>(family: &'static str, default_selector: &str, constructor: F) -> Self
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let default_selector = normalize(default_selector);
        let default_constructor: Constructor<T> = Arc::new(constructor);
        let mut constructors = HashMap::new();
        constructors.insert(default_selector.clone(), Arc::clone(&default_constructor));

        Self {
            family,
            default_selector,
            default_constructor,
            constructors,
            instances: DashMap::new(),
        }
    }

    /// Binds `selector` to a constructor. Re-registering a selector replaces
    /// the earlier binding and drops any cached instance for it.
    pub fn register<F>(&mut self, selector: &str, constructor: F) -> &mut Self
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let key = normalize(selector);
        let constructor: Constructor<T> = Arc::new(constructor);
        if key == self.default_selector {
            self.default_constructor = Arc::clone(&constructor);
        }
        self.instances.remove(&key);
        self.constructors.insert(key, constructor);
        self
    }

    /// Returns the factory bound to `selector`, or the default one.
    pub fn get(&self, selector: &str) -> Arc<T> {
        self.resolve(selector).0
    }

    pub fn resolve(&self, selector: &str) -> (Arc<T>, Resolution) {
        let key = normalize(selector);
        if self.constructors.contains_key(&key) {
            return (self.instance(&key), Resolution::Matched);
        }

        warn!(
            family = self.family,
            selector,
            fallback = %self.default_selector,
            "unknown selector, using default"
        );
        (self.instance(&self.default_selector), Resolution::Fallback)
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.constructors.contains_key(&normalize(selector))
    }

    pub fn default_selector(&self) -> &str {
        &self.default_selector
    }

    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Registered selectors in sorted order.
    pub fn selectors(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn instance(&self, key: &str) -> Arc<T> {
        if let Some(cached) = self.instances.get(key) {
            return Arc::clone(cached.value());
        }

        let constructor = self
            .constructors
            .get(key)
            .unwrap_or(&self.default_constructor);

        // The entry guard holds the shard lock, so racing callers see one instance.
        let entry = self.instances.entry(key.to_string()).or_insert_with(|| {
            debug!(family = self.family, selector = key, "instantiating factory");
            constructor()
        });
        Arc::clone(entry.value())
    }
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut selectors: Vec<&String> = self.constructors.keys().collect();
        selectors.sort_unstable();
        f.debug_struct("Registry")
            .field("family", &self.family)
            .field("default", &self.default_selector)
            .field("selectors", &selectors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;
    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    struct French;
    impl Greeter for French {
        fn greet(&self) -> String {
            "bonjour".to_string()
        }
    }

    fn greeters() -> Registry<dyn Greeter> {
        let mut registry = Registry::<dyn Greeter>::new("greeter", "english", || Arc::new(English));
        registry.register("french", || Arc::new(French));
        registry
    }

    #[test]
    fn test_lookup_matches_registered_selector() {
        let registry = greeters();
        let (greeter, resolution) = registry.resolve("french");
        assert_eq!(greeter.greet(), "bonjour");
        assert_eq!(resolution, Resolution::Matched);
    }

    #[test]
    fn test_lookup_is_case_and_whitespace_insensitive() {
        let registry = greeters();
        assert_eq!(registry.get("  FRENCH ").greet(), "bonjour");
        assert!(registry.contains("French"));
    }

    #[test]
    fn test_unknown_selector_falls_back_to_default() {
        let registry = greeters();
        let (greeter, resolution) = registry.resolve("klingon");
        assert_eq!(greeter.greet(), "hello");
        assert_eq!(resolution, Resolution::Fallback);
    }

    #[test]
    fn test_constructor_runs_once_per_selector() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = Registry::<dyn Greeter>::new("greeter", "english", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(English)
        });

        let first = registry.get("english");
        let second = registry.get("english");
        let fallback = registry.get("unknown");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &fallback));
    }

    #[test]
    fn test_reregistering_replaces_cached_instance() {
        let mut registry = greeters();
        assert_eq!(registry.get("english").greet(), "hello");

        registry.register("english", || Arc::new(French));
        assert_eq!(registry.get("english").greet(), "bonjour");
        assert_eq!(registry.get("nope").greet(), "bonjour");
    }

    #[test]
    fn test_selectors_are_sorted() {
        let registry = greeters();
        assert_eq!(registry.selectors(), vec!["english", "french"]);
        assert_eq!(registry.default_selector(), "english");
        assert_eq!(registry.family(), "greeter");
    }
}
