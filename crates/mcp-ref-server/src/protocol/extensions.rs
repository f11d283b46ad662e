//! Extension registry: namespaced experimental-capability negotiation
//! (spec.md §4.3).

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

/// `namespace/name`, e.g. `acme/turbo-mode`.
fn is_valid_extension_name(name: &str) -> bool {
    let Some((namespace, rest)) = name.split_once('/') else { return false };
    if rest.contains('/') {
        return false;
    }
    let valid_segment = |s: &str| {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    };
    valid_segment(namespace) && valid_segment(rest)
}

/// A registered extension's lifecycle hooks.
///
/// Each hook receives its own `clientSettings` slice (no globals are
/// shared across extensions, per spec.md §9).
#[async_trait::async_trait]
pub trait Extension: Send + Sync {
    fn name(&self) -> &str;

    async fn on_initialize(&self, client_settings: &serde_json::Value);

    async fn on_shutdown(&self);
}

/// Holds registered extensions and, per session, the negotiated enabled set.
pub struct ExtensionRegistry {
    extensions: Vec<Arc<dyn Extension>>,
}

impl ExtensionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { extensions: Vec::new() }
    }

    /// Register an extension. Panics if the name doesn't match
    /// `^[a-z0-9-]+/[a-z0-9-]+$` (a startup-time programming error, not a
    /// runtime condition).
    pub fn register(&mut self, extension: Arc<dyn Extension>) {
        assert!(
            is_valid_extension_name(extension.name()),
            "invalid extension name: {}",
            extension.name()
        );
        self.extensions.push(extension);
    }

    #[must_use]
    pub fn registered_names(&self) -> Vec<String> {
        self.extensions.iter().map(|e| e.name().to_string()).collect()
    }

    /// Negotiate against the client's `experimental` capability map: the
    /// intersection of registered and client-advertised names is enabled,
    /// and each enabled extension's `on_initialize` is invoked with its own
    /// settings slice.
    pub async fn negotiate(
        &self,
        client_experimental: &serde_json::Map<String, serde_json::Value>,
    ) -> HashSet<String> {
        let mut enabled = HashSet::new();
        for ext in &self.extensions {
            if let Some(settings) = client_experimental.get(ext.name()) {
                ext.on_initialize(settings).await;
                enabled.insert(ext.name().to_string());
            }
        }
        enabled
    }

    /// Run `on_shutdown` for every registered extension, in reverse
    /// registration order.
    pub async fn shutdown_all(&self) {
        for ext in self.extensions.iter().rev() {
            ext.on_shutdown().await;
        }
    }
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_extension_name_validation() {
        assert!(is_valid_extension_name("acme/turbo-mode"));
        assert!(is_valid_extension_name("a/b"));
        assert!(!is_valid_extension_name("noSlash"));
        assert!(!is_valid_extension_name("Acme/turbo"));
        assert!(!is_valid_extension_name("acme/"));
        assert!(!is_valid_extension_name("/turbo"));
        assert!(!is_valid_extension_name("a/b/c"));
    }

    struct RecordingExtension {
        name: &'static str,
        order: Arc<std::sync::Mutex<Vec<String>>>,
        init_count: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Extension for RecordingExtension {
        fn name(&self) -> &str {
            self.name
        }

        async fn on_initialize(&self, _client_settings: &serde_json::Value) {
            self.init_count.fetch_add(1, Ordering::SeqCst);
        }

        async fn on_shutdown(&self) {
            self.order.lock().unwrap().push(self.name.to_string());
        }
    }

    #[tokio::test]
    async fn test_negotiate_is_intersection() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = ExtensionRegistry::new();
        registry.register(Arc::new(RecordingExtension {
            name: "acme/turbo",
            order: order.clone(),
            init_count: AtomicUsize::new(0),
        }));

        let mut experimental = serde_json::Map::new();
        experimental.insert("acme/turbo".to_string(), serde_json::json!({}));
        experimental.insert("unregistered/thing".to_string(), serde_json::json!({}));

        let enabled = registry.negotiate(&experimental).await;
        assert_eq!(enabled.len(), 1);
        assert!(enabled.contains("acme/turbo"));
    }

    #[tokio::test]
    async fn test_shutdown_runs_in_reverse_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = ExtensionRegistry::new();
        registry.register(Arc::new(RecordingExtension {
            name: "a/first",
            order: order.clone(),
            init_count: AtomicUsize::new(0),
        }));
        registry.register(Arc::new(RecordingExtension {
            name: "b/second",
            order: order.clone(),
            init_count: AtomicUsize::new(0),
        }));

        registry.shutdown_all().await;
        assert_eq!(*order.lock().unwrap(), vec!["b/second".to_string(), "a/first".to_string()]);
    }
}
