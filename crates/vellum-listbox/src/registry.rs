//! Ordered registry of mounted listbox options.
//!
//! Options register here as they mount into the host tree and unregister on
//! unmount. The registry owns nothing but bookkeeping: each entry carries a
//! value, an optional display label, and an opaque [`NodeHandle`] the host
//! uses to focus or scroll the rendered option. The state machine consults
//! the registry live on every dispatch — never a cached snapshot — so
//! options may come and go mid-interaction.
//!
//! Registration is the one place a hard requirement is enforced: an option
//! must carry a non-empty value. Everything downstream degrades gracefully
//! instead of failing.

use std::fmt;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// An opaque handle to a mounted option's host node.
    ///
    /// Handed out by [`OptionRegistry::register`] and echoed back in focus
    /// effects. The machine never dereferences it; the host maps it to a
    /// real element.
    pub struct NodeHandle;
}

/// An opaque, comparable identifier naming a selectable option.
///
/// Uniqueness is the registry caller's responsibility, not the machine's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionValue(String);

impl OptionValue {
    /// Create a value from any string-like input.
    ///
    /// The empty string is representable but will be rejected at
    /// registration time; see [`OptionRegistry::register`].
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// View the value as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for OptionValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A registered option: value, display label, and host node handle.
#[derive(Debug, Clone)]
pub struct OptionEntry {
    /// The option's value.
    pub value: OptionValue,
    /// The display label. May be `None` until the host derives it from the
    /// rendered text after mount; typeahead skips unlabeled entries until
    /// then (falling back to the value string).
    pub label: Option<String>,
    /// Handle to the option's host node.
    pub node: NodeHandle,
}

impl OptionEntry {
    /// The text typeahead matches against: the label when present,
    /// otherwise the value itself.
    pub fn search_text(&self) -> &str {
        self.label.as_deref().unwrap_or(self.value.as_str())
    }
}

/// Registry-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// An option was registered with an empty value.
    EmptyValue,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue => write!(f, "A listbox option must carry a non-empty value"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Ordered collection of mounted options.
///
/// Order is registration order, which the host keeps aligned with document
/// order. Lookup is by value or by index; both are linear, which is fine at
/// listbox scale (virtualization is out of scope).
#[derive(Debug, Default)]
pub struct OptionRegistry {
    /// Backing storage keyed by node handle.
    entries: SlotMap<NodeHandle, OptionEntry>,
    /// Document order of the registered handles.
    order: Vec<NodeHandle>,
}

impl OptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an option, returning the handle for its host node.
    ///
    /// This is the one loud, developer-facing failure in the widget: a
    /// value-less option is a configuration error and is rejected here, at
    /// registration time, never during a transition.
    pub fn register(
        &mut self,
        value: OptionValue,
        label: Option<String>,
    ) -> Result<NodeHandle, RegistryError> {
        if value.is_empty() {
            return Err(RegistryError::EmptyValue);
        }

        let node = self.entries.insert_with_key(|node| OptionEntry {
            value,
            label,
            node,
        });
        self.order.push(node);
        Ok(node)
    }

    /// Unregister an option by its node handle.
    ///
    /// Returns `true` if the option was present. Stale references to the
    /// removed value held by the machine self-heal on the next derived-data
    /// refresh.
    pub fn unregister(&mut self, node: NodeHandle) -> bool {
        if self.entries.remove(node).is_some() {
            self.order.retain(|&n| n != node);
            true
        } else {
            false
        }
    }

    /// Supply or replace an option's display label.
    ///
    /// Labels may be derived lazily from rendered text, so they can arrive
    /// well after registration.
    pub fn set_label(&mut self, node: NodeHandle, label: impl Into<String>) -> bool {
        if let Some(entry) = self.entries.get_mut(node) {
            entry.label = Some(label.into());
            true
        } else {
            false
        }
    }

    /// Iterate the registered options in document order.
    pub fn options(&self) -> impl Iterator<Item = &OptionEntry> + '_ {
        self.order.iter().filter_map(|&node| self.entries.get(node))
    }

    /// Look up an option by value.
    pub fn get(&self, value: &OptionValue) -> Option<&OptionEntry> {
        self.options().find(|entry| &entry.value == value)
    }

    /// Look up an option by document-order index.
    pub fn get_at(&self, index: usize) -> Option<&OptionEntry> {
        self.order
            .get(index)
            .and_then(|&node| self.entries.get(node))
    }

    /// Get the document-order index of a value.
    pub fn index_of(&self, value: &OptionValue) -> Option<usize> {
        self.options().position(|entry| &entry.value == value)
    }

    /// Check whether a value is currently registered.
    pub fn contains(&self, value: &OptionValue) -> bool {
        self.get(value).is_some()
    }

    /// The first option in document order.
    pub fn first(&self) -> Option<&OptionEntry> {
        self.get_at(0)
    }

    /// The last option in document order.
    pub fn last(&self) -> Option<&OptionEntry> {
        self.len().checked_sub(1).and_then(|i| self.get_at(i))
    }

    /// The number of registered options.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_preserves_order() {
        let mut registry = OptionRegistry::new();
        registry.register("apple".into(), Some("Apple".into())).unwrap();
        registry.register("banana".into(), Some("Banana".into())).unwrap();
        registry.register("cherry".into(), Some("Cherry".into())).unwrap();

        let values: Vec<&str> = registry.options().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["apple", "banana", "cherry"]);
        assert_eq!(registry.index_of(&"banana".into()), Some(1));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_empty_value_rejected_at_registration() {
        let mut registry = OptionRegistry::new();
        assert_eq!(
            registry.register("".into(), None),
            Err(RegistryError::EmptyValue)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_removes_from_order() {
        let mut registry = OptionRegistry::new();
        let a = registry.register("a".into(), None).unwrap();
        registry.register("b".into(), None).unwrap();

        assert!(registry.unregister(a));
        assert!(!registry.unregister(a));
        assert_eq!(registry.index_of(&"b".into()), Some(0));
        assert!(!registry.contains(&"a".into()));
    }

    #[test]
    fn test_label_arrives_after_registration() {
        let mut registry = OptionRegistry::new();
        let node = registry.register("apple".into(), None).unwrap();

        // Until the host derives a label, search text falls back to the value.
        assert_eq!(registry.get(&"apple".into()).unwrap().search_text(), "apple");

        assert!(registry.set_label(node, "Apple"));
        assert_eq!(registry.get(&"apple".into()).unwrap().search_text(), "Apple");
    }

    #[test]
    fn test_first_and_last() {
        let mut registry = OptionRegistry::new();
        assert!(registry.first().is_none());
        assert!(registry.last().is_none());

        registry.register("a".into(), None).unwrap();
        registry.register("b".into(), None).unwrap();

        assert_eq!(registry.first().unwrap().value.as_str(), "a");
        assert_eq!(registry.last().unwrap().value.as_str(), "b");
    }
}
