//! Host behaviors and the type-keyed behavior collection.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// HostBehavior trait
// ---------------------------------------------------------------------------

/// Cross-cutting behavior attached to a service host.
///
/// Behaviors are stored by concrete type and a host carries at most one of
/// each. The `Any` bound enables type-based lookup via
/// [`BehaviorCollection::find`].
pub trait HostBehavior: Any + fmt::Debug {
    /// Short name of this behavior, for logs.
    fn name(&self) -> &'static str;

    /// Upcast for type-based lookup.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for type-based lookup.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Consuming upcast, used to hand a displaced behavior back typed.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

// ---------------------------------------------------------------------------
// BehaviorCollection
// ---------------------------------------------------------------------------

/// Behaviors attached to a service description, at most one per concrete
/// type.
///
/// Lookup is by `TypeId`, the same mechanism a service registry uses for
/// typed service lookup. The collection is single-threaded, like everything
/// else in the configuration layer.
#[derive(Debug, Default)]
pub struct BehaviorCollection {
    entries: HashMap<TypeId, Box<dyn HostBehavior>>,
}

impl BehaviorCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a behavior, replacing any existing behavior of the same type.
    ///
    /// Returns the displaced behavior when one was present, so at most one
    /// behavior of each kind is ever attached.
    pub fn insert<B: HostBehavior>(&mut self, behavior: B) -> Option<B> {
        let displaced = self.entries.insert(TypeId::of::<B>(), Box::new(behavior));
        displaced.and_then(|previous| {
            tracing::debug!(behavior = previous.name(), "replacing host behavior");
            previous.into_any().downcast::<B>().ok().map(|boxed| *boxed)
        })
    }

    /// Behavior of type `B`, when one is attached.
    #[must_use]
    pub fn find<B: HostBehavior>(&self) -> Option<&B> {
        self.entries
            .get(&TypeId::of::<B>())
            .and_then(|behavior| behavior.as_any().downcast_ref::<B>())
    }

    /// Mutable behavior of type `B`, when one is attached.
    pub fn find_mut<B: HostBehavior>(&mut self) -> Option<&mut B> {
        self.entries
            .get_mut(&TypeId::of::<B>())
            .and_then(|behavior| behavior.as_any_mut().downcast_mut::<B>())
    }

    /// Behavior of type `B`, attaching the result of `make` first when
    /// absent.
    ///
    /// # Panics
    ///
    /// Panics if the stored entry does not downcast to `B`, which cannot
    /// happen: entries are stored under the `TypeId` of their concrete type.
    pub fn find_or_insert_with<B: HostBehavior>(&mut self, make: impl FnOnce() -> B) -> &mut B {
        self.entries
            .entry(TypeId::of::<B>())
            .or_insert_with(|| Box::new(make()))
            .as_any_mut()
            .downcast_mut::<B>()
            .expect("behavior stored under its own TypeId")
    }

    /// Whether a behavior of type `B` is attached.
    #[must_use]
    pub fn contains<B: HostBehavior>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<B>())
    }

    /// Number of attached behaviors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no behaviors are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MetadataBehavior
// ---------------------------------------------------------------------------

/// Controls how a host publishes service metadata.
///
/// HTTP-bound hosts publish metadata over a GET flag on this behavior; the
/// stream transports publish it through dedicated `/mex` endpoints instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataBehavior {
    /// Serve metadata documents over plain HTTP GET.
    pub http_get_enabled: bool,
    /// Serve metadata documents over HTTPS GET.
    pub https_get_enabled: bool,
}

impl HostBehavior for MetadataBehavior {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

// ---------------------------------------------------------------------------
// ServiceBehavior
// ---------------------------------------------------------------------------

/// How incoming request addresses are matched against endpoint addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressFilterMode {
    /// The request address must match the endpoint address exactly.
    #[default]
    Exact,
    /// The request address must be a child of the endpoint address.
    Prefix,
    /// Any request address is accepted.
    Any,
}

/// How many operations a service instance processes at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// One operation at a time.
    #[default]
    Single,
    /// One operation at a time, re-entered on callbacks.
    Reentrant,
    /// Unrestricted.
    Multiple,
}

/// Service-wide dispatch settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceBehavior {
    /// How incoming request addresses are matched.
    pub address_filter_mode: AddressFilterMode,
    /// How concurrent dispatch is throttled.
    pub concurrency: ConcurrencyMode,
    /// Whether fault details include server-side exception information.
    pub include_exception_details: bool,
}

impl HostBehavior for ServiceBehavior {
    fn name(&self) -> &'static str {
        "service"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_find_returns_the_behavior() {
        let mut behaviors = BehaviorCollection::new();
        behaviors.insert(MetadataBehavior {
            http_get_enabled: true,
            https_get_enabled: false,
        });

        let found = behaviors.find::<MetadataBehavior>();
        assert!(found.is_some_and(|behavior| behavior.http_get_enabled));
    }

    #[test]
    fn find_without_insert_returns_none() {
        let behaviors = BehaviorCollection::new();
        assert!(behaviors.find::<MetadataBehavior>().is_none());
        assert!(behaviors.is_empty());
    }

    #[test]
    fn insert_replaces_and_returns_the_previous_behavior() {
        let mut behaviors = BehaviorCollection::new();
        behaviors.insert(MetadataBehavior {
            http_get_enabled: true,
            https_get_enabled: true,
        });

        let displaced = behaviors.insert(MetadataBehavior::default());
        assert!(displaced.is_some_and(|previous| previous.http_get_enabled));
        assert_eq!(behaviors.len(), 1);
        assert!(behaviors
            .find::<MetadataBehavior>()
            .is_some_and(|behavior| !behavior.http_get_enabled));
    }

    #[test]
    fn first_insert_displaces_nothing() {
        let mut behaviors = BehaviorCollection::new();
        assert!(behaviors.insert(ServiceBehavior::default()).is_none());
    }

    #[test]
    fn distinct_behavior_types_coexist() {
        let mut behaviors = BehaviorCollection::new();
        behaviors.insert(MetadataBehavior::default());
        behaviors.insert(ServiceBehavior::default());

        assert_eq!(behaviors.len(), 2);
        assert!(behaviors.contains::<MetadataBehavior>());
        assert!(behaviors.contains::<ServiceBehavior>());
    }

    #[test]
    fn find_mut_mutates_in_place() {
        let mut behaviors = BehaviorCollection::new();
        behaviors.insert(ServiceBehavior::default());

        if let Some(behavior) = behaviors.find_mut::<ServiceBehavior>() {
            behavior.address_filter_mode = AddressFilterMode::Any;
        }

        assert_eq!(
            behaviors.find::<ServiceBehavior>().map(|b| b.address_filter_mode),
            Some(AddressFilterMode::Any)
        );
    }

    #[test]
    fn find_or_insert_with_reuses_the_existing_behavior() {
        let mut behaviors = BehaviorCollection::new();
        behaviors
            .find_or_insert_with(MetadataBehavior::default)
            .http_get_enabled = true;

        // Second lookup must not reset the flag.
        let behavior = behaviors.find_or_insert_with(MetadataBehavior::default);
        assert!(behavior.http_get_enabled);
        assert_eq!(behaviors.len(), 1);
    }

    #[test]
    fn service_behavior_defaults() {
        let behavior = ServiceBehavior::default();
        assert_eq!(behavior.address_filter_mode, AddressFilterMode::Exact);
        assert_eq!(behavior.concurrency, ConcurrencyMode::Single);
        assert!(!behavior.include_exception_details);
    }

    #[test]
    fn metadata_behavior_defaults() {
        let behavior = MetadataBehavior::default();
        assert!(!behavior.http_get_enabled);
        assert!(!behavior.https_get_enabled);
    }
}
