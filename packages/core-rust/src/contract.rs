//! Service contract identity.

use std::any::TypeId;
use std::fmt;

// ---------------------------------------------------------------------------
// ContractDescriptor
// ---------------------------------------------------------------------------

/// Identifies a service contract by its Rust type.
///
/// Contracts are ordinary types, usually traits used as `dyn Contract`.
/// The descriptor pairs the contract's `TypeId` with its type name so
/// endpoints can be grouped and logged without keeping the type parameter
/// around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractDescriptor {
    type_id: TypeId,
    name: &'static str,
}

impl ContractDescriptor {
    /// Descriptor for the contract type `C`.
    ///
    /// `C` may be unsized, so trait objects work directly:
    /// `ContractDescriptor::of::<dyn OrderService>()`.
    #[must_use]
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    /// Fully qualified type name of the contract.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with the module path trimmed, for logs and error messages.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }

    /// Whether this descriptor identifies the contract type `C`.
    #[must_use]
    pub fn is<C: ?Sized + 'static>(&self) -> bool {
        self.type_id == TypeId::of::<C>()
    }
}

impl fmt::Display for ContractDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// ---------------------------------------------------------------------------
// MetadataExchange
// ---------------------------------------------------------------------------

/// Marker contract for metadata exchange endpoints.
///
/// Derived `/mex` endpoints are registered under this contract so hosts can
/// tell them apart from application endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataExchange;
