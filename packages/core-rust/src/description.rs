//! Service descriptions and the host abstraction.

use http::Uri;

use crate::behavior::BehaviorCollection;
use crate::binding::BindingConfig;
use crate::contract::ContractDescriptor;

/// A realized endpoint on a service host: contract, configured binding, and
/// the resolved listen URI.
#[derive(Debug, Clone)]
pub struct ServiceEndpoint {
    pub contract: ContractDescriptor,
    pub binding: BindingConfig,
    pub address: Uri,
}

/// Everything a hosting runtime needs to know to expose one service.
#[derive(Debug, Default)]
pub struct ServiceDescription {
    /// Cross-cutting behaviors, at most one per kind.
    pub behaviors: BehaviorCollection,
    /// Realized endpoints, in the order they were applied.
    pub endpoints: Vec<ServiceEndpoint>,
}

impl ServiceDescription {
    /// Creates an empty description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Endpoints registered under the given contract.
    pub fn endpoints_for(
        &self,
        contract: ContractDescriptor,
    ) -> impl Iterator<Item = &ServiceEndpoint> {
        self.endpoints
            .iter()
            .filter(move |endpoint| endpoint.contract == contract)
    }
}

/// A service host owned by an external runtime.
///
/// The configuration layer only reads and mutates a host through this
/// trait. Constructing, opening, and closing hosts is the runtime's job and
/// stays outside this workspace.
pub trait ServiceHost {
    /// The host's service description.
    fn description(&self) -> &ServiceDescription;

    /// Mutable access to the host's service description.
    fn description_mut(&mut self) -> &mut ServiceDescription;
}
