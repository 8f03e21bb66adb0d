//! The registration surface shared by every configurator.

use hostkit_core::address::AddressError;
use hostkit_core::binding::Binding;
use hostkit_core::contract::ContractDescriptor;
use http::Uri;

use crate::configuration::{EndpointDefinition, EndpointRegistry, HostConfiguration};

/// Object surface of a service host configurator: an endpoint registry plus
/// an ordered queue of deferred host actions.
///
/// The generic registration helpers are default methods, so extension
/// traits written against this trait work with any configurator.
pub trait ServiceHostConfigurator {
    /// Shared handle to the registered endpoint definitions.
    fn endpoints(&self) -> &EndpointRegistry;

    /// Queue a deferred host action.
    fn add_host_configuration(&mut self, configuration: HostConfiguration);

    /// Register an endpoint for `contract` with the default `B` binding.
    ///
    /// Registration records the definition and nothing else; validation
    /// happens when the definition is realized onto a host.
    fn add_endpoint<B: Binding>(&mut self, contract: ContractDescriptor, address: B::Address) {
        self.add_endpoint_with::<B>(contract, address, |_| {});
    }

    /// Register an endpoint for `contract`, customizing the binding first.
    ///
    /// The configured binding is stored with the definition and cloned at
    /// realization, so every replay sees the same configuration.
    fn add_endpoint_with<B: Binding>(
        &mut self,
        contract: ContractDescriptor,
        address: B::Address,
        configure: impl FnOnce(&mut B),
    ) {
        let mut binding = B::default();
        configure(&mut binding);
        self.endpoints().register(EndpointDefinition {
            contract,
            binding: binding.into(),
            address: address.into(),
        });
    }

    /// Register an endpoint from a raw URI, converting it into `B`'s
    /// address family.
    ///
    /// # Errors
    ///
    /// Returns an error when the URI's scheme does not belong to `B`'s
    /// address family or the URI has no host.
    fn add_endpoint_from_uri<B>(
        &mut self,
        contract: ContractDescriptor,
        address: Uri,
    ) -> Result<(), AddressError>
    where
        B: Binding,
        B::Address: TryFrom<Uri, Error = AddressError>,
    {
        let address = B::Address::try_from(address)?;
        self.add_endpoint::<B>(contract, address);
        Ok(())
    }
}
