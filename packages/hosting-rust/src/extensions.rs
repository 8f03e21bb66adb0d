//! Cross-cutting configuration extensions.
//!
//! Everything here queues deferred actions or forwards to the generic
//! registration methods; no host is touched until the configuration is
//! applied.

use hostkit_core::address::{HttpEndpointAddress, NamedPipeEndpointAddress, TcpEndpointAddress};
use hostkit_core::behavior::{AddressFilterMode, MetadataBehavior, ServiceBehavior};
use hostkit_core::binding::{
    BasicHttpBinding, BindingConfig, NamedPipeBinding, TcpBinding, WsHttpBinding,
};
use hostkit_core::contract::{ContractDescriptor, MetadataExchange};
use hostkit_core::description::{ServiceEndpoint, ServiceHost};
use tracing::debug;

use crate::configuration::{EndpointDefinition, EndpointRegistry, HostConfigurationError};
use crate::configurator::ServiceHostConfigurator;
use crate::logging::ExecutionLoggingBehavior;

/// Path segment appended to an endpoint address for metadata exchange.
const MEX_SEGMENT: &str = "mex";

/// Configuration helpers available on every configurator.
pub trait ServiceHostConfiguratorExt: ServiceHostConfigurator {
    /// Queue metadata publication for every registered endpoint.
    ///
    /// Equivalent to
    /// [`add_metadata_endpoints_with`](Self::add_metadata_endpoints_with)
    /// with an untouched metadata behavior.
    fn add_metadata_endpoints(&mut self) {
        self.add_metadata_endpoints_with(|_| {});
    }

    /// Queue metadata publication, customizing the metadata behavior first.
    ///
    /// One deferred action is queued regardless of how many endpoints are
    /// registered. When it runs it attaches the host's single
    /// [`MetadataBehavior`], passes it to `configure`, and then walks the
    /// endpoint definitions as they stand at that moment:
    ///
    /// - a named pipe or TCP endpoint gets a `/mex` metadata exchange
    ///   endpoint on its own transport, with security disabled
    /// - a basic HTTP endpoint turns on the behavior's HTTP GET flag
    ///   instead of adding an endpoint
    /// - any other binding fails the action with
    ///   [`HostConfigurationError::UnsupportedMetadataBinding`]
    ///
    /// Endpoints registered after this call are still covered: derivation
    /// and validation happen when the action runs, not when it is queued.
    fn add_metadata_endpoints_with(
        &mut self,
        configure: impl Fn(&mut MetadataBehavior) + 'static,
    ) {
        let registry = self.endpoints().clone();
        debug!("queueing metadata endpoint attachment");
        self.add_host_configuration(Box::new(move |host| {
            attach_metadata(host, &registry, &configure)
        }));
    }

    /// Queue attachment of the execution logging behavior.
    ///
    /// The behavior has no parameters. Queueing this twice still leaves a
    /// single instance on the host.
    fn add_execution_logging(&mut self) {
        self.add_host_configuration(Box::new(|host| {
            host.description_mut()
                .behaviors
                .insert(ExecutionLoggingBehavior::default());
            Ok(())
        }));
    }

    /// Queue a mutation of the host's service behavior.
    ///
    /// The behavior is attached with default settings the first time any
    /// such action runs; `configure` then mutates it in place, so several
    /// queued mutations compose on one behavior.
    fn configure_service(&mut self, configure: impl Fn(&mut ServiceBehavior) + 'static) {
        self.add_host_configuration(Box::new(move |host| {
            let behavior = host
                .description_mut()
                .behaviors
                .find_or_insert_with(ServiceBehavior::default);
            configure(behavior);
            Ok(())
        }));
    }

    /// Queue a switch to accepting requests regardless of their address.
    fn accept_all_incoming_requests(&mut self) {
        self.configure_service(|behavior| {
            behavior.address_filter_mode = AddressFilterMode::Any;
        });
    }

    // ------------------------------------------------------------------
    // Per-binding registration helpers
    // ------------------------------------------------------------------

    /// Register a named pipe endpoint with the default binding.
    fn add_named_pipe_endpoint(
        &mut self,
        contract: ContractDescriptor,
        address: NamedPipeEndpointAddress,
    ) {
        self.add_endpoint::<NamedPipeBinding>(contract, address);
    }

    /// Register a named pipe endpoint, customizing the binding.
    fn add_named_pipe_endpoint_with(
        &mut self,
        contract: ContractDescriptor,
        address: NamedPipeEndpointAddress,
        configure: impl FnOnce(&mut NamedPipeBinding),
    ) {
        self.add_endpoint_with::<NamedPipeBinding>(contract, address, configure);
    }

    /// Register a TCP endpoint with the default binding.
    fn add_net_tcp_endpoint(&mut self, contract: ContractDescriptor, address: TcpEndpointAddress) {
        self.add_endpoint::<TcpBinding>(contract, address);
    }

    /// Register a TCP endpoint, customizing the binding.
    fn add_net_tcp_endpoint_with(
        &mut self,
        contract: ContractDescriptor,
        address: TcpEndpointAddress,
        configure: impl FnOnce(&mut TcpBinding),
    ) {
        self.add_endpoint_with::<TcpBinding>(contract, address, configure);
    }

    /// Register a basic HTTP endpoint with the default binding.
    fn add_basic_http_endpoint(
        &mut self,
        contract: ContractDescriptor,
        address: HttpEndpointAddress,
    ) {
        self.add_endpoint::<BasicHttpBinding>(contract, address);
    }

    /// Register a basic HTTP endpoint, customizing the binding.
    fn add_basic_http_endpoint_with(
        &mut self,
        contract: ContractDescriptor,
        address: HttpEndpointAddress,
        configure: impl FnOnce(&mut BasicHttpBinding),
    ) {
        self.add_endpoint_with::<BasicHttpBinding>(contract, address, configure);
    }

    /// Register a basic HTTP endpoint on the HTTPS form of `address`.
    ///
    /// Host, port, and path are forwarded untouched; only the address
    /// security flag is forced on.
    fn add_secure_basic_http_endpoint(
        &mut self,
        contract: ContractDescriptor,
        address: HttpEndpointAddress,
    ) {
        self.add_endpoint::<BasicHttpBinding>(contract, address.secured());
    }

    /// Register a secure basic HTTP endpoint, customizing the binding.
    fn add_secure_basic_http_endpoint_with(
        &mut self,
        contract: ContractDescriptor,
        address: HttpEndpointAddress,
        configure: impl FnOnce(&mut BasicHttpBinding),
    ) {
        self.add_endpoint_with::<BasicHttpBinding>(contract, address.secured(), configure);
    }

    /// Register a WS HTTP endpoint with the default binding.
    fn add_ws_http_endpoint(&mut self, contract: ContractDescriptor, address: HttpEndpointAddress) {
        self.add_endpoint::<WsHttpBinding>(contract, address);
    }

    /// Register a WS HTTP endpoint, customizing the binding.
    fn add_ws_http_endpoint_with(
        &mut self,
        contract: ContractDescriptor,
        address: HttpEndpointAddress,
        configure: impl FnOnce(&mut WsHttpBinding),
    ) {
        self.add_endpoint_with::<WsHttpBinding>(contract, address, configure);
    }

    /// Register a WS HTTP endpoint on the HTTPS form of `address`.
    fn add_secure_ws_http_endpoint(
        &mut self,
        contract: ContractDescriptor,
        address: HttpEndpointAddress,
    ) {
        self.add_endpoint::<WsHttpBinding>(contract, address.secured());
    }

    /// Register a secure WS HTTP endpoint, customizing the binding.
    fn add_secure_ws_http_endpoint_with(
        &mut self,
        contract: ContractDescriptor,
        address: HttpEndpointAddress,
        configure: impl FnOnce(&mut WsHttpBinding),
    ) {
        self.add_endpoint_with::<WsHttpBinding>(contract, address.secured(), configure);
    }
}

impl<T: ServiceHostConfigurator> ServiceHostConfiguratorExt for T {}

/// Runs the deferred metadata attachment against a host.
fn attach_metadata(
    host: &mut dyn ServiceHost,
    registry: &EndpointRegistry,
    configure: &dyn Fn(&mut MetadataBehavior),
) -> Result<(), HostConfigurationError> {
    {
        let behavior = host
            .description_mut()
            .behaviors
            .find_or_insert_with(MetadataBehavior::default);
        configure(behavior);
    }

    // Derive first, apply after: a failed walk must not leave a partial set
    // of exchange endpoints on the host.
    let mut publish_http_get = false;
    let mut exchange_endpoints = Vec::new();
    for definition in registry.snapshot() {
        match &definition.binding {
            BindingConfig::NamedPipe(_) => exchange_endpoints.push(exchange_endpoint(
                &definition,
                BindingConfig::NamedPipe(NamedPipeBinding::metadata_exchange()),
            )?),
            BindingConfig::Tcp(_) => exchange_endpoints.push(exchange_endpoint(
                &definition,
                BindingConfig::Tcp(TcpBinding::metadata_exchange()),
            )?),
            BindingConfig::BasicHttp(_) => publish_http_get = true,
            BindingConfig::WsHttp(_) => {
                return Err(HostConfigurationError::UnsupportedMetadataBinding {
                    binding: definition.binding.name(),
                });
            }
        }
    }

    let description = host.description_mut();
    if publish_http_get {
        if let Some(behavior) = description.behaviors.find_mut::<MetadataBehavior>() {
            behavior.http_get_enabled = true;
        }
    }
    debug!(
        exchange_endpoints = exchange_endpoints.len(),
        http_get = publish_http_get,
        "metadata endpoints attached"
    );
    description.endpoints.extend(exchange_endpoints);
    Ok(())
}

/// One `/mex` endpoint derived from an application endpoint definition.
fn exchange_endpoint(
    definition: &EndpointDefinition,
    binding: BindingConfig,
) -> Result<ServiceEndpoint, HostConfigurationError> {
    let contract = ContractDescriptor::of::<MetadataExchange>();
    let address = definition.address.child(MEX_SEGMENT).uri().map_err(|source| {
        HostConfigurationError::EndpointAddress {
            contract: contract.short_name(),
            source,
        }
    })?;
    Ok(ServiceEndpoint {
        contract,
        binding,
        address,
    })
}
