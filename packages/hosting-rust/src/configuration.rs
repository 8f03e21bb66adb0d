//! Per-service host configuration with deferred application.
//!
//! Registration calls record endpoint definitions and host actions
//! immediately; nothing touches a host until
//! [`ServiceHostConfiguration::configure_host`] replays the lot against
//! one. The separation lets callers keep registering endpoints after
//! cross-cutting requests were queued: a deferred action reads the endpoint
//! registry as it stands when the action runs, not when it was queued.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use hostkit_core::address::{AddressError, EndpointAddress};
use hostkit_core::binding::BindingConfig;
use hostkit_core::contract::ContractDescriptor;
use hostkit_core::description::{ServiceEndpoint, ServiceHost};
use tracing::debug;

use crate::configurator::ServiceHostConfigurator;

/// Errors raised while configuring a service host.
#[derive(Debug, thiserror::Error)]
pub enum HostConfigurationError {
    /// A queued metadata action found an endpoint whose binding has no
    /// metadata strategy.
    #[error("no metadata strategy for binding `{binding}`")]
    UnsupportedMetadataBinding { binding: &'static str },
    /// A registered endpoint address did not realize into a URI.
    #[error("endpoint for contract `{contract}` has an unusable address")]
    EndpointAddress {
        contract: &'static str,
        #[source]
        source: AddressError,
    },
}

/// A deferred host mutation, replayed by
/// [`ServiceHostConfiguration::configure_host`].
///
/// Actions take the host as their only argument and run in registration
/// order. They are `Fn` rather than `FnOnce`: configuring several hosts
/// from one configurator replays the same actions against each.
pub type HostConfiguration =
    Box<dyn Fn(&mut dyn ServiceHost) -> Result<(), HostConfigurationError>>;

// ---------------------------------------------------------------------------
// EndpointDefinition and EndpointRegistry
// ---------------------------------------------------------------------------

/// A registered endpoint: contract, configured binding, typed address.
///
/// Definitions are recorded verbatim. Nothing is validated until the
/// definition is realized onto a host.
#[derive(Debug, Clone)]
pub struct EndpointDefinition {
    pub contract: ContractDescriptor,
    pub binding: BindingConfig,
    pub address: EndpointAddress,
}

/// Ordered endpoint definitions behind a shared handle.
///
/// Deferred actions capture a clone of the handle, so they observe
/// registrations made after they were queued. The `Rc` keeps the whole
/// layer on one thread; configurators are not meant to cross threads.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    definitions: Rc<RefCell<Vec<EndpointDefinition>>>,
}

impl EndpointRegistry {
    /// Append a definition.
    pub fn register(&self, definition: EndpointDefinition) {
        self.definitions.borrow_mut().push(definition);
    }

    /// Definitions registered so far, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EndpointDefinition> {
        self.definitions.borrow().clone()
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.borrow().len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.borrow().is_empty()
    }
}

// ---------------------------------------------------------------------------
// ServiceHostConfiguration
// ---------------------------------------------------------------------------

/// Accumulates endpoint registrations and deferred host actions for the
/// service type `S`.
///
/// `S` is a marker: the configuration never constructs the service, it only
/// identifies which service the resulting host description belongs to.
pub struct ServiceHostConfiguration<S: 'static> {
    endpoints: EndpointRegistry,
    host_configurations: Vec<HostConfiguration>,
    _service: PhantomData<fn() -> S>,
}

impl<S: 'static> ServiceHostConfiguration<S> {
    /// Creates an empty configuration for the service type `S`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoints: EndpointRegistry::default(),
            host_configurations: Vec::new(),
            _service: PhantomData,
        }
    }

    /// Descriptor of the hosted service type.
    #[must_use]
    pub fn service_descriptor(&self) -> ContractDescriptor {
        ContractDescriptor::of::<S>()
    }

    /// The queued host actions, in registration order.
    #[must_use]
    pub fn host_configurations(&self) -> &[HostConfiguration] {
        &self.host_configurations
    }

    /// Applies this configuration to a host.
    ///
    /// Runs two phases, each in registration order:
    /// 1. every registered endpoint definition is realized onto the host
    ///    description
    /// 2. every queued host action runs against the host
    ///
    /// The first error aborts the call and leaves the host partially
    /// configured; there is no rollback and a failed host should be
    /// discarded. Calling this twice replays both phases and duplicates
    /// the endpoints: guarding against double-application is the caller's
    /// job.
    ///
    /// # Errors
    ///
    /// Returns the first endpoint realization or host action error.
    pub fn configure_host(&self, host: &mut dyn ServiceHost) -> Result<(), HostConfigurationError> {
        for definition in self.endpoints.snapshot() {
            let endpoint = realize(&definition)?;
            debug!(
                contract = definition.contract.short_name(),
                binding = definition.binding.name(),
                address = %endpoint.address,
                "realized endpoint"
            );
            host.description_mut().endpoints.push(endpoint);
        }

        debug!(
            actions = self.host_configurations.len(),
            "applying host configurations"
        );
        for configuration in &self.host_configurations {
            configuration(host)?;
        }
        Ok(())
    }
}

impl<S: 'static> Default for ServiceHostConfiguration<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> fmt::Debug for ServiceHostConfiguration<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHostConfiguration")
            .field("service", &self.service_descriptor())
            .field("endpoints", &self.endpoints)
            .field("host_configurations", &self.host_configurations.len())
            .finish()
    }
}

impl<S: 'static> ServiceHostConfigurator for ServiceHostConfiguration<S> {
    fn endpoints(&self) -> &EndpointRegistry {
        &self.endpoints
    }

    fn add_host_configuration(&mut self, configuration: HostConfiguration) {
        self.host_configurations.push(configuration);
    }
}

/// Realizes one definition into a host endpoint.
fn realize(definition: &EndpointDefinition) -> Result<ServiceEndpoint, HostConfigurationError> {
    let address =
        definition
            .address
            .uri()
            .map_err(|source| HostConfigurationError::EndpointAddress {
                contract: definition.contract.short_name(),
                source,
            })?;
    Ok(ServiceEndpoint {
        contract: definition.contract,
        binding: definition.binding.clone(),
        address,
    })
}

#[cfg(test)]
mod tests {
    use hostkit_core::address::{NamedPipeEndpointAddress, TcpEndpointAddress};
    use hostkit_core::binding::{NamedPipeBinding, TcpBinding};
    use hostkit_core::description::ServiceDescription;

    use super::*;

    struct CatalogService;

    struct OrderService;

    /// Minimal in-memory host, standing in for a runtime-owned one.
    #[derive(Default)]
    struct TestHost {
        description: ServiceDescription,
    }

    impl ServiceHost for TestHost {
        fn description(&self) -> &ServiceDescription {
            &self.description
        }

        fn description_mut(&mut self) -> &mut ServiceDescription {
            &mut self.description
        }
    }

    fn make_configuration() -> ServiceHostConfiguration<CatalogService> {
        ServiceHostConfiguration::new()
    }

    fn contract() -> ContractDescriptor {
        ContractDescriptor::of::<OrderService>()
    }

    #[test]
    fn the_configuration_knows_its_service_type() {
        let configuration = make_configuration();
        assert!(configuration.service_descriptor().is::<CatalogService>());
        assert!(!configuration.service_descriptor().is::<OrderService>());
    }

    #[test]
    fn configure_host_realizes_registered_endpoints() {
        let mut configuration = make_configuration();
        configuration
            .add_endpoint::<NamedPipeBinding>(contract(), NamedPipeEndpointAddress::local("test"));
        configuration
            .add_endpoint::<TcpBinding>(contract(), TcpEndpointAddress::new("localhost", "orders", 9000));

        let mut host = TestHost::default();
        configuration.configure_host(&mut host).unwrap();

        let endpoints = &host.description.endpoints;
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].address.scheme_str(), Some("net.pipe"));
        assert_eq!(endpoints[1].address.scheme_str(), Some("net.tcp"));
        assert_eq!(endpoints[1].address.port_u16(), Some(9000));
        assert!(endpoints.iter().all(|endpoint| endpoint.contract == contract()));
    }

    #[test]
    fn actions_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut configuration = make_configuration();
        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            configuration.add_host_configuration(Box::new(move |_host| {
                log.borrow_mut().push(name);
                Ok(())
            }));
        }

        let mut host = TestHost::default();
        configuration.configure_host(&mut host).unwrap();

        assert_eq!(*log.borrow(), ["first", "second", "third"]);
    }

    #[test]
    fn the_first_action_error_stops_the_replay() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut configuration = make_configuration();
        {
            let log = Rc::clone(&log);
            configuration.add_host_configuration(Box::new(move |_host| {
                log.borrow_mut().push("ran");
                Ok(())
            }));
        }
        configuration.add_host_configuration(Box::new(|_host| {
            Err(HostConfigurationError::UnsupportedMetadataBinding { binding: "ws-http" })
        }));
        {
            let log = Rc::clone(&log);
            configuration.add_host_configuration(Box::new(move |_host| {
                log.borrow_mut().push("after the failure");
                Ok(())
            }));
        }

        let mut host = TestHost::default();
        let err = configuration.configure_host(&mut host).unwrap_err();

        assert!(matches!(
            err,
            HostConfigurationError::UnsupportedMetadataBinding { .. }
        ));
        assert_eq!(*log.borrow(), ["ran"]);
    }

    #[test]
    fn reconfiguring_replays_endpoints_and_actions() {
        let mut configuration = make_configuration();
        configuration.add_endpoint::<TcpBinding>(
            contract(),
            TcpEndpointAddress::with_default_port("localhost", "orders"),
        );
        let runs = Rc::new(RefCell::new(0));
        {
            let runs = Rc::clone(&runs);
            configuration.add_host_configuration(Box::new(move |_host| {
                *runs.borrow_mut() += 1;
                Ok(())
            }));
        }

        let mut host = TestHost::default();
        configuration.configure_host(&mut host).unwrap();
        configuration.configure_host(&mut host).unwrap();

        assert_eq!(host.description.endpoints.len(), 2);
        assert_eq!(*runs.borrow(), 2);
    }

    #[test]
    fn registration_accepts_unusable_addresses() {
        let mut configuration = make_configuration();
        configuration
            .add_endpoint::<TcpBinding>(contract(), TcpEndpointAddress::new("bad host", "orders", 808));
        assert_eq!(configuration.endpoints().len(), 1);

        let mut host = TestHost::default();
        let err = configuration.configure_host(&mut host).unwrap_err();

        assert!(matches!(err, HostConfigurationError::EndpointAddress { .. }));
        assert!(host.description.endpoints.is_empty());
    }

    #[test]
    fn registry_handles_share_one_list() {
        let configuration = make_configuration();
        let handle = configuration.endpoints().clone();
        assert!(handle.is_empty());

        configuration.endpoints().register(EndpointDefinition {
            contract: contract(),
            binding: BindingConfig::from(TcpBinding::default()),
            address: EndpointAddress::from(TcpEndpointAddress::with_default_port("localhost", "orders")),
        });

        assert_eq!(handle.len(), 1);
        assert_eq!(handle.snapshot()[0].binding.name(), "tcp");
    }

    #[test]
    fn endpoints_realize_before_actions_run() {
        let seen = Rc::new(RefCell::new(0));
        let mut configuration = make_configuration();
        configuration.add_endpoint::<TcpBinding>(
            contract(),
            TcpEndpointAddress::with_default_port("localhost", "orders"),
        );
        {
            let seen = Rc::clone(&seen);
            configuration.add_host_configuration(Box::new(move |host| {
                *seen.borrow_mut() = host.description().endpoints.len();
                Ok(())
            }));
        }

        let mut host = TestHost::default();
        configuration.configure_host(&mut host).unwrap();

        assert_eq!(*seen.borrow(), 1);
    }
}
