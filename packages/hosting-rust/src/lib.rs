//! `Hostkit` Hosting -- deferred service host configuration.
//!
//! A [`ServiceHostConfiguration`] accumulates endpoint registrations and
//! queued host actions for one service type, then replays them against any
//! [`hostkit_core::ServiceHost`]. The [`ServiceHostConfigurator`] trait is
//! the registration surface; [`ServiceHostConfiguratorExt`] layers the
//! per-binding helpers, metadata publication, and behavior configuration on
//! top of it.

pub mod configuration;
pub mod configurator;
pub mod extensions;
pub mod logging;

pub use configuration::{
    EndpointDefinition, EndpointRegistry, HostConfiguration, HostConfigurationError,
    ServiceHostConfiguration,
};
pub use configurator::ServiceHostConfigurator;
pub use extensions::ServiceHostConfiguratorExt;
pub use logging::ExecutionLoggingBehavior;
