//! `Hostkit` Core -- service descriptions, transport bindings, endpoint
//! addresses, and host behaviors.
//!
//! This crate is the object model a hosting runtime consumes. It contains
//! no runtime of its own: the configuration layer in `hostkit-hosting`
//! builds these values, and an external runtime turns them into listeners.

pub mod address;
pub mod behavior;
pub mod binding;
pub mod contract;
pub mod description;

pub use address::{
    AddressError, EndpointAddress, HttpEndpointAddress, NamedPipeEndpointAddress,
    TcpEndpointAddress,
};
pub use behavior::{
    AddressFilterMode, BehaviorCollection, ConcurrencyMode, HostBehavior, MetadataBehavior,
    ServiceBehavior,
};
pub use binding::{
    BasicHttpBinding, Binding, BindingConfig, NamedPipeBinding, TcpBinding, TransportSecurity,
    WsHttpBinding,
};
pub use contract::{ContractDescriptor, MetadataExchange};
pub use description::{ServiceDescription, ServiceEndpoint, ServiceHost};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
