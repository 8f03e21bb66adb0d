//! Transport binding configurations.
//!
//! A binding describes how an endpoint communicates: message limits,
//! timeouts, and security expectations. Bindings carry configuration only;
//! the transports themselves live in the hosting runtime.

use std::time::Duration;

use crate::address::{
    EndpointAddress, HttpEndpointAddress, NamedPipeEndpointAddress, TcpEndpointAddress,
};

/// Security mode for the stream transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSecurity {
    /// No transport protection.
    None,
    /// Transport-level protection negotiated by the runtime.
    Transport,
}

// ---------------------------------------------------------------------------
// NamedPipeBinding
// ---------------------------------------------------------------------------

/// Binding for machine-local named pipe endpoints (`net.pipe://`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPipeBinding {
    /// Maximum size of a received message in bytes.
    pub max_message_bytes: usize,
    /// Maximum time to wait for a connection to open.
    pub open_timeout: Duration,
    /// Maximum time to wait for a send to complete.
    pub send_timeout: Duration,
    /// Maximum idle time before an established connection is dropped.
    pub receive_timeout: Duration,
    /// Transport security mode.
    pub security: TransportSecurity,
}

impl Default for NamedPipeBinding {
    fn default() -> Self {
        Self {
            max_message_bytes: 65_536, // 64 KB
            open_timeout: Duration::from_secs(60),
            send_timeout: Duration::from_secs(60),
            receive_timeout: Duration::from_secs(600),
            security: TransportSecurity::Transport,
        }
    }
}

impl NamedPipeBinding {
    /// Variant used for derived metadata exchange endpoints: default
    /// transport settings with security disabled.
    #[must_use]
    pub fn metadata_exchange() -> Self {
        Self {
            security: TransportSecurity::None,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// TcpBinding
// ---------------------------------------------------------------------------

/// Binding for TCP endpoints (`net.tcp://`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpBinding {
    /// Maximum size of a received message in bytes.
    pub max_message_bytes: usize,
    /// Maximum time to wait for a connection to open.
    pub open_timeout: Duration,
    /// Maximum time to wait for a send to complete.
    pub send_timeout: Duration,
    /// Maximum idle time before an established connection is dropped.
    pub receive_timeout: Duration,
    /// Transport security mode.
    pub security: TransportSecurity,
    /// Whether several hosts may share the listening port.
    pub port_sharing_enabled: bool,
}

impl Default for TcpBinding {
    fn default() -> Self {
        Self {
            max_message_bytes: 65_536, // 64 KB
            open_timeout: Duration::from_secs(60),
            send_timeout: Duration::from_secs(60),
            receive_timeout: Duration::from_secs(600),
            security: TransportSecurity::Transport,
            port_sharing_enabled: false,
        }
    }
}

impl TcpBinding {
    /// Variant used for derived metadata exchange endpoints: default
    /// transport settings with security disabled.
    #[must_use]
    pub fn metadata_exchange() -> Self {
        Self {
            security: TransportSecurity::None,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// BasicHttpBinding
// ---------------------------------------------------------------------------

/// Binding for plain HTTP endpoints, interoperable with simple SOAP/HTTP
/// clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicHttpBinding {
    /// Maximum size of a received message in bytes.
    pub max_message_bytes: usize,
    /// Maximum time to wait for a connection to open.
    pub open_timeout: Duration,
    /// Maximum time to wait for a send to complete.
    pub send_timeout: Duration,
    /// Maximum idle time before an established connection is dropped.
    pub receive_timeout: Duration,
    /// Whether cookies are accepted and carried between requests.
    pub allow_cookies: bool,
}

impl Default for BasicHttpBinding {
    fn default() -> Self {
        Self {
            max_message_bytes: 65_536, // 64 KB
            open_timeout: Duration::from_secs(60),
            send_timeout: Duration::from_secs(60),
            receive_timeout: Duration::from_secs(600),
            allow_cookies: false,
        }
    }
}

// ---------------------------------------------------------------------------
// WsHttpBinding
// ---------------------------------------------------------------------------

/// Binding for WS-* HTTP endpoints with richer protocol features than
/// [`BasicHttpBinding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsHttpBinding {
    /// Maximum size of a received message in bytes.
    pub max_message_bytes: usize,
    /// Maximum time to wait for a connection to open.
    pub open_timeout: Duration,
    /// Maximum time to wait for a send to complete.
    pub send_timeout: Duration,
    /// Maximum idle time before an established connection is dropped.
    pub receive_timeout: Duration,
    /// Whether the session layer acknowledges, retries, and reorders
    /// messages.
    pub reliable_session: bool,
}

impl Default for WsHttpBinding {
    fn default() -> Self {
        Self {
            max_message_bytes: 65_536, // 64 KB
            open_timeout: Duration::from_secs(60),
            send_timeout: Duration::from_secs(60),
            receive_timeout: Duration::from_secs(600),
            reliable_session: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Binding trait and BindingConfig
// ---------------------------------------------------------------------------

/// A transport binding family.
///
/// Ties a binding configuration to the address family its endpoints use, so
/// pairings are checked at compile time: a TCP binding cannot be registered
/// on a pipe address.
pub trait Binding: Default + Into<BindingConfig> {
    /// Address family endpoints of this binding use.
    type Address: Into<EndpointAddress>;
}

impl Binding for NamedPipeBinding {
    type Address = NamedPipeEndpointAddress;
}

impl Binding for TcpBinding {
    type Address = TcpEndpointAddress;
}

impl Binding for BasicHttpBinding {
    type Address = HttpEndpointAddress;
}

impl Binding for WsHttpBinding {
    type Address = HttpEndpointAddress;
}

/// Configured binding of a registered or realized endpoint.
///
/// This is the erased form endpoint definitions store; binding-specific
/// handling matches on the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingConfig {
    NamedPipe(NamedPipeBinding),
    Tcp(TcpBinding),
    BasicHttp(BasicHttpBinding),
    WsHttp(WsHttpBinding),
}

impl BindingConfig {
    /// Short name of the binding family, for logs and error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::NamedPipe(_) => "named-pipe",
            Self::Tcp(_) => "tcp",
            Self::BasicHttp(_) => "basic-http",
            Self::WsHttp(_) => "ws-http",
        }
    }

    /// URI scheme endpoints of this binding family use.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::NamedPipe(_) => "net.pipe",
            Self::Tcp(_) => "net.tcp",
            Self::BasicHttp(_) | Self::WsHttp(_) => "http",
        }
    }
}

impl From<NamedPipeBinding> for BindingConfig {
    fn from(binding: NamedPipeBinding) -> Self {
        Self::NamedPipe(binding)
    }
}

impl From<TcpBinding> for BindingConfig {
    fn from(binding: TcpBinding) -> Self {
        Self::Tcp(binding)
    }
}

impl From<BasicHttpBinding> for BindingConfig {
    fn from(binding: BasicHttpBinding) -> Self {
        Self::BasicHttp(binding)
    }
}

impl From<WsHttpBinding> for BindingConfig {
    fn from(binding: WsHttpBinding) -> Self {
        Self::WsHttp(binding)
    }
}
