//! Typed endpoint addresses and their URI realization.
//!
//! Addresses are plain data and constructing one never fails. Rendering an
//! address into an `http::Uri` happens when endpoints are realized onto a
//! host, and that is the only fallible step: a bad host string surfaces at
//! realization, not at registration.

use std::borrow::Cow;
use std::fmt;

use http::Uri;

/// Default port for insecure HTTP endpoints.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Default port for secure HTTP endpoints.
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Default port for `net.tcp` endpoints.
pub const DEFAULT_TCP_PORT: u16 = 808;

/// Errors raised when converting between URIs and typed addresses.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("unsupported address scheme `{scheme}`")]
    UnsupportedScheme { scheme: String },
    #[error("address `{address}` has no host")]
    MissingHost { address: String },
    #[error("`{address}` is not a valid URI")]
    InvalidUri {
        address: String,
        #[source]
        source: http::uri::InvalidUri,
    },
}

// ---------------------------------------------------------------------------
// HttpEndpointAddress
// ---------------------------------------------------------------------------

/// Address of an HTTP endpoint: `http://host:port/path`, or `https://` when
/// the security flag is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEndpointAddress {
    /// Host name or IP literal, without brackets.
    pub host: String,
    /// Port the endpoint listens on.
    pub port: u16,
    /// Absolute path, always starting with `/`.
    pub path: String,
    /// Whether the endpoint uses HTTPS.
    pub secure: bool,
}

impl HttpEndpointAddress {
    /// Insecure HTTP address on an explicit port.
    #[must_use]
    pub fn new(host: impl Into<String>, path: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            path: normalize_path(&path.into()),
            secure: false,
        }
    }

    /// Secure HTTPS address on an explicit port.
    #[must_use]
    pub fn secure(host: impl Into<String>, path: impl Into<String>, port: u16) -> Self {
        Self {
            secure: true,
            ..Self::new(host, path, port)
        }
    }

    /// Insecure HTTP address on the default port 80.
    #[must_use]
    pub fn with_default_port(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(host, path, DEFAULT_HTTP_PORT)
    }

    /// Copy of this address with the security flag forced on.
    ///
    /// Only the scheme changes; host, port, and path are carried over as-is,
    /// including a port that was chosen for plain HTTP.
    #[must_use]
    pub fn secured(mut self) -> Self {
        self.secure = true;
        self
    }

    /// Address one path segment below this one.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self {
            path: join_segment(&self.path, segment),
            ..self.clone()
        }
    }
}

impl fmt::Display for HttpEndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.secure { "https" } else { "http" };
        write!(
            f,
            "{scheme}://{}:{}{}",
            authority_host(&self.host),
            self.port,
            self.path
        )
    }
}

impl TryFrom<Uri> for HttpEndpointAddress {
    type Error = AddressError;

    fn try_from(uri: Uri) -> Result<Self, Self::Error> {
        let secure = match uri.scheme_str() {
            Some("http") => false,
            Some("https") => true,
            other => {
                return Err(AddressError::UnsupportedScheme {
                    scheme: other.unwrap_or_default().to_string(),
                })
            }
        };
        let default_port = if secure {
            DEFAULT_HTTPS_PORT
        } else {
            DEFAULT_HTTP_PORT
        };
        Ok(Self {
            host: uri_host(&uri)?,
            port: uri.port_u16().unwrap_or(default_port),
            path: normalize_path(uri.path()),
            secure,
        })
    }
}

// ---------------------------------------------------------------------------
// TcpEndpointAddress
// ---------------------------------------------------------------------------

/// Address of a TCP endpoint: `net.tcp://host:port/path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpEndpointAddress {
    /// Host name or IP literal, without brackets.
    pub host: String,
    /// Port the endpoint listens on.
    pub port: u16,
    /// Absolute path, always starting with `/`.
    pub path: String,
}

impl TcpEndpointAddress {
    /// TCP address on an explicit port.
    #[must_use]
    pub fn new(host: impl Into<String>, path: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            path: normalize_path(&path.into()),
        }
    }

    /// TCP address on the default port 808.
    #[must_use]
    pub fn with_default_port(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(host, path, DEFAULT_TCP_PORT)
    }

    /// Address one path segment below this one.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self {
            path: join_segment(&self.path, segment),
            ..self.clone()
        }
    }
}

impl fmt::Display for TcpEndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "net.tcp://{}:{}{}",
            authority_host(&self.host),
            self.port,
            self.path
        )
    }
}

impl TryFrom<Uri> for TcpEndpointAddress {
    type Error = AddressError;

    fn try_from(uri: Uri) -> Result<Self, Self::Error> {
        if uri.scheme_str() != Some("net.tcp") {
            return Err(AddressError::UnsupportedScheme {
                scheme: uri.scheme_str().unwrap_or_default().to_string(),
            });
        }
        Ok(Self {
            host: uri_host(&uri)?,
            port: uri.port_u16().unwrap_or(DEFAULT_TCP_PORT),
            path: normalize_path(uri.path()),
        })
    }
}

// ---------------------------------------------------------------------------
// NamedPipeEndpointAddress
// ---------------------------------------------------------------------------

/// Address of a named pipe endpoint: `net.pipe://host/path`.
///
/// Pipes are machine-local, so the host is almost always `localhost` and
/// there is no port component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedPipeEndpointAddress {
    /// Host name, usually `localhost`.
    pub host: String,
    /// Pipe path, always starting with `/`.
    pub path: String,
}

impl NamedPipeEndpointAddress {
    /// Pipe address on an explicit host.
    #[must_use]
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: normalize_path(&path.into()),
        }
    }

    /// Pipe address on the local machine.
    #[must_use]
    pub fn local(path: impl Into<String>) -> Self {
        Self::new("localhost", path)
    }

    /// Address one path segment below this one.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self {
            path: join_segment(&self.path, segment),
            ..self.clone()
        }
    }
}

impl fmt::Display for NamedPipeEndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "net.pipe://{}{}", authority_host(&self.host), self.path)
    }
}

impl TryFrom<Uri> for NamedPipeEndpointAddress {
    type Error = AddressError;

    fn try_from(uri: Uri) -> Result<Self, Self::Error> {
        if uri.scheme_str() != Some("net.pipe") {
            return Err(AddressError::UnsupportedScheme {
                scheme: uri.scheme_str().unwrap_or_default().to_string(),
            });
        }
        Ok(Self {
            host: uri_host(&uri)?,
            path: normalize_path(uri.path()),
        })
    }
}

// ---------------------------------------------------------------------------
// EndpointAddress
// ---------------------------------------------------------------------------

/// Endpoint address across all supported transports.
///
/// This is the erased form endpoint definitions store. `Display` renders the
/// full URI string and [`EndpointAddress::uri`] parses it into an
/// `http::Uri` when the endpoint is realized onto a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointAddress {
    /// `http://` or `https://`.
    Http(HttpEndpointAddress),
    /// `net.tcp://`.
    Tcp(TcpEndpointAddress),
    /// `net.pipe://`.
    NamedPipe(NamedPipeEndpointAddress),
}

impl EndpointAddress {
    /// Address one path segment below this one, on the same transport.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        match self {
            Self::Http(address) => Self::Http(address.child(segment)),
            Self::Tcp(address) => Self::Tcp(address.child(segment)),
            Self::NamedPipe(address) => Self::NamedPipe(address.child(segment)),
        }
    }

    /// URI scheme this address renders with.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Http(address) if address.secure => "https",
            Self::Http(_) => "http",
            Self::Tcp(_) => "net.tcp",
            Self::NamedPipe(_) => "net.pipe",
        }
    }

    /// Realizes the address as an `http::Uri`.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::InvalidUri`] when the rendered address does
    /// not parse, e.g. when the host contains characters that are not valid
    /// in a URI authority.
    pub fn uri(&self) -> Result<Uri, AddressError> {
        let rendered = self.to_string();
        rendered
            .parse::<Uri>()
            .map_err(|source| AddressError::InvalidUri {
                address: rendered,
                source,
            })
    }
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(address) => address.fmt(f),
            Self::Tcp(address) => address.fmt(f),
            Self::NamedPipe(address) => address.fmt(f),
        }
    }
}

impl From<HttpEndpointAddress> for EndpointAddress {
    fn from(address: HttpEndpointAddress) -> Self {
        Self::Http(address)
    }
}

impl From<TcpEndpointAddress> for EndpointAddress {
    fn from(address: TcpEndpointAddress) -> Self {
        Self::Tcp(address)
    }
}

impl From<NamedPipeEndpointAddress> for EndpointAddress {
    fn from(address: NamedPipeEndpointAddress) -> Self {
        Self::NamedPipe(address)
    }
}

impl TryFrom<Uri> for EndpointAddress {
    type Error = AddressError;

    fn try_from(uri: Uri) -> Result<Self, Self::Error> {
        match uri.scheme_str() {
            Some("http" | "https") => HttpEndpointAddress::try_from(uri).map(Self::Http),
            Some("net.tcp") => TcpEndpointAddress::try_from(uri).map(Self::Tcp),
            Some("net.pipe") => NamedPipeEndpointAddress::try_from(uri).map(Self::NamedPipe),
            other => Err(AddressError::UnsupportedScheme {
                scheme: other.unwrap_or_default().to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Normalizes a path to `/a/b` form: leading slash added, trailing slash
/// trimmed, empty input becomes the root path.
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Appends one segment to an already normalized path.
fn join_segment(base: &str, segment: &str) -> String {
    let segment = segment.trim_matches('/');
    if base == "/" {
        format!("/{segment}")
    } else {
        format!("{base}/{segment}")
    }
}

/// Host as it appears in a URI authority: IPv6 literals get brackets.
fn authority_host(host: &str) -> Cow<'_, str> {
    if host.contains(':') && !host.starts_with('[') {
        Cow::Owned(format!("[{host}]"))
    } else {
        Cow::Borrowed(host)
    }
}

fn uri_host(uri: &Uri) -> Result<String, AddressError> {
    let host = uri.host().ok_or_else(|| AddressError::MissingHost {
        address: uri.to_string(),
    })?;
    Ok(host.trim_matches(|c| c == '[' || c == ']').to_string())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn http_address_renders_scheme_port_and_path() {
        let address = HttpEndpointAddress::new("localhost", "orders", 8080);
        assert_eq!(address.to_string(), "http://localhost:8080/orders");

        let secure = HttpEndpointAddress::secure("localhost", "orders", 8443);
        assert_eq!(secure.to_string(), "https://localhost:8443/orders");
    }

    #[test]
    fn http_default_port_is_80() {
        let address = HttpEndpointAddress::with_default_port("localhost", "orders");
        assert_eq!(address.port, DEFAULT_HTTP_PORT);
        assert!(!address.secure);
    }

    #[test]
    fn secured_flips_only_the_flag() {
        let address = HttpEndpointAddress::new("svc.internal", "orders/v2", 8080);
        let secured = address.clone().secured();
        assert!(secured.secure);
        assert_eq!(secured.host, address.host);
        assert_eq!(secured.port, address.port);
        assert_eq!(secured.path, address.path);
    }

    #[test]
    fn tcp_default_port_is_808() {
        let address = TcpEndpointAddress::with_default_port("localhost", "orders");
        assert_eq!(address.port, DEFAULT_TCP_PORT);
        assert_eq!(address.to_string(), "net.tcp://localhost:808/orders");
    }

    #[test]
    fn named_pipe_renders_without_port() {
        let address = NamedPipeEndpointAddress::local("orders");
        assert_eq!(address.to_string(), "net.pipe://localhost/orders");
    }

    #[test]
    fn paths_are_normalized_on_construction() {
        assert_eq!(TcpEndpointAddress::new("h", "svc/", 1).path, "/svc");
        assert_eq!(TcpEndpointAddress::new("h", "/svc", 1).path, "/svc");
        assert_eq!(TcpEndpointAddress::new("h", "", 1).path, "/");
        assert_eq!(TcpEndpointAddress::new("h", "a/b", 1).path, "/a/b");
    }

    #[test]
    fn child_appends_one_segment() {
        let base = NamedPipeEndpointAddress::local("test");
        assert_eq!(base.child("mex").path, "/test/mex");

        let root = NamedPipeEndpointAddress::local("");
        assert_eq!(root.child("mex").path, "/mex");
    }

    #[test]
    fn child_on_erased_address_keeps_the_transport() {
        let address = EndpointAddress::from(TcpEndpointAddress::with_default_port("h", "svc"));
        let child = address.child("mex");
        assert_eq!(child.scheme(), "net.tcp");
        assert_eq!(child.to_string(), "net.tcp://h:808/svc/mex");
    }

    #[test]
    fn uri_realization_round_trips_components() {
        let address = EndpointAddress::from(TcpEndpointAddress::new("localhost", "svc", 9000));
        let uri = address.uri().unwrap();
        assert_eq!(uri.scheme_str(), Some("net.tcp"));
        assert_eq!(uri.port_u16(), Some(9000));
        assert_eq!(uri.path(), "/svc");
    }

    #[test]
    fn uri_realization_rejects_invalid_host() {
        let address = EndpointAddress::from(TcpEndpointAddress::new("bad host", "svc", 808));
        let err = address.uri().unwrap_err();
        assert!(matches!(err, AddressError::InvalidUri { .. }));
    }

    #[test]
    fn ipv6_hosts_are_bracketed_in_the_authority() {
        let address = TcpEndpointAddress::new("::1", "svc", 808);
        assert_eq!(address.to_string(), "net.tcp://[::1]:808/svc");

        let uri = EndpointAddress::from(address.clone()).uri().unwrap();
        let back = TcpEndpointAddress::try_from(uri).unwrap();
        assert_eq!(back, address);
    }

    #[test]
    fn try_from_uri_dispatches_on_scheme() {
        let pipe: Uri = "net.pipe://localhost/test".parse().unwrap();
        let address = EndpointAddress::try_from(pipe).unwrap();
        assert_eq!(address.scheme(), "net.pipe");

        let https: Uri = "https://svc.internal/orders".parse().unwrap();
        let address = EndpointAddress::try_from(https).unwrap();
        match address {
            EndpointAddress::Http(http) => {
                assert!(http.secure);
                assert_eq!(http.port, DEFAULT_HTTPS_PORT);
            }
            other => panic!("expected an HTTP address, got {other:?}"),
        }
    }

    #[test]
    fn try_from_uri_rejects_unknown_schemes() {
        let uri: Uri = "ftp://localhost/file".parse().unwrap();
        let err = EndpointAddress::try_from(uri).unwrap_err();
        match err {
            AddressError::UnsupportedScheme { scheme } => assert_eq!(scheme, "ftp"),
            other => panic!("expected UnsupportedScheme, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn prop_tcp_addresses_round_trip_through_uris(
            host in "[a-z][a-z0-9-]{0,11}",
            port in 1u16..,
            path in "[a-z]{1,8}(/[a-z]{1,8}){0,2}",
        ) {
            let address = TcpEndpointAddress::new(host, path, port);
            let uri = address.to_string().parse::<Uri>().unwrap();
            let back = TcpEndpointAddress::try_from(uri).unwrap();
            prop_assert_eq!(back, address);
        }

        #[test]
        fn prop_http_addresses_round_trip_through_uris(
            host in "[a-z][a-z0-9-]{0,11}",
            port in 1u16..,
            path in "[a-z]{1,8}(/[a-z]{1,8}){0,2}",
            secure in any::<bool>(),
        ) {
            let mut address = HttpEndpointAddress::new(host, path, port);
            address.secure = secure;
            let uri = EndpointAddress::from(address.clone()).uri().unwrap();
            let back = HttpEndpointAddress::try_from(uri).unwrap();
            prop_assert_eq!(back, address);
        }

        #[test]
        fn prop_secured_preserves_host_port_and_path(
            host in "[a-z][a-z0-9-]{0,11}",
            port in 1u16..,
            path in "[a-z]{1,8}(/[a-z]{1,8}){0,2}",
        ) {
            let address = HttpEndpointAddress::new(host, path, port);
            let secured = address.clone().secured();
            prop_assert!(secured.secure);
            prop_assert_eq!(secured.host, address.host);
            prop_assert_eq!(secured.port, address.port);
            prop_assert_eq!(secured.path, address.path);
        }
    }
}
