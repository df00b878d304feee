//! Peering Engine core
//!
//! Routing-policy resolution and template-filter evaluation for BGP peering
//! configuration rendering:
//! - Typed domain model for ASes, exchanges, connections and sessions
//! - IP family classification of sessions and connection-local addresses
//! - Import/export policy inheritance and ordered de-duplicated merging
//! - Session/connection query filters over a read-only snapshot
//! - An immutable filter registry callable from configuration templates
//!
//! The engine holds no persistent state. The external domain layer supplies a
//! consistent [`PeeringGraph`] snapshot per invocation and consumes plain data
//! back.

pub mod graph;
pub mod ip;
pub mod prefix_list;
pub mod registry;
pub mod route_policy;
pub mod secrets;
pub mod sessions;
pub mod text;
pub mod value;

pub use graph::*;
pub use ip::*;
pub use prefix_list::*;
pub use registry::*;
pub use route_policy::*;
pub use secrets::*;
pub use sessions::*;
pub use text::*;
pub use value::*;

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnetwork::IpNetwork;
use peering_common::IpFamily;
use serde::{Deserialize, Serialize};

/// Direction a routing policy applies to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PolicyDirection {
    Import,
    Export,
}

impl std::fmt::Display for PolicyDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PolicyDirection::Import => write!(f, "import"),
            PolicyDirection::Export => write!(f, "export"),
        }
    }
}

/// Free-form label attached to domain objects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn new(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }
}

/// Named, weighted route filter/transform applied on import or export
///
/// The slug is the unique stable key; merge results de-duplicate on it.
/// Lower weight means higher precedence when rendered into router
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoutingPolicy {
    pub name: String,
    pub slug: String,
    pub weight: u16,
    /// Restricts the policy to one family; `None` applies to both
    pub address_family: Option<IpFamily>,
}

impl RoutingPolicy {
    pub fn new(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            weight: 0,
            address_family: None,
        }
    }

    /// Can this policy appear on a session of `family`
    pub fn applies_to(&self, family: IpFamily) -> bool {
        match self.address_family {
            Some(restricted) => restricted == family,
            None => true,
        }
    }
}

/// Remote or local BGP routing domain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutonomousSystem {
    pub asn: u32,
    pub name: String,
    /// Operated by the local network (as opposed to a remote peer)
    pub affiliated: bool,
    /// Maximum accepted IPv4 prefixes, 0 when unset
    pub ipv4_max_prefixes: u32,
    /// Maximum accepted IPv6 prefixes, 0 when unset
    pub ipv6_max_prefixes: u32,
    pub import_policies: Vec<RoutingPolicy>,
    pub export_policies: Vec<RoutingPolicy>,
    /// Prefixes the AS is expected to originate, from an external IRR source
    pub prefixes: Vec<IpNetwork>,
    pub tags: Vec<Tag>,
}

impl AutonomousSystem {
    pub fn new(asn: u32, name: &str) -> Self {
        Self {
            asn,
            name: name.to_string(),
            affiliated: false,
            ipv4_max_prefixes: 0,
            ipv6_max_prefixes: 0,
            import_policies: Vec::new(),
            export_policies: Vec::new(),
            prefixes: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Configured max-prefix count for a family, 0 when unset
    pub fn max_prefixes(&self, family: IpFamily) -> u32 {
        match family {
            IpFamily::Ipv4 => self.ipv4_max_prefixes,
            IpFamily::Ipv6 => self.ipv6_max_prefixes,
        }
    }

    /// Policies assigned for a direction, in assignment order
    pub fn policies(&self, direction: PolicyDirection) -> &[RoutingPolicy] {
        match direction {
            PolicyDirection::Import => &self.import_policies,
            PolicyDirection::Export => &self.export_policies,
        }
    }
}

/// Grouping scope for direct sessions, carrying its own policies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BgpGroup {
    pub name: String,
    pub slug: String,
    pub import_policies: Vec<RoutingPolicy>,
    pub export_policies: Vec<RoutingPolicy>,
    pub tags: Vec<Tag>,
}

impl BgpGroup {
    pub fn new(name: &str, slug: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            import_policies: Vec::new(),
            export_policies: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Policies assigned for a direction, in assignment order
    pub fn policies(&self, direction: PolicyDirection) -> &[RoutingPolicy] {
        match direction {
            PolicyDirection::Import => &self.import_policies,
            PolicyDirection::Export => &self.export_policies,
        }
    }
}

/// Internet Exchange Point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InternetExchange {
    pub name: String,
    pub slug: String,
    /// ASN of the operator's own AS at this exchange
    pub local_autonomous_system: u32,
    pub import_policies: Vec<RoutingPolicy>,
    pub export_policies: Vec<RoutingPolicy>,
    pub tags: Vec<Tag>,
}

impl InternetExchange {
    pub fn new(name: &str, slug: &str, local_autonomous_system: u32) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            local_autonomous_system,
            import_policies: Vec::new(),
            export_policies: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Policies assigned for a direction, in assignment order
    pub fn policies(&self, direction: PolicyDirection) -> &[RoutingPolicy] {
        match direction {
            PolicyDirection::Import => &self.import_policies,
            PolicyDirection::Export => &self.export_policies,
        }
    }
}

/// Physical/VLAN attachment of a router to an exchange fabric
///
/// Carries zero, one or two addresses; a session's family decides which one
/// is its local counterpart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Connection {
    pub id: String,
    /// Slug of the owning exchange
    pub internet_exchange_point: String,
    /// Hostname of the terminating router
    pub router: Option<String>,
    pub vlan: Option<u16>,
    pub ipv4_address: Option<Ipv4Addr>,
    pub ipv6_address: Option<Ipv6Addr>,
}

impl Connection {
    pub fn new(id: &str, internet_exchange_point: &str) -> Self {
        Self {
            id: id.to_string(),
            internet_exchange_point: internet_exchange_point.to_string(),
            router: None,
            vlan: None,
            ipv4_address: None,
            ipv6_address: None,
        }
    }

    /// Local-operator address on this connection for a family
    pub fn local_address(&self, family: IpFamily) -> Option<IpAddr> {
        match family {
            IpFamily::Ipv4 => self.ipv4_address.map(IpAddr::V4),
            IpFamily::Ipv6 => self.ipv6_address.map(IpAddr::V6),
        }
    }
}

/// Device terminating connections and direct sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Router {
    pub name: String,
    pub hostname: String,
    pub tags: Vec<Tag>,
}

impl Router {
    pub fn new(name: &str, hostname: &str) -> Self {
        Self {
            name: name.to_string(),
            hostname: hostname.to_string(),
            tags: Vec::new(),
        }
    }
}

/// Bilateral BGP session outside any exchange fabric
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectPeeringSession {
    pub id: String,
    /// ASN of the remote peer
    pub autonomous_system: u32,
    /// Slug of the owning group, if any
    pub bgp_group: Option<String>,
    /// Hostname of the terminating router, if assigned
    pub router: Option<String>,
    pub ip_address: IpAddr,
    pub local_ip_address: Option<IpAddr>,
    pub password: Option<String>,
    pub import_policies: Vec<RoutingPolicy>,
    pub export_policies: Vec<RoutingPolicy>,
    pub tags: Vec<Tag>,
}

impl DirectPeeringSession {
    pub fn new(id: &str, autonomous_system: u32, ip_address: IpAddr) -> Self {
        Self {
            id: id.to_string(),
            autonomous_system,
            bgp_group: None,
            router: None,
            ip_address,
            local_ip_address: None,
            password: None,
            import_policies: Vec::new(),
            export_policies: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// BGP session reachable over an exchange connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InternetExchangePeeringSession {
    pub id: String,
    /// ASN of the remote peer
    pub autonomous_system: u32,
    /// Id of the connection the session runs over
    pub ixp_connection: String,
    pub ip_address: IpAddr,
    pub password: Option<String>,
    /// Peered with the exchange's route server rather than a direct peer
    pub is_route_server: bool,
    pub import_policies: Vec<RoutingPolicy>,
    pub export_policies: Vec<RoutingPolicy>,
    pub tags: Vec<Tag>,
}

impl InternetExchangePeeringSession {
    pub fn new(id: &str, autonomous_system: u32, ixp_connection: &str, ip_address: IpAddr) -> Self {
        Self {
            id: id.to_string(),
            autonomous_system,
            ixp_connection: ixp_connection.to_string(),
            ip_address,
            password: None,
            is_route_server: false,
            import_policies: Vec::new(),
            export_policies: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// Polymorphic view over the two session kinds
///
/// Engine operations that make sense for any BGP session take this instead
/// of inspecting concrete types.
#[derive(Debug, Clone, Copy)]
pub enum BgpSession<'a> {
    Direct(&'a DirectPeeringSession),
    InternetExchange(&'a InternetExchangePeeringSession),
}

impl<'a> BgpSession<'a> {
    /// Remote end address of the session
    pub fn ip_address(&self) -> IpAddr {
        match self {
            BgpSession::Direct(s) => s.ip_address,
            BgpSession::InternetExchange(s) => s.ip_address,
        }
    }

    /// Family of the session, decided by its address
    pub fn family(&self) -> IpFamily {
        IpFamily::of(self.ip_address())
    }

    /// ASN of the remote peer
    pub fn remote_asn(&self) -> u32 {
        match self {
            BgpSession::Direct(s) => s.autonomous_system,
            BgpSession::InternetExchange(s) => s.autonomous_system,
        }
    }

    /// Authentication secret, if configured
    pub fn password(&self) -> Option<&str> {
        match self {
            BgpSession::Direct(s) => s.password.as_deref(),
            BgpSession::InternetExchange(s) => s.password.as_deref(),
        }
    }

    /// True for sessions with an exchange route server
    pub fn is_route_server(&self) -> bool {
        match self {
            BgpSession::Direct(_) => false,
            BgpSession::InternetExchange(s) => s.is_route_server,
        }
    }

    /// Session-own policies for a direction, in assignment order
    pub fn policies(&self, direction: PolicyDirection) -> &'a [RoutingPolicy] {
        match (self, direction) {
            (BgpSession::Direct(s), PolicyDirection::Import) => &s.import_policies,
            (BgpSession::Direct(s), PolicyDirection::Export) => &s.export_policies,
            (BgpSession::InternetExchange(s), PolicyDirection::Import) => &s.import_policies,
            (BgpSession::InternetExchange(s), PolicyDirection::Export) => &s.export_policies,
        }
    }

    /// Tags on the session
    pub fn tags(&self) -> &'a [Tag] {
        match self {
            BgpSession::Direct(s) => &s.tags,
            BgpSession::InternetExchange(s) => &s.tags,
        }
    }
}
