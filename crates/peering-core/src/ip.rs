//! IP classification utilities
//!
//! Pure predicates and extractors over addresses, sessions and connections.
//! Classification predicates are total: malformed input classifies as false,
//! never as an error.

use std::net::IpAddr;

use peering_common::{IpFamily, PeeringError, PeeringResult};

use crate::{BgpSession, Connection, InternetExchange, PeeringGraph};

/// Is `value` an IPv4 address literal
pub fn is_ipv4(value: &str) -> bool {
    matches!(value.parse::<IpAddr>(), Ok(IpAddr::V4(_)))
}

/// Is `value` an IPv6 address literal
pub fn is_ipv6(value: &str) -> bool {
    matches!(value.parse::<IpAddr>(), Ok(IpAddr::V6(_)))
}

/// Family of an address literal.
///
/// Unlike the predicates this fails on unparsable input: it is meant for
/// stored session addresses, where a malformed value is a data-integrity
/// violation rather than an expected condition.
pub fn ip_version_of(value: &str) -> PeeringResult<IpFamily> {
    value
        .parse::<IpAddr>()
        .map(IpFamily::of)
        .map_err(|_| PeeringError::InvalidAddress(value.to_string()))
}

/// What local addresses are being asked for
///
/// The closed set of kinds `local_ips` accepts; anything else is a type
/// error at the registry boundary.
#[derive(Debug, Clone, Copy)]
pub enum LocalIpSource<'a> {
    Connection(&'a Connection),
    Session(BgpSession<'a>),
    InternetExchange(&'a InternetExchange),
}

/// Local addresses resolved for a [`LocalIpSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalIps {
    /// The single connection-local counterpart of a session
    Address(IpAddr),
    /// Connection addresses of an exchange, v4 then v6 per connection
    Addresses(Vec<IpAddr>),
}

/// Local-operator addresses for a connection, session or exchange.
///
/// - A session resolves to the address on its connection matching the
///   session's family (direct sessions carry their own local address);
///   `None` when absent.
/// - An exchange resolves to every address of every one of its connections,
///   flattened in connection order. Absent addresses are skipped.
/// - A bare connection resolves to `None`: without a session there is no
///   family to pick the local side by.
pub fn local_ips(graph: &PeeringGraph, source: LocalIpSource) -> Option<LocalIps> {
    match source {
        LocalIpSource::Connection(_) => None,
        LocalIpSource::Session(session) => session_local_ip(graph, session).map(LocalIps::Address),
        LocalIpSource::InternetExchange(exchange) => {
            Some(LocalIps::Addresses(exchange_local_ips(graph, exchange)))
        }
    }
}

/// Connection-local address of a session for the session's family
pub fn session_local_ip(graph: &PeeringGraph, session: BgpSession) -> Option<IpAddr> {
    match session {
        BgpSession::Direct(s) => s.local_ip_address,
        BgpSession::InternetExchange(s) => graph
            .connection(&s.ixp_connection)
            .and_then(|c| c.local_address(session.family())),
    }
}

/// All connection addresses of an exchange, flattened
pub fn exchange_local_ips(graph: &PeeringGraph, exchange: &InternetExchange) -> Vec<IpAddr> {
    let mut ips = Vec::new();
    for connection in graph.connections() {
        if connection.internet_exchange_point != exchange.slug {
            continue;
        }
        if let Some(v4) = connection.ipv4_address {
            ips.push(IpAddr::V4(v4));
        }
        if let Some(v6) = connection.ipv6_address {
            ips.push(IpAddr::V6(v6));
        }
    }
    ips
}

/// Remote AS max-prefix count for the session's family, 0 when unset
pub fn max_prefix_count(graph: &PeeringGraph, session: BgpSession) -> u32 {
    graph
        .autonomous_system(session.remote_asn())
        .map(|remote| remote.max_prefixes(session.family()))
        .unwrap_or(0)
}
