//! Session and connection queries
//!
//! Selection operations over the snapshot, used by configuration templates
//! to pick the sessions and connections a rendered block covers. Results
//! keep registration order and are plain vectors the caller is free to
//! re-iterate.

use tracing::debug;

use peering_common::IpFamily;

use crate::{
    Connection, DirectPeeringSession, InternetExchange, InternetExchangePeeringSession,
    PeeringGraph, Router,
};

/// What a connection query is scoped to
#[derive(Debug, Clone, Copy)]
pub enum ConnectionScope<'a> {
    Router(&'a Router),
    InternetExchange(&'a InternetExchange),
}

/// All peering sessions over an exchange's connections
///
/// With a family, only sessions of that IP version are returned.
pub fn sessions<'a>(
    graph: &'a PeeringGraph,
    exchange: &InternetExchange,
    family: Option<IpFamily>,
) -> Vec<&'a InternetExchangePeeringSession> {
    let selected: Vec<_> = graph
        .ixp_sessions()
        .iter()
        .filter(|s| {
            graph
                .connection(&s.ixp_connection)
                .map(|c| c.internet_exchange_point == exchange.slug)
                .unwrap_or(false)
        })
        .filter(|s| family.map(|f| f.matches(s.ip_address)).unwrap_or(true))
        .collect();
    debug!(
        "{} sessions at {} (family {:?})",
        selected.len(),
        exchange.slug,
        family
    );
    selected
}

/// Route-server sessions at an exchange
pub fn route_server<'a>(
    graph: &'a PeeringGraph,
    exchange: &InternetExchange,
) -> Vec<&'a InternetExchangePeeringSession> {
    sessions(graph, exchange, None)
        .into_iter()
        .filter(|s| s.is_route_server)
        .collect()
}

/// Direct (non-IXP) sessions terminated at a router
pub fn direct_peers<'a>(
    graph: &'a PeeringGraph,
    router: &Router,
) -> Vec<&'a DirectPeeringSession> {
    graph
        .direct_sessions()
        .iter()
        .filter(|s| s.router.as_deref() == Some(router.hostname.as_str()))
        .collect()
}

/// IXP sessions reachable via any connection of a router
///
/// With an exchange slug, restricted to that exchange.
pub fn ixp_peers<'a>(
    graph: &'a PeeringGraph,
    router: &Router,
    ixp_slug: Option<&str>,
) -> Vec<&'a InternetExchangePeeringSession> {
    graph
        .ixp_sessions()
        .iter()
        .filter(|s| {
            graph
                .connection(&s.ixp_connection)
                .map(|c| {
                    c.router.as_deref() == Some(router.hostname.as_str())
                        && ixp_slug
                            .map(|slug| c.internet_exchange_point == slug)
                            .unwrap_or(true)
                })
                .unwrap_or(false)
        })
        .collect()
}

/// Connections of a router or exchange
pub fn connections<'a>(graph: &'a PeeringGraph, scope: ConnectionScope) -> Vec<&'a Connection> {
    graph
        .connections()
        .iter()
        .filter(|c| match scope {
            ConnectionScope::Router(router) => {
                c.router.as_deref() == Some(router.hostname.as_str())
            }
            ConnectionScope::InternetExchange(exchange) => {
                c.internet_exchange_point == exchange.slug
            }
        })
        .collect()
}
