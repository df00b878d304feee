//! Routing-policy resolution
//!
//! Computes the effective import/export policy chain of a session. Policies
//! inherit across scopes: the session's own assignments come first, then the
//! remote AS's, then the surrounding scope's (the exchange for IXP sessions,
//! the BGP group for grouped direct sessions). The merge is a stable ordered
//! union keyed by slug: the first occurrence wins, so a slug assigned at a
//! more specific scope shadows the same slug further out. Policies whose
//! address family conflicts with the session's are removed at every scope
//! before merging.

use std::collections::HashSet;

use peering_common::IpFamily;
use tracing::debug;

use crate::{BgpSession, PeeringGraph, PolicyDirection, RoutingPolicy};

/// Session-own import policies, assignment order, family filtered
pub fn iter_import_policies<'a>(session: BgpSession<'a>) -> Vec<&'a RoutingPolicy> {
    iter_policies(session, PolicyDirection::Import)
}

/// Session-own export policies, assignment order, family filtered
pub fn iter_export_policies<'a>(session: BgpSession<'a>) -> Vec<&'a RoutingPolicy> {
    iter_policies(session, PolicyDirection::Export)
}

/// Session-own policies for a direction
pub fn iter_policies<'a>(
    session: BgpSession<'a>,
    direction: PolicyDirection,
) -> Vec<&'a RoutingPolicy> {
    let family = session.family();
    session
        .policies(direction)
        .iter()
        .filter(|p| p.applies_to(family))
        .collect()
}

/// Effective import policy chain for a session
pub fn merge_import_policies<'a>(
    graph: &'a PeeringGraph,
    session: BgpSession<'a>,
) -> Vec<&'a RoutingPolicy> {
    merge_policies(graph, session, PolicyDirection::Import)
}

/// Effective export policy chain for a session
pub fn merge_export_policies<'a>(
    graph: &'a PeeringGraph,
    session: BgpSession<'a>,
) -> Vec<&'a RoutingPolicy> {
    merge_policies(graph, session, PolicyDirection::Export)
}

/// Ordered, slug-de-duplicated union of session, AS and scope policies
pub fn merge_policies<'a>(
    graph: &'a PeeringGraph,
    session: BgpSession<'a>,
    direction: PolicyDirection,
) -> Vec<&'a RoutingPolicy> {
    let family = session.family();
    let mut merged: Vec<&RoutingPolicy> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    append_unique(&mut merged, &mut seen, session.policies(direction), family);

    if let Some(remote) = graph.autonomous_system(session.remote_asn()) {
        append_unique(&mut merged, &mut seen, remote.policies(direction), family);
    }

    match session {
        BgpSession::InternetExchange(s) => {
            if let Some(exchange) = graph.session_exchange(s) {
                append_unique(&mut merged, &mut seen, exchange.policies(direction), family);
            }
        }
        BgpSession::Direct(s) => {
            if let Some(group) = s.bgp_group.as_deref().and_then(|g| graph.bgp_group(g)) {
                append_unique(&mut merged, &mut seen, group.policies(direction), family);
            }
        }
    }

    debug!(
        "merged {} {} policies for session with AS{}",
        merged.len(),
        direction,
        session.remote_asn()
    );
    merged
}

fn append_unique<'a>(
    merged: &mut Vec<&'a RoutingPolicy>,
    seen: &mut HashSet<&'a str>,
    policies: &'a [RoutingPolicy],
    family: IpFamily,
) {
    for policy in policies {
        if policy.applies_to(family) && seen.insert(policy.slug.as_str()) {
            merged.push(policy);
        }
    }
}
