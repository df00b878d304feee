//! Prefix lists
//!
//! The prefixes an AS is expected to originate come from an external IRR
//! source and are stored on the snapshot; this is a thin pass-through for
//! configuration rendering.

use ipnetwork::IpNetwork;
use peering_common::IpFamily;

use crate::PeeringGraph;

/// Prefixes originated by an AS, optionally for one family
///
/// Empty for an unknown AS or an AS with no prefix data.
pub fn prefix_list(graph: &PeeringGraph, asn: u32, family: Option<IpFamily>) -> Vec<IpNetwork> {
    let Some(autonomous_system) = graph.autonomous_system(asn) else {
        return Vec::new();
    };
    autonomous_system
        .prefixes
        .iter()
        .filter(|prefix| match family {
            Some(IpFamily::Ipv4) => matches!(prefix, IpNetwork::V4(_)),
            Some(IpFamily::Ipv6) => matches!(prefix, IpNetwork::V6(_)),
            None => true,
        })
        .copied()
        .collect()
}
