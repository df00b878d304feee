//! Filter registry
//!
//! The named operations a configuration template can call. The registry is
//! built once, holds plain function pointers and is never mutated, so a
//! single instance can be shared by reference across rendering threads.
//! Each invocation receives the snapshot through a [`FilterContext`];
//! filters keep no state of their own.

use std::collections::BTreeMap;
use std::net::IpAddr;

use tracing::debug;

use peering_common::{IpFamily, PeeringError, PeeringResult};

use crate::{
    cisco_type7_encrypt, connections, direct_peers, ip, iter_export_policies,
    iter_import_policies, ixp_peers, length, merge_export_policies, merge_import_policies,
    prefix_list, route_server, safe_string, sessions, AutonomousSystem, BgpSession,
    ConnectionScope, InternetExchange, Lookup, PeeringGraph, Router, Value,
};

/// Positional or keyword argument of a template filter call
#[derive(Debug, Clone)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Value,
}

impl Arg {
    /// A bare positional argument
    pub fn positional(value: Value) -> Self {
        Self { name: None, value }
    }

    /// A keyword argument
    pub fn named(name: &str, value: Value) -> Self {
        Self {
            name: Some(name.to_string()),
            value,
        }
    }
}

/// Per-invocation state handed to every filter
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    graph: &'a PeeringGraph,
}

impl<'a> FilterContext<'a> {
    /// Wrap the snapshot for one rendering pass
    pub fn new(graph: &'a PeeringGraph) -> Self {
        Self { graph }
    }

    /// The snapshot being rendered from
    pub fn graph(&self) -> &'a PeeringGraph {
        self.graph
    }
}

/// Signature shared by every registered filter
pub type FilterFn = fn(&FilterContext, &Value, &[Arg]) -> PeeringResult<Value>;

/// Immutable name-to-filter mapping for the template renderer
///
/// Constructed explicitly and passed by reference to the rendering
/// subsystem; there is no ambient global lookup.
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    entries: BTreeMap<&'static str, FilterFn>,
}

impl FilterRegistry {
    /// Build the standard filter set
    pub fn new() -> Self {
        let mut entries: BTreeMap<&'static str, FilterFn> = BTreeMap::new();
        for (name, filter) in [
            ("ipv4", filter_ipv4 as FilterFn),
            ("ipv6", filter_ipv6),
            ("ip_version", filter_ip_version),
            ("local_ips", filter_local_ips),
            ("max_prefix", filter_max_prefix),
            ("filter", filter_filter),
            ("length", filter_length),
            ("iterate", filter_iterate),
            ("iter_export_policies", filter_iter_export_policies),
            ("iter_import_policies", filter_iter_import_policies),
            ("merge_export_policies", filter_merge_export_policies),
            ("merge_import_policies", filter_merge_import_policies),
            ("sessions", filter_sessions),
            ("route_server", filter_route_server),
            ("direct_peers", filter_direct_peers),
            ("ixp_peers", filter_ixp_peers),
            ("connections", filter_connections),
            ("prefix_list", filter_prefix_list),
            ("safe_string", filter_safe_string),
            ("cisco_password", filter_cisco_password),
            ("tags", filter_tags),
        ] {
            entries.insert(name, filter);
        }
        Self { entries }
    }

    /// Look a filter up by name
    pub fn get(&self, name: &str) -> PeeringResult<FilterFn> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| PeeringError::UnknownFilter(name.to_string()))
    }

    /// Registered names, in stable order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Number of registered filters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no filters are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invoke a filter the way a template does: subject first, then args
    pub fn apply(
        &self,
        ctx: &FilterContext,
        name: &str,
        subject: &Value,
        args: &[Arg],
    ) -> PeeringResult<Value> {
        debug!("applying filter {} to {}", name, subject.kind());
        (self.get(name)?)(ctx, subject, args)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Family argument of a query filter, resolved permissively
enum FamilyArg {
    /// No family given: no filtering
    Unspecified,
    /// A supported family
    Family(IpFamily),
    /// An unsupported value: matches nothing
    NoMatch,
}

fn family_arg(args: &[Arg]) -> FamilyArg {
    match lookup_arg(args, "family") {
        None => FamilyArg::Unspecified,
        Some(Value::Int(v)) => match IpFamily::from_value(*v) {
            Some(family) => FamilyArg::Family(family),
            None => FamilyArg::NoMatch,
        },
        Some(_) => FamilyArg::NoMatch,
    }
}

/// First argument named `name`, or the first positional one
fn lookup_arg<'a>(args: &'a [Arg], name: &str) -> Option<&'a Value> {
    args.iter()
        .find(|a| a.name.as_deref() == Some(name))
        .or_else(|| args.iter().find(|a| a.name.is_none()))
        .map(|a| &a.value)
}

fn subject_session<'v>(
    filter: &'static str,
    subject: &'v Value,
) -> PeeringResult<BgpSession<'v>> {
    subject.as_session().ok_or(PeeringError::InvalidSubject {
        filter,
        subject: subject.kind(),
    })
}

fn subject_exchange<'v>(
    filter: &'static str,
    subject: &'v Value,
) -> PeeringResult<&'v InternetExchange> {
    match subject {
        Value::InternetExchange(exchange) => Ok(exchange),
        other => Err(PeeringError::InvalidSubject {
            filter,
            subject: other.kind(),
        }),
    }
}

fn subject_router<'v>(filter: &'static str, subject: &'v Value) -> PeeringResult<&'v Router> {
    match subject {
        Value::Router(router) => Ok(router),
        other => Err(PeeringError::InvalidSubject {
            filter,
            subject: other.kind(),
        }),
    }
}

fn subject_autonomous_system<'v>(
    filter: &'static str,
    subject: &'v Value,
) -> PeeringResult<&'v AutonomousSystem> {
    match subject {
        Value::AutonomousSystem(autonomous_system) => Ok(autonomous_system),
        other => Err(PeeringError::InvalidSubject {
            filter,
            subject: other.kind(),
        }),
    }
}

fn policy_values(policies: Vec<&crate::RoutingPolicy>) -> Value {
    Value::List(policies.into_iter().cloned().map(Value::Policy).collect())
}

fn filter_ipv4(_ctx: &FilterContext, subject: &Value, _args: &[Arg]) -> PeeringResult<Value> {
    let is_v4 = match subject {
        Value::Str(s) => ip::is_ipv4(s),
        Value::Ip(addr) => matches!(addr, IpAddr::V4(_)),
        _ => false,
    };
    Ok(Value::Bool(is_v4))
}

fn filter_ipv6(_ctx: &FilterContext, subject: &Value, _args: &[Arg]) -> PeeringResult<Value> {
    let is_v6 = match subject {
        Value::Str(s) => ip::is_ipv6(s),
        Value::Ip(addr) => matches!(addr, IpAddr::V6(_)),
        _ => false,
    };
    Ok(Value::Bool(is_v6))
}

fn filter_ip_version(_ctx: &FilterContext, subject: &Value, _args: &[Arg]) -> PeeringResult<Value> {
    let family = match subject {
        Value::Ip(addr) => IpFamily::of(*addr),
        Value::Str(s) => ip::ip_version_of(s)?,
        other => match other.as_session() {
            Some(session) => session.family(),
            None => {
                return Err(PeeringError::InvalidSubject {
                    filter: "ip_version",
                    subject: other.kind(),
                })
            }
        },
    };
    Ok(Value::Int(i64::from(family.value())))
}

fn filter_local_ips(ctx: &FilterContext, subject: &Value, _args: &[Arg]) -> PeeringResult<Value> {
    let source = match subject {
        Value::Connection(connection) => ip::LocalIpSource::Connection(connection),
        Value::InternetExchange(exchange) => ip::LocalIpSource::InternetExchange(exchange),
        other => match other.as_session() {
            Some(session) => ip::LocalIpSource::Session(session),
            None => {
                return Err(PeeringError::InvalidSubject {
                    filter: "local_ips",
                    subject: other.kind(),
                })
            }
        },
    };
    Ok(match ip::local_ips(ctx.graph(), source) {
        None => Value::None,
        Some(ip::LocalIps::Address(addr)) => Value::Ip(addr),
        Some(ip::LocalIps::Addresses(addrs)) => {
            Value::List(addrs.into_iter().map(Value::Ip).collect())
        }
    })
}

fn filter_max_prefix(ctx: &FilterContext, subject: &Value, _args: &[Arg]) -> PeeringResult<Value> {
    let session = subject_session("max_prefix", subject)?;
    Ok(Value::Int(i64::from(ip::max_prefix_count(
        ctx.graph(),
        session,
    ))))
}

fn filter_filter(_ctx: &FilterContext, subject: &Value, args: &[Arg]) -> PeeringResult<Value> {
    let items = match subject {
        Value::List(items) => items,
        other => {
            return Err(PeeringError::InvalidSubject {
                filter: "filter",
                subject: other.kind(),
            })
        }
    };
    let mut lookups = Vec::with_capacity(args.len());
    for arg in args {
        let name = arg.name.as_deref().ok_or(PeeringError::InvalidArgument {
            filter: "filter",
            reason: "field lookups must be keyword arguments".to_string(),
        })?;
        lookups.push(Lookup::parse(name, arg.value.clone()));
    }
    crate::filter(items, &lookups).map(Value::List)
}

fn filter_length(_ctx: &FilterContext, subject: &Value, _args: &[Arg]) -> PeeringResult<Value> {
    length(subject).map(Value::from)
}

fn filter_iterate(_ctx: &FilterContext, subject: &Value, args: &[Arg]) -> PeeringResult<Value> {
    let items = match subject {
        Value::List(items) => items,
        other => {
            return Err(PeeringError::InvalidSubject {
                filter: "iterate",
                subject: other.kind(),
            })
        }
    };
    let attribute = match lookup_arg(args, "attribute") {
        Some(Value::Str(name)) => name.as_str(),
        _ => {
            return Err(PeeringError::InvalidArgument {
                filter: "iterate",
                reason: "an attribute name is required".to_string(),
            })
        }
    };
    crate::iterate(items, attribute)
        .collect::<PeeringResult<Vec<Value>>>()
        .map(Value::List)
}

fn filter_iter_export_policies(
    _ctx: &FilterContext,
    subject: &Value,
    _args: &[Arg],
) -> PeeringResult<Value> {
    let session = subject_session("iter_export_policies", subject)?;
    Ok(policy_values(iter_export_policies(session)))
}

fn filter_iter_import_policies(
    _ctx: &FilterContext,
    subject: &Value,
    _args: &[Arg],
) -> PeeringResult<Value> {
    let session = subject_session("iter_import_policies", subject)?;
    Ok(policy_values(iter_import_policies(session)))
}

fn filter_merge_export_policies(
    ctx: &FilterContext,
    subject: &Value,
    _args: &[Arg],
) -> PeeringResult<Value> {
    let session = subject_session("merge_export_policies", subject)?;
    Ok(policy_values(merge_export_policies(ctx.graph(), session)))
}

fn filter_merge_import_policies(
    ctx: &FilterContext,
    subject: &Value,
    _args: &[Arg],
) -> PeeringResult<Value> {
    let session = subject_session("merge_import_policies", subject)?;
    Ok(policy_values(merge_import_policies(ctx.graph(), session)))
}

fn filter_sessions(ctx: &FilterContext, subject: &Value, args: &[Arg]) -> PeeringResult<Value> {
    let exchange = subject_exchange("sessions", subject)?;
    let selected = match family_arg(args) {
        FamilyArg::Unspecified => sessions(ctx.graph(), exchange, None),
        FamilyArg::Family(family) => sessions(ctx.graph(), exchange, Some(family)),
        FamilyArg::NoMatch => Vec::new(),
    };
    Ok(Value::List(
        selected
            .into_iter()
            .cloned()
            .map(Value::IxpSession)
            .collect(),
    ))
}

fn filter_route_server(ctx: &FilterContext, subject: &Value, _args: &[Arg]) -> PeeringResult<Value> {
    let exchange = subject_exchange("route_server", subject)?;
    Ok(Value::List(
        route_server(ctx.graph(), exchange)
            .into_iter()
            .cloned()
            .map(Value::IxpSession)
            .collect(),
    ))
}

fn filter_direct_peers(ctx: &FilterContext, subject: &Value, _args: &[Arg]) -> PeeringResult<Value> {
    let router = subject_router("direct_peers", subject)?;
    Ok(Value::List(
        direct_peers(ctx.graph(), router)
            .into_iter()
            .cloned()
            .map(Value::DirectSession)
            .collect(),
    ))
}

fn filter_ixp_peers(ctx: &FilterContext, subject: &Value, args: &[Arg]) -> PeeringResult<Value> {
    let router = subject_router("ixp_peers", subject)?;
    let ixp_slug = match lookup_arg(args, "ixp") {
        Some(Value::Str(slug)) => Some(slug.as_str()),
        _ => None,
    };
    Ok(Value::List(
        ixp_peers(ctx.graph(), router, ixp_slug)
            .into_iter()
            .cloned()
            .map(Value::IxpSession)
            .collect(),
    ))
}

fn filter_connections(ctx: &FilterContext, subject: &Value, _args: &[Arg]) -> PeeringResult<Value> {
    let scope = match subject {
        Value::Router(router) => ConnectionScope::Router(router),
        Value::InternetExchange(exchange) => ConnectionScope::InternetExchange(exchange),
        other => {
            return Err(PeeringError::InvalidSubject {
                filter: "connections",
                subject: other.kind(),
            })
        }
    };
    Ok(Value::List(
        connections(ctx.graph(), scope)
            .into_iter()
            .cloned()
            .map(Value::Connection)
            .collect(),
    ))
}

fn filter_prefix_list(ctx: &FilterContext, subject: &Value, args: &[Arg]) -> PeeringResult<Value> {
    let autonomous_system = subject_autonomous_system("prefix_list", subject)?;
    let prefixes = match family_arg(args) {
        FamilyArg::Unspecified => prefix_list(ctx.graph(), autonomous_system.asn, None),
        FamilyArg::Family(family) => {
            prefix_list(ctx.graph(), autonomous_system.asn, Some(family))
        }
        FamilyArg::NoMatch => Vec::new(),
    };
    Ok(Value::List(prefixes.into_iter().map(Value::Prefix).collect()))
}

fn filter_safe_string(_ctx: &FilterContext, subject: &Value, _args: &[Arg]) -> PeeringResult<Value> {
    match subject {
        Value::Str(text) => Ok(Value::Str(safe_string(text))),
        other => Err(PeeringError::InvalidSubject {
            filter: "safe_string",
            subject: other.kind(),
        }),
    }
}

fn filter_cisco_password(
    _ctx: &FilterContext,
    subject: &Value,
    args: &[Arg],
) -> PeeringResult<Value> {
    let secret = match subject {
        // Sessions without a secret render nothing rather than failing.
        Value::None => return Ok(Value::None),
        Value::Str(secret) => secret,
        other => {
            return Err(PeeringError::InvalidSubject {
                filter: "cisco_password",
                subject: other.kind(),
            })
        }
    };
    let seed = match lookup_arg(args, "seed") {
        None => 0,
        Some(Value::Int(v)) if *v >= 0 => *v as usize,
        Some(other) => {
            return Err(PeeringError::InvalidArgument {
                filter: "cisco_password",
                reason: format!("seed must be a non-negative integer, got {}", other.kind()),
            })
        }
    };
    cisco_type7_encrypt(secret, seed).map(Value::Str)
}

fn filter_tags(_ctx: &FilterContext, subject: &Value, _args: &[Arg]) -> PeeringResult<Value> {
    match subject.entity_tags() {
        Some(tags) => Ok(Value::List(
            tags.iter().cloned().map(Value::Tag).collect(),
        )),
        None => Err(PeeringError::InvalidSubject {
            filter: "tags",
            subject: subject.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cisco_type7_decrypt, Connection, DirectPeeringSession, InternetExchangePeeringSession,
        RoutingPolicy, Tag,
    };

    fn routing_policy(name: &str, slug: &str, weight: u16) -> RoutingPolicy {
        let mut policy = RoutingPolicy::new(name, slug);
        policy.weight = weight;
        policy
    }

    fn family_policy(name: &str, slug: &str, family: IpFamily) -> RoutingPolicy {
        let mut policy = RoutingPolicy::new(name, slug);
        policy.address_family = Some(family);
        policy
    }

    /// Snapshot mirroring a small production setup: one affiliated AS
    /// operating an exchange with a dual-stack connection, one remote AS
    /// with four sessions (two of them route-server sessions).
    fn fixture() -> PeeringGraph {
        let mut graph = PeeringGraph::new();

        graph.add_autonomous_system(AutonomousSystem::new(64520, "Useless"));

        let mut remote = AutonomousSystem::new(64510, "Test");
        remote.ipv6_max_prefixes = 100;
        remote.import_policies = vec![routing_policy(
            "Import Known Prefixes",
            "import-known-prefixes",
            128,
        )];
        remote.export_policies = vec![
            routing_policy("Export Supernets", "export-supernets", 64),
            family_policy("Export Deaggregated v4", "export-deaggregated-v4", IpFamily::Ipv4),
            family_policy("Export Deaggregated v6", "export-deaggregated-v6", IpFamily::Ipv6),
        ];
        remote.prefixes = vec![
            "203.0.113.0/24".parse().unwrap(),
            "2001:db8:beef::/48".parse().unwrap(),
        ];
        remote.tags = vec![
            Tag::new("Tag 1", "tag-1"),
            Tag::new("Tag 2", "tag-2"),
            Tag::new("Tag 3", "tag-3"),
        ];
        graph.add_autonomous_system(remote);

        let mut local = AutonomousSystem::new(64500, "Autonomous System");
        local.affiliated = true;
        graph.add_autonomous_system(local);

        graph.add_router(Router::new("test", "test.example.com"));

        let mut exchange = InternetExchange::new("Test IXP", "test-ixp", 64500);
        exchange.import_policies = vec![routing_policy("Reject All", "reject-all", 255)];
        exchange.export_policies = vec![routing_policy("Reject All", "reject-all", 255)];
        graph.add_internet_exchange(exchange);

        let mut connection = Connection::new("conn-1", "test-ixp");
        connection.vlan = Some(10);
        connection.router = Some("test.example.com".to_string());
        connection.ipv4_address = Some("192.0.2.10".parse().unwrap());
        connection.ipv6_address = Some("2001:db8::a".parse().unwrap());
        graph.add_connection(connection);

        let mut session6 = InternetExchangePeeringSession::new(
            "session-6",
            64510,
            "conn-1",
            "2001:db8::1".parse().unwrap(),
        );
        session6.password = Some("mypassword".to_string());
        session6.import_policies = vec![routing_policy("Accept All", "accept-all", 255)];
        session6.export_policies = vec![
            routing_policy("Accept All", "accept-all", 255),
            routing_policy("Export Supernets", "export-supernets", 64),
        ];
        graph.add_ixp_session(session6);

        let mut session4 = InternetExchangePeeringSession::new(
            "session-4",
            64510,
            "conn-1",
            "192.0.2.1".parse().unwrap(),
        );
        session4.password = Some("mypassword".to_string());
        graph.add_ixp_session(session4);

        let mut rs_session6 = InternetExchangePeeringSession::new(
            "rs-session-6",
            64510,
            "conn-1",
            "2001:db8::ffff".parse().unwrap(),
        );
        rs_session6.is_route_server = true;
        graph.add_ixp_session(rs_session6);

        let mut rs_session4 = InternetExchangePeeringSession::new(
            "rs-session-4",
            64510,
            "conn-1",
            "192.0.2.255".parse().unwrap(),
        );
        rs_session4.is_route_server = true;
        graph.add_ixp_session(rs_session4);

        graph
    }

    fn session_value(graph: &PeeringGraph, id: &str) -> Value {
        Value::IxpSession(
            graph
                .ixp_sessions()
                .iter()
                .find(|s| s.id == id)
                .unwrap()
                .clone(),
        )
    }

    fn exchange_value(graph: &PeeringGraph) -> Value {
        Value::InternetExchange(graph.internet_exchange("test-ixp").unwrap().clone())
    }

    fn router_value(graph: &PeeringGraph) -> Value {
        Value::Router(graph.router("test.example.com").unwrap().clone())
    }

    fn session_values(graph: &PeeringGraph) -> Value {
        Value::List(
            graph
                .ixp_sessions()
                .iter()
                .cloned()
                .map(Value::IxpSession)
                .collect(),
        )
    }

    fn merged_slugs(value: &Value) -> Vec<String> {
        match value {
            Value::List(items) => items
                .iter()
                .map(|v| match v.attr("slug").unwrap() {
                    Value::Str(slug) => slug,
                    other => panic!("expected slug string, got {:?}", other),
                })
                .collect(),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_ipv4() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        let truthy = registry
            .apply(&ctx, "ipv4", &Value::Str("192.0.2.1".into()), &[])
            .unwrap();
        assert_eq!(truthy, Value::Bool(true));
        let falsy = registry
            .apply(&ctx, "ipv4", &Value::Str("2001:db8::1".into()), &[])
            .unwrap();
        assert_eq!(falsy, Value::Bool(false));
        let malformed = registry
            .apply(&ctx, "ipv4", &Value::Str("notanip".into()), &[])
            .unwrap();
        assert_eq!(malformed, Value::Bool(false));
    }

    #[test]
    fn test_ipv6() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        assert_eq!(
            registry
                .apply(&ctx, "ipv6", &Value::Str("2001:db8::1".into()), &[])
                .unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            registry
                .apply(&ctx, "ipv6", &Value::Str("192.0.2.1".into()), &[])
                .unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            registry
                .apply(&ctx, "ipv6", &Value::Str("notanip".into()), &[])
                .unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_ip_version() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        assert_eq!(
            registry
                .apply(&ctx, "ip_version", &session_value(&graph, "session-6"), &[])
                .unwrap(),
            Value::Int(6)
        );
        assert_eq!(
            registry
                .apply(&ctx, "ip_version", &session_value(&graph, "session-4"), &[])
                .unwrap(),
            Value::Int(4)
        );
        assert_eq!(
            registry.apply(&ctx, "ip_version", &Value::Str("notanip".into()), &[]),
            Err(PeeringError::InvalidAddress("notanip".to_string()))
        );
    }

    #[test]
    fn test_local_ips() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        assert_eq!(
            registry
                .apply(&ctx, "local_ips", &session_value(&graph, "session-4"), &[])
                .unwrap(),
            Value::Ip("192.0.2.10".parse().unwrap())
        );
        assert_eq!(
            registry
                .apply(&ctx, "local_ips", &session_value(&graph, "session-6"), &[])
                .unwrap(),
            Value::Ip("2001:db8::a".parse().unwrap())
        );
        assert_eq!(
            registry
                .apply(&ctx, "local_ips", &exchange_value(&graph), &[])
                .unwrap(),
            Value::List(vec![
                Value::Ip("192.0.2.10".parse().unwrap()),
                Value::Ip("2001:db8::a".parse().unwrap()),
            ])
        );
        let connection = Value::Connection(graph.connection("conn-1").unwrap().clone());
        assert_eq!(
            registry.apply(&ctx, "local_ips", &connection, &[]).unwrap(),
            Value::None
        );
    }

    #[test]
    fn test_max_prefix() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        assert_eq!(
            registry
                .apply(&ctx, "max_prefix", &session_value(&graph, "session-6"), &[])
                .unwrap(),
            Value::Int(100)
        );
        assert_eq!(
            registry
                .apply(&ctx, "max_prefix", &session_value(&graph, "session-4"), &[])
                .unwrap(),
            Value::Int(0)
        );
    }

    #[test]
    fn test_cisco_password() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        let encoded = registry
            .apply(&ctx, "cisco_password", &Value::Str("mypassword".into()), &[])
            .unwrap();
        let again = registry
            .apply(&ctx, "cisco_password", &Value::Str("mypassword".into()), &[])
            .unwrap();
        assert_eq!(encoded, again);

        match encoded {
            Value::Str(text) => assert_eq!(cisco_type7_decrypt(&text).unwrap(), "mypassword"),
            other => panic!("expected string, got {:?}", other),
        }

        // A session without a secret renders nothing.
        assert_eq!(
            registry
                .apply(&ctx, "cisco_password", &Value::None, &[])
                .unwrap(),
            Value::None
        );
    }

    #[test]
    fn test_filter() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();
        let all = session_values(&graph);

        assert_eq!(
            registry.apply(&ctx, "length", &all, &[]).unwrap(),
            Value::Int(4)
        );
        let filtered = registry
            .apply(
                &ctx,
                "filter",
                &all,
                &[Arg::named("ip_address__family", Value::Int(6))],
            )
            .unwrap();
        assert_eq!(
            registry.apply(&ctx, "length", &filtered, &[]).unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn test_iterate() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        let policies = Value::List(
            graph
                .autonomous_system(64510)
                .unwrap()
                .export_policies
                .iter()
                .cloned()
                .map(Value::Policy)
                .collect(),
        );
        let slugs = registry
            .apply(
                &ctx,
                "iterate",
                &policies,
                &[Arg::positional(Value::Str("slug".into()))],
            )
            .unwrap();
        assert_eq!(
            slugs,
            Value::List(vec![
                Value::Str("export-supernets".into()),
                Value::Str("export-deaggregated-v4".into()),
                Value::Str("export-deaggregated-v6".into()),
            ])
        );
    }

    #[test]
    fn test_length() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        assert_eq!(
            registry
                .apply(&ctx, "length", &session_values(&graph), &[])
                .unwrap(),
            Value::Int(4)
        );
        assert_eq!(
            registry
                .apply(&ctx, "length", &Value::List(vec![]), &[])
                .unwrap(),
            Value::Int(0)
        );
    }

    #[test]
    fn test_iter_export_policies() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        let policies = registry
            .apply(
                &ctx,
                "iter_export_policies",
                &session_value(&graph, "session-6"),
                &[],
            )
            .unwrap();
        assert_eq!(merged_slugs(&policies), vec!["accept-all", "export-supernets"]);
    }

    #[test]
    fn test_iter_import_policies() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        let policies = registry
            .apply(
                &ctx,
                "iter_import_policies",
                &session_value(&graph, "session-6"),
                &[],
            )
            .unwrap();
        assert_eq!(merged_slugs(&policies), vec!["accept-all"]);
    }

    #[test]
    fn test_merge_export_policies() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        let policies = registry
            .apply(
                &ctx,
                "merge_export_policies",
                &session_value(&graph, "session-6"),
                &[],
            )
            .unwrap();
        assert_eq!(
            merged_slugs(&policies),
            vec![
                "accept-all",
                "export-supernets",
                "export-deaggregated-v6",
                "reject-all"
            ]
        );
    }

    #[test]
    fn test_merge_import_policies() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        let policies = registry
            .apply(
                &ctx,
                "merge_import_policies",
                &session_value(&graph, "session-6"),
                &[],
            )
            .unwrap();
        assert_eq!(
            merged_slugs(&policies),
            vec!["accept-all", "import-known-prefixes", "reject-all"]
        );
    }

    #[test]
    fn test_sessions() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();
        let exchange = exchange_value(&graph);

        let all = registry.apply(&ctx, "sessions", &exchange, &[]).unwrap();
        assert_eq!(length(&all).unwrap(), 4);

        let v6 = registry
            .apply(&ctx, "sessions", &exchange, &[Arg::named("family", Value::Int(6))])
            .unwrap();
        assert_eq!(length(&v6).unwrap(), 2);

        let v4 = registry
            .apply(&ctx, "sessions", &exchange, &[Arg::named("family", Value::Int(4))])
            .unwrap();
        assert_eq!(length(&v4).unwrap(), 2);

        // Unsupported family values select nothing.
        let bogus = registry
            .apply(&ctx, "sessions", &exchange, &[Arg::named("family", Value::Int(5))])
            .unwrap();
        assert_eq!(length(&bogus).unwrap(), 0);
    }

    #[test]
    fn test_route_server() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        let servers = registry
            .apply(&ctx, "route_server", &exchange_value(&graph), &[])
            .unwrap();
        assert_eq!(length(&servers).unwrap(), 2);
    }

    #[test]
    fn test_direct_peers() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        let peers = registry
            .apply(&ctx, "direct_peers", &router_value(&graph), &[])
            .unwrap();
        assert_eq!(length(&peers).unwrap(), 0);

        let mut graph = fixture();
        let mut session =
            DirectPeeringSession::new("direct-1", 64510, "203.0.113.2".parse().unwrap());
        session.router = Some("test.example.com".to_string());
        graph.add_direct_session(session);
        let ctx = FilterContext::new(&graph);
        let peers = registry
            .apply(&ctx, "direct_peers", &router_value(&graph), &[])
            .unwrap();
        assert_eq!(length(&peers).unwrap(), 1);
    }

    #[test]
    fn test_ixp_peers() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();
        let router = router_value(&graph);

        let all = registry.apply(&ctx, "ixp_peers", &router, &[]).unwrap();
        assert_eq!(length(&all).unwrap(), 4);

        let scoped = registry
            .apply(
                &ctx,
                "ixp_peers",
                &router,
                &[Arg::positional(Value::Str("test-ixp".into()))],
            )
            .unwrap();
        assert_eq!(length(&scoped).unwrap(), 4);

        let elsewhere = registry
            .apply(
                &ctx,
                "ixp_peers",
                &router,
                &[Arg::positional(Value::Str("other-ixp".into()))],
            )
            .unwrap();
        assert_eq!(length(&elsewhere).unwrap(), 0);
    }

    #[test]
    fn test_connections() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        let at_exchange = registry
            .apply(&ctx, "connections", &exchange_value(&graph), &[])
            .unwrap();
        assert_eq!(length(&at_exchange).unwrap(), 1);

        let at_router = registry
            .apply(&ctx, "connections", &router_value(&graph), &[])
            .unwrap();
        assert_eq!(length(&at_router).unwrap(), 1);
    }

    #[test]
    fn test_prefix_list() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();
        let remote = Value::AutonomousSystem(graph.autonomous_system(64510).unwrap().clone());

        let all = registry.apply(&ctx, "prefix_list", &remote, &[]).unwrap();
        assert_eq!(length(&all).unwrap(), 2);

        let v6 = registry
            .apply(&ctx, "prefix_list", &remote, &[Arg::named("family", Value::Int(6))])
            .unwrap();
        assert_eq!(
            v6,
            Value::List(vec![Value::Prefix("2001:db8:beef::/48".parse().unwrap())])
        );
    }

    #[test]
    fn test_safe_string() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        assert_eq!(
            registry
                .apply(&ctx, "safe_string", &Value::Str("Téle_à_çiu".into()), &[])
                .unwrap(),
            Value::Str("Tele_a_ciu".into())
        );
    }

    #[test]
    fn test_tags() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        let remote = Value::AutonomousSystem(graph.autonomous_system(64510).unwrap().clone());
        let tagged = registry.apply(&ctx, "tags", &remote, &[]).unwrap();
        assert_eq!(length(&tagged).unwrap(), 3);

        let untagged = registry
            .apply(&ctx, "tags", &exchange_value(&graph), &[])
            .unwrap();
        assert_eq!(length(&untagged).unwrap(), 0);
    }

    #[test]
    fn test_unknown_filter() {
        let graph = fixture();
        let ctx = FilterContext::new(&graph);
        let registry = FilterRegistry::new();

        assert_eq!(
            registry.apply(&ctx, "nonexistent", &Value::None, &[]),
            Err(PeeringError::UnknownFilter("nonexistent".to_string()))
        );
    }

    #[test]
    fn test_registry_surface() {
        let registry = FilterRegistry::new();
        assert_eq!(registry.len(), 21);
        assert!(!registry.is_empty());
        for name in [
            "ipv4",
            "ipv6",
            "ip_version",
            "local_ips",
            "max_prefix",
            "filter",
            "length",
            "iterate",
            "iter_export_policies",
            "iter_import_policies",
            "merge_export_policies",
            "merge_import_policies",
            "sessions",
            "route_server",
            "direct_peers",
            "ixp_peers",
            "connections",
            "prefix_list",
            "safe_string",
            "cisco_password",
            "tags",
        ] {
            assert!(registry.get(name).is_ok(), "missing filter {}", name);
        }
        assert!(registry.names().count() == registry.len());
    }
}
