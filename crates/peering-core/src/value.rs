//! Template values
//!
//! The plain-data union crossing the boundary between the engine and the
//! template renderer. Domain objects are carried by value so a rendered
//! template never holds borrows into the snapshot, and computed results
//! serialize as plain JSON for API exposure.

use std::net::IpAddr;

use ipnetwork::IpNetwork;
use serde::Serialize;

use peering_common::{IpFamily, PeeringError, PeeringResult};

use crate::{
    AutonomousSystem, BgpGroup, BgpSession, Connection, DirectPeeringSession, InternetExchange,
    InternetExchangePeeringSession, Router, RoutingPolicy, Tag,
};

/// A value a template filter consumes or produces
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    Ip(IpAddr),
    Prefix(IpNetwork),
    List(Vec<Value>),
    Tag(Tag),
    Policy(RoutingPolicy),
    AutonomousSystem(AutonomousSystem),
    BgpGroup(BgpGroup),
    InternetExchange(InternetExchange),
    Connection(Connection),
    Router(Router),
    DirectSession(DirectPeeringSession),
    IxpSession(InternetExchangePeeringSession),
}

impl Value {
    /// Kind name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Str(_) => "string",
            Value::Ip(_) => "ip address",
            Value::Prefix(_) => "prefix",
            Value::List(_) => "list",
            Value::Tag(_) => "tag",
            Value::Policy(_) => "routing policy",
            Value::AutonomousSystem(_) => "autonomous system",
            Value::BgpGroup(_) => "bgp group",
            Value::InternetExchange(_) => "internet exchange",
            Value::Connection(_) => "connection",
            Value::Router(_) => "router",
            Value::DirectSession(_) => "direct peering session",
            Value::IxpSession(_) => "internet exchange peering session",
        }
    }

    /// Session view when the value is one of the session kinds
    pub fn as_session(&self) -> Option<BgpSession<'_>> {
        match self {
            Value::DirectSession(s) => Some(BgpSession::Direct(s)),
            Value::IxpSession(s) => Some(BgpSession::InternetExchange(s)),
            _ => None,
        }
    }

    /// Tags of the value when it is a taggable domain object
    pub fn entity_tags(&self) -> Option<&[Tag]> {
        match self {
            Value::AutonomousSystem(a) => Some(&a.tags),
            Value::BgpGroup(g) => Some(&g.tags),
            Value::InternetExchange(i) => Some(&i.tags),
            Value::Router(r) => Some(&r.tags),
            Value::DirectSession(s) => Some(&s.tags),
            Value::IxpSession(s) => Some(&s.tags),
            _ => None,
        }
    }

    /// Attribute lookup by name, for `iterate` and field filters
    pub fn attr(&self, name: &str) -> PeeringResult<Value> {
        let unknown = || PeeringError::UnknownAttribute(name.to_string());
        match self {
            Value::Tag(t) => match name {
                "name" => Ok(Value::Str(t.name.clone())),
                "slug" => Ok(Value::Str(t.slug.clone())),
                _ => Err(unknown()),
            },
            Value::Policy(p) => match name {
                "name" => Ok(Value::Str(p.name.clone())),
                "slug" => Ok(Value::Str(p.slug.clone())),
                "weight" => Ok(Value::Int(i64::from(p.weight))),
                "address_family" => Ok(p
                    .address_family
                    .map(|f| Value::Int(i64::from(f.value())))
                    .unwrap_or(Value::None)),
                _ => Err(unknown()),
            },
            Value::AutonomousSystem(a) => match name {
                "asn" => Ok(Value::Int(i64::from(a.asn))),
                "name" => Ok(Value::Str(a.name.clone())),
                "affiliated" => Ok(Value::Bool(a.affiliated)),
                "ipv4_max_prefixes" => Ok(Value::Int(i64::from(a.ipv4_max_prefixes))),
                "ipv6_max_prefixes" => Ok(Value::Int(i64::from(a.ipv6_max_prefixes))),
                _ => Err(unknown()),
            },
            Value::BgpGroup(g) => match name {
                "name" => Ok(Value::Str(g.name.clone())),
                "slug" => Ok(Value::Str(g.slug.clone())),
                _ => Err(unknown()),
            },
            Value::InternetExchange(i) => match name {
                "name" => Ok(Value::Str(i.name.clone())),
                "slug" => Ok(Value::Str(i.slug.clone())),
                "local_autonomous_system" => {
                    Ok(Value::Int(i64::from(i.local_autonomous_system)))
                }
                _ => Err(unknown()),
            },
            Value::Connection(c) => match name {
                "id" => Ok(Value::Str(c.id.clone())),
                "internet_exchange_point" => Ok(Value::Str(c.internet_exchange_point.clone())),
                "router" => Ok(c
                    .router
                    .clone()
                    .map(Value::Str)
                    .unwrap_or(Value::None)),
                "vlan" => Ok(c.vlan.map(|v| Value::Int(i64::from(v))).unwrap_or(Value::None)),
                "ipv4_address" => Ok(c
                    .ipv4_address
                    .map(|a| Value::Ip(IpAddr::V4(a)))
                    .unwrap_or(Value::None)),
                "ipv6_address" => Ok(c
                    .ipv6_address
                    .map(|a| Value::Ip(IpAddr::V6(a)))
                    .unwrap_or(Value::None)),
                _ => Err(unknown()),
            },
            Value::Router(r) => match name {
                "name" => Ok(Value::Str(r.name.clone())),
                "hostname" => Ok(Value::Str(r.hostname.clone())),
                _ => Err(unknown()),
            },
            Value::DirectSession(s) => match name {
                "id" => Ok(Value::Str(s.id.clone())),
                "autonomous_system" => Ok(Value::Int(i64::from(s.autonomous_system))),
                "bgp_group" => Ok(s.bgp_group.clone().map(Value::Str).unwrap_or(Value::None)),
                "router" => Ok(s.router.clone().map(Value::Str).unwrap_or(Value::None)),
                "ip_address" => Ok(Value::Ip(s.ip_address)),
                "local_ip_address" => {
                    Ok(s.local_ip_address.map(Value::Ip).unwrap_or(Value::None))
                }
                "password" => Ok(s.password.clone().map(Value::Str).unwrap_or(Value::None)),
                _ => Err(unknown()),
            },
            Value::IxpSession(s) => match name {
                "id" => Ok(Value::Str(s.id.clone())),
                "autonomous_system" => Ok(Value::Int(i64::from(s.autonomous_system))),
                "ixp_connection" => Ok(Value::Str(s.ixp_connection.clone())),
                "ip_address" => Ok(Value::Ip(s.ip_address)),
                "password" => Ok(s.password.clone().map(Value::Str).unwrap_or(Value::None)),
                "is_route_server" => Ok(Value::Bool(s.is_route_server)),
                _ => Err(unknown()),
            },
            _ => Err(unknown()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<IpAddr> for Value {
    fn from(v: IpAddr) -> Self {
        Value::Ip(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

/// Comparison a field lookup applies to an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOp {
    /// Attribute equals the lookup value
    Exact,
    /// Attribute is an address of the looked-up family
    Family,
}

/// Explicit form of an `attribute__operator` field lookup
#[derive(Debug, Clone)]
pub struct Lookup {
    pub field: String,
    pub op: LookupOp,
    pub value: Value,
}

impl Lookup {
    /// Parse an `attribute` or `attribute__operator` key
    pub fn parse(key: &str, value: Value) -> Self {
        match key.rsplit_once("__") {
            Some((field, "family")) => Lookup {
                field: field.to_string(),
                op: LookupOp::Family,
                value,
            },
            _ => Lookup {
                field: key.to_string(),
                op: LookupOp::Exact,
                value,
            },
        }
    }

    /// Does `item` satisfy this lookup
    ///
    /// Family lookups are permissive: a value that is not 4 or 6 matches
    /// nothing instead of raising, so template typos degrade to empty
    /// selections.
    pub fn matches(&self, item: &Value) -> PeeringResult<bool> {
        let attr = item.attr(&self.field)?;
        match self.op {
            LookupOp::Exact => Ok(attr == self.value),
            LookupOp::Family => {
                let family = match &self.value {
                    Value::Int(v) => IpFamily::from_value(*v),
                    _ => None,
                };
                match (family, attr) {
                    (Some(family), Value::Ip(addr)) => Ok(family.matches(addr)),
                    _ => Ok(false),
                }
            }
        }
    }
}

/// Keep the items satisfying every lookup, in input order
pub fn filter(items: &[Value], lookups: &[Lookup]) -> PeeringResult<Vec<Value>> {
    let mut selected = Vec::new();
    for item in items {
        let mut keep = true;
        for lookup in lookups {
            if !lookup.matches(item)? {
                keep = false;
                break;
            }
        }
        if keep {
            selected.push(item.clone());
        }
    }
    Ok(selected)
}

/// Element count of a collection value
pub fn length(value: &Value) -> PeeringResult<usize> {
    match value {
        Value::None => Ok(0),
        Value::List(items) => Ok(items.len()),
        Value::Str(s) => Ok(s.chars().count()),
        other => Err(PeeringError::InvalidSubject {
            filter: "length",
            subject: other.kind(),
        }),
    }
}

/// Lazy attribute projection over a collection
///
/// Yields one value per element in input order; each call builds a fresh
/// iterator, so the projection restarts per template use. An attribute
/// missing on any element surfaces as an error for the renderer.
pub fn iterate<'a>(
    items: &'a [Value],
    attribute: &'a str,
) -> impl Iterator<Item = PeeringResult<Value>> + 'a {
    items.iter().map(move |item| item.attr(attribute))
}
