//! BGP address families
//!
//! Sessions and routing policies are scoped to an IP family. Template
//! filters accept families as the bare numbers 4 and 6, so the enum
//! serializes to its numeric value.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// IP address family of a session, policy or filter argument
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IpFamily {
    /// IPv4 (family value 4)
    Ipv4,
    /// IPv6 (family value 6)
    Ipv6,
}

impl IpFamily {
    /// Numeric family value (4 or 6)
    pub fn value(self) -> u8 {
        match self {
            IpFamily::Ipv4 => 4,
            IpFamily::Ipv6 => 6,
        }
    }

    /// Family of an address
    pub fn of(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => IpFamily::Ipv4,
            IpAddr::V6(_) => IpFamily::Ipv6,
        }
    }

    /// Parse a numeric family value.
    ///
    /// Anything other than 4 or 6 yields `None`. Query filters treat that
    /// as "matches nothing" rather than an error, so a typo in a template
    /// produces an empty result instead of a rendering crash.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            4 => Some(IpFamily::Ipv4),
            6 => Some(IpFamily::Ipv6),
            _ => None,
        }
    }

    /// Does `addr` belong to this family
    pub fn matches(self, addr: IpAddr) -> bool {
        IpFamily::of(addr) == self
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ipv{}", self.value())
    }
}

impl Serialize for IpFamily {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.value())
    }
}

impl<'de> Deserialize<'de> for IpFamily {
    fn deserialize<D>(deserializer: D) -> Result<IpFamily, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        IpFamily::from_value(value)
            .ok_or_else(|| serde::de::Error::custom(format!("unsupported IP family: {}", value)))
    }
}
