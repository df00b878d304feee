//! Peering snapshot
//!
//! The external domain layer owns entity lifecycles; the engine reads a
//! consistent snapshot registered into a [`PeeringGraph`] and never mutates
//! it. Insertion order is preserved so query results and policy merges stay
//! ordered sequences.

use crate::{
    AutonomousSystem, BgpGroup, Connection, DirectPeeringSession, InternetExchange,
    InternetExchangePeeringSession, Router,
};

/// Read-only object graph for one engine invocation
#[derive(Debug, Clone, Default)]
pub struct PeeringGraph {
    autonomous_systems: Vec<AutonomousSystem>,
    bgp_groups: Vec<BgpGroup>,
    routers: Vec<Router>,
    exchanges: Vec<InternetExchange>,
    connections: Vec<Connection>,
    direct_sessions: Vec<DirectPeeringSession>,
    ixp_sessions: Vec<InternetExchangePeeringSession>,
}

impl PeeringGraph {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_autonomous_system(&mut self, autonomous_system: AutonomousSystem) {
        self.autonomous_systems.push(autonomous_system);
    }

    pub fn add_bgp_group(&mut self, group: BgpGroup) {
        self.bgp_groups.push(group);
    }

    pub fn add_router(&mut self, router: Router) {
        self.routers.push(router);
    }

    pub fn add_internet_exchange(&mut self, exchange: InternetExchange) {
        self.exchanges.push(exchange);
    }

    pub fn add_connection(&mut self, connection: Connection) {
        self.connections.push(connection);
    }

    pub fn add_direct_session(&mut self, session: DirectPeeringSession) {
        self.direct_sessions.push(session);
    }

    pub fn add_ixp_session(&mut self, session: InternetExchangePeeringSession) {
        self.ixp_sessions.push(session);
    }

    /// Look up an AS by number
    pub fn autonomous_system(&self, asn: u32) -> Option<&AutonomousSystem> {
        self.autonomous_systems.iter().find(|a| a.asn == asn)
    }

    /// Look up a BGP group by slug
    pub fn bgp_group(&self, slug: &str) -> Option<&BgpGroup> {
        self.bgp_groups.iter().find(|g| g.slug == slug)
    }

    /// Look up a router by hostname
    pub fn router(&self, hostname: &str) -> Option<&Router> {
        self.routers.iter().find(|r| r.hostname == hostname)
    }

    /// Look up an exchange by slug
    pub fn internet_exchange(&self, slug: &str) -> Option<&InternetExchange> {
        self.exchanges.iter().find(|i| i.slug == slug)
    }

    /// Look up a connection by id
    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// The exchange an IXP session is reachable over, via its connection
    pub fn session_exchange(
        &self,
        session: &InternetExchangePeeringSession,
    ) -> Option<&InternetExchange> {
        self.connection(&session.ixp_connection)
            .and_then(|c| self.internet_exchange(&c.internet_exchange_point))
    }

    pub fn autonomous_systems(&self) -> &[AutonomousSystem] {
        &self.autonomous_systems
    }

    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    pub fn internet_exchanges(&self) -> &[InternetExchange] {
        &self.exchanges
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn direct_sessions(&self) -> &[DirectPeeringSession] {
        &self.direct_sessions
    }

    pub fn ixp_sessions(&self) -> &[InternetExchangePeeringSession] {
        &self.ixp_sessions
    }
}
