use heapless::Vec;

use crate::wire::{Ipv6Address, Ipv6Cidr};

/// Maximum number of routes a table holds, not counting the default route.
pub const ROUTE_TABLE_SIZE: usize = 32;

/// Maximum number of hops of a computed source route.
pub const MAX_SOURCE_ROUTE_HOPS: usize = 16;

/// Metric used for routes that were given a metric of 0.
const DEFAULT_ROUTE_METRIC: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RouteTableFull;

impl core::fmt::Display for RouteTableFull {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Route table full")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RouteTableFull {}

/// A prefix of addresses that should be routed via a next hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Route {
    pub cidr: Ipv6Cidr,
    pub next_hop: Ipv6Address,
    pub interface: u8,
    pub metric: u16,
    pub active: bool,
}

impl Route {
    /// Returns an active route to `cidr` via `next_hop`.
    pub fn new(cidr: Ipv6Cidr, next_hop: Ipv6Address, metric: u16) -> Route {
        Route {
            cidr,
            next_hop,
            interface: 0,
            metric: if metric == 0 {
                DEFAULT_ROUTE_METRIC
            } else {
                metric
            },
            active: true,
        }
    }

    /// Returns a route to ::/0 via the `gateway`.
    pub fn new_default(gateway: Ipv6Address, metric: u16) -> Route {
        Route::new(Ipv6Cidr::DEFAULT, gateway, metric)
    }
}

/// The operations the RPL controller needs from a routing table.
pub trait RouteTable {
    fn add_route(&mut self, route: Route) -> Result<(), RouteTableFull>;

    /// Replace the route to the same destination prefix, or add it when there is none.
    ///
    /// On success, returns the replaced route, if any.
    fn modify_route(&mut self, route: Route) -> Result<Option<Route>, RouteTableFull>;

    /// Remove every route to `address` and every route via `address`.
    ///
    /// Returns `true` when something was removed.
    fn delete_route(&mut self, address: &Ipv6Address) -> bool;

    /// Longest prefix match, falling back to the default route.
    fn lookup(&self, destination: &Ipv6Address) -> Option<&Route>;

    /// The next hop towards `destination`.
    fn next_hop(&self, destination: &Ipv6Address) -> Option<Ipv6Address> {
        self.lookup(destination).map(|route| route.next_hop)
    }

    /// Set the default gateway (ie. "ip -6 route replace ::/0 via `gateway`").
    fn update_default_route(&mut self, gateway: Ipv6Address, metric: u16);

    /// On success, returns the previous default route, if any.
    fn delete_default_route(&mut self) -> Option<Route>;

    fn default_route(&self) -> Option<&Route>;

    /// The routes of the table, without the default route.
    fn routes(&self) -> &[Route];

    /// Remove all routes, the default route included.
    fn clear(&mut self);
}

/// A flat routing table, as kept by nodes in storing mode.
#[derive(Debug, Default)]
pub struct Routes {
    storage: Vec<Route, ROUTE_TABLE_SIZE>,
    default: Option<Route>,
}

impl Routes {
    /// Creates a new empty routing table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Longest prefix match without the default route.
    fn lookup_prefix(&self, destination: &Ipv6Address) -> Option<&Route> {
        let mut best: Option<&Route> = None;

        for route in self.storage.iter() {
            if !route.active || !route.cidr.contains_addr(destination) {
                continue;
            }

            if route.cidr.prefix_len() == 128 {
                return Some(route);
            }

            // pick the most specific one (highest prefix_len)
            if best.map_or(true, |b| route.cidr.prefix_len() > b.cidr.prefix_len()) {
                best = Some(route);
            }
        }

        best
    }
}

impl RouteTable for Routes {
    fn add_route(&mut self, route: Route) -> Result<(), RouteTableFull> {
        self.storage.push(route).map_err(|_| RouteTableFull)
    }

    fn modify_route(&mut self, route: Route) -> Result<Option<Route>, RouteTableFull> {
        match self
            .storage
            .iter_mut()
            .find(|r| r.cidr.same_network(&route.cidr))
        {
            Some(existing) => Ok(Some(core::mem::replace(existing, route))),
            None => self.add_route(route).map(|()| None),
        }
    }

    fn delete_route(&mut self, address: &Ipv6Address) -> bool {
        let before = self.storage.len();
        self.storage
            .retain(|r| r.cidr.address() != *address && r.next_hop != *address);
        before != self.storage.len()
    }

    fn lookup(&self, destination: &Ipv6Address) -> Option<&Route> {
        self.lookup_prefix(destination)
            .or_else(|| self.default.as_ref().filter(|r| r.active))
    }

    fn update_default_route(&mut self, gateway: Ipv6Address, metric: u16) {
        self.default = Some(Route::new_default(gateway, metric));
    }

    fn delete_default_route(&mut self) -> Option<Route> {
        self.default.take()
    }

    fn default_route(&self) -> Option<&Route> {
        self.default.as_ref()
    }

    fn routes(&self) -> &[Route] {
        &self.storage
    }

    fn clear(&mut self) {
        self.storage.clear();
        self.default = None;
    }
}

/// The source routing table of a root in non-storing mode.
///
/// Every entry maps a target to the parent the target advertised in its DAO. The route to a
/// target is found by following parents until the root is reached.
#[derive(Debug)]
pub struct SourceRoutes {
    root: Ipv6Address,
    relations: Routes,
}

impl SourceRoutes {
    pub fn new(root: Ipv6Address) -> Self {
        Self {
            root,
            relations: Routes::new(),
        }
    }

    pub fn root(&self) -> Ipv6Address {
        self.root
    }

    /// The hops from the root to `destination`, the first hop first and `destination` last.
    ///
    /// Returns `None` when some node on the way is unknown or when the parents form a loop.
    pub fn source_route(
        &self,
        destination: &Ipv6Address,
    ) -> Option<Vec<Ipv6Address, MAX_SOURCE_ROUTE_HOPS>> {
        let mut hops: Vec<Ipv6Address, MAX_SOURCE_ROUTE_HOPS> = Vec::new();
        hops.push(*destination).ok()?;

        let mut current = *destination;
        loop {
            let parent = self.relations.lookup_prefix(&current)?.next_hop;
            if parent == self.root {
                break;
            }

            if hops.contains(&parent) {
                net_debug!("source route to {} loops at {}", destination, parent);
                return None;
            }

            hops.push(parent).ok()?;
            current = parent;
        }

        hops.reverse();
        Some(hops)
    }
}

impl RouteTable for SourceRoutes {
    fn add_route(&mut self, route: Route) -> Result<(), RouteTableFull> {
        self.relations.add_route(route)
    }

    fn modify_route(&mut self, route: Route) -> Result<Option<Route>, RouteTableFull> {
        self.relations.modify_route(route)
    }

    fn delete_route(&mut self, address: &Ipv6Address) -> bool {
        self.relations.delete_route(address)
    }

    fn lookup(&self, destination: &Ipv6Address) -> Option<&Route> {
        self.relations.lookup(destination)
    }

    fn next_hop(&self, destination: &Ipv6Address) -> Option<Ipv6Address> {
        match self.source_route(destination) {
            Some(hops) => hops.first().copied(),
            None => self.relations.default_route().map(|r| r.next_hop),
        }
    }

    fn update_default_route(&mut self, gateway: Ipv6Address, metric: u16) {
        self.relations.update_default_route(gateway, metric)
    }

    fn delete_default_route(&mut self) -> Option<Route> {
        self.relations.delete_default_route()
    }

    fn default_route(&self) -> Option<&Route> {
        self.relations.default_route()
    }

    fn routes(&self) -> &[Route] {
        self.relations.routes()
    }

    fn clear(&mut self) {
        self.relations.clear()
    }
}

/// The routing table of a node, chosen by the mode of operation of its DODAG.
#[derive(Debug)]
pub enum RoutingTable {
    Storing(Routes),
    SourceRouting(SourceRoutes),
}

impl RoutingTable {
    /// The source route to `destination`, when source routing is in use.
    pub fn source_route(
        &self,
        destination: &Ipv6Address,
    ) -> Option<Vec<Ipv6Address, MAX_SOURCE_ROUTE_HOPS>> {
        match self {
            Self::Storing(_) => None,
            Self::SourceRouting(table) => table.source_route(destination),
        }
    }

    fn inner(&self) -> &dyn RouteTable {
        match self {
            Self::Storing(table) => table,
            Self::SourceRouting(table) => table,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn RouteTable {
        match self {
            Self::Storing(table) => table,
            Self::SourceRouting(table) => table,
        }
    }
}

impl RouteTable for RoutingTable {
    fn add_route(&mut self, route: Route) -> Result<(), RouteTableFull> {
        self.inner_mut().add_route(route)
    }

    fn modify_route(&mut self, route: Route) -> Result<Option<Route>, RouteTableFull> {
        self.inner_mut().modify_route(route)
    }

    fn delete_route(&mut self, address: &Ipv6Address) -> bool {
        self.inner_mut().delete_route(address)
    }

    fn lookup(&self, destination: &Ipv6Address) -> Option<&Route> {
        self.inner().lookup(destination)
    }

    fn next_hop(&self, destination: &Ipv6Address) -> Option<Ipv6Address> {
        self.inner().next_hop(destination)
    }

    fn update_default_route(&mut self, gateway: Ipv6Address, metric: u16) {
        self.inner_mut().update_default_route(gateway, metric)
    }

    fn delete_default_route(&mut self) -> Option<Route> {
        self.inner_mut().delete_default_route()
    }

    fn default_route(&self) -> Option<&Route> {
        self.inner().default_route()
    }

    fn routes(&self) -> &[Route] {
        self.inner().routes()
    }

    fn clear(&mut self) {
        self.inner_mut().clear()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    mod mock {
        use super::super::*;
        pub const ADDR_1A: Ipv6Address = Ipv6Address::new(0xfd00, 0, 0, 2, 0, 0, 0, 1);
        pub const ADDR_1B: Ipv6Address = Ipv6Address::new(0xfd00, 0, 0, 2, 0, 0, 0, 13);
        pub const ADDR_1C: Ipv6Address = Ipv6Address::new(0xfd00, 0, 0, 2, 0, 0, 0, 42);
        pub fn cidr_1() -> Ipv6Cidr {
            Ipv6Cidr::new(Ipv6Address::new(0xfd00, 0, 0, 2, 0, 0, 0, 0), 64)
        }

        pub const ADDR_2A: Ipv6Address = Ipv6Address::new(0xfd00, 0, 0, 0x3364, 0, 0, 0, 1);
        pub const ADDR_2B: Ipv6Address = Ipv6Address::new(0xfd00, 0, 0, 0x3364, 0, 0, 0, 21);
        pub fn cidr_2() -> Ipv6Cidr {
            Ipv6Cidr::new(Ipv6Address::new(0xfd00, 0, 0, 0x3364, 0, 0, 0, 0), 64)
        }

        pub const ROOT: Ipv6Address = Ipv6Address::new(0xfd00, 0, 0, 0, 0, 0, 0, 1);
        pub const GATEWAY: Ipv6Address = Ipv6Address::new(0xfe80, 0, 0, 0, 0, 0, 0, 1);
    }

    use self::mock::*;

    #[test]
    fn test_fill() {
        let mut routes = Routes::new();

        assert_eq!(routes.next_hop(&ADDR_1A), None);
        assert_eq!(routes.next_hop(&ADDR_2A), None);

        routes.add_route(Route::new(cidr_1(), ADDR_1A, 1)).unwrap();

        assert_eq!(routes.next_hop(&ADDR_1A), Some(ADDR_1A));
        assert_eq!(routes.next_hop(&ADDR_1B), Some(ADDR_1A));
        assert_eq!(routes.next_hop(&ADDR_1C), Some(ADDR_1A));
        assert_eq!(routes.next_hop(&ADDR_2A), None);
        assert_eq!(routes.next_hop(&ADDR_2B), None);

        routes.add_route(Route::new(cidr_2(), ADDR_2A, 1)).unwrap();

        assert_eq!(routes.next_hop(&ADDR_1B), Some(ADDR_1A));
        assert_eq!(routes.next_hop(&ADDR_2A), Some(ADDR_2A));
        assert_eq!(routes.next_hop(&ADDR_2B), Some(ADDR_2A));

        routes.update_default_route(GATEWAY, 0);
        assert_eq!(routes.next_hop(&ROOT), Some(GATEWAY));
        assert_eq!(routes.default_route().unwrap().metric, DEFAULT_ROUTE_METRIC);
    }

    #[test]
    fn test_longest_prefix_match() {
        let mut routes = Routes::new();
        routes.add_route(Route::new(cidr_1(), ADDR_1A, 1)).unwrap();
        routes
            .add_route(Route::new(Ipv6Cidr::new(ADDR_1B, 120), ADDR_1B, 1))
            .unwrap();
        routes
            .add_route(Route::new(Ipv6Cidr::new(ADDR_1B, 96), ADDR_1C, 1))
            .unwrap();

        assert_eq!(routes.lookup(&ADDR_1B).unwrap().cidr.prefix_len(), 120);

        // A host route wins, even when added last.
        routes.add_route(Route::new(Ipv6Cidr::host(ADDR_1B), ADDR_2A, 1)).unwrap();
        assert_eq!(routes.next_hop(&ADDR_1B), Some(ADDR_2A));
    }

    #[test]
    fn test_inactive_route_is_skipped() {
        let mut routes = Routes::new();
        let mut route = Route::new(cidr_1(), ADDR_1A, 1);
        route.active = false;
        routes.add_route(route).unwrap();

        assert_eq!(routes.next_hop(&ADDR_1B), None);
    }

    #[test]
    fn test_modify_and_delete() {
        let mut routes = Routes::new();
        routes.add_route(Route::new(Ipv6Cidr::host(ADDR_1B), ADDR_1A, 1)).unwrap();
        routes.add_route(Route::new(Ipv6Cidr::host(ADDR_1C), ADDR_1A, 1)).unwrap();
        routes.add_route(Route::new(Ipv6Cidr::host(ADDR_2B), ADDR_2A, 1)).unwrap();

        let old = routes
            .modify_route(Route::new(Ipv6Cidr::host(ADDR_1B), ADDR_2A, 3))
            .unwrap();
        assert_eq!(old.unwrap().next_hop, ADDR_1A);
        assert_eq!(routes.next_hop(&ADDR_1B), Some(ADDR_2A));
        assert_eq!(routes.routes().len(), 3);

        // Everything via ADDR_2A goes.
        assert!(routes.delete_route(&ADDR_2A));
        assert_eq!(routes.routes().len(), 1);
        assert_eq!(routes.next_hop(&ADDR_1C), Some(ADDR_1A));

        assert!(routes.delete_route(&ADDR_1C));
        assert!(!routes.delete_route(&ADDR_1C));
        assert!(routes.routes().is_empty());
    }

    #[test]
    fn test_full() {
        let mut routes = Routes::new();
        for i in 0..ROUTE_TABLE_SIZE as u16 {
            let dst = Ipv6Address::new(0xfd00, 0, 0, 0, 0, 0, 1, i);
            routes.add_route(Route::new(Ipv6Cidr::host(dst), GATEWAY, 1)).unwrap();
        }
        assert_eq!(
            routes.add_route(Route::new(Ipv6Cidr::host(ADDR_1A), GATEWAY, 1)),
            Err(RouteTableFull)
        );
        assert_eq!(
            routes.modify_route(Route::new(Ipv6Cidr::host(ADDR_1A), GATEWAY, 1)),
            Err(RouteTableFull)
        );
    }

    #[test]
    fn test_source_route() {
        let mut table = SourceRoutes::new(ROOT);
        // ROOT <- 1A <- 1B <- 1C
        table.add_route(Route::new(Ipv6Cidr::host(ADDR_1A), ROOT, 1)).unwrap();
        table.add_route(Route::new(Ipv6Cidr::host(ADDR_1B), ADDR_1A, 1)).unwrap();
        table.add_route(Route::new(Ipv6Cidr::host(ADDR_1C), ADDR_1B, 1)).unwrap();

        let hops = table.source_route(&ADDR_1C).unwrap();
        assert_eq!(&hops[..], &[ADDR_1A, ADDR_1B, ADDR_1C]);
        assert_eq!(table.next_hop(&ADDR_1C), Some(ADDR_1A));
        assert_eq!(table.next_hop(&ADDR_1A), Some(ADDR_1A));

        assert_eq!(table.source_route(&ADDR_2A), None);
        assert_eq!(table.next_hop(&ADDR_2A), None);
    }

    #[test]
    fn test_source_route_loop() {
        let mut table = SourceRoutes::new(ROOT);
        table.add_route(Route::new(Ipv6Cidr::host(ADDR_1A), ADDR_1B, 1)).unwrap();
        table.add_route(Route::new(Ipv6Cidr::host(ADDR_1B), ADDR_1A, 1)).unwrap();

        assert_eq!(table.source_route(&ADDR_1A), None);

        table.update_default_route(GATEWAY, 1);
        assert_eq!(table.next_hop(&ADDR_1A), Some(GATEWAY));
    }

    #[test]
    fn test_routing_table_dispatch() {
        let mut table = RoutingTable::Storing(Routes::new());
        table.add_route(Route::new(Ipv6Cidr::host(ADDR_1A), ADDR_1B, 1)).unwrap();
        assert_eq!(table.next_hop(&ADDR_1A), Some(ADDR_1B));
        assert_eq!(table.source_route(&ADDR_1A), None);

        let mut table = RoutingTable::SourceRouting(SourceRoutes::new(ROOT));
        table.add_route(Route::new(Ipv6Cidr::host(ADDR_1A), ROOT, 1)).unwrap();
        assert_eq!(table.next_hop(&ADDR_1A), Some(ADDR_1A));
        table.clear();
        assert!(table.routes().is_empty());
    }
}
