/*! Protocol logic.

The `iface` module holds the stateful part of the crate: the RPL controller and the routing
tables it keeps consistent with the DODAG it is a member of.
*/

mod route;
pub mod rpl;

pub use self::route::{
    Route, RouteTable, RouteTableFull, RoutingTable, Routes, SourceRoutes, MAX_SOURCE_ROUTE_HOPS,
};
pub use self::rpl::{Rpl, RplBuilder};
