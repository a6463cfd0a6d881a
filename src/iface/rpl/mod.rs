//! The RPL controller, see [RFC 6550].
//!
//! [Rpl] owns the whole state of a node: the DODAG it is a member of, its neighbors, the DAO
//! cache of the downward routes it advertises and the routing table those routes are installed
//! into. It never sends or sleeps by itself. Outgoing control messages are handed to a
//! [Transport] and timers are armed through a [Scheduler], both provided by the caller.
//!
//! [RFC 6550]: https://datatracker.ietf.org/doc/html/rfc6550

mod builder;
pub(crate) mod consts;
mod dao;
mod dodag;
mod lollipop;
mod mrhof;
mod neighbor_table;
mod objective;
mod of0;
mod parents;
mod process;
mod rank;
mod timer;
mod trickle;

pub use self::builder::{ConfigError, RplBuilder};
pub use self::consts::DEFAULT_DIO_INTERVAL_MIN;
pub use self::dao::{DaoCache, DaoCacheError};
pub use self::dodag::{default_configuration, Dodag};
pub use self::lollipop::{compare_sequence, SequenceCounter};
pub use self::mrhof::Mrhof;
pub use self::neighbor_table::{Neighbor, NeighborTable, NeighborTableError};
pub use self::of0::ObjectiveFunction0;
pub use self::rank::{Rank, INFINITE_RANK};
pub use self::timer::{Scheduler, Timer, TimerHandle};
pub use self::trickle::TrickleTimer;

use self::consts::*;
use self::objective::{Objective, ObjectiveFunction};
use self::timer::OneShot;

use super::route::{RouteTable, RoutingTable, Routes, SourceRoutes};
use crate::rand::Rand;
use crate::time::Duration;
use crate::wire::rpl::{
    join_header, split_header, DestinationAdvertisementObjectAck, DodagInformationObject,
    DodagInformationSolicitation, EmitOptions, HEADER_LEN, ICMPV6_TYPE, MAX_LENGTH,
};
use crate::wire::{
    Ipv6Address, RplControlMessage, RplModeOfOperation, RplPacket, RplRepr,
    LINK_LOCAL_ALL_RPL_NODES,
};

/// The collaborator carrying control messages to other nodes.
pub trait Transport {
    /// Hand a control message to the transport.
    ///
    /// `header` holds the first four bytes of the message body and `payload` the remaining ones.
    /// Returns `false` when the message was not accepted. Whether it reached `dst` is reported
    /// later through [Rpl::tx_result].
    fn send(
        &mut self,
        dst: Ipv6Address,
        msg_type: u8,
        code: RplControlMessage,
        header: [u8; HEADER_LEN],
        payload: &[u8],
    ) -> bool;
}

/// Why the preferred parent is being chosen again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum ParentChangeCause {
    None,
    /// The preferred parent is gone and has to be removed from the neighbor table.
    ParentLost,
    /// The preferred parent moved to a new DODAG version.
    NewVersion,
}

#[derive(Debug)]
pub struct Rpl<T: Transport, S: Scheduler> {
    transport: T,
    scheduler: S,
    rand: Rand,

    address: Ipv6Address,
    is_root: bool,
    dao_ack: bool,

    dodag: Dodag,
    objective: Objective,
    neighbors: NeighborTable,
    dao: DaoCache,
    routes: RoutingTable,

    dio_timer: TrickleTimer,
    dao_timer: OneShot,
    neighbor_timer: OneShot,

    connected: bool,
    poison_sub_dag: bool,
    schedule_dao: bool,
    path_sequence: SequenceCounter,
    /// Sequence of the last DAO sent with the acknowledgement flag set.
    dao_ack_pending: Option<u8>,
    last_dao_ack: Option<(u8, u8)>,
}

/// The routing table matching a mode of operation.
pub(crate) fn routing_table(mode_of_operation: RplModeOfOperation, root: Ipv6Address) -> RoutingTable {
    if mode_of_operation.is_storing() {
        RoutingTable::Storing(Routes::new())
    } else {
        RoutingTable::SourceRouting(SourceRoutes::new(root))
    }
}

impl<T: Transport, S: Scheduler> Rpl<T, S> {
    pub fn address(&self) -> Ipv6Address {
        self.address
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Whether this node is a member of a DODAG, either as root or through a preferred parent.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn dodag(&self) -> &Dodag {
        &self.dodag
    }

    pub fn rank(&self) -> Rank {
        self.dodag.rank
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    pub fn parent(&self) -> Option<Ipv6Address> {
        self.neighbors.preferred_parent().map(|n| n.address())
    }

    pub fn dao_cache(&self) -> &DaoCache {
        &self.dao
    }

    pub fn routes(&self) -> &RoutingTable {
        &self.routes
    }

    pub fn dio_timer(&self) -> &TrickleTimer {
        &self.dio_timer
    }

    /// The Objective Code Point of the objective function in use.
    pub fn objective_code_point(&self) -> u16 {
        self.objective.objective_code_point()
    }

    /// Sequence and status of the last DAO-ACK matching a DAO of ours.
    pub fn last_dao_ack(&self) -> Option<(u8, u8)> {
        self.last_dao_ack
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Process a control message delivered by the transport.
    ///
    /// Messages that cannot be parsed are dropped without touching any state.
    pub fn process_message(
        &mut self,
        src: Ipv6Address,
        dst: Ipv6Address,
        msg_type: u8,
        code: RplControlMessage,
        header: [u8; HEADER_LEN],
        payload: &[u8],
    ) {
        if msg_type != ICMPV6_TYPE {
            net_debug!("dropping message of type {} from {}", msg_type, src);
            return;
        }

        let mut buffer = [0u8; MAX_LENGTH];
        let Ok(len) = join_header(header, payload, &mut buffer) else {
            net_warn!("{} from {} too long, dropping", code, src);
            return;
        };

        let repr = match RplPacket::new_checked(&buffer[..len], code)
            .and_then(|packet| RplRepr::parse(code, &packet))
        {
            Ok(repr) => repr,
            Err(e) => {
                net_warn!("malformed {} from {}: {}", code, src, e);
                return;
            }
        };

        net_trace!("received {} from {}", repr, src);

        match repr {
            RplRepr::DodagInformationSolicitation(dis) => self.process_dis(src, dst, dis),
            RplRepr::DodagInformationObject(dio) => self.process_dio(src, dio),
            RplRepr::DestinationAdvertisementObject(dao) => self.process_dao(src, dao),
            RplRepr::DestinationAdvertisementObjectAck(ack) => self.process_dao_ack(src, ack),
        }
    }

    /// Process the expiry of a timer armed through the scheduler.
    ///
    /// Handles of timers that were cancelled or re-armed in the meantime are ignored.
    pub fn handle_timer(&mut self, handle: TimerHandle) {
        match handle.timer() {
            Timer::TrickleTransmit => {
                if self.dio_timer.fire_transmit(handle) {
                    self.transmit();
                }
            }
            Timer::TrickleInterval => {
                self.dio_timer
                    .fire_interval(handle, &mut self.scheduler, &mut self.rand);
            }
            Timer::DaoDelay => {
                if self.dao_timer.fire(handle) {
                    self.dao_delay_expired();
                }
            }
            Timer::NeighborTick => {
                if self.neighbor_timer.fire(handle) {
                    self.neighbor_tick();
                }
            }
        }
    }

    /// Process the link layer outcome of a unicast message sent to `dst`.
    ///
    /// A successful transmission refreshes the next hop towards `dst`. A failed one shortens
    /// its lifetime and removes it once nothing is left.
    pub fn tx_result(&mut self, dst: Ipv6Address, success: bool) {
        if dst.is_multicast() {
            return;
        }

        let Some(next_hop) = self.routes.next_hop(&dst) else {
            net_trace!("no route to {}, ignoring transmission result", dst);
            return;
        };

        let Some(index) = self.neighbors.find(&next_hop) else {
            net_debug!("next hop {} towards {} is not a neighbor", next_hop, dst);
            return;
        };

        if success {
            // The preferred parent is only refreshed by its DIOs.
            let via_parent = self
                .routes
                .default_route()
                .is_some_and(|r| r.next_hop == next_hop);
            if !self.dodag.is_storing() || !via_parent {
                self.neighbors.refresh(index);
            }
            return;
        }

        let penalty = self.dodag.configuration.default_lifetime as u32;
        if self.neighbors.reduce_lifetime(index, penalty) {
            return;
        }

        net_debug!("neighbor {} died", next_hop);
        self.neighbors.remove(index);

        if self.clean_dao() {
            self.request_dao();
        }

        if self.connected && !self.is_root && self.neighbors.preferred_parent_index().is_none() {
            net_debug!("preferred parent lost after failed transmissions");
            self.choose_preferred_parent(ParentChangeCause::ParentLost);
        }
    }

    /// Become the root of a DODAG identified by our address.
    ///
    /// Calling this on a root starts a new version of its DODAG: the version number is
    /// incremented and all neighbors are forgotten.
    pub fn root_dodag(&mut self) {
        let mut version = self.dodag.version_number;
        if self.is_root {
            version.increment();
        } else {
            version = SequenceCounter::new(ROOT_DEFAULT_VERSION_NUMBER);
        }

        net_debug!("rooting DODAG {} with version {}", self.address, version.value());

        self.is_root = true;
        self.neighbors.clear();
        self.dao.clear();

        let dodag = &mut self.dodag;
        dodag.id = self.address;
        dodag.version_number = version;
        dodag.rank = dodag.rank_from_raw(Rank::ROOT.raw_value());
        dodag.min_advertised_rank = dodag.rank;
        dodag.dtsn = SequenceCounter::new(ROOT_DEFAULT_DTSN);
        dodag.metric.value = DEFAULT_METRIC;

        self.routes = routing_table(dodag.mode_of_operation, self.address);
        self.neighbors.set_lifetime(
            dodag.configuration.default_lifetime,
            dodag.configuration.lifetime_unit,
        );

        self.connected = true;
        self.poison_sub_dag = false;
        self.schedule_dao = false;
        self.dao_timer.cancel(&mut self.scheduler);

        self.dio_timer.set_parameters(
            self.dodag.configuration.dio_interval_min,
            self.dodag.configuration.dio_interval_doublings,
            self.dodag.configuration.dio_redundancy_constant,
        );
        self.dio_timer.reset(&mut self.scheduler, &mut self.rand);
    }

    /// Ask the sub-DODAG to advertise its downward routes again by incrementing the DTSN.
    ///
    /// Only a root can trigger this.
    pub fn request_dao_refresh(&mut self) -> bool {
        if !self.is_root {
            return false;
        }

        self.dodag.dtsn.increment();
        net_debug!("DTSN incremented to {}", self.dodag.dtsn.value());
        self.dio_timer.reset(&mut self.scheduler, &mut self.rand);
        true
    }

    /// The Trickle timer allows a transmission.
    fn transmit(&mut self) {
        if self.poison_sub_dag {
            self.poison_sub_dag = false;
            net_debug!("poisoning sub-DODAG");
            let dio = self.dodag_information_object(self.dodag.infinite_rank());
            self.send(LINK_LOCAL_ALL_RPL_NODES, &dio);
            return;
        }

        if self.connected {
            let dio = self.dodag_information_object(self.dodag.rank);
            self.send(LINK_LOCAL_ALL_RPL_NODES, &dio);
        } else {
            self.send_dis(LINK_LOCAL_ALL_RPL_NODES);
        }
    }

    fn dao_delay_expired(&mut self) {
        if self.schedule_dao && self.connected {
            self.send_dao();
        } else if !self.connected {
            net_trace!("not connected, no DAO sent");
        }

        self.schedule_dao = false;
    }

    fn neighbor_tick(&mut self) {
        let before = self.neighbors.len();
        let parent_lost = self.neighbors.reduce_global_expire_time();

        if self.neighbors.len() != before && self.clean_dao() {
            self.request_dao();
        }

        if parent_lost && self.connected && !self.is_root {
            net_debug!("preferred parent expired");
            self.choose_preferred_parent(ParentChangeCause::ParentLost);
        }

        self.neighbor_timer.arm(&mut self.scheduler, NEIGHBOR_TICK);
    }

    /// Mark the DAO cache for advertisement and arm the DAO delay timer if it is idle.
    pub(crate) fn request_dao(&mut self) {
        if self.is_root
            || self.dodag.mode_of_operation == RplModeOfOperation::NoDownwardRoutesMaintained
        {
            return;
        }

        self.schedule_dao = true;

        if !self.dao_timer.is_armed() {
            let jitter = self.rand.rand_inclusive(DAO_DELAY_JITTER_MS);
            let delay = DAO_DELAY_MIN + Duration::from_millis(jitter as u64);
            net_trace!("DAO scheduled in {}", delay);
            self.dao_timer.arm(&mut self.scheduler, delay);
        }
    }

    /// Advertise a rank of infinity once, at the next Trickle transmission.
    pub(crate) fn poison(&mut self) {
        self.poison_sub_dag = true;
        self.dio_timer.reset(&mut self.scheduler, &mut self.rand);
    }

    pub(crate) fn dodag_information_object(&self, rank: Rank) -> RplRepr<'static> {
        let dodag = &self.dodag;
        RplRepr::DodagInformationObject(DodagInformationObject {
            rpl_instance_id: dodag.instance_id,
            version_number: dodag.version_number.value(),
            rank: rank.raw_value(),
            grounded: dodag.grounded,
            mode_of_operation: dodag.mode_of_operation,
            dodag_preference: dodag.preference,
            dtsn: dodag.dtsn.value(),
            dodag_id: dodag.id,
            metric_container: Some(dodag.metric),
            route_information: None,
            dodag_configuration: Some(dodag.configuration),
            prefix_information: None,
        })
    }

    pub(crate) fn send_dis(&mut self, dst: Ipv6Address) {
        let dis = RplRepr::DodagInformationSolicitation(DodagInformationSolicitation::default());
        self.send(dst, &dis);
    }

    fn send_dao(&mut self) {
        if self.is_root {
            return;
        }

        let Some(parent) = self.parent() else {
            return;
        };

        let storing = self.dodag.is_storing();
        // In non-storing mode the DAO goes straight to the root.
        let dst = if storing { parent } else { self.dodag.id };

        let no_path = crate::wire::RplTransitInformation {
            external: false,
            path_control: 0,
            path_sequence: self.path_sequence.value(),
            path_lifetime: NO_PATH_LIFETIME,
            parent_address: (!storing).then_some(parent),
        };

        // A large sub-DODAG does not fit into a single DAO.
        let total = self.dao.advertised_len();
        if total == 0 {
            net_trace!("nothing to advertise");
            return;
        }

        let mut start = 0;
        while start < total {
            let sequence = self.dao.next_sequence();
            let (dao, next) = self.dao.to_repr(
                self.dodag.instance_id,
                self.dao_ack,
                sequence,
                None,
                no_path,
                start,
            );
            if next == start {
                break;
            }

            net_debug!("sending DAO with {} targets to {}", dao.targets.len(), dst);

            if self.dao_ack {
                self.dao_ack_pending = Some(sequence);
            }

            if !self.send(dst, &RplRepr::DestinationAdvertisementObject(dao)) {
                break;
            }
            start = next;
        }

        self.dao.withdrawal_sent(start);
    }

    pub(crate) fn send_dao_ack(&mut self, dst: Ipv6Address, sequence: u8) {
        let ack = RplRepr::DestinationAdvertisementObjectAck(DestinationAdvertisementObjectAck {
            rpl_instance_id: self.dodag.instance_id,
            sequence,
            status: 0,
            dodag_id: None,
        });
        self.send(dst, &ack);
    }

    /// Emit `repr` and hand it to the transport.
    fn send(&mut self, dst: Ipv6Address, repr: &RplRepr) -> bool {
        let include = EmitOptions {
            route_information: false,
            prefix_information: false,
            ..EmitOptions::default()
        };

        let mut buffer = [0u8; MAX_LENGTH];
        let len = match repr.buffer_len(&include) {
            Ok(len) if len <= MAX_LENGTH => len,
            _ => {
                net_warn!("{} does not fit into a message", repr);
                return false;
            }
        };

        let mut packet = RplPacket::new_unchecked(&mut buffer[..len]);
        if let Err(e) = repr.emit(&mut packet, &include) {
            net_warn!("cannot emit {}: {}", repr, e);
            return false;
        }

        let (header, payload) = split_header(&buffer[..len]);
        net_trace!("sending {} to {}", repr, dst);

        let accepted = self
            .transport
            .send(dst, ICMPV6_TYPE, repr.message(), header, payload);
        if !accepted {
            net_debug!("transport refused {} to {}", repr.message(), dst);
        }
        accepted
    }
}

#[cfg(test)]
mod tests;
