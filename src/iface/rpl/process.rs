use core::cmp::Ordering;

use super::consts::DEFAULT_METRIC;
use super::lollipop::{compare_sequence, SequenceCounter};
use super::neighbor_table::NeighborTableError;
use super::objective::{Objective, ObjectiveFunction};
use super::rank::Rank;
use super::{routing_table, ParentChangeCause, Rpl, Scheduler, Transport};

use crate::wire::rpl::{
    DestinationAdvertisementObject, DestinationAdvertisementObjectAck, DodagInformationObject,
    DodagInformationSolicitation,
};
use crate::wire::{
    Ipv6Address, Ipv6Cidr, RplDagMetricContainer, RplModeOfOperation, LINK_LOCAL_ALL_RPL_NODES,
};

impl<T: Transport, S: Scheduler> Rpl<T, S> {
    /// Process an incoming DIS.
    ///
    /// Every DIS resets the Trickle timer and is answered right away, with a unicast DIO for a
    /// unicast DIS.
    pub(super) fn process_dis(
        &mut self,
        src: Ipv6Address,
        dst: Ipv6Address,
        dis: DodagInformationSolicitation,
    ) {
        // Only respond when all predicates of the Solicited Information match.
        if let Some(info) = dis.solicited_information {
            if (info.version_predicate
                && self.dodag.version_number.value() != info.version_number)
                || (info.dodag_id_predicate && self.dodag.id != info.dodag_id)
                || (info.instance_id_predicate && self.dodag.instance_id != info.rpl_instance_id)
            {
                net_trace!("predicates did not match, dropping DIS");
                return;
            }
        }

        if !self.connected {
            net_trace!("not part of a DODAG, ignoring DIS from {}", src);
            return;
        }

        self.dio_timer.reset(&mut self.scheduler, &mut self.rand);

        // A multicast DIS is answered on the multicast address as well.
        let reply_to = if dst.is_multicast() {
            LINK_LOCAL_ALL_RPL_NODES
        } else {
            src
        };
        net_trace!("DIS from {}, answering to {}", src, reply_to);
        let dio = self.dodag_information_object(self.dodag.rank);
        self.send(reply_to, &dio);
    }

    /// Process an incoming DIO.
    pub(super) fn process_dio(&mut self, src: Ipv6Address, dio: DodagInformationObject) {
        if src == self.address {
            return;
        }

        if let Some(i) = self.neighbors.find(&src) {
            self.neighbors.refresh(i);
        }

        if !self.connected && !self.is_root {
            self.join(src, dio);
        } else {
            self.update_from_dio(src, dio);
        }
    }

    /// Try to become a member of the DODAG advertised by `dio`.
    fn join(&mut self, src: Ipv6Address, dio: DodagInformationObject) {
        if self.poison_sub_dag {
            net_trace!("sub-DODAG not poisoned yet, not joining");
            return;
        }

        let Some(configuration) = dio.dodag_configuration else {
            net_debug!("DIO without DODAG configuration, soliciting {}", src);
            self.send_dis(src);
            return;
        };

        if configuration.minimum_hop_rank_increase == 0 {
            net_debug!("DIO with a MinHopRankIncrease of 0, dropping");
            return;
        }

        let rank = Rank::new(dio.rank, configuration.minimum_hop_rank_increase);
        if rank.is_infinite() {
            net_trace!("{} advertises an infinite rank, not joining", src);
            return;
        }

        let Some(objective) = Objective::from_ocp(configuration.objective_code_point) else {
            net_debug!(
                "unsupported objective function {}, not joining",
                configuration.objective_code_point
            );
            return;
        };

        // Process the DODAG
        // =================
        if self.dodag.id != dio.dodag_id || self.dodag.instance_id != dio.rpl_instance_id {
            net_debug!("joining DODAG {}", dio.dodag_id);
            self.neighbors.clear();
            self.dao.clear();
        }

        let rebuild =
            self.dodag.mode_of_operation != dio.mode_of_operation || self.dodag.id != dio.dodag_id;

        let metric_type = dio
            .metric_container
            .map_or(self.dodag.metric_type(), |mc| mc.metric_type);

        let dodag = &mut self.dodag;
        dodag.id = dio.dodag_id;
        dodag.instance_id = dio.rpl_instance_id;
        dodag.version_number = SequenceCounter::new(dio.version_number);
        dodag.grounded = dio.grounded;
        dodag.mode_of_operation = dio.mode_of_operation;
        dodag.preference = dio.dodag_preference;
        dodag.dtsn = SequenceCounter::new(dio.dtsn);
        dodag.configuration = configuration;
        dodag.metric = RplDagMetricContainer::recorded(metric_type, DEFAULT_METRIC);
        dodag.rank = dodag.infinite_rank();
        dodag.min_advertised_rank = dodag.infinite_rank();

        if rebuild {
            self.routes = routing_table(dio.mode_of_operation, dio.dodag_id);
        }

        self.objective = objective;
        self.dio_timer.set_parameters(
            configuration.dio_interval_min,
            configuration.dio_interval_doublings,
            configuration.dio_redundancy_constant,
        );
        self.neighbors
            .set_lifetime(configuration.default_lifetime, configuration.lifetime_unit);

        // Process the sender
        // ==================
        if let Some(i) = self.neighbors.find(&src) {
            self.neighbors.remove(i);
            if self.clean_dao() {
                self.request_dao();
            }
        }

        let metric = dio
            .metric_container
            .filter(|mc| mc.metric_type == metric_type)
            .map_or(DEFAULT_METRIC, |mc| mc.value);
        let version = SequenceCounter::new(dio.version_number);

        let added = match self.neighbors.add(src, rank, version, metric_type, metric) {
            Err(NeighborTableError::Full) => {
                net_debug!("neighbor table full, evicting the oldest entry");
                self.neighbors.remove(0);
                if self.clean_dao() {
                    self.request_dao();
                }
                self.neighbors.add(src, rank, version, metric_type, metric)
            }
            other => other,
        };

        if let Err(e) = added {
            net_debug!("cannot add {} to the neighbor table: {}", src, e);
            return;
        }

        self.choose_preferred_parent(ParentChangeCause::None);

        if self.connected {
            net_debug!("joined DODAG {} with {}", self.dodag.id, self.dodag.rank);
            self.dio_timer.reset(&mut self.scheduler, &mut self.rand);
        }
    }

    /// Process a DIO while being a member of a DODAG.
    fn update_from_dio(&mut self, src: Ipv6Address, dio: DodagInformationObject) {
        if dio.dodag_id != self.dodag.id || dio.rpl_instance_id != self.dodag.instance_id {
            net_trace!("DIO of another DODAG, dropping");
            return;
        }

        let own_version = self.dodag.version_number.value();
        let version_mismatch = dio.version_number != own_version;

        let rank = self.dodag.rank_from_raw(dio.rank);
        let version = SequenceCounter::new(dio.version_number);
        let metric_type = self.dodag.metric_type();
        let metric = dio
            .metric_container
            .filter(|mc| mc.metric_type == metric_type)
            .map(|mc| mc.value);

        if self.is_root {
            self.root_hears_dio(src, &dio, rank, version, metric);
            return;
        }

        let mut changed = false;

        match self.neighbors.find(&src) {
            None => {
                if let Err(e) = self.neighbors.add(
                    src,
                    rank,
                    version,
                    metric_type,
                    metric.unwrap_or(DEFAULT_METRIC),
                ) {
                    net_debug!("cannot add {} to the neighbor table: {}", src, e);
                } else {
                    self.update_parent_set();
                    self.choose_preferred_parent(ParentChangeCause::None);
                    changed = true;
                }
            }
            Some(i) => {
                let Some(neighbor) = self.neighbors.get(i) else {
                    return;
                };
                let version_change = neighbor.version() != version;
                let rank_change = self.objective.compare_rank(neighbor.rank(), rank)
                    != Ordering::Equal;
                let was_parent = neighbor.is_parent();
                let is_preferred = self.neighbors.preferred_parent_index() == Some(i);

                if let Some(n) = self.neighbors.get_mut(i) {
                    n.set_rank(rank);
                    n.set_version(version);
                    if let Some(value) = metric {
                        n.set_metric(metric_type, value);
                    }
                }

                if version_change && was_parent {
                    changed = true;
                    if let Some(n) = self.neighbors.get_mut(i) {
                        n.set_is_parent(false);
                    }
                    if is_preferred {
                        net_debug!(
                            "preferred parent {} moved to version {}",
                            src,
                            dio.version_number
                        );
                        self.choose_preferred_parent(ParentChangeCause::NewVersion);
                    }
                } else if rank_change && is_preferred {
                    changed = true;
                    self.preferred_parent_rank_changed(src, rank);
                } else if rank_change {
                    changed = true;
                    let is_parent = self.neighbor_qualifies_as_parent(rank, version);
                    if let Some(n) = self.neighbors.get_mut(i) {
                        n.set_is_parent(is_parent);
                    }
                    self.choose_preferred_parent(ParentChangeCause::None);
                }
            }
        }

        if self.parent() == Some(src) {
            if compare_sequence(dio.dtsn, self.dodag.dtsn.value()) == Ordering::Greater {
                net_debug!("parent incremented its DTSN, refreshing downward routes");
                self.request_dao();
            }
            self.dodag.dtsn = SequenceCounter::new(dio.dtsn);
        }

        if version_mismatch {
            self.dio_timer
                .hear_inconsistent(&mut self.scheduler, &mut self.rand);
        } else if !changed {
            self.dio_timer.hear_consistent();
        }
    }

    /// A root only keeps track of its neighbors and of the version numbers it hears.
    fn root_hears_dio(
        &mut self,
        src: Ipv6Address,
        dio: &DodagInformationObject,
        rank: Rank,
        version: SequenceCounter,
        metric: Option<u16>,
    ) {
        let own_version = self.dodag.version_number.value();
        let metric_type = self.dodag.metric_type();

        match self.neighbors.find(&src) {
            Some(i) => {
                if let Some(n) = self.neighbors.get_mut(i) {
                    n.set_rank(rank);
                    n.set_version(version);
                    if let Some(value) = metric {
                        n.set_metric(metric_type, value);
                    }
                }
            }
            None => {
                let value = metric.unwrap_or(DEFAULT_METRIC);
                if let Err(e) = self.neighbors.add(src, rank, version, metric_type, value) {
                    net_debug!("cannot add {} to the neighbor table: {}", src, e);
                }
            }
        }

        if compare_sequence(dio.version_number, own_version) == Ordering::Greater {
            // Another node claims a newer version of our own DODAG: overtake it.
            net_debug!(
                "DIO with version {} newer than ours, moving past it",
                dio.version_number
            );
            let mut version = SequenceCounter::new(dio.version_number);
            version.increment();
            self.dodag.version_number = version;
            self.dio_timer.reset(&mut self.scheduler, &mut self.rand);
        } else if dio.version_number != own_version {
            self.dio_timer
                .hear_inconsistent(&mut self.scheduler, &mut self.rand);
        } else {
            self.dio_timer.hear_consistent();
        }
    }

    fn preferred_parent_rank_changed(&mut self, src: Ipv6Address, rank: Rank) {
        if rank.is_infinite() || self.objective.compare_rank(rank, self.dodag.rank) != Ordering::Less
        {
            net_debug!("preferred parent {} now advertises {}, detaching", src, rank);
            self.choose_preferred_parent(ParentChangeCause::ParentLost);
            return;
        }

        let new_rank = self.objective.calculate_rank(&mut self.dodag, &self.neighbors);
        if new_rank.is_infinite() {
            net_debug!("no valid rank through {}, detaching", src);
            self.choose_preferred_parent(ParentChangeCause::ParentLost);
            return;
        }

        if new_rank != self.dodag.rank {
            net_trace!("rank changed from {} to {}", self.dodag.rank, new_rank);
        }
        self.dodag.rank = new_rank;
        self.update_parent_set();
    }

    fn neighbor_qualifies_as_parent(&self, rank: Rank, version: SequenceCounter) -> bool {
        self.dodag.rank.is_infinite()
            || (version == self.dodag.version_number
                && self.objective.compare_rank(rank, self.dodag.rank) == Ordering::Less)
    }

    /// Process an incoming DAO.
    pub(super) fn process_dao(&mut self, src: Ipv6Address, dao: DestinationAdvertisementObject) {
        if !self.connected {
            net_trace!("not part of a DODAG, dropping DAO");
            return;
        }

        if dao.rpl_instance_id != self.dodag.instance_id
            || dao.dodag_id.is_some_and(|id| id != self.dodag.id)
        {
            net_trace!("dropping DAO, wrong DODAG ID/INSTANCE ID");
            return;
        }

        let storing = self.dodag.is_storing();
        match self.dodag.mode_of_operation {
            RplModeOfOperation::NoDownwardRoutesMaintained => {
                net_trace!("dropping DAO, downward routes are not maintained");
                return;
            }
            _ if !storing && !self.is_root => {
                net_trace!("dropping DAO, only the root processes DAOs in non-storing mode");
                return;
            }
            _ => (),
        }

        let metric_type = self.dodag.metric_type();
        let metric = match self.neighbors.find(&src) {
            Some(i) => {
                self.neighbors.refresh(i);
                let sequence = SequenceCounter::new(dao.sequence);
                if let Some(n) = self.neighbors.get_mut(i) {
                    match n.dao_sequence() {
                        Some(last) if last.partial_cmp(&sequence) != Some(Ordering::Less) => {
                            net_trace!("DAO sequence {} from {} is not newer", dao.sequence, src);
                        }
                        _ => n.set_dao_sequence(sequence),
                    }
                }
                self.neighbors
                    .get(i)
                    .map_or(DEFAULT_METRIC, |n| n.metric_value(metric_type))
            }
            // The DAO of a new child may overtake its first DIO.
            None => {
                net_trace!("DAO from {}, not a neighbor yet", src);
                DEFAULT_METRIC
            }
        };

        // Process the targets
        // ===================
        let mut modified = false;

        for target in dao.targets.iter() {
            let Some(transit) = dao.transits.get(target.transit as usize) else {
                net_debug!("DAO target {} without transit information", target.target.prefix);
                continue;
            };
            let prefix = target.target.prefix;

            if prefix == self.address {
                net_debug!("DAO from {} advertises our own address, poisoning", src);
                self.poison();
                continue;
            }

            if transit.path_lifetime == 0 {
                let via = if storing { Some(src) } else { transit.parent_address };
                let current = self.route_next_hop(&target.target);
                if via.is_some() && current.is_some() && current != via {
                    net_trace!("stale No-Path for {} from {}, ignoring", prefix, src);
                    continue;
                }

                net_trace!("{} is no longer reachable through {}", prefix, src);
                self.dao.remove_target(&target.target);
                if !self.is_root {
                    self.dao.withdraw(target.target);
                }
                self.delete_entry(&prefix);
                modified = true;
                continue;
            }

            let next_hop = if storing {
                src
            } else {
                match transit.parent_address {
                    Some(parent) => parent,
                    None => {
                        net_debug!("Parent Address required for MOP1, dropping target {}", prefix);
                        continue;
                    }
                }
            };

            match self.dao.add_or_modify(target.target, *transit) {
                Ok(true) => modified = true,
                Ok(false) => (),
                Err(e) => {
                    net_debug!("cannot cache DAO target {}: {}", prefix, e);
                    continue;
                }
            }

            let cidr = Ipv6Cidr::new(prefix, target.target.prefix_length);
            if self.add_or_modify_entry(cidr, next_hop, metric) {
                modified = true;
            }
        }

        if dao.expect_ack {
            self.send_dao_ack(src, dao.sequence);
        }

        if modified && !self.is_root {
            self.request_dao();
        }
    }

    /// Process an incoming DAO-ACK.
    pub(super) fn process_dao_ack(
        &mut self,
        src: Ipv6Address,
        ack: DestinationAdvertisementObjectAck,
    ) {
        if ack.rpl_instance_id != self.dodag.instance_id {
            net_trace!("dropping DAO-ACK, wrong INSTANCE ID");
            return;
        }

        if self.dao_ack_pending == Some(ack.sequence) {
            net_debug!("DAO {} acknowledged by {} with status {}", ack.sequence, src, ack.status);
            self.dao_ack_pending = None;
            self.last_dao_ack = Some((ack.sequence, ack.status));
        } else {
            net_trace!("unexpected DAO-ACK {} from {}", ack.sequence, src);
        }
    }
}
