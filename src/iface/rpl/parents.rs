use core::cmp::Ordering;

use super::consts::DEFAULT_METRIC;
use super::lollipop::SequenceCounter;
use super::objective::ObjectiveFunction;
use super::{ParentChangeCause, Rpl, Scheduler, Transport};

use crate::iface::route::{Route, RouteTable};
use crate::wire::rpl::options::RplTarget;
use crate::wire::{Ipv6Address, Ipv6Cidr, RplTransitInformation};

fn is_newer(a: SequenceCounter, b: SequenceCounter) -> bool {
    a.partial_cmp(&b) == Some(Ordering::Greater)
}

impl<T: Transport, S: Scheduler> Rpl<T, S> {
    /// Select the preferred parent among the neighbors and update everything depending on it:
    /// the rank, the default route and the DAO cache.
    pub(crate) fn choose_preferred_parent(&mut self, cause: ParentChangeCause) {
        if self.is_root {
            return;
        }

        let old_version = self.dodag.version_number;
        let old_parent = self.parent();
        let was_connected = self.connected;

        match cause {
            ParentChangeCause::ParentLost => {
                if let Some(i) = self.neighbors.preferred_parent_index() {
                    self.neighbors.remove(i);
                    if self.clean_dao() {
                        self.request_dao();
                    }
                }
            }
            ParentChangeCause::NewVersion => {
                self.neighbors.set_preferred_parent(None);
            }
            ParentChangeCause::None => (),
        }

        let best = self.best_candidate();
        self.neighbors.set_preferred_parent(best);

        let parent = self.parent();
        if let Some(version) = self.neighbors.preferred_parent().map(|p| p.version()) {
            if version != old_version {
                net_debug!("moving to DODAG version {}", version.value());
                self.dodag.version_number = version;
                self.dodag.min_advertised_rank = self.dodag.infinite_rank();
                self.dio_timer.reset(&mut self.scheduler, &mut self.rand);
            }
        }

        if parent != old_parent {
            net_debug!("preferred parent changed from {:?} to {:?}", old_parent, parent);
            self.dio_timer.reset(&mut self.scheduler, &mut self.rand);
            if was_connected && old_parent.is_some() {
                self.poison_sub_dag = true;
            }
        }

        let Some(parent) = parent else {
            self.detach(was_connected);
            return;
        };

        let old_rank = self.dodag.rank;
        let new_rank = self
            .objective
            .calculate_rank(&mut self.dodag, &self.neighbors);
        if new_rank.is_infinite() {
            net_debug!("no valid rank through {}", parent);
            self.neighbors.set_preferred_parent(None);
            self.detach(was_connected);
            return;
        }

        self.connected = true;
        self.dodag.rank = new_rank;

        if old_rank.raw_value() < new_rank.raw_value() {
            // Children may route through us with a rank that is no longer valid.
            net_debug!("rank increased from {} to {}", old_rank, new_rank);
            self.empty_dao();
            self.poison();
            self.request_dao();
        } else if Some(parent) == old_parent {
            self.update_parent_set();
            return;
        }

        let metric_type = self.dodag.metric_type();
        let metric = self
            .neighbors
            .preferred_parent()
            .map_or(DEFAULT_METRIC, |p| p.metric_value(metric_type));
        self.routes.delete_route(&parent);
        self.routes.update_default_route(parent, metric);

        // Advertise our own address through the new parent.
        self.path_sequence.increment();
        let transit = RplTransitInformation {
            external: false,
            path_control: 0,
            path_sequence: self.path_sequence.value(),
            path_lifetime: self.dodag.configuration.default_lifetime,
            parent_address: (!self.dodag.is_storing()).then_some(parent),
        };
        let own = RplTarget {
            prefix_length: 128,
            prefix: self.address,
        };

        match self.dao.add_or_modify(own, transit) {
            Ok(true) => self.request_dao(),
            Ok(false) => (),
            Err(e) => net_debug!("cannot cache our own DAO target: {}", e),
        }

        self.update_parent_set();
    }

    /// The best neighbor to become preferred parent.
    ///
    /// With a preferred parent in place, only members of the parent set are candidates. Without
    /// one, only neighbors with a lower rank than ours are. Right after losing the preferred
    /// parent that is still the rank we had through it. Once detached our rank is infinite and
    /// every neighbor with a finite rank qualifies, which is why a detached node only joins again
    /// after its poison DIO went out.
    fn best_candidate(&self) -> Option<usize> {
        let has_parent = self.neighbors.preferred_parent_index().is_some();
        let own_version = self.dodag.version_number;
        let mut best: Option<usize> = None;

        for (i, n) in self.neighbors.iter().enumerate() {
            if n.rank().is_infinite() {
                continue;
            }

            let eligible = if has_parent {
                n.is_parent()
            } else {
                self.objective.compare_rank(n.rank(), self.dodag.rank) == Ordering::Less
            };
            if !eligible {
                continue;
            }

            let Some((b, best_version)) =
                best.and_then(|b| self.neighbors.get(b).map(|n| (b, n.version())))
            else {
                best = Some(i);
                continue;
            };

            if n.version() == best_version {
                best = Some(
                    self.objective
                        .best_parent(&self.dodag, &self.neighbors, b, i),
                );
            } else if is_newer(best_version, own_version)
                && (n.version() == own_version || is_newer(n.version(), best_version))
            {
                // Stay in the current version unless nothing else is left.
                best = Some(i);
            }
        }

        best
    }

    /// Leave the DODAG after the last candidate parent is gone.
    fn detach(&mut self, was_connected: bool) {
        self.connected = false;
        self.objective.reset();

        if was_connected {
            net_debug!("detached from DODAG {}", self.dodag.id);
            self.dodag.rank = self.dodag.infinite_rank();
            self.routes.delete_default_route();
            self.empty_dao();
            self.poison();
        }

        self.update_parent_set();
    }

    /// Recompute the parent flag of every neighbor.
    ///
    /// Returns `true` when the preferred parent no longer qualifies as a parent.
    pub(crate) fn update_parent_set(&mut self) -> bool {
        let rank = self.dodag.rank;
        let version = self.dodag.version_number;
        let preferred = self.neighbors.preferred_parent_index();
        let mut lost = false;

        let objective = &self.objective;
        for (i, n) in self.neighbors.iter_mut().enumerate() {
            let is_parent = rank.is_infinite()
                || (n.version() == version
                    && objective.compare_rank(n.rank(), rank) == Ordering::Less);

            if Some(i) == preferred && !is_parent {
                lost = true;
            }
            n.set_is_parent(is_parent);
        }

        lost
    }

    /// Drop the cached targets whose next hop is no longer a neighbor.
    ///
    /// Returns `true` when something was removed.
    pub(crate) fn clean_dao(&mut self) -> bool {
        if !self.dodag.is_storing() {
            return false;
        }

        let mut stale: heapless::Vec<RplTarget, { crate::wire::rpl::MAX_RPL_TARGETS }> =
            heapless::Vec::new();
        for (target, _) in self.dao.iter() {
            if target.prefix == self.address {
                continue;
            }

            let reachable = self
                .route_next_hop(&target)
                .is_some_and(|next_hop| self.neighbors.find(&next_hop).is_some());
            if !reachable {
                let _ = stale.push(target);
            }
        }

        for target in stale.iter() {
            net_trace!("{} is unreachable, withdrawing", target.prefix);
            self.delete_entry(&target.prefix);
            self.dao.remove_target(target);
            if !self.is_root {
                self.dao.withdraw(*target);
            }
        }

        !stale.is_empty()
    }

    /// The next hop of the route installed for exactly `target`, the default route excluded.
    pub(crate) fn route_next_hop(&self, target: &RplTarget) -> Option<Ipv6Address> {
        self.routes
            .routes()
            .iter()
            .find(|r| {
                r.cidr.address() == target.prefix && r.cidr.prefix_len() == target.prefix_length
            })
            .map(|r| r.next_hop)
    }

    /// Remove every downward route and withdraw it.
    pub(crate) fn empty_dao(&mut self) {
        let mut targets: heapless::Vec<RplTarget, { crate::wire::rpl::MAX_RPL_TARGETS }> =
            heapless::Vec::new();
        for (target, _) in self.dao.iter() {
            if target.prefix != self.address {
                let _ = targets.push(target);
            }
        }

        for target in targets.iter() {
            self.delete_entry(&target.prefix);
            self.dao.remove_target(target);
            if !self.is_root {
                self.dao.withdraw(*target);
            }
        }
    }

    /// Install or update the route to `cidr`. Returns `true` when the next hop changed.
    pub(crate) fn add_or_modify_entry(
        &mut self,
        cidr: Ipv6Cidr,
        next_hop: Ipv6Address,
        metric: u16,
    ) -> bool {
        match self.routes.modify_route(Route::new(cidr, next_hop, metric)) {
            Ok(None) => true,
            Ok(Some(old)) => old.next_hop != next_hop,
            Err(e) => {
                net_debug!("cannot add route to {}: {}", cidr, e);
                false
            }
        }
    }

    pub(crate) fn delete_entry(&mut self, address: &Ipv6Address) -> bool {
        self.routes.delete_route(address)
    }
}
