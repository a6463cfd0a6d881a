//! Minimum Rank with Hysteresis Objective Function, see [RFC 6719].
//!
//! The rank increase through a neighbor follows the metric type of the DODAG's metric container:
//! a fixed hop for the hop count, the weighted link metric for ETX. A candidate parent replaces
//! the preferred parent only when it is better by more than `PARENT_SWITCH_THRESHOLD`.
//!
//! [RFC 6719]: https://datatracker.ietf.org/doc/html/rfc6719

use core::cmp::Ordering;

use super::consts::{DEFAULT_LINK_METRIC_RANK_WEIGHT, PARENT_SWITCH_THRESHOLD};
use super::dodag::Dodag;
use super::neighbor_table::{Neighbor, NeighborTable};
use super::objective::ObjectiveFunction;
use super::rank::{Rank, INFINITE_RANK};

use crate::wire::rpl::options::MetricType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mrhof {
    link_metric_rank_weight: u16,
    cur_min_path_cost: u16,
}

impl Default for Mrhof {
    fn default() -> Self {
        Self {
            link_metric_rank_weight: DEFAULT_LINK_METRIC_RANK_WEIGHT,
            cur_min_path_cost: 0,
        }
    }
}

impl Mrhof {
    pub(crate) const OCP: u16 = 1;

    /// The path cost through the preferred parent, as of the last rank calculation.
    pub fn cur_min_path_cost(&self) -> u16 {
        self.cur_min_path_cost
    }

    fn rank_increase(&self, dodag: &Dodag, neighbor: &Neighbor) -> u16 {
        match dodag.metric_type() {
            MetricType::HopCount => dodag.min_hop_rank_increase(),
            MetricType::Etx => self
                .link_metric_rank_weight
                .saturating_mul(neighbor.metric_value(MetricType::Etx)),
            other => {
                net_debug!("MRHOF: unsupported metric type {:?}", other);
                dodag.min_hop_rank_increase()
            }
        }
    }

    /// `MinHopRankIncrease * (1 + floor(Rank / MinHopRankIncrease))` of the highest ranked
    /// parent.
    fn max_advertised_rank(dodag: &Dodag, neighbors: &NeighborTable) -> u16 {
        let min_hop = dodag.min_hop_rank_increase() as u32;

        neighbors
            .iter()
            .filter(|n| n.is_parent() && !n.rank().is_infinite())
            .map(|n| n.rank().raw_value())
            .max()
            .map_or(INFINITE_RANK, |rank| {
                let value = min_hop * (1 + rank as u32 / min_hop);
                value.min(INFINITE_RANK as u32) as u16
            })
    }

    /// Rank of the parent with the highest path cost, minus `MaxRankIncrease`.
    fn max_path_cost(&self, dodag: &Dodag, neighbors: &NeighborTable) -> u16 {
        neighbors
            .iter()
            .filter(|n| n.is_parent() && !n.rank().is_infinite())
            .max_by_key(|n| self.increased_rank(dodag, n).raw_value())
            .map_or(INFINITE_RANK, |n| {
                n.rank().raw_value().saturating_sub(dodag.max_rank_increase())
            })
    }
}

impl ObjectiveFunction for Mrhof {
    fn objective_code_point(&self) -> u16 {
        Self::OCP
    }

    fn compare_rank(&self, r1: Rank, r2: Rank) -> Ordering {
        r1.raw_value().cmp(&r2.raw_value())
    }

    fn increased_rank(&self, dodag: &Dodag, neighbor: &Neighbor) -> Rank {
        neighbor
            .rank()
            .saturating_add(self.rank_increase(dodag, neighbor))
    }

    fn best_parent(&self, dodag: &Dodag, neighbors: &NeighborTable, a: usize, b: usize) -> usize {
        let (Some(n1), Some(n2)) = (neighbors.get(a), neighbors.get(b)) else {
            return if neighbors.get(a).is_some() { a } else { b };
        };

        let r1 = self.increased_rank(dodag, n1);
        let r2 = self.increased_rank(dodag, n2);
        let preferred = neighbors.preferred_parent_index();

        if r1.raw_value().abs_diff(r2.raw_value()) < PARENT_SWITCH_THRESHOLD {
            if preferred == Some(a) {
                return a;
            } else if preferred == Some(b) {
                return b;
            }
        }

        match self.compare_rank(r1, r2) {
            Ordering::Greater => b,
            Ordering::Less => a,
            Ordering::Equal if preferred == Some(a) => a,
            Ordering::Equal => b,
        }
    }

    fn calculate_rank(&mut self, dodag: &mut Dodag, neighbors: &NeighborTable) -> Rank {
        let Some(parent) = neighbors.preferred_parent() else {
            self.cur_min_path_cost = INFINITE_RANK;
            return dodag.infinite_rank();
        };

        if parent.rank().is_infinite() {
            net_debug!("MRHOF: preferred parent {} has infinite rank", parent.address());
            self.cur_min_path_cost = INFINITE_RANK;
            return dodag.infinite_rank();
        }

        let parent_rank = parent.rank().raw_value();
        let increased = self.increased_rank(dodag, parent);
        let floor = parent.rank().saturating_add(dodag.min_hop_rank_increase());
        let mut new_rank = if floor.raw_value() > increased.raw_value() {
            floor
        } else {
            increased
        };

        // No more than MaxRankIncrease above the lowest rank advertised so far.
        let min_advertised = dodag.min_advertised_rank;
        if !new_rank.is_infinite() && !min_advertised.is_infinite() {
            let bound = min_advertised
                .raw_value()
                .saturating_add(dodag.max_rank_increase());
            if new_rank.raw_value() > bound {
                net_debug!(
                    "MRHOF: {} exceeds the lowest advertised {} by too much",
                    new_rank,
                    min_advertised
                );
                new_rank = dodag.infinite_rank();
            }
        }

        if !new_rank.is_infinite() && new_rank.raw_value() < min_advertised.raw_value() {
            dodag.min_advertised_rank = new_rank;
        }

        self.cur_min_path_cost = new_rank.raw_value();
        net_trace!(
            "MRHOF: parent rank {} gives path cost {}",
            parent_rank,
            self.cur_min_path_cost
        );

        if new_rank.is_infinite() {
            return new_rank;
        }

        let advertised = self
            .cur_min_path_cost
            .max(Self::max_advertised_rank(dodag, neighbors))
            .max(self.max_path_cost(dodag, neighbors));

        dodag.rank_from_raw(advertised.min(INFINITE_RANK))
    }

    fn reset(&mut self) {
        self.cur_min_path_cost = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::super::objective::test_support::{dodag, neighbor};
    use super::*;

    #[test]
    fn hop_count_increase() {
        let dodag = dodag(MetricType::HopCount);
        let mut table = NeighborTable::new(30, 60);
        let n = neighbor(&mut table, 1, 1, MetricType::HopCount, 1);

        let of = Mrhof::default();
        assert_eq!(
            of.increased_rank(&dodag, table.get(n).unwrap())
                .raw_value(),
            257
        );
    }

    #[test]
    fn etx_increase() {
        let dodag = dodag(MetricType::Etx);
        let mut table = NeighborTable::new(30, 60);
        let n = neighbor(&mut table, 1, 256, MetricType::Etx, 384);
        let other = neighbor(&mut table, 2, 256, MetricType::HopCount, 3);

        let of = Mrhof::default();
        assert_eq!(
            of.increased_rank(&dodag, table.get(n).unwrap())
                .raw_value(),
            256 + 384
        );
        // No ETX advertised: default metric.
        assert_eq!(
            of.increased_rank(&dodag, table.get(other).unwrap())
                .raw_value(),
            257
        );
    }

    #[test]
    fn hysteresis() {
        let dodag = dodag(MetricType::Etx);
        let mut table = NeighborTable::new(30, 60);
        let current = neighbor(&mut table, 1, 256, MetricType::Etx, 512);
        let slightly_better = neighbor(&mut table, 2, 256, MetricType::Etx, 400);
        let much_better = neighbor(&mut table, 3, 256, MetricType::Etx, 256);

        let of = Mrhof::default();
        assert_eq!(
            of.best_parent(&dodag, &table, current, slightly_better),
            slightly_better
        );

        table.set_preferred_parent(Some(current));
        assert_eq!(
            of.best_parent(&dodag, &table, slightly_better, current),
            current
        );
        assert_eq!(
            of.best_parent(&dodag, &table, current, much_better),
            much_better
        );
    }

    #[test]
    fn calculate_rank_hop_count() {
        let mut dodag = dodag(MetricType::HopCount);
        let mut table = NeighborTable::new(30, 60);
        let root = neighbor(&mut table, 1, 1, MetricType::HopCount, 1);
        table.set_preferred_parent(Some(root));

        let mut of = Mrhof::default();
        let rank = of.calculate_rank(&mut dodag, &table);
        assert_eq!(rank.raw_value(), 257);
        assert_eq!(dodag.min_advertised_rank.raw_value(), 257);
        assert_eq!(of.cur_min_path_cost(), 257);

        of.reset();
        assert_eq!(of.cur_min_path_cost(), 0);
    }

    #[test]
    fn calculate_rank_covers_parent_set() {
        let mut dodag = dodag(MetricType::HopCount);
        let mut table = NeighborTable::new(30, 60);
        let near = neighbor(&mut table, 1, 256, MetricType::HopCount, 1);
        let far = neighbor(&mut table, 2, 700, MetricType::HopCount, 1);
        table.get_mut(far).unwrap().set_is_parent(true);
        table.set_preferred_parent(Some(near));

        let mut of = Mrhof::default();
        // 256 * (1 + 700 / 256) = 768
        assert_eq!(of.calculate_rank(&mut dodag, &table).raw_value(), 768);
    }

    #[test]
    fn calculate_rank_bounded_by_max_rank_increase() {
        let mut dodag = dodag(MetricType::HopCount);
        dodag.min_advertised_rank = Rank::new(257, 256);

        let mut table = NeighborTable::new(30, 60);
        let deep = neighbor(&mut table, 1, 1500, MetricType::HopCount, 1);
        table.set_preferred_parent(Some(deep));

        let mut of = Mrhof::default();
        assert!(of.calculate_rank(&mut dodag, &table).is_infinite());
        assert_eq!(dodag.min_advertised_rank.raw_value(), 257);
    }

    #[test]
    fn calculate_rank_without_parent() {
        let mut dodag = dodag(MetricType::HopCount);
        let table = NeighborTable::new(30, 60);

        let mut of = Mrhof::default();
        assert!(of.calculate_rank(&mut dodag, &table).is_infinite());
    }
}
