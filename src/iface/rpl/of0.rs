//! Objective Function Zero, see [RFC 6552].
//!
//! [RFC 6552]: https://datatracker.ietf.org/doc/html/rfc6552

use core::cmp::Ordering;

use super::dodag::Dodag;
use super::neighbor_table::{Neighbor, NeighborTable};
use super::objective::ObjectiveFunction;
use super::rank::Rank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectiveFunction0;

impl ObjectiveFunction0 {
    pub(crate) const OCP: u16 = 0;

    const RANK_STRETCH: u16 = 0;
    const RANK_FACTOR: u16 = 1;
    const RANK_STEP: u16 = 1;

    fn rank_increase(min_hop_rank_increase: u16) -> u16 {
        (Self::RANK_FACTOR * Self::RANK_STEP + Self::RANK_STRETCH) * min_hop_rank_increase
    }
}

impl ObjectiveFunction for ObjectiveFunction0 {
    fn objective_code_point(&self) -> u16 {
        Self::OCP
    }

    fn increased_rank(&self, dodag: &Dodag, neighbor: &Neighbor) -> Rank {
        neighbor
            .rank()
            .saturating_add(Self::rank_increase(dodag.min_hop_rank_increase()))
    }

    fn best_parent(&self, dodag: &Dodag, neighbors: &NeighborTable, a: usize, b: usize) -> usize {
        let (Some(n1), Some(n2)) = (neighbors.get(a), neighbors.get(b)) else {
            return if neighbors.get(a).is_some() { a } else { b };
        };

        let r1 = self.increased_rank(dodag, n1);
        let r2 = self.increased_rank(dodag, n2);

        match self.compare_rank(r1, r2) {
            Ordering::Less => a,
            Ordering::Greater => b,
            Ordering::Equal if neighbors.preferred_parent_index() == Some(a) => a,
            Ordering::Equal => b,
        }
    }

    fn calculate_rank(&mut self, dodag: &mut Dodag, neighbors: &NeighborTable) -> Rank {
        match neighbors.preferred_parent() {
            Some(parent) => self.increased_rank(dodag, parent),
            None => dodag.infinite_rank(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::objective::test_support::{dodag, neighbor};
    use super::*;
    use crate::wire::rpl::options::MetricType;

    #[test]
    fn rank_increase() {
        let dodag = dodag(MetricType::HopCount);
        let mut table = NeighborTable::new(30, 60);
        let root = neighbor(&mut table, 1, 1, MetricType::HopCount, 1);
        let other = neighbor(&mut table, 2, 1024, MetricType::HopCount, 1);

        let of = ObjectiveFunction0;
        assert_eq!(
            of.increased_rank(&dodag, table.get(root).unwrap())
                .raw_value(),
            257
        );
        assert_eq!(
            of.increased_rank(&dodag, table.get(other).unwrap())
                .raw_value(),
            1024 + 256
        );
    }

    #[test]
    fn rank_increase_saturates() {
        let dodag = dodag(MetricType::HopCount);
        let mut table = NeighborTable::new(30, 60);
        let far = neighbor(&mut table, 1, 0xff00, MetricType::HopCount, 1);

        let of = ObjectiveFunction0;
        assert!(of
            .increased_rank(&dodag, table.get(far).unwrap())
            .is_infinite());
    }

    #[test]
    fn best_parent() {
        let dodag = dodag(MetricType::HopCount);
        let mut table = NeighborTable::new(30, 60);
        let a = neighbor(&mut table, 1, 512, MetricType::HopCount, 1);
        let b = neighbor(&mut table, 2, 256, MetricType::HopCount, 1);
        let c = neighbor(&mut table, 3, 300, MetricType::HopCount, 1);

        let of = ObjectiveFunction0;
        assert_eq!(of.best_parent(&dodag, &table, a, b), b);
        assert_eq!(of.best_parent(&dodag, &table, b, a), b);

        // b and c share a DAG rank: the preferred parent wins the tie.
        assert_eq!(of.best_parent(&dodag, &table, b, c), c);
        table.set_preferred_parent(Some(b));
        assert_eq!(of.best_parent(&dodag, &table, b, c), b);
        assert_eq!(of.best_parent(&dodag, &table, c, b), b);
    }

    #[test]
    fn calculate_rank() {
        let mut dodag = dodag(MetricType::HopCount);
        let mut table = NeighborTable::new(30, 60);
        let root = neighbor(&mut table, 1, 1, MetricType::HopCount, 1);

        let mut of = ObjectiveFunction0;
        assert!(of.calculate_rank(&mut dodag, &table).is_infinite());

        table.set_preferred_parent(Some(root));
        assert_eq!(of.calculate_rank(&mut dodag, &table).raw_value(), 257);
    }
}
