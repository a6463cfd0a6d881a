use core::cmp::Ordering;

use super::dodag::Dodag;
use super::mrhof::Mrhof;
use super::neighbor_table::{Neighbor, NeighborTable};
use super::of0::ObjectiveFunction0;
use super::rank::Rank;

pub(crate) trait ObjectiveFunction {
    /// Return the Objective Code Point of the function.
    fn objective_code_point(&self) -> u16;

    /// Compare two ranks in the way the function orders candidates.
    fn compare_rank(&self, r1: Rank, r2: Rank) -> Ordering {
        r1.cmp(&r2)
    }

    /// The rank this node would have with `neighbor` as preferred parent.
    fn increased_rank(&self, dodag: &Dodag, neighbor: &Neighbor) -> Rank;

    /// Return the better of the neighbors at index `a` and `b`.
    fn best_parent(&self, dodag: &Dodag, neighbors: &NeighborTable, a: usize, b: usize) -> usize;

    /// Compute the rank to advertise through the current preferred parent.
    ///
    /// Returns the infinite rank when there is no preferred parent.
    fn calculate_rank(&mut self, dodag: &mut Dodag, neighbors: &NeighborTable) -> Rank;

    /// Forget the state accumulated while being attached to the DODAG.
    fn reset(&mut self) {}
}

/// The objective functions this node can run, selected by Objective Code Point.
#[derive(Debug)]
pub(crate) enum Objective {
    Zero(ObjectiveFunction0),
    Mrhof(Mrhof),
}

impl Objective {
    /// The objective function for `ocp`, if it is supported.
    pub(crate) fn from_ocp(ocp: u16) -> Option<Self> {
        match ocp {
            ObjectiveFunction0::OCP => Some(Self::Zero(ObjectiveFunction0)),
            Mrhof::OCP => Some(Self::Mrhof(Mrhof::default())),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn ObjectiveFunction {
        match self {
            Self::Zero(of) => of,
            Self::Mrhof(of) => of,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ObjectiveFunction {
        match self {
            Self::Zero(of) => of,
            Self::Mrhof(of) => of,
        }
    }
}

impl ObjectiveFunction for Objective {
    fn objective_code_point(&self) -> u16 {
        self.inner().objective_code_point()
    }

    fn compare_rank(&self, r1: Rank, r2: Rank) -> Ordering {
        self.inner().compare_rank(r1, r2)
    }

    fn increased_rank(&self, dodag: &Dodag, neighbor: &Neighbor) -> Rank {
        self.inner().increased_rank(dodag, neighbor)
    }

    fn best_parent(&self, dodag: &Dodag, neighbors: &NeighborTable, a: usize, b: usize) -> usize {
        self.inner().best_parent(dodag, neighbors, a, b)
    }

    fn calculate_rank(&mut self, dodag: &mut Dodag, neighbors: &NeighborTable) -> Rank {
        self.inner_mut().calculate_rank(dodag, neighbors)
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }
}
