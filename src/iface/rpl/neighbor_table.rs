//! The neighbor table of RPL.
//!
//! The table is a dense vector. Removing a neighbor moves the last neighbor into the freed slot,
//! so an index is only valid until the next removal.

use super::consts::{DEFAULT_METRIC, RPL_NEIGHBOR_TABLE_SIZE};
use super::lollipop::SequenceCounter;
use super::rank::Rank;

use crate::wire::rpl::options::MetricType;
use crate::wire::Ipv6Address;

/// Adding a neighbor failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NeighborTableError {
    /// The table holds its maximum number of neighbors.
    Full,
    /// A neighbor with the same address is already present.
    Duplicate,
}

impl core::fmt::Display for NeighborTableError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => write!(f, "neighbor table full"),
            Self::Duplicate => write!(f, "duplicate neighbor"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NeighborTableError {}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Neighbor {
    address: Ipv6Address,
    rank: Rank,
    version: SequenceCounter,
    metric_type: MetricType,
    metric_value: u16,
    is_parent: bool,
    /// Remaining lifetime in neighbor ticks.
    lifetime: u32,
    dao_sequence: Option<SequenceCounter>,
}

impl Neighbor {
    pub fn address(&self) -> Ipv6Address {
        self.address
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn version(&self) -> SequenceCounter {
        self.version
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    /// The advertised metric if it is of type `metric_type`, the default metric otherwise.
    pub fn metric_value(&self, metric_type: MetricType) -> u16 {
        if self.metric_type == metric_type {
            self.metric_value
        } else {
            DEFAULT_METRIC
        }
    }

    pub fn is_parent(&self) -> bool {
        self.is_parent
    }

    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    pub fn dao_sequence(&self) -> Option<SequenceCounter> {
        self.dao_sequence
    }

    pub(crate) fn set_rank(&mut self, rank: Rank) {
        self.rank = rank;
    }

    pub(crate) fn set_version(&mut self, version: SequenceCounter) {
        self.version = version;
    }

    pub(crate) fn set_metric(&mut self, metric_type: MetricType, value: u16) {
        self.metric_type = metric_type;
        self.metric_value = value;
    }

    pub(crate) fn set_is_parent(&mut self, is_parent: bool) {
        self.is_parent = is_parent;
    }

    pub(crate) fn set_dao_sequence(&mut self, sequence: SequenceCounter) {
        self.dao_sequence = Some(sequence);
    }
}

#[derive(Debug)]
pub struct NeighborTable {
    neighbors: heapless::Vec<Neighbor, RPL_NEIGHBOR_TABLE_SIZE>,
    preferred_parent: Option<usize>,
    /// Lifetime in ticks given to a neighbor when it is added or refreshed.
    lifetime: u32,
}

impl NeighborTable {
    pub(crate) fn new(default_lifetime: u8, lifetime_unit: u16) -> Self {
        Self {
            neighbors: heapless::Vec::new(),
            preferred_parent: None,
            lifetime: default_lifetime as u32 * lifetime_unit as u32,
        }
    }

    /// Change the lifetime given to neighbors from now on.
    pub(crate) fn set_lifetime(&mut self, default_lifetime: u8, lifetime_unit: u16) {
        self.lifetime = default_lifetime as u32 * lifetime_unit as u32;
    }

    /// Add a neighbor and return its index.
    pub(crate) fn add(
        &mut self,
        address: Ipv6Address,
        rank: Rank,
        version: SequenceCounter,
        metric_type: MetricType,
        metric_value: u16,
    ) -> Result<usize, NeighborTableError> {
        if self.neighbors.is_full() {
            return Err(NeighborTableError::Full);
        }

        if self.find(&address).is_some() {
            return Err(NeighborTableError::Duplicate);
        }

        let neighbor = Neighbor {
            address,
            rank,
            version,
            metric_type,
            metric_value,
            is_parent: false,
            lifetime: self.lifetime,
            dao_sequence: None,
        };

        self.neighbors
            .push(neighbor)
            .map_err(|_| NeighborTableError::Full)?;

        net_trace!("neighbor {} added with {}", address, rank);

        Ok(self.neighbors.len() - 1)
    }

    /// Remove the neighbor at `index`.
    ///
    /// The last neighbor takes its slot, and the preferred parent index follows it.
    pub(crate) fn remove(&mut self, index: usize) -> Option<Neighbor> {
        if index >= self.neighbors.len() {
            return None;
        }

        let last = self.neighbors.len() - 1;
        let removed = self.neighbors.swap_remove(index);

        self.preferred_parent = match self.preferred_parent {
            Some(p) if p == index => None,
            Some(p) if p == last => Some(index),
            p => p,
        };

        net_trace!("neighbor {} removed", removed.address);

        Some(removed)
    }

    pub(crate) fn clear(&mut self) {
        self.neighbors.clear();
        self.preferred_parent = None;
    }

    pub fn find(&self, address: &Ipv6Address) -> Option<usize> {
        self.neighbors.iter().position(|n| n.address == *address)
    }

    pub fn get(&self, index: usize) -> Option<&Neighbor> {
        self.neighbors.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Neighbor> {
        self.neighbors.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Neighbor> {
        self.neighbors.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Neighbor> {
        self.neighbors.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn preferred_parent_index(&self) -> Option<usize> {
        self.preferred_parent
    }

    pub fn preferred_parent(&self) -> Option<&Neighbor> {
        self.preferred_parent.and_then(|i| self.neighbors.get(i))
    }

    /// Designate the neighbor at `index` as preferred parent, or clear the designation.
    ///
    /// Returns `false` when `index` does not point to a neighbor.
    pub(crate) fn set_preferred_parent(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(i) => match self.neighbors.get_mut(i) {
                Some(n) => {
                    n.is_parent = true;
                    self.preferred_parent = Some(i);
                    true
                }
                None => false,
            },
            None => {
                self.preferred_parent = None;
                true
            }
        }
    }

    /// Restore the full lifetime of the neighbor at `index`.
    pub(crate) fn refresh(&mut self, index: usize) {
        let lifetime = self.lifetime;
        if let Some(n) = self.neighbors.get_mut(index) {
            n.lifetime = lifetime;
        }
    }

    /// Shorten the lifetime of the neighbor at `index`. Returns `false` when nothing is left.
    pub(crate) fn reduce_lifetime(&mut self, index: usize, amount: u32) -> bool {
        match self.neighbors.get_mut(index) {
            Some(n) => {
                n.lifetime = n.lifetime.saturating_sub(amount);
                n.lifetime > 0
            }
            None => false,
        }
    }

    /// Age every neighbor by one tick and evict the ones that expired.
    ///
    /// Returns `true` when the preferred parent was among the evicted neighbors.
    pub(crate) fn reduce_global_expire_time(&mut self) -> bool {
        let had_parent = self.preferred_parent.is_some();

        for n in self.neighbors.iter_mut() {
            n.lifetime = n.lifetime.saturating_sub(1);
        }

        let mut i = 0;
        while i < self.neighbors.len() {
            if self.neighbors[i].lifetime == 0 {
                net_debug!("neighbor {} expired", self.neighbors[i].address);
                self.remove(i);
            } else {
                i += 1;
            }
        }

        had_parent && self.preferred_parent.is_none()
    }
}
