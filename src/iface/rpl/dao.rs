//! Cache of the downward routes this node advertises to its parents.
//!
//! Every target refers to a transit information by index. Identical transits are shared between
//! targets and a transit is dropped together with the last target referring to it.

use super::lollipop::SequenceCounter;

use crate::wire::rpl::options::{Repr as OptionRepr, RplTarget};
use crate::wire::rpl::{DaoTarget, DestinationAdvertisementObject};
use crate::wire::rpl::{MAX_DAO_TRANSIENT_INFOS, MAX_LENGTH, MAX_RPL_TARGETS};
use crate::wire::{Ipv6Address, RplInstanceId, RplTransitInformation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DaoCacheError {
    TargetsFull,
    TransitsFull,
}

impl core::fmt::Display for DaoCacheError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::TargetsFull => write!(f, "DAO target table full"),
            Self::TransitsFull => write!(f, "DAO transit information table full"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DaoCacheError {}

#[derive(Debug, Default)]
pub struct DaoCache {
    targets: heapless::Vec<(RplTarget, u8), MAX_RPL_TARGETS>,
    transits: heapless::Vec<RplTransitInformation, MAX_DAO_TRANSIENT_INFOS>,
    /// Targets to advertise with a zero lifetime in the next DAO.
    withdrawn: heapless::Vec<RplTarget, MAX_RPL_TARGETS>,
    sequence: SequenceCounter,
}

impl DaoCache {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn find(&self, target: &RplTarget) -> Option<usize> {
        self.targets.iter().position(|(t, _)| t == target)
    }

    /// The target at `index` with its transit information.
    pub fn get(&self, index: usize) -> Option<(RplTarget, RplTransitInformation)> {
        let (target, transit) = self.targets.get(index)?;
        Some((*target, *self.transits.get(*transit as usize)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (RplTarget, RplTransitInformation)> + '_ {
        (0..self.targets.len()).filter_map(|i| self.get(i))
    }

    pub fn withdrawn(&self) -> &[RplTarget] {
        &self.withdrawn
    }

    /// Insert `target`, or change the transit of a cached target.
    ///
    /// Returns `true` when the cache changed.
    pub(crate) fn add_or_modify(
        &mut self,
        target: RplTarget,
        transit: RplTransitInformation,
    ) -> Result<bool, DaoCacheError> {
        let previous = match self.find(&target) {
            Some(i) => {
                let (_, old) = self.get(i).ok_or(DaoCacheError::TransitsFull)?;
                if old == transit {
                    return Ok(false);
                }
                self.remove(i);
                Some(old)
            }
            None => None,
        };

        match self.insert(target, transit) {
            Ok(()) => {
                self.withdrawn.retain(|t| *t != target);
                Ok(true)
            }
            Err(e) => {
                // The previous transit is still shared with another target, so this succeeds.
                if let Some(old) = previous {
                    let _ = self.insert(target, old);
                }
                Err(e)
            }
        }
    }

    fn insert(
        &mut self,
        target: RplTarget,
        transit: RplTransitInformation,
    ) -> Result<(), DaoCacheError> {
        if self.targets.is_full() {
            return Err(DaoCacheError::TargetsFull);
        }

        let index = match self.transits.iter().position(|t| *t == transit) {
            Some(i) => i,
            None => {
                self.transits
                    .push(transit)
                    .map_err(|_| DaoCacheError::TransitsFull)?;
                self.transits.len() - 1
            }
        };

        self.targets
            .push((target, index as u8))
            .map_err(|_| DaoCacheError::TargetsFull)
    }

    /// Remove the target at `index`. The last target takes its slot.
    pub(crate) fn remove(&mut self, index: usize) -> bool {
        if index >= self.targets.len() {
            return false;
        }

        let (_, transit) = self.targets.swap_remove(index);

        if self.targets.iter().all(|(_, t)| *t != transit) {
            let last = (self.transits.len() - 1) as u8;
            self.transits.swap_remove(transit as usize);

            for (_, t) in self.targets.iter_mut() {
                if *t == last {
                    *t = transit;
                }
            }
        }

        true
    }

    pub(crate) fn remove_target(&mut self, target: &RplTarget) -> bool {
        match self.find(target) {
            Some(i) => self.remove(i),
            None => false,
        }
    }

    /// Remember `target` to be advertised as unreachable with the next DAO.
    pub(crate) fn withdraw(&mut self, target: RplTarget) {
        if !self.withdrawn.contains(&target) && self.withdrawn.push(target).is_err() {
            net_debug!("DAO: too many withdrawn targets, dropping {}", target.prefix);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.targets.clear();
        self.transits.clear();
        self.withdrawn.clear();
    }

    /// Increment the DAO sequence number and return it.
    pub(crate) fn next_sequence(&mut self) -> u8 {
        self.sequence.increment();
        self.sequence.value()
    }

    pub fn sequence(&self) -> u8 {
        self.sequence.value()
    }

    /// Number of targets a full advertisement covers: the cached ones and the withdrawn ones.
    pub(crate) fn advertised_len(&self) -> usize {
        self.targets.len() + self.withdrawn.len()
    }

    /// The cached targets grouped by transit, followed by the withdrawn targets. Withdrawn
    /// targets have no transit of their own.
    fn entries(&self) -> impl Iterator<Item = (RplTarget, Option<u8>)> + '_ {
        (0..self.transits.len() as u8)
            .flat_map(move |transit| {
                self.targets
                    .iter()
                    .filter(move |(_, t)| *t == transit)
                    .map(move |(target, _)| (*target, Some(transit)))
            })
            .chain(self.withdrawn.iter().map(|target| (*target, None)))
    }

    /// Build a DAO holding the entries from `start` on, as many as fit into [MAX_LENGTH] bytes.
    ///
    /// Withdrawn targets come last and use `no_path` as transit. Returns the DAO together with
    /// the position the next DAO has to start from. Nothing is forgotten here, see
    /// [DaoCache::withdrawal_sent].
    pub(crate) fn to_repr(
        &self,
        rpl_instance_id: RplInstanceId,
        expect_ack: bool,
        sequence: u8,
        dodag_id: Option<Ipv6Address>,
        no_path: RplTransitInformation,
        start: usize,
    ) -> (DestinationAdvertisementObject, usize) {
        let mut dao = DestinationAdvertisementObject {
            rpl_instance_id,
            expect_ack,
            sequence,
            dodag_id,
            targets: heapless::Vec::new(),
            transits: heapless::Vec::new(),
        };

        let mut len = if dodag_id.is_some() { 20 } else { 4 };
        let mut current: Option<(Option<u8>, u8)> = None;
        let mut next = start;

        for (target, transit) in self.entries().skip(start) {
            let info = match transit {
                Some(i) => self.transits[i as usize],
                None => no_path,
            };

            // Targets sharing a transit must be consecutive.
            let new_transit = current.map_or(true, |(t, _)| t != transit);

            let mut needed = OptionRepr::RplTarget(target).buffer_len();
            if new_transit {
                needed += OptionRepr::TransitInformation(info).buffer_len();
            }

            if len + needed > MAX_LENGTH
                || dao.targets.is_full()
                || (new_transit && dao.transits.is_full())
            {
                break;
            }

            let index = match current {
                Some((t, index)) if t == transit => index,
                _ => {
                    let index = dao.transits.len() as u8;
                    let _ = dao.transits.push(info);
                    current = Some((transit, index));
                    index
                }
            };

            let _ = dao.targets.push(DaoTarget {
                target,
                transit: index,
            });
            len += needed;
            next += 1;
        }

        (dao, next)
    }

    /// Forget the withdrawn targets a DAO ending at `end` carried, once it was handed to the
    /// transport.
    pub(crate) fn withdrawal_sent(&mut self, end: usize) {
        let count = end
            .saturating_sub(self.targets.len())
            .min(self.withdrawn.len());
        for _ in 0..count {
            self.withdrawn.remove(0);
        }
    }
}
