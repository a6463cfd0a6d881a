use super::consts::*;
use super::lollipop::SequenceCounter;
use super::rank::Rank;

use crate::wire::rpl::options::MetricType;
use crate::wire::{
    Ipv6Address, RplDagMetricContainer, RplDodagConfiguration, RplInstanceId, RplModeOfOperation,
};

/// The DODAG configuration used by a root that was not given one.
pub fn default_configuration() -> RplDodagConfiguration {
    RplDodagConfiguration {
        authentication_enabled: false,
        path_control_size: DEFAULT_PATH_CONTROL_SIZE,
        dio_interval_doublings: DEFAULT_DIO_INTERVAL_DOUBLINGS,
        dio_interval_min: DEFAULT_DIO_INTERVAL_MIN,
        dio_redundancy_constant: DEFAULT_DIO_REDUNDANCY_CONSTANT,
        max_rank_increase: DEFAULT_MAX_RANK_INCREASE,
        minimum_hop_rank_increase: DEFAULT_MIN_HOP_RANK_INCREASE,
        objective_code_point: 0,
        default_lifetime: DEFAULT_LIFETIME,
        lifetime_unit: DEFAULT_LIFETIME_UNIT,
    }
}

/// The DODAG this node is a member of, or the DODAG it last was a member of.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dodag {
    pub(crate) id: Ipv6Address,
    pub(crate) instance_id: RplInstanceId,
    pub(crate) version_number: SequenceCounter,
    pub(crate) rank: Rank,
    pub(crate) grounded: bool,
    pub(crate) mode_of_operation: RplModeOfOperation,
    pub(crate) preference: u8,
    pub(crate) dtsn: SequenceCounter,
    /// Lowest rank advertised since joining the current version.
    pub(crate) min_advertised_rank: Rank,
    pub(crate) configuration: RplDodagConfiguration,
    pub(crate) metric: RplDagMetricContainer,
}

impl Dodag {
    pub(crate) fn unrooted(mode_of_operation: RplModeOfOperation, metric: MetricType) -> Self {
        Self {
            id: Ipv6Address::UNSPECIFIED,
            instance_id: RplInstanceId::from(RPL_DEFAULT_INSTANCE),
            version_number: SequenceCounter::new(ROOT_DEFAULT_VERSION_NUMBER),
            rank: Rank::INFINITE,
            grounded: false,
            mode_of_operation,
            preference: 0,
            dtsn: SequenceCounter::new(0),
            min_advertised_rank: Rank::INFINITE,
            configuration: default_configuration(),
            metric: RplDagMetricContainer::recorded(metric, DEFAULT_METRIC),
        }
    }

    pub fn id(&self) -> Ipv6Address {
        self.id
    }

    pub fn instance_id(&self) -> RplInstanceId {
        self.instance_id
    }

    pub fn version_number(&self) -> u8 {
        self.version_number.value()
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn grounded(&self) -> bool {
        self.grounded
    }

    pub fn mode_of_operation(&self) -> RplModeOfOperation {
        self.mode_of_operation
    }

    pub fn preference(&self) -> u8 {
        self.preference
    }

    pub fn dtsn(&self) -> u8 {
        self.dtsn.value()
    }

    pub fn configuration(&self) -> &RplDodagConfiguration {
        &self.configuration
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric.metric_type
    }

    pub fn min_hop_rank_increase(&self) -> u16 {
        self.configuration.minimum_hop_rank_increase
    }

    pub fn max_rank_increase(&self) -> u16 {
        self.configuration.max_rank_increase
    }

    /// Interpret a raw rank in the scale of this DODAG.
    pub(crate) fn rank_from_raw(&self, value: u16) -> Rank {
        Rank::new(value, self.min_hop_rank_increase())
    }

    pub(crate) fn infinite_rank(&self) -> Rank {
        Rank::infinite(self.min_hop_rank_increase())
    }

    pub(crate) fn is_storing(&self) -> bool {
        self.mode_of_operation.is_storing()
    }
}
