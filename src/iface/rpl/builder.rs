use super::consts::{NEIGHBOR_TICK, ROOT_DEFAULT_PREFERENCE};
use super::dao::DaoCache;
use super::dodag::{default_configuration, Dodag};
use super::lollipop::SequenceCounter;
use super::neighbor_table::NeighborTable;
use super::objective::Objective;
use super::timer::{OneShot, Scheduler, Timer};
use super::trickle::TrickleTimer;
use super::{routing_table, Rpl, Transport};

use crate::rand::Rand;
use crate::wire::rpl::options::MetricType;
use crate::wire::{Ipv6Address, RplDodagConfiguration, RplInstanceId, RplModeOfOperation};

/// The configuration given to a [RplBuilder] is not usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No objective function with this Objective Code Point is available.
    UnsupportedObjective(u16),
    InvalidMinHopRankIncrease,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedObjective(ocp) => write!(f, "unsupported objective code point {ocp}"),
            Self::InvalidMinHopRankIncrease => write!(f, "MinHopRankIncrease must not be 0"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RplBuilder {
    address: Ipv6Address,
    is_root: bool,
    mode_of_operation: RplModeOfOperation,
    metric_type: MetricType,
    configuration: RplDodagConfiguration,
    instance_id: RplInstanceId,
    preference: Option<u8>,
    grounded: bool,
    dao_ack: bool,
    seed: u64,
}

impl RplBuilder {
    /// Start the configuration of the node with the given address.
    pub fn new(address: Ipv6Address) -> Self {
        Self {
            address,
            is_root: false,
            mode_of_operation: RplModeOfOperation::StoringModeWithoutMulticast,
            metric_type: MetricType::HopCount,
            configuration: default_configuration(),
            instance_id: RplInstanceId::from(super::consts::RPL_DEFAULT_INSTANCE),
            preference: None,
            grounded: false,
            dao_ack: false,
            seed: 0,
        }
    }

    /// Make the node the root of a DODAG identified by its address.
    #[inline]
    pub fn set_root(mut self) -> Self {
        self.is_root = true;
        self
    }

    /// Set the mode of operation. Only used by a root, other nodes adopt the one of their DODAG.
    #[inline]
    pub fn set_mode_of_operation(mut self, mode_of_operation: RplModeOfOperation) -> Self {
        self.mode_of_operation = mode_of_operation;
        self
    }

    #[inline]
    pub fn set_objective_code_point(mut self, ocp: u16) -> Self {
        self.configuration.objective_code_point = ocp;
        self
    }

    #[inline]
    pub fn set_metric_type(mut self, metric_type: MetricType) -> Self {
        self.metric_type = metric_type;
        self
    }

    /// Set the DODAG configuration a root advertises.
    #[inline]
    pub fn set_dodag_configuration(mut self, configuration: RplDodagConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Set the Instance ID.
    #[inline]
    pub fn set_instance_id(mut self, instance_id: RplInstanceId) -> Self {
        self.instance_id = instance_id;
        self
    }

    #[inline]
    pub fn set_preference(mut self, preference: u8) -> Self {
        self.preference = Some(preference);
        self
    }

    #[inline]
    pub fn set_grounded(mut self, grounded: bool) -> Self {
        self.grounded = grounded;
        self
    }

    /// Request an acknowledgement for every DAO sent.
    #[inline]
    pub fn set_dao_ack(mut self, dao_ack: bool) -> Self {
        self.dao_ack = dao_ack;
        self
    }

    /// Seed of the pseudo random numbers used for timer jitter.
    #[inline]
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the controller and arm its timers.
    pub fn finalize<T: Transport, S: Scheduler>(
        self,
        transport: T,
        scheduler: S,
    ) -> Result<Rpl<T, S>, ConfigError> {
        let configuration = self.configuration;
        if configuration.minimum_hop_rank_increase == 0 {
            return Err(ConfigError::InvalidMinHopRankIncrease);
        }

        let objective = Objective::from_ocp(configuration.objective_code_point)
            .ok_or(ConfigError::UnsupportedObjective(configuration.objective_code_point))?;

        let mut dodag = Dodag::unrooted(self.mode_of_operation, self.metric_type);
        dodag.instance_id = self.instance_id;
        dodag.grounded = self.grounded;
        dodag.preference = self.preference.unwrap_or(ROOT_DEFAULT_PREFERENCE);
        dodag.configuration = configuration;

        let mut rpl = Rpl {
            transport,
            scheduler,
            rand: Rand::new(self.seed),
            address: self.address,
            is_root: false,
            dao_ack: self.dao_ack,
            routes: routing_table(self.mode_of_operation, self.address),
            dodag,
            objective,
            neighbors: NeighborTable::new(
                configuration.default_lifetime,
                configuration.lifetime_unit,
            ),
            dao: DaoCache::default(),
            dio_timer: TrickleTimer::new(
                configuration.dio_interval_min,
                configuration.dio_interval_doublings,
                configuration.dio_redundancy_constant,
            ),
            dao_timer: OneShot::new(Timer::DaoDelay),
            neighbor_timer: OneShot::new(Timer::NeighborTick),
            connected: false,
            poison_sub_dag: false,
            schedule_dao: false,
            path_sequence: SequenceCounter::default(),
            dao_ack_pending: None,
            last_dao_ack: None,
        };

        rpl.neighbor_timer.arm(&mut rpl.scheduler, NEIGHBOR_TICK);

        if self.is_root {
            rpl.root_dodag();
        } else {
            rpl.dio_timer.start(&mut rpl.scheduler, &mut rpl.rand);
        }

        Ok(rpl)
    }
}
