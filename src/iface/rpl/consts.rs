use crate::time::Duration;

pub(crate) const RPL_DEFAULT_INSTANCE: u8 = 1;

// ------------------------------------
// Constants used for the trickle timer:
// ------------------------------------
/// Imin is 2^12 ms.
pub const DEFAULT_DIO_INTERVAL_MIN: u8 = 12;
pub(crate) const DEFAULT_DIO_INTERVAL_DOUBLINGS: u8 = 8;
pub(crate) const DEFAULT_DIO_REDUNDANCY_CONSTANT: u8 = 10;

// ------------------------------------
// Constants used for the rank computation:
// ------------------------------------
pub(crate) const DEFAULT_MIN_HOP_RANK_INCREASE: u16 = 256;
pub(crate) const DEFAULT_MAX_RANK_INCREASE: u16 = 3 * DEFAULT_MIN_HOP_RANK_INCREASE;
pub(crate) const DEFAULT_PATH_CONTROL_SIZE: u8 = 0;
/// MRHOF keeps the preferred parent unless a candidate is better by more than this.
pub(crate) const PARENT_SWITCH_THRESHOLD: u16 = 256 / 2;
pub(crate) const DEFAULT_LINK_METRIC_RANK_WEIGHT: u16 = 1;
/// Link metric assumed for a neighbor that did not advertise one of the DODAG's type.
pub(crate) const DEFAULT_METRIC: u16 = 1;

// ------------------------------------
// Constants used for the route lifetimes:
// ------------------------------------
pub(crate) const DEFAULT_LIFETIME: u8 = 30;
pub(crate) const DEFAULT_LIFETIME_UNIT: u16 = 60;
pub(crate) const NO_PATH_LIFETIME: u8 = 0;

// ------------------------------------
// Root defaults:
// ------------------------------------
pub(crate) const ROOT_DEFAULT_DTSN: u8 = 1;
pub(crate) const ROOT_DEFAULT_PREFERENCE: u8 = 7;
pub(crate) const ROOT_DEFAULT_VERSION_NUMBER: u8 = 0;

// ---------------------------------------
// Constants used for the sequence counters:
// ---------------------------------------
pub(crate) const SEQUENCE_WINDOW: u8 = 16;
pub(crate) const SEQUENCE_TIP: u8 = 128;

// --------------------------------------
// Constants used for the neighbour table:
// --------------------------------------
pub(crate) const RPL_NEIGHBOR_TABLE_SIZE: usize = 10;
pub(crate) const NEIGHBOR_TICK: Duration = Duration::from_secs(1);

// --------------------------------------
// Constants used for the DAO timer:
// --------------------------------------
pub(crate) const DAO_DELAY_MIN: Duration = Duration::from_millis(500);
pub(crate) const DAO_DELAY_JITTER_MS: u32 = 1000;
