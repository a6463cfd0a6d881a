use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, InstanceId, Result};
use crate::wire::ipv6::{Address, AddressExt};

/// A read/write wrapper around a RPL Control Message Option.
#[derive(Debug, Clone)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

enum_with_unknown! {
    pub enum OptionType(u8) {
        Pad1 = 0x00,
        PadN = 0x01,
        DagMetricContainer = 0x02,
        RouteInformation = 0x03,
        DodagConfiguration = 0x04,
        RplTarget = 0x05,
        TransitInformation = 0x06,
        SolicitedInformation = 0x07,
        PrefixInformation = 0x08,
        RplTargetDescriptor = 0x09,
    }
}

impl From<&Repr<'_>> for OptionType {
    fn from(repr: &Repr) -> Self {
        match repr {
            Repr::Pad1 => Self::Pad1,
            Repr::PadN(_) => Self::PadN,
            Repr::DagMetricContainer(_) => Self::DagMetricContainer,
            Repr::RouteInformation(_) => Self::RouteInformation,
            Repr::DodagConfiguration(_) => Self::DodagConfiguration,
            Repr::RplTarget(_) => Self::RplTarget,
            Repr::TransitInformation(_) => Self::TransitInformation,
            Repr::SolicitedInformation(_) => Self::SolicitedInformation,
            Repr::PrefixInformation(_) => Self::PrefixInformation,
            Repr::RplTargetDescriptor(_) => Self::RplTargetDescriptor,
        }
    }
}

enum_with_unknown! {
    /// Routing metric and constraint object types. See [RFC 6551 § 6].
    ///
    /// [RFC 6551 § 6]: https://datatracker.ietf.org/doc/html/rfc6551#section-6
    pub enum MetricType(u8) {
        NodeState = 0x01,
        NodeEnergy = 0x02,
        HopCount = 0x03,
        Throughput = 0x04,
        Latency = 0x05,
        LinkQualityLevel = 0x06,
        Etx = 0x07,
        LinkColor = 0x08,
    }
}

mod field {
    use crate::wire::field::*;

    // Generic fields.
    pub const TYPE: usize = 0;
    pub const LENGTH: usize = 1;

    pub const PADN: Rest = 2..;

    // DAG Metric Container fields.
    pub const METRIC_TYPE: usize = 2;
    pub const METRIC_FLAGS: usize = 3;
    pub const METRIC_RECORDED: usize = 4;
    pub const METRIC_AGGREGATION: usize = 4;
    pub const METRIC_PRECEDENCE: usize = 4;
    pub const METRIC_OBJECT_LENGTH: usize = 5;
    pub const METRIC_VALUE: Field = 6..8;

    // Route Information fields.
    pub const ROUTE_INFO_PREFIX_LENGTH: usize = 2;
    pub const ROUTE_INFO_PREFERENCE: usize = 3;
    pub const ROUTE_INFO_LIFETIME: Field = 4..8;
    pub const ROUTE_INFO_PREFIX: Rest = 8..;

    // DODAG Configuration fields.
    pub const DODAG_CONF_FLAGS: usize = 2;
    pub const DODAG_CONF_DIO_INTERVAL_DOUBLINGS: usize = 3;
    pub const DODAG_CONF_DIO_INTERVAL_MINIMUM: usize = 4;
    pub const DODAG_CONF_DIO_REDUNDANCY_CONSTANT: usize = 5;
    pub const DODAG_CONF_DIO_MAX_RANK_INCREASE: Field = 6..8;
    pub const DODAG_CONF_MIN_HOP_RANK_INCREASE: Field = 8..10;
    pub const DODAG_CONF_OBJECTIVE_CODE_POINT: Field = 10..12;
    pub const DODAG_CONF_RESERVED: usize = 12;
    pub const DODAG_CONF_DEFAULT_LIFETIME: usize = 13;
    pub const DODAG_CONF_LIFETIME_UNIT: Field = 14..16;

    // RPL Target fields.
    pub const RPL_TARGET_FLAGS: usize = 2;
    pub const RPL_TARGET_PREFIX_LENGTH: usize = 3;
    pub const RPL_TARGET_PREFIX: Field = 4..20;

    // Transit Information fields.
    pub const TRANSIT_INFO_FLAGS: usize = 2;
    pub const TRANSIT_INFO_PATH_CONTROL: usize = 3;
    pub const TRANSIT_INFO_PATH_SEQUENCE: usize = 4;
    pub const TRANSIT_INFO_PATH_LIFETIME: usize = 5;
    pub const TRANSIT_INFO_PARENT_ADDRESS: Field = 6..6 + 16;

    // Solicited Information fields.
    pub const SOLICITED_INFO_RPL_INSTANCE_ID: usize = 2;
    pub const SOLICITED_INFO_FLAGS: usize = 3;
    pub const SOLICITED_INFO_DODAG_ID: Field = 4..20;
    pub const SOLICITED_INFO_VERSION_NUMBER: usize = 20;

    // Prefix Information fields.
    pub const PREFIX_INFO_PREFIX_LENGTH: usize = 2;
    pub const PREFIX_INFO_FLAGS: usize = 3;
    pub const PREFIX_INFO_VALID_LIFETIME: Field = 4..8;
    pub const PREFIX_INFO_PREFERRED_LIFETIME: Field = 8..12;
    pub const PREFIX_INFO_RESERVED2: Field = 12..16;
    pub const PREFIX_INFO_PREFIX: Field = 16..16 + 16;

    // RPL Target Descriptor fields.
    pub const TARGET_DESCRIPTOR: Field = 2..6;
}

/// Option payload sizes, not counting the type and length bytes.
pub(crate) mod len {
    pub const DAG_METRIC_CONTAINER: u8 = 6;
    pub const ROUTE_INFORMATION_MIN: u8 = 6;
    pub const ROUTE_INFORMATION_MAX: u8 = 6 + 16;
    pub const DODAG_CONFIGURATION: u8 = 14;
    pub const RPL_TARGET: u8 = 2 + 16;
    pub const TRANSIT_INFORMATION_STORING: u8 = 4;
    pub const TRANSIT_INFORMATION_NON_STORING: u8 = 4 + 16;
    pub const SOLICITED_INFORMATION: u8 = 19;
    pub const PREFIX_INFORMATION: u8 = 30;
    pub const RPL_TARGET_DESCRIPTOR: u8 = 4;
}

/// Getters for the RPL Control Message Options.
impl<T: AsRef<[u8]>> Packet<T> {
    /// Create a raw octet buffer with RPL Control Message Option structure.
    #[inline]
    pub fn new_unchecked(buffer: T) -> Self {
        Self { buffer }
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    #[inline]
    pub fn new_checked(buffer: T) -> Result<Self> {
        let packet = Self::new_unchecked(buffer);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    ///
    /// Returns `Err(Error)` if the buffer is too short for the declared option length, if the
    /// declared length does not match the fixed size of the option type, or if the option type
    /// is not known.
    pub fn check_len(&self) -> Result<()> {
        let data = self.buffer.as_ref();

        if data.is_empty() {
            return Err(Error);
        }

        if self.option_type() == OptionType::Pad1 {
            return Ok(());
        }

        if data.len() < 2 {
            return Err(Error);
        }

        let length = self.option_length();
        if data.len() < 2 + length as usize {
            return Err(Error);
        }

        let valid = match self.option_type() {
            OptionType::Pad1 | OptionType::PadN => true,
            OptionType::DagMetricContainer => length == len::DAG_METRIC_CONTAINER,
            OptionType::RouteInformation => {
                (len::ROUTE_INFORMATION_MIN..=len::ROUTE_INFORMATION_MAX).contains(&length)
            }
            OptionType::DodagConfiguration => length == len::DODAG_CONFIGURATION,
            OptionType::RplTarget => length == len::RPL_TARGET,
            OptionType::TransitInformation => {
                length == len::TRANSIT_INFORMATION_STORING
                    || length == len::TRANSIT_INFORMATION_NON_STORING
            }
            OptionType::SolicitedInformation => length == len::SOLICITED_INFORMATION,
            OptionType::PrefixInformation => length == len::PREFIX_INFORMATION,
            OptionType::RplTargetDescriptor => length == len::RPL_TARGET_DESCRIPTOR,
            OptionType::Unknown(_) => false,
        };

        if valid {
            Ok(())
        } else {
            Err(Error)
        }
    }

    /// Return the type field.
    #[inline]
    pub fn option_type(&self) -> OptionType {
        OptionType::from(self.buffer.as_ref()[field::TYPE])
    }

    /// Return the length field.
    #[inline]
    pub fn option_length(&self) -> u8 {
        get!(self.buffer, field: field::LENGTH)
    }

    /// Return the number of bytes this option occupies, including type and length.
    #[inline]
    pub fn total_len(&self) -> usize {
        match self.option_type() {
            OptionType::Pad1 => 1,
            _ => 2 + self.option_length() as usize,
        }
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the Option Type field.
    #[inline]
    pub fn set_option_type(&mut self, option_type: OptionType) {
        self.buffer.as_mut()[field::TYPE] = option_type.into();
    }

    /// Set the Option Length field.
    #[inline]
    pub fn set_option_length(&mut self, length: u8) {
        self.buffer.as_mut()[field::LENGTH] = length;
    }

    #[inline]
    pub fn clear_padn(&mut self, size: u8) {
        for b in &mut self.buffer.as_mut()[field::PADN][..size as usize] {
            *b = 0;
        }
    }
}

/// Getters for the DAG Metric Container Option, carrying a single routing metric object.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x02 | Option Length |  Routing-MC   |Res Flags|P|C|O|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |R|  A  | Prec  | Object Length |            Value              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the routing metric object type.
    #[inline]
    pub fn metric_type(&self) -> MetricType {
        get!(self.buffer, into: MetricType, field: field::METRIC_TYPE)
    }

    /// Return the reserved flags of the metric object.
    #[inline]
    pub fn metric_flags(&self) -> u8 {
        get!(self.buffer, field: field::METRIC_FLAGS, shift: 3, mask: 0b1_1111)
    }

    /// Return the P flag.
    #[inline]
    pub fn metric_permanent(&self) -> bool {
        get!(self.buffer, bool, field: field::METRIC_FLAGS, shift: 2, mask: 0b1)
    }

    /// Return the C flag.
    #[inline]
    pub fn metric_constraint(&self) -> bool {
        get!(self.buffer, bool, field: field::METRIC_FLAGS, shift: 1, mask: 0b1)
    }

    /// Return the O flag.
    #[inline]
    pub fn metric_optional(&self) -> bool {
        get!(self.buffer, bool, field: field::METRIC_FLAGS, shift: 0, mask: 0b1)
    }

    /// Return the R flag.
    #[inline]
    pub fn metric_recorded(&self) -> bool {
        get!(self.buffer, bool, field: field::METRIC_RECORDED, shift: 7, mask: 0b1)
    }

    /// Return the aggregation field.
    #[inline]
    pub fn metric_aggregation(&self) -> u8 {
        get!(self.buffer, field: field::METRIC_AGGREGATION, shift: 4, mask: 0b111)
    }

    /// Return the precedence field.
    #[inline]
    pub fn metric_precedence(&self) -> u8 {
        get!(self.buffer, field: field::METRIC_PRECEDENCE, mask: 0b1111)
    }

    /// Return the length of the metric object body.
    #[inline]
    pub fn metric_object_length(&self) -> u8 {
        get!(self.buffer, field: field::METRIC_OBJECT_LENGTH)
    }

    /// Return the metric value.
    #[inline]
    pub fn metric_value(&self) -> u16 {
        get!(self.buffer, u16, field: field::METRIC_VALUE)
    }
}

/// Setters for the DAG Metric Container Option.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    #[inline]
    pub fn set_metric_type(&mut self, metric_type: MetricType) {
        self.buffer.as_mut()[field::METRIC_TYPE] = metric_type.into();
    }

    #[inline]
    pub fn clear_metric_flags(&mut self) {
        self.buffer.as_mut()[field::METRIC_FLAGS] = 0;
        self.buffer.as_mut()[field::METRIC_RECORDED] = 0;
    }

    #[inline]
    pub fn set_metric_flags(&mut self, value: u8) {
        let value = value & 0b1_1111;
        set!(self.buffer, value, field: field::METRIC_FLAGS, shift: 3, mask: 0b1_1111)
    }

    #[inline]
    pub fn set_metric_permanent(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::METRIC_FLAGS, shift: 2, mask: 0b1)
    }

    #[inline]
    pub fn set_metric_constraint(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::METRIC_FLAGS, shift: 1, mask: 0b1)
    }

    #[inline]
    pub fn set_metric_optional(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::METRIC_FLAGS, shift: 0, mask: 0b1)
    }

    #[inline]
    pub fn set_metric_recorded(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::METRIC_RECORDED, shift: 7, mask: 0b1)
    }

    #[inline]
    pub fn set_metric_aggregation(&mut self, value: u8) {
        let value = value & 0b111;
        set!(self.buffer, value, field: field::METRIC_AGGREGATION, shift: 4, mask: 0b111)
    }

    #[inline]
    pub fn set_metric_precedence(&mut self, value: u8) {
        let value = value & 0b1111;
        set!(self.buffer, value, field: field::METRIC_PRECEDENCE, mask: 0b1111)
    }

    #[inline]
    pub fn set_metric_object_length(&mut self, value: u8) {
        set!(self.buffer, value, field: field::METRIC_OBJECT_LENGTH)
    }

    #[inline]
    pub fn set_metric_value(&mut self, value: u16) {
        set!(self.buffer, value, u16, field: field::METRIC_VALUE)
    }
}

/// Getters for the Route Information Option Message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x03 | Option Length | Prefix Length |Resvd|Prf|Resvd|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Route Lifetime                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// .                   Prefix (Variable Length)                    .
/// .                                                               .
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the Prefix Length field.
    #[inline]
    pub fn prefix_length(&self) -> u8 {
        get!(self.buffer, field: field::ROUTE_INFO_PREFIX_LENGTH)
    }

    /// Return the Route Preference field.
    #[inline]
    pub fn route_preference(&self) -> u8 {
        get!(self.buffer, field: field::ROUTE_INFO_PREFERENCE, shift: 3, mask: 0b11)
    }

    /// Return the Route Lifetime field.
    #[inline]
    pub fn route_lifetime(&self) -> u32 {
        get!(self.buffer, u32, field: field::ROUTE_INFO_LIFETIME)
    }
}

impl<'p, T: AsRef<[u8]> + ?Sized> Packet<&'p T> {
    /// Return the Prefix field.
    #[inline]
    pub fn prefix(&self) -> &'p [u8] {
        let option_len = self.option_length() as usize;
        &self.buffer.as_ref()[field::ROUTE_INFO_PREFIX][..option_len - 6]
    }
}

/// Setters for the Route Information Option Message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the Prefix Length field.
    #[inline]
    pub fn set_route_info_prefix_length(&mut self, value: u8) {
        set!(self.buffer, value, field: field::ROUTE_INFO_PREFIX_LENGTH)
    }

    /// Set the Route Preference field.
    #[inline]
    pub fn set_route_info_route_preference(&mut self, value: u8) {
        let value = value & 0b11;
        set!(self.buffer, value, field: field::ROUTE_INFO_PREFERENCE, shift: 3, mask: 0b11)
    }

    /// Set the Route Lifetime field.
    #[inline]
    pub fn set_route_info_route_lifetime(&mut self, value: u32) {
        set!(self.buffer, value, u32, field: field::ROUTE_INFO_LIFETIME)
    }

    /// Set the prefix field.
    #[inline]
    pub fn set_route_info_prefix(&mut self, prefix: &[u8]) {
        self.buffer.as_mut()[field::ROUTE_INFO_PREFIX][..prefix.len()].copy_from_slice(prefix);
    }

    /// Clear the reserved field.
    #[inline]
    pub fn clear_route_info_reserved(&mut self) {
        self.buffer.as_mut()[field::ROUTE_INFO_PREFERENCE] = 0;
    }
}

/// Getters for the DODAG Configuration Option Message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x04 |Opt Length = 14| Flags |A| PCS | DIOIntDoubl.  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  DIOIntMin.   |   DIORedun.   |        MaxRankIncrease        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      MinHopRankIncrease       |              OCP              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Reserved    | Def. Lifetime |      Lifetime Unit            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the Authentication Enabled field.
    #[inline]
    pub fn authentication_enabled(&self) -> bool {
        get!(self.buffer, bool, field: field::DODAG_CONF_FLAGS, shift: 3, mask: 0b1)
    }

    /// Return the Path Control Size field.
    #[inline]
    pub fn path_control_size(&self) -> u8 {
        get!(self.buffer, field: field::DODAG_CONF_FLAGS, mask: 0b111)
    }

    /// Return the DIO Interval Doublings field.
    #[inline]
    pub fn dio_interval_doublings(&self) -> u8 {
        get!(self.buffer, field: field::DODAG_CONF_DIO_INTERVAL_DOUBLINGS)
    }

    /// Return the DIO Interval Minimum field.
    #[inline]
    pub fn dio_interval_minimum(&self) -> u8 {
        get!(self.buffer, field: field::DODAG_CONF_DIO_INTERVAL_MINIMUM)
    }

    /// Return the DIO Redundancy Constant field.
    #[inline]
    pub fn dio_redundancy_constant(&self) -> u8 {
        get!(self.buffer, field: field::DODAG_CONF_DIO_REDUNDANCY_CONSTANT)
    }

    /// Return the Max Rank Increase field.
    #[inline]
    pub fn max_rank_increase(&self) -> u16 {
        get!(self.buffer, u16, field: field::DODAG_CONF_DIO_MAX_RANK_INCREASE)
    }

    /// Return the Minimum Hop Rank Increase field.
    #[inline]
    pub fn minimum_hop_rank_increase(&self) -> u16 {
        get!(self.buffer, u16, field: field::DODAG_CONF_MIN_HOP_RANK_INCREASE)
    }

    /// Return the Objective Code Point field.
    #[inline]
    pub fn objective_code_point(&self) -> u16 {
        get!(self.buffer, u16, field: field::DODAG_CONF_OBJECTIVE_CODE_POINT)
    }

    /// Return the Default Lifetime field.
    #[inline]
    pub fn default_lifetime(&self) -> u8 {
        get!(self.buffer, field: field::DODAG_CONF_DEFAULT_LIFETIME)
    }

    /// Return the Lifetime Unit field.
    #[inline]
    pub fn lifetime_unit(&self) -> u16 {
        get!(self.buffer, u16, field: field::DODAG_CONF_LIFETIME_UNIT)
    }
}

/// Setters for the DODAG Configuration Option Message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Clear the Flags field and the reserved byte.
    #[inline]
    pub fn clear_dodag_conf_flags(&mut self) {
        self.buffer.as_mut()[field::DODAG_CONF_FLAGS] = 0;
        self.buffer.as_mut()[field::DODAG_CONF_RESERVED] = 0;
    }

    /// Set the Authentication Enabled field.
    #[inline]
    pub fn set_dodag_conf_authentication_enabled(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::DODAG_CONF_FLAGS, shift: 3, mask: 0b1)
    }

    /// Set the Path Control Size field.
    #[inline]
    pub fn set_dodag_conf_path_control_size(&mut self, value: u8) {
        let value = value & 0b111;
        set!(self.buffer, value, field: field::DODAG_CONF_FLAGS, mask: 0b111)
    }

    /// Set the DIO Interval Doublings field.
    #[inline]
    pub fn set_dodag_conf_dio_interval_doublings(&mut self, value: u8) {
        set!(self.buffer, value, field: field::DODAG_CONF_DIO_INTERVAL_DOUBLINGS)
    }

    /// Set the DIO Interval Minimum field.
    #[inline]
    pub fn set_dodag_conf_dio_interval_minimum(&mut self, value: u8) {
        set!(self.buffer, value, field: field::DODAG_CONF_DIO_INTERVAL_MINIMUM)
    }

    /// Set the DIO Redundancy Constant field.
    #[inline]
    pub fn set_dodag_conf_dio_redundancy_constant(&mut self, value: u8) {
        set!(self.buffer, value, field: field::DODAG_CONF_DIO_REDUNDANCY_CONSTANT)
    }

    /// Set the Max Rank Increase field.
    #[inline]
    pub fn set_dodag_conf_max_rank_increase(&mut self, value: u16) {
        set!(self.buffer, value, u16, field: field::DODAG_CONF_DIO_MAX_RANK_INCREASE)
    }

    /// Set the Minimum Hop Rank Increase field.
    #[inline]
    pub fn set_dodag_conf_minimum_hop_rank_increase(&mut self, value: u16) {
        set!(self.buffer, value, u16, field: field::DODAG_CONF_MIN_HOP_RANK_INCREASE)
    }

    /// Set the Objective Code Point field.
    #[inline]
    pub fn set_dodag_conf_objective_code_point(&mut self, value: u16) {
        set!(self.buffer, value, u16, field: field::DODAG_CONF_OBJECTIVE_CODE_POINT)
    }

    /// Set the Default Lifetime field.
    #[inline]
    pub fn set_dodag_conf_default_lifetime(&mut self, value: u8) {
        set!(self.buffer, value, field: field::DODAG_CONF_DEFAULT_LIFETIME)
    }

    /// Set the Lifetime Unit field.
    #[inline]
    pub fn set_dodag_conf_lifetime_unit(&mut self, value: u16) {
        set!(self.buffer, value, u16, field: field::DODAG_CONF_LIFETIME_UNIT)
    }
}

/// Getters for the RPL Target Option Message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x05 |Opt Length = 18|     Flags     | Prefix Length |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                Target Prefix (full address width)             |
/// .                                                               .
/// .                                                               .
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the Target Prefix Length field.
    pub fn target_prefix_length(&self) -> u8 {
        get!(self.buffer, field: field::RPL_TARGET_PREFIX_LENGTH)
    }

    /// Return the Target Prefix field.
    pub fn target_prefix(&self) -> Address {
        get!(
            self.buffer,
            into: Address,
            fun: from_bytes,
            field: field::RPL_TARGET_PREFIX
        )
    }
}

/// Setters for the RPL Target Option Message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Clear the Flags field.
    #[inline]
    pub fn clear_rpl_target_flags(&mut self) {
        self.buffer.as_mut()[field::RPL_TARGET_FLAGS] = 0;
    }

    /// Set the Target Prefix Length field.
    #[inline]
    pub fn set_rpl_target_prefix_length(&mut self, value: u8) {
        set!(self.buffer, value, field: field::RPL_TARGET_PREFIX_LENGTH)
    }

    /// Set the Target Prefix field.
    #[inline]
    pub fn set_rpl_target_prefix(&mut self, prefix: Address) {
        set!(self.buffer, address: prefix, field: field::RPL_TARGET_PREFIX)
    }
}

/// Getters for the Transit Information Option Message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x06 | Option Length |E|    Flags    | Path Control  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Path Sequence | Path Lifetime |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               +
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +                        Parent Address*                        +
/// |                                                               |
/// +                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the External flag.
    #[inline]
    pub fn is_external(&self) -> bool {
        get!(self.buffer, bool, field: field::TRANSIT_INFO_FLAGS, shift: 7, mask: 0b1)
    }

    /// Return the Path Control field.
    #[inline]
    pub fn path_control(&self) -> u8 {
        get!(self.buffer, field: field::TRANSIT_INFO_PATH_CONTROL)
    }

    /// Return the Path Sequence field.
    #[inline]
    pub fn path_sequence(&self) -> u8 {
        get!(self.buffer, field: field::TRANSIT_INFO_PATH_SEQUENCE)
    }

    /// Return the Path Lifetime field.
    #[inline]
    pub fn path_lifetime(&self) -> u8 {
        get!(self.buffer, field: field::TRANSIT_INFO_PATH_LIFETIME)
    }

    /// Return the Parent Address field, present in non-storing mode only.
    #[inline]
    pub fn parent_address(&self) -> Option<Address> {
        if self.option_length() == len::TRANSIT_INFORMATION_NON_STORING {
            Some(Address::from_bytes(
                &self.buffer.as_ref()[field::TRANSIT_INFO_PARENT_ADDRESS],
            ))
        } else {
            None
        }
    }
}

/// Setters for the Transit Information Option Message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Clear the Flags field.
    #[inline]
    pub fn clear_transit_info_flags(&mut self) {
        self.buffer.as_mut()[field::TRANSIT_INFO_FLAGS] = 0;
    }

    /// Set the External flag.
    #[inline]
    pub fn set_transit_info_is_external(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::TRANSIT_INFO_FLAGS, shift: 7, mask: 0b1)
    }

    /// Set the Path Control field.
    #[inline]
    pub fn set_transit_info_path_control(&mut self, value: u8) {
        set!(self.buffer, value, field: field::TRANSIT_INFO_PATH_CONTROL)
    }

    /// Set the Path Sequence field.
    #[inline]
    pub fn set_transit_info_path_sequence(&mut self, value: u8) {
        set!(self.buffer, value, field: field::TRANSIT_INFO_PATH_SEQUENCE)
    }

    /// Set the Path Lifetime field.
    #[inline]
    pub fn set_transit_info_path_lifetime(&mut self, value: u8) {
        set!(self.buffer, value, field: field::TRANSIT_INFO_PATH_LIFETIME)
    }

    /// Set the Parent Address field.
    #[inline]
    pub fn set_transit_info_parent_address(&mut self, address: Address) {
        set!(self.buffer, address: address, field: field::TRANSIT_INFO_PARENT_ADDRESS)
    }
}

/// Getters for the Solicited Information Option Message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x07 |Opt Length = 19| RPLInstanceID |V|I|D|  Flags  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +                            DODAGID                            +
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |Version Number |
/// +-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the RPL Instance ID field.
    #[inline]
    pub fn rpl_instance_id(&self) -> u8 {
        get!(self.buffer, field: field::SOLICITED_INFO_RPL_INSTANCE_ID)
    }

    /// Return the Version Predicate flag.
    #[inline]
    pub fn version_predicate(&self) -> bool {
        get!(self.buffer, bool, field: field::SOLICITED_INFO_FLAGS, shift: 7, mask: 0b1)
    }

    /// Return the Instance ID Predicate flag.
    #[inline]
    pub fn instance_id_predicate(&self) -> bool {
        get!(self.buffer, bool, field: field::SOLICITED_INFO_FLAGS, shift: 6, mask: 0b1)
    }

    /// Return the DODAG Predicate ID flag.
    #[inline]
    pub fn dodag_id_predicate(&self) -> bool {
        get!(self.buffer, bool, field: field::SOLICITED_INFO_FLAGS, shift: 5, mask: 0b1)
    }

    /// Return the DODAG ID field.
    #[inline]
    pub fn dodag_id(&self) -> Address {
        get!(
            self.buffer,
            into: Address,
            fun: from_bytes,
            field: field::SOLICITED_INFO_DODAG_ID
        )
    }

    /// Return the version number field.
    #[inline]
    pub fn version_number(&self) -> u8 {
        get!(self.buffer, field: field::SOLICITED_INFO_VERSION_NUMBER)
    }
}

/// Setters for the Solicited Information Option Message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Clear the Flags field.
    #[inline]
    pub fn clear_solicited_info_flags(&mut self) {
        self.buffer.as_mut()[field::SOLICITED_INFO_FLAGS] = 0;
    }

    /// Set the RPL Instance ID field.
    #[inline]
    pub fn set_solicited_info_rpl_instance_id(&mut self, value: u8) {
        set!(self.buffer, value, field: field::SOLICITED_INFO_RPL_INSTANCE_ID)
    }

    /// Set the Version Predicate flag.
    #[inline]
    pub fn set_solicited_info_version_predicate(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::SOLICITED_INFO_FLAGS, shift: 7, mask: 0b1)
    }

    /// Set the Instance ID Predicate flag.
    #[inline]
    pub fn set_solicited_info_instance_id_predicate(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::SOLICITED_INFO_FLAGS, shift: 6, mask: 0b1)
    }

    /// Set the DODAG Predicate ID flag.
    #[inline]
    pub fn set_solicited_info_dodag_id_predicate(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::SOLICITED_INFO_FLAGS, shift: 5, mask: 0b1)
    }

    /// Set the DODAG ID field.
    #[inline]
    pub fn set_solicited_info_dodag_id(&mut self, address: Address) {
        set!(self.buffer, address: address, field: field::SOLICITED_INFO_DODAG_ID)
    }

    /// Set the version number field.
    #[inline]
    pub fn set_solicited_info_version_number(&mut self, value: u8) {
        set!(self.buffer, value, field: field::SOLICITED_INFO_VERSION_NUMBER)
    }
}

/// Getters for the Prefix Information Option Message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Type = 0x08 |Opt Length = 30| Prefix Length |L|A|R|Reserved1|
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Valid Lifetime                        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                       Preferred Lifetime                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Reserved2                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +                            Prefix                             +
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the Prefix Length field.
    #[inline]
    pub fn prefix_info_prefix_length(&self) -> u8 {
        get!(self.buffer, field: field::PREFIX_INFO_PREFIX_LENGTH)
    }

    /// Return the On-Link flag.
    #[inline]
    pub fn on_link(&self) -> bool {
        get!(self.buffer, bool, field: field::PREFIX_INFO_FLAGS, shift: 7, mask: 0b1)
    }

    /// Return the Autonomous Address-Configuration flag.
    #[inline]
    pub fn autonomous_address_configuration(&self) -> bool {
        get!(self.buffer, bool, field: field::PREFIX_INFO_FLAGS, shift: 6, mask: 0b1)
    }

    /// Return the Router Address flag.
    #[inline]
    pub fn router_address(&self) -> bool {
        get!(self.buffer, bool, field: field::PREFIX_INFO_FLAGS, shift: 5, mask: 0b1)
    }

    /// Return the Valid Lifetime field.
    #[inline]
    pub fn valid_lifetime(&self) -> u32 {
        get!(self.buffer, u32, field: field::PREFIX_INFO_VALID_LIFETIME)
    }

    /// Return the Preferred Lifetime field.
    #[inline]
    pub fn preferred_lifetime(&self) -> u32 {
        get!(self.buffer, u32, field: field::PREFIX_INFO_PREFERRED_LIFETIME)
    }

    /// Return the Destination Prefix field.
    #[inline]
    pub fn destination_prefix(&self) -> Address {
        get!(
            self.buffer,
            into: Address,
            fun: from_bytes,
            field: field::PREFIX_INFO_PREFIX
        )
    }
}

/// Setters for the Prefix Information Option Message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Clear the reserved fields.
    #[inline]
    pub fn clear_prefix_info_reserved(&mut self) {
        self.buffer.as_mut()[field::PREFIX_INFO_FLAGS] = 0;
        self.buffer.as_mut()[field::PREFIX_INFO_RESERVED2].copy_from_slice(&[0; 4]);
    }

    /// Set the Prefix Length field.
    #[inline]
    pub fn set_prefix_info_prefix_length(&mut self, value: u8) {
        set!(self.buffer, value, field: field::PREFIX_INFO_PREFIX_LENGTH)
    }

    /// Set the On-Link flag.
    #[inline]
    pub fn set_prefix_info_on_link(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::PREFIX_INFO_FLAGS, shift: 7, mask: 0b1)
    }

    /// Set the Autonomous Address-Configuration flag.
    #[inline]
    pub fn set_prefix_info_autonomous_address_configuration(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::PREFIX_INFO_FLAGS, shift: 6, mask: 0b1)
    }

    /// Set the Router Address flag.
    #[inline]
    pub fn set_prefix_info_router_address(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::PREFIX_INFO_FLAGS, shift: 5, mask: 0b1)
    }

    /// Set the Valid Lifetime field.
    #[inline]
    pub fn set_prefix_info_valid_lifetime(&mut self, value: u32) {
        set!(self.buffer, value, u32, field: field::PREFIX_INFO_VALID_LIFETIME)
    }

    /// Set the Preferred Lifetime field.
    #[inline]
    pub fn set_prefix_info_preferred_lifetime(&mut self, value: u32) {
        set!(self.buffer, value, u32, field: field::PREFIX_INFO_PREFERRED_LIFETIME)
    }

    /// Set the Destination Prefix field.
    #[inline]
    pub fn set_prefix_info_destination_prefix(&mut self, prefix: Address) {
        set!(self.buffer, address: prefix, field: field::PREFIX_INFO_PREFIX)
    }
}

/// Getters for the RPL Target Descriptor Option Message.
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the Descriptor field.
    #[inline]
    pub fn descriptor(&self) -> u32 {
        get!(self.buffer, u32, field: field::TARGET_DESCRIPTOR)
    }
}

/// Setters for the RPL Target Descriptor Option Message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the Descriptor field.
    #[inline]
    pub fn set_rpl_target_descriptor_descriptor(&mut self, value: u32) {
        set!(self.buffer, value, u32, field: field::TARGET_DESCRIPTOR)
    }
}

/// A high-level representation of a RPL Option.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Repr<'p> {
    Pad1,
    PadN(u8),
    DagMetricContainer(DagMetricContainer),
    RouteInformation(RouteInformation<'p>),
    DodagConfiguration(DodagConfiguration),
    RplTarget(RplTarget),
    TransitInformation(TransitInformation),
    SolicitedInformation(SolicitedInformation),
    PrefixInformation(PrefixInformation),
    RplTargetDescriptor(u32),
}

/// A high-level representation of a DAG Metric Container holding one metric object.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DagMetricContainer {
    pub metric_type: MetricType,
    pub flags: u8,
    pub permanent: bool,
    pub constraint: bool,
    pub optional: bool,
    pub recorded: bool,
    pub aggregation: u8,
    pub precedence: u8,
    pub value: u16,
}

impl DagMetricContainer {
    /// A recorded hop-count metric with the given value.
    pub const fn hop_count(value: u16) -> Self {
        Self::recorded(MetricType::HopCount, value)
    }

    /// A recorded metric object of the given type and value, all other flags cleared.
    pub const fn recorded(metric_type: MetricType, value: u16) -> Self {
        Self {
            metric_type,
            flags: 0,
            permanent: false,
            constraint: false,
            optional: false,
            recorded: true,
            aggregation: 0,
            precedence: 0,
            value,
        }
    }
}

/// A high-level representation of a RPL Route Option.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RouteInformation<'p> {
    pub prefix_length: u8,
    pub preference: u8,
    pub lifetime: u32,
    pub prefix: &'p [u8],
}

/// A high-level representation of a RPL DODAG Configuration Option.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DodagConfiguration {
    pub authentication_enabled: bool,
    pub path_control_size: u8,
    pub dio_interval_doublings: u8,
    pub dio_interval_min: u8,
    pub dio_redundancy_constant: u8,
    pub max_rank_increase: u16,
    pub minimum_hop_rank_increase: u16,
    pub objective_code_point: u16,
    pub default_lifetime: u8,
    pub lifetime_unit: u16,
}

/// A high-level representation of a RPL Target Option.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RplTarget {
    pub prefix_length: u8,
    pub prefix: Address,
}

/// A high-level representation of a RPL Transit Information Option.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransitInformation {
    pub external: bool,
    pub path_control: u8,
    pub path_sequence: u8,
    pub path_lifetime: u8,
    pub parent_address: Option<Address>,
}

/// A high-level representation of a RPL Solicited Information Option.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SolicitedInformation {
    pub rpl_instance_id: InstanceId,
    pub version_predicate: bool,
    pub instance_id_predicate: bool,
    pub dodag_id_predicate: bool,
    pub dodag_id: Address,
    pub version_number: u8,
}

/// A high-level representation of a RPL Prefix Information Option.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrefixInformation {
    pub prefix_length: u8,
    pub on_link: bool,
    pub autonomous_address_configuration: bool,
    pub router_address: bool,
    pub valid_lifetime: u32,
    pub preferred_lifetime: u32,
    pub destination_prefix: Address,
}

impl core::fmt::Display for Repr<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Repr::Pad1 => write!(f, "Pad1"),
            Repr::PadN(n) => write!(f, "PadN({n})"),
            Repr::DagMetricContainer(DagMetricContainer {
                metric_type,
                recorded,
                value,
                ..
            }) => {
                write!(
                    f,
                    "DAG MC Type={metric_type:?} R={recorded} Value={value}"
                )
            }
            Repr::RouteInformation(RouteInformation {
                prefix_length,
                preference,
                lifetime,
                prefix,
            }) => {
                write!(
                    f,
                    "ROUTE INFO PrefixLength={prefix_length} Preference={preference} \
                    Lifetime={lifetime} Prefix={prefix:0x?}"
                )
            }
            Repr::DodagConfiguration(DodagConfiguration {
                dio_interval_doublings,
                dio_interval_min,
                dio_redundancy_constant,
                max_rank_increase,
                minimum_hop_rank_increase,
                objective_code_point,
                default_lifetime,
                lifetime_unit,
                ..
            }) => {
                write!(
                    f,
                    "DODAG CONF IntD={dio_interval_doublings} IntMin={dio_interval_min} \
                    RedCst={dio_redundancy_constant} MaxRankIncr={max_rank_increase} \
                    MinHopRankIncr={minimum_hop_rank_increase} OCP={objective_code_point} \
                    DefaultLifetime={default_lifetime} LifeUnit={lifetime_unit}"
                )
            }
            Repr::RplTarget(RplTarget {
                prefix_length,
                prefix,
            }) => {
                write!(f, "RPL Target Prefix={prefix}/{prefix_length}")
            }
            Repr::TransitInformation(TransitInformation {
                external,
                path_control,
                path_sequence,
                path_lifetime,
                parent_address,
            }) => {
                write!(
                    f,
                    "Transit Info External={external} PathCtrl={path_control} \
                    PathSqnc={path_sequence} PathLifetime={path_lifetime} \
                    Parent={parent_address:?}"
                )
            }
            Repr::SolicitedInformation(SolicitedInformation {
                rpl_instance_id,
                version_predicate,
                instance_id_predicate,
                dodag_id_predicate,
                dodag_id,
                version_number,
            }) => {
                write!(
                    f,
                    "Solicited Info I={instance_id_predicate} IID={rpl_instance_id} \
                    D={dodag_id_predicate} DODAGID={dodag_id} V={version_predicate} \
                    Version={version_number}"
                )
            }
            Repr::PrefixInformation(PrefixInformation {
                prefix_length,
                on_link,
                autonomous_address_configuration,
                router_address,
                valid_lifetime,
                preferred_lifetime,
                destination_prefix,
            }) => {
                write!(
                    f,
                    "Prefix Info Prefix={destination_prefix}/{prefix_length} L={on_link} \
                    A={autonomous_address_configuration} R={router_address} \
                    Valid={valid_lifetime} Preferred={preferred_lifetime}"
                )
            }
            Repr::RplTargetDescriptor(descriptor) => {
                write!(f, "Target Descriptor {descriptor:#010x}")
            }
        }
    }
}

impl<'p> Repr<'p> {
    /// Parse a RPL Option and return a high-level representation.
    pub fn parse<T: AsRef<[u8]> + ?Sized>(packet: &Packet<&'p T>) -> Result<Self> {
        packet.check_len()?;

        match packet.option_type() {
            OptionType::Pad1 => Ok(Repr::Pad1),
            OptionType::PadN => Ok(Repr::PadN(packet.option_length())),
            OptionType::DagMetricContainer => {
                if packet.metric_object_length() != 2 {
                    return Err(Error);
                }

                Ok(Repr::DagMetricContainer(DagMetricContainer {
                    metric_type: packet.metric_type(),
                    flags: packet.metric_flags(),
                    permanent: packet.metric_permanent(),
                    constraint: packet.metric_constraint(),
                    optional: packet.metric_optional(),
                    recorded: packet.metric_recorded(),
                    aggregation: packet.metric_aggregation(),
                    precedence: packet.metric_precedence(),
                    value: packet.metric_value(),
                }))
            }
            OptionType::RouteInformation => Ok(Repr::RouteInformation(RouteInformation {
                prefix_length: packet.prefix_length(),
                preference: packet.route_preference(),
                lifetime: packet.route_lifetime(),
                prefix: packet.prefix(),
            })),
            OptionType::DodagConfiguration => Ok(Repr::DodagConfiguration(DodagConfiguration {
                authentication_enabled: packet.authentication_enabled(),
                path_control_size: packet.path_control_size(),
                dio_interval_doublings: packet.dio_interval_doublings(),
                dio_interval_min: packet.dio_interval_minimum(),
                dio_redundancy_constant: packet.dio_redundancy_constant(),
                max_rank_increase: packet.max_rank_increase(),
                minimum_hop_rank_increase: packet.minimum_hop_rank_increase(),
                objective_code_point: packet.objective_code_point(),
                default_lifetime: packet.default_lifetime(),
                lifetime_unit: packet.lifetime_unit(),
            })),
            OptionType::RplTarget => {
                if packet.target_prefix_length() > 128 {
                    return Err(Error);
                }

                Ok(Repr::RplTarget(RplTarget {
                    prefix_length: packet.target_prefix_length(),
                    prefix: packet.target_prefix(),
                }))
            }
            OptionType::TransitInformation => Ok(Repr::TransitInformation(TransitInformation {
                external: packet.is_external(),
                path_control: packet.path_control(),
                path_sequence: packet.path_sequence(),
                path_lifetime: packet.path_lifetime(),
                parent_address: packet.parent_address(),
            })),
            OptionType::SolicitedInformation => {
                Ok(Repr::SolicitedInformation(SolicitedInformation {
                    rpl_instance_id: InstanceId::from(packet.rpl_instance_id()),
                    version_predicate: packet.version_predicate(),
                    instance_id_predicate: packet.instance_id_predicate(),
                    dodag_id_predicate: packet.dodag_id_predicate(),
                    dodag_id: packet.dodag_id(),
                    version_number: packet.version_number(),
                }))
            }
            OptionType::PrefixInformation => Ok(Repr::PrefixInformation(PrefixInformation {
                prefix_length: packet.prefix_info_prefix_length(),
                on_link: packet.on_link(),
                autonomous_address_configuration: packet.autonomous_address_configuration(),
                router_address: packet.router_address(),
                valid_lifetime: packet.valid_lifetime(),
                preferred_lifetime: packet.preferred_lifetime(),
                destination_prefix: packet.destination_prefix(),
            })),
            OptionType::RplTargetDescriptor => Ok(Repr::RplTargetDescriptor(packet.descriptor())),
            OptionType::Unknown(_) => Err(Error),
        }
    }

    /// Return the length of an option that will be emitted from this high-level representation.
    pub fn buffer_len(&self) -> usize {
        match self {
            Repr::Pad1 => 1,
            Repr::PadN(size) => 2 + *size as usize,
            Repr::DagMetricContainer(_) => 2 + len::DAG_METRIC_CONTAINER as usize,
            Repr::RouteInformation(RouteInformation { prefix, .. }) => {
                2 + len::ROUTE_INFORMATION_MIN as usize + prefix.len()
            }
            Repr::DodagConfiguration(_) => 2 + len::DODAG_CONFIGURATION as usize,
            Repr::RplTarget(_) => 2 + len::RPL_TARGET as usize,
            Repr::TransitInformation(TransitInformation { parent_address, .. }) => {
                2 + if parent_address.is_some() {
                    len::TRANSIT_INFORMATION_NON_STORING as usize
                } else {
                    len::TRANSIT_INFORMATION_STORING as usize
                }
            }
            Repr::SolicitedInformation(_) => 2 + len::SOLICITED_INFORMATION as usize,
            Repr::PrefixInformation(_) => 2 + len::PREFIX_INFORMATION as usize,
            Repr::RplTargetDescriptor(_) => 2 + len::RPL_TARGET_DESCRIPTOR as usize,
        }
    }

    /// Emit a high-level representation into an RPL Option packet.
    ///
    /// The buffer must be at least [buffer_len] bytes long.
    ///
    /// [buffer_len]: #method.buffer_len
    pub fn emit<T: AsRef<[u8]> + AsMut<[u8]> + ?Sized>(&self, packet: &mut Packet<&mut T>) {
        packet.set_option_type(self.into());

        if !matches!(self, Repr::Pad1) {
            packet.set_option_length((self.buffer_len() - 2) as u8);
        }

        match self {
            Repr::Pad1 => {}
            Repr::PadN(size) => {
                packet.clear_padn(*size);
            }
            Repr::DagMetricContainer(DagMetricContainer {
                metric_type,
                flags,
                permanent,
                constraint,
                optional,
                recorded,
                aggregation,
                precedence,
                value,
            }) => {
                packet.set_metric_type(*metric_type);
                packet.clear_metric_flags();
                packet.set_metric_flags(*flags);
                packet.set_metric_permanent(*permanent);
                packet.set_metric_constraint(*constraint);
                packet.set_metric_optional(*optional);
                packet.set_metric_recorded(*recorded);
                packet.set_metric_aggregation(*aggregation);
                packet.set_metric_precedence(*precedence);
                packet.set_metric_object_length(2);
                packet.set_metric_value(*value);
            }
            Repr::RouteInformation(RouteInformation {
                prefix_length,
                preference,
                lifetime,
                prefix,
            }) => {
                packet.clear_route_info_reserved();
                packet.set_route_info_prefix_length(*prefix_length);
                packet.set_route_info_route_preference(*preference);
                packet.set_route_info_route_lifetime(*lifetime);
                packet.set_route_info_prefix(prefix);
            }
            Repr::DodagConfiguration(DodagConfiguration {
                authentication_enabled,
                path_control_size,
                dio_interval_doublings,
                dio_interval_min,
                dio_redundancy_constant,
                max_rank_increase,
                minimum_hop_rank_increase,
                objective_code_point,
                default_lifetime,
                lifetime_unit,
            }) => {
                packet.clear_dodag_conf_flags();
                packet.set_dodag_conf_authentication_enabled(*authentication_enabled);
                packet.set_dodag_conf_path_control_size(*path_control_size);
                packet.set_dodag_conf_dio_interval_doublings(*dio_interval_doublings);
                packet.set_dodag_conf_dio_interval_minimum(*dio_interval_min);
                packet.set_dodag_conf_dio_redundancy_constant(*dio_redundancy_constant);
                packet.set_dodag_conf_max_rank_increase(*max_rank_increase);
                packet.set_dodag_conf_minimum_hop_rank_increase(*minimum_hop_rank_increase);
                packet.set_dodag_conf_objective_code_point(*objective_code_point);
                packet.set_dodag_conf_default_lifetime(*default_lifetime);
                packet.set_dodag_conf_lifetime_unit(*lifetime_unit);
            }
            Repr::RplTarget(RplTarget {
                prefix_length,
                prefix,
            }) => {
                packet.clear_rpl_target_flags();
                packet.set_rpl_target_prefix_length(*prefix_length);
                packet.set_rpl_target_prefix(*prefix);
            }
            Repr::TransitInformation(TransitInformation {
                external,
                path_control,
                path_sequence,
                path_lifetime,
                parent_address,
            }) => {
                packet.clear_transit_info_flags();
                packet.set_transit_info_is_external(*external);
                packet.set_transit_info_path_control(*path_control);
                packet.set_transit_info_path_sequence(*path_sequence);
                packet.set_transit_info_path_lifetime(*path_lifetime);

                if let Some(address) = parent_address {
                    packet.set_transit_info_parent_address(*address);
                }
            }
            Repr::SolicitedInformation(SolicitedInformation {
                rpl_instance_id,
                version_predicate,
                instance_id_predicate,
                dodag_id_predicate,
                dodag_id,
                version_number,
            }) => {
                packet.clear_solicited_info_flags();
                packet.set_solicited_info_rpl_instance_id((*rpl_instance_id).into());
                packet.set_solicited_info_version_predicate(*version_predicate);
                packet.set_solicited_info_instance_id_predicate(*instance_id_predicate);
                packet.set_solicited_info_dodag_id_predicate(*dodag_id_predicate);
                packet.set_solicited_info_version_number(*version_number);
                packet.set_solicited_info_dodag_id(*dodag_id);
            }
            Repr::PrefixInformation(PrefixInformation {
                prefix_length,
                on_link,
                autonomous_address_configuration,
                router_address,
                valid_lifetime,
                preferred_lifetime,
                destination_prefix,
            }) => {
                packet.clear_prefix_info_reserved();
                packet.set_prefix_info_prefix_length(*prefix_length);
                packet.set_prefix_info_on_link(*on_link);
                packet.set_prefix_info_autonomous_address_configuration(
                    *autonomous_address_configuration,
                );
                packet.set_prefix_info_router_address(*router_address);
                packet.set_prefix_info_valid_lifetime(*valid_lifetime);
                packet.set_prefix_info_preferred_lifetime(*preferred_lifetime);
                packet.set_prefix_info_destination_prefix(*destination_prefix);
            }
            Repr::RplTargetDescriptor(descriptor) => {
                packet.set_rpl_target_descriptor_descriptor(*descriptor);
            }
        }
    }
}

/// An Iterator for RPL options.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OptionsIterator<'a> {
    pos: usize,
    length: usize,
    data: &'a [u8],
    hit_error: bool,
}

impl<'a> OptionsIterator<'a> {
    /// Create a new `OptionsIterator`, used to iterate over the
    /// options contained in a RPL header.
    pub fn new(data: &'a [u8]) -> Self {
        let length = data.len();
        Self {
            pos: 0,
            hit_error: false,
            length,
            data,
        }
    }
}

impl<'a> Iterator for OptionsIterator<'a> {
    type Item = Result<Repr<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos < self.length && !self.hit_error {
            // If we still have data to parse and we have not previously
            // hit an error, attempt to parse the next option.
            match Packet::new_checked(&self.data[self.pos..]) {
                Ok(hdr) => match Repr::parse(&hdr) {
                    Ok(repr) => {
                        self.pos += hdr.total_len();
                        Some(Ok(repr))
                    }
                    Err(e) => {
                        self.hit_error = true;
                        Some(Err(e))
                    }
                },
                Err(e) => {
                    self.hit_error = true;
                    Some(Err(e))
                }
            }
        } else {
            // If we failed to parse a previous option or hit the end of the
            // buffer, we do not continue to iterate.
            None
        }
    }
}
