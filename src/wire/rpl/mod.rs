//! Implementation of the RPL packet formats. See [RFC 6550 § 6].
//!
//! The buffers handled here hold the control message body, starting with the first byte after
//! the ICMPv6 code. The transport carries the type and code itself, together with the first
//! [HEADER_LEN] bytes of the body, see [split_header] and [join_header].
//!
//! [RFC 6550 § 6]: https://datatracker.ietf.org/doc/html/rfc6550#section-6

use byteorder::{ByteOrder, NetworkEndian};

pub use super::{Error, Result};
use crate::wire::ipv6::{Address, AddressExt};

pub mod instance_id;
pub mod options;

pub use instance_id::InstanceId;

use options::{
    DagMetricContainer, DodagConfiguration, PrefixInformation, RouteInformation, RplTarget,
    SolicitedInformation, TransitInformation,
};

/// The ICMPv6 message type shared by all RPL control messages.
pub const ICMPV6_TYPE: u8 = 155;

/// Number of body bytes the transport carries next to the type and code.
pub const HEADER_LEN: usize = 4;

/// Largest control message body this crate emits or accepts.
pub const MAX_LENGTH: usize = 250;

/// Maximum number of RPL Target options in a single DAO.
pub const MAX_RPL_TARGETS: usize = 20;

/// Maximum number of Transit Information options in a single DAO.
pub const MAX_DAO_TRANSIENT_INFOS: usize = 5;

mod field {
    use crate::wire::field::*;

    pub const RPL_INSTANCE_ID: usize = 0;

    // DODAG information solicitation fields (DIS)
    pub const DIS_FLAGS: usize = 0;
    pub const DIS_RESERVED: usize = 1;

    // DODAG information object fields (DIO)
    pub const DIO_VERSION_NUMBER: usize = 1;
    pub const DIO_RANK: Field = 2..4;
    pub const DIO_GROUNDED: usize = 4;
    pub const DIO_MOP: usize = 4;
    pub const DIO_PRF: usize = 4;
    pub const DIO_DTSN: usize = 5;
    pub const DIO_FLAGS: usize = 6;
    pub const DIO_RESERVED: usize = 7;
    pub const DIO_DODAG_ID: Field = 8..8 + 16;

    // Destination advertisement object (DAO)
    pub const DAO_K: usize = 1;
    pub const DAO_D: usize = 1;
    pub const DAO_RESERVED: usize = 2;
    pub const DAO_SEQUENCE: usize = 3;
    pub const DAO_DODAG_ID: Field = 4..4 + 16;

    // Destination advertisement object ack (DAO-ACK)
    pub const DAO_ACK_D: usize = 1;
    pub const DAO_ACK_SEQUENCE: usize = 2;
    pub const DAO_ACK_STATUS: usize = 3;
    pub const DAO_ACK_DODAG_ID: Field = 4..4 + 16;
}

enum_with_unknown! {
    /// RPL Control Message subtypes.
    pub enum RplControlMessage(u8) {
        DodagInformationSolicitation = 0x00,
        DodagInformationObject = 0x01,
        DestinationAdvertisementObject = 0x02,
        DestinationAdvertisementObjectAck = 0x03,
        SecureDodagInformationSolicitation = 0x80,
        SecureDodagInformationObject = 0x81,
        SecureDestinationAdvertisementObject = 0x82,
        SecureDestinationAdvertisementObjectAck = 0x83,
        ConsistencyCheck = 0x8a,
    }
}

impl core::fmt::Display for RplControlMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RplControlMessage::DodagInformationSolicitation => {
                write!(f, "DODAG information solicitation (DIS)")
            }
            RplControlMessage::DodagInformationObject => {
                write!(f, "DODAG information object (DIO)")
            }
            RplControlMessage::DestinationAdvertisementObject => {
                write!(f, "destination advertisement object (DAO)")
            }
            RplControlMessage::DestinationAdvertisementObjectAck => write!(
                f,
                "destination advertisement object acknowledgement (DAO-ACK)"
            ),
            RplControlMessage::SecureDodagInformationSolicitation => {
                write!(f, "secure DODAG information solicitation (DIS)")
            }
            RplControlMessage::SecureDodagInformationObject => {
                write!(f, "secure DODAG information object (DIO)")
            }
            RplControlMessage::SecureDestinationAdvertisementObject => {
                write!(f, "secure destination advertisement object (DAO)")
            }
            RplControlMessage::SecureDestinationAdvertisementObjectAck => write!(
                f,
                "secure destination advertisement object acknowledgement (DAO-ACK)"
            ),
            RplControlMessage::ConsistencyCheck => write!(f, "consistency check (CC)"),
            RplControlMessage::Unknown(id) => write!(f, "{}", id),
        }
    }
}

/// Split an emitted control message into the header bytes handed to the transport and the
/// remaining payload. Messages shorter than [HEADER_LEN] are padded with zeros.
pub fn split_header(buffer: &[u8]) -> ([u8; HEADER_LEN], &[u8]) {
    let mut header = [0u8; HEADER_LEN];
    let len = buffer.len().min(HEADER_LEN);
    header[..len].copy_from_slice(&buffer[..len]);
    (header, &buffer[len..])
}

/// Rebuild a control message body from the header bytes and payload delivered by the transport.
///
/// Returns the number of bytes written to `buffer`, or an error when the message does not fit
/// into [MAX_LENGTH] bytes or into `buffer`.
pub fn join_header(header: [u8; HEADER_LEN], payload: &[u8], buffer: &mut [u8]) -> Result<usize> {
    let len = HEADER_LEN + payload.len();
    if len > MAX_LENGTH || len > buffer.len() {
        return Err(Error);
    }

    buffer[..HEADER_LEN].copy_from_slice(&header);
    buffer[HEADER_LEN..len].copy_from_slice(payload);
    Ok(len)
}

/// A read/write wrapper around a RPL control message body.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> Packet<T> {
    /// Imbue a raw octet buffer with RPL control message structure.
    pub const fn new_unchecked(buffer: T) -> Packet<T> {
        Packet { buffer }
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(buffer: T, message: RplControlMessage) -> Result<Packet<T>> {
        let packet = Self::new_unchecked(buffer);
        packet.check_len(message)?;
        Ok(packet)
    }

    /// Ensure that no accessor method of the given message type will panic if called.
    ///
    /// Returns `Err(Error)` if the buffer is shorter than the fixed header of the message, or if
    /// the message type is not supported.
    pub fn check_len(&self, message: RplControlMessage) -> Result<()> {
        let len = self.buffer.as_ref().len();
        let min = match message {
            RplControlMessage::DodagInformationSolicitation => field::DIS_RESERVED + 1,
            RplControlMessage::DodagInformationObject => field::DIO_DODAG_ID.end,
            RplControlMessage::DestinationAdvertisementObject => {
                if len <= field::DAO_SEQUENCE {
                    return Err(Error);
                }
                if self.dao_dodag_id_present() {
                    field::DAO_DODAG_ID.end
                } else {
                    field::DAO_SEQUENCE + 1
                }
            }
            RplControlMessage::DestinationAdvertisementObjectAck => {
                if len <= field::DAO_ACK_STATUS {
                    return Err(Error);
                }
                if self.dao_ack_dodag_id_present() {
                    field::DAO_ACK_DODAG_ID.end
                } else {
                    field::DAO_ACK_STATUS + 1
                }
            }
            _ => return Err(Error),
        };

        if len < min {
            Err(Error)
        } else {
            Ok(())
        }
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Return the RPL instance ID.
    #[inline]
    pub fn rpl_instance_id(&self) -> InstanceId {
        get!(self.buffer, into: InstanceId, field: field::RPL_INSTANCE_ID)
    }

    /// Return the offset at which the options of the given message start.
    fn options_offset(&self, message: RplControlMessage) -> usize {
        match message {
            RplControlMessage::DodagInformationSolicitation => field::DIS_RESERVED + 1,
            RplControlMessage::DodagInformationObject => field::DIO_DODAG_ID.end,
            RplControlMessage::DestinationAdvertisementObject => {
                if self.dao_dodag_id_present() {
                    field::DAO_DODAG_ID.end
                } else {
                    field::DAO_SEQUENCE + 1
                }
            }
            RplControlMessage::DestinationAdvertisementObjectAck => {
                if self.dao_ack_dodag_id_present() {
                    field::DAO_ACK_DODAG_ID.end
                } else {
                    field::DAO_ACK_STATUS + 1
                }
            }
            _ => self.buffer.as_ref().len(),
        }
    }
}

impl<'p, T: AsRef<[u8]> + ?Sized> Packet<&'p T> {
    /// Return a pointer to the options of the given message.
    pub fn options(&self, message: RplControlMessage) -> Result<&'p [u8]> {
        self.check_len(message)?;
        Ok(&self.buffer.as_ref()[self.options_offset(message)..])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the RPL Instance ID field.
    #[inline]
    pub fn set_rpl_instance_id(&mut self, value: u8) {
        set!(self.buffer, value, field: field::RPL_INSTANCE_ID)
    }
}

impl<'p, T: AsRef<[u8]> + AsMut<[u8]> + ?Sized> Packet<&'p mut T> {
    /// Return a pointer to the options of the given message.
    pub fn options_mut(&mut self, message: RplControlMessage) -> &mut [u8] {
        let offset = self.options_offset(message);
        &mut self.buffer.as_mut()[offset..]
    }
}

/// Getters for the DODAG information solicitation (DIS) message.
///
/// ```txt
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Flags     |   Reserved    |   Option(s)...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the DIS flags field.
    #[inline]
    pub fn dis_flags(&self) -> u8 {
        get!(self.buffer, field: field::DIS_FLAGS)
    }

    /// Return the DIS reserved field.
    #[inline]
    pub fn dis_reserved(&self) -> u8 {
        get!(self.buffer, field: field::DIS_RESERVED)
    }
}

/// Setters for the DODAG information solicitation (DIS) message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Clear the DIS flags field.
    pub fn clear_dis_flags(&mut self) {
        self.buffer.as_mut()[field::DIS_FLAGS] = 0;
    }

    /// Clear the DIS rserved field.
    pub fn clear_dis_reserved(&mut self) {
        self.buffer.as_mut()[field::DIS_RESERVED] = 0;
    }
}

enum_with_unknown! {
    /// How a DODAG maintains downward routes.
    pub enum ModeOfOperation(u8) {
        NoDownwardRoutesMaintained = 0x00,
        NonStoringMode = 0x01,
        StoringModeWithoutMulticast = 0x02,
        StoringModeWithMulticast = 0x03,
    }
}

impl Default for ModeOfOperation {
    fn default() -> Self {
        Self::StoringModeWithoutMulticast
    }
}

impl ModeOfOperation {
    /// Return `true` for both storing modes.
    pub fn is_storing(&self) -> bool {
        matches!(
            self,
            Self::StoringModeWithoutMulticast | Self::StoringModeWithMulticast
        )
    }
}

/// The bit-packed `G|0|MOP|Prf` byte of a DIO.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DioFlags(pub u8);

impl DioFlags {
    const GROUNDED_SHIFT: u8 = 7;
    const MOP_SHIFT: u8 = 3;
    const MOP_MASK: u8 = 0b111;
    const PRF_MASK: u8 = 0b111;

    pub fn new(grounded: bool, mode_of_operation: ModeOfOperation, preference: u8) -> Self {
        let mop: u8 = mode_of_operation.into();
        Self(
            ((grounded as u8) << Self::GROUNDED_SHIFT)
                | ((mop & Self::MOP_MASK) << Self::MOP_SHIFT)
                | (preference & Self::PRF_MASK),
        )
    }

    pub fn grounded(&self) -> bool {
        (self.0 >> Self::GROUNDED_SHIFT) & 0b1 == 0b1
    }

    pub fn mode_of_operation(&self) -> ModeOfOperation {
        ModeOfOperation::from((self.0 >> Self::MOP_SHIFT) & Self::MOP_MASK)
    }

    pub fn preference(&self) -> u8 {
        self.0 & Self::PRF_MASK
    }
}

/// Getters for the DODAG information object (DIO) message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | RPLInstanceID |Version Number |             Rank              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |G|0| MOP | Prf |     DTSN      |     Flags     |   Reserved    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +                            DODAGID                            +
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Option(s)...
/// +-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Return the Version Number field.
    #[inline]
    pub fn dio_version_number(&self) -> u8 {
        get!(self.buffer, field: field::DIO_VERSION_NUMBER)
    }

    /// Return the Rank field.
    #[inline]
    pub fn dio_rank(&self) -> u16 {
        get!(self.buffer, u16, field: field::DIO_RANK)
    }

    /// Return the bit-packed grounded, MOP and preference byte.
    #[inline]
    pub fn dio_flags(&self) -> DioFlags {
        DioFlags(self.buffer.as_ref()[field::DIO_GROUNDED])
    }

    /// Return the value of the Grounded flag.
    #[inline]
    pub fn dio_grounded(&self) -> bool {
        self.dio_flags().grounded()
    }

    /// Return the mode of operation field.
    #[inline]
    pub fn dio_mode_of_operation(&self) -> ModeOfOperation {
        self.dio_flags().mode_of_operation()
    }

    /// Return the DODAG preference field.
    #[inline]
    pub fn dio_dodag_preference(&self) -> u8 {
        self.dio_flags().preference()
    }

    /// Return the destination advertisement trigger sequence number.
    #[inline]
    pub fn dio_dest_adv_trigger_seq_number(&self) -> u8 {
        get!(self.buffer, field: field::DIO_DTSN)
    }

    /// Return the DODAG id, which is an IPv6 address.
    #[inline]
    pub fn dio_dodag_id(&self) -> Address {
        get!(
            self.buffer,
            into: Address,
            fun: from_bytes,
            field: field::DIO_DODAG_ID
        )
    }
}

/// Setters for the DODAG information object (DIO) message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the Version Number field.
    #[inline]
    pub fn set_dio_version_number(&mut self, value: u8) {
        set!(self.buffer, value, field: field::DIO_VERSION_NUMBER)
    }

    /// Set the Rank field.
    #[inline]
    pub fn set_dio_rank(&mut self, value: u16) {
        set!(self.buffer, value, u16, field: field::DIO_RANK)
    }

    /// Set the bit-packed grounded, MOP and preference byte.
    #[inline]
    pub fn set_dio_flags(&mut self, flags: DioFlags) {
        debug_assert_eq!(field::DIO_GROUNDED, field::DIO_MOP);
        debug_assert_eq!(field::DIO_MOP, field::DIO_PRF);
        self.buffer.as_mut()[field::DIO_PRF] = flags.0;
    }

    /// Set the destination advertisement trigger sequence number.
    #[inline]
    pub fn set_dio_dest_adv_trigger_seq_number(&mut self, value: u8) {
        set!(self.buffer, value, field: field::DIO_DTSN)
    }

    /// Clear the flags and reserved fields.
    #[inline]
    pub fn clear_dio_flags(&mut self) {
        self.buffer.as_mut()[field::DIO_FLAGS] = 0;
        self.buffer.as_mut()[field::DIO_RESERVED] = 0;
    }

    /// Set the DODAG id.
    #[inline]
    pub fn set_dio_dodag_id(&mut self, address: Address) {
        set!(self.buffer, address: address, field: field::DIO_DODAG_ID)
    }
}

/// Getters for the Destination Advertisement Object (DAO) message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | RPLInstanceID |K|D|   Flags   |   Reserved    | DAOSequence   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +                            DODAGID*                           +
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Option(s)...
/// +-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Returns the Expect DAO-ACK flag.
    #[inline]
    pub fn dao_ack_request(&self) -> bool {
        get!(self.buffer, bool, field: field::DAO_K, shift: 7, mask: 0b1)
    }

    /// Returns the flag indicating that the DODAG ID is present or not.
    #[inline]
    pub fn dao_dodag_id_present(&self) -> bool {
        get!(self.buffer, bool, field: field::DAO_D, shift: 6, mask: 0b1)
    }

    /// Returns the DODAG sequence number.
    #[inline]
    pub fn dao_dodag_sequence(&self) -> u8 {
        get!(self.buffer, field: field::DAO_SEQUENCE)
    }

    /// Returns the DODAG ID, an IPv6 address, when it is present.
    #[inline]
    pub fn dao_dodag_id(&self) -> Option<Address> {
        if self.dao_dodag_id_present() {
            Some(Address::from_bytes(
                &self.buffer.as_ref()[field::DAO_DODAG_ID],
            ))
        } else {
            None
        }
    }
}

/// Setters for the Destination Advertisement Object (DAO) message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Clear the flags and reserved fields.
    #[inline]
    pub fn clear_dao_flags(&mut self) {
        self.buffer.as_mut()[field::DAO_K] = 0;
        self.buffer.as_mut()[field::DAO_RESERVED] = 0;
    }

    /// Set the Expect DAO-ACK flag.
    #[inline]
    pub fn set_dao_ack_request(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::DAO_K, shift: 7, mask: 0b1)
    }

    /// Set the flag indicating that the DODAG ID is present or not.
    #[inline]
    pub fn set_dao_dodag_id_present(&mut self, value: bool) {
        set!(self.buffer, value, bool, field: field::DAO_D, shift: 6, mask: 0b1)
    }

    /// Set the DODAG sequence number.
    #[inline]
    pub fn set_dao_dodag_sequence(&mut self, value: u8) {
        set!(self.buffer, value, field: field::DAO_SEQUENCE)
    }

    /// Set the DODAG ID.
    #[inline]
    pub fn set_dao_dodag_id(&mut self, address: Option<Address>) {
        match address {
            Some(address) => {
                self.buffer.as_mut()[field::DAO_DODAG_ID].copy_from_slice(&address.octets());
                self.set_dao_dodag_id_present(true);
            }
            None => {
                self.set_dao_dodag_id_present(false);
            }
        }
    }
}

/// Getters for the Destination Advertisement Object acknowledgement (DAO-ACK) message.
///
/// ```txt
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | RPLInstanceID |D|  Reserved   |  DAOSequence  |    Status     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +                            DODAGID*                           +
/// |                                                               |
/// +                                                               +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   Option(s)...
/// +-+-+-+-+-+-+-+-+
/// ```
impl<T: AsRef<[u8]>> Packet<T> {
    /// Returns the flag indicating that the DODAG ID is present or not.
    #[inline]
    pub fn dao_ack_dodag_id_present(&self) -> bool {
        get!(self.buffer, bool, field: field::DAO_ACK_D, shift: 7, mask: 0b1)
    }

    /// Return the DODAG sequence number.
    #[inline]
    pub fn dao_ack_sequence(&self) -> u8 {
        get!(self.buffer, field: field::DAO_ACK_SEQUENCE)
    }

    /// Return the DOA status field.
    #[inline]
    pub fn dao_ack_status(&self) -> u8 {
        get!(self.buffer, field: field::DAO_ACK_STATUS)
    }

    /// Returns the DODAG ID, an IPv6 address, when it is present.
    #[inline]
    pub fn dao_ack_dodag_id(&self) -> Option<Address> {
        if self.dao_ack_dodag_id_present() {
            Some(Address::from_bytes(
                &self.buffer.as_ref()[field::DAO_ACK_DODAG_ID],
            ))
        } else {
            None
        }
    }
}

/// Setters for the Destination Advertisement Object acknowledgement (DAO-ACK) message.
impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the flag indicating that the DODAG ID is present or not.
    #[inline]
    pub fn set_dao_ack_dodag_id_present(&mut self, value: bool) {
        self.buffer.as_mut()[field::DAO_ACK_D] = 0;
        set!(self.buffer, value, bool, field: field::DAO_ACK_D, shift: 7, mask: 0b1)
    }

    /// Set the DODAG sequence number.
    #[inline]
    pub fn set_dao_ack_sequence(&mut self, value: u8) {
        set!(self.buffer, value, field: field::DAO_ACK_SEQUENCE)
    }

    /// Set the status field.
    #[inline]
    pub fn set_dao_ack_status(&mut self, value: u8) {
        set!(self.buffer, value, field: field::DAO_ACK_STATUS)
    }

    /// Set the DODAG ID.
    #[inline]
    pub fn set_dao_ack_dodag_id(&mut self, address: Option<Address>) {
        match address {
            Some(address) => {
                self.buffer.as_mut()[field::DAO_ACK_DODAG_ID].copy_from_slice(&address.octets());
                self.set_dao_ack_dodag_id_present(true);
            }
            None => {
                self.set_dao_ack_dodag_id_present(false);
            }
        }
    }
}

/// Selects the options that get emitted with a control message.
///
/// An option is only emitted when it is both present in the representation and selected here.
/// Padding is emitted right after the fixed header and is skipped again when parsing.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmitOptions {
    pub pad1: bool,
    pub padn: Option<u8>,
    pub metric_container: bool,
    pub route_information: bool,
    pub dodag_configuration: bool,
    pub prefix_information: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            pad1: false,
            padn: None,
            metric_container: true,
            route_information: true,
            dodag_configuration: true,
            prefix_information: true,
        }
    }
}

impl EmitOptions {
    fn padding(&self) -> impl Iterator<Item = options::Repr<'static>> {
        self.pad1
            .then_some(options::Repr::Pad1)
            .into_iter()
            .chain(self.padn.map(options::Repr::PadN))
    }
}

/// A high-level representation of a RPL control message.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Repr<'p> {
    DodagInformationSolicitation(DodagInformationSolicitation),
    DodagInformationObject(DodagInformationObject<'p>),
    DestinationAdvertisementObject(DestinationAdvertisementObject),
    DestinationAdvertisementObjectAck(DestinationAdvertisementObjectAck),
}

/// A high-level representation of a RPL DODAG Information Solicitation (DIS).
#[derive(Debug, Default, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DodagInformationSolicitation {
    pub solicited_information: Option<SolicitedInformation>,
}

/// A high-level representation of a RPL DODAG Information Object (DIO).
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DodagInformationObject<'p> {
    pub rpl_instance_id: InstanceId,
    pub version_number: u8,
    pub rank: u16,
    pub grounded: bool,
    pub mode_of_operation: ModeOfOperation,
    pub dodag_preference: u8,
    pub dtsn: u8,
    pub dodag_id: Address,
    pub metric_container: Option<DagMetricContainer>,
    pub route_information: Option<RouteInformation<'p>>,
    pub dodag_configuration: Option<DodagConfiguration>,
    pub prefix_information: Option<PrefixInformation>,
}

/// A target advertised in a DAO, pointing at the Transit Information that covers it.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaoTarget {
    pub target: RplTarget,
    pub transit: u8,
}

/// A high-level representation of a RPL Destination Advertisement Object (DAO).
///
/// Every target refers to an entry in `transits`. A representation emits exactly what it parses
/// from when targets sharing a transit are adjacent and the transits are used in order.
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DestinationAdvertisementObject {
    pub rpl_instance_id: InstanceId,
    pub expect_ack: bool,
    pub sequence: u8,
    pub dodag_id: Option<Address>,
    pub targets: heapless::Vec<DaoTarget, MAX_RPL_TARGETS>,
    pub transits: heapless::Vec<TransitInformation, MAX_DAO_TRANSIENT_INFOS>,
}

/// A high-level representation of a RPL Destination Advertisement Object Acknowledgement
/// (DAO-ACK).
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DestinationAdvertisementObjectAck {
    pub rpl_instance_id: InstanceId,
    pub sequence: u8,
    pub status: u8,
    pub dodag_id: Option<Address>,
}

impl core::fmt::Display for Repr<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Repr::DodagInformationSolicitation { .. } => {
                write!(f, "DIS")?;
            }
            Repr::DodagInformationObject(DodagInformationObject {
                rpl_instance_id,
                version_number,
                rank,
                grounded,
                mode_of_operation,
                dodag_preference,
                dtsn,
                dodag_id,
                ..
            }) => {
                write!(
                    f,
                    "DIO IID={rpl_instance_id} V={version_number} R={rank} G={grounded} \
                    MOP={mode_of_operation:?} Pref={dodag_preference} \
                    DTSN={dtsn} DODAGID={dodag_id}"
                )?;
            }
            Repr::DestinationAdvertisementObject(DestinationAdvertisementObject {
                rpl_instance_id,
                expect_ack,
                sequence,
                dodag_id,
                targets,
                ..
            }) => {
                write!(
                    f,
                    "DAO IID={rpl_instance_id} Ack={expect_ack} Seq={sequence} \
                    DODAGID={dodag_id:?} Targets={}",
                    targets.len()
                )?;
            }
            Repr::DestinationAdvertisementObjectAck(DestinationAdvertisementObjectAck {
                rpl_instance_id,
                sequence,
                status,
                dodag_id,
            }) => {
                write!(
                    f,
                    "DAO-ACK IID={rpl_instance_id} Seq={sequence} Status={status} \
                    DODAGID={dodag_id:?}"
                )?;
            }
        };

        Ok(())
    }
}

impl DestinationAdvertisementObject {
    /// Iterate over the options in emission order: each run of targets sharing a transit is
    /// followed by that transit.
    fn options(&self) -> Result<impl Iterator<Item = options::Repr<'static>> + '_> {
        if self
            .targets
            .iter()
            .any(|t| t.transit as usize >= self.transits.len())
        {
            return Err(Error);
        }

        Ok(self.targets.iter().enumerate().flat_map(move |(i, t)| {
            let last_of_run = self
                .targets
                .get(i + 1)
                .map_or(true, |next| next.transit != t.transit);

            core::iter::once(options::Repr::RplTarget(t.target)).chain(
                last_of_run
                    .then(|| options::Repr::TransitInformation(self.transits[t.transit as usize])),
            )
        }))
    }
}

impl<'p> Repr<'p> {
    /// Return the control message subtype of this representation.
    pub fn message(&self) -> RplControlMessage {
        match self {
            Repr::DodagInformationSolicitation(_) => RplControlMessage::DodagInformationSolicitation,
            Repr::DodagInformationObject(_) => RplControlMessage::DodagInformationObject,
            Repr::DestinationAdvertisementObject(_) => {
                RplControlMessage::DestinationAdvertisementObject
            }
            Repr::DestinationAdvertisementObjectAck(_) => {
                RplControlMessage::DestinationAdvertisementObjectAck
            }
        }
    }

    /// Parse a RPL control message of the given subtype and return a high-level representation.
    pub fn parse<T: AsRef<[u8]> + ?Sized>(
        message: RplControlMessage,
        packet: &Packet<&'p T>,
    ) -> Result<Self> {
        packet.check_len(message)?;

        let iter = options::OptionsIterator::new(packet.options(message)?);

        match message {
            RplControlMessage::DodagInformationSolicitation => {
                let mut dis = DodagInformationSolicitation::default();
                for opt in iter {
                    if let options::Repr::SolicitedInformation(info) = opt? {
                        dis.solicited_information = Some(info);
                    }
                }
                Ok(Repr::DodagInformationSolicitation(dis))
            }
            RplControlMessage::DodagInformationObject => {
                let mut dio = DodagInformationObject {
                    rpl_instance_id: packet.rpl_instance_id(),
                    version_number: packet.dio_version_number(),
                    rank: packet.dio_rank(),
                    grounded: packet.dio_grounded(),
                    mode_of_operation: packet.dio_mode_of_operation(),
                    dodag_preference: packet.dio_dodag_preference(),
                    dtsn: packet.dio_dest_adv_trigger_seq_number(),
                    dodag_id: packet.dio_dodag_id(),
                    metric_container: None,
                    route_information: None,
                    dodag_configuration: None,
                    prefix_information: None,
                };

                for opt in iter {
                    match opt? {
                        options::Repr::DagMetricContainer(mc) => dio.metric_container = Some(mc),
                        options::Repr::RouteInformation(ri) => dio.route_information = Some(ri),
                        options::Repr::DodagConfiguration(conf) => {
                            dio.dodag_configuration = Some(conf)
                        }
                        options::Repr::PrefixInformation(pi) => dio.prefix_information = Some(pi),
                        opt => net_trace!("ignoring {} in DIO", opt),
                    }
                }

                Ok(Repr::DodagInformationObject(dio))
            }
            RplControlMessage::DestinationAdvertisementObject => {
                let mut dao = DestinationAdvertisementObject {
                    rpl_instance_id: packet.rpl_instance_id(),
                    expect_ack: packet.dao_ack_request(),
                    sequence: packet.dao_dodag_sequence(),
                    dodag_id: packet.dao_dodag_id(),
                    targets: heapless::Vec::new(),
                    transits: heapless::Vec::new(),
                };

                // Targets waiting for the transit that covers them.
                let mut pending = false;

                for opt in iter {
                    match opt? {
                        options::Repr::RplTarget(target) => {
                            dao.targets
                                .push(DaoTarget {
                                    target,
                                    transit: dao.transits.len() as u8,
                                })
                                .map_err(|_| Error)?;
                            pending = true;
                        }
                        options::Repr::TransitInformation(transit) => {
                            if !pending {
                                return Err(Error);
                            }
                            dao.transits.push(transit).map_err(|_| Error)?;
                            pending = false;
                        }
                        opt => net_trace!("ignoring {} in DAO", opt),
                    }
                }

                if pending {
                    return Err(Error);
                }

                Ok(Repr::DestinationAdvertisementObject(dao))
            }
            RplControlMessage::DestinationAdvertisementObjectAck => Ok(
                Repr::DestinationAdvertisementObjectAck(DestinationAdvertisementObjectAck {
                    rpl_instance_id: packet.rpl_instance_id(),
                    sequence: packet.dao_ack_sequence(),
                    status: packet.dao_ack_status(),
                    dodag_id: packet.dao_ack_dodag_id(),
                }),
            ),
            _ => Err(Error),
        }
    }

    fn header_len(&self) -> usize {
        match self {
            Repr::DodagInformationSolicitation { .. } => 2,
            Repr::DodagInformationObject { .. } => 24,
            Repr::DestinationAdvertisementObject(DestinationAdvertisementObject {
                dodag_id,
                ..
            })
            | Repr::DestinationAdvertisementObjectAck(DestinationAdvertisementObjectAck {
                dodag_id,
                ..
            }) => {
                if dodag_id.is_some() {
                    20
                } else {
                    4
                }
            }
        }
    }

    /// Call `f` with every option emitted for this representation, in order.
    fn for_each_option(
        &self,
        include: &EmitOptions,
        mut f: impl FnMut(&options::Repr) -> Result<()>,
    ) -> Result<()> {
        if matches!(self, Repr::DestinationAdvertisementObjectAck(_)) {
            return Ok(());
        }

        for pad in include.padding() {
            f(&pad)?;
        }

        match self {
            Repr::DodagInformationSolicitation(DodagInformationSolicitation {
                solicited_information,
            }) => {
                if let Some(info) = solicited_information {
                    f(&options::Repr::SolicitedInformation(*info))?;
                }
            }
            Repr::DodagInformationObject(dio) => {
                if let (true, Some(mc)) = (include.metric_container, dio.metric_container) {
                    f(&options::Repr::DagMetricContainer(mc))?;
                }
                if let (true, Some(ri)) = (include.route_information, dio.route_information) {
                    f(&options::Repr::RouteInformation(ri))?;
                }
                if let (true, Some(conf)) = (include.dodag_configuration, dio.dodag_configuration)
                {
                    f(&options::Repr::DodagConfiguration(conf))?;
                }
                if let (true, Some(pi)) = (include.prefix_information, dio.prefix_information) {
                    f(&options::Repr::PrefixInformation(pi))?;
                }
            }
            Repr::DestinationAdvertisementObject(dao) => {
                for opt in dao.options()? {
                    f(&opt)?;
                }
            }
            Repr::DestinationAdvertisementObjectAck(_) => {}
        }

        Ok(())
    }

    /// Return the length of a message that will be emitted from this high-level representation.
    /// The length also contains the lengths of the emitted options.
    pub fn buffer_len(&self, include: &EmitOptions) -> Result<usize> {
        let mut len = self.header_len();
        self.for_each_option(include, |opt| {
            len += opt.buffer_len();
            Ok(())
        })?;
        Ok(len)
    }

    /// Emit a high-level representation into a RPL control message body. This also emits the
    /// options the high-level representation contains.
    ///
    /// Returns the number of bytes written, or an error when the buffer is too small or a DAO
    /// target refers to a missing transit.
    pub fn emit<T: AsRef<[u8]> + AsMut<[u8]> + ?Sized>(
        &self,
        packet: &mut Packet<&mut T>,
        include: &EmitOptions,
    ) -> Result<usize> {
        let len = self.buffer_len(include)?;
        if packet.buffer.as_ref().len() < len {
            return Err(Error);
        }

        match self {
            Repr::DodagInformationSolicitation { .. } => {
                packet.clear_dis_flags();
                packet.clear_dis_reserved();
            }
            Repr::DodagInformationObject(DodagInformationObject {
                rpl_instance_id,
                version_number,
                rank,
                grounded,
                mode_of_operation,
                dodag_preference,
                dtsn,
                dodag_id,
                ..
            }) => {
                packet.set_rpl_instance_id((*rpl_instance_id).into());
                packet.set_dio_version_number(*version_number);
                packet.set_dio_rank(*rank);
                packet.set_dio_flags(DioFlags::new(
                    *grounded,
                    *mode_of_operation,
                    *dodag_preference,
                ));
                packet.set_dio_dest_adv_trigger_seq_number(*dtsn);
                packet.clear_dio_flags();
                packet.set_dio_dodag_id(*dodag_id);
            }
            Repr::DestinationAdvertisementObject(DestinationAdvertisementObject {
                rpl_instance_id,
                expect_ack,
                sequence,
                dodag_id,
                ..
            }) => {
                packet.set_rpl_instance_id((*rpl_instance_id).into());
                packet.clear_dao_flags();
                packet.set_dao_ack_request(*expect_ack);
                packet.set_dao_dodag_sequence(*sequence);
                packet.set_dao_dodag_id(*dodag_id);
            }
            Repr::DestinationAdvertisementObjectAck(DestinationAdvertisementObjectAck {
                rpl_instance_id,
                sequence,
                status,
                dodag_id,
            }) => {
                packet.set_rpl_instance_id((*rpl_instance_id).into());
                packet.set_dao_ack_sequence(*sequence);
                packet.set_dao_ack_status(*status);
                packet.set_dao_ack_dodag_id(*dodag_id);
            }
        }

        let mut buffer = &mut packet.options_mut(self.message())[..len - self.header_len()];
        self.for_each_option(include, |opt| {
            let opt_len = opt.buffer_len();
            let (head, tail) = core::mem::take(&mut buffer).split_at_mut(opt_len);
            opt.emit(&mut options::Packet::new_unchecked(head));
            buffer = tail;
            Ok(())
        })?;

        Ok(len)
    }
}
