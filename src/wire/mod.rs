/*! Low-level packet access and construction.

The `wire` module deals with the RPL control message formats and the IPv6
addressing they carry. Like the rest of the crate it never allocates.

Every message family is exposed on two levels:

 * First, it provides functions to extract fields from sequences of octets,
   and to insert fields into sequences of octets. This happens through the
   `Packet` family of structures, e.g. [RplPacket] or [RplOptionPacket].
 * Second, in cases where the space of valid field values is much smaller
   than the space of possible field values, it provides a compact, high-level
   representation of message data that can be parsed from and emitted into
   a sequence of octets. This happens through the `Repr` family of structs
   and enums, e.g. [RplRepr] or [RplOptionRepr].

The payloads handled here start right after the ICMPv6 type and code, which
the transport owns. The first four bytes of every emitted control message are
also handed to the transport separately, see [rpl::split_header].

[RplPacket]: rpl/struct.Packet.html
[RplOptionPacket]: rpl/options/struct.Packet.html
[RplRepr]: rpl/enum.Repr.html
[RplOptionRepr]: rpl/options/enum.Repr.html
*/

use core::fmt;

mod field {
    pub type Field = ::core::ops::Range<usize>;
    pub type Rest = ::core::ops::RangeFrom<usize>;
}

/// IPv6 addresses and prefixes.
pub mod ipv6;
pub mod rpl;

pub use self::ipv6::{
    Address as Ipv6Address, AddressExt as Ipv6AddressExt, Cidr as Ipv6Cidr,
    LINK_LOCAL_ALL_RPL_NODES,
};

pub use self::rpl::{
    options::{
        DagMetricContainer as RplDagMetricContainer, DodagConfiguration as RplDodagConfiguration,
        Repr as RplOptionRepr, TransitInformation as RplTransitInformation,
    },
    InstanceId as RplInstanceId, ModeOfOperation as RplModeOfOperation, Packet as RplPacket,
    Repr as RplRepr, RplControlMessage,
};

/// Parsing or emitting a packet failed.
///
/// Either the buffer is malformed, too short, or holds something that is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Error;

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wire::Error")
    }
}

pub type Result<T> = core::result::Result<T, Error>;
