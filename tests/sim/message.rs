use smolrpl::time::*;
use smolrpl::wire::rpl::HEADER_LEN;
use smolrpl::wire::*;

/// One transmission over one link.
#[derive(Debug, Clone)]
pub struct Message {
    pub at: Instant,
    /// Id of the transmitting node.
    pub from: usize,
    /// The link layer receiver: a node id, or `None` for a multicast.
    pub to: Option<usize>,
    /// The IPv6 destination of the message.
    pub dst: Ipv6Address,
    pub code: RplControlMessage,
    pub header: [u8; HEADER_LEN],
    pub payload: Vec<u8>,
    /// Whether the receiver got it.
    pub delivered: bool,
}

impl Message {
    pub fn is_multicast(&self) -> bool {
        self.to.is_none()
    }

    pub fn is_dis(&self) -> bool {
        self.code == RplControlMessage::DodagInformationSolicitation
    }

    pub fn is_dio(&self) -> bool {
        self.code == RplControlMessage::DodagInformationObject
    }

    pub fn is_dao(&self) -> bool {
        self.code == RplControlMessage::DestinationAdvertisementObject
    }

    pub fn is_dao_ack(&self) -> bool {
        self.code == RplControlMessage::DestinationAdvertisementObjectAck
    }

    /// The control message body, as it was handed to the transport.
    pub fn body(&self) -> Vec<u8> {
        let mut body = self.header.to_vec();
        body.extend_from_slice(&self.payload);
        body
    }

    /// Parse the message and hand the representation to `f`.
    pub fn with_repr<R>(&self, f: impl FnOnce(&RplRepr) -> R) -> R {
        let body = self.body();
        let packet = RplPacket::new_checked(&body[..], self.code).unwrap();
        let repr = RplRepr::parse(self.code, &packet).unwrap();
        f(&repr)
    }

    /// The advertised rank, for a DIO.
    pub fn dio_rank(&self) -> Option<u16> {
        self.with_repr(|repr| match repr {
            RplRepr::DodagInformationObject(dio) => Some(dio.rank),
            _ => None,
        })
    }

    /// The advertised targets, for a DAO.
    pub fn dao_targets(&self) -> Vec<Ipv6Address> {
        self.with_repr(|repr| match repr {
            RplRepr::DestinationAdvertisementObject(dao) => {
                dao.targets.iter().map(|t| t.target.prefix).collect()
            }
            _ => vec![],
        })
    }

    /// The path lifetimes of the transit information options, for a DAO.
    pub fn dao_lifetimes(&self) -> Vec<u8> {
        self.with_repr(|repr| match repr {
            RplRepr::DestinationAdvertisementObject(dao) => {
                dao.transits.iter().map(|t| t.path_lifetime).collect()
            }
            _ => vec![],
        })
    }
}
