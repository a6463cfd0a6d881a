use super::Position;
use smolrpl::iface::rpl::{Scheduler, TimerHandle, Transport};
use smolrpl::iface::{Rpl, RplBuilder};
use smolrpl::time::*;
use smolrpl::wire::rpl::HEADER_LEN;
use smolrpl::wire::*;
use std::fmt::Display;

/// A control message waiting to be put on the air.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub dst: Ipv6Address,
    pub code: RplControlMessage,
    pub header: [u8; HEADER_LEN],
    pub payload: Vec<u8>,
}

/// Transport collecting what a node sends until the simulation picks it up.
#[derive(Debug, Default)]
pub struct Outbox {
    pub queue: Vec<Outgoing>,
}

impl Transport for Outbox {
    fn send(
        &mut self,
        dst: Ipv6Address,
        _msg_type: u8,
        code: RplControlMessage,
        header: [u8; HEADER_LEN],
        payload: &[u8],
    ) -> bool {
        self.queue.push(Outgoing {
            dst,
            code,
            header,
            payload: payload.to_vec(),
        });
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TimerOp {
    Schedule(TimerHandle, Duration),
    Cancel(TimerHandle),
}

/// Scheduler recording the operations of a node. The simulation turns them into events.
#[derive(Debug, Default)]
pub struct TimerOps {
    pub ops: Vec<TimerOp>,
}

impl Scheduler for TimerOps {
    fn schedule(&mut self, handle: TimerHandle, delay: Duration) {
        self.ops.push(TimerOp::Schedule(handle, delay));
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.ops.push(TimerOp::Cancel(handle));
    }
}

pub type NodeRpl = Rpl<Outbox, TimerOps>;

pub struct Node {
    pub id: usize,
    pub range: f32,
    pub position: Position,
    pub enabled: bool,
    pub address: Ipv6Address,
    pub rpl: NodeRpl,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("position", &self.position)
            .field("enabled", &self.enabled)
            .field("rank", &self.rpl.rank())
            .finish()
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node[{}] {}", self.id, self.address)
    }
}

impl Node {
    /// The address of the node with the given id.
    pub fn address_of(id: usize) -> Ipv6Address {
        Ipv6Address::new(0xfd00, 0, 0, 0, 0, 0, 0, id as u16 + 1)
    }

    /// Create a new node. `configure` receives a builder for the node's address.
    pub fn new(id: usize, configure: impl FnOnce(RplBuilder) -> RplBuilder) -> Self {
        let address = Self::address_of(id);
        let builder = configure(RplBuilder::new(address).set_seed(id as u64 + 1));
        let rpl = builder
            .finalize(Outbox::default(), TimerOps::default())
            .unwrap();

        Self {
            id,
            range: 101.,
            position: Position::from((0., 0.)),
            enabled: true,
            address,
            rpl,
        }
    }

    /// Set the position of the node.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn in_range(&self, other: &Node) -> bool {
        self.position.distance(&other.position) < self.range
    }
}
