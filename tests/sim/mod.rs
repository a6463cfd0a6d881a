use std::collections::BTreeMap;

use smolrpl::iface::rpl::TimerHandle;
use smolrpl::iface::{RouteTable, RplBuilder};
use smolrpl::time::*;
use smolrpl::wire::rpl::ICMPV6_TYPE;
use smolrpl::wire::*;

mod message;
mod node;

pub use message::Message;
pub use node::{Node, Outgoing, TimerOp};

/// A unicast message is dropped after this many link transmissions.
const MAX_HOPS: usize = 16;

/// Place a root at the origin and `nodes` other nodes on a line, 100 units apart.
///
/// Every node only hears its direct neighbors on the line.
pub fn chain(
    mop: RplModeOfOperation,
    configuration: Option<RplDodagConfiguration>,
    nodes: usize,
) -> NetworkSim {
    let mut sim = NetworkSim::new();

    let configure = |builder: RplBuilder| match configuration {
        Some(configuration) => builder.set_dodag_configuration(configuration),
        None => builder,
    };

    sim.create_node(|b| configure(b.set_root().set_mode_of_operation(mop)));
    for i in 1..=nodes {
        sim.create_node(configure)
            .set_position(Position::from((100. * i as f32, 0.)));
    }

    sim
}

#[derive(Debug)]
pub struct NetworkSim {
    pub nodes: Vec<Node>,
    pub messages: Vec<Message>,
    pub now: Instant,
    events: BTreeMap<(Instant, u64), (usize, TimerHandle)>,
    sequence: u64,
}

impl Default for NetworkSim {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkSim {
    /// Create a new network simulation.
    pub fn new() -> Self {
        Self {
            nodes: vec![],
            messages: vec![],
            now: Instant::ZERO,
            events: BTreeMap::new(),
            sequence: 0,
        }
    }

    /// Create a new node. The node starts at the origin.
    pub fn create_node(&mut self, configure: impl FnOnce(RplBuilder) -> RplBuilder) -> &mut Node {
        let id = self.nodes.len();
        self.nodes.push(Node::new(id, configure));
        self.flush();
        &mut self.nodes[id]
    }

    /// All the link transmissions so far.
    pub fn msgs(&self) -> &[Message] {
        &self.messages
    }

    /// Get a node from an IP address.
    pub fn node_id(&self, address: Ipv6Address) -> Option<usize> {
        self.nodes.iter().position(|node| node.address == address)
    }

    /// Run the simulation for `duration`, firing the timers of the nodes in order.
    pub fn run(&mut self, duration: Duration) {
        let end = self.now + duration;

        while let Some((&(at, _), _)) = self.events.first_key_value() {
            if at > end {
                break;
            }

            let Some((_, (id, handle))) = self.events.pop_first() else {
                break;
            };
            self.now = at;

            // A node that is switched off loses its timers.
            if !self.nodes[id].enabled {
                continue;
            }

            self.nodes[id].rpl.handle_timer(handle);
            self.flush();
        }

        self.now = end;
    }

    /// Collect the timer operations of the nodes and put their messages on the air, until no
    /// node has anything left to send.
    fn flush(&mut self) {
        for _ in 0..1000 {
            let mut outgoing = vec![];

            let Self {
                nodes,
                events,
                sequence,
                now,
                ..
            } = self;

            for node in nodes.iter_mut() {
                let id = node.id;
                for op in node.rpl.scheduler_mut().ops.drain(..) {
                    match op {
                        TimerOp::Schedule(handle, delay) => {
                            events.insert((*now + delay, *sequence), (id, handle));
                            *sequence += 1;
                        }
                        TimerOp::Cancel(handle) => {
                            events.retain(|_, (n, h)| !(*n == id && *h == handle));
                        }
                    }
                }

                outgoing.extend(
                    node.rpl
                        .transport_mut()
                        .queue
                        .drain(..)
                        .map(|out| (id, out)),
                );
            }

            if outgoing.is_empty() {
                return;
            }

            for (from, out) in outgoing {
                self.transmit(from, out);
            }
        }

        panic!("the nodes keep sending to each other at {}", self.now);
    }

    fn transmit(&mut self, from: usize, out: Outgoing) {
        if !self.nodes[from].enabled {
            return;
        }

        if out.dst.is_multicast() {
            let message = self.message(from, None, &out, true);
            self.messages.push(message);

            let receivers: Vec<usize> = self
                .nodes
                .iter()
                .filter(|n| n.enabled && n.id != from && n.in_range(&self.nodes[from]))
                .map(|n| n.id)
                .collect();
            for id in receivers {
                self.deliver(from, id, &out);
            }
            return;
        }

        // The root in non-storing mode knows the whole path.
        let path = self.nodes[from].rpl.routes().source_route(&out.dst);

        let mut hop = from;
        for i in 0..MAX_HOPS {
            let next = match &path {
                Some(path) => path.get(i).copied(),
                None => self.next_link(hop, &out.dst),
            };
            let Some(next) = next.and_then(|address| self.node_id(address)) else {
                return;
            };

            let delivered = self.nodes[next].enabled && self.nodes[hop].in_range(&self.nodes[next]);
            let message = self.message(hop, Some(next), &out, delivered);
            self.messages.push(message);
            self.nodes[hop].rpl.tx_result(out.dst, delivered);

            if !delivered {
                return;
            }

            if self.nodes[next].address == out.dst {
                self.deliver(from, next, &out);
                return;
            }

            hop = next;
        }
    }

    /// The next link layer receiver towards `dst`: `dst` itself when it is in range, otherwise
    /// the next hop from the routing table of `hop`.
    fn next_link(&self, hop: usize, dst: &Ipv6Address) -> Option<Ipv6Address> {
        let node = &self.nodes[hop];
        if let Some(target) = self.node_id(*dst) {
            if node.in_range(&self.nodes[target]) {
                return Some(*dst);
            }
        }

        node.rpl.routes().next_hop(dst)
    }

    fn deliver(&mut self, from: usize, to: usize, out: &Outgoing) {
        let src = self.nodes[from].address;
        self.nodes[to].rpl.process_message(
            src,
            out.dst,
            ICMPV6_TYPE,
            out.code,
            out.header,
            &out.payload,
        );
    }

    fn message(&self, from: usize, to: Option<usize>, out: &Outgoing, delivered: bool) -> Message {
        Message {
            at: self.now,
            from,
            to,
            dst: out.dst,
            code: out.code,
            header: out.header,
            payload: out.payload.clone(),
            delivered,
        }
    }
}

#[derive(Debug, PartialEq, PartialOrd, Copy, Clone)]
pub struct Position(pub (f32, f32));

impl Position {
    pub fn distance(&self, other: &Self) -> f32 {
        ((other.0 .0 - self.0 .0).powf(2.0) + (other.0 .1 - self.0 .1).powf(2.0)).sqrt()
    }

    pub fn x(&self) -> f32 {
        self.0 .0
    }

    pub fn y(&self) -> f32 {
        self.0 .1
    }
}

impl From<(f32, f32)> for Position {
    fn from(pos: (f32, f32)) -> Self {
        Position(pos)
    }
}
