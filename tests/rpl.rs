use rstest::rstest;

use smolrpl::iface::rpl::{default_configuration, INFINITE_RANK};
use smolrpl::iface::RouteTable;
use smolrpl::time::*;
use smolrpl::wire::{RplDodagConfiguration, RplModeOfOperation};

mod sim;

const ONE_HOUR: Duration = Duration::from_secs(60 * 60);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Trickle with a maximum interval of about 4 seconds, neighbors expiring after 10 seconds.
fn short_configuration() -> RplDodagConfiguration {
    RplDodagConfiguration {
        dio_interval_min: 10,
        dio_interval_doublings: 2,
        default_lifetime: 10,
        lifetime_unit: 1,
        ..default_configuration()
    }
}

/// A RPL root node only. We count the amount of DIO's it transmits. For our Trickle
/// implementation, this should be around 10 for 1 hour. Changing the Trickle parameters will
/// make this test fail. This is valid for all modes of operation.
#[rstest]
#[case::mop0(RplModeOfOperation::NoDownwardRoutesMaintained)]
#[case::mop1(RplModeOfOperation::NonStoringMode)]
#[case::mop2(RplModeOfOperation::StoringModeWithoutMulticast)]
fn root_node_only(#[case] mop: RplModeOfOperation) {
    init_logger();
    let mut sim = sim::chain(mop, None, 0);

    sim.run(ONE_HOUR);

    assert!(!sim.msgs().is_empty());

    // In 1 hour, a root node will transmit around 10 messages.
    let dio_count = sim.msgs().iter().filter(|m| m.is_dio()).count();
    assert!((9..=11).contains(&dio_count), "{dio_count} DIOs");

    // There should only be DIO's, all multicast.
    for msg in sim.msgs() {
        assert!(msg.is_dio());
        assert!(msg.is_multicast());
        assert_eq!(msg.dio_rank(), Some(1));
    }
}

/// A RPL normal node that is out of range of any DODAG. The node only solicits.
#[test]
fn normal_node_without_dodag() {
    init_logger();
    let mut sim = sim::NetworkSim::new();
    sim.create_node(|b| b);

    sim.run(ONE_HOUR);

    assert!(!sim.msgs().is_empty());
    for msg in sim.msgs() {
        assert!(msg.is_dis());
        assert!(msg.is_multicast());
    }

    assert!(!sim.nodes[0].rpl.is_connected());
}

/// A RPL root node and a normal node in range of the root node.
/// In all modes of operation, DIOs are transmitted. Except for MOP0, the node registers itself
/// at the root with a DAO.
#[rstest]
#[case::mop0(RplModeOfOperation::NoDownwardRoutesMaintained)]
#[case::mop1(RplModeOfOperation::NonStoringMode)]
#[case::mop2(RplModeOfOperation::StoringModeWithoutMulticast)]
fn root_and_normal_node(#[case] mop: RplModeOfOperation) {
    init_logger();
    let mut sim = sim::chain(mop, None, 1);

    sim.run(Duration::from_secs(60 * 15));

    let root = &sim.nodes[0];
    let node = &sim.nodes[1];

    assert!(node.rpl.is_connected());
    assert_eq!(node.rpl.parent(), Some(root.address));
    assert_eq!(node.rpl.rank().raw_value(), 257);
    assert_eq!(node.rpl.dodag().mode_of_operation(), mop);
    assert_eq!(
        node.rpl.routes().default_route().map(|r| r.next_hop),
        Some(root.address)
    );

    let dao_count = sim.msgs().iter().filter(|m| m.is_dao()).count();

    match mop {
        RplModeOfOperation::NoDownwardRoutesMaintained => {
            assert_eq!(dao_count, 0);
            assert!(root.rpl.routes().routes().is_empty());
        }
        RplModeOfOperation::NonStoringMode => {
            assert!(dao_count >= 1);
            let hops = root.rpl.routes().source_route(&node.address).unwrap();
            assert_eq!(&hops[..], &[node.address]);
        }
        _ => {
            assert!(dao_count >= 1);
            let route = root.rpl.routes().lookup(&node.address).unwrap();
            assert_eq!(route.next_hop, node.address);
        }
    }

    for msg in sim.msgs() {
        assert!(msg.delivered);
        if msg.is_dao() {
            assert_eq!(msg.from, 1);
            assert_eq!(msg.to, Some(0));
            assert_eq!(msg.dao_lifetimes(), vec![30]);
        } else {
            assert!(msg.is_dio() || msg.is_dis());
        }
    }
}

/// A DAO acknowledgement is sent back for every DAO when the node asks for it.
#[rstest]
#[case::mop1(RplModeOfOperation::NonStoringMode)]
#[case::mop2(RplModeOfOperation::StoringModeWithoutMulticast)]
fn dao_acknowledged(#[case] mop: RplModeOfOperation) {
    init_logger();
    let mut sim = sim::NetworkSim::new();
    sim.create_node(|b| b.set_root().set_mode_of_operation(mop));
    sim.create_node(|b| b.set_dao_ack(true))
        .set_position((100., 0.).into());

    sim.run(Duration::from_secs(60));

    let dao_count = sim.msgs().iter().filter(|m| m.is_dao()).count();
    let dao_ack_count = sim.msgs().iter().filter(|m| m.is_dao_ack()).count();
    assert!(dao_count >= 1);
    assert_eq!(dao_count, dao_ack_count);

    let node = &sim.nodes[1].rpl;
    assert_eq!(node.last_dao_ack().map(|(_, status)| status), Some(0));
}

/// A line of three nodes: the node furthest away has to go through the middle one.
#[rstest]
#[case::mop0(RplModeOfOperation::NoDownwardRoutesMaintained)]
#[case::mop1(RplModeOfOperation::NonStoringMode)]
#[case::mop2(RplModeOfOperation::StoringModeWithoutMulticast)]
fn chain_of_nodes(#[case] mop: RplModeOfOperation) {
    init_logger();
    let mut sim = sim::chain(mop, None, 2);

    sim.run(Duration::from_secs(60 * 15));

    let root = &sim.nodes[0];
    let middle = &sim.nodes[1];
    let leaf = &sim.nodes[2];

    assert!(middle.rpl.is_connected());
    assert!(leaf.rpl.is_connected());
    assert_eq!(leaf.rpl.parent(), Some(middle.address));
    assert_eq!(middle.rpl.rank().raw_value(), 257);
    assert_eq!(leaf.rpl.rank().raw_value(), 513);

    match mop {
        RplModeOfOperation::NoDownwardRoutesMaintained => {
            assert!(root.rpl.routes().routes().is_empty());
            assert!(middle.rpl.routes().routes().is_empty());
        }
        RplModeOfOperation::NonStoringMode => {
            let hops = root.rpl.routes().source_route(&leaf.address).unwrap();
            assert_eq!(&hops[..], &[middle.address, leaf.address]);

            // Only the root keeps downward state.
            assert!(middle.rpl.routes().routes().is_empty());

            // The DAO of the leaf is forwarded by the middle node.
            assert!(sim.msgs().iter().any(|m| m.is_dao()
                && m.from == 1
                && m.dst == root.address
                && m.dao_targets() == vec![leaf.address]));
        }
        _ => {
            let route = root.rpl.routes().lookup(&leaf.address).unwrap();
            assert_eq!(route.next_hop, middle.address);

            let route = middle.rpl.routes().lookup(&leaf.address).unwrap();
            assert_eq!(route.next_hop, leaf.address);
        }
    }

    // The root never hears the leaf directly.
    assert!(root.rpl.neighbors().find(&leaf.address).is_none());
}

/// The root goes away. The middle node has to poison its sub-DODAG instead of picking its own
/// child as parent, after which no node is part of a DODAG anymore.
#[rstest]
#[case::mop0(RplModeOfOperation::NoDownwardRoutesMaintained)]
#[case::mop1(RplModeOfOperation::NonStoringMode)]
#[case::mop2(RplModeOfOperation::StoringModeWithoutMulticast)]
fn root_disappears(#[case] mop: RplModeOfOperation) {
    init_logger();
    let mut sim = sim::chain(mop, Some(short_configuration()), 2);

    sim.run(Duration::from_secs(60));
    assert!(sim.nodes[1].rpl.is_connected());
    assert!(sim.nodes[2].rpl.is_connected());
    assert_eq!(sim.nodes[2].rpl.rank().raw_value(), 513);

    sim.nodes[0].enabled = false;
    let before = sim.msgs().len();

    sim.run(Duration::from_secs(60));

    let poisoned = sim.msgs()[before..]
        .iter()
        .any(|m| m.from == 1 && m.is_dio() && m.dio_rank() == Some(INFINITE_RANK));
    assert!(poisoned);

    for id in [1, 2] {
        let node = &sim.nodes[id].rpl;
        assert!(!node.is_connected(), "node {id} is still connected");
        assert!(node.rank().is_infinite());
        assert!(node.parent().is_none());
        assert!(node.routes().default_route().is_none());
        assert!(node.routes().routes().is_empty());
    }

    // Once both gave up, only solicitations are left.
    let last = sim.msgs().last().unwrap();
    assert!(last.is_dis());
}

/// A node moves from one parent to another one.
#[test]
fn parent_switch() {
    init_logger();
    let mop = RplModeOfOperation::StoringModeWithoutMulticast;
    let mut sim = sim::chain(mop, Some(short_configuration()), 2);

    sim.run(Duration::from_secs(60));
    assert_eq!(sim.nodes[2].rpl.parent(), Some(sim.nodes[1].address));

    // Move the leaf next to the root, out of range of the middle node.
    sim.nodes[2].set_position((0., 100.).into());

    sim.run(Duration::from_secs(120));

    let root = &sim.nodes[0];
    let leaf = &sim.nodes[2];
    assert!(leaf.rpl.is_connected());
    assert_eq!(leaf.rpl.parent(), Some(root.address));
    assert_eq!(leaf.rpl.rank().raw_value(), 257);

    let route = root.rpl.routes().lookup(&leaf.address).unwrap();
    assert_eq!(route.next_hop, leaf.address);
}
