use super::timer::test_scheduler::RecordingScheduler;
use super::*;

use rstest::rstest;

use crate::iface::route::RouteTable;
use crate::wire::rpl::options::{RplTarget, SolicitedInformation};
use crate::wire::rpl::{DaoTarget, DestinationAdvertisementObject};
use crate::wire::{RplDodagConfiguration, RplInstanceId, RplTransitInformation};

use std::vec::Vec;

#[derive(Debug)]
struct Sent {
    dst: Ipv6Address,
    code: RplControlMessage,
    body: Vec<u8>,
}

impl Sent {
    fn repr(&self) -> RplRepr<'_> {
        let packet = RplPacket::new_checked(&self.body[..], self.code).unwrap();
        RplRepr::parse(self.code, &packet).unwrap()
    }
}

#[derive(Debug, Default)]
struct RecordingTransport {
    sent: Vec<Sent>,
}

impl Transport for RecordingTransport {
    fn send(
        &mut self,
        dst: Ipv6Address,
        msg_type: u8,
        code: RplControlMessage,
        header: [u8; HEADER_LEN],
        payload: &[u8],
    ) -> bool {
        assert_eq!(msg_type, ICMPV6_TYPE);
        let mut body = header.to_vec();
        body.extend_from_slice(payload);
        self.sent.push(Sent { dst, code, body });
        true
    }
}

type TestRpl = Rpl<RecordingTransport, RecordingScheduler>;

const ROOT: Ipv6Address = Ipv6Address::new(0xfd00, 0, 0, 0, 0, 0, 0, 1);
const NODE: Ipv6Address = Ipv6Address::new(0xfd00, 0, 0, 0, 0, 0, 0, 2);
const CHILD: Ipv6Address = Ipv6Address::new(0xfd00, 0, 0, 0, 0, 0, 0, 3);

fn short_configuration() -> RplDodagConfiguration {
    RplDodagConfiguration {
        dio_interval_min: 10,
        dio_interval_doublings: 2,
        default_lifetime: 10,
        lifetime_unit: 1,
        ..default_configuration()
    }
}

fn root(mode_of_operation: RplModeOfOperation) -> TestRpl {
    RplBuilder::new(ROOT)
        .set_root()
        .set_mode_of_operation(mode_of_operation)
        .set_seed(1)
        .finalize(RecordingTransport::default(), RecordingScheduler::default())
        .unwrap()
}

fn node(address: Ipv6Address) -> TestRpl {
    RplBuilder::new(address)
        .set_seed(2)
        .finalize(RecordingTransport::default(), RecordingScheduler::default())
        .unwrap()
}

fn dio<'p>(
    rank: u16,
    mode_of_operation: RplModeOfOperation,
    configuration: Option<RplDodagConfiguration>,
) -> RplRepr<'p> {
    RplRepr::DodagInformationObject(DodagInformationObject {
        rpl_instance_id: RplInstanceId::from(1),
        version_number: 0,
        rank,
        grounded: false,
        mode_of_operation,
        dodag_preference: 7,
        dtsn: 1,
        dodag_id: ROOT,
        metric_container: Some(crate::wire::RplDagMetricContainer::hop_count(1)),
        route_information: None,
        dodag_configuration: configuration,
        prefix_information: None,
    })
}

fn dao(target: Ipv6Address, lifetime: u8, parent: Option<Ipv6Address>) -> RplRepr<'static> {
    let mut targets = heapless::Vec::new();
    targets
        .push(DaoTarget {
            target: RplTarget {
                prefix_length: 128,
                prefix: target,
            },
            transit: 0,
        })
        .unwrap();
    let mut transits = heapless::Vec::new();
    transits
        .push(RplTransitInformation {
            external: false,
            path_control: 0,
            path_sequence: 241,
            path_lifetime: lifetime,
            parent_address: parent,
        })
        .unwrap();

    RplRepr::DestinationAdvertisementObject(DestinationAdvertisementObject {
        rpl_instance_id: RplInstanceId::from(1),
        expect_ack: true,
        sequence: 241,
        dodag_id: None,
        targets,
        transits,
    })
}

fn deliver(rpl: &mut TestRpl, src: Ipv6Address, dst: Ipv6Address, repr: &RplRepr) {
    let mut buffer = [0u8; MAX_LENGTH];
    let len = repr
        .emit(
            &mut RplPacket::new_unchecked(&mut buffer[..]),
            &EmitOptions::default(),
        )
        .unwrap();
    let (header, payload) = split_header(&buffer[..len]);
    rpl.process_message(src, dst, ICMPV6_TYPE, repr.message(), header, payload);
}

fn fire(rpl: &mut TestRpl, timer: Timer) {
    let (handle, _) = rpl.scheduler_mut().take(timer).unwrap();
    rpl.handle_timer(handle);
}

fn joined_node(configuration: RplDodagConfiguration) -> TestRpl {
    let mut rpl = node(NODE);
    deliver(
        &mut rpl,
        ROOT,
        LINK_LOCAL_ALL_RPL_NODES,
        &dio(1, RplModeOfOperation::StoringModeWithoutMulticast, Some(configuration)),
    );
    assert!(rpl.is_connected());
    rpl
}

#[test]
fn join_and_advertise() {
    let mut rpl = joined_node(default_configuration());

    assert_eq!(rpl.rank().raw_value(), 257);
    assert_eq!(rpl.parent(), Some(ROOT));
    assert_eq!(rpl.dodag().id(), ROOT);
    assert_eq!(rpl.routes().next_hop(&ROOT), Some(ROOT));
    assert_eq!(rpl.routes().next_hop(&CHILD), Some(ROOT));
    assert_eq!(rpl.dio_timer().interval(), rpl.dio_timer().min_interval());

    fire(&mut rpl, Timer::DaoDelay);

    let sent = &rpl.transport().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].dst, ROOT);
    match sent[0].repr() {
        RplRepr::DestinationAdvertisementObject(dao) => {
            assert_eq!(dao.targets.len(), 1);
            assert_eq!(dao.targets[0].target.prefix, NODE);
            assert_eq!(dao.transits[0].path_lifetime, 30);
            assert_eq!(dao.transits[0].parent_address, None);
            assert!(!dao.expect_ack);
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn advertise_dio_once_joined() {
    let mut rpl = joined_node(default_configuration());
    rpl.transport_mut().sent.clear();

    fire(&mut rpl, Timer::TrickleTransmit);

    let sent = &rpl.transport().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].dst, LINK_LOCAL_ALL_RPL_NODES);
    match sent[0].repr() {
        RplRepr::DodagInformationObject(dio) => {
            assert_eq!(dio.rank, 257);
            assert_eq!(dio.dodag_id, ROOT);
            assert!(dio.dodag_configuration.is_some());
            assert!(dio.metric_container.is_some());
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn unconnected_node_solicits() {
    let mut rpl = node(NODE);
    fire(&mut rpl, Timer::TrickleTransmit);

    let sent = &rpl.transport().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].dst, LINK_LOCAL_ALL_RPL_NODES);
    assert_eq!(sent[0].code, RplControlMessage::DodagInformationSolicitation);
}

#[test]
fn missing_configuration_is_solicited() {
    let mut rpl = node(NODE);
    deliver(
        &mut rpl,
        ROOT,
        LINK_LOCAL_ALL_RPL_NODES,
        &dio(1, RplModeOfOperation::StoringModeWithoutMulticast, None),
    );

    assert!(!rpl.is_connected());
    let sent = &rpl.transport().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].dst, ROOT);
    assert_eq!(sent[0].code, RplControlMessage::DodagInformationSolicitation);
}

#[test]
fn infinite_rank_is_not_joined() {
    let mut rpl = node(NODE);
    deliver(
        &mut rpl,
        ROOT,
        LINK_LOCAL_ALL_RPL_NODES,
        &dio(
            0xffff,
            RplModeOfOperation::StoringModeWithoutMulticast,
            Some(default_configuration()),
        ),
    );

    assert!(!rpl.is_connected());
    assert!(rpl.neighbors().is_empty());
    assert!(rpl.transport().sent.is_empty());
}

#[test]
fn truncated_message_is_dropped() {
    let mut rpl = node(NODE);
    rpl.process_message(
        ROOT,
        LINK_LOCAL_ALL_RPL_NODES,
        ICMPV6_TYPE,
        RplControlMessage::DodagInformationObject,
        [1, 0, 0, 1],
        &[],
    );

    assert!(!rpl.is_connected());
    assert!(rpl.neighbors().is_empty());

    // Not a RPL message at all.
    rpl.process_message(
        ROOT,
        LINK_LOCAL_ALL_RPL_NODES,
        135,
        RplControlMessage::DodagInformationSolicitation,
        [0; HEADER_LEN],
        &[],
    );
    assert!(rpl.transport().sent.is_empty());
}

#[test]
fn dis_predicates() {
    let mut rpl = root(RplModeOfOperation::StoringModeWithoutMulticast);

    let mismatch = RplRepr::DodagInformationSolicitation(DodagInformationSolicitation {
        solicited_information: Some(SolicitedInformation {
            rpl_instance_id: RplInstanceId::from(1),
            version_predicate: true,
            instance_id_predicate: false,
            dodag_id_predicate: false,
            dodag_id: ROOT,
            version_number: 5,
        }),
    });
    deliver(&mut rpl, NODE, ROOT, &mismatch);
    assert!(rpl.transport().sent.is_empty());

    let matching = RplRepr::DodagInformationSolicitation(DodagInformationSolicitation {
        solicited_information: Some(SolicitedInformation {
            rpl_instance_id: RplInstanceId::from(1),
            version_predicate: true,
            instance_id_predicate: true,
            dodag_id_predicate: true,
            dodag_id: ROOT,
            version_number: 0,
        }),
    });
    deliver(&mut rpl, NODE, ROOT, &matching);

    let sent = &rpl.transport().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].dst, NODE);
    assert_eq!(sent[0].code, RplControlMessage::DodagInformationObject);
}

#[test]
fn root_installs_downward_route() {
    let mut rpl = root(RplModeOfOperation::StoringModeWithoutMulticast);
    deliver(
        &mut rpl,
        NODE,
        LINK_LOCAL_ALL_RPL_NODES,
        &dio(257, RplModeOfOperation::StoringModeWithoutMulticast, Some(default_configuration())),
    );
    assert_eq!(rpl.neighbors().len(), 1);

    deliver(&mut rpl, NODE, ROOT, &dao(NODE, 30, None));

    let route = rpl.routes().lookup(&NODE).unwrap();
    assert_eq!(route.next_hop, NODE);
    assert_eq!(route.metric, 1);
    assert_eq!(rpl.dao_cache().len(), 1);

    let sent = &rpl.transport().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].dst, NODE);
    match sent[0].repr() {
        RplRepr::DestinationAdvertisementObjectAck(ack) => {
            assert_eq!(ack.sequence, 241);
            assert_eq!(ack.status, 0);
        }
        other => panic!("unexpected {other}"),
    }

    // A zero lifetime withdraws the route again.
    deliver(&mut rpl, NODE, ROOT, &dao(NODE, 0, None));
    assert!(rpl.routes().routes().is_empty());
    assert!(rpl.dao_cache().is_empty());
}

#[test]
fn dao_before_first_dio() {
    let mut rpl = root(RplModeOfOperation::StoringModeWithoutMulticast);
    deliver(&mut rpl, NODE, ROOT, &dao(NODE, 30, None));

    let route = rpl.routes().lookup(&NODE).unwrap();
    assert_eq!(route.next_hop, NODE);
    assert_eq!(route.metric, 1);
    assert!(rpl.neighbors().is_empty());
}

#[test]
fn dao_of_other_instance_is_dropped() {
    let mut rpl = root(RplModeOfOperation::StoringModeWithoutMulticast);
    let mut repr = dao(NODE, 30, None);
    if let RplRepr::DestinationAdvertisementObject(dao) = &mut repr {
        dao.rpl_instance_id = RplInstanceId::from(2);
    }
    deliver(&mut rpl, NODE, ROOT, &repr);

    assert!(rpl.routes().routes().is_empty());
    assert!(rpl.transport().sent.is_empty());
}

#[test]
fn non_storing_root_builds_source_routes() {
    let mut rpl = root(RplModeOfOperation::NonStoringMode);
    deliver(&mut rpl, NODE, ROOT, &dao(NODE, 30, Some(ROOT)));
    deliver(&mut rpl, CHILD, ROOT, &dao(CHILD, 30, Some(NODE)));

    let hops = rpl.routes().source_route(&CHILD).unwrap();
    assert_eq!(&hops[..], &[NODE, CHILD]);
    assert_eq!(rpl.routes().next_hop(&CHILD), Some(NODE));

    // The parent address is mandatory.
    let other = Ipv6Address::new(0xfd00, 0, 0, 0, 0, 0, 0, 9);
    deliver(&mut rpl, other, ROOT, &dao(other, 30, None));
    assert!(rpl.routes().lookup(&other).is_none());
    assert_eq!(rpl.dao_cache().len(), 2);
}

#[test]
fn dao_advertising_own_address_poisons() {
    let mut rpl = joined_node(default_configuration());
    deliver(
        &mut rpl,
        CHILD,
        LINK_LOCAL_ALL_RPL_NODES,
        &dio(513, RplModeOfOperation::StoringModeWithoutMulticast, Some(default_configuration())),
    );
    fire(&mut rpl, Timer::DaoDelay);
    rpl.transport_mut().sent.clear();

    deliver(&mut rpl, CHILD, NODE, &dao(NODE, 30, None));
    fire(&mut rpl, Timer::TrickleTransmit);

    let poisoned = rpl.transport().sent.iter().any(|s| match s.repr() {
        RplRepr::DodagInformationObject(dio) => dio.rank == INFINITE_RANK,
        _ => false,
    });
    assert!(poisoned);
    assert!(rpl.routes().lookup(&NODE).map_or(true, |r| r.next_hop != CHILD));
}

#[test]
fn reroot_increments_version() {
    let mut rpl = root(RplModeOfOperation::StoringModeWithoutMulticast);
    deliver(
        &mut rpl,
        NODE,
        LINK_LOCAL_ALL_RPL_NODES,
        &dio(257, RplModeOfOperation::StoringModeWithoutMulticast, Some(default_configuration())),
    );
    assert_eq!(rpl.dodag().version_number(), 0);

    rpl.root_dodag();
    assert_eq!(rpl.dodag().version_number(), 1);
    assert!(rpl.neighbors().is_empty());
    assert!(rpl.is_connected());
}

#[test]
fn dtsn_increment() {
    let mut rpl = root(RplModeOfOperation::StoringModeWithoutMulticast);
    assert!(rpl.request_dao_refresh());
    assert_eq!(rpl.dodag().dtsn(), 2);

    let mut other = node(NODE);
    assert!(!other.request_dao_refresh());
}

#[test]
fn failed_transmissions_detach() {
    let mut rpl = joined_node(short_configuration());
    assert_eq!(rpl.neighbors().len(), 1);

    rpl.tx_result(ROOT, false);

    assert!(!rpl.is_connected());
    assert!(rpl.neighbors().is_empty());
    assert!(rpl.rank().is_infinite());
    assert!(rpl.routes().default_route().is_none());

    rpl.transport_mut().sent.clear();
    fire(&mut rpl, Timer::TrickleTransmit);
    match rpl.transport().sent[0].repr() {
        RplRepr::DodagInformationObject(dio) => assert_eq!(dio.rank, INFINITE_RANK),
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn successful_transmissions_keep_neighbor() {
    let mut rpl = joined_node(short_configuration());
    rpl.tx_result(ROOT, true);
    rpl.tx_result(LINK_LOCAL_ALL_RPL_NODES, false);
    assert!(rpl.is_connected());
    assert_eq!(rpl.neighbors().len(), 1);
}

#[test]
fn parent_expires() {
    let mut rpl = joined_node(short_configuration());

    for _ in 0..10 {
        fire(&mut rpl, Timer::NeighborTick);
    }

    assert!(!rpl.is_connected());
    assert!(rpl.neighbors().is_empty());
}

#[test]
fn dao_ack_is_recorded() {
    let mut rpl = RplBuilder::new(NODE)
        .set_dao_ack(true)
        .finalize(RecordingTransport::default(), RecordingScheduler::default())
        .unwrap();
    deliver(
        &mut rpl,
        ROOT,
        LINK_LOCAL_ALL_RPL_NODES,
        &dio(1, RplModeOfOperation::StoringModeWithoutMulticast, Some(default_configuration())),
    );
    fire(&mut rpl, Timer::DaoDelay);

    let sequence = match rpl.transport().sent[0].repr() {
        RplRepr::DestinationAdvertisementObject(dao) => {
            assert!(dao.expect_ack);
            dao.sequence
        }
        other => panic!("unexpected {other}"),
    };

    let ack = RplRepr::DestinationAdvertisementObjectAck(DestinationAdvertisementObjectAck {
        rpl_instance_id: RplInstanceId::from(1),
        sequence,
        status: 0,
        dodag_id: None,
    });
    deliver(&mut rpl, ROOT, NODE, &ack);
    assert_eq!(rpl.last_dao_ack(), Some((sequence, 0)));
}

#[test]
fn stale_timer_handles_are_ignored() {
    let mut rpl = joined_node(default_configuration());
    let (handle, _) = rpl.scheduler_mut().take(Timer::DaoDelay).unwrap();

    rpl.handle_timer(handle);
    rpl.handle_timer(handle);
    assert_eq!(rpl.transport().sent.len(), 1);
}

#[rstest]
#[case::mop0(RplModeOfOperation::NoDownwardRoutesMaintained)]
#[case::mop1(RplModeOfOperation::NonStoringMode)]
#[case::mop2(RplModeOfOperation::StoringModeWithoutMulticast)]
fn root_advertises_mode_of_operation(#[case] mop: RplModeOfOperation) {
    let mut rpl = root(mop);
    fire(&mut rpl, Timer::TrickleTransmit);

    let sent = &rpl.transport().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].dst, LINK_LOCAL_ALL_RPL_NODES);
    match sent[0].repr() {
        RplRepr::DodagInformationObject(dio) => {
            assert_eq!(dio.mode_of_operation, mop);
            assert_eq!(dio.rank, 1);
            assert_eq!(dio.dodag_id, ROOT);
            assert!(dio.dodag_configuration.is_some());
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn multicast_dis_is_answered() {
    let mut rpl = root(RplModeOfOperation::StoringModeWithoutMulticast);
    rpl.scheduler_mut().pending.clear();

    let dis = RplRepr::DodagInformationSolicitation(DodagInformationSolicitation::default());
    deliver(&mut rpl, NODE, LINK_LOCAL_ALL_RPL_NODES, &dis);

    let sent = &rpl.transport().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].dst, LINK_LOCAL_ALL_RPL_NODES);
    assert_eq!(sent[0].code, RplControlMessage::DodagInformationObject);

    // The Trickle timer starts over from the minimum interval.
    assert_eq!(rpl.dio_timer().interval(), rpl.dio_timer().min_interval());
    assert!(rpl.scheduler_mut().take(Timer::TrickleTransmit).is_some());
}

#[test]
fn large_sub_dodag_is_split_over_daos() {
    let mut rpl = joined_node(default_configuration());

    let targets: Vec<Ipv6Address> = (0..14)
        .map(|i| Ipv6Address::new(0xfd00, 0, 0, 0, 0, 0, 1, i))
        .collect();
    for target in &targets {
        deliver(&mut rpl, CHILD, NODE, &dao(*target, 30, None));
    }
    assert_eq!(rpl.dao_cache().len(), targets.len() + 1);

    rpl.transport_mut().sent.clear();
    fire(&mut rpl, Timer::DaoDelay);

    let mut advertised = Vec::new();
    let mut sequences = Vec::new();
    for sent in &rpl.transport().sent {
        assert!(sent.body.len() <= MAX_LENGTH);
        match sent.repr() {
            RplRepr::DestinationAdvertisementObject(dao) => {
                assert_eq!(sent.dst, ROOT);
                sequences.push(dao.sequence);
                advertised.extend(dao.targets.iter().map(|t| t.target.prefix));
            }
            other => panic!("unexpected {other}"),
        }
    }

    // Every DAO carries its own sequence number.
    let count = sequences.len();
    sequences.dedup();
    assert!(count >= 2);
    assert_eq!(sequences.len(), count);

    assert_eq!(advertised.len(), targets.len() + 1);
    assert!(advertised.contains(&NODE));
    for target in &targets {
        assert!(advertised.contains(target));
    }
}

#[test]
fn parent_moves_to_new_version() {
    let mut rpl = joined_node(default_configuration());
    assert_eq!(rpl.dodag().version_number(), 0);

    let mut repr = dio(
        1,
        RplModeOfOperation::StoringModeWithoutMulticast,
        Some(default_configuration()),
    );
    if let RplRepr::DodagInformationObject(dio) = &mut repr {
        dio.version_number = 1;
    }
    deliver(&mut rpl, ROOT, LINK_LOCAL_ALL_RPL_NODES, &repr);

    assert_eq!(rpl.dodag().version_number(), 1);
    assert!(rpl.is_connected());
    assert_eq!(rpl.parent(), Some(ROOT));
    assert_eq!(rpl.rank().raw_value(), 257);
}

#[test]
fn parent_rank_above_ours_detaches() {
    let mut rpl = joined_node(default_configuration());

    deliver(
        &mut rpl,
        ROOT,
        LINK_LOCAL_ALL_RPL_NODES,
        &dio(1024, RplModeOfOperation::StoringModeWithoutMulticast, Some(default_configuration())),
    );

    assert!(!rpl.is_connected());
    assert!(rpl.rank().is_infinite());
    assert!(rpl.parent().is_none());
    assert!(rpl.routes().default_route().is_none());

    rpl.transport_mut().sent.clear();
    fire(&mut rpl, Timer::TrickleTransmit);
    match rpl.transport().sent[0].repr() {
        RplRepr::DodagInformationObject(dio) => assert_eq!(dio.rank, INFINITE_RANK),
        other => panic!("unexpected {other}"),
    }
}
