use crate::common::virtual_network::{
    addr, converged, get_interface, interface_towards, received, router,
};

mod common;

#[test]
fn data_follows_the_routing_table() {
    let mut network = converged(&common::graphs::diamond());
    network.send(&addr("H1"), addr("H3"), "hello").unwrap();
    network.run_until_quiet(20).unwrap();

    assert_eq!(received(&network, "H3"), vec!["hello"]);
    assert!(received(&network, "H1").is_empty());
    assert!(received(&network, "H2").is_empty());

    let via = get_interface(&network, "A", "H3");
    let (taken, skipped) = if via == interface_towards(&network, "A", "B") {
        ("B", "C")
    } else {
        ("C", "B")
    };
    assert_eq!(router(&network, "A").stats().data_forwarded, 1);
    assert_eq!(router(&network, taken).stats().data_forwarded, 1);
    assert_eq!(router(&network, skipped).stats().data_forwarded, 0);
    assert_eq!(router(&network, "D").stats().data_forwarded, 1);
}

#[test]
fn replies_take_the_reverse_direction() {
    let mut network = converged(&common::graphs::diamond());
    network.send(&addr("H3"), addr("H2"), "ping").unwrap();
    network.send(&addr("H3"), addr("H1"), "ping").unwrap();
    network.run_until_quiet(20).unwrap();

    assert_eq!(received(&network, "H1"), vec!["ping"]);
    assert_eq!(received(&network, "H2"), vec!["ping"]);
    assert_eq!(router(&network, "D").stats().data_forwarded, 2);
    assert_eq!(router(&network, "A").stats().data_forwarded, 2);
}

#[test]
fn hosts_on_the_same_router() {
    let mut network = converged(&common::graphs::diamond());
    network.send(&addr("H1"), addr("H2"), "next door").unwrap();
    network.run_until_quiet(20).unwrap();

    assert_eq!(received(&network, "H2"), vec!["next door"]);
    assert_eq!(router(&network, "A").stats().data_forwarded, 1);
    for name in ["B", "C", "D"] {
        assert_eq!(router(&network, name).stats().data_forwarded, 0);
    }
}

#[test]
fn payload_order_is_kept() {
    let mut network = converged(&common::graphs::line());
    for i in 0..10 {
        network.send(&addr("H1"), addr("H2"), format!("msg {i}")).unwrap();
    }
    network.run_until_quiet(50).unwrap();
    let expected: Vec<String> = (0..10).map(|i| format!("msg {i}")).collect();
    assert_eq!(received(&network, "H2"), expected);
}

#[test]
fn packet_for_a_router_stops_there() {
    let mut network = converged(&common::graphs::diamond());
    network.send(&addr("H1"), addr("D"), "for you").unwrap();
    network.run_until_quiet(20).unwrap();

    assert_eq!(router(&network, "D").stats().data_delivered, 1);
    assert_eq!(router(&network, "D").stats().data_forwarded, 0);
    assert!(received(&network, "H3").is_empty());
}

#[test]
fn no_route_before_convergence() {
    let mut network = dvnet::Network::build(&common::graphs::diamond()).unwrap();
    network.send(&addr("H1"), addr("H3"), "too early").unwrap();
    network.run_until_quiet(20).unwrap();

    assert_eq!(router(&network, "A").stats().data_undeliverable, 1);
    assert!(received(&network, "H3").is_empty());
}

#[test]
fn unknown_destination_is_undeliverable() {
    let mut network = converged(&common::graphs::diamond());
    network.send(&addr("H1"), addr("Z9"), "nobody").unwrap();
    network.run_until_quiet(20).unwrap();

    assert_eq!(router(&network, "A").stats().data_undeliverable, 1);
    assert_eq!(router(&network, "A").stats().data_forwarded, 0);
}

#[test]
fn unknown_sender() {
    let mut network = converged(&common::graphs::diamond());
    assert!(network.send(&addr("H9"), addr("H1"), "x").is_err());
}
