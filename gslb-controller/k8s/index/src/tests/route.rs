use super::*;

#[test]
fn accepted_route_becomes_rejected() {
    let test = TestConfig::default();
    let c1 = test.cluster("c1");
    let accepted = mk_route("ns1", "r1", [GSLB_LABEL], "r1.example.com", Some("10.0.0.7"));
    let rejected = mk_route("ns1", "r1", NO_LABELS, "r1.example.com", Some("10.0.0.7"));

    c1.add(accepted.clone());
    assert_eq!(test.keys(), vec!["ADD/Route/c1/ns1/r1"]);

    c1.update(accepted, rejected);
    assert_eq!(test.keys(), vec!["DELETE/Route/c1/ns1/r1"]);
    assert!(test
        .index
        .read()
        .accepted(ObjectType::Route, "c1", "ns1", "r1")
        .is_none());
    assert!(test
        .index
        .read()
        .rejected(ObjectType::Route, "c1", "ns1", "r1")
        .is_some());
    test.assert_exclusive();
}

#[test]
fn unadmitted_route_is_skipped() {
    let test = TestConfig::default();
    let c1 = test.cluster("c1");

    c1.add(mk_route("ns-0", "rt-0", [GSLB_LABEL], "rt.example.com", None));
    assert!(test.keys().is_empty());
    assert_eq!(test.membership(ObjectType::Route, "c1", "ns-0", "rt-0"), None);

    c1.update(
        mk_route("ns-0", "rt-0", [GSLB_LABEL], "rt.example.com", None),
        mk_route("ns-0", "rt-0", [GSLB_LABEL], "rt.example.com", Some("10.0.0.7")),
    );
    assert_eq!(test.keys(), vec!["ADD/Route/c1/ns-0/rt-0"]);

    c1.delete(mk_route("ns-0", "rt-0", [GSLB_LABEL], "rt.example.com", Some("10.0.0.7")));
    assert_eq!(test.keys(), vec!["DELETE/Route/c1/ns-0/rt-0"]);
    assert!(test.index.read().store(ObjectType::Route).is_empty());
}
