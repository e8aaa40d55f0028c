use super::*;

fn namespace_selected() -> TestConfig {
    TestConfig::new(None, Some(Selector::from_iter(Some(GSLB_LABEL))))
}

#[test]
fn selecting_a_namespace_cascades() {
    let test = namespace_selected();
    let c1 = test.cluster("c1");
    let svc = mk_svc("ns1", "svc1", NO_LABELS, Some(("svc1.example.com", "10.0.0.5")));

    c1.add(mk_ns("ns1", NO_LABELS));
    c1.add(svc);
    assert!(test.keys().is_empty());
    assert_eq!(
        test.membership(ObjectType::Namespace, "c1", "", "ns1"),
        Some(Membership::Rejected)
    );
    assert_eq!(
        test.membership(ObjectType::Service, "c1", "ns1", "svc1"),
        Some(Membership::Rejected)
    );

    // No event on the service itself is needed.
    c1.update(mk_ns("ns1", NO_LABELS), mk_ns("ns1", [GSLB_LABEL]));
    assert_eq!(test.keys(), vec!["ADD/Service/c1/ns1/svc1"]);
    assert_eq!(
        test.membership(ObjectType::Namespace, "c1", "", "ns1"),
        Some(Membership::Accepted)
    );
    assert_eq!(
        test.membership(ObjectType::Service, "c1", "ns1", "svc1"),
        Some(Membership::Accepted)
    );

    c1.update(mk_ns("ns1", [GSLB_LABEL]), mk_ns("ns1", NO_LABELS));
    assert_eq!(test.keys(), vec!["DELETE/Service/c1/ns1/svc1"]);
    assert_eq!(
        test.membership(ObjectType::Service, "c1", "ns1", "svc1"),
        Some(Membership::Rejected)
    );
    test.assert_exclusive();
}

#[test]
fn sweep_covers_every_kind() {
    let test = namespace_selected();
    let c1 = test.cluster("c1");

    c1.add(mk_svc("ns-0", "svc-0", NO_LABELS, Some(("svc.example.com", "10.0.0.1"))));
    c1.add(mk_ingress(
        "ns-0",
        "ing-0",
        NO_LABELS,
        &["ing.example.com"],
        &[("ing.example.com", "10.0.0.2")],
    ));
    c1.add(mk_route("ns-0", "rt-0", NO_LABELS, "rt.example.com", Some("10.0.0.3")));
    // A route without a VIP is never published.
    c1.add(mk_route("ns-0", "rt-1", NO_LABELS, "rt1.example.com", None));
    assert!(test.keys().is_empty());

    c1.add(mk_ns("ns-0", [GSLB_LABEL]));
    assert_eq!(
        test.keys(),
        vec![
            "ADD/Service/c1/ns-0/svc-0",
            "ADD/Ingress/c1/ns-0/ing-0/ing.example.com",
            "ADD/Route/c1/ns-0/rt-0",
        ]
    );

    c1.delete(mk_ns("ns-0", [GSLB_LABEL]));
    assert_eq!(
        test.keys(),
        vec![
            "DELETE/Service/c1/ns-0/svc-0",
            "DELETE/Ingress/c1/ns-0/ing-0/ing.example.com",
            "DELETE/Route/c1/ns-0/rt-0",
        ]
    );
    assert_eq!(test.membership(ObjectType::Namespace, "c1", "", "ns-0"), None);
    test.assert_exclusive();
}

#[test]
fn sweep_is_scoped_to_the_cluster() {
    let test = namespace_selected();
    let svc = mk_svc("ns-0", "svc-0", NO_LABELS, Some(("app.example.com", "10.0.0.1")));

    test.cluster("c1").add(svc.clone());
    test.cluster("c2").add(svc);

    test.cluster("c2").add(mk_ns("ns-0", [GSLB_LABEL]));
    assert_eq!(test.keys(), vec!["ADD/Service/c2/ns-0/svc-0"]);
    assert_eq!(
        test.membership(ObjectType::Service, "c1", "ns-0", "svc-0"),
        Some(Membership::Rejected)
    );
}

#[test]
fn namespace_replay_is_a_noop() {
    let test = namespace_selected();
    let c1 = test.cluster("c1");

    c1.add(mk_svc("ns-0", "svc-0", NO_LABELS, Some(("app.example.com", "10.0.0.1"))));
    c1.add(mk_ns("ns-0", [GSLB_LABEL]));
    assert_eq!(test.keys(), vec!["ADD/Service/c1/ns-0/svc-0"]);

    c1.update(mk_ns("ns-0", [GSLB_LABEL]), mk_ns("ns-0", [GSLB_LABEL]));
    c1.add(mk_ns("ns-0", [GSLB_LABEL]));
    assert!(test.keys().is_empty());

    // A label change that does not affect selection still re-evaluates without publishing.
    c1.update(
        mk_ns("ns-0", [GSLB_LABEL]),
        mk_ns("ns-0", [GSLB_LABEL, ("team", "a")]),
    );
    assert!(test.keys().is_empty());
    assert_eq!(
        test.membership(ObjectType::Namespace, "c1", "", "ns-0"),
        Some(Membership::Accepted)
    );
}

#[test]
fn object_selector_outlives_namespace() {
    let test = TestConfig::new(
        Some(Selector::from_iter(Some(("app", "web")))),
        Some(Selector::from_iter(Some(GSLB_LABEL))),
    );
    let c1 = test.cluster("c1");

    c1.add(mk_ns("ns-0", [GSLB_LABEL]));
    c1.add(mk_svc("ns-0", "svc-0", [("app", "web")], Some(("web.example.com", "10.0.0.1"))));
    c1.add(mk_svc("ns-0", "svc-1", NO_LABELS, Some(("api.example.com", "10.0.0.2"))));
    assert_eq!(
        test.keys(),
        vec!["ADD/Service/c1/ns-0/svc-0", "ADD/Service/c1/ns-0/svc-1"]
    );

    c1.delete(mk_ns("ns-0", [GSLB_LABEL]));
    assert_eq!(test.keys(), vec!["DELETE/Service/c1/ns-0/svc-1"]);
    assert_eq!(
        test.membership(ObjectType::Service, "c1", "ns-0", "svc-0"),
        Some(Membership::Accepted)
    );
}
