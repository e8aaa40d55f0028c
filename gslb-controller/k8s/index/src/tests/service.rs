use super::*;

#[test]
fn load_balancer_becomes_ready() {
    let test = TestConfig::default();
    let c1 = test.cluster("c1");

    // No VIP assigned yet.
    c1.add(mk_svc("ns1", "svc1", [GSLB_LABEL], None));
    assert!(test.keys().is_empty());
    assert_eq!(test.membership(ObjectType::Service, "c1", "ns1", "svc1"), None);

    c1.add(mk_svc("ns1", "svc1", [GSLB_LABEL], Some(("svc1.example.com", "10.0.0.5"))));
    assert_eq!(
        test.membership(ObjectType::Service, "c1", "ns1", "svc1"),
        Some(Membership::Accepted)
    );
    let key = test.queues.shard_for("svc1.example.com").try_next().expect("key must be published");
    assert_eq!(key.to_string(), "ADD/Service/c1/ns1/svc1");
    assert_eq!(key.hostname, "svc1.example.com");
    test.assert_exclusive();
}

#[test]
fn replay_is_a_noop() {
    let test = TestConfig::default();
    let c1 = test.cluster("c1");
    let svc = mk_svc("ns-0", "svc-0", [GSLB_LABEL], Some(("app.example.com", "10.0.0.1")));

    c1.add(svc.clone());
    assert_eq!(test.keys(), vec!["ADD/Service/c1/ns-0/svc-0"]);

    c1.update(svc.clone(), svc.clone());
    c1.add(svc);
    assert!(test.keys().is_empty());
    assert_eq!(
        test.membership(ObjectType::Service, "c1", "ns-0", "svc-0"),
        Some(Membership::Accepted)
    );
}

#[test]
fn transitions() {
    let test = TestConfig::default();
    let c1 = test.cluster("c1");
    let unlabeled = |ip| mk_svc("ns-0", "svc-0", NO_LABELS, Some(("app.example.com", ip)));
    let labeled = |ip| mk_svc("ns-0", "svc-0", [GSLB_LABEL], Some(("app.example.com", ip)));

    // UNSEEN -> REJECTED
    c1.add(unlabeled("10.0.0.1"));
    assert!(test.keys().is_empty());
    assert_eq!(
        test.membership(ObjectType::Service, "c1", "ns-0", "svc-0"),
        Some(Membership::Rejected)
    );

    // REJECTED -> REJECTED
    c1.update(unlabeled("10.0.0.1"), unlabeled("10.0.0.2"));
    assert!(test.keys().is_empty());
    assert_eq!(
        test.index
            .read()
            .rejected(ObjectType::Service, "c1", "ns-0", "svc-0")
            .map(|meta| meta.ip.clone()),
        Some("10.0.0.2".to_string())
    );

    // REJECTED -> ACCEPTED
    c1.update(unlabeled("10.0.0.2"), labeled("10.0.0.2"));
    assert_eq!(test.keys(), vec!["ADD/Service/c1/ns-0/svc-0"]);

    // ACCEPTED -> ACCEPTED
    c1.update(labeled("10.0.0.2"), labeled("10.0.0.3"));
    assert_eq!(test.keys(), vec!["UPDATE/Service/c1/ns-0/svc-0"]);

    // ACCEPTED -> REJECTED
    c1.update(labeled("10.0.0.3"), unlabeled("10.0.0.3"));
    assert_eq!(test.keys(), vec!["DELETE/Service/c1/ns-0/svc-0"]);

    // REJECTED -> UNSEEN
    c1.delete(unlabeled("10.0.0.3"));
    assert!(test.keys().is_empty());
    assert_eq!(test.membership(ObjectType::Service, "c1", "ns-0", "svc-0"), None);
    test.assert_exclusive();
}

#[test]
fn rejection_deletes_previous_hostname() {
    let test = TestConfig::default();
    let c1 = test.cluster("c1");

    c1.add(mk_svc("ns-0", "svc-0", [GSLB_LABEL], Some(("old.example.com", "10.0.0.1"))));
    assert_eq!(test.keys().len(), 1);

    c1.update(
        mk_svc("ns-0", "svc-0", [GSLB_LABEL], Some(("old.example.com", "10.0.0.1"))),
        mk_svc("ns-0", "svc-0", NO_LABELS, Some(("new.example.com", "10.0.0.1"))),
    );
    let key = test.queues.shards()[0].try_next().expect("key must be published");
    assert_eq!(key.to_string(), "DELETE/Service/c1/ns-0/svc-0");
    assert_eq!(key.hostname, "old.example.com");
}

#[test]
fn losing_the_vip_withdraws() {
    let test = TestConfig::default();
    let c1 = test.cluster("c1");

    c1.add(mk_svc("ns-0", "svc-0", [GSLB_LABEL], Some(("app.example.com", "10.0.0.1"))));
    c1.update(
        mk_svc("ns-0", "svc-0", [GSLB_LABEL], Some(("app.example.com", "10.0.0.1"))),
        mk_svc("ns-0", "svc-0", [GSLB_LABEL], None),
    );
    assert_eq!(
        test.keys(),
        vec!["ADD/Service/c1/ns-0/svc-0", "DELETE/Service/c1/ns-0/svc-0"]
    );
    assert_eq!(
        test.membership(ObjectType::Service, "c1", "ns-0", "svc-0"),
        Some(Membership::Rejected)
    );

    // Once the VIP returns the service is accepted again.
    c1.update(
        mk_svc("ns-0", "svc-0", [GSLB_LABEL], None),
        mk_svc("ns-0", "svc-0", [GSLB_LABEL], Some(("app.example.com", "10.0.0.1"))),
    );
    assert_eq!(test.keys(), vec!["ADD/Service/c1/ns-0/svc-0"]);
}

#[test]
fn no_longer_a_load_balancer() {
    let test = TestConfig::default();
    let c1 = test.cluster("c1");
    let lb = mk_svc("ns-0", "svc-0", [GSLB_LABEL], Some(("app.example.com", "10.0.0.1")));
    let mut cluster_ip = lb.clone();
    cluster_ip.spec = Some(ServiceSpec {
        type_: Some("ClusterIP".to_string()),
        ..Default::default()
    });

    c1.add(cluster_ip.clone());
    assert!(test.keys().is_empty());
    assert_eq!(test.membership(ObjectType::Service, "c1", "ns-0", "svc-0"), None);

    c1.update(cluster_ip.clone(), lb.clone());
    assert_eq!(test.keys(), vec!["ADD/Service/c1/ns-0/svc-0"]);

    c1.update(lb, cluster_ip);
    assert_eq!(test.keys(), vec!["DELETE/Service/c1/ns-0/svc-0"]);
    assert_eq!(test.membership(ObjectType::Service, "c1", "ns-0", "svc-0"), None);
}

#[test]
fn clusters_are_tracked_independently() {
    let test = TestConfig::default();
    let svc = mk_svc("ns-0", "svc-0", [GSLB_LABEL], Some(("app.example.com", "10.0.0.1")));

    test.cluster("c1").add(svc.clone());
    test.cluster("c2").add(svc.clone());
    // Not a member cluster.
    test.cluster("c3").add(svc.clone());
    assert_eq!(
        test.keys(),
        vec!["ADD/Service/c1/ns-0/svc-0", "ADD/Service/c2/ns-0/svc-0"]
    );
    assert_eq!(
        test.membership(ObjectType::Service, "c3", "ns-0", "svc-0"),
        Some(Membership::Rejected)
    );

    test.cluster("c1").delete(svc);
    assert_eq!(test.keys(), vec!["DELETE/Service/c1/ns-0/svc-0"]);
    assert_eq!(
        test.membership(ObjectType::Service, "c2", "ns-0", "svc-0"),
        Some(Membership::Accepted)
    );
}
