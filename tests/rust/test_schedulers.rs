/// Cross-policy properties exercised through the `Scheduler` sum type.
use flashsim_schedulers::{
    available_policies, scheduler_by_name, OpKind, Request, Scheduler,
};

fn read(user_id: u32, size_bytes: u32) -> Request {
    Request::new(user_id, OpKind::Read, 0.0, size_bytes)
}

/// Drain a scheduler completely, returning the pop order of tenant ids.
/// DRR may answer `None` while credit accumulates; every scan makes
/// progress, so the loop terminates.
fn drain(sched: &mut Scheduler) -> Vec<u32> {
    let mut order = Vec::new();
    while !sched.empty() {
        if let Some(uid) = sched.pick_user(0.0) {
            let request = sched.pop(uid).expect("pick_user guarantees the next pop");
            order.push(request.user_id);
        }
    }
    order
}

#[test]
fn test_all_policies_serve_every_request_once() {
    for policy in available_policies() {
        let mut sched = scheduler_by_name(policy, 4, 1).unwrap();
        sched.set_users(3);
        for uid in 0..3 {
            for _ in 0..5 {
                sched.enqueue(read(uid, 4096));
            }
        }

        let order = drain(&mut sched);
        assert_eq!(order.len(), 15, "policy {}", policy);
        for uid in 0..3u32 {
            assert_eq!(
                order.iter().filter(|&&u| u == uid).count(),
                5,
                "policy {} tenant {}",
                policy,
                uid
            );
        }
        assert!(sched.empty(), "policy {}", policy);
    }
}

#[test]
fn test_rr_completion_counts_stay_within_one() {
    let mut sched = scheduler_by_name("rr", 200, 1).unwrap();
    sched.set_users(3);
    for uid in 0..3 {
        for _ in 0..10 {
            sched.enqueue(read(uid, 4096));
        }
    }

    let mut counts = [0i64; 3];
    for _ in 0..30 {
        let uid = sched.pick_user(0.0).unwrap();
        sched.pop(uid).unwrap();
        counts[uid as usize] += 1;
        let max = counts.iter().max().unwrap();
        let min = counts.iter().min().unwrap();
        assert!(max - min <= 1, "counts diverged: {:?}", counts);
    }
}

#[test]
fn test_pick_does_not_remove() {
    for policy in available_policies() {
        let mut sched = scheduler_by_name(policy, 200, 1).unwrap();
        sched.set_users(1);
        sched.enqueue(read(0, 4096));

        let uid = sched.pick_user(0.0).unwrap();
        assert!(!sched.empty(), "policy {}: pick must not remove", policy);
        assert!(sched.pop(uid).is_some(), "policy {}", policy);
        assert!(sched.empty(), "policy {}", policy);
    }
}

#[test]
fn test_out_of_range_enqueue_is_dropped_everywhere() {
    for policy in available_policies() {
        let mut sched = scheduler_by_name(policy, 200, 1).unwrap();
        sched.set_users(2);
        sched.enqueue(read(2, 4096));
        sched.enqueue(read(99, 4096));
        assert!(sched.empty(), "policy {}", policy);
        assert_eq!(sched.pick_user(0.0), None, "policy {}", policy);
    }
}

#[test]
fn test_pop_on_empty_returns_none() {
    for policy in available_policies() {
        let mut sched = scheduler_by_name(policy, 200, 1).unwrap();
        sched.set_users(2);
        assert_eq!(sched.pop(0), None, "policy {}", policy);
        assert_eq!(sched.pop(5), None, "policy {}", policy);
    }
}

#[test]
fn test_sgfs_pop_sequence_matches_plain_wfq() {
    // The wrapper rotates published ids only; the requests actually popped
    // must match the base scheduler's order exactly.
    let workload: Vec<Request> = (0..20)
        .flat_map(|i| (0..3).map(move |uid| read(uid, 4096 * (1 + i % 3))))
        .collect();

    let mut wfq = scheduler_by_name("qfq", 200, 1).unwrap();
    let mut sgfs = scheduler_by_name("sgfs", 3, 1).unwrap();
    wfq.set_users(3);
    sgfs.set_users(3);
    for r in &workload {
        wfq.enqueue(r.clone());
        sgfs.enqueue(r.clone());
    }

    assert_eq!(drain(&mut wfq), drain(&mut sgfs));
}

#[test]
fn test_drr_share_follows_weights_for_oversized_requests() {
    let mut sched = scheduler_by_name("drr", 200, 1).unwrap();
    sched.set_users(2);
    sched.set_quantum(4096.0);
    sched.set_weights(&[3.0, 1.0]);
    for _ in 0..60 {
        sched.enqueue(read(0, 12288));
        sched.enqueue(read(1, 12288));
    }

    // Sample a window well past the first rotation: 3:1 exactly.
    let mut served = [0u32; 2];
    let mut picks = 0;
    while picks < 40 {
        if let Some(uid) = sched.pick_user(0.0) {
            sched.pop(uid).unwrap();
            served[uid as usize] += 1;
            picks += 1;
        }
    }
    assert_eq!(served, [30, 10]);
}

#[test]
fn test_wfq_share_follows_weights() {
    let mut sched = scheduler_by_name("qfq", 200, 1).unwrap();
    sched.set_users(2);
    sched.set_weights(&[2.0, 1.0]);
    for _ in 0..40 {
        sched.enqueue(read(0, 4096));
    }
    for _ in 0..20 {
        sched.enqueue(read(1, 4096));
    }

    let mut served = [0u32; 2];
    for _ in 0..30 {
        let uid = sched.pick_user(0.0).unwrap();
        sched.pop(uid).unwrap();
        served[uid as usize] += 1;
    }
    assert_eq!(served, [20, 10]);
}
