use mailmorph_core::{FetchLifecycle, FetchState, Phase};

#[test]
fn new_lifecycle_is_idle_and_not_loading() {
    let lifecycle: FetchLifecycle<u32> = FetchLifecycle::new();

    assert_eq!(lifecycle.phase(), &Phase::Idle);
    assert_eq!(lifecycle.snapshot(), FetchState::default());
}

#[test]
fn mounted_lifecycle_starts_loading() {
    let lifecycle: FetchLifecycle<u32> = FetchLifecycle::mounted(1);

    assert_eq!(
        lifecycle.snapshot(),
        FetchState {
            items: Vec::new(),
            is_loading: true,
            error: None,
        }
    );
}

#[test]
fn resolve_is_terminal() {
    let mut lifecycle = FetchLifecycle::mounted(1);

    assert!(lifecycle.resolve(1, vec![10, 20]));
    assert!(!lifecycle.resolve(1, vec![30]));
    assert!(!lifecycle.reject(1, "late failure"));

    assert_eq!(
        lifecycle.snapshot(),
        FetchState {
            items: vec![10, 20],
            is_loading: false,
            error: None,
        }
    );
}

#[test]
fn reject_clears_items_and_keeps_message() {
    let mut lifecycle: FetchLifecycle<u32> = FetchLifecycle::mounted(4);

    assert!(lifecycle.settle(4, Err::<Vec<u32>, _>("HTTP 500")));
    assert!(!lifecycle.resolve(4, vec![1]));

    let snapshot = lifecycle.snapshot();
    assert!(snapshot.items.is_empty());
    assert!(!snapshot.is_loading);
    assert_eq!(snapshot.error.as_deref(), Some("HTTP 500"));
}

#[test]
fn mismatched_ticket_is_ignored() {
    let mut lifecycle = FetchLifecycle::mounted(2);

    assert!(!lifecycle.resolve(1, vec![1]));
    assert!(lifecycle.is_loading());
}

#[test]
fn teardown_discards_late_results() {
    let mut lifecycle = FetchLifecycle::mounted(3);

    assert_eq!(lifecycle.teardown(), Some(3));
    assert!(lifecycle.is_discarded());
    assert!(!lifecycle.is_pending());
    assert!(!lifecycle.resolve(3, vec![1]));
    assert_eq!(lifecycle.phase(), &Phase::Loading);
    // Second teardown has nothing left in flight.
    assert_eq!(lifecycle.teardown(), None);
}

#[test]
fn teardown_after_settle_reports_nothing_in_flight() {
    let mut lifecycle = FetchLifecycle::mounted(5);
    lifecycle.resolve(5, vec![1]);

    assert_eq!(lifecycle.teardown(), None);
}

#[test]
fn loading_and_terminal_are_mutually_exclusive() {
    let mut ok = FetchLifecycle::mounted(1);
    ok.resolve(1, vec!["row"]);
    let mut failed: FetchLifecycle<&str> = FetchLifecycle::mounted(2);
    failed.reject(2, "boom");

    for lifecycle in [ok, failed] {
        let snapshot = lifecycle.snapshot();
        assert!(lifecycle.is_settled());
        assert!(!snapshot.is_loading);
    }
}
