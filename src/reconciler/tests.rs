use super::*;
use crate::sim::SimHost;

#[test]
fn first_pass_enables_only_visible_file_backed_resources() {
    let host = SimHost::new();
    let a = host.open(Some("a.txt".into()));
    let b = host.open(Some("b.txt".into()));
    let c = host.open(None);
    host.show(a);
    host.show(c);
    // b stays hidden

    let mut reconciler = Reconciler::new(host.clone());
    reconciler.reconcile();

    assert_eq!(reconciler.monitored().len(), 1);
    assert!(reconciler.monitored().contains(&a));
    assert!(host.live_mode_enabled(a));
    assert!(!host.live_mode_enabled(b));
    assert!(!host.live_mode_enabled(c));
    // c has no backing path and b is hidden: neither sees an adapter call
    assert_eq!(host.toggle_counts(), (1, 0));
}

#[test]
fn visibility_change_enables_and_disables() {
    let host = SimHost::new();
    let a = host.open(Some("a.txt".into()));
    let b = host.open(Some("b.txt".into()));
    let c = host.open(Some("c.txt".into()));
    let surface_a = host.show(a);
    host.show(b);

    let mut reconciler = Reconciler::new(host.clone());
    reconciler.reconcile();
    assert!(reconciler.monitored().contains(&a));
    assert!(reconciler.monitored().contains(&b));

    host.hide(surface_a);
    host.show(c);
    reconciler.reconcile();

    assert_eq!(reconciler.monitored().len(), 2);
    assert!(reconciler.monitored().contains(&b));
    assert!(reconciler.monitored().contains(&c));
    assert!(!host.live_mode_enabled(a));
    assert!(host.live_mode_enabled(b));
    assert!(host.live_mode_enabled(c));
}

#[test]
fn second_pass_without_changes_is_idempotent() {
    let host = SimHost::new();
    let a = host.open(Some("a.txt".into()));
    let b = host.open(Some("b.txt".into()));
    host.show(a);
    host.show(b);

    let mut reconciler = Reconciler::new(host.clone());
    reconciler.reconcile();
    let monitored_after_first = reconciler.monitored().clone();
    let counts_after_first = host.toggle_counts();

    reconciler.reconcile();

    assert_eq!(reconciler.monitored(), &monitored_after_first);
    assert_eq!(host.toggle_counts(), counts_after_first);
    assert_eq!(host.enabled_set(), monitored_after_first);
}

#[test]
fn dead_monitored_resource_is_purged_without_adapter_call() {
    let host = SimHost::new();
    let a = host.open(Some("a.txt".into()));
    host.show(a);

    let mut reconciler = Reconciler::new(host.clone());
    reconciler.reconcile();
    assert_eq!(host.toggle_counts(), (1, 0));

    // Handle dies while its surface is still on screen.
    host.kill(a);
    reconciler.reconcile();

    assert!(reconciler.monitored().is_empty());
    assert_eq!(host.toggle_counts(), (1, 0));
}

#[test]
fn closed_resource_is_dropped_without_adapter_call() {
    let host = SimHost::new();
    let a = host.open(Some("a.txt".into()));
    host.show(a);

    let mut reconciler = Reconciler::new(host.clone());
    reconciler.reconcile();

    // close() removes the surfaces too, so a lands in the disable delta,
    // where the liveness guard skips the adapter.
    host.close(a);
    reconciler.reconcile();

    assert!(reconciler.monitored().is_empty());
    assert_eq!(host.toggle_counts(), (1, 0));
}

#[test]
fn enable_failure_is_skipped_and_retried_next_pass() {
    let host = SimHost::new();
    let a = host.open(Some("a.txt".into()));
    let b = host.open(Some("b.txt".into()));
    host.show(a);
    host.show(b);
    host.fail_next_toggle(a);

    let mut reconciler = Reconciler::new(host.clone());
    reconciler.reconcile();

    // The failure on a does not abort the pass; b still gets enabled.
    assert_eq!(reconciler.monitored().len(), 1);
    assert!(reconciler.monitored().contains(&b));
    assert!(!host.live_mode_enabled(a));

    reconciler.reconcile();
    assert_eq!(reconciler.monitored().len(), 2);
    assert!(host.live_mode_enabled(a));
}

#[test]
fn disable_failure_still_clears_the_entry() {
    let host = SimHost::new();
    let a = host.open(Some("a.txt".into()));
    let surface = host.show(a);

    let mut reconciler = Reconciler::new(host.clone());
    reconciler.reconcile();

    host.hide(surface);
    host.fail_next_toggle(a);
    reconciler.reconcile();

    assert!(reconciler.monitored().is_empty());
    // The external toggle stayed on; internal state is clean regardless.
    assert!(host.live_mode_enabled(a));
}

#[test]
fn teardown_disables_live_members_and_clears() {
    let host = SimHost::new();
    let a = host.open(Some("a.txt".into()));
    let b = host.open(Some("b.txt".into()));
    host.show(a);
    host.show(b);

    let mut reconciler = Reconciler::new(host.clone());
    reconciler.reconcile();
    assert_eq!(host.toggle_counts(), (2, 0));

    host.kill(b);
    reconciler.teardown();

    assert!(reconciler.monitored().is_empty());
    assert!(!host.live_mode_enabled(a));
    // Only the live member gets a disable call.
    assert_eq!(host.toggle_counts(), (2, 1));
}
