#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn new_debouncer_has_nothing_pending() {
    let mut d: Debouncer<u32> = Debouncer::new(100.0);
    assert!(!d.is_pending());
    assert_eq!(d.deadline(), None);
    assert_eq!(d.poll(1_000.0), None);
}

#[test]
fn payload_is_held_until_deadline() {
    let mut d = Debouncer::new(100.0);
    d.schedule(0.0, "a");
    assert_eq!(d.poll(99.9), None);
    assert_eq!(d.poll(100.0), Some("a"));
    assert_eq!(d.poll(200.0), None);
}

#[test]
fn reschedule_replaces_payload_and_restarts_delay() {
    let mut d = Debouncer::new(100.0);
    d.schedule(0.0, 1);
    d.schedule(60.0, 2);
    assert_eq!(d.deadline(), Some(160.0));
    assert_eq!(d.poll(120.0), None);
    assert_eq!(d.poll(160.0), Some(2));
}

#[test]
fn burst_collapses_to_last_payload() {
    let mut d = Debouncer::new(100.0);
    for (i, t) in [0.0, 15.0, 30.0, 45.0, 60.0].into_iter().enumerate() {
        d.schedule(t, i);
        assert_eq!(d.poll(t), None);
    }
    let delivered: Vec<_> = [100.0, 159.0, 160.0, 400.0].into_iter().filter_map(|t| d.poll(t)).collect();
    assert_eq!(delivered, vec![4]);
}

#[test]
fn cancel_drops_pending() {
    let mut d = Debouncer::new(100.0);
    d.schedule(0.0, ());
    d.cancel();
    assert!(!d.is_pending());
    assert_eq!(d.poll(500.0), None);
}
