//! Price history tests: append, latest, window baseline and listing.

mod common;

use common::{hours_after_t0, setup_tracker, t0, FakeProvider, OTHER_USER, USER};
use mtg_price_tracker::models::{Currency, MarketPrice};
use mtg_price_tracker::TrackerError;

fn eur(cents: i64) -> MarketPrice {
    MarketPrice::new(cents, Currency::Eur)
}

#[test]
fn record_returns_stored_entry() {
    let tracker = setup_tracker(&FakeProvider::new());
    let entry = tracker.history().record(USER, "c1", eur(1250), t0()).unwrap();

    assert_eq!(entry.user_id, USER);
    assert_eq!(entry.card_id, "c1");
    assert_eq!(entry.price, 12.5);
    assert_eq!(entry.currency, Currency::Eur);
    assert_eq!(entry.checked_at, t0());

    let latest = tracker.history().latest(USER, "c1").unwrap().unwrap();
    assert_eq!(latest, entry);
}

#[test]
fn latest_is_none_without_history() {
    let tracker = setup_tracker(&FakeProvider::new());
    assert!(tracker.history().latest(USER, "c1").unwrap().is_none());
    assert_eq!(tracker.history().count(USER, "c1").unwrap(), 0);
}

#[test]
fn latest_picks_most_recent_check() {
    let tracker = setup_tracker(&FakeProvider::new());
    let history = tracker.history();
    history.record(USER, "c1", eur(100), hours_after_t0(5)).unwrap();
    history.record(USER, "c1", eur(200), t0()).unwrap();

    let latest = history.latest(USER, "c1").unwrap().unwrap();
    assert_eq!(latest.market_price(), eur(100));
}

#[test]
fn latest_before_excludes_entries_at_or_after_cutoff() {
    let tracker = setup_tracker(&FakeProvider::new());
    let history = tracker.history();
    history.record(USER, "c1", eur(1000), t0()).unwrap();
    history.record(USER, "c1", eur(1100), hours_after_t0(10)).unwrap();
    history.record(USER, "c1", eur(1200), hours_after_t0(30)).unwrap();

    let before = history
        .latest_before(USER, "c1", Currency::Eur, hours_after_t0(10))
        .unwrap()
        .unwrap();
    assert_eq!(before.market_price(), eur(1000));

    let before = history
        .latest_before(USER, "c1", Currency::Eur, hours_after_t0(11))
        .unwrap()
        .unwrap();
    assert_eq!(before.market_price(), eur(1100));

    assert!(history.latest_before(USER, "c1", Currency::Eur, t0()).unwrap().is_none());
}

#[test]
fn latest_before_skips_non_positive_prices() {
    let tracker = setup_tracker(&FakeProvider::new());
    let history = tracker.history();
    history.record(USER, "c1", eur(500), t0()).unwrap();
    history.record(USER, "c1", eur(0), hours_after_t0(1)).unwrap();

    let before = history
        .latest_before(USER, "c1", Currency::Eur, hours_after_t0(2))
        .unwrap()
        .unwrap();
    assert_eq!(before.market_price(), eur(500));
}

#[test]
fn latest_before_only_considers_requested_currency() {
    let tracker = setup_tracker(&FakeProvider::new());
    let history = tracker.history();
    history.record(USER, "c1", eur(800), t0()).unwrap();
    history
        .record(USER, "c1", MarketPrice::new(950, Currency::Usd), hours_after_t0(1))
        .unwrap();

    let cutoff = hours_after_t0(2);
    let eur_base = history.latest_before(USER, "c1", Currency::Eur, cutoff).unwrap().unwrap();
    assert_eq!(eur_base.market_price(), eur(800));
    let usd_base = history.latest_before(USER, "c1", Currency::Usd, cutoff).unwrap().unwrap();
    assert_eq!(usd_base.price, 9.5);
}

#[test]
fn history_is_partitioned_by_user() {
    let tracker = setup_tracker(&FakeProvider::new());
    let history = tracker.history();
    history.record(USER, "c1", eur(500), t0()).unwrap();
    history.record(OTHER_USER, "c1", eur(900), hours_after_t0(1)).unwrap();

    assert_eq!(history.count(USER, "c1").unwrap(), 1);
    assert_eq!(history.latest(USER, "c1").unwrap().unwrap().market_price(), eur(500));
    assert_eq!(history.list(OTHER_USER, "c1", 10).unwrap().len(), 1);
}

#[test]
fn list_returns_most_recent_entries_oldest_first() {
    let tracker = setup_tracker(&FakeProvider::new());
    let history = tracker.history();
    for (hour, cents) in [(0, 100), (24, 110), (48, 120), (72, 130)] {
        history.record(USER, "c1", eur(cents), hours_after_t0(hour)).unwrap();
    }

    let entries = history.list(USER, "c1", 3).unwrap();
    let prices: Vec<f64> = entries.iter().map(|e| e.price).collect();
    assert_eq!(prices, vec![1.1, 1.2, 1.3]);
    assert_eq!(entries[0].checked_at, hours_after_t0(24));
    assert_eq!(history.count(USER, "c1").unwrap(), 4);
}

#[test]
fn currency_round_trips_through_storage() {
    let tracker = setup_tracker(&FakeProvider::new());
    tracker
        .history()
        .record(USER, "c1", MarketPrice::new(350, Currency::Usd), t0())
        .unwrap();

    let entry = tracker.history().latest(USER, "c1").unwrap().unwrap();
    assert_eq!(entry.currency, Currency::Usd);
    assert_eq!(entry.market_price(), MarketPrice::new(350, Currency::Usd));
}

#[test]
fn tracker_price_history_rejects_zero_limit() {
    let tracker = setup_tracker(&FakeProvider::new());
    assert!(matches!(
        tracker.price_history(USER, "c1", 0),
        Err(TrackerError::InvalidArgument(_))
    ));
    assert!(tracker.price_history(USER, "c1", 5).unwrap().is_empty());
}
