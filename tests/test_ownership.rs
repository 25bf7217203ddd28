//! Ownership tests: containers, card records, scoping and the cached-price fan-out.

mod common;

use common::{hours_after_t0, setup_tracker, t0, FakeProvider, OTHER_USER, USER};
use mtg_price_tracker::models::{Currency, MarketPrice};
use mtg_price_tracker::TrackerError;

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

#[test]
fn create_collection_assigns_id() {
    let tracker = setup_tracker(&FakeProvider::new());
    let a = tracker.ownership().create_collection(USER, "Modern").unwrap();
    let b = tracker.ownership().create_collection(USER, "Modern").unwrap();

    assert_eq!(a.user_id, USER);
    assert_eq!(a.name, "Modern");
    assert!(!a.id.is_empty());
    assert_ne!(a.id, b.id);
}

#[test]
fn blank_names_are_rejected() {
    let tracker = setup_tracker(&FakeProvider::new());
    let ownership = tracker.ownership();

    assert!(matches!(
        ownership.create_collection(USER, "  "),
        Err(TrackerError::InvalidArgument(_))
    ));
    assert!(matches!(
        ownership.create_deck("", "Burn"),
        Err(TrackerError::InvalidArgument(_))
    ));
}

// ---------------------------------------------------------------------------
// Card records
// ---------------------------------------------------------------------------

#[test]
fn add_rejects_non_positive_quantity() {
    let tracker = setup_tracker(&FakeProvider::new());
    let ownership = tracker.ownership();
    let collection = ownership.create_collection(USER, "Modern").unwrap();
    let deck = ownership.create_deck(USER, "Burn").unwrap();

    assert!(matches!(
        ownership.add_to_collection(&collection.id, "c1", 0, false),
        Err(TrackerError::InvalidArgument(_))
    ));
    assert!(matches!(
        ownership.add_to_deck(&deck.id, "c1", -3),
        Err(TrackerError::InvalidArgument(_))
    ));
}

#[test]
fn add_to_missing_container_is_not_found() {
    let tracker = setup_tracker(&FakeProvider::new());
    let ownership = tracker.ownership();

    assert!(matches!(
        ownership.add_to_collection("nope", "c1", 1, false),
        Err(TrackerError::NotFound(_))
    ));
    assert!(matches!(
        ownership.add_to_deck("nope", "c1", 1),
        Err(TrackerError::NotFound(_))
    ));
}

#[test]
fn new_records_start_without_cached_price() {
    let tracker = setup_tracker(&FakeProvider::new());
    let ownership = tracker.ownership();
    let collection = ownership.create_collection(USER, "Modern").unwrap();
    ownership.add_to_collection(&collection.id, "c1", 3, true).unwrap();

    let owned = ownership.owned_records(USER, "c1").unwrap();
    assert_eq!(owned.len(), 1);
    let entry = &owned.collections[0];
    assert_eq!(entry.collection_id, collection.id);
    assert_eq!(entry.collection_name, "Modern");
    assert_eq!(entry.quantity, 3);
    assert!(entry.foil);
    assert_eq!(entry.cache.last_price, None);
    assert_eq!(entry.cache.last_price_currency, None);
    assert_eq!(entry.cache.last_price_check, None);
}

#[test]
fn owned_records_are_scoped_to_user_and_card() {
    let tracker = setup_tracker(&FakeProvider::new());
    let ownership = tracker.ownership();

    let mine = ownership.create_collection(USER, "Modern").unwrap();
    let theirs = ownership.create_collection(OTHER_USER, "Modern").unwrap();
    let deck = ownership.create_deck(USER, "Burn").unwrap();
    ownership.add_to_collection(&mine.id, "c1", 1, false).unwrap();
    ownership.add_to_collection(&mine.id, "c2", 1, false).unwrap();
    ownership.add_to_collection(&theirs.id, "c1", 1, false).unwrap();
    ownership.add_to_deck(&deck.id, "c1", 4).unwrap();

    let owned = ownership.owned_records(USER, "c1").unwrap();
    assert_eq!(owned.collections.len(), 1);
    assert_eq!(owned.collections[0].collection_id, mine.id);
    assert_eq!(owned.decks.len(), 1);
    assert_eq!(owned.decks[0].deck_name, "Burn");
    assert_eq!(owned.decks[0].quantity, 4);

    assert!(ownership.owned_records(USER, "c3").unwrap().is_empty());
}

#[test]
fn owned_records_are_ordered_by_container_name() {
    let tracker = setup_tracker(&FakeProvider::new());
    let ownership = tracker.ownership();
    for name in ["Zoo", "Affinity", "Merfolk"] {
        let collection = ownership.create_collection(USER, name).unwrap();
        ownership.add_to_collection(&collection.id, "c1", 1, false).unwrap();
    }

    let owned = ownership.owned_records(USER, "c1").unwrap();
    let names: Vec<&str> = owned
        .collections
        .iter()
        .map(|c| c.collection_name.as_str())
        .collect();
    assert_eq!(names, vec!["Affinity", "Merfolk", "Zoo"]);
}

// ---------------------------------------------------------------------------
// Fan-out
// ---------------------------------------------------------------------------

#[test]
fn update_cached_price_reaches_every_record_of_the_user() {
    let tracker = setup_tracker(&FakeProvider::new());
    let ownership = tracker.ownership();

    let a = ownership.create_collection(USER, "A").unwrap();
    let b = ownership.create_collection(USER, "B").unwrap();
    let deck = ownership.create_deck(USER, "Deck").unwrap();
    let other = ownership.create_collection(OTHER_USER, "Other").unwrap();
    ownership.add_to_collection(&a.id, "c1", 1, false).unwrap();
    ownership.add_to_collection(&b.id, "c1", 2, true).unwrap();
    ownership.add_to_deck(&deck.id, "c1", 4).unwrap();
    ownership.add_to_collection(&other.id, "c1", 1, false).unwrap();
    ownership.add_to_collection(&a.id, "c2", 1, false).unwrap();

    let price = MarketPrice::new(1999, Currency::Usd);
    let report = ownership.update_cached_price(USER, "c1", price, t0());
    assert!(report.is_complete());
    assert_eq!(report.updated, 3);

    let owned = ownership.owned_records(USER, "c1").unwrap();
    for record in owned.iter() {
        let cache = record.cache();
        assert_eq!(cache.last_price, Some(19.99));
        assert_eq!(cache.last_price_currency.as_deref(), Some("USD"));
        assert_eq!(cache.last_price_check, Some(t0()));
        assert_eq!(cache.market_price(), Some(price));
    }

    let theirs = ownership.owned_records(OTHER_USER, "c1").unwrap();
    assert_eq!(theirs.collections[0].cache.last_price, None);
    let other_card = ownership.owned_records(USER, "c2").unwrap();
    assert_eq!(other_card.collections[0].cache.last_price, None);
}

#[test]
fn update_cached_price_counts_failed_batches() {
    let tracker = setup_tracker(&FakeProvider::new());
    let ownership = tracker.ownership();
    let collection = ownership.create_collection(USER, "A").unwrap();
    ownership.add_to_collection(&collection.id, "c1", 1, false).unwrap();

    tracker
        .connection()
        .raw()
        .execute_batch("DROP TABLE deck_cards")
        .unwrap();

    let price = MarketPrice::new(500, Currency::Eur);
    let report = ownership.update_cached_price(USER, "c1", price, t0());
    assert_eq!(report.updated, 1);
    assert_eq!(report.failed_batches, 1);
    assert!(!report.is_complete());
}

// ---------------------------------------------------------------------------
// Cache selection
// ---------------------------------------------------------------------------

#[test]
fn freshest_cache_ignores_stale_and_unpriced_records() {
    let tracker = setup_tracker(&FakeProvider::new());
    let ownership = tracker.ownership();
    let collection = ownership.create_collection(USER, "A").unwrap();
    ownership.add_to_collection(&collection.id, "c1", 1, false).unwrap();
    ownership.update_cached_price(USER, "c1", MarketPrice::new(500, Currency::Eur), t0());
    let deck = ownership.create_deck(USER, "Deck").unwrap();
    ownership.add_to_deck(&deck.id, "c1", 1).unwrap();

    let owned = ownership.owned_records(USER, "c1").unwrap();
    let fresh = owned.freshest_cache(hours_after_t0(-1)).unwrap();
    assert_eq!(fresh.last_price_check, Some(t0()));
    assert!(owned.freshest_cache(t0()).is_none());

    let latest = owned.latest_cache().unwrap();
    assert_eq!(latest.last_price, Some(5.0));
}

#[test]
fn owned_in_summarizes_holdings() {
    let tracker = setup_tracker(&FakeProvider::new());
    let ownership = tracker.ownership();
    let collection = ownership.create_collection(USER, "Binder").unwrap();
    ownership.add_to_collection(&collection.id, "c1", 2, true).unwrap();
    let deck = ownership.create_deck(USER, "Burn").unwrap();
    ownership.add_to_deck(&deck.id, "c1", 4).unwrap();

    let summary = ownership.owned_records(USER, "c1").unwrap().owned_in();
    assert_eq!(summary.collections.len(), 1);
    assert_eq!(summary.collections[0].name, "Binder");
    assert_eq!(summary.collections[0].quantity, 2);
    assert!(summary.collections[0].foil);
    assert_eq!(summary.decks[0].id, deck.id);
    assert_eq!(summary.decks[0].quantity, 4);
}
