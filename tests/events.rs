mod common;

use event_booking::error::Error;
use event_booking::models::{Booking, DataCreateBooking, Event, EventMode, PartialEvent};

use common::{event_data, reference_db};

#[tokio::test]
async fn create_normalizes_slug_date_and_time() {
    let db = reference_db().await;

    let event = Event::create(&db, event_data("  RustConf 2025: Systems & Beyond  "))
        .await
        .unwrap();

    assert_eq!(event.title, "RustConf 2025: Systems & Beyond");
    assert_eq!(event.slug, "rustconf-2025-systems-beyond");
    assert_eq!(event.date, "2025-03-05");
    assert_eq!(event.time, "09:30");
    assert_eq!(event.mode, EventMode::Hybrid);

    let stored = Event::fetch(&db, &event.id).await.unwrap();
    assert_eq!(stored, event);
}

#[tokio::test]
async fn invalid_fields_are_reported_and_nothing_is_written() {
    let db = reference_db().await;

    let mut data = event_data("ok");
    data.description = "short".into();
    data.mode = "remote".into();
    data.agenda = vec!["   ".into()];
    data.tags = vec![];

    let Err(Error::Validation(errors)) = Event::create(&db, data).await else {
        panic!("expected validation error");
    };
    let fields = errors.field_errors();
    for field in ["title", "description", "mode", "agenda", "tags"] {
        assert!(fields.contains_key(field), "missing error for {field}");
    }

    assert!(Event::list(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn unparsable_date_or_time_rejects_the_save() {
    let db = reference_db().await;

    let mut data = event_data("Bad Date Day");
    data.date = "the thirty-second of never".into();
    assert!(matches!(
        Event::create(&db, data).await,
        Err(Error::Validation(_))
    ));

    let mut data = event_data("Bad Time Day");
    data.time = "25:00".into();
    assert!(matches!(
        Event::create(&db, data).await,
        Err(Error::Validation(_))
    ));

    assert!(Event::list(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn colliding_slug_fails_without_suffixing() {
    let db = reference_db().await;

    Event::create(&db, event_data("Rust Meetup")).await.unwrap();
    let error = Event::create(&db, event_data("rust   meetup!")).await.unwrap_err();

    assert!(matches!(error, Error::Uniqueness { collection: "events", .. }));
    assert_eq!(Event::list(&db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_recomputes_only_changed_sources() {
    let db = reference_db().await;
    let mut event = Event::create(&db, event_data("Rust Meetup")).await.unwrap();

    event
        .update(
            &db,
            PartialEvent {
                venue: Some("Hall B".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(event.slug, "rust-meetup");
    assert_eq!(event.venue, "Hall B");

    event
        .update(
            &db,
            PartialEvent {
                title: Some("Rust Meetup Spring Edition".into()),
                time: Some("7:15 PM".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(event.slug, "rust-meetup-spring-edition");
    assert_eq!(event.time, "19:15");
    assert_eq!(event.date, "2025-03-05");

    let stored = Event::fetch_by_slug(&db, "rust-meetup-spring-edition")
        .await
        .unwrap();
    assert_eq!(stored, event);
    assert!(matches!(
        Event::fetch_by_slug(&db, "rust-meetup").await,
        Err(Error::NotFound)
    ));
}

#[tokio::test]
async fn rejected_update_leaves_record_untouched() {
    let db = reference_db().await;
    let mut event = Event::create(&db, event_data("Rust Meetup")).await.unwrap();
    let before = event.clone();

    let error = event
        .update(
            &db,
            PartialEvent {
                date: Some("someday".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(error, Error::Validation(_)));
    assert_eq!(event, before);
    assert_eq!(Event::fetch(&db, &event.id).await.unwrap(), before);
}

#[tokio::test]
async fn fetch_by_slug_trims_and_lowercases() {
    let db = reference_db().await;
    let event = Event::create(&db, event_data("Rust Meetup")).await.unwrap();

    let found = Event::fetch_by_slug(&db, "  Rust-Meetup ").await.unwrap();
    assert_eq!(found.id, event.id);

    assert!(matches!(
        Event::fetch_by_slug(&db, "   ").await,
        Err(Error::Validation(_))
    ));
}

#[tokio::test]
async fn list_is_newest_first_and_similar_shares_tags() {
    let db = reference_db().await;

    let first = Event::create(&db, event_data("Rust Meetup")).await.unwrap();
    let second = Event::create(&db, event_data("Systems Day")).await.unwrap();
    let mut data = event_data("Design Night");
    data.tags = vec!["design".into()];
    let third = Event::create(&db, data).await.unwrap();

    let ids: Vec<_> = Event::list(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|event| event.id)
        .collect();
    assert_eq!(ids, vec![third.id.clone(), second.id.clone(), first.id.clone()]);

    let similar = first.similar(&db).await.unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].id, second.id);
}

#[tokio::test]
async fn deleting_an_event_keeps_its_bookings() {
    let db = reference_db().await;
    let event = Event::create(&db, event_data("Rust Meetup")).await.unwrap();
    Booking::create(
        &db,
        DataCreateBooking {
            event_id: event.id.clone(),
            email: "ada@example.com".into(),
        },
    )
    .await
    .unwrap();

    let id = event.id.clone();
    event.delete(&db).await.unwrap();

    assert!(!Event::exists(&db, &id).await.unwrap());
    assert_eq!(Booking::count_for_event(&db, &id).await.unwrap(), 1);
}
