//! Behaviour every `Store` implementation must share.
//!
//! Backend test modules call these against a fresh, empty store.

use chrono::Utc;

use rehber_core::{
    DeviceFilter, DeviceUpsert, NewNotification, NewPhoto, NewUpdateNote, SettingsPatch,
    UsageEvent,
};

use crate::{bootstrap, Collection, Store};

fn note(title: &str) -> NewUpdateNote {
    NewUpdateNote::new(Some(title.into()), Some("content".into()), None).unwrap()
}

fn photo(title: &str) -> NewPhoto {
    NewPhoto::new(Some(title.into()), Some(format!("/{title}.jpg"))).unwrap()
}

fn device(id: &str, token: Option<&str>) -> DeviceUpsert {
    DeviceUpsert::new(
        Some(id.into()),
        token.map(Into::into),
        Some("1.0.0".into()),
        Some("android".into()),
        None,
    )
    .unwrap()
}

pub async fn listings_newest_first(store: &dyn Store) {
    store.create_update_note(note("A")).await.unwrap();
    store.create_update_note(note("B")).await.unwrap();
    let notes = store.list_update_notes(None).await.unwrap();
    let titles: Vec<_> = notes.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, ["B", "A"]);

    store.create_photo(photo("a")).await.unwrap();
    store.create_photo(photo("b")).await.unwrap();
    let photos = store.list_photos(None).await.unwrap();
    assert_eq!(photos[0].title, "b");
    assert_eq!(photos[1].title, "a");

    let first = NewNotification::new(Some("A".into()), Some("m".into()), None).unwrap();
    let second = NewNotification::new(Some("B".into()), Some("m".into()), None).unwrap();
    store.create_notification(first).await.unwrap();
    store.create_notification(second).await.unwrap();
    let notifications = store.list_notifications(None).await.unwrap();
    assert_eq!(notifications[0].title, "B");
    assert!(notifications[0].id > notifications[1].id);

    store.upsert_device(device("first", None)).await.unwrap();
    store.upsert_device(device("second", None)).await.unwrap();
    // Refreshing an older device does not reorder the listing
    store.upsert_device(device("first", Some("t"))).await.unwrap();
    let devices = store.list_devices(None).await.unwrap();
    assert_eq!(devices[0].id, "second");
    assert_eq!(devices[1].id, "first");
}

pub async fn limits_are_applied(store: &dyn Store) {
    for i in 0..12 {
        store.create_update_note(note(&format!("note {i}"))).await.unwrap();
    }
    let capped = store.list_update_notes(Some(10)).await.unwrap();
    assert_eq!(capped.len(), 10);
    assert_eq!(capped[0].title, "note 11");

    assert_eq!(store.list_update_notes(None).await.unwrap().len(), 12);
    assert_eq!(store.count(Collection::UpdateNotes).await.unwrap(), 12);
}

pub async fn photo_ids_are_distinct(store: &dyn Store) {
    let a = store.create_photo(photo("a")).await.unwrap();
    let b = store.create_photo(photo("b")).await.unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.id.as_str(), "k1");
    assert_eq!(b.id.as_str(), "k2");
}

pub async fn device_upsert_is_idempotent_per_id(store: &dyn Store) {
    let first = store.upsert_device(device("u1", Some("t1"))).await.unwrap();
    let second = store.upsert_device(device("u1", Some("t2"))).await.unwrap();

    assert_eq!(second.push_token, "t2");
    assert_eq!(second.username, first.username);
    assert_eq!(second.created_at, first.created_at);
    assert!(second.last_active >= first.last_active);
    assert_eq!(store.count(Collection::Devices).await.unwrap(), 1);

    store.upsert_device(device("u2", None)).await.unwrap();
    assert_eq!(store.count(Collection::Devices).await.unwrap(), 2);
}

pub async fn device_counts(store: &dyn Store) {
    store.upsert_device(device("u1", Some("t1"))).await.unwrap();
    store.upsert_device(device("u2", None)).await.unwrap();

    let now = Utc::now();
    assert_eq!(store.count_devices(DeviceFilter::All).await.unwrap(), 2);
    assert_eq!(store.count_devices(DeviceFilter::WithPushToken).await.unwrap(), 1);
    assert_eq!(store.count_devices(DeviceFilter::active_at(now)).await.unwrap(), 2);
    assert_eq!(
        store
            .count_devices(DeviceFilter::ActiveSince(now + chrono::Duration::minutes(1)))
            .await
            .unwrap(),
        0
    );
}

pub async fn settings_default_then_patch(store: &dyn Store) {
    let settings = store.get_settings().await.unwrap();
    assert_eq!(settings, rehber_core::AppSettings::default());

    let updated = store
        .update_settings(SettingsPatch::status(
            Some("maintenance".into()),
            Some("Sunucu bakımda".into()),
        ))
        .await
        .unwrap();
    assert!(updated.is_maintenance());

    let updated = store
        .update_settings(SettingsPatch::version(Some("1.4.0".into()), None))
        .await
        .unwrap();
    assert!(updated.is_maintenance());
    assert_eq!(updated.min_version, "1.4.0");

    assert_eq!(store.get_settings().await.unwrap(), updated);
}

pub async fn usage_events_are_appended(store: &dyn Store) {
    let event = UsageEvent {
        user_id: Some("u1".into()),
        action: Some("app_open".into()),
        timestamp: None,
        app_version: Some("1.0.0".into()),
        platform: Some("ios".into()),
        received_at: Utc::now(),
    };
    store.record_usage(event.clone()).await.unwrap();
    store.record_usage(event).await.unwrap();
    assert_eq!(store.count(Collection::UsageEvents).await.unwrap(), 2);
}

pub async fn bootstrap_seeds_once(store: &dyn Store) {
    bootstrap(store).await.unwrap();
    bootstrap(store).await.unwrap();

    assert_eq!(store.count(Collection::UpdateNotes).await.unwrap(), 1);
    let photos = store.list_photos(None).await.unwrap();
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].id.as_str(), "k1");

    let next = store.create_photo(photo("next")).await.unwrap();
    assert_eq!(next.id.as_str(), "k2");
}
