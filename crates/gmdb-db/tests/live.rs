//! Live integration tests for gmdb-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. They need `DATABASE_URL` pointing at a server the test
//! user may create databases on, so they are ignored by default:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test -p gmdb-db -- --ignored
//! ```

use chrono::{NaiveDate, Utc};
use gmdb_core::{
    BulletinWindow, Collection, HardwareSale, Metascore, ScoreRecord, SoftwareSale, Store,
    WindowKey,
};
use gmdb_db::PgStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn window(link: &str, start: NaiveDate, end: NaiveDate) -> BulletinWindow {
    BulletinWindow {
        link: link.to_string(),
        start_date: start,
        end_date: end,
        software_sales: vec![SoftwareSale {
            platform: "NSW".to_string(),
            title: "Animal Crossing".to_string(),
            publisher: Some("Nintendo".to_string()),
            release_date: Some(date(2020, 3, 20)),
            weekly_units: Some(1_065_000),
            lifetime_units: Some(1_065_000),
        }],
        hardware_sales: vec![HardwareSale {
            platform: "Switch".to_string(),
            weekly_units: Some(392_576),
            lifetime_units: Some(15_347_128),
        }],
        ingested_at: Utc::now(),
    }
}

fn score(title: &str, value: Metascore) -> ScoreRecord {
    ScoreRecord {
        title: title.to_string(),
        release_date: Some(date(2024, 3, 1)),
        content_rating: "T".to_string(),
        score: value,
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn window_round_trips_through_dedup_lookup(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    let stored = window("/a", date(2024, 1, 1), date(2024, 1, 7));
    store.insert_window(&stored).await.expect("insert");

    let key = WindowKey::new("/a", date(2024, 1, 1), date(2024, 1, 7)).expect("key");
    let found = store
        .find_window(&key)
        .await
        .expect("lookup")
        .expect("window present");
    assert_eq!(found.software_sales, stored.software_sales);
    assert_eq!(found.hardware_sales, stored.hardware_sales);

    let other = WindowKey::new("/a", date(2024, 1, 1), date(2024, 1, 8)).expect("key");
    assert!(store.find_window(&other).await.expect("lookup").is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn duplicate_window_insert_is_rejected(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    let stored = window("/a", date(2024, 1, 1), date(2024, 1, 7));
    store.insert_window(&stored).await.expect("first insert");
    assert!(store.insert_window(&stored).await.is_err());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn windows_ending_since_filters_and_orders(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    for (link, start, end) in [
        ("/old", date(2023, 12, 25), date(2023, 12, 31)),
        ("/mid", date(2024, 1, 1), date(2024, 1, 7)),
        ("/new", date(2024, 1, 8), date(2024, 1, 14)),
    ] {
        store
            .insert_window(&window(link, start, end))
            .await
            .expect("insert");
    }

    let recent = store
        .windows_ending_since(date(2024, 1, 1))
        .await
        .expect("list");
    let links: Vec<&str> = recent.iter().map(|w| w.link.as_str()).collect();
    assert_eq!(links, vec!["/new", "/mid"]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn upsert_score_keeps_one_row_per_title(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    store
        .upsert_score(&score("Foo", Metascore::Scored(80)))
        .await
        .expect("first upsert");
    store
        .upsert_score(&score("Foo", Metascore::NotAvailable))
        .await
        .expect("second upsert");

    let all = store.all_scores().await.expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].score, Metascore::NotAvailable);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn delete_all_clears_only_the_named_collection(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    store
        .insert_window(&window("/a", date(2024, 1, 1), date(2024, 1, 7)))
        .await
        .expect("insert");
    store
        .upsert_score(&score("Foo", Metascore::Scored(85)))
        .await
        .expect("upsert");

    assert_eq!(store.delete_all(Collection::Scores).await.expect("delete"), 1);
    assert!(store.all_scores().await.expect("list").is_empty());
    assert_eq!(
        store
            .windows_ending_since(date(2000, 1, 1))
            .await
            .expect("list")
            .len(),
        1
    );
}
