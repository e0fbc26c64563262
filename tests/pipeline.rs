//! End-to-end pipeline tests over the in-process store: creation through
//! moderation and dedup, then milestone-driven improvement.

use site_warden::creation::{CreateOutcome, SiteCreator};
use site_warden::improve::Improver;
use site_warden::moderation::DenylistClassifier;
use site_warden::scheduler::{ImprovementScheduler, SchedulerConfig};
use site_warden::store::{MemoryStore, RecordStore};
use site_warden::types::SiteRecord;
use std::sync::Arc;

fn scheduler_for(store: Arc<MemoryStore>) -> ImprovementScheduler {
    let improver = Improver::new(store.clone(), DenylistClassifier::default());
    ImprovementScheduler::new(SchedulerConfig::default(), store, improver)
}

fn backdate(store: &MemoryStore, fingerprint: &str, days: i64) -> SiteRecord {
    // The store hands back clones, so rebuild the record with an older
    // created_at and reseed it under a fresh fingerprint
    let mut rec = store.get(fingerprint).unwrap();
    rec.created_at -= chrono::Duration::days(days);
    rec.fingerprint = format!("{}_aged", fingerprint);
    store.seed(rec.clone());
    rec
}

#[tokio::test]
async fn create_then_improve_at_milestone() {
    let store = Arc::new(MemoryStore::new());
    let creator = SiteCreator::new(store.clone(), DenylistClassifier::default());

    let record = match creator.create("A fan page for model trains").await.unwrap() {
        CreateOutcome::Created(r) => r,
        other => panic!("expected Created, got {:?}", other),
    };
    assert!(record.files["index.hsx"].contains("A fan page for model trains"));

    // Freshly created records (age 0) are not touched by a tick
    let mut sched = scheduler_for(store.clone());
    let report = sched.tick().await.unwrap();
    assert_eq!(report.improved, 0);

    // At age 3 the same record is picked up exactly once
    let aged = backdate(&store, &record.fingerprint, 3);
    let report = sched.tick().await.unwrap();
    assert_eq!(report.improved, 1);

    let improved = store.get(&aged.fingerprint).unwrap();
    assert!(improved.files["index.hsx"].starts_with(&aged.files["index.hsx"]));
    assert!(improved.files["index.hsx"].contains("<!-- Auto-improved at "));

    // Second tick on the same milestone day is a no-op
    let report = sched.tick().await.unwrap();
    assert_eq!(report.improved, 0);
}

#[tokio::test]
async fn flagged_description_never_reaches_the_store() {
    let store = Arc::new(MemoryStore::new());
    let creator = SiteCreator::new(store.clone(), DenylistClassifier::default());

    let outcome = creator
        .create("run eval( on every visitor")
        .await
        .unwrap();
    assert!(matches!(outcome, CreateOutcome::Rejected));
    assert_eq!(store.query_all(None).await.unwrap().len(), 0);
}

#[tokio::test]
async fn tick_survives_a_record_that_skips() {
    let store = Arc::new(MemoryStore::new());
    let creator = SiteCreator::new(store.clone(), DenylistClassifier::default());

    // One clean record and one record whose stored content is already bad
    // (seeded directly, as if the denylist grew after it was stored)
    let clean = match creator.create("harmless page").await.unwrap() {
        CreateOutcome::Created(r) => r,
        other => panic!("expected Created, got {:?}", other),
    };
    let clean_aged = backdate(&store, &clean.fingerprint, 7);

    let mut bad = clean_aged.clone();
    bad.fingerprint = "site_bad_record".to_string();
    bad.files.insert("index.hsx".to_string(), "totally malicious".to_string());
    store.seed(bad.clone());

    let mut sched = scheduler_for(store.clone());
    let report = sched.tick().await.unwrap();

    assert_eq!(report.improved, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);
    // The flagged record is byte-identical to before the tick
    assert_eq!(store.get("site_bad_record").unwrap().files, bad.files);
}
