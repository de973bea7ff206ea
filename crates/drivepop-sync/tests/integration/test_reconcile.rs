//! Enumeration of unmanaged remote items

use std::collections::HashSet;

use drivepop_sync::reconcile::Reconciler;
use tempfile::TempDir;

use crate::common::{self, Call, FakeDrive, ROOT};

#[tokio::test]
async fn test_reports_unindexed_child_and_duplicate_root() {
    let dir = TempDir::new().unwrap();
    common::write_tree(dir.path(), &[("x.txt", b"x")]);
    let drive = FakeDrive::new();
    let base = drive.seed_folder(ROOT, "Backups");
    drive.seed_file(&base, "x.txt", b"x");
    let y = drive.seed_file(&base, "y.txt", b"y");
    let duplicate = drive.seed_folder(ROOT, "Backups");

    let mut engine = common::engine(&drive, &common::config(dir.path()));
    engine.populate().await.unwrap();

    let reconciler = Reconciler::new(drive.clone(), "Backups");
    let items = reconciler
        .unmanaged(engine.index())
        .collect_all()
        .await
        .unwrap();

    let found: HashSet<_> = items
        .iter()
        .map(|i| (i.id.to_string(), i.path.clone()))
        .collect();
    let expected: HashSet<_> = [
        (y, "Backups/y.txt".to_string()),
        (duplicate, "Backups".to_string()),
    ]
    .into_iter()
    .collect();
    assert_eq!(found, expected);
}

#[tokio::test]
async fn test_unmanaged_folders_are_not_descended() {
    let dir = TempDir::new().unwrap();
    let drive = FakeDrive::new();
    let base = drive.seed_folder(ROOT, "Backups");
    let old = drive.seed_folder(&base, "old");
    drive.seed_file(&old, "z.txt", b"z");
    let duplicate = drive.seed_folder(ROOT, "Backups");
    drive.seed_file(&duplicate, "w.txt", b"w");

    let mut engine = common::engine(&drive, &common::config(dir.path()));
    engine.populate().await.unwrap();
    drive.clear_calls();

    let items = Reconciler::new(drive.clone(), "Backups")
        .unmanaged(engine.index())
        .collect_all()
        .await
        .unwrap();

    let ids: HashSet<_> = items.iter().map(|i| i.id.to_string()).collect();
    assert_eq!(ids, HashSet::from([old.clone(), duplicate.clone()]));
    assert!(items.iter().all(|i| i.is_folder));

    let listed: Vec<_> = drive
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::ListChildren { parent, .. } => Some(parent),
            _ => None,
        })
        .collect();
    assert!(!listed.contains(&old));
    assert!(!listed.contains(&duplicate));
}

#[tokio::test]
async fn test_listings_follow_every_page() {
    let dir = TempDir::new().unwrap();
    let drive = FakeDrive::with_page_size(2);
    let base = drive.seed_folder(ROOT, "Backups");
    for i in 0..5 {
        drive.seed_file(&base, &format!("stale{i}.txt"), b"s");
    }

    let mut engine = common::engine(&drive, &common::config(dir.path()));
    engine.populate().await.unwrap();
    drive.clear_calls();

    let items = Reconciler::new(drive.clone(), "Backups")
        .unmanaged(engine.index())
        .collect_all()
        .await
        .unwrap();

    assert_eq!(items.len(), 5);
    let base_listings = drive
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::ListChildren { parent, .. } if *parent == base))
        .count();
    assert_eq!(base_listings, 3);
}

#[tokio::test]
async fn test_nested_unmanaged_paths_and_no_mutations() {
    let dir = TempDir::new().unwrap();
    common::write_tree(dir.path(), &[("docs/a.txt", b"a")]);
    let drive = FakeDrive::new();

    let mut engine = common::engine(&drive, &common::config(dir.path()));
    engine.populate().await.unwrap();
    let base = drive.ids_named(ROOT, "Backups")[0].clone();
    let docs = drive.ids_named(&base, "docs")[0].clone();
    let stale = drive.seed_file(&docs, "stale.txt", b"s");
    drive.clear_calls();

    let reconciler = Reconciler::new(drive.clone(), "Backups");
    let mut cursor = reconciler.unmanaged(engine.index());
    let item = cursor.next().await.unwrap().unwrap();
    assert_eq!(item.id.to_string(), stale);
    assert_eq!(item.path, "Backups/docs/stale.txt");
    assert!(cursor.next().await.unwrap().is_none());

    assert!(drive.mutations().is_empty());
}

#[tokio::test]
async fn test_enumeration_is_restartable() {
    let dir = TempDir::new().unwrap();
    let drive = FakeDrive::new();
    let base = drive.seed_folder(ROOT, "Backups");
    drive.seed_file(&base, "y.txt", b"y");

    let mut engine = common::engine(&drive, &common::config(dir.path()));
    engine.populate().await.unwrap();

    let reconciler = Reconciler::new(drive.clone(), "Backups");
    let first = reconciler.unmanaged(engine.index()).collect_all().await.unwrap();
    let second = reconciler.unmanaged(engine.index()).collect_all().await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
}
