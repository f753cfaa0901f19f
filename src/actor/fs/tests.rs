use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::debouncer::{DEBOUNCE_MS, Debouncer};
use crate::actor::messages::ChangeKind;

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

#[test]
fn test_debouncer_empty() {
    let mut debouncer = Debouncer::new();
    assert!(!debouncer.is_ready());
    assert!(debouncer.take_if_ready().is_none());
}

#[test]
fn test_event_kinds() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/site/a.md"], create_kind()));
    debouncer.add_event(&make_event(vec!["/site/b.md"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/site/c.md"], remove_kind()));

    assert_eq!(debouncer.changes[&PathBuf::from("/site/a.md")], ChangeKind::Created);
    assert_eq!(debouncer.changes[&PathBuf::from("/site/b.md")], ChangeKind::Modified);
    assert_eq!(debouncer.changes[&PathBuf::from("/site/c.md")], ChangeKind::Removed);
}

#[test]
fn test_rename_is_remove_plus_create() {
    use notify::event::{ModifyKind, RenameMode};
    let rename = |mode| notify::EventKind::Modify(ModifyKind::Name(mode));

    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/site/a.md"], rename(RenameMode::From)));
    debouncer.add_event(&make_event(vec!["/site/b.md"], rename(RenameMode::To)));
    debouncer.add_event(&make_event(
        vec!["/site/c.md", "/site/d.md"],
        rename(RenameMode::Both),
    ));

    assert_eq!(debouncer.changes[&PathBuf::from("/site/a.md")], ChangeKind::Removed);
    assert_eq!(debouncer.changes[&PathBuf::from("/site/b.md")], ChangeKind::Created);
    assert_eq!(debouncer.changes[&PathBuf::from("/site/c.md")], ChangeKind::Removed);
    assert_eq!(debouncer.changes[&PathBuf::from("/site/d.md")], ChangeKind::Created);

    // Undirected rename of a path that is gone
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/definitely/not/here.md"], rename(RenameMode::Any)));
    assert_eq!(
        debouncer.changes[&PathBuf::from("/definitely/not/here.md")],
        ChangeKind::Removed
    );
}

#[test]
fn test_metadata_and_temp_files_ignored() {
    let mut debouncer = Debouncer::new();
    let metadata = notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ));
    debouncer.add_event(&make_event(vec!["/site/a.md"], metadata));
    debouncer.add_event(&make_event(
        vec!["/site/.a.md.swp", "/site/a.md~", "/site/a.md.bak"],
        modify_kind(),
    ));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_dedup_per_path() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/site/a.md", "/site/a.md"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/site/a.md"], modify_kind()));
    assert_eq!(debouncer.changes.len(), 1);
}

#[test]
fn test_transitions() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/site/restored.md"], remove_kind()));
    debouncer.add_event(&make_event(vec!["/site/restored.md"], create_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/site/restored.md")], ChangeKind::Created);

    debouncer.add_event(&make_event(vec!["/site/deleted.md"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/site/deleted.md"], remove_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/site/deleted.md")], ChangeKind::Removed);

    debouncer.add_event(&make_event(vec!["/site/flash.md"], create_kind()));
    debouncer.add_event(&make_event(vec!["/site/flash.md"], remove_kind()));
    assert!(!debouncer.changes.contains_key(&PathBuf::from("/site/flash.md")));

    debouncer.add_event(&make_event(vec!["/site/new.md"], create_kind()));
    debouncer.add_event(&make_event(vec!["/site/new.md"], modify_kind()));
    assert_eq!(debouncer.changes[&PathBuf::from("/site/new.md")], ChangeKind::Created);
}

#[test]
fn test_quiet_window() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/site/b.md", "/site/a.md"], modify_kind()));
    assert!(!debouncer.is_ready());

    let dur = debouncer.sleep_duration();
    assert!(dur <= Duration::from_millis(DEBOUNCE_MS));
    assert!(dur >= Duration::from_millis(DEBOUNCE_MS - 50));

    debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 1));
    let batch = debouncer.take_if_ready().unwrap();
    assert_eq!(
        batch,
        vec![
            (PathBuf::from("/site/a.md"), ChangeKind::Modified),
            (PathBuf::from("/site/b.md"), ChangeKind::Modified),
        ]
    );
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
}
