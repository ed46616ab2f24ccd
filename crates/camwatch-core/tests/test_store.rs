mod common;

use std::fs;

use camwatch_core::store::{FrameState, FrameStore};
use chrono::Duration;
use common::{at, list, AnnotateMode, RecordingAnnotator};

fn open_store(dir: &tempfile::TempDir) -> FrameStore {
    FrameStore::open("alley", dir.path().join("work"), dir.path().join("save")).unwrap()
}

#[test]
fn test_open_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    assert!(store.work_dir().is_dir());
    assert!(store.save_dir().is_dir());
}

#[test]
fn test_frame_name_has_millisecond_stamp() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let t = at(8, 5, 9) + Duration::milliseconds(42);
    assert_eq!(store.frame_name(t), "alley-20240601-080509_042.jpg");
}

#[test]
fn test_candidate_is_written_to_work_dir() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let record = store.write_candidate(b"jpeg", at(12, 0, 0)).unwrap();
    assert_eq!(record.state, FrameState::Candidate);
    assert_eq!(record.path.parent().unwrap(), store.work_dir());
    assert_eq!(record.stem(), "alley-20240601-120000_000");
    assert_eq!(fs::read(&record.path).unwrap(), b"jpeg");
}

#[test]
fn test_promote_annotates_into_save_dir() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let annotator = RecordingAnnotator::default();
    let record = store.write_candidate(b"jpeg", at(12, 0, 0)).unwrap();
    let source = record.path.clone();

    let promoted = store.promote(record, &annotator).unwrap();
    assert_eq!(promoted.state, FrameState::Promoted);
    assert_eq!(promoted.path, store.save_dir().join("alley-20240601-120000_000.jpg"));
    assert_eq!(fs::read(&promoted.path).unwrap(), b"jpeg annotated");
    assert!(!source.exists());
    assert_eq!(annotator.written.borrow().len(), 1);
}

#[test]
fn test_promote_keeps_raw_frame_when_overlay_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let annotator = RecordingAnnotator::with_mode(AnnotateMode::Fail);
    let record = store.write_candidate(b"jpeg", at(12, 0, 0)).unwrap();

    let promoted = store.promote(record, &annotator).unwrap();
    assert_eq!(fs::read(&promoted.path).unwrap(), b"jpeg");
    assert!(list(store.work_dir()).is_empty());
}

#[test]
fn test_promote_keeps_partial_overlay_output() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let annotator = RecordingAnnotator::with_mode(AnnotateMode::WriteThenFail);
    let record = store.write_candidate(b"jpeg", at(12, 0, 0)).unwrap();

    let promoted = store.promote(record, &annotator).unwrap();
    assert_eq!(fs::read(&promoted.path).unwrap(), b"jpeg annotated");
    assert!(list(store.work_dir()).is_empty());
}

#[test]
fn test_discard_removes_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let record = store.write_candidate(b"jpeg", at(12, 0, 0)).unwrap();
    let path = record.path.clone();

    let discarded = store.discard(record).unwrap();
    assert_eq!(discarded.state, FrameState::Discarded);
    assert!(!path.exists());
    assert!(list(store.save_dir()).is_empty());

    // Already gone is fine.
    store.discard(discarded).unwrap();
}
