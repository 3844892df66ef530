//! Integration tests for the duplicate scan.
//!
//! These tests verify grouping by identity key, the delete script, and
//! the task lifecycle against real directory trees.

use assert_fs::prelude::*;
use file_zen::core::grouping::KeepPolicy;
use file_zen::core::pipeline::{ScanConfig, ScanPipeline, Task, TaskReport, TaskState};
use file_zen::events::{Event, EventChannel, Outcome};
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;

fn config(root: &Path) -> ScanConfig {
    ScanConfig {
        root: Some(root.to_path_buf()),
        recurse: true,
        use_checksum: true,
        ..Default::default()
    }
}

#[test]
fn two_of_three_files_form_one_set() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.jpg").write_str("X").unwrap();
    temp.child("deep/dir/b.jpg").write_str("X").unwrap();
    temp.child("c.jpg").write_str("Y").unwrap();

    let report = ScanPipeline::new(config(temp.path())).run().unwrap();

    assert_eq!(report.sets.len(), 1);
    let names: Vec<_> = report.sets[0]
        .ids
        .iter()
        .map(|id| report.catalog.get(id).unwrap().name.clone())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"a.jpg".to_string()));
    assert!(names.contains(&"b.jpg".to_string()));
}

#[test]
fn name_and_size_criteria_combine() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("one/report.txt").write_str("12345").unwrap();
    temp.child("two/report.txt").write_str("abcde").unwrap();
    temp.child("three/report.txt").write_str("longer text").unwrap();

    let report = ScanPipeline::new(ScanConfig {
        use_checksum: false,
        use_file_name: true,
        use_file_size: true,
        ..config(temp.path())
    })
    .run()
    .unwrap();

    assert_eq!(report.sets.len(), 1);
    assert_eq!(report.sets[0].len(), 2);
}

#[test]
fn non_recursive_scan_ignores_subdirectories() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("a.txt").write_str("same").unwrap();
    temp.child("sub/b.txt").write_str("same").unwrap();

    let report = ScanPipeline::new(ScanConfig {
        recurse: false,
        ..config(temp.path())
    })
    .run()
    .unwrap();

    assert_eq!(report.catalog.len(), 1);
    assert!(report.sets.is_empty());
}

#[test]
fn delete_script_keeps_newest_when_asked() {
    let temp = assert_fs::TempDir::new().unwrap();
    let older = temp.child("older.txt");
    older.write_str("dup").unwrap();
    std::thread::sleep(std::time::Duration::from_millis(20));
    let newer = temp.child("newer.txt");
    newer.write_str("dup").unwrap();

    let report = ScanPipeline::new(ScanConfig {
        create_delete_script: true,
        delete_files: true,
        keep: KeepPolicy::Newest,
        ..config(temp.path())
    })
    .run()
    .unwrap();

    let script = report.delete_script.unwrap();
    let removal = format!("rm -- '{}'", older.path().display());
    assert!(script.lines().any(|line| line == removal));
    assert!(predicate::str::contains(format!("# keep '{}'", newer.path().display()))
        .eval(&script));

    // Writing the script never touches the files
    older.assert(predicate::path::exists());
    newer.assert(predicate::path::exists());
}

#[test]
fn task_streams_records_and_completes() {
    let temp = assert_fs::TempDir::new().unwrap();
    for i in 0..10 {
        temp.child(format!("f{}.bin", i))
            .write_str(if i % 2 == 0 { "even" } else { "odd" })
            .unwrap();
    }

    let (sender, receiver) = EventChannel::new();
    let mut task = Task::scan(config(temp.path())).unwrap();
    assert!(task.start(sender));
    let report = task.wait().unwrap();
    let events: Vec<Event> = receiver.iter().collect();

    assert_eq!(task.state(), TaskState::Completed);
    assert_eq!(task.processed(), 10);

    let processed = events
        .iter()
        .filter(|e| matches!(e, Event::FileProcessed(_)))
        .count();
    let catalogued = events
        .iter()
        .filter(|e| matches!(e, Event::Status(s) if s.outcome == Outcome::Catalogued))
        .count();
    assert_eq!(processed, 10);
    assert_eq!(catalogued, 10);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::DuplicateFound { count: 5, .. })));

    match report {
        TaskReport::Scan(report) => assert_eq!(report.sets.len(), 2),
        TaskReport::Organize(_) => panic!("Wrong report type"),
    }
}

#[test]
fn cancelled_task_ends_cancelled_or_completed() {
    let temp = assert_fs::TempDir::new().unwrap();
    for i in 0..200 {
        temp.child(format!("f{:03}.txt", i)).write_str("x").unwrap();
    }

    let (sender, receiver) = EventChannel::new();
    let mut task = Task::scan(ScanConfig {
        fingerprint_batch: 1,
        ..config(temp.path())
    })
    .unwrap();

    assert!(task.start(sender));
    task.cancel();
    let report = task.wait().unwrap();
    let last = receiver.iter().last();

    if report.cancelled() {
        assert_eq!(task.state(), TaskState::Cancelled);
        assert!(matches!(last, Some(Event::Cancelled(_))));
    } else {
        // The run finished before the flag was seen
        assert_eq!(task.state(), TaskState::Completed);
        assert!(matches!(last, Some(Event::Completed(_))));
    }
}

#[cfg(unix)]
#[test]
fn script_never_runs_commands_hidden_in_file_names() {
    let temp = assert_fs::TempDir::new().unwrap();
    let root = temp.child("root");
    root.child("a.txt").write_str("same").unwrap();
    let hostile = root.child("sub/b\ntouch INJECTED\n.txt");
    hostile.write_str("same").unwrap();

    for live in [false, true] {
        let report = ScanPipeline::new(ScanConfig {
            create_delete_script: true,
            delete_files: live,
            ..config(root.path())
        })
        .run()
        .unwrap();
        assert_eq!(report.sets.len(), 1);

        let script = temp.child("dupes.sh");
        script.write_str(report.delete_script.as_deref().unwrap()).unwrap();
        let status = Command::new("sh")
            .arg(script.path())
            .current_dir(temp.path())
            .status()
            .unwrap();

        assert!(status.success());
        temp.child("INJECTED").assert(predicate::path::missing());
        root.child("a.txt").assert(predicate::path::exists());
        hostile.assert(predicate::path::exists());
    }
}
