use std::fs;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use energymon::metrics::aggregate::historical_total;
use energymon::metrics::series::RollingSeries;
use energymon::metrics::TimeUnit;
use energymon::session::SessionLog;
use energymon::Error;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("energymon-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn at(stamp: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S%.3f").unwrap()
}

#[test]
fn saved_series_loads_back_without_padding() {
    let dir = scratch_dir("roundtrip");
    let log = SessionLog::open(&dir).unwrap();
    assert!(dir.is_dir());

    let mut series = RollingSeries::new(6);
    for v in [0.001667, 0.0, 0.00125] {
        series.append(v);
    }
    let path = log
        .save_at(&series.snapshot(), at("2026-10-14 09:15:00.250"))
        .unwrap()
        .unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "session_20261014-091500-250.txt"
    );

    let records = log.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].samples, vec![0.001667, 0.0, 0.00125]);
    assert_eq!(records[0].created, Some(at("2026-10-14 09:15:00.250")));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn all_zero_session_writes_nothing() {
    let dir = scratch_dir("empty");
    let log = SessionLog::open(&dir).unwrap();

    let series = RollingSeries::new(10);
    assert_eq!(log.save(&series.snapshot()).unwrap(), None);
    assert!(log.load_all().unwrap().is_empty());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn same_timestamp_gets_a_distinct_file() {
    let dir = scratch_dir("collision");
    let log = SessionLog::open(&dir).unwrap();
    let ended = at("2026-10-14 12:00:00.000");

    let first = log.save_at(&[1.0], ended).unwrap().unwrap();
    let second = log.save_at(&[2.0], ended).unwrap().unwrap();
    assert_ne!(first, second);
    assert_eq!(fs::read_to_string(&first).unwrap(), "1\n");

    let records = log.load_all().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.created == Some(ended)));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unreadable_history_is_skipped() {
    let dir = scratch_dir("corrupt");
    let log = SessionLog::open(&dir).unwrap();

    log.save_at(&[0.5, 0.25], at("2026-10-13 08:00:00.000")).unwrap();
    fs::write(dir.join("session_20261013-090000-000.txt"), "0.5\nnot a number\n").unwrap();
    fs::write(dir.join("notes.txt"), "42\n").unwrap();
    fs::create_dir(dir.join("session_dir.txt")).unwrap();

    let records = log.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].samples, vec![0.5, 0.25]);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn historical_total_sums_every_session() {
    let dir = scratch_dir("history");
    let log = SessionLog::open(&dir).unwrap();

    log.save_at(&[5.0, 4.0, 5.0], at("2026-10-12 10:00:00.000")).unwrap();
    log.save_at(&[0.0, 1.0, 5.0], at("2026-10-13 10:00:00.000")).unwrap();

    let records = log.load_all().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].created, Some(at("2026-10-12 10:00:00.000")));

    let same_units = historical_total(&records, TimeUnit::Minutes, TimeUnit::Minutes);
    assert_eq!(same_units, 20.0);

    let hourly = historical_total(&records, TimeUnit::Minutes, TimeUnit::Hours);
    assert!((hourly - 20.0 / 60.0).abs() < 1e-12);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn nested_storage_directory_is_created() {
    let dir = scratch_dir("nested");
    let nested = dir.join("a").join("sessions");
    let log = SessionLog::open(&nested).unwrap();
    assert_eq!(log.dir(), nested.as_path());
    assert!(nested.is_dir());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn failed_save_is_an_error() {
    let dir = scratch_dir("vanished");
    let log = SessionLog::open(&dir).unwrap();
    fs::remove_dir_all(&dir).unwrap();

    let result = log.save_at(&[0.0, 1.0], at("2026-10-14 18:00:00.000"));
    match result {
        Err(Error::Storage { path, .. }) => {
            assert!(path.starts_with(&dir), "{}", path.display());
        }
        other => panic!("expected a storage error, got {other:?}"),
    }
}
