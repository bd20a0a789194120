//! Integration tests for the `gtfsmerge` binary's merge operation.
#![allow(clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Path to the compiled `gtfsmerge` binary.
fn gtfsmerge_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("gtfsmerge");
    path
}

/// Writes a minimal but complete GTFS feed directory under `dir`, with the
/// given agency id so tests can set up a collision or a distinct feed.
fn write_minimal_feed(dir: &Path, agency_id: &str) {
    fs::write(dir.join("agency.txt"), format!("agency_id,agency_name,agency_url,agency_timezone\n{agency_id},Test Agency,https://example.com,UTC\n")).expect("write agency.txt");
    fs::write(dir.join("stops.txt"), "stop_id,stop_name,stop_lat,stop_lon\ns1,Main St,47.0,-122.0\n").expect("write stops.txt");
    fs::write(
        dir.join("routes.txt"),
        format!("route_id,agency_id,route_short_name,route_type\nr1,{agency_id},1,3\n"),
    )
    .expect("write routes.txt");
    fs::write(dir.join("trips.txt"), "route_id,service_id,trip_id\nr1,wkdy,t1\n").expect("write trips.txt");
    fs::write(
        dir.join("stop_times.txt"),
        "trip_id,arrival_time,departure_time,stop_id,stop_sequence\nt1,08:00:00,08:00:00,s1,1\n",
    )
    .expect("write stop_times.txt");
    fs::write(
        dir.join("calendar.txt"),
        "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\nwkdy,1,1,1,1,1,0,0,20260101,20261231\n",
    )
    .expect("write calendar.txt");
}

#[test]
fn merge_two_feeds_exits_0_and_writes_output_zip() {
    let tmp = TempDir::new().expect("tempdir");
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    fs::create_dir_all(&a).expect("mkdir a");
    fs::create_dir_all(&b).expect("mkdir b");
    write_minimal_feed(&a, "agency-a");
    write_minimal_feed(&b, "agency-b");

    let out = tmp.path().join("merged.zip");
    let status = Command::new(gtfsmerge_bin())
        .args([a.to_str().expect("path"), b.to_str().expect("path"), out.to_str().expect("path")])
        .status()
        .expect("run gtfsmerge");

    assert!(status.success(), "expected exit 0, got {status:?}");
    assert!(out.exists(), "output zip should be written");
}

#[test]
fn missing_required_file_exits_nonzero() {
    let tmp = TempDir::new().expect("tempdir");
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    fs::create_dir_all(&a).expect("mkdir a");
    fs::create_dir_all(&b).expect("mkdir b");
    write_minimal_feed(&a, "agency-a");
    write_minimal_feed(&b, "agency-b");
    fs::remove_file(a.join("stops.txt")).expect("remove stops.txt");

    let out = tmp.path().join("merged.zip");
    let output = Command::new(gtfsmerge_bin())
        .args([a.to_str().expect("path"), b.to_str().expect("path"), out.to_str().expect("path")])
        .output()
        .expect("run gtfsmerge");

    assert!(!output.status.success(), "expected non-zero exit");
    assert!(!String::from_utf8_lossy(&output.stderr).is_empty(), "expected an error message on stderr");
}

#[test]
fn fewer_than_two_inputs_exits_nonzero() {
    let tmp = TempDir::new().expect("tempdir");
    let a = tmp.path().join("a");
    fs::create_dir_all(&a).expect("mkdir a");
    write_minimal_feed(&a, "agency-a");

    let out = tmp.path().join("merged.zip");
    let output = Command::new(gtfsmerge_bin())
        .args([a.to_str().expect("path"), out.to_str().expect("path")])
        .output()
        .expect("run gtfsmerge");

    assert!(!output.status.success(), "clap should reject fewer than two inputs");
}

#[test]
fn file_scoped_detection_override_is_accepted() {
    let tmp = TempDir::new().expect("tempdir");
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    fs::create_dir_all(&a).expect("mkdir a");
    fs::create_dir_all(&b).expect("mkdir b");
    write_minimal_feed(&a, "agency-shared");
    write_minimal_feed(&b, "agency-shared");

    let out = tmp.path().join("merged.zip");
    let status = Command::new(gtfsmerge_bin())
        .args([
            "--file",
            "agency.txt:identity",
            a.to_str().expect("path"),
            b.to_str().expect("path"),
            out.to_str().expect("path"),
        ])
        .status()
        .expect("run gtfsmerge");

    assert!(status.success(), "expected exit 0, got {status:?}");
}
