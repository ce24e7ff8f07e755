/// Trace ingestion integration tests: file round-trips and trace-to-engine
/// plumbing. Format-level parsing is covered by the unit tests in
/// `flashsim_core::trace`.
use flashsim_core::config::SimConfig;
use flashsim_core::trace::{gen_trace, infer_user_count, load_trace_csv, write_trace_csv};
use flashsim_schedulers::scheduler_by_name;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("flashsim_{}_{}", std::process::id(), name))
}

#[test]
fn test_write_then_load_round_trip() {
    let path = temp_path("roundtrip.csv");
    let generated = gen_trace(4, 250, 42);
    write_trace_csv(&generated, &path).unwrap();

    let loaded = load_trace_csv(&path).unwrap();
    std::fs::remove_file(&path).ok();

    // Timestamps are integral microseconds, so the round trip is exact.
    assert_eq!(generated, loaded);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_trace_csv(&temp_path("does_not_exist.csv")).unwrap_err();
    assert!(matches!(err, flashsim_core::trace::TraceError::Io(_)));
}

#[test]
fn test_loaded_trace_drives_simulation() {
    let path = temp_path("e2e.csv");
    std::fs::write(
        &path,
        "\
timestamp,process_id,type,address,size
0,alpha,read,0,1048576
0,beta,read,4096,1048576
",
    )
    .unwrap();

    let trace = load_trace_csv(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(infer_user_count(&trace), 2);

    let config = SimConfig::from_str(
        r#"
[device]
channels = 1
read_bw_mbps = 1.0
write_bw_mbps = 1.0
"#,
    )
    .unwrap();
    let sched = scheduler_by_name("rr", 200, 1).unwrap();
    let stats = flashsim_core::run_simulation(&config, sched, trace).unwrap();

    assert_eq!(stats.completed(0), 1);
    assert_eq!(stats.completed(1), 1);
    assert_eq!(stats.avg_latency(0), 1.0);
    assert_eq!(stats.avg_latency(1), 2.0);
    assert_eq!(stats.fairness_index(), 1.0);
}

#[test]
fn test_mixed_formats_reject_midstream_garbage() {
    let path = temp_path("garbage.csv");
    std::fs::write(&path, "0,alpha,read,0,4096\nnot,a,trace\n").unwrap();
    let result = load_trace_csv(&path);
    std::fs::remove_file(&path).ok();
    assert!(result.is_err());
}

#[test]
fn test_gen_trace_spreads_tenants() {
    let trace = gen_trace(4, 1000, 7);
    assert_eq!(infer_user_count(&trace), 4);
    for uid in 0..4 {
        let count = trace.iter().filter(|r| r.user_id == uid).count();
        assert!(count > 100, "tenant {} got only {} requests", uid, count);
    }
}
