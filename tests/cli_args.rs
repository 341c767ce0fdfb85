use clap::Parser;
use querydag::cli::{CliArgs, LogLevel};
use querydag::logging::log_filter;

#[test]
fn defaults_apply_when_only_query_is_given() {
    let args = CliArgs::try_parse_from(["querydag", "--query", "what is a dag"]).unwrap();

    assert_eq!(args.query, "what is a dag");
    assert_eq!(args.config, "QueryDag.toml");
    assert!(args.tasks.is_none());
    assert!(!args.dry_run);
    assert!(!args.no_snapshots);
    assert!(args.log_level.is_none());
}

#[test]
fn all_flags_parse() {
    let args = CliArgs::try_parse_from([
        "querydag",
        "-q",
        "q",
        "--tasks",
        "tasks.json",
        "--config",
        "demos/QueryDag.toml",
        "--dry-run",
        "--no-snapshots",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(args.tasks.unwrap().to_str(), Some("tasks.json"));
    assert!(args.dry_run);
    assert!(args.no_snapshots);
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
}

#[test]
fn query_is_required() {
    assert!(CliArgs::try_parse_from(["querydag", "--dry-run"]).is_err());
}

#[test]
fn log_level_maps_to_filter_directive() {
    assert_eq!(LogLevel::Warn.as_filter(), "warn");
    assert_eq!(LogLevel::Trace.as_filter(), "trace");

    // An explicit level always yields a usable filter.
    let _ = log_filter(Some(LogLevel::Debug));
}
