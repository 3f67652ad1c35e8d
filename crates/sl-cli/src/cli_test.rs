use super::*;
use clap::error::ErrorKind;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    Cli::command().debug_assert();
}

#[test]
fn test_backfill_positionals() {
    let cli = Cli::try_parse_from(["sluice", "backfill", "2023-01", "2023-02", "FNCLOG", "AINVOICES"])
        .unwrap();
    match cli.command {
        Commands::Backfill(args) => {
            assert_eq!(args.start, "2023-01");
            assert_eq!(args.end, "2023-02");
            assert_eq!(args.entities, vec!["FNCLOG", "AINVOICES"]);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_backfill_requires_both_months() {
    let err = Cli::try_parse_from(["sluice", "backfill", "2023-01"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    assert!(err.use_stderr());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "sluice", "model", "--keep", "-p", "/srv/erp", "--user", "api", "--password", "secret",
    ])
    .unwrap();
    assert_eq!(cli.global.project_dir, "/srv/erp");
    assert_eq!(cli.global.user.as_deref(), Some("api"));
    assert!(matches!(cli.command, Commands::Model(ModelArgs { keep: true, .. })));
}

#[test]
fn test_keep_conflicts_with_generator() {
    assert!(Cli::try_parse_from(["sluice", "model", "--keep", "--generator", "gen"]).is_err());
}
