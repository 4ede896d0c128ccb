use clap::Parser;
use toolbox_notes::tooling::cli::{Cli, Commands};

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["toolbox-notes", "-s", "pics", "users"],
        vec!["toolbox-notes", "--subreddit", "pics", "notes", "bob", "--format", "json"],
        vec!["toolbox-notes", "-s", "pics", "all", "--oldest-first"],
        vec!["toolbox-notes", "-s", "pics", "warnings"],
        vec![
            "toolbox-notes",
            "-s",
            "pics",
            "add",
            "bob",
            "spamming",
            "--warning",
            "spamwarn",
            "--link",
            "https://redd.it/abc",
        ],
        vec!["toolbox-notes", "-s", "pics", "remove", "bob", "1000"],
        vec!["toolbox-notes", "-s", "pics", "remove", "bob", "--position", "2"],
        vec!["toolbox-notes", "-s", "pics", "purge", "bob", "--yes"],
        vec![
            "toolbox-notes",
            "-s",
            "pics",
            "prune",
            "--days",
            "90",
            "--exclude",
            "ban",
            "--exclude",
            "spamwarn",
            "--dry-run",
        ],
        vec!["toolbox-notes", "-s", "pics", "search", "spam", "--field", "warning"],
        vec!["toolbox-notes", "-s", "pics", "--pages-dir", "/tmp/pages", "config"],
        vec!["toolbox-notes", "-s", "pics", "--offline", "users"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_conflicting_remove_targets() {
    let parsed = Cli::try_parse_from([
        "toolbox-notes",
        "-s",
        "pics",
        "remove",
        "bob",
        "1000",
        "--position",
        "0",
    ]);
    assert!(parsed.is_err());

    let parsed = Cli::try_parse_from(["toolbox-notes", "-s", "pics", "remove", "bob"]);
    assert!(parsed.is_err());
}

#[test]
fn parse_rejects_days_with_before() {
    let parsed = Cli::try_parse_from([
        "toolbox-notes",
        "-s",
        "pics",
        "prune",
        "--days",
        "30",
        "--before",
        "1000",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn parse_rejects_offline_with_pages_dir() {
    let parsed = Cli::try_parse_from([
        "toolbox-notes",
        "-s",
        "pics",
        "--offline",
        "--pages-dir",
        "/tmp/pages",
        "users",
    ]);
    assert!(parsed.is_err());

    let cli = Cli::try_parse_from(["toolbox-notes", "-s", "pics", "--offline", "users"]).unwrap();
    assert!(cli.offline);
    assert!(cli.pages_dir.is_none());
}

#[test]
fn subreddit_is_required() {
    assert!(Cli::try_parse_from(["toolbox-notes", "users"]).is_err());
}

#[test]
fn prune_collects_exclusions() {
    let cli = Cli::try_parse_from([
        "toolbox-notes",
        "-s",
        "pics",
        "prune",
        "--exclude",
        "ban",
        "--exclude",
        "gooduser",
    ])
    .unwrap();
    match cli.command {
        Commands::Prune { exclude, days, .. } => {
            assert_eq!(exclude, vec!["ban", "gooduser"]);
            assert_eq!(days, None);
        }
        _ => panic!("expected prune"),
    }
}
