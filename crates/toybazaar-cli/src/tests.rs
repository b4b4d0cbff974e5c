use super::*;

#[test]
fn parses_db_ping_command() {
    let cli =
        Cli::try_parse_from(["toybazaar-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["toybazaar-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_db_seed_without_path() {
    let cli =
        Cli::try_parse_from(["toybazaar-cli", "db", "seed"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed { path: None }
        })
    ));
}

#[test]
fn parses_db_seed_with_path() {
    let cli = Cli::try_parse_from(["toybazaar-cli", "db", "seed", "--path", "other.yaml"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Seed { path: Some(ref p) }
        }) if p == &PathBuf::from("other.yaml")
    ));
}

#[test]
fn parses_images_upload() {
    let id = Uuid::now_v7();
    let cli = Cli::try_parse_from([
        "toybazaar-cli",
        "images",
        "upload",
        "--toy",
        &id.to_string(),
        "a.png",
        "b.jpg",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Images {
            command: ImagesCommands::Upload { toy, files },
        }) => {
            assert_eq!(toy, id);
            assert_eq!(files, vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn images_upload_requires_files() {
    let id = Uuid::now_v7().to_string();
    let result = Cli::try_parse_from(["toybazaar-cli", "images", "upload", "--toy", &id]);
    assert!(result.is_err());
}

#[test]
fn images_upload_rejects_non_uuid_toy() {
    let result = Cli::try_parse_from([
        "toybazaar-cli",
        "images",
        "upload",
        "--toy",
        "blue-dump-truck",
        "a.png",
    ]);
    assert!(result.is_err());
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["toybazaar-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}
