//! CLI argument parsing tests.

use clap::Parser;
use snykapi::cli::{Cli, Command, Entity};

#[test]
fn test_cli_parses_get_subcommand() {
    let cli = Cli::parse_from(["snykapi", "get", "project", "p1", "--org", "acme"]);

    assert!(!cli.json);
    match cli.command {
        Command::Get { entity, id, org } => {
            assert_eq!(entity, Entity::Project);
            assert_eq!(id, "p1");
            assert_eq!(org.as_deref(), Some("acme"));
        }
        _ => panic!("Expected Get command"),
    }
}

#[test]
fn test_cli_parses_list_subcommand() {
    let cli = Cli::parse_from(["snykapi", "list", "orgs"]);

    match cli.command {
        Command::List {
            entity,
            org,
            project,
            group,
        } => {
            assert_eq!(entity, Entity::Org);
            assert!(org.is_none());
            assert!(project.is_none());
            assert!(group.is_none());
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_list_issues_for_project() {
    let cli = Cli::parse_from(["snykapi", "list", "issues", "--org", "o1", "--project", "p1"]);

    match cli.command {
        Command::List {
            entity,
            org,
            project,
            ..
        } => {
            assert_eq!(entity, Entity::Issue);
            assert_eq!(org.as_deref(), Some("o1"));
            assert_eq!(project.as_deref(), Some("p1"));
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_global_json_flag() {
    // --json before subcommand
    let cli = Cli::parse_from(["snykapi", "--json", "list", "groups"]);
    assert!(cli.json);

    // --json after subcommand (global flag)
    let cli = Cli::parse_from(["snykapi", "list", "groups", "--json"]);
    assert!(cli.json);
}

#[test]
fn test_entity_variants() {
    let cli = Cli::parse_from(["snykapi", "get", "org", "acme"]);
    assert!(matches!(cli.command, Command::Get { entity: Entity::Org, .. }));

    let cli = Cli::parse_from(["snykapi", "list", "users", "--group", "g1"]);
    assert!(matches!(cli.command, Command::List { entity: Entity::User, .. }));

    let cli = Cli::parse_from(["snykapi", "list", "container-images", "--org", "o1"]);
    assert!(matches!(cli.command, Command::List { entity: Entity::ContainerImage, .. }));

    let cli = Cli::parse_from(["snykapi", "list", "targets", "--org", "o1"]);
    assert!(matches!(cli.command, Command::List { entity: Entity::Target, .. }));
}

#[test]
fn test_unknown_entity_is_rejected() {
    let result = Cli::try_parse_from(["snykapi", "list", "revisions"]);
    assert!(result.is_err());
}
