use super::*;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("gcr-clean").chain(args.iter().copied()))
}

#[test]
fn test_cli_definition_is_valid() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[test]
fn test_projects_are_required() {
    let err = parse(&[]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_version_does_not_need_projects() {
    let cli = parse(&["--version"]).unwrap();
    assert!(cli.version);
    assert!(cli.projects.is_empty());
}

#[test]
fn test_multiple_projects() {
    let cli = parse(&["proj-a", "proj-b"]).unwrap();
    assert_eq!(cli.projects, ["proj-a", "proj-b"]);
}

#[test]
fn test_noop_with_explicit_value() {
    let cli = parse(&["--noop=false", "proj"]).unwrap();
    assert_eq!(cli.noop, Some(false));

    let cli = parse(&["-n=false", "proj"]).unwrap();
    assert_eq!(cli.noop, Some(false));
}

#[test]
fn test_noop_flag_without_value_means_true() {
    let cli = parse(&["proj", "--noop"]).unwrap();
    assert_eq!(cli.noop, Some(true));
}

#[test]
fn test_bare_noop_flag_does_not_take_the_project() {
    let cli = parse(&["-n", "my-project"]).unwrap();
    assert_eq!(cli.noop, Some(true));
    assert_eq!(cli.projects, ["my-project"]);

    let cli = parse(&["--noop", "proj-a", "proj-b"]).unwrap();
    assert_eq!(cli.noop, Some(true));
    assert_eq!(cli.projects, ["proj-a", "proj-b"]);
}

#[test]
fn test_parallel_and_registry() {
    let cli = parse(&["-p", "4", "--registry", "eu.gcr.io", "proj"]).unwrap();
    assert_eq!(cli.parallel, Some(4));
    assert_eq!(cli.registry.as_deref(), Some("eu.gcr.io"));
}

#[test]
fn test_invalid_parallel_is_rejected() {
    assert!(parse(&["-p", "many", "proj"]).is_err());
}

#[test]
fn test_invalid_log_format_is_rejected() {
    assert!(parse(&["--log-format", "xml", "proj"]).is_err());
}

#[test]
fn test_strict_defaults_to_false() {
    let cli = parse(&["proj"]).unwrap();
    assert!(!cli.strict);
}
