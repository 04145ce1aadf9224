use super::*;

#[test]
fn run_defaults_to_tick_config_json() {
    let cli = Cli::try_parse_from(["tick", "run"]).unwrap();
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.config, PathBuf::from("tick.config.json"));
            assert!(args.config_schema.is_none());
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn run_accepts_config_and_schema_overrides() {
    let cli = Cli::try_parse_from(["tick", "run", "--config", "a.json", "--config-schema", "a.schema.json"]).unwrap();
    match cli.command {
        Commands::Run(args) => {
            assert_eq!(args.config, PathBuf::from("a.json"));
            assert_eq!(args.config_schema, Some(PathBuf::from("a.schema.json")));
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn directory_flag_is_global() {
    let cli = Cli::try_parse_from(["tick", "-C", "/tmp/work", "run"]).unwrap();
    assert_eq!(cli.directory, Some(PathBuf::from("/tmp/work")));
}

#[test]
fn stub_subcommands_parse() {
    for name in ["init", "status", "doctor", "loop"] {
        Cli::try_parse_from(["tick", name]).unwrap_or_else(|_| panic!("{name} should parse"));
    }
}

#[test]
fn default_config_schema_path_is_sibling_of_config() {
    let path = default_config_schema_path(Path::new("workspace/tick.config.json"));
    assert_eq!(path, PathBuf::from("workspace/config.schema.json"));
}

#[test]
fn default_config_schema_path_handles_bare_filename() {
    let path = default_config_schema_path(Path::new("tick.config.json"));
    assert_eq!(path, PathBuf::from("./config.schema.json"));
}
