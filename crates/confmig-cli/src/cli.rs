//! Command line definition

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use confmig_core::{MigrateArgs, MigratorConfig};
use confmig_migrate::MigrationRegistry;
use std::path::PathBuf;

/// Parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub(crate) config: MigratorConfig,
    pub(crate) args: MigrateArgs,
    pub(crate) renames: Vec<(String, String)>,
    pub(crate) json_logs: bool,
}

impl Invocation {
    pub(crate) fn from_matches(matches: &ArgMatches) -> Option<Self> {
        let mut config = MigratorConfig::new();
        if let Some(name) = matches.get_one::<String>("name") {
            config = config.with_name(name);
        }
        if let Some(root) = matches.get_one::<PathBuf>("root") {
            config = config.with_root(root);
        }
        if let Some(version) = matches.get_one::<u64>("latest-version") {
            config = config.with_latest_version(*version);
        }
        if let Some(marker) = matches.get_one::<String>("backup-marker") {
            config = config.with_backup_marker(marker);
        }
        if let Some(key) = matches.get_one::<String>("manifest-key") {
            config = config.with_manifest_key(key);
        }

        let Some(("migrate", sub)) = matches.subcommand() else {
            return None;
        };

        let args = MigrateArgs {
            source: sub.get_one::<PathBuf>("source").cloned(),
            destination: sub.get_one::<PathBuf>("destination").cloned(),
            dry_run: sub.get_flag("dry-run"),
        };
        let renames = sub
            .get_many::<(String, String)>("map")
            .map(|pairs| pairs.cloned().collect())
            .unwrap_or_default();

        Some(Self {
            config,
            args,
            renames,
            json_logs: matches.get_flag("json-logs"),
        })
    }

    /// Registry with one map step per `--map` rename, in flag order
    pub(crate) fn registry(&self) -> MigrationRegistry {
        let mut registry = MigrationRegistry::new();
        for (from, to) in self.renames.iter().cloned() {
            registry.add(move |util| {
                util.map(&from, &to);
                Ok(())
            });
        }
        registry
    }
}

fn parse_rename(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => {
            Ok((from.to_string(), to.to_string()))
        }
        _ => Err(format!("expected FROM=TO, got '{value}'")),
    }
}

pub(crate) fn command() -> Command {
    Command::new("confmig")
        .version(confmig_core::VERSION)
        .about("Migrate a project's config file to the latest schema version")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("name")
                .long("name")
                .global(true)
                .help("Config name used for file names and log prefix [default: percy]"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Project root to search [default: current directory]"),
        )
        .arg(
            Arg::new("latest-version")
                .long("latest-version")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Schema version to migrate to [default: 2]"),
        )
        .arg(
            Arg::new("backup-marker")
                .long("backup-marker")
                .global(true)
                .help("Marker inserted into backup file names [default: old]"),
        )
        .arg(
            Arg::new("manifest-key")
                .long("manifest-key")
                .global(true)
                .help("Key holding the config in package.json [default: config name]"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit diagnostics as JSON lines"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Migrate the config file")
                .arg(
                    Arg::new("source")
                        .value_parser(value_parser!(PathBuf))
                        .help("Config file to migrate; searched for when omitted"),
                )
                .arg(
                    Arg::new("destination")
                        .value_parser(value_parser!(PathBuf))
                        .help("Output file, format chosen by its name"),
                )
                .arg(
                    Arg::new("dry-run")
                        .short('d')
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print the migrated config instead of writing it"),
                )
                .arg(
                    Arg::new("map")
                        .short('m')
                        .long("map")
                        .value_name("FROM=TO")
                        .action(ArgAction::Append)
                        .value_parser(parse_rename)
                        .help("Move an option to a new dotted path before writing"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use confmig_codec::ConfigDocument;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn invocation(argv: &[&str]) -> Invocation {
        let matches = command().try_get_matches_from(argv).unwrap();
        Invocation::from_matches(&matches).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn migrate_defaults() {
        let inv = invocation(&["confmig", "migrate"]);
        assert_eq!(inv.config, MigratorConfig::new());
        assert_eq!(inv.args, MigrateArgs::new());
        assert!(inv.renames.is_empty());
        assert!(!inv.json_logs);
    }

    #[test]
    fn migrate_positional_and_flags() {
        let inv = invocation(&[
            "confmig",
            "--name",
            "acme",
            "migrate",
            ".acme.yml",
            ".acme.js",
            "--dry-run",
            "--latest-version",
            "3",
        ]);

        assert_eq!(inv.config.name, "acme");
        assert_eq!(inv.config.latest_version, 3);
        assert_eq!(
            inv.args,
            MigrateArgs::new()
                .with_source(".acme.yml")
                .with_destination(".acme.js")
                .with_dry_run(true)
        );
    }

    #[test]
    fn map_flags_build_registry() {
        let inv = invocation(&["confmig", "migrate", "-m", "a=b", "--map", "b=c.d"]);
        assert_eq!(
            inv.renames,
            [("a".to_string(), "b".to_string()), ("b".to_string(), "c.d".to_string())]
        );

        let registry = inv.registry();
        let mut doc = ConfigDocument::from_value(json!({ "a": 1 })).unwrap();
        confmig_migrate::MigrationRunner::new(&registry, 2)
            .run(&mut doc)
            .unwrap();
        assert_eq!(doc.get("c.d"), Some(&json!(1)));
    }

    #[test]
    fn map_flag_rejects_malformed() {
        assert!(command()
            .try_get_matches_from(["confmig", "migrate", "--map", "nope"])
            .is_err());
        assert!(parse_rename("=b").is_err());
    }

    #[test]
    fn subcommand_required() {
        assert!(command().try_get_matches_from(["confmig"]).is_err());
    }
}
