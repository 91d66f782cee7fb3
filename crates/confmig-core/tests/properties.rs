//! Version and determinism properties of whole migrate runs

use confmig_codec::default_codecs;
use confmig_core::{MemoryLog, MigrateArgs, MigrateOutcome, Migrator};
use confmig_migrate::MigrationRegistry;
use confmig_test_utils::TestProject;
use proptest::prelude::*;
use serde_json::json;
use std::path::Path;

const FILES: [&str; 3] = [".percy.yml", ".percy.json", ".percy.js"];

fn fixture(file: &str, version: u64, label: &str) -> String {
    match file {
        ".percy.yml" => format!("version: {version}\nlabel: {label}\n"),
        ".percy.json" => format!("{{ \"version\": {version}, \"label\": \"{label}\" }}\n"),
        _ => format!("module.exports = {{ version: {version}, label: '{label}' }};\n"),
    }
}

fn migrate(project: &TestProject, latest: u64, args: &MigrateArgs) -> MigrateOutcome {
    let config = project.config().with_latest_version(latest);
    let registry = MigrationRegistry::new();
    let log = MemoryLog::new(config.log_prefix());

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(Migrator::new(&config, &registry, &log).migrate(args))
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn migrated_config_reaches_latest(
        file_index in 0..FILES.len(),
        start in 0_u64..6,
        latest in 1_u64..6,
        label in "x[a-z]{1,7}",
    ) {
        let file = FILES[file_index];
        let project = TestProject::new();
        let original = fixture(file, start, &label);
        project.write(file, &original);

        let outcome = migrate(&project, latest, &MigrateArgs::new());
        let written = project.read(file).unwrap();

        if start == latest {
            prop_assert_eq!(outcome, MigrateOutcome::AlreadyLatest);
            prop_assert_eq!(written, original);
        } else {
            let codecs = default_codecs("percy");
            let doc = codecs.resolve(Path::new(file)).unwrap().parse(&written).unwrap();
            prop_assert_eq!(doc.version(), latest);
            prop_assert_eq!(doc.get("label"), Some(&json!(label)));
            prop_assert!(project.exists(&file.replacen(".percy.", ".percy.old.", 1)));
        }
    }

    #[test]
    fn dry_run_is_deterministic_and_writes_nothing(
        file_index in 0..FILES.len(),
        label in "x[a-z]{1,7}",
    ) {
        let file = FILES[file_index];
        let project = TestProject::new();
        let original = fixture(file, 1, &label);
        project.write(file, &original);

        let args = MigrateArgs::new().with_dry_run(true);
        let first = migrate(&project, 2, &args);
        let second = migrate(&project, 2, &args);

        prop_assert_eq!(first, second);
        prop_assert_eq!(project.read(file).unwrap(), original);
        prop_assert_eq!(std::fs::read_dir(project.root()).unwrap().count(), 1);
    }
}
