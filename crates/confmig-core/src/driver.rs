//! Migration driver
//!
//! Ties the pieces together for one invocation: locate, parse, check the
//! version, run the registry, serialize, then print or write with a backup.
//! Nothing is written until parse, run and serialize have all succeeded.

use crate::config::{MigrateArgs, MigratorConfig};
use crate::error::MigrateError;
use crate::locator::{ConfigLocator, FormatHandle};
use crate::log::LogSink;
use confmig_codec::{default_codecs, CodecRegistry};
use confmig_migrate::{MigrationRegistry, MigrationReport, MigrationRunner};
use std::path::{Component, Path, PathBuf};

/// Result of an accepted migrate invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrateOutcome {
    /// The config already declares the latest version; nothing written
    AlreadyLatest,
    /// Migrated text was printed instead of written
    DryRun {
        /// Serialized config in the destination format
        output: String,
        /// Run summary
        report: MigrationReport,
    },
    /// Migrated config was written to disk
    Written {
        /// File written
        destination: PathBuf,
        /// Where the original was moved, for in-place migrations
        backup: Option<PathBuf>,
        /// Run summary
        report: MigrationReport,
    },
}

impl MigrateOutcome {
    /// Run summary, if steps ran
    #[must_use]
    pub fn report(&self) -> Option<&MigrationReport> {
        match self {
            Self::AlreadyLatest => None,
            Self::DryRun { report, .. } | Self::Written { report, .. } => Some(report),
        }
    }
}

/// Drives one migrate invocation
pub struct Migrator<'a> {
    config: &'a MigratorConfig,
    registry: &'a MigrationRegistry,
    codecs: CodecRegistry,
    log: &'a dyn LogSink,
}

impl std::fmt::Debug for Migrator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("config", self.config)
            .field("registry", self.registry)
            .field("codecs", &self.codecs)
            .finish_non_exhaustive()
    }
}

impl<'a> Migrator<'a> {
    /// Create driver with the built-in codecs
    #[must_use]
    pub fn new(
        config: &'a MigratorConfig,
        registry: &'a MigrationRegistry,
        log: &'a dyn LogSink,
    ) -> Self {
        Self {
            config,
            registry,
            codecs: default_codecs(config.manifest_key()),
            log,
        }
    }

    /// Replace the codec registry
    #[inline]
    #[must_use]
    pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    /// Codecs in use
    #[inline]
    #[must_use]
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// Migrate the project's config
    ///
    /// # Errors
    /// Rejected runs are reported once on the error channel as
    /// `Error: <message>` and the error is returned.
    pub async fn migrate(&self, args: &MigrateArgs) -> Result<MigrateOutcome, MigrateError> {
        match self.execute(args).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                self.log.error(&format!("Error: {err}"));
                Err(err)
            }
        }
    }

    async fn execute(&self, args: &MigrateArgs) -> Result<MigrateOutcome, MigrateError> {
        let locator = ConfigLocator::new(self.config, &self.codecs);
        let source = locator.locate(args.source.as_deref()).await?;
        let source_codec = self.codecs.resolve(&source.path)?;

        let text = read(&source.path).await?;
        let mut document = source_codec.parse(&text)?;
        self.log
            .info(&format!("Found config file: {}", self.display_path(&source.path)));

        if !document.has_version() {
            tracing::warn!(path = %source.path.display(), "config has no version, assuming 1");
        }
        if document.version() == self.config.latest_version {
            self.log.warn("Config is already the latest version");
            return Ok(MigrateOutcome::AlreadyLatest);
        }

        self.log.info("Migrating config file...");
        let report = MigrationRunner::new(self.registry, self.config.latest_version).run(&mut document)?;
        for notice in &report.notices {
            self.log.warn(notice);
        }

        let destination = match &args.destination {
            Some(path) => self.config.resolve(path),
            None => source.path.clone(),
        };
        let destination_codec = self.codecs.resolve(&destination)?;

        if args.dry_run {
            let output = destination_codec.serialize(&document)?;
            self.log.info("Config file migrated!");
            self.log.write_stdout(&format!("\n{}", output.trim_end()));
            return Ok(MigrateOutcome::DryRun { output, report });
        }

        let backup = if destination_codec.is_host_document() {
            let existing = read_optional(&destination).await?;
            let output = destination_codec.embed(existing.as_deref(), &document)?;
            write(&destination, &output).await?;
            None
        } else {
            let output = destination_codec.serialize(&document)?;
            self.write_with_backup(&source, &destination, &output).await?
        };

        tracing::info!(
            destination = %destination.display(),
            from_version = report.from_version,
            to_version = report.to_version,
            "config migrated"
        );
        self.log.info("Config file migrated!");

        Ok(MigrateOutcome::Written {
            destination,
            backup,
            report,
        })
    }

    async fn write_with_backup(
        &self,
        source: &FormatHandle,
        destination: &Path,
        output: &str,
    ) -> Result<Option<PathBuf>, MigrateError> {
        if !same_path(&source.path, destination) {
            write(destination, output).await?;
            return Ok(None);
        }

        let backup = backup_path(&source.path, &self.config.backup_marker);
        tracing::debug!(backup = %backup.display(), "backing up original config");
        tokio::fs::rename(&source.path, &backup)
            .await
            .map_err(|e| MigrateError::io(&backup, e))?;
        write(destination, output).await?;
        Ok(Some(backup))
    }

    fn display_path(&self, path: &Path) -> String {
        let root = normalize(&self.config.root);
        let path = normalize(path);
        path.strip_prefix(&root)
            .unwrap_or(path.as_path())
            .display()
            .to_string()
    }
}

/// Backup location for `path`: `name.ext` becomes `name.<marker>.ext`
///
/// Extension-less files get the marker appended, so `.percyrc` becomes
/// `.percyrc.old`.
#[must_use]
pub fn backup_path(path: &Path, marker: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match path.extension() {
        Some(ext) => format!("{stem}.{marker}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{marker}"),
    };
    path.with_file_name(file_name)
}

/// Lexically normalize `path`, dropping `.` and folding `..`
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn same_path(a: &Path, b: &Path) -> bool {
    normalize(a) == normalize(b)
}

async fn read(path: &Path) -> Result<String, MigrateError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MigrateError::io(path, e))
}

async fn read_optional(path: &Path) -> Result<Option<String>, MigrateError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(MigrateError::io(path, e)),
    }
}

async fn write(path: &Path, contents: &str) -> Result<(), MigrateError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| MigrateError::io(path, e))
}
