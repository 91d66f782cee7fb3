//! Config file discovery
//!
//! An explicit path wins. Without one, a fixed list of file names is searched
//! in the project root and the first hit is used. The package manifest only
//! counts when it embeds the config.

use crate::config::MigratorConfig;
use crate::error::MigrateError;
use confmig_codec::{CodecRegistry, ConfigCodec, Format, MANIFEST_FILE};
use std::path::{Path, PathBuf};

/// A concrete config file and its format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatHandle {
    /// Path of the file
    pub path: PathBuf,
    /// Format resolved from the path
    pub format: Format,
}

/// Finds the config file to migrate
#[derive(Debug, Clone, Copy)]
pub struct ConfigLocator<'a> {
    config: &'a MigratorConfig,
    codecs: &'a CodecRegistry,
}

impl<'a> ConfigLocator<'a> {
    /// Create locator
    #[inline]
    #[must_use]
    pub fn new(config: &'a MigratorConfig, codecs: &'a CodecRegistry) -> Self {
        Self { config, codecs }
    }

    /// File names searched in the project root, in order
    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        let name = &self.config.name;
        vec![
            MANIFEST_FILE.to_string(),
            format!(".{name}rc"),
            format!(".{name}.json"),
            format!(".{name}.yaml"),
            format!(".{name}.yml"),
            format!(".{name}.js"),
            format!(".{name}.cjs"),
            format!("{name}.config.js"),
            format!("{name}.config.cjs"),
        ]
    }

    /// Locate the config file
    ///
    /// Never creates files.
    ///
    /// # Errors
    /// Returns `MigrateError::NotFound` when nothing usable exists, and a
    /// codec error when an explicit path has an unsupported format or is a
    /// host document that cannot be parsed.
    pub async fn locate(&self, explicit: Option<&Path>) -> Result<FormatHandle, MigrateError> {
        match explicit {
            Some(path) => {
                let path = self.config.resolve(path);
                if !is_file(&path).await {
                    return Err(MigrateError::NotFound);
                }
                let codec = self.codecs.resolve(&path)?;
                if carries_config(&path, codec).await? {
                    Ok(FormatHandle {
                        path,
                        format: codec.format(),
                    })
                } else {
                    Err(MigrateError::NotFound)
                }
            }
            None => self.search().await,
        }
    }

    async fn search(&self) -> Result<FormatHandle, MigrateError> {
        for candidate in self.candidates() {
            let path = self.config.root.join(&candidate);
            let Ok(codec) = self.codecs.resolve(&path) else {
                continue;
            };

            if !is_file(&path).await {
                continue;
            }
            let carries = match carries_config(&path, codec).await {
                Ok(carries) => carries,
                // A broken manifest only matters when named explicitly
                Err(MigrateError::Codec(err)) => {
                    tracing::debug!(path = %path.display(), error = %err, "skipping unreadable host document");
                    false
                }
                Err(err) => return Err(err),
            };
            if carries {
                tracing::debug!(path = %path.display(), format = %codec.format(), "config file located");
                return Ok(FormatHandle {
                    path,
                    format: codec.format(),
                });
            }
        }

        tracing::debug!(root = %self.config.root.display(), "no config file in search locations");
        Err(MigrateError::NotFound)
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}

/// Host documents only count when they embed the config
async fn carries_config(path: &Path, codec: &dyn ConfigCodec) -> Result<bool, MigrateError> {
    if !codec.is_host_document() {
        return Ok(true);
    }

    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MigrateError::io(path, e))?;
    Ok(codec.embeds_config(&source)?)
}
