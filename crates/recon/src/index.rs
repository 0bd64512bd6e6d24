//! Species file discovery under the data directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ReconError;

/// One `*.json` file found under a generation directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesFile {
    /// Path relative to the data directory, `/`-separated
    /// (`generation1/bulbasaur.json`).
    pub relative: String,
    pub path: PathBuf,
    /// File stem, lower-cased. Matched against entity keys as-is.
    pub stem: String,
}

/// Every species file under `data_dir/<generation>/`, sorted by relative path.
#[derive(Debug, Clone, Default)]
pub struct SpeciesIndex {
    files: Vec<SpeciesFile>,
}

impl SpeciesIndex {
    pub fn scan(data_dir: &Path) -> Result<Self, ReconError> {
        let scan_err = |path: &Path, e: std::io::Error| ReconError::Scan {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(data_dir).map_err(|e| scan_err(data_dir, e))? {
            let entry = entry.map_err(|e| scan_err(data_dir, e))?;
            let generation = entry.path();
            if !generation.is_dir() {
                continue;
            }
            let generation_name = entry.file_name().to_string_lossy().into_owned();

            for file in fs::read_dir(&generation).map_err(|e| scan_err(&generation, e))? {
                let file = file.map_err(|e| scan_err(&generation, e))?;
                let path = file.path();
                if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                files.push(SpeciesFile {
                    relative: format!("{}/{}", generation_name, file.file_name().to_string_lossy()),
                    stem: stem.to_lowercase(),
                    path,
                });
            }
        }

        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        tracing::debug!(files = files.len(), dir = %data_dir.display(), "indexed species files");
        Ok(Self { files })
    }

    pub fn files(&self) -> &[SpeciesFile] {
        &self.files
    }

    /// Stem to files, for joining against many keys at once.
    pub fn by_stem(&self) -> BTreeMap<&str, Vec<&SpeciesFile>> {
        let mut map: BTreeMap<&str, Vec<&SpeciesFile>> = BTreeMap::new();
        for file in &self.files {
            map.entry(file.stem.as_str()).or_default().push(file);
        }
        map
    }
}
