use std::collections::BTreeSet;
use std::fs;

use serde::Serialize;

use crate::builder::builder_for;
use crate::config::{Domain, SyncConfig};
use crate::diagnostics::{Diagnostics, DiagnosticsSummary};
use crate::error::ReconError;
use crate::grouper::group_rows;
use crate::index::{SpeciesFile, SpeciesIndex};
use crate::keys::EntityKey;
use crate::merge::{merge_record, MergeOptions};
use crate::record::EntityRecord;
use crate::table::Table;

#[derive(Debug, Clone, Serialize)]
pub struct SyncMeta {
    pub domain: Domain,
    pub engine_version: String,
    pub run_at: String,
    pub dry_run: bool,
    pub data_dir: String,
    pub rows: usize,
    pub entities: usize,
    pub files_scanned: usize,
}

/// Everything a run found and did.
#[derive(Debug, Clone, Serialize)]
pub struct SyncResult {
    pub meta: SyncMeta,
    pub summary: DiagnosticsSummary,
    pub diagnostics: Diagnostics,
}

impl SyncResult {
    pub fn has_changes(&self) -> bool {
        !self.diagnostics.changed_files.is_empty()
    }
}

/// Sync the species files under `config.data_dir` with an exported sheet.
///
/// With `dry_run` nothing is written; `changed_files` then lists the files
/// that would have been rewritten.
pub fn run(config: &SyncConfig, csv_text: &str, dry_run: bool) -> Result<SyncResult, ReconError> {
    let builder = builder_for(config.domain);

    let table = Table::from_csv(csv_text, &config.table_options())?;
    let mut required = vec![config.name_column.as_str()];
    required.extend_from_slice(builder.required_columns());
    table.require_columns(required)?;

    let mut diagnostics = Diagnostics::new();
    diagnostics.skipped_rows = table.skipped.clone();

    let groups = group_rows(&table.rows, &config.name_column);
    let index = SpeciesIndex::scan(&config.data_dir)?;
    let by_stem = index.by_stem();

    for key in groups.keys() {
        if !by_stem.contains_key(key.as_str()) {
            diagnostics.rows_without_file.insert(key.clone());
        }
    }

    let row_stems: BTreeSet<&str> = groups.keys().map(EntityKey::as_str).collect();
    let mut to_merge: Vec<&SpeciesFile> = Vec::new();
    for file in index.files() {
        if row_stems.contains(file.stem.as_str()) {
            to_merge.push(file);
        } else {
            diagnostics.ignored_files.insert(file.relative.clone());
        }
    }

    tracing::info!(
        domain = %config.domain,
        rows = table.rows.len(),
        entities = groups.len(),
        files = to_merge.len(),
        dry_run,
        "syncing species files"
    );

    let options = MergeOptions {
        remove_blank: config.remove_blank,
    };

    for file in to_merge {
        let text = fs::read_to_string(&file.path).map_err(|e| ReconError::RecordRead {
            path: file.path.clone(),
            message: e.to_string(),
        })?;
        let mut record = EntityRecord::parse(&text, builder.block_key(), &file.path)?;

        // Rows are joined on the record's own name, not the file name.
        let key = EntityKey::from_display(record.name());
        let Some(rows) = groups.get(&key) else {
            tracing::debug!(file = %file.relative, name = record.name(), "record name has no rows");
            diagnostics.unmatched_records.insert(file.relative.clone());
            continue;
        };

        merge_record(&mut record, &key, rows, builder.as_ref(), options, &mut diagnostics);

        let rendered = record.to_pretty_string().map_err(|e| match e {
            ReconError::Serialize(message) => ReconError::RecordWrite {
                path: file.path.clone(),
                message,
            },
            other => other,
        })?;

        if rendered.as_bytes() == text.as_bytes() {
            tracing::debug!(file = %file.relative, "unchanged");
            diagnostics.unchanged_files.insert(file.relative.clone());
            continue;
        }

        tracing::debug!(file = %file.relative, dry_run, "changed");
        diagnostics.changed_files.insert(file.relative.clone());
        if !dry_run {
            fs::write(&file.path, rendered).map_err(|e| ReconError::RecordWrite {
                path: file.path.clone(),
                message: e.to_string(),
            })?;
        }
    }

    let summary = diagnostics.summary();
    tracing::info!(
        changed = summary.changed_files,
        unchanged = summary.unchanged_files,
        clean = diagnostics.is_clean(),
        "sync finished"
    );

    Ok(SyncResult {
        meta: SyncMeta {
            domain: config.domain,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            dry_run,
            data_dir: config.data_dir.display().to_string(),
            rows: table.rows.len(),
            entities: groups.len(),
            files_scanned: index.files().len(),
        },
        summary,
        diagnostics,
    })
}
