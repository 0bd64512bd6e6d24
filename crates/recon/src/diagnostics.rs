//! Mismatches between the sheet and the species files, collected during a run.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::keys::{EntityKey, FormName};
use crate::table::SkippedRow;

/// One form of one species. Renders as `vulpix [Alola]`, or `vulpix` for the
/// base form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormRef {
    pub entity: EntityKey,
    pub form: FormName,
}

impl FormRef {
    pub fn new(entity: &EntityKey, form: &FormName) -> Self {
        Self {
            entity: entity.clone(),
            form: form.clone(),
        }
    }
}

impl fmt::Display for FormRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.form {
            FormName::Base => write!(f, "{}", self.entity),
            FormName::Named(ref name) => write!(f, "{} [{}]", self.entity, name),
        }
    }
}

impl Serialize for FormRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Collector passed through a run and handed back to the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    /// Forms present in a species file with no sheet row.
    pub no_source_forms: BTreeSet<FormRef>,
    /// Sheet rows naming a form the species file does not have.
    pub no_form_entry: BTreeSet<FormRef>,
    /// Forms whose block was removed because their row was blank.
    pub removed: BTreeSet<FormRef>,
    /// Species files with no sheet rows.
    pub ignored_files: BTreeSet<String>,
    /// Sheet species with no species file.
    pub rows_without_file: BTreeSet<EntityKey>,
    /// Files whose `name` does not match any sheet species.
    pub unmatched_records: BTreeSet<String>,
    pub skipped_rows: Vec<SkippedRow>,
    pub changed_files: BTreeSet<String>,
    pub unchanged_files: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticsSummary {
    pub no_source_forms: usize,
    pub no_form_entry: usize,
    pub removed: usize,
    pub ignored_files: usize,
    pub rows_without_file: usize,
    pub unmatched_records: usize,
    pub skipped_rows: usize,
    pub changed_files: usize,
    pub unchanged_files: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_source_form(&mut self, entity: &EntityKey, form: &FormName) {
        self.no_source_forms.insert(FormRef::new(entity, form));
    }

    pub fn no_form_entry(&mut self, entity: &EntityKey, form: &FormName) {
        self.no_form_entry.insert(FormRef::new(entity, form));
    }

    pub fn removed(&mut self, entity: &EntityKey, form: &FormName) {
        self.removed.insert(FormRef::new(entity, form));
    }

    /// True when the sheet and the files agree: no mismatch category has
    /// entries. Write outcomes do not count.
    pub fn is_clean(&self) -> bool {
        self.no_source_forms.is_empty()
            && self.no_form_entry.is_empty()
            && self.removed.is_empty()
            && self.ignored_files.is_empty()
            && self.rows_without_file.is_empty()
            && self.unmatched_records.is_empty()
            && self.skipped_rows.is_empty()
    }

    pub fn summary(&self) -> DiagnosticsSummary {
        DiagnosticsSummary {
            no_source_forms: self.no_source_forms.len(),
            no_form_entry: self.no_form_entry.len(),
            removed: self.removed.len(),
            ignored_files: self.ignored_files.len(),
            rows_without_file: self.rows_without_file.len(),
            unmatched_records: self.unmatched_records.len(),
            skipped_rows: self.skipped_rows.len(),
            changed_files: self.changed_files.len(),
            unchanged_files: self.unchanged_files.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_refs_render_with_brackets() {
        let key = EntityKey::from_display("Vulpix");
        assert_eq!(FormRef::new(&key, &FormName::Base).to_string(), "vulpix");
        assert_eq!(
            FormRef::new(&key, &FormName::Named("Alola".into())).to_string(),
            "vulpix [Alola]"
        );
    }

    #[test]
    fn entries_are_deduplicated() {
        let key = EntityKey::from_display("Pikachu");
        let mut diagnostics = Diagnostics::new();
        diagnostics.no_source_form(&key, &FormName::Named("Partner".into()));
        diagnostics.no_source_form(&key, &FormName::Named("Partner".into()));
        assert_eq!(diagnostics.summary().no_source_forms, 1);
        assert!(!diagnostics.is_clean());
    }

    #[test]
    fn write_outcomes_do_not_make_a_run_dirty() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.changed_files.insert("generation1/pikachu.json".into());
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn serializes_form_refs_as_strings() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.no_form_entry(
            &EntityKey::from_display("Meowth"),
            &FormName::Named("Galar".into()),
        );
        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json["no_form_entry"], serde_json::json!(["meowth [Galar]"]));
    }
}
