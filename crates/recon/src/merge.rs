//! Apply grouped sheet rows to one species record.

use std::collections::BTreeSet;

use crate::builder::AttributeBuilder;
use crate::diagnostics::Diagnostics;
use crate::grouper::GroupedRow;
use crate::keys::{EntityKey, FormName, EXPLICIT_BASE_FORM};
use crate::record::EntityRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Remove the block of a target whose row is blank instead of writing
    /// an empty one.
    pub remove_blank: bool,
}

/// Merge `rows` (all rows for `key`, in sheet order) into `record`.
///
/// Form mismatches in either direction are reported, never fatal. Rows for
/// forms the file does not have are skipped.
pub fn merge_record(
    record: &mut EntityRecord,
    key: &EntityKey,
    rows: &[GroupedRow],
    builder: &dyn AttributeBuilder,
    options: MergeOptions,
    diagnostics: &mut Diagnostics,
) {
    report_form_mismatches(record, key, rows, diagnostics);

    let has_explicit_base = record.forms().iter().any(|f| f.name() == EXPLICIT_BASE_FORM);

    for grouped in rows {
        let slot = match grouped.form {
            FormName::Base if has_explicit_base => match record.form_mut(EXPLICIT_BASE_FORM) {
                Some(form) => form.block_slot_mut(),
                None => continue,
            },
            FormName::Base => record.block_slot_mut(),
            FormName::Named(ref name) => match record.form_mut(name) {
                Some(form) => form.block_slot_mut(),
                None => continue,
            },
        };

        if options.remove_blank && builder.is_blank(&grouped.row) {
            if slot.take().is_some() {
                tracing::debug!(entity = %key, form = %grouped.form, "removed blank block");
                diagnostics.removed(key, &grouped.form);
            }
            continue;
        }

        let existing = slot.take();
        *slot = Some(builder.build(&grouped.row, existing));
    }

    drop_inherited_blocks(record);
}

fn report_form_mismatches(
    record: &EntityRecord,
    key: &EntityKey,
    rows: &[GroupedRow],
    diagnostics: &mut Diagnostics,
) {
    let mut file_forms: BTreeSet<FormName> = record
        .forms()
        .iter()
        .map(|f| FormName::from_file_form(f.name()))
        .collect();
    file_forms.insert(FormName::Base);

    let row_forms: BTreeSet<FormName> = rows.iter().map(|r| r.form.clone()).collect();

    for form in file_forms.difference(&row_forms) {
        diagnostics.no_source_form(key, form);
    }
    for form in row_forms.difference(&file_forms) {
        diagnostics.no_form_entry(key, form);
    }
}

/// A form that carries exactly its species' block inherits it instead.
fn drop_inherited_blocks(record: &mut EntityRecord) {
    let Some(parent) = record.block().cloned() else {
        return;
    };
    for form in record.forms_mut() {
        if form.block() == Some(&parent) {
            form.take_block();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::{json, Value};

    use super::*;
    use crate::behaviour::BehaviourBuilder;
    use crate::grouper::group_rows;
    use crate::riding::RidingBuilder;
    use crate::table::TabularRow;

    fn record(value: Value, block_key: &str) -> EntityRecord {
        EntityRecord::from_value(value, block_key, Path::new("t.json")).unwrap()
    }

    fn rows(pairs: &[&[(&str, &str)]]) -> Vec<TabularRow> {
        pairs
            .iter()
            .map(|row| TabularRow::from_pairs(row.iter().copied()))
            .collect()
    }

    fn merge(
        record: &mut EntityRecord,
        rows: &[TabularRow],
        builder: &dyn AttributeBuilder,
        remove_blank: bool,
    ) -> Diagnostics {
        let groups = group_rows(rows, "Species");
        let key = EntityKey::from_display(record.name());
        let mut diagnostics = Diagnostics::new();
        merge_record(
            record,
            &key,
            &groups[&key],
            builder,
            MergeOptions { remove_blank },
            &mut diagnostics,
        );
        diagnostics
    }

    #[test]
    fn pikachu_base_row_and_missing_partner_row() {
        let mut pikachu = record(
            json!({"name": "Pikachu", "forms": [{"name": "Partner"}]}),
            "behaviour",
        );
        let rows = rows(&[&[("Species", "Pikachu"), ("Sleep", "True"), ("S. Depth", "3")]]);
        let diagnostics = merge(&mut pikachu, &rows, &BehaviourBuilder, false);

        assert_eq!(
            pikachu.to_value(),
            json!({
                "name": "Pikachu",
                "forms": [{"name": "Partner"}],
                "behaviour": {"resting": {"canSleep": true, "depth": 3}}
            })
        );
        let no_source: Vec<String> = diagnostics
            .no_source_forms
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(no_source, vec!["pikachu [Partner]"]);
        assert!(diagnostics.no_form_entry.is_empty());
    }

    #[test]
    fn aliased_rows_reach_regional_forms() {
        let mut vulpix = record(
            json!({"name": "Vulpix", "forms": [{"name": "Alola"}]}),
            "behaviour",
        );
        let rows = rows(&[
            &[("Species", "Vulpix"), ("Sleep", "TRUE")],
            &[("Species", "Vulpix [Alolan]"), ("Hurt by Lava", "FALSE")],
        ]);
        let diagnostics = merge(&mut vulpix, &rows, &BehaviourBuilder, false);

        assert_eq!(vulpix.forms()[0].block().unwrap()["fireImmune"], json!(true));
        assert!(diagnostics.is_clean());
    }

    #[test]
    fn rows_for_unknown_forms_are_reported_and_skipped() {
        let mut meowth = record(json!({"name": "Meowth"}), "behaviour");
        let rows = rows(&[
            &[("Species", "Meowth")],
            &[("Species", "Meowth [Galarian]"), ("Fly", "TRUE")],
        ]);
        let diagnostics = merge(&mut meowth, &rows, &BehaviourBuilder, false);
        let entries: Vec<String> = diagnostics
            .no_form_entry
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(entries, vec!["meowth [Galar]"]);
        assert_eq!(meowth.to_value(), json!({"name": "Meowth", "behaviour": {}}));
    }

    #[test]
    fn form_blocks_equal_to_the_parent_are_dropped() {
        let rows = rows(&[
            &[("Species", "Eevee"), ("Sleep", "TRUE")],
            &[("Species", "Eevee [Partner]"), ("Sleep", "TRUE")],
        ]);
        // A stale form block is rebuilt from its row, which matches the base.
        let mut eevee = record(
            json!({
                "name": "Eevee",
                "forms": [{"name": "Partner", "behaviour": {"stale": true}}]
            }),
            "behaviour",
        );
        merge(&mut eevee, &rows, &BehaviourBuilder, false);
        assert!(eevee.forms()[0].block().is_none());
        assert_eq!(
            eevee.block().map(|b| Value::Object(b.clone())),
            Some(json!({"resting": {"canSleep": true}}))
        );
    }

    #[test]
    fn traits_dropped_from_the_sheet_leave_the_file() {
        let mut snorlax = record(
            json!({
                "name": "Snorlax",
                "behaviour": {"resting": {"canSleep": true, "depth": 3}, "combat": {"willFlee": true}}
            }),
            "behaviour",
        );
        let rows = rows(&[&[("Species", "Snorlax"), ("Sleep", "FALSE"), ("Defends Self", "TRUE")]]);
        merge(&mut snorlax, &rows, &BehaviourBuilder, false);
        assert_eq!(
            snorlax.to_value(),
            json!({
                "name": "Snorlax",
                "behaviour": {"combat": {"willDefendSelf": true, "fightsMelee": true}}
            })
        );
    }

    #[test]
    fn explicit_none_form_takes_base_rows() {
        let mut record = record(
            json!({"name": "Unown", "forms": [{"name": "None"}, {"name": "B"}]}),
            "behaviour",
        );
        let rows = rows(&[
            &[("Species", "Unown"), ("Fly", "TRUE")],
            &[("Species", "Unown [B]")],
        ]);
        let diagnostics = merge(&mut record, &rows, &BehaviourBuilder, false);
        assert!(record.block().is_none());
        assert_eq!(
            record.forms()[0].block().unwrap()["moving"],
            json!({"fly": {"canFly": true}})
        );
        assert!(diagnostics.no_source_forms.is_empty());
        assert!(diagnostics.no_form_entry.is_empty());
    }

    #[test]
    fn blank_rows_remove_blocks_when_enabled() {
        let value = json!({
            "name": "Horsea",
            "riding": {"stats": {}, "seats": [], "controller": {"key": "cobblemon:water/boat"}}
        });
        let blank = rows(&[&[
            ("Species", "Horsea"),
            ("Composite", "N/A"),
            ("Land", "N/A"),
            ("Water", "Boat"),
            ("Flying", "N/A"),
        ]]);

        let mut horsea = record(value.clone(), "riding");
        let diagnostics = merge(&mut horsea, &blank, &RidingBuilder, true);
        assert_eq!(horsea.to_value(), json!({"name": "Horsea"}));
        assert_eq!(diagnostics.removed.len(), 1);

        let mut horsea = record(value.clone(), "riding");
        merge(&mut horsea, &blank, &RidingBuilder, false);
        assert_eq!(horsea.to_value(), value);
    }

    #[test]
    fn merging_twice_is_stable() {
        let mut record = record(
            json!({
                "name": "Dragonite",
                "riding": {"seats": [{"offset": [0, 1, 0]}], "controller": {"key": "cobblemon:air/bird", "lift": 2}},
                "forms": [{"name": "Mega"}]
            }),
            "riding",
        );
        let rows = rows(&[
            &[
                ("Species", "Dragonite"),
                ("Composite", "N/A"),
                ("Land", "Standard"),
                ("Water", "N/A"),
                ("Flying", "Bird"),
                ("Min", "1"),
                ("Max", "3"),
                ("Min.10", "2"),
                ("Max.10", "5"),
            ],
            &[
                ("Species", "Dragonite [Mega]"),
                ("Composite", "N/A"),
                ("Land", "N/A"),
                ("Water", "N/A"),
                ("Flying", "Bird"),
                ("Min.10", "4"),
                ("Max.10", "6"),
            ],
        ]);
        merge(&mut record, &rows, &RidingBuilder, true);
        let once = record.to_pretty_string().unwrap();
        merge(&mut record, &rows, &RidingBuilder, true);
        assert_eq!(record.to_pretty_string().unwrap(), once);

        let value = record.to_value();
        assert_eq!(value["riding"]["controller"], json!({"key": "cobblemon:land/generic"}));
        assert_eq!(
            value["forms"][0]["riding"]["controller"],
            json!({"key": "cobblemon:air/bird"})
        );
        assert_eq!(
            value["forms"][0]["riding"]["stats"]["SPEED"]["ranges"],
            json!("4-6")
        );
    }
}
