use std::collections::BTreeMap;

use crate::keys::{split_display_name, EntityKey, FormName};
use crate::table::TabularRow;

/// A sheet row tagged with the form it describes.
#[derive(Debug, Clone)]
pub struct GroupedRow {
    pub form: FormName,
    pub row: TabularRow,
}

/// Rows per species, in sheet order within each species.
pub type GroupedRows = BTreeMap<EntityKey, Vec<GroupedRow>>;

/// Group rows by the species named in `name_column`. Rows with an empty
/// name are dropped.
pub fn group_rows(rows: &[TabularRow], name_column: &str) -> GroupedRows {
    let mut groups: GroupedRows = BTreeMap::new();

    for row in rows {
        let display = row.cell(name_column).text();
        let (species, discriminator) = split_display_name(display);
        let key = EntityKey::from_display(species);
        if key.is_empty() {
            continue;
        }

        groups.entry(key).or_default().push(GroupedRow {
            form: FormName::from_discriminator(discriminator),
            row: row.clone(),
        });
    }

    groups
}
