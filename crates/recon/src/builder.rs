use crate::behaviour::BehaviourBuilder;
use crate::config::Domain;
use crate::record::AttributeBlock;
use crate::riding::RidingBuilder;
use crate::table::TabularRow;

/// Turns one sheet row into the attribute block of a species or form.
pub trait AttributeBuilder {
    /// Key the block lives under in species files.
    fn block_key(&self) -> &'static str;

    /// Columns that must be in the sheet header. Other columns read as
    /// blank (the default) when absent.
    fn required_columns(&self) -> &'static [&'static str];

    /// A blank row carries no attribute values at all.
    fn is_blank(&self, row: &TabularRow) -> bool;

    /// Build the block for `row`. Riding merges into `existing` to keep tuned
    /// fields; behaviour replaces it outright.
    fn build(&self, row: &TabularRow, existing: Option<AttributeBlock>) -> AttributeBlock;
}

pub fn builder_for(domain: Domain) -> Box<dyn AttributeBuilder> {
    match domain {
        Domain::Behaviour => Box::new(BehaviourBuilder),
        Domain::Riding => Box::new(RidingBuilder),
    }
}
