//! Typed view of a species file.
//!
//! Only `name`, `forms` and the attribute block are interpreted. Every other
//! field rides along in an ordered `extra` bag, and each node remembers the
//! key order it was read with so a rewrite only moves what the merge touched.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::ReconError;

/// Domain attribute block (`behaviour`, `riding`, …): ordered JSON object.
pub type AttributeBlock = Map<String, Value>;

const NAME: &str = "name";
const FORMS: &str = "forms";

// ---------------------------------------------------------------------------
// Node: fields shared by entity and form records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Node {
    name: String,
    block: Option<AttributeBlock>,
    extra: Map<String, Value>,
    key_order: Vec<String>,
}

impl Node {
    fn from_object(
        mut object: Map<String, Value>,
        block_key: &str,
        path: &Path,
        what: &str,
    ) -> Result<(Self, Option<Value>), ReconError> {
        let key_order: Vec<String> = object.keys().cloned().collect();

        let name = match object.remove(NAME) {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(malformed(path, format!("{what} 'name' is not a string: {other}")))
            }
            None => return Err(malformed(path, format!("{what} has no 'name'"))),
        };

        let block = match object.remove(block_key) {
            Some(Value::Object(block)) => Some(block),
            Some(Value::Null) => {
                // Written back as null unless a merge assigns a block.
                object.insert(block_key.into(), Value::Null);
                None
            }
            None => None,
            Some(other) => {
                return Err(malformed(
                    path,
                    format!("{what} '{block_key}' is not an object: {other}"),
                ))
            }
        };

        let forms = object.remove(FORMS);

        Ok((
            Self {
                name,
                block,
                extra: object,
                key_order,
            },
            forms,
        ))
    }

    /// Rebuild the JSON object in source key order. `forms` is only passed
    /// for the entity node.
    fn to_object(&self, block_key: &str, forms: Option<Value>) -> Map<String, Value> {
        let mut out = Map::new();
        let mut forms = forms;

        for key in &self.key_order {
            if key == NAME {
                out.insert(NAME.into(), Value::String(self.name.clone()));
            } else if key == block_key && self.block.is_some() {
                if let Some(ref block) = self.block {
                    out.insert(block_key.into(), Value::Object(block.clone()));
                }
            } else if key == FORMS && forms.is_some() {
                if let Some(forms) = forms.take() {
                    out.insert(FORMS.into(), forms);
                }
            } else if let Some(value) = self.extra.get(key) {
                out.insert(key.clone(), value.clone());
            }
        }

        if !out.contains_key(NAME) {
            out.insert(NAME.into(), Value::String(self.name.clone()));
        }
        if let Some(forms) = forms {
            out.insert(FORMS.into(), forms);
        }
        if !out.contains_key(block_key) {
            if let Some(ref block) = self.block {
                out.insert(block_key.into(), Value::Object(block.clone()));
            }
        }
        out
    }
}

fn malformed(path: &Path, message: String) -> ReconError {
    ReconError::MalformedRecord {
        path: path.to_path_buf(),
        message,
    }
}

// ---------------------------------------------------------------------------
// FormRecord
// ---------------------------------------------------------------------------

/// A named variant nested in an entity's `forms` list.
#[derive(Debug, Clone, PartialEq)]
pub struct FormRecord {
    node: Node,
}

impl FormRecord {
    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn block(&self) -> Option<&AttributeBlock> {
        self.node.block.as_ref()
    }

    pub fn take_block(&mut self) -> Option<AttributeBlock> {
        self.node.block.take()
    }

    pub fn block_slot_mut(&mut self) -> &mut Option<AttributeBlock> {
        &mut self.node.block
    }
}

// ---------------------------------------------------------------------------
// EntityRecord
// ---------------------------------------------------------------------------

/// One species file.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    node: Node,
    block_key: String,
    /// `None` when the file has no `forms` key.
    forms: Option<Vec<FormRecord>>,
}

impl EntityRecord {
    /// Parse file contents. A leading UTF-8 BOM is accepted.
    pub fn parse(text: &str, block_key: &str, path: &Path) -> Result<Self, ReconError> {
        let text = text.trim_start_matches('\u{feff}');
        let value: Value = serde_json::from_str(text).map_err(|e| ReconError::RecordParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_value(value, block_key, path)
    }

    pub fn from_value(value: Value, block_key: &str, path: &Path) -> Result<Self, ReconError> {
        let Value::Object(object) = value else {
            return Err(malformed(path, "top level is not an object".into()));
        };

        let (mut node, forms) = Node::from_object(object, block_key, path, "record")?;

        let forms = match forms {
            None => None,
            Some(Value::Null) => {
                node.extra.insert(FORMS.into(), Value::Null);
                None
            }
            Some(Value::Array(items)) => {
                let mut parsed = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    let Value::Object(object) = item else {
                        return Err(malformed(path, format!("forms[{i}] is not an object")));
                    };
                    let what = format!("forms[{i}]");
                    let (node, nested) = Node::from_object(object, block_key, path, &what)?;
                    let mut node = node;
                    if let Some(nested) = nested {
                        node.extra.insert(FORMS.into(), nested);
                    }
                    parsed.push(FormRecord { node });
                }
                Some(parsed)
            }
            Some(other) => return Err(malformed(path, format!("'forms' is not a list: {other}"))),
        };

        Ok(Self {
            node,
            block_key: block_key.to_string(),
            forms,
        })
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn block(&self) -> Option<&AttributeBlock> {
        self.node.block.as_ref()
    }

    pub fn block_slot_mut(&mut self) -> &mut Option<AttributeBlock> {
        &mut self.node.block
    }

    pub fn forms(&self) -> &[FormRecord] {
        self.forms.as_deref().unwrap_or(&[])
    }

    pub fn forms_mut(&mut self) -> impl Iterator<Item = &mut FormRecord> {
        self.forms.iter_mut().flat_map(|forms| forms.iter_mut())
    }

    pub fn form_mut(&mut self, name: &str) -> Option<&mut FormRecord> {
        self.forms_mut().find(|f| f.name() == name)
    }

    pub fn to_value(&self) -> Value {
        let forms = self.forms.as_ref().map(|forms| {
            Value::Array(
                forms
                    .iter()
                    .map(|form| {
                        // A nested `forms` key inside a form stays in `extra`.
                        let mut node = form.node.clone();
                        let nested = node.extra.remove(FORMS);
                        Value::Object(node.to_object(&self.block_key, nested))
                    })
                    .collect(),
            )
        });
        Value::Object(self.node.to_object(&self.block_key, forms))
    }

    /// File contents: two-space indentation, non-ASCII kept as-is.
    pub fn to_pretty_string(&self) -> Result<String, ReconError> {
        serde_json::to_string_pretty(&self.to_value())
            .map_err(|e| ReconError::Serialize(e.to_string()))
    }
}
