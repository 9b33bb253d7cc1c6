use std::collections::BTreeMap;

use crate::ast::{Blocks, Inlines};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Document-level metadata value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetaValue {
    Inlines(Inlines),
    Blocks(Blocks),
    List(Vec<MetaValue>),
    Str(String),
}

/// Document-level metadata: key → value.
///
/// Scalar keys overwrite on re-assignment; list keys accumulate. The reader
/// decides which keys are list-typed and uses [`Meta::append`] for those.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Meta(pub BTreeMap<String, MetaValue>);

impl Meta {
    pub fn new() -> Self {
        Meta::default()
    }

    /// Set a scalar key, replacing any earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: MetaValue) {
        self.0.insert(key.into(), value);
    }

    /// Append to a list-typed key, promoting an existing scalar to a list.
    pub fn append(&mut self, key: impl Into<String>, value: MetaValue) {
        let key = key.into();
        match self.0.remove(&key) {
            Some(MetaValue::List(mut items)) => {
                items.push(value);
                self.0.insert(key, MetaValue::List(items));
            }
            Some(existing) => {
                self.0.insert(key, MetaValue::List(vec![existing, value]));
            }
            None => {
                self.0.insert(key, MetaValue::List(vec![value]));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A complete document: metadata plus block content.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Document {
    pub meta: Meta,
    pub blocks: Blocks,
}
