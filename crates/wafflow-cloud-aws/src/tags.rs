//! Key/value tag helpers
//!
//! Keys under the `aws:` prefix are reserved by AWS. They are never written
//! and are hidden from declared state on read.

use crate::client::Tag;
use std::collections::BTreeMap;

/// Prefix of tag keys reserved by AWS
pub const RESERVED_PREFIX: &str = "aws:";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueTags(BTreeMap<String, String>);

/// Changes needed to move a resource from one tag set to another
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagChanges {
    /// Keys present before and absent now
    pub remove: Vec<String>,
    /// Pairs that are new or whose value changed
    pub upsert: Vec<Tag>,
}

impl TagChanges {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.upsert.is_empty()
    }
}

impl KeyValueTags {
    pub fn new(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }

    /// Drop keys reserved by AWS
    pub fn ignore_aws(self) -> Self {
        Self(
            self.0
                .into_iter()
                .filter(|(k, _)| !k.starts_with(RESERVED_PREFIX))
                .collect(),
        )
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }

    pub fn to_tags(&self) -> Vec<Tag> {
        self.0.iter().map(|(k, v)| Tag::new(k, v)).collect()
    }

    /// Changes that turn `self` (old) into `new`. Reserved keys on either
    /// side are left alone.
    pub fn diff(&self, new: &KeyValueTags) -> TagChanges {
        let old = self.clone().ignore_aws();
        let new = new.clone().ignore_aws();

        let remove = old
            .0
            .keys()
            .filter(|k| !new.0.contains_key(*k))
            .cloned()
            .collect();

        let upsert = new
            .0
            .iter()
            .filter(|(k, v)| old.0.get(*k) != Some(*v))
            .map(|(k, v)| Tag::new(k, v))
            .collect();

        TagChanges { remove, upsert }
    }
}

impl From<Vec<Tag>> for KeyValueTags {
    fn from(tags: Vec<Tag>) -> Self {
        Self(tags.into_iter().map(|t| (t.key, t.value)).collect())
    }
}

impl From<&BTreeMap<String, String>> for KeyValueTags {
    fn from(map: &BTreeMap<String, String>) -> Self {
        Self(map.clone())
    }
}
