//! The ordered filtered motif set.
//!
//! The order of the ids in the set is the row/column order of the
//! distance matrix and the label order handed to the dendrogram. The set
//! keeps an explicit id -> index map so lookups never depend on the
//! iteration order of some other container.

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ModelError, ModelResult};
use crate::MotifId;

/// Ordered, duplicate-free sequence of motif ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<MotifId>", try_from = "Vec<MotifId>")]
pub struct MotifSet {
    ids: Vec<MotifId>,
    index: HashMap<MotifId, usize>,
}

impl MotifSet {
    /// Build a set from ids in matrix order.
    ///
    /// Fails on the first repeated id: a repeated id would produce two
    /// identical rows and an ambiguous label mapping.
    pub fn new(ids: Vec<MotifId>) -> ModelResult<Self> {
        let mut index = HashMap::with_capacity(ids.len());
        for (position, id) in ids.iter().enumerate() {
            if index.insert(*id, position).is_some() {
                return Err(ModelError::DuplicateMotif(*id));
            }
        }
        Ok(Self { ids, index })
    }

    /// Convenience constructor from raw ids.
    pub fn from_ids(ids: impl IntoIterator<Item = u32>) -> ModelResult<Self> {
        Self::new(ids.into_iter().map(MotifId).collect())
    }

    /// Ids in matrix order.
    pub fn ids(&self) -> &[MotifId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Matrix index of a motif id.
    pub fn index_of(&self, id: MotifId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Motif id at a matrix index.
    pub fn motif_at(&self, index: usize) -> Option<MotifId> {
        self.ids.get(index).copied()
    }

    pub fn contains(&self, id: MotifId) -> bool {
        self.index.contains_key(&id)
    }

    /// Keep the ids matching `keep`, preserving their relative order.
    pub fn retain(&self, mut keep: impl FnMut(MotifId) -> bool) -> Self {
        let ids: Vec<MotifId> = self.ids.iter().copied().filter(|id| keep(*id)).collect();
        let index = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        Self { ids, index }
    }

    pub fn iter(&self) -> impl Iterator<Item = MotifId> + '_ {
        self.ids.iter().copied()
    }
}

impl From<MotifSet> for Vec<MotifId> {
    fn from(set: MotifSet) -> Self {
        set.ids
    }
}

impl TryFrom<Vec<MotifId>> for MotifSet {
    type Error = ModelError;

    fn try_from(ids: Vec<MotifId>) -> Result<Self, Self::Error> {
        Self::new(ids)
    }
}

impl JsonSchema for MotifSet {
    fn schema_name() -> String {
        "MotifSet".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        <Vec<MotifId>>::json_schema(gen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_preserved() {
        let set = MotifSet::from_ids([7, 2, 11]).unwrap();
        assert_eq!(set.ids(), &[MotifId(7), MotifId(2), MotifId(11)]);
        assert_eq!(set.index_of(MotifId(2)), Some(1));
        assert_eq!(set.motif_at(2), Some(MotifId(11)));
        assert_eq!(set.index_of(MotifId(3)), None);
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = MotifSet::from_ids([1, 2, 1]).unwrap_err();
        assert_eq!(err, ModelError::DuplicateMotif(MotifId(1)));
    }

    #[test]
    fn test_retain_reindexes() {
        let set = MotifSet::from_ids([4, 5, 6, 7]).unwrap();
        let kept = set.retain(|id| id != MotifId(5));
        assert_eq!(kept.ids(), &[MotifId(4), MotifId(6), MotifId(7)]);
        assert_eq!(kept.index_of(MotifId(6)), Some(1));
        assert!(!kept.contains(MotifId(5)));
    }

    #[test]
    fn test_serde_as_plain_list() {
        let set = MotifSet::from_ids([3, 1]).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[3,1]");

        let back: MotifSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert!(serde_json::from_str::<MotifSet>("[1,1]").is_err());
    }
}
