use std::collections::HashMap;

use thiserror::Error;

use crate::{Fid, Field};

/// Why a rendering-surface identity could not be mapped back to a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("surface item carries no identity")]
    Missing,
    #[error("malformed node id {0:?}")]
    Malformed(String),
    #[error("node index {index} is out of range for {len} fields")]
    OutOfRange { index: usize, len: usize },
}

/// Surface identity of the node at `index` of the field list.
pub fn node_id(index: usize) -> String {
    index.to_string()
}

/// Bidirectional mapping between positions in the field list and field identifiers.
///
/// Rendering surfaces know nodes by their position in the field list, rendered
/// as a decimal string. Every translation between that identity and a [`Fid`]
/// goes through this index.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    fids: Vec<Fid>,
    positions: HashMap<Fid, usize>,
}

impl FieldIndex {
    pub fn new(fields: &[Field]) -> Self {
        let fids: Vec<Fid> = fields.iter().map(|f| f.fid().clone()).collect();
        let mut positions = HashMap::with_capacity(fids.len());
        for (idx, fid) in fids.iter().enumerate() {
            positions.entry(fid.clone()).or_insert(idx);
        }
        Self { fids, positions }
    }

    pub fn len(&self) -> usize {
        self.fids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fids.is_empty()
    }

    /// Whether the index was built from a field list with the same identifiers in the same order.
    pub fn matches(&self, fields: &[Field]) -> bool {
        self.fids.len() == fields.len() && self.fids.iter().zip(fields).all(|(a, f)| a == f.fid())
    }

    /// # Errors
    ///
    /// [`ResolveError::OutOfRange`] when no field sits at `index`.
    pub fn fid_at(&self, index: usize) -> Result<&Fid, ResolveError> {
        self.fids.get(index).ok_or(ResolveError::OutOfRange {
            index,
            len: self.fids.len(),
        })
    }

    /// Resolves a surface node id such as `"3"`.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Malformed`] when `id` is not a decimal index,
    /// [`ResolveError::OutOfRange`] when it points past the field list.
    pub fn resolve(&self, id: &str) -> Result<&Fid, ResolveError> {
        let index = id
            .trim()
            .parse::<usize>()
            .map_err(|_| ResolveError::Malformed(id.to_string()))?;
        self.fid_at(index)
    }

    /// Like [`FieldIndex::resolve`] for items whose identity may be absent.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Missing`] when `id` is `None`, otherwise as [`FieldIndex::resolve`].
    pub fn resolve_item(&self, id: Option<&str>) -> Result<&Fid, ResolveError> {
        self.resolve(id.ok_or(ResolveError::Missing)?)
    }

    pub fn index_of(&self, fid: &Fid) -> Option<usize> {
        self.positions.get(fid).copied()
    }

    /// Surface node id of `fid`.
    pub fn node_id_of(&self, fid: &Fid) -> Option<String> {
        self.index_of(fid).map(node_id)
    }
}
