use std::cell::Cell;
use std::rc::Rc;

use log::debug;

use crate::signals::{Observable, Signal};
use crate::Field;

/// Facade of the upstream causal data store.
///
/// Supplies the universe of selectable fields and announces every recomputation
/// of the merged causal graph. The graph content itself is not exposed here,
/// only the revision number of each recomputation.
#[derive(Clone, Debug, Default)]
pub struct CausalStore {
    fields: Observable<Vec<Field>>,
    graph_recomputed: Signal<u64>,
    revision: Rc<Cell<u64>>,
}

impl CausalStore {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields: Observable::new(fields),
            ..Default::default()
        }
    }

    pub fn fields(&self) -> Vec<Field> {
        self.fields.get()
    }

    pub fn fields_signal(&self) -> &Observable<Vec<Field>> {
        &self.fields
    }

    pub fn set_fields(&self, fields: Vec<Field>) {
        debug!("upstream field universe replaced with {} fields", fields.len());
        self.fields.set(fields);
    }

    pub fn graph_recomputed(&self) -> &Signal<u64> {
        &self.graph_recomputed
    }

    /// Bumps the graph revision and notifies subscribers. Returns the new revision.
    pub fn notify_graph_recomputed(&self) -> u64 {
        let revision = self.revision.get() + 1;
        self.revision.set(revision);
        debug!("upstream causal graph recomputed, revision {revision}");
        self.graph_recomputed.emit(&revision);
        revision
    }
}
