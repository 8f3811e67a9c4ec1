use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::signals::{Disposables, Signal};
use crate::upstream::CausalStore;
use crate::{Fid, Field};

/// Active mode of the exploration UI. Drives the permitted selection cardinality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplorationKey {
    #[default]
    #[serde(rename = "AutoVis")]
    AutoVisualize,
    CrossFilter,
    CausalInsight,
    GraphicWalker,
    #[serde(rename = "predict")]
    Predict,
}

impl ExplorationKey {
    /// All keys in menu order.
    pub const ALL: [Self; 5] = [
        Self::AutoVisualize,
        Self::CrossFilter,
        Self::CausalInsight,
        Self::GraphicWalker,
        Self::Predict,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutoVisualize => "AutoVis",
            Self::CrossFilter => "CrossFilter",
            Self::CausalInsight => "CausalInsight",
            Self::GraphicWalker => "GraphicWalker",
            Self::Predict => "predict",
        }
    }

    /// Selection mode forced by switching to this key while `current` is active.
    pub fn selection_mode(self, current: NodeSelectionMode) -> NodeSelectionMode {
        match self {
            Self::AutoVisualize => match current {
                NodeSelectionMode::None => NodeSelectionMode::Single,
                other => other,
            },
            Self::CausalInsight | Self::Predict => NodeSelectionMode::Single,
            Self::CrossFilter => NodeSelectionMode::Multiple,
            Self::GraphicWalker => NodeSelectionMode::None,
        }
    }
}

/// How many graph nodes may be selected at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeSelectionMode {
    None,
    #[default]
    Single,
    Multiple,
}

/// Resolves selected identifiers against the field universe, keeping selection order.
/// Identifiers without a matching field are dropped with a warning.
pub fn resolve_selection(fids: &[Fid], universe: &[Field]) -> Vec<Field> {
    fids.iter()
        .filter_map(|fid| {
            let field = universe.iter().find(|f| f.fid() == fid);
            if field.is_none() {
                warn!(
                    "select node warning: cannot find field {fid} among {} fields",
                    universe.len()
                );
            }
            field.cloned()
        })
        .collect()
}

#[derive(Debug, Default)]
struct ViewState {
    exploration_key: ExplorationKey,
    mode: NodeSelectionMode,
    selected: Vec<Fid>,
    universe: Vec<Field>,
}

impl ViewState {
    fn new(universe: Vec<Field>) -> Self {
        Self {
            universe,
            ..Default::default()
        }
    }

    /// Replaces the selection, purging identifiers missing from the universe.
    fn commit(&mut self, fids: &[Fid]) -> Vec<Field> {
        let resolved = resolve_selection(fids, &self.universe);
        self.selected = resolved.iter().map(|f| f.fid().clone()).collect();
        resolved
    }

    /// Applies the mode and trims the selection to fit it.
    /// Returns the new selection when it changed.
    fn apply_mode(&mut self, mode: NodeSelectionMode) -> Option<Vec<Field>> {
        self.mode = mode;
        let trimmed = match mode {
            NodeSelectionMode::Single => {
                let keep_from = self.selected.len().saturating_sub(1);
                self.selected[keep_from..].to_vec()
            }
            NodeSelectionMode::Multiple => return None,
            NodeSelectionMode::None => Vec::new(),
        };
        if trimmed == self.selected {
            return None;
        }
        Some(self.commit(&trimmed))
    }
}

/// Selection store of one causal exploration session.
///
/// Holds the exploration key, the node selection mode and the ordered selection.
/// The selection is cleared whenever the upstream field universe changes or the
/// causal graph is recomputed. Subscriptions to the upstream are released by
/// [`CausalViewStore::destroy`] or on drop.
#[derive(Debug)]
pub struct CausalViewStore {
    state: Rc<RefCell<ViewState>>,
    selection_changed: Signal<Vec<Field>>,
    subscriptions: Disposables,
}

impl CausalViewStore {
    pub fn new(upstream: &CausalStore) -> Self {
        let state = Rc::new(RefCell::new(ViewState::new(upstream.fields())));
        let selection_changed = Signal::new();
        let mut subscriptions = Disposables::default();

        subscriptions.push(upstream.fields_signal().subscribe({
            let state = Rc::downgrade(&state);
            let selection_changed = selection_changed.clone();
            move |fields: &Vec<Field>| {
                let Some(state) = state.upgrade() else {
                    return;
                };
                let cleared = {
                    let mut state = state.borrow_mut();
                    state.universe.clone_from(fields);
                    state.commit(&[])
                };
                debug!("field universe changed, selection cleared");
                selection_changed.emit(&cleared);
            }
        }));

        subscriptions.push(upstream.graph_recomputed().connect({
            let state = Rc::downgrade(&state);
            let selection_changed = selection_changed.clone();
            move |revision: &u64| {
                let Some(state) = state.upgrade() else {
                    return;
                };
                let cleared = state.borrow_mut().commit(&[]);
                debug!("causal graph revision {revision}, selection cleared");
                selection_changed.emit(&cleared);
            }
        }));

        Self {
            state,
            selection_changed,
            subscriptions,
        }
    }

    pub fn exploration_key(&self) -> ExplorationKey {
        self.state.borrow().exploration_key
    }

    pub fn node_selection_mode(&self) -> NodeSelectionMode {
        self.state.borrow().mode
    }

    /// Sets the key and re-derives the selection mode from it, even if the key is unchanged.
    pub fn set_exploration_key(&mut self, key: ExplorationKey) {
        let mode = {
            let mut state = self.state.borrow_mut();
            state.exploration_key = key;
            key.selection_mode(state.mode)
        };
        debug!("exploration key set to {}, selection mode {mode:?}", key.as_str());
        self.set_node_selection_mode(mode);
    }

    /// Sets the mode directly: `Single` keeps only the last selected node,
    /// `None` clears, `Multiple` leaves the selection untouched.
    pub fn set_node_selection_mode(&mut self, mode: NodeSelectionMode) {
        let changed = self.state.borrow_mut().apply_mode(mode);
        if let Some(selection) = changed {
            self.selection_changed.emit(&selection);
        }
    }

    /// Toggles `fid` according to the current mode.
    ///
    /// In `Single` mode returns `Some(true)` when the node became selected and
    /// `Some(false)` when it was the selected node and got deselected. `Multiple`
    /// and `None` return `None`; read [`CausalViewStore::selected_field_group`] for
    /// the outcome.
    pub fn toggle_node_selected(&mut self, fid: &Fid) -> Option<bool> {
        let mode = self.node_selection_mode();
        match mode {
            NodeSelectionMode::Single => {
                let deselect = self
                    .selected_field()
                    .is_some_and(|field| field.fid() == fid);
                if deselect {
                    self.select(&[]);
                } else {
                    self.select(std::slice::from_ref(fid));
                }
                Some(!deselect)
            }
            NodeSelectionMode::Multiple => {
                let mut fids: Vec<Fid> = self
                    .selected_field_group()
                    .into_iter()
                    .map(|field| field.fid().clone())
                    .collect();
                match fids.iter().position(|f| f == fid) {
                    Some(idx) => {
                        fids.remove(idx);
                    }
                    None => fids.push(fid.clone()),
                }
                self.select(&fids);
                None
            }
            NodeSelectionMode::None => None,
        }
    }

    /// Empties the selection regardless of the mode.
    pub fn clear_selected(&mut self) {
        self.select(&[]);
    }

    /// Selected fields in selection order, resolved against the current universe.
    pub fn selected_field_group(&self) -> Vec<Field> {
        let state = self.state.borrow();
        resolve_selection(&state.selected, &state.universe)
    }

    /// First selected field.
    pub fn selected_field(&self) -> Option<Field> {
        self.selected_field_group().into_iter().next()
    }

    pub fn selected_fids(&self) -> Vec<Fid> {
        self.state.borrow().selected.clone()
    }

    pub fn universe(&self) -> Vec<Field> {
        self.state.borrow().universe.clone()
    }

    /// Emitted with the resolved selection after every committed change.
    pub fn selection_changed(&self) -> &Signal<Vec<Field>> {
        &self.selection_changed
    }

    /// Releases the upstream subscriptions. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.subscriptions.dispose() {
            debug!("causal view store destroyed");
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.subscriptions.is_disposed()
    }

    fn select(&mut self, fids: &[Fid]) {
        let selection = self.state.borrow_mut().commit(fids);
        self.selection_changed.emit(&selection);
    }
}
