//! Node selection state and rendering-surface synchronisation for causal graph
//! exploration.
//!
//! [`CausalViewStore`] tracks which fields are selected and how many may be.
//! [`GraphSync`] drives a [`surface::RenderSurface`] from the store's selection,
//! the graph payload and the viewport, deriving focus and fade states.

mod field;
mod field_index;
mod render_data;
mod settings;
mod sync;
mod upstream;
mod view_store;

pub mod highlight;
pub mod layouts;
pub mod signals;
pub mod surface;

pub use self::field::{Fid, Field};
pub use self::field_index::{node_id, FieldIndex, ResolveError};
pub use self::render_data::{CausalLink, EdgeKind, RenderData, RenderEdge, RenderNode};
pub use self::settings::{
    interaction_mode_name, CircularParams, FruchtermanParams, GraphConfig, GraphMode,
    LayoutConfig, SettingsResize, GRAPH_HEIGHT,
};
pub use self::sync::{EdgeClick, EdgeClickFn, GraphSync, NodeClickFn, SyncProps};
pub use self::upstream::CausalStore;
pub use self::view_store::{
    resolve_selection, CausalViewStore, ExplorationKey, NodeSelectionMode,
};
