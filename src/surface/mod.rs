//! Contract of the rendering engine the graph sync layer drives.
//!
//! The engine owns drawing, layout and hit testing. [`RenderSurface`] lists the
//! operations the sync layer relies on; [`MemorySurface`] is a headless
//! implementation backed by petgraph.

mod events;
mod memory;

pub use events::{EventSink, FnSink, PayloadEdgeClick, PayloadNodeClick, SurfaceEvent, SurfaceEventKind};
pub use memory::{MemoryContainer, MemoryItem, MemorySurface, SurfaceStats};

use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::{GraphConfig, LayoutConfig, RenderData};

pub const LABEL_WEIGHT_FOCUSED: u16 = 600;
pub const LABEL_WEIGHT_NORMAL: u16 = 400;

/// Identity of a container a surface is attached to.
pub type ContainerId = u64;

/// Host element a surface draws into.
///
/// Handles are cheap clones referring to the same element.
pub trait SurfaceContainer: Clone {
    fn id(&self) -> ContainerId;

    /// Removes everything a surface attached to the element.
    fn clear(&self);
}

/// Visual state flags of a node or edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemState {
    Focused,
    Highlighted,
    Faded,
}

/// Label styling of a node or edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemStyle {
    pub label_opacity: f32,

    /// Font weight, `None` leaves the engine default
    pub label_weight: Option<u16>,
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self {
            label_opacity: 1.,
            label_weight: None,
        }
    }
}

/// Hook run by [`RenderSurface::update_layout`] after every layout iteration.
pub type TickHook<S> = fn(&mut S);

pub trait RenderSurface: Sized {
    type Container: SurfaceContainer;

    /// Handle of a node or an edge.
    type Item: Clone + Eq + Hash;

    /// Creates a surface attached to `container`.
    fn create(config: &GraphConfig, container: &Self::Container) -> Self;

    /// Loads data. Layout runs on the next [`RenderSurface::render`].
    fn set_data(&mut self, data: &RenderData);

    /// Replaces data keeping positions of nodes that persist.
    fn change_data(&mut self, data: &RenderData);

    fn render(&mut self);

    /// Redraws items without touching the layout.
    fn refresh(&mut self);

    /// Redraws items at their current positions.
    fn refresh_positions(&mut self);

    fn resize(&mut self, width: f32, height: f32);

    /// Replaces the layout and runs it, calling `on_tick` after each iteration.
    fn update_layout(&mut self, layout: &LayoutConfig, on_tick: Option<TickHook<Self>>);

    fn set_interaction_mode(&mut self, name: &str);

    /// Registers `sink` for events of `kind`.
    fn on(&mut self, kind: SurfaceEventKind, sink: Box<dyn EventSink>);

    fn nodes(&self) -> Vec<Self::Item>;

    fn edges(&self) -> Vec<Self::Item>;

    /// Nodes sharing an edge with `node`, in either direction.
    fn neighbors(&self, node: &Self::Item) -> Vec<Self::Item>;

    /// Surface identity of an item, as loaded from [`RenderData`].
    fn item_id(&self, item: &Self::Item) -> Option<String>;

    /// Source and target nodes of an edge.
    fn edge_endpoints(&self, edge: &Self::Item) -> Option<(Self::Item, Self::Item)>;

    fn set_item_state(&mut self, item: &Self::Item, state: ItemState, enabled: bool);

    fn update_item_style(&mut self, item: &Self::Item, style: &ItemStyle);

    /// Releases engine resources. The surface is not used afterwards.
    fn destroy(&mut self) {}
}
