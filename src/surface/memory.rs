use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use egui::{Pos2, Rect, Vec2};
use log::{debug, trace};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use rand::Rng;

use super::{
    ContainerId, EventSink, ItemState, ItemStyle, PayloadEdgeClick, PayloadNodeClick,
    RenderSurface, SurfaceContainer, SurfaceEvent, SurfaceEventKind, TickHook,
};
use crate::layouts::{circular_positions, CircularSpacing, FruchtermanReingold};
use crate::{EdgeKind, GraphConfig, LayoutConfig, RenderData};

const SPAWN_SIZE: f32 = 250.;

/// In-memory host element. Clones share the same element.
#[derive(Debug, Clone)]
pub struct MemoryContainer {
    inner: Rc<ContainerInner>,
}

#[derive(Debug)]
struct ContainerInner {
    id: ContainerId,
    content: RefCell<Option<String>>,
    attach_count: Cell<usize>,
}

impl MemoryContainer {
    pub fn new(id: ContainerId) -> Self {
        Self {
            inner: Rc::new(ContainerInner {
                id,
                content: RefCell::new(None),
                attach_count: Cell::new(0),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.content.borrow().is_none()
    }

    pub fn content(&self) -> Option<String> {
        self.inner.content.borrow().clone()
    }

    /// How many surfaces were ever attached to this element.
    pub fn attach_count(&self) -> usize {
        self.inner.attach_count.get()
    }

    fn attach(&self, content: &str) {
        self.inner.content.replace(Some(content.to_string()));
        self.inner.attach_count.set(self.inner.attach_count.get() + 1);
    }
}

impl SurfaceContainer for MemoryContainer {
    fn id(&self) -> ContainerId {
        self.inner.id
    }

    fn clear(&self) {
        self.inner.content.replace(None);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryItem {
    Node(NodeIndex),
    Edge(EdgeIndex),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct StateFlags {
    focused: bool,
    highlighted: bool,
    faded: bool,
}

impl StateFlags {
    fn set(&mut self, state: ItemState, enabled: bool) {
        match state {
            ItemState::Focused => self.focused = enabled,
            ItemState::Highlighted => self.highlighted = enabled,
            ItemState::Faded => self.faded = enabled,
        }
    }

    fn contains(self, state: ItemState) -> bool {
        match state {
            ItemState::Focused => self.focused,
            ItemState::Highlighted => self.highlighted,
            ItemState::Faded => self.faded,
        }
    }
}

#[derive(Debug, Clone)]
struct SurfaceNode {
    id: String,
    label: String,
    location: Pos2,
    states: StateFlags,
    style: ItemStyle,
}

#[derive(Debug, Clone)]
struct SurfaceEdge {
    kind: EdgeKind,
    weight: Option<f32>,
    states: StateFlags,
    style: ItemStyle,
}

/// Counters of the drawing work a surface was asked to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    pub data_loads: usize,
    pub data_changes: usize,
    pub renders: usize,
    pub refreshes: usize,
    pub position_refreshes: usize,
    pub resizes: usize,
    pub layout_runs: usize,
}

/// Headless rendering surface backed by a petgraph [`StableGraph`].
///
/// Runs the same layouts a drawing engine would and keeps item states and
/// styles for inspection. Clicks are simulated with [`MemorySurface::click_node`]
/// and [`MemorySurface::click_edge`].
pub struct MemorySurface {
    g: StableGraph<SurfaceNode, SurfaceEdge>,
    container: MemoryContainer,
    config: GraphConfig,
    layout: LayoutConfig,
    size: Vec2,
    mode: String,
    layout_pending: bool,
    sinks: Vec<(SurfaceEventKind, Box<dyn EventSink>)>,
    stats: SurfaceStats,
    destroyed: bool,
}

impl fmt::Debug for MemorySurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySurface")
            .field("container", &self.container.id())
            .field("nodes", &self.g.node_count())
            .field("edges", &self.g.edge_count())
            .field("size", &self.size)
            .field("mode", &self.mode)
            .field("stats", &self.stats)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl MemorySurface {
    pub fn click_node(&self, id: &str) {
        self.emit(&SurfaceEvent::NodeClick(PayloadNodeClick {
            id: Some(id.to_string()),
        }));
    }

    pub fn click_edge(&self, source: &str, target: &str) {
        self.emit(&SurfaceEvent::EdgeClick(PayloadEdgeClick {
            source: Some(source.to_string()),
            target: Some(target.to_string()),
        }));
    }

    /// Delivers `event` to every sink registered for its kind.
    pub fn emit(&self, event: &SurfaceEvent) {
        let kind = event.kind();
        for (_, sink) in self.sinks.iter().filter(|(k, _)| *k == kind) {
            sink.send(event.clone());
        }
    }

    pub fn node_by_id(&self, id: &str) -> Option<MemoryItem> {
        self.g
            .node_indices()
            .find(|idx| self.g.node_weight(*idx).is_some_and(|n| n.id == id))
            .map(MemoryItem::Node)
    }

    /// Edge between two nodes, in either direction.
    pub fn edge_between(&self, a: &str, b: &str) -> Option<MemoryItem> {
        let (Some(MemoryItem::Node(a)), Some(MemoryItem::Node(b))) =
            (self.node_by_id(a), self.node_by_id(b))
        else {
            return None;
        };
        self.g
            .find_edge_undirected(a, b)
            .map(|(idx, _)| MemoryItem::Edge(idx))
    }

    pub fn has_state(&self, item: &MemoryItem, state: ItemState) -> bool {
        self.flags(*item).is_some_and(|flags| flags.contains(state))
    }

    pub fn item_style(&self, item: &MemoryItem) -> Option<ItemStyle> {
        match *item {
            MemoryItem::Node(idx) => self.g.node_weight(idx).map(|n| n.style),
            MemoryItem::Edge(idx) => self.g.edge_weight(idx).map(|e| e.style),
        }
    }

    pub fn location(&self, item: &MemoryItem) -> Option<Pos2> {
        match *item {
            MemoryItem::Node(idx) => self.g.node_weight(idx).map(|n| n.location),
            MemoryItem::Edge(_) => None,
        }
    }

    pub fn label(&self, item: &MemoryItem) -> Option<&str> {
        match *item {
            MemoryItem::Node(idx) => self.g.node_weight(idx).map(|n| n.label.as_str()),
            MemoryItem::Edge(_) => None,
        }
    }

    pub fn edge_kind(&self, item: &MemoryItem) -> Option<(EdgeKind, Option<f32>)> {
        match *item {
            MemoryItem::Edge(idx) => self.g.edge_weight(idx).map(|e| (e.kind, e.weight)),
            MemoryItem::Node(_) => None,
        }
    }

    pub fn interaction_mode(&self) -> &str {
        &self.mode
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }

    pub fn node_count(&self) -> usize {
        self.g.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.g.edge_count()
    }

    pub fn container_id(&self) -> ContainerId {
        self.container.id()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn flags(&self, item: MemoryItem) -> Option<StateFlags> {
        match item {
            MemoryItem::Node(idx) => self.g.node_weight(idx).map(|n| n.states),
            MemoryItem::Edge(idx) => self.g.edge_weight(idx).map(|e| e.states),
        }
    }

    fn view(&self) -> Rect {
        let size = if self.size.x > 0. && self.size.y > 0. {
            self.size
        } else {
            Vec2::splat(SPAWN_SIZE)
        };
        Rect::from_min_size(Pos2::ZERO, size)
    }

    /// Rebuilds the graph from `data`. Nodes found in `previous` keep their location,
    /// the others spawn at random.
    fn load(&mut self, data: &RenderData, previous: &HashMap<String, Pos2>) {
        let mut rng = rand::rng();
        let mut g = StableGraph::with_capacity(data.node_count(), data.edge_count());
        let mut by_id = HashMap::with_capacity(data.node_count());

        for node in &data.nodes {
            let location = previous.get(&node.id).copied().unwrap_or_else(|| {
                Pos2::new(
                    rng.random_range(0. ..SPAWN_SIZE),
                    rng.random_range(0. ..SPAWN_SIZE),
                )
            });
            let idx = g.add_node(SurfaceNode {
                id: node.id.clone(),
                label: node.label.clone(),
                location,
                states: StateFlags::default(),
                style: ItemStyle::default(),
            });
            by_id.insert(node.id.as_str(), idx);
        }

        for edge in &data.edges {
            let (Some(&source), Some(&target)) =
                (by_id.get(edge.source.as_str()), by_id.get(edge.target.as_str()))
            else {
                debug!(
                    "memory surface: edge {} -> {} references an unknown node",
                    edge.source, edge.target
                );
                continue;
            };
            g.add_edge(
                source,
                target,
                SurfaceEdge {
                    kind: edge.kind,
                    weight: edge.weight,
                    states: StateFlags::default(),
                    style: ItemStyle::default(),
                },
            );
        }

        self.g = g;
    }

    fn run_layout(&mut self, layout: &LayoutConfig, on_tick: Option<TickHook<Self>>) {
        let indices: Vec<NodeIndex> = self.g.node_indices().collect();
        if indices.is_empty() {
            return;
        }
        let slot: HashMap<NodeIndex, usize> =
            indices.iter().enumerate().map(|(i, idx)| (*idx, i)).collect();
        let edges: Vec<(usize, usize)> = self
            .g
            .edge_indices()
            .filter_map(|e| self.g.edge_endpoints(e))
            .filter_map(|(a, b)| Some((*slot.get(&a)?, *slot.get(&b)?)))
            .collect();
        let mut positions: Vec<Pos2> = indices
            .iter()
            .filter_map(|idx| self.g.node_weight(*idx).map(|n| n.location))
            .collect();
        let view = self.view();
        self.stats.layout_runs += 1;

        match layout {
            LayoutConfig::Fruchterman(params) => {
                let mut alg = FruchtermanReingold::new(params);
                for _ in 0..params.max_iterations {
                    if alg.is_finished() {
                        break;
                    }
                    alg.step(&mut positions, &edges, view);
                    self.write_positions(&indices, &positions);
                    if let Some(tick) = on_tick {
                        tick(self);
                    }
                }
                trace!(
                    "memory surface: force layout finished after {} steps",
                    alg.state().step_count
                );
            }
            LayoutConfig::Circular(params) => {
                circular_positions(&mut positions, view.center(), &CircularSpacing::from(params));
                self.write_positions(&indices, &positions);
                if let Some(tick) = on_tick {
                    tick(self);
                }
            }
        }
    }

    fn write_positions(&mut self, indices: &[NodeIndex], positions: &[Pos2]) {
        for (idx, pos) in indices.iter().zip(positions) {
            if let Some(node) = self.g.node_weight_mut(*idx) {
                node.location = *pos;
            }
        }
    }
}

impl RenderSurface for MemorySurface {
    type Container = MemoryContainer;
    type Item = MemoryItem;

    fn create(config: &GraphConfig, container: &MemoryContainer) -> Self {
        container.attach("memory-surface");
        debug!("memory surface attached to container {}", container.id());
        Self {
            g: StableGraph::default(),
            container: container.clone(),
            config: config.clone(),
            layout: config.layout.clone(),
            size: Vec2::new(0., config.resize.height),
            mode: String::new(),
            layout_pending: false,
            sinks: Vec::new(),
            stats: SurfaceStats::default(),
            destroyed: false,
        }
    }

    fn set_data(&mut self, data: &RenderData) {
        self.load(data, &HashMap::new());
        self.layout_pending = true;
        self.stats.data_loads += 1;
    }

    fn change_data(&mut self, data: &RenderData) {
        let previous: HashMap<String, Pos2> = self
            .g
            .node_weights()
            .map(|n| (n.id.clone(), n.location))
            .collect();
        self.load(data, &previous);
        self.stats.data_changes += 1;
    }

    fn render(&mut self) {
        if self.layout_pending {
            self.layout_pending = false;
            let layout = self.layout.clone();
            self.run_layout(&layout, None);
        }
        self.stats.renders += 1;
    }

    fn refresh(&mut self) {
        self.stats.refreshes += 1;
    }

    fn refresh_positions(&mut self) {
        self.stats.position_refreshes += 1;
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
        self.stats.resizes += 1;
    }

    fn update_layout(&mut self, layout: &LayoutConfig, on_tick: Option<TickHook<Self>>) {
        self.layout = layout.clone();
        self.layout_pending = false;
        self.run_layout(layout, on_tick);
    }

    fn set_interaction_mode(&mut self, name: &str) {
        self.mode = name.to_string();
    }

    fn on(&mut self, kind: SurfaceEventKind, sink: Box<dyn EventSink>) {
        self.sinks.push((kind, sink));
    }

    fn nodes(&self) -> Vec<MemoryItem> {
        self.g.node_indices().map(MemoryItem::Node).collect()
    }

    fn edges(&self) -> Vec<MemoryItem> {
        self.g.edge_indices().map(MemoryItem::Edge).collect()
    }

    fn neighbors(&self, node: &MemoryItem) -> Vec<MemoryItem> {
        let MemoryItem::Node(idx) = *node else {
            return Vec::new();
        };
        let mut out: Vec<MemoryItem> = Vec::new();
        for n in self.g.neighbors_undirected(idx) {
            let item = MemoryItem::Node(n);
            if !out.contains(&item) {
                out.push(item);
            }
        }
        out
    }

    fn item_id(&self, item: &MemoryItem) -> Option<String> {
        match *item {
            MemoryItem::Node(idx) => self.g.node_weight(idx).map(|n| n.id.clone()),
            MemoryItem::Edge(idx) => {
                let (a, b) = self.g.edge_endpoints(idx)?;
                Some(format!(
                    "{}->{}",
                    self.g.node_weight(a)?.id,
                    self.g.node_weight(b)?.id
                ))
            }
        }
    }

    fn edge_endpoints(&self, edge: &MemoryItem) -> Option<(MemoryItem, MemoryItem)> {
        let MemoryItem::Edge(idx) = *edge else {
            return None;
        };
        self.g
            .edge_endpoints(idx)
            .map(|(a, b)| (MemoryItem::Node(a), MemoryItem::Node(b)))
    }

    fn set_item_state(&mut self, item: &MemoryItem, state: ItemState, enabled: bool) {
        let flags = match *item {
            MemoryItem::Node(idx) => self.g.node_weight_mut(idx).map(|n| &mut n.states),
            MemoryItem::Edge(idx) => self.g.edge_weight_mut(idx).map(|e| &mut e.states),
        };
        if let Some(flags) = flags {
            flags.set(state, enabled);
        }
    }

    fn update_item_style(&mut self, item: &MemoryItem, style: &ItemStyle) {
        let target = match *item {
            MemoryItem::Node(idx) => self.g.node_weight_mut(idx).map(|n| &mut n.style),
            MemoryItem::Edge(idx) => self.g.edge_weight_mut(idx).map(|e| &mut e.style),
        };
        if let Some(target) = target {
            *target = *style;
        }
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.sinks.clear();
        self.g.clear();
        debug!("memory surface on container {} destroyed", self.container.id());
    }
}
