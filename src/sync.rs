//! Keeps one rendering surface in step with application state.
//!
//! [`GraphSync::sync`] is called with the current [`SyncProps`] whenever the host
//! redraws. Each input is compared with what the surface last received and only
//! the commands for inputs that changed are issued. The surface is created once
//! per container and lives until the container changes or [`GraphSync::unmount`].

use std::rc::Rc;

use crossbeam::channel::{unbounded, Receiver};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::field_index::FieldIndex;
use crate::highlight;
use crate::surface::{
    PayloadEdgeClick, PayloadNodeClick, RenderSurface, SurfaceContainer, SurfaceEvent,
    SurfaceEventKind,
};
use crate::{
    interaction_mode_name, Fid, Field, GraphConfig, GraphMode, LayoutConfig, RenderData,
    SettingsResize,
};

/// Fields at both ends of a clicked edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeClick {
    pub source: Fid,
    pub target: Fid,
}

pub type NodeClickFn<'a> = dyn FnMut(Option<Fid>) + 'a;
pub type EdgeClickFn<'a> = dyn FnMut(Option<EdgeClick>) + 'a;

/// Inputs of one sync pass.
pub struct SyncProps<'a, C> {
    /// Host element, `None` while the view is not mounted
    pub container: Option<C>,

    /// Measured viewport width, `None` until known
    pub width: Option<f32>,

    /// Render configuration. A surface is only created once it is present.
    pub config: Option<&'a GraphConfig>,

    /// Graph payload, compared by reference
    pub data: &'a Rc<RenderData>,

    /// Current field list, node ids are positions in it
    pub fields: &'a [Field],

    pub selected: &'a [Fid],
    pub mode: GraphMode,
    pub allow_zoom: bool,

    /// Flipped by the host to request a full reload and relayout
    pub force_relayout: bool,

    pub on_node_click: Option<&'a mut NodeClickFn<'a>>,
    pub on_edge_click: Option<&'a mut EdgeClickFn<'a>>,
}

impl<'a, C> SyncProps<'a, C> {
    pub fn new(data: &'a Rc<RenderData>, fields: &'a [Field]) -> Self {
        Self {
            container: None,
            width: None,
            config: None,
            data,
            fields,
            selected: &[],
            mode: GraphMode::default(),
            allow_zoom: false,
            force_relayout: false,
            on_node_click: None,
            on_edge_click: None,
        }
    }

    pub fn with_container(mut self, container: C) -> Self {
        self.container = Some(container);
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_config(mut self, config: &'a GraphConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_selected(mut self, selected: &'a [Fid]) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_mode(mut self, mode: GraphMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_allow_zoom(mut self, allow_zoom: bool) -> Self {
        self.allow_zoom = allow_zoom;
        self
    }

    pub fn with_force_relayout(mut self, force_relayout: bool) -> Self {
        self.force_relayout = force_relayout;
        self
    }

    pub fn with_on_node_click(mut self, on_node_click: &'a mut NodeClickFn<'a>) -> Self {
        self.on_node_click = Some(on_node_click);
        self
    }

    pub fn with_on_edge_click(mut self, on_edge_click: &'a mut EdgeClickFn<'a>) -> Self {
        self.on_edge_click = Some(on_edge_click);
        self
    }
}

/// What the mounted surface last received.
#[derive(Debug)]
struct Snapshot {
    width: Option<f32>,
    resize: SettingsResize,
    layout: Option<LayoutConfig>,
    data: Rc<RenderData>,
    force_relayout: bool,
    interaction: Option<String>,
    selected: Option<Vec<Fid>>,
}

struct Mounted<S: RenderSurface> {
    surface: S,
    container: S::Container,
    events: Receiver<SurfaceEvent>,
    last: Snapshot,
}

impl<S: RenderSurface> Mounted<S> {
    fn mount(
        container: &S::Container,
        config: &GraphConfig,
        props: &SyncProps<'_, S::Container>,
    ) -> Self {
        let mut surface = S::create(config, container);
        surface.set_data(props.data);
        surface.render();

        let (tx, events) = unbounded();
        surface.on(SurfaceEventKind::NodeClick, Box::new(tx.clone()));
        surface.on(SurfaceEventKind::EdgeClick, Box::new(tx));
        debug!("graph sync: surface mounted on container {}", container.id());

        Self {
            surface,
            container: container.clone(),
            events,
            last: Snapshot {
                width: None,
                resize: config.resize.clone(),
                layout: None,
                data: Rc::clone(props.data),
                force_relayout: props.force_relayout,
                interaction: None,
                selected: None,
            },
        }
    }

    fn update(
        &mut self,
        props: &SyncProps<'_, S::Container>,
        index: &FieldIndex,
        fields_changed: bool,
    ) {
        let resize_changed = props.config.is_some_and(|c| c.resize != self.last.resize);
        if resize_changed {
            if let Some(config) = props.config {
                self.last.resize = config.resize.clone();
            }
        }

        if let Some(width) = props.width.filter(|w| *w > 0.) {
            if resize_changed || self.last.width != Some(width) {
                let resize = &self.last.resize;
                debug!("graph sync: resize to {width}x{}", resize.height);
                self.surface.resize(width, resize.height);
                self.surface
                    .update_layout(&resize.layout_for_width(width), Some(S::refresh_positions));
                self.surface.render();
                self.last.width = Some(width);
            }
        }

        let mut data_replaced = false;
        if props.force_relayout != self.last.force_relayout {
            debug!("graph sync: forced relayout");
            self.surface.set_data(props.data);
            self.surface.render();
            self.last.force_relayout = props.force_relayout;
            self.last.data = Rc::clone(props.data);
            data_replaced = true;
        }

        if let Some(config) = props.config {
            if self.last.layout.as_ref() != Some(&config.layout) {
                debug!("graph sync: layout options changed");
                self.surface.update_layout(&config.layout, None);
                self.surface.refresh();
                self.last.layout = Some(config.layout.clone());
            }
        }

        if !Rc::ptr_eq(props.data, &self.last.data) {
            debug!(
                "graph sync: data replaced ({} nodes, {} edges)",
                props.data.node_count(),
                props.data.edge_count()
            );
            self.surface.change_data(props.data);
            self.surface.refresh();
            self.last.data = Rc::clone(props.data);
            data_replaced = true;
        }

        let interaction = interaction_mode_name(props.mode, props.allow_zoom);
        if self.last.interaction.as_deref() != Some(interaction.as_str()) {
            debug!("graph sync: interaction mode {interaction}");
            self.surface.set_interaction_mode(&interaction);
            self.last.interaction = Some(interaction);
        }

        let selection_changed = self.last.selected.as_deref() != Some(props.selected);
        if selection_changed || fields_changed || data_replaced {
            debug!(
                "graph sync: highlighting {} selected fields",
                props.selected.len()
            );
            let plan = highlight::compute(&self.surface, index, props.selected);
            highlight::apply(&mut self.surface, &plan);
            self.last.selected = Some(props.selected.to_vec());
        }
    }
}

impl<S: RenderSurface> Drop for Mounted<S> {
    fn drop(&mut self) {
        self.surface.destroy();
        self.container.clear();
        debug!(
            "graph sync: surface unmounted from container {}",
            self.container.id()
        );
    }
}

/// Graph sync layer: exclusive owner of a rendering surface.
pub struct GraphSync<S: RenderSurface> {
    mounted: Option<Mounted<S>>,
    index: FieldIndex,
}

impl<S: RenderSurface> Default for GraphSync<S> {
    fn default() -> Self {
        Self {
            mounted: None,
            index: FieldIndex::default(),
        }
    }
}

impl<S: RenderSurface> GraphSync<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mounted surface, for inspection.
    pub fn surface(&self) -> Option<&S> {
        self.mounted.as_ref().map(|m| &m.surface)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn field_index(&self) -> &FieldIndex {
        &self.index
    }

    /// Runs one sync pass.
    ///
    /// Pending surface events are delivered to the callbacks of `props` first,
    /// resolved against the field list they were produced with.
    pub fn sync(&mut self, mut props: SyncProps<'_, S::Container>) {
        self.dispatch_events(
            props.on_node_click.as_deref_mut(),
            props.on_edge_click.as_deref_mut(),
        );

        let fields_changed = !self.index.matches(props.fields);
        if fields_changed {
            self.index = FieldIndex::new(props.fields);
            debug!("graph sync: field index rebuilt, {} fields", self.index.len());
        }

        self.sync_mount(&props);

        match self.mounted.as_mut() {
            Some(mounted) => mounted.update(&props, &self.index, fields_changed),
            None => trace!("graph sync: no surface mounted"),
        }
    }

    /// Delivers pending node and edge clicks.
    ///
    /// Unresolvable identities reach the callbacks as `None`.
    pub fn dispatch_events(
        &self,
        mut on_node_click: Option<&mut NodeClickFn<'_>>,
        mut on_edge_click: Option<&mut EdgeClickFn<'_>>,
    ) {
        let Some(mounted) = &self.mounted else {
            return;
        };
        for event in mounted.events.try_iter() {
            match event {
                SurfaceEvent::NodeClick(payload) => {
                    let fid = self.resolve_node_click(&payload);
                    match on_node_click.as_mut() {
                        Some(callback) => callback(fid),
                        None => trace!("graph sync: node click without a handler"),
                    }
                }
                SurfaceEvent::EdgeClick(payload) => {
                    let edge = self.resolve_edge_click(&payload);
                    match on_edge_click.as_mut() {
                        Some(callback) => callback(edge),
                        None => trace!("graph sync: edge click without a handler"),
                    }
                }
            }
        }
    }

    /// Destroys the surface and empties its container.
    ///
    /// Clicks not yet delivered by [`GraphSync::dispatch_events`] or a sync pass
    /// are dropped with the surface.
    pub fn unmount(&mut self) {
        if self.mounted.take().is_none() {
            trace!("graph sync: unmount without a surface");
        }
    }

    fn sync_mount(&mut self, props: &SyncProps<'_, S::Container>) {
        let container_id = props.container.as_ref().map(SurfaceContainer::id);
        if let Some(mounted) = &self.mounted {
            if Some(mounted.container.id()) == container_id {
                return;
            }
            self.mounted = None;
        }

        let (Some(container), Some(config)) = (props.container.as_ref(), props.config) else {
            trace!("graph sync: waiting for container and config");
            return;
        };
        self.mounted = Some(Mounted::mount(container, config, props));
    }

    fn resolve_node_click(&self, payload: &PayloadNodeClick) -> Option<Fid> {
        self.index
            .resolve_item(payload.id.as_deref())
            .inspect_err(|err| debug!("graph sync: clicked node unresolved: {err}"))
            .ok()
            .cloned()
    }

    fn resolve_edge_click(&self, payload: &PayloadEdgeClick) -> Option<EdgeClick> {
        let resolve = |id: Option<&str>| {
            self.index
                .resolve_item(id)
                .inspect_err(|err| debug!("graph sync: clicked edge endpoint unresolved: {err}"))
                .ok()
                .cloned()
        };
        Some(EdgeClick {
            source: resolve(payload.source.as_deref())?,
            target: resolve(payload.target.as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MemoryContainer, MemorySurface};

    fn fields() -> Vec<Field> {
        ["age", "income", "score"]
            .iter()
            .map(|f| Field::new(*f, *f))
            .collect()
    }

    fn mounted() -> (GraphSync<MemorySurface>, Rc<RenderData>, GraphConfig) {
        let data = Rc::new(RenderData::from_fields(&fields(), &[]));
        let config = GraphConfig::default();
        let mut sync = GraphSync::new();
        let fields = fields();
        sync.sync(
            SyncProps::new(&data, &fields)
                .with_container(MemoryContainer::new(7))
                .with_config(&config),
        );
        (sync, data, config)
    }

    #[test]
    fn malformed_node_ids_resolve_to_none() {
        let (sync, _, _) = mounted();
        let resolved = sync.resolve_node_click(&PayloadNodeClick {
            id: Some("x1".to_string()),
        });
        assert_eq!(resolved, None);
        let resolved = sync.resolve_node_click(&PayloadNodeClick { id: None });
        assert_eq!(resolved, None);
        let resolved = sync.resolve_node_click(&PayloadNodeClick {
            id: Some("2".to_string()),
        });
        assert_eq!(resolved, Some(Fid::from("score")));
    }

    #[test]
    fn edge_click_needs_both_endpoints() {
        let (sync, _, _) = mounted();
        let payload = |s: &str, t: &str| PayloadEdgeClick {
            source: Some(s.to_string()),
            target: Some(t.to_string()),
        };
        assert_eq!(
            sync.resolve_edge_click(&payload("0", "1")),
            Some(EdgeClick {
                source: "age".into(),
                target: "income".into(),
            })
        );
        assert_eq!(sync.resolve_edge_click(&payload("0", "9")), None);
    }

    #[test]
    fn events_without_handlers_are_dropped() {
        let (mut sync, data, config) = mounted();
        sync.surface().unwrap().click_node("1");
        let fields = fields();
        sync.sync(
            SyncProps::new(&data, &fields)
                .with_container(MemoryContainer::new(7))
                .with_config(&config),
        );

        let mut clicks = Vec::new();
        sync.dispatch_events(Some(&mut |fid| clicks.push(fid)), None);
        assert!(clicks.is_empty());
    }
}
