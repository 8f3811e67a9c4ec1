use crossbeam::channel::Sender;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadNodeClick {
    /// Surface id of the clicked node, `None` when the engine reported no identity
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadEdgeClick {
    pub source: Option<String>,
    pub target: Option<String>,
}

/// Interaction reported by a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    NodeClick(PayloadNodeClick),
    EdgeClick(PayloadEdgeClick),
}

impl SurfaceEvent {
    pub fn kind(&self) -> SurfaceEventKind {
        match self {
            Self::NodeClick(_) => SurfaceEventKind::NodeClick,
            Self::EdgeClick(_) => SurfaceEventKind::EdgeClick,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceEventKind {
    NodeClick,
    EdgeClick,
}

/// Receiver of surface events. Implemented for crossbeam senders and [`FnSink`].
pub trait EventSink {
    fn send(&self, event: SurfaceEvent);
}

impl EventSink for Sender<SurfaceEvent> {
    fn send(&self, event: SurfaceEvent) {
        if let Err(err) = Sender::send(self, event) {
            debug!("dropping surface event, receiver is gone: {err}");
        }
    }
}

/// Adapts a closure into an [`EventSink`].
pub struct FnSink<F>(pub F);

impl<F: Fn(SurfaceEvent)> EventSink for FnSink<F> {
    fn send(&self, event: SurfaceEvent) {
        (self.0)(event);
    }
}
