use serde::{Deserialize, Serialize};

/// Fixed height of the graph viewport.
pub const GRAPH_HEIGHT: f32 = 600.;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FruchtermanParams {
    /// Pull towards the layout center
    pub gravity: f32,

    /// Displacement scale of each iteration
    pub speed: f32,

    /// Layout center, viewport center when `None`
    pub center: Option<[f32; 2]>,

    /// Number of iterations of one layout run
    pub max_iterations: u32,
}

impl Default for FruchtermanParams {
    fn default() -> Self {
        Self {
            gravity: 10.,
            speed: 5.,
            center: None,
            max_iterations: 500,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircularParams {
    /// Fixed circle radius, scaled with the node count when `None`
    pub radius: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutConfig {
    Fruchterman(FruchtermanParams),
    Circular(CircularParams),
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::Fruchterman(FruchtermanParams::default())
    }
}

impl LayoutConfig {
    pub fn fruchterman(gravity: f32, speed: f32, center: [f32; 2]) -> Self {
        Self::Fruchterman(FruchtermanParams {
            gravity,
            speed,
            center: Some(center),
            ..Default::default()
        })
    }
}

/// Relayout performed whenever the viewport width changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsResize {
    pub height: f32,
    pub gravity: f32,
    pub speed: f32,
}

impl Default for SettingsResize {
    fn default() -> Self {
        Self {
            height: GRAPH_HEIGHT,
            gravity: 5.,
            speed: 5.,
        }
    }
}

impl SettingsResize {
    /// Force layout centered in a viewport of `width` x `height`.
    pub fn layout_for_width(&self, width: f32) -> LayoutConfig {
        LayoutConfig::fruchterman(self.gravity, self.speed, [width / 2., self.height / 2.])
    }
}

/// Render configuration a surface is created with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub layout: LayoutConfig,
    pub resize: SettingsResize,
}

impl GraphConfig {
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_resize(mut self, resize: SettingsResize) -> Self {
        self.resize = resize;
        self
    }
}

/// Base interaction mode of the graph view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphMode {
    #[default]
    Explore,
    Edit,
}

impl GraphMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explore => "explore",
            Self::Edit => "edit",
        }
    }
}

/// Surface interaction mode name, e.g. `explore` or `edit_zoom`.
pub fn interaction_mode_name(mode: GraphMode, allow_zoom: bool) -> String {
    let suffix = if allow_zoom { "_zoom" } else { "" };
    format!("{}{suffix}", mode.as_str())
}
