use std::f32::consts::TAU;

use egui::{Pos2, Vec2};

use crate::CircularParams;

/// Configuration for spacing/radius of the circular layout
#[derive(Debug, Clone, PartialEq)]
pub struct CircularSpacing {
    /// Base radius when there are few nodes
    pub base_radius: f32,
    /// Additional radius per node (for auto-scaling)
    pub radius_per_node: f32,
    /// If set, overrides the auto-calculated radius
    pub fixed_radius: Option<f32>,
}

impl Default for CircularSpacing {
    fn default() -> Self {
        Self {
            base_radius: 50.0,
            radius_per_node: 5.0,
            fixed_radius: None,
        }
    }
}

impl From<&CircularParams> for CircularSpacing {
    fn from(params: &CircularParams) -> Self {
        Self {
            fixed_radius: params.radius,
            ..Default::default()
        }
    }
}

impl CircularSpacing {
    pub fn radius(&self, node_count: usize) -> f32 {
        self.fixed_radius
            .unwrap_or(self.base_radius + self.radius_per_node * node_count as f32)
    }
}

/// Places nodes evenly on a circle around `center`, first node at angle zero.
pub fn circular_positions(positions: &mut [Pos2], center: Pos2, spacing: &CircularSpacing) {
    let n = positions.len();
    if n == 0 {
        return;
    }
    let radius = spacing.radius(n);
    for (i, pos) in positions.iter_mut().enumerate() {
        let angle = TAU * i as f32 / n as f32;
        *pos = center + Vec2::new(angle.cos(), angle.sin()) * radius;
    }
}
