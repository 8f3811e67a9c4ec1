use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::FruchtermanParams;

/// Scales `speed` down to a fraction of the maximum displacement per step.
const SPEED_DIVISOR: f32 = 800.;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FruchtermanReingoldState {
    pub is_running: bool,
    pub gravity: f32,
    pub speed: f32,
    pub center: Option<Pos2>,
    pub epsilon: f32,
    pub k_scale: f32,
    pub max_iterations: u32,
    pub step_count: u32,
}

impl Default for FruchtermanReingoldState {
    fn default() -> Self {
        Self::from(&FruchtermanParams::default())
    }
}

impl From<&FruchtermanParams> for FruchtermanReingoldState {
    fn from(params: &FruchtermanParams) -> Self {
        Self {
            is_running: true,
            gravity: params.gravity,
            speed: params.speed,
            center: params.center.map(|[x, y]| Pos2::new(x, y)),
            epsilon: 1e-2,
            k_scale: 1.,
            max_iterations: params.max_iterations,
            step_count: 0,
        }
    }
}

/// Force-directed layout: pairwise repulsion, attraction along edges and a
/// gravity pull towards the center.
#[derive(Debug, Default)]
pub struct FruchtermanReingold {
    state: FruchtermanReingoldState,
    // Reusable displacement buffer to avoid per-step allocations
    scratch_disp: Vec<Vec2>,
}

impl FruchtermanReingold {
    pub fn new(params: &FruchtermanParams) -> Self {
        Self::from_state(FruchtermanReingoldState::from(params))
    }

    pub fn from_state(state: FruchtermanReingoldState) -> Self {
        Self {
            state,
            scratch_disp: Vec::new(),
        }
    }

    pub fn state(&self) -> &FruchtermanReingoldState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        !self.state.is_running || self.state.step_count >= self.state.max_iterations
    }

    /// Advances the layout by one iteration inside `view`.
    pub fn step(&mut self, positions: &mut [Pos2], edges: &[(usize, usize)], view: Rect) {
        if self.is_finished() || positions.is_empty() {
            return;
        }

        let params = &self.state;
        let Some(k) = prepare_constants(view, positions.len(), params.k_scale) else {
            return;
        };

        if self.scratch_disp.len() == positions.len() {
            self.scratch_disp.fill(Vec2::ZERO);
        } else {
            self.scratch_disp.clear();
            self.scratch_disp.resize(positions.len(), Vec2::ZERO);
        }

        compute_repulsion(positions, &mut self.scratch_disp, k, params.epsilon);
        compute_attraction(positions, edges, &mut self.scratch_disp, k, params.epsilon);
        apply_center_gravity(
            positions,
            &mut self.scratch_disp,
            params.center.unwrap_or(view.center()),
            0.01 * k * params.gravity,
        );

        let max_displace = view.area().max(1.).sqrt() / 10.;
        let max_step = max_displace * params.speed / SPEED_DIVISOR;
        apply_displacements(positions, &self.scratch_disp, max_step);

        self.state.step_count += 1;
    }
}

pub(crate) fn prepare_constants(canvas: Rect, node_count: usize, k_scale: f32) -> Option<f32> {
    if node_count == 0 {
        return None;
    }
    let n = node_count as f32;
    let area = canvas.area().max(1.0);
    let k = (area / n).sqrt() * k_scale; // ideal edge length
    if !k.is_finite() {
        return None;
    }
    Some(k)
}

pub(crate) fn compute_repulsion(positions: &[Pos2], disp: &mut [Vec2], k: f32, epsilon: f32) {
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let delta = positions[i] - positions[j];
            let distance = delta.length().max(epsilon);
            let force = (k * k) / distance;
            let dir = delta / distance;
            disp[i] += dir * force;
            disp[j] -= dir * force;
        }
    }
}

pub(crate) fn compute_attraction(
    positions: &[Pos2],
    edges: &[(usize, usize)],
    disp: &mut [Vec2],
    k: f32,
    epsilon: f32,
) {
    for &(source, target) in edges {
        if source == target || source >= positions.len() || target >= positions.len() {
            continue;
        }
        let delta = positions[target] - positions[source];
        let distance = delta.length().max(epsilon);
        let force = (distance * distance) / k;
        let dir = delta / distance;
        disp[source] += dir * force;
        disp[target] -= dir * force;
    }
}

pub(crate) fn apply_center_gravity(positions: &[Pos2], disp: &mut [Vec2], center: Pos2, c: f32) {
    if c == 0.0 {
        return;
    }
    for (pos, d) in positions.iter().zip(disp.iter_mut()) {
        *d += (center - *pos) * c;
    }
}

pub(crate) fn apply_displacements(positions: &mut [Pos2], disp: &[Vec2], max_step: f32) {
    for (pos, d) in positions.iter_mut().zip(disp) {
        let length = d.length();
        if length == 0.0 || !length.is_finite() {
            continue;
        }
        let new_pos = *pos + *d / length * length.min(max_step);
        if !new_pos.x.is_finite() || !new_pos.y.is_finite() {
            continue;
        }
        *pos = new_pos;
    }
}
