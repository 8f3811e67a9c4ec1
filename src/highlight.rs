//! Focus/neighbor/fade visual states derived from the selection.
//!
//! Nodes whose field is selected are *focused*. Direct neighbors of focused
//! nodes are *highlighted*. With a non-empty selection every other node is
//! *faded*. An edge is *active* when its endpoints account for exactly two
//! memberships in the selected set and the neighbor set combined; active edges
//! are highlighted, the rest fade while something is selected.

use std::collections::HashSet;

use crate::field_index::FieldIndex;
use crate::surface::{
    ItemState, ItemStyle, RenderSurface, LABEL_WEIGHT_FOCUSED, LABEL_WEIGHT_NORMAL,
};
use crate::Fid;

pub const LABEL_OPACITY_FOCUSED: f32 = 1.;
pub const LABEL_OPACITY_NEIGHBOR: f32 = 0.5;
pub const LABEL_OPACITY_FADED: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeVisual {
    pub focused: bool,
    pub highlighted: bool,
    pub faded: bool,
    pub style: ItemStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeVisual {
    pub active: bool,
    pub faded: bool,
    pub style: ItemStyle,
}

/// Visual state of every item of a surface.
#[derive(Debug, Clone)]
pub struct HighlightPlan<I> {
    pub nodes: Vec<(I, NodeVisual)>,
    pub edges: Vec<(I, EdgeVisual)>,
}

impl<I: PartialEq> HighlightPlan<I> {
    pub fn node(&self, item: &I) -> Option<&NodeVisual> {
        self.nodes.iter().find(|(i, _)| i == item).map(|(_, v)| v)
    }

    pub fn edge(&self, item: &I) -> Option<&EdgeVisual> {
        self.edges.iter().find(|(i, _)| i == item).map(|(_, v)| v)
    }
}

/// Computes the visual state of every node and edge of `surface` for `selected`.
///
/// Items whose identity cannot be resolved through `index` count as unselected.
pub fn compute<S: RenderSurface>(
    surface: &S,
    index: &FieldIndex,
    selected: &[Fid],
) -> HighlightPlan<S::Item> {
    let selection: HashSet<&Fid> = selected.iter().collect();
    let resolve = |item: &S::Item| -> Option<Fid> {
        index
            .resolve_item(surface.item_id(item).as_deref())
            .ok()
            .cloned()
    };

    let nodes = surface.nodes();
    let focused: Vec<S::Item> = nodes
        .iter()
        .filter(|node| resolve(node).is_some_and(|fid| selection.contains(&fid)))
        .cloned()
        .collect();
    let focused_set: HashSet<&S::Item> = focused.iter().collect();

    let mut subtree: Vec<S::Item> = Vec::new();
    for node in &focused {
        for neighbor in surface.neighbors(node) {
            if focused_set.contains(&neighbor) || subtree.contains(&neighbor) {
                continue;
            }
            subtree.push(neighbor);
        }
    }
    let subtree_set: HashSet<&S::Item> = subtree.iter().collect();
    let subtree_fids: HashSet<Fid> = subtree.iter().filter_map(resolve).collect();

    let anything_selected = !selected.is_empty();
    let anything_focused = !focused.is_empty();

    let node_visuals = nodes
        .iter()
        .map(|node| {
            let is_focused = focused_set.contains(node);
            let in_subtree = !is_focused && subtree_set.contains(node);
            let label_opacity = if !anything_focused || is_focused {
                LABEL_OPACITY_FOCUSED
            } else if in_subtree {
                LABEL_OPACITY_NEIGHBOR
            } else {
                LABEL_OPACITY_FADED
            };
            let visual = NodeVisual {
                focused: is_focused,
                highlighted: in_subtree,
                faded: anything_selected && !is_focused && !in_subtree,
                style: ItemStyle {
                    label_opacity,
                    label_weight: Some(if is_focused {
                        LABEL_WEIGHT_FOCUSED
                    } else {
                        LABEL_WEIGHT_NORMAL
                    }),
                },
            };
            (node.clone(), visual)
        })
        .collect();

    let edge_visuals = surface
        .edges()
        .into_iter()
        .map(|edge| {
            let endpoints: [Option<Fid>; 2] = match surface.edge_endpoints(&edge) {
                Some((source, target)) => [resolve(&source), resolve(&target)],
                None => [None, None],
            };
            let in_selection = endpoints
                .iter()
                .flatten()
                .filter(|fid| selection.contains(fid))
                .count();
            let in_subtree = endpoints
                .iter()
                .flatten()
                .filter(|fid| subtree_fids.contains(*fid))
                .count();
            let active = in_selection + in_subtree == 2;
            let visual = EdgeVisual {
                active,
                faded: anything_selected && !active,
                style: ItemStyle {
                    label_opacity: if active { 1. } else { 0. },
                    label_weight: None,
                },
            };
            (edge, visual)
        })
        .collect();

    HighlightPlan {
        nodes: node_visuals,
        edges: edge_visuals,
    }
}

/// Writes `plan` to the surface.
pub fn apply<S: RenderSurface>(surface: &mut S, plan: &HighlightPlan<S::Item>) {
    for (node, visual) in &plan.nodes {
        surface.set_item_state(node, ItemState::Focused, visual.focused);
        surface.set_item_state(node, ItemState::Highlighted, visual.highlighted);
        surface.set_item_state(node, ItemState::Faded, visual.faded);
        surface.update_item_style(node, &visual.style);
    }
    for (edge, visual) in &plan.edges {
        surface.update_item_style(edge, &visual.style);
        surface.set_item_state(edge, ItemState::Highlighted, visual.active);
        surface.set_item_state(edge, ItemState::Faded, visual.faded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MemoryContainer, MemorySurface};
    use crate::{CausalLink, EdgeKind, Field, GraphConfig, RenderData};

    fn fields() -> Vec<Field> {
        ["A", "B", "C", "D"]
            .iter()
            .map(|f| Field::new(*f, *f))
            .collect()
    }

    fn surface(links: &[(&str, &str)]) -> MemorySurface {
        let links: Vec<CausalLink> = links
            .iter()
            .map(|(s, t)| CausalLink::new(*s, *t, EdgeKind::Directed))
            .collect();
        let container = MemoryContainer::new(0);
        let mut surface = MemorySurface::create(&GraphConfig::default(), &container);
        surface.set_data(&RenderData::from_fields(&fields(), &links));
        surface
    }

    #[test]
    fn chain_selection_of_b() {
        let s = surface(&[("A", "B"), ("B", "C"), ("C", "D")]);
        let plan = compute(&s, &FieldIndex::new(&fields()), &["B".into()]);
        let visual = |id: &str| *plan.node(&s.node_by_id(id).unwrap()).unwrap();

        let b = visual("1");
        assert!(b.focused && !b.highlighted && !b.faded);
        assert_eq!(b.style.label_opacity, 1.);
        assert_eq!(b.style.label_weight, Some(LABEL_WEIGHT_FOCUSED));

        for id in ["0", "2"] {
            let n = visual(id);
            assert!(!n.focused && n.highlighted && !n.faded);
            assert_eq!(n.style.label_opacity, 0.5);
            assert_eq!(n.style.label_weight, Some(LABEL_WEIGHT_NORMAL));
        }

        let d = visual("3");
        assert!(!d.focused && !d.highlighted && d.faded);
        assert_eq!(d.style.label_opacity, 0.2);

        let edge = |a: &str, b: &str| *plan.edge(&s.edge_between(a, b).unwrap()).unwrap();
        for (a, b) in [("0", "1"), ("1", "2")] {
            let e = edge(a, b);
            assert!(e.active && !e.faded);
            assert_eq!(e.style.label_opacity, 1.);
        }
        let cd = edge("2", "3");
        assert!(!cd.active && cd.faded);
        assert_eq!(cd.style.label_opacity, 0.);
    }

    #[test]
    fn empty_selection_shows_everything() {
        let s = surface(&[("A", "B"), ("B", "C"), ("C", "D")]);
        let plan = compute(&s, &FieldIndex::new(&fields()), &[]);
        for (_, visual) in &plan.nodes {
            assert_eq!(visual.style.label_opacity, 1.);
            assert!(!visual.faded && !visual.focused && !visual.highlighted);
        }
        for (_, visual) in &plan.edges {
            assert!(!visual.active && !visual.faded);
        }
    }

    #[test]
    fn edge_between_two_neighbors_counts_as_active() {
        // A - B - C with an extra A - C edge; both endpoints of A - C are neighbors of B
        let s = surface(&[("A", "B"), ("B", "C"), ("A", "C")]);
        let plan = compute(&s, &FieldIndex::new(&fields()), &["B".into()]);
        let ac = plan.edge(&s.edge_between("0", "2").unwrap()).unwrap();
        assert!(ac.active);
    }

    #[test]
    fn two_selected_endpoints_make_an_active_edge() {
        let s = surface(&[("A", "D")]);
        let plan = compute(&s, &FieldIndex::new(&fields()), &["A".into(), "D".into()]);
        let ad = plan.edge(&s.edge_between("0", "3").unwrap()).unwrap();
        assert!(ad.active && !ad.faded);
    }

    #[test]
    fn unresolvable_nodes_degrade_to_faded() {
        let s = surface(&[("A", "B")]);
        // index built from a shorter field list: nodes "2" and "3" cannot be resolved
        let short = FieldIndex::new(&fields()[..2]);
        let plan = compute(&s, &short, &["A".into()]);
        let c = plan.node(&s.node_by_id("2").unwrap()).unwrap();
        assert!(c.faded && !c.focused);
        let a = plan.node(&s.node_by_id("0").unwrap()).unwrap();
        assert!(a.focused);
    }

    #[test]
    fn selection_outside_the_surface_focuses_nothing() {
        let s = surface(&[("A", "B")]);
        let plan = compute(&s, &FieldIndex::new(&fields()), &["Z".into()]);
        for (_, visual) in &plan.nodes {
            assert_eq!(visual.style.label_opacity, 1.);
            assert!(visual.faded);
        }
    }

    #[test]
    fn apply_writes_states() {
        let mut s = surface(&[("A", "B"), ("B", "C"), ("C", "D")]);
        let plan = compute(&s, &FieldIndex::new(&fields()), &["B".into()]);
        apply(&mut s, &plan);

        let b = s.node_by_id("1").unwrap();
        assert!(s.has_state(&b, ItemState::Focused));
        let d = s.node_by_id("3").unwrap();
        assert!(s.has_state(&d, ItemState::Faded));
        let ab = s.edge_between("0", "1").unwrap();
        assert!(s.has_state(&ab, ItemState::Highlighted));

        let cleared = compute(&s, &FieldIndex::new(&fields()), &[]);
        apply(&mut s, &cleared);
        assert!(!s.has_state(&b, ItemState::Focused));
        assert!(!s.has_state(&d, ItemState::Faded));
        assert_eq!(s.item_style(&d).unwrap().label_opacity, 1.);
    }
}
