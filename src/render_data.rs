use log::debug;
use serde::{Deserialize, Serialize};

use crate::field_index::{node_id, FieldIndex};
use crate::{Fid, Field};

/// Orientation marks of a causal edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// `source -> target`
    #[default]
    Directed,
    /// `source - target`
    Undirected,
    /// `source <-> target`
    Bidirected,
    /// `source o-> target`
    PartiallyOriented,
}

/// Causal relation between two fields as produced upstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CausalLink {
    pub source: Fid,
    pub target: Fid,
    pub kind: EdgeKind,
    pub weight: Option<f32>,
}

impl CausalLink {
    pub fn new(source: impl Into<Fid>, target: impl Into<Fid>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    /// Position of the field in the field list, as a decimal string.
    pub id: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub weight: Option<f32>,
}

/// Graph payload handed to a rendering surface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderData {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl RenderData {
    /// One node per field in list order, one edge per link whose endpoints are both known.
    pub fn from_fields(fields: &[Field], links: &[CausalLink]) -> Self {
        let index = FieldIndex::new(fields);
        let nodes = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| RenderNode {
                id: node_id(idx),
                label: field.label().to_string(),
            })
            .collect();

        let edges = links
            .iter()
            .filter_map(|link| {
                let (Some(source), Some(target)) =
                    (index.node_id_of(&link.source), index.node_id_of(&link.target))
                else {
                    debug!(
                        "skipping link {} -> {}: endpoint outside the field list",
                        link.source, link.target
                    );
                    return None;
                };
                Some(RenderEdge {
                    source,
                    target,
                    kind: link.kind,
                    weight: link.weight,
                })
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_index_identified_nodes() {
        let fields = [
            Field::new("f_a", "a"),
            Field::new("f_b", "b").with_description("bee"),
        ];
        let links = [
            CausalLink::new("f_a", "f_b", EdgeKind::Directed).with_weight(0.4),
            CausalLink::new("f_b", "f_gone", EdgeKind::Undirected),
        ];

        let data = RenderData::from_fields(&fields, &links);
        assert_eq!(data.node_count(), 2);
        assert_eq!(data.nodes[1].id, "1");
        assert_eq!(data.nodes[1].label, "bee");
        assert_eq!(data.edge_count(), 1);
        assert_eq!(data.edges[0].source, "0");
        assert_eq!(data.edges[0].target, "1");
        assert_eq!(data.edges[0].weight, Some(0.4));
    }

    #[test]
    fn contract_json() {
        let data = RenderData::from_fields(
            &[Field::new("x", "x"), Field::new("y", "y")],
            &[CausalLink::new("y", "x", EdgeKind::Bidirected)],
        );
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(
            json,
            r#"{"nodes":[{"id":"0","label":"x"},{"id":"1","label":"y"}],"edges":[{"source":"1","target":"0","kind":"Bidirected","weight":null}]}"#
        );
    }
}
