//! Relationship-network adaptation.
//!
//! The backend graph payload is loose: ids may be strings or numbers, edge
//! endpoints arrive under `from`/`to` or `source`/`target`, weights under
//! `value` or `weight`. The graph widget wants clean node/edge sets, so this
//! module normalizes the payload and drops what cannot be rendered.

use crate::models::RedeResponse;

/// Widget-ready node.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub value: Option<f64>,
}

/// Widget-ready directed edge.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub value: Option<f64>,
}

/// Normalized node/edge sets for the network widget.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Rendering options handed to the network widget alongside the data.
pub struct GraphOptions {
    pub node_shape: &'static str,
    pub node_size: u32,
    pub edge_arrows: &'static str,
    pub edge_scaling_min: u32,
    pub edge_scaling_max: u32,
    pub physics_stabilization: bool,
}

pub const GRAPH_OPTIONS: GraphOptions = GraphOptions {
    node_shape: "dot",
    node_size: 12,
    edge_arrows: "to",
    edge_scaling_min: 1,
    edge_scaling_max: 5,
    physics_stabilization: true,
};

/// Normalizes the raw graph payload.
///
/// Nodes without an id fall back to their index; labels fall back to the id.
/// Edges missing either endpoint are dropped. Non-finite weights become
/// `None`. Returns `None` when no node survives, which the caller renders as
/// "no network data".
pub fn rede_graph_data(response: &RedeResponse) -> Option<GraphData> {
    let nodes: Vec<GraphNode> = response
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let id = node
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| index.to_string());
            GraphNode {
                label: node.label.clone().unwrap_or_else(|| id.clone()),
                value: node.value.filter(|v| v.is_finite()),
                id,
            }
        })
        .collect();

    if nodes.is_empty() {
        return None;
    }

    let edges: Vec<GraphEdge> = response
        .edges
        .iter()
        .enumerate()
        .filter_map(|(index, edge)| {
            let from = edge.from.as_ref().or(edge.source.as_ref())?;
            let to = edge.to.as_ref().or(edge.target.as_ref())?;
            let value = edge.value.or(edge.weight).filter(|v| v.is_finite());
            let id = edge
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_else(|| index.to_string());
            Some(GraphEdge {
                id,
                from: from.to_string(),
                to: to.to_string(),
                value,
            })
        })
        .collect();

    Some(GraphData { nodes, edges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GraphId, RedeEdge, RedeNode};

    #[test]
    fn nodes_fall_back_to_index_and_id_label() {
        let response = RedeResponse {
            nodes: vec![
                RedeNode {
                    id: Some(GraphId::Text("A".to_string())),
                    label: Some("CNPJ_00001".to_string()),
                    value: Some(3.0),
                },
                RedeNode::default(),
            ],
            edges: vec![],
        };

        let graph = rede_graph_data(&response).unwrap();
        assert_eq!(graph.nodes[0].id, "A");
        assert_eq!(graph.nodes[0].label, "CNPJ_00001");
        assert_eq!(graph.nodes[1].id, "1");
        assert_eq!(graph.nodes[1].label, "1");
    }

    #[test]
    fn edges_accept_source_target_aliases_and_weight() {
        let response = RedeResponse {
            nodes: vec![RedeNode {
                id: Some(GraphId::Int(1)),
                ..Default::default()
            }],
            edges: vec![
                RedeEdge {
                    source: Some(GraphId::Text("A".to_string())),
                    target: Some(GraphId::Text("B".to_string())),
                    weight: Some(42.0),
                    ..Default::default()
                },
                // missing endpoint: dropped
                RedeEdge {
                    from: Some(GraphId::Text("A".to_string())),
                    ..Default::default()
                },
            ],
        };

        let graph = rede_graph_data(&response).unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].from, "A");
        assert_eq!(graph.edges[0].to, "B");
        assert_eq!(graph.edges[0].value, Some(42.0));
    }

    #[test]
    fn non_finite_weights_are_dropped() {
        let response = RedeResponse {
            nodes: vec![RedeNode {
                id: Some(GraphId::Int(1)),
                value: Some(f64::NAN),
                ..Default::default()
            }],
            edges: vec![RedeEdge {
                from: Some(GraphId::Int(1)),
                to: Some(GraphId::Int(2)),
                value: Some(f64::INFINITY),
                ..Default::default()
            }],
        };

        let graph = rede_graph_data(&response).unwrap();
        assert_eq!(graph.nodes[0].value, None);
        assert_eq!(graph.edges[0].value, None);
    }

    #[test]
    fn empty_node_set_means_no_data() {
        assert!(rede_graph_data(&RedeResponse::default()).is_none());
    }
}
