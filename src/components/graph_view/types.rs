//! Graph data structures for input to the graph view component.
//!
//! Mirrors the wire format served by the audit backend:
//! `{ "nodes": [{id, category, label, size}], "edges": [{source, target, relation}] }`.
//! Data sets are validated before a simulation is built from them; a data set
//! with duplicate ids or dangling edge endpoints is rejected outright rather
//! than trimmed into a partial graph, since a half-wired relationship graph
//! silently misrepresents audit structure.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

/// Domain category of a node, numeric on the wire.
///
/// The category set is fixed by the audit domain; any other wire integer,
/// negative included, deserializes to [`NodeCategory::Other`] so a newer
/// backend never breaks the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "i64")]
pub enum NodeCategory {
	/// Standard clause (wire value 1).
	Clause,
	/// Control (wire value 2).
	Control,
	/// Audit evidence (wire value 3).
	Evidence,
	/// Security risk (wire value 4).
	Risk,
	/// Any unrecognized wire value; rendered in the neutral color.
	Other,
}

impl From<i64> for NodeCategory {
	fn from(value: i64) -> Self {
		match value {
			1 => Self::Clause,
			2 => Self::Control,
			3 => Self::Evidence,
			4 => Self::Risk,
			_ => Self::Other,
		}
	}
}

impl NodeCategory {
	/// The four known categories, in legend order.
	pub const KNOWN: [NodeCategory; 4] = [Self::Clause, Self::Control, Self::Evidence, Self::Risk];

	/// Human-readable name, as shown in the legend.
	pub fn display_name(self) -> &'static str {
		match self {
			Self::Clause => "Standard clause",
			Self::Control => "Control",
			Self::Evidence => "Audit evidence",
			Self::Risk => "Security risk",
			Self::Other => "Other",
		}
	}
}

/// A node in the relationship graph.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identifier. Edges reference nodes by this id.
	pub id: String,
	/// Category driving the node's accent color.
	pub category: NodeCategory,
	/// Display label drawn next to the node.
	pub label: String,
	/// Base radius of the node disc, in world units.
	pub size: f64,
}

/// A directed edge between two nodes.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphEdge {
	/// Source node id.
	pub source: String,
	/// Target node id; the arrowhead points at this end.
	pub target: String,
	/// Relation label drawn at the edge midpoint (e.g. "MITIGATES").
	pub relation: String,
}

/// Complete graph data set: nodes and edges.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	/// All nodes, in backend order.
	pub nodes: Vec<GraphNode>,
	/// All edges; endpoints reference [`GraphNode::id`] values.
	pub edges: Vec<GraphEdge>,
}

/// Integrity error found while validating a [`GraphData`] set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphDataError {
	/// Two nodes share the same id.
	#[error("duplicate node id \"{0}\"")]
	DuplicateNodeId(String),
	/// An edge endpoint does not match any node id.
	#[error("edge {index} references unknown node id \"{id}\"")]
	UnknownEdgeEndpoint {
		/// Position of the offending edge in the data set.
		index: usize,
		/// The id that failed to resolve.
		id: String,
	},
}

impl GraphData {
	/// Check id uniqueness and edge endpoint resolution.
	pub fn validate(&self) -> Result<(), GraphDataError> {
		self.index_ids().map(|_| ())
	}

	/// Build the id-to-arena-index map, failing on the first integrity error.
	pub(crate) fn index_ids(&self) -> Result<HashMap<&str, usize>, GraphDataError> {
		let mut id_to_idx = HashMap::with_capacity(self.nodes.len());
		for (idx, node) in self.nodes.iter().enumerate() {
			if id_to_idx.insert(node.id.as_str(), idx).is_some() {
				return Err(GraphDataError::DuplicateNodeId(node.id.clone()));
			}
		}
		for (index, edge) in self.edges.iter().enumerate() {
			for id in [&edge.source, &edge.target] {
				if !id_to_idx.contains_key(id.as_str()) {
					return Err(GraphDataError::UnknownEdgeEndpoint {
						index,
						id: id.clone(),
					});
				}
			}
		}
		Ok(id_to_idx)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, category: i64) -> GraphNode {
		GraphNode {
			id: id.to_string(),
			category: category.into(),
			label: id.to_string(),
			size: 10.0,
		}
	}

	fn edge(source: &str, target: &str) -> GraphEdge {
		GraphEdge {
			source: source.to_string(),
			target: target.to_string(),
			relation: "RELATES".to_string(),
		}
	}

	#[test]
	fn category_from_wire_values() {
		assert_eq!(NodeCategory::from(1), NodeCategory::Clause);
		assert_eq!(NodeCategory::from(2), NodeCategory::Control);
		assert_eq!(NodeCategory::from(3), NodeCategory::Evidence);
		assert_eq!(NodeCategory::from(4), NodeCategory::Risk);
		assert_eq!(NodeCategory::from(0), NodeCategory::Other);
		assert_eq!(NodeCategory::from(99), NodeCategory::Other);
		assert_eq!(NodeCategory::from(-1), NodeCategory::Other);
	}

	#[test]
	fn deserializes_wire_format() {
		let json = r#"{
			"nodes": [
				{"id": "A9", "category": 1, "label": "A.9", "size": 15},
				{"id": "R1", "category": 4, "label": "Risk", "size": 8}
			],
			"edges": [
				{"source": "A9", "target": "R1", "relation": "MITIGATES"}
			]
		}"#;
		let data: GraphData = serde_json::from_str(json).unwrap();
		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.nodes[0].category, NodeCategory::Clause);
		assert_eq!(data.nodes[1].category, NodeCategory::Risk);
		assert_eq!(data.edges[0].relation, "MITIGATES");
		assert!(data.validate().is_ok());
	}

	#[test]
	fn unknown_category_falls_back() {
		let json = r#"{"id": "x", "category": 7, "label": "x", "size": 5}"#;
		let node: GraphNode = serde_json::from_str(json).unwrap();
		assert_eq!(node.category, NodeCategory::Other);
	}

	#[test]
	fn negative_category_maps_to_other() {
		let json = r#"{"id": "x", "category": -1, "label": "x", "size": 5}"#;
		let node: GraphNode = serde_json::from_str(json).unwrap();
		assert_eq!(node.category, NodeCategory::Other);

		// A single out-of-range category must not reject the whole payload.
		let json = r#"{
			"nodes": [
				{"id": "legacy", "category": -7, "label": "Legacy", "size": 6},
				{"id": "c1", "category": 2, "label": "Control", "size": 9}
			],
			"edges": []
		}"#;
		let data: GraphData = serde_json::from_str(json).unwrap();
		assert_eq!(data.nodes[0].category, NodeCategory::Other);
		assert_eq!(data.nodes[1].category, NodeCategory::Control);
		assert!(data.validate().is_ok());
	}

	#[test]
	fn valid_data_passes() {
		let data = GraphData {
			nodes: vec![node("a", 1), node("b", 2)],
			edges: vec![edge("a", "b")],
		};
		assert!(data.validate().is_ok());
	}

	#[test]
	fn duplicate_id_rejected() {
		let data = GraphData {
			nodes: vec![node("a", 1), node("a", 2)],
			edges: vec![],
		};
		assert_eq!(
			data.validate(),
			Err(GraphDataError::DuplicateNodeId("a".to_string()))
		);
	}

	#[test]
	fn dangling_edge_source_rejected() {
		let data = GraphData {
			nodes: vec![node("a", 1)],
			edges: vec![edge("ghost", "a")],
		};
		assert_eq!(
			data.validate(),
			Err(GraphDataError::UnknownEdgeEndpoint {
				index: 0,
				id: "ghost".to_string(),
			})
		);
	}

	#[test]
	fn dangling_edge_target_rejected() {
		let data = GraphData {
			nodes: vec![node("a", 1)],
			edges: vec![edge("a", "ghost")],
		};
		assert_eq!(
			data.validate(),
			Err(GraphDataError::UnknownEdgeEndpoint {
				index: 0,
				id: "ghost".to_string(),
			})
		);
	}

	#[test]
	fn empty_data_is_valid() {
		assert!(GraphData::default().validate().is_ok());
	}
}
