#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("duplicate edge id: {id}")]
    DuplicateEdge { id: String },

    #[error("edge {edge_id} references a missing node: {node_id}")]
    DanglingEdge { edge_id: String, node_id: String },

    #[error("node {node_id} has an unregistered type: {entity_type}")]
    UnknownType {
        node_id: String,
        entity_type: String,
    },

    #[error("edge {edge_id} has an invalid weight: {weight}")]
    InvalidWeight { edge_id: String, weight: f64 },
}

pub type Result<T> = std::result::Result<T, ValidationError>;
