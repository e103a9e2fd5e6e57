use narwhal_graph::EntityType;

/// Rejected engine or filter configuration. The previously active configuration stays in effect.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("entity type `{entity_type}` is not registered")]
    UnknownType { entity_type: EntityType },
    #[error("invalid zoom range: min_zoom = {min}, max_zoom = {max}")]
    InvalidZoomRange { min: f64, max: f64 },
    #[error("invalid value for `{key}`: {message}")]
    InvalidSetting { key: &'static str, message: String },
    #[error("entity type `{entity_type}` is registered more than once")]
    DuplicateType { entity_type: EntityType },
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
