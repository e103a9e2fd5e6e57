//! Engine configuration.
//!
//! Configuration is plain JSON. User input is deep-merged over the serialized defaults (objects
//! merge key by key, anything else replaces the default wholesale), deserialized, then validated.

use crate::error::{ConfigError, Result};
use narwhal_graph::{TypeRegistry, TypeRegistryEntry};
use orca::{MAX_JITTER, RadialOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub base_radius: f64,
    pub jitter: f64,
    pub seed: u64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let opts = RadialOptions::default();
        Self {
            base_radius: opts.base_radius,
            jitter: opts.jitter,
            seed: opts.random_seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Wheel delta multiplier: `zoom *= exp(-delta * wheel_sensitivity)`.
    pub wheel_sensitivity: f64,
    /// Maximum pointer travel, in screen pixels, for a background press to count as a click.
    pub click_slop: f64,
    /// Factor applied by the zoom-in / zoom-out commands.
    pub zoom_step: f64,
    /// Pressing on a node starts a drag that pins it.
    pub drag_nodes: bool,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 10.0,
            wheel_sensitivity: 0.0015,
            click_slop: 3.0,
            zoom_step: 1.2,
            drag_nodes: false,
        }
    }
}

impl ViewportSettings {
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Node radius in graph units; also the hit-test radius.
    pub node_radius: f64,
    pub background: String,
    pub edge_color: String,
    pub edge_width: f64,
    pub highlight_color: String,
    /// Labels are omitted below this zoom level.
    pub label_min_zoom: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            node_radius: 14.0,
            background: "#0f172a".to_string(),
            edge_color: "#475569".to_string(),
            edge_width: 1.5,
            highlight_color: "#facc15".to_string(),
            label_min_zoom: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutSettings,
    pub viewport: ViewportSettings,
    pub render: RenderSettings,
    pub types: Vec<TypeRegistryEntry>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutSettings::default(),
            viewport: ViewportSettings::default(),
            render: RenderSettings::default(),
            types: TypeRegistry::threat_intel_defaults()
                .entries()
                .cloned()
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Deep-merges `overrides` over the defaults and validates the result.
    pub fn from_value(overrides: &Value) -> Result<Self> {
        let mut merged = serde_json::to_value(Self::default())?;
        deep_merge_value(&mut merged, overrides);
        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        positive("layout.base_radius", layout.base_radius)?;
        if !(layout.jitter.is_finite() && (0.0..=MAX_JITTER).contains(&layout.jitter)) {
            return Err(ConfigError::InvalidSetting {
                key: "layout.jitter",
                message: format!("{} is outside [0, {MAX_JITTER}]", layout.jitter),
            });
        }

        let vp = &self.viewport;
        if !(vp.min_zoom.is_finite() && vp.max_zoom.is_finite())
            || vp.min_zoom <= 0.0
            || vp.min_zoom > vp.max_zoom
        {
            return Err(ConfigError::InvalidZoomRange {
                min: vp.min_zoom,
                max: vp.max_zoom,
            });
        }
        non_negative("viewport.wheel_sensitivity", vp.wheel_sensitivity)?;
        non_negative("viewport.click_slop", vp.click_slop)?;
        if !(vp.zoom_step.is_finite() && vp.zoom_step > 1.0) {
            return Err(ConfigError::InvalidSetting {
                key: "viewport.zoom_step",
                message: format!("{} must be greater than 1", vp.zoom_step),
            });
        }

        positive("render.node_radius", self.render.node_radius)?;
        positive("render.edge_width", self.render.edge_width)?;
        non_negative("render.label_min_zoom", self.render.label_min_zoom)?;

        let mut registry = TypeRegistry::new();
        for entry in &self.types {
            if !registry.register(entry.clone()) {
                return Err(ConfigError::DuplicateType {
                    entity_type: entry.entity_type.clone(),
                });
            }
        }
        Ok(())
    }

    /// Type registry built from `types`, in declaration order. Later duplicates are ignored;
    /// [`EngineConfig::validate`] rejects them.
    pub fn registry(&self) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        for entry in &self.types {
            registry.register(entry.clone());
        }
        registry
    }

    pub fn radial_options(&self) -> RadialOptions {
        RadialOptions {
            base_radius: self.layout.base_radius,
            jitter: self.layout.jitter,
            random_seed: self.layout.seed,
        }
    }
}

fn positive(key: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSetting {
            key,
            message: format!("{v} must be a positive number"),
        })
    }
}

fn non_negative(key: &'static str, v: f64) -> Result<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSetting {
            key,
            message: format!("{v} must be a non-negative number"),
        })
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
