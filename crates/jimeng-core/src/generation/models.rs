//! Public model names and their upstream identifiers

use serde::Serialize;

/// Model used when a name is unknown or omitted
pub const DEFAULT_MODEL: &str = "jimeng-2.1";

/// Public model name to upstream model identifier
pub const MODEL_MAP: &[(&str, &str)] = &[
    ("jimeng-2.1", "high_aes_general_v21_L:general_v2.1_L"),
    ("jimeng-2.0-pro", "high_aes_general_v20_L:general_v2.0_L"),
    ("jimeng-2.0", "high_aes_general_v20:general_v2.0"),
    ("jimeng-1.4", "high_aes_general_v14:general_v1.4"),
    ("jimeng-xl-pro", "text2img_xl_sft"),
];

/// One entry of the model listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub object: &'static str,
    pub owned_by: &'static str,
    /// Identifier sent upstream
    pub upstream_id: &'static str,
}

fn lookup(model: &str) -> Option<&'static str> {
    MODEL_MAP
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, upstream)| *upstream)
}

/// Resolve a public model name. Unknown names fall back to the default model.
pub fn resolve_model(model: &str) -> &'static str {
    lookup(model)
        .or_else(|| lookup(DEFAULT_MODEL))
        .unwrap_or(MODEL_MAP[0].1)
}

pub fn is_known_model(model: &str) -> bool {
    lookup(model).is_some()
}

/// Models in the shape chat front-ends expect from a `/models` listing
pub fn list_models() -> Vec<ModelInfo> {
    MODEL_MAP
        .iter()
        .map(|&(id, upstream_id)| ModelInfo {
            id,
            object: "model",
            owned_by: "jimeng",
            upstream_id,
        })
        .collect()
}
