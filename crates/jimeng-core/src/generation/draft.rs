//! Draft payload construction
//!
//! A submission describes one image base component nested inside a draft.
//! Every nesting level carries its own freshly generated identifier, so a
//! payload is never reused across attempts.

use rand::Rng;
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::identity::{generate_uuid, json_encode, url_encode};

use super::types::GenerationRequest;

/// Draft schema version understood by the upstream workbench
pub const DRAFT_VERSION: &str = "3.0.2";

const SEED_FLOOR: u64 = 2_500_000_000;
const SEED_SPAN: u64 = 100_000_000;

/// Random seed in the band the web client uses
pub fn generate_seed() -> u64 {
    SEED_FLOOR + rand::thread_rng().gen_range(0..SEED_SPAN)
}

/// URL-encoded scenario descriptor sent as the `babi_param` query value
pub fn babi_param(upstream_model: &str) -> String {
    url_encode(&json_encode(&json!({
        "scenario": "image_video_generation",
        "feature_key": "aigc_to_image",
        "feature_entrance": "to_image",
        "feature_entrance_detail": format!("to_image-{}", upstream_model),
    })))
}

/// `http_common_info` block; the assistant id travels as a number here
pub fn http_common_info(assistant_id: &str) -> Result<Value> {
    let aid: i64 = assistant_id.trim().parse().map_err(|_| {
        Error::invalid_params(format!("assistant id must be numeric, got {:?}", assistant_id))
    })?;
    Ok(json!({ "aid": aid }))
}

/// Body of a draft generation submission
pub fn build_submission(
    upstream_model: &str,
    request: &GenerationRequest,
    assistant_id: &str,
) -> Result<Value> {
    let metrics_extra = json_encode(&json!({
        "templateId": "",
        "generateCount": 1,
        "promptSource": "custom",
        "templateSource": "",
        "lastRequestId": "",
        "originRequestId": "",
    }));

    Ok(json!({
        "extend": {
            "root_model": upstream_model,
            "template_id": "",
        },
        "submit_id": generate_uuid(true),
        "metrics_extra": metrics_extra,
        "draft_content": json_encode(&draft_content(upstream_model, request)),
        "http_common_info": http_common_info(assistant_id)?,
    }))
}

fn draft_content(upstream_model: &str, request: &GenerationRequest) -> Value {
    let component_id = generate_uuid(true);
    json!({
        "type": "draft",
        "id": generate_uuid(true),
        "min_version": DRAFT_VERSION,
        "is_from_tsn": true,
        "version": DRAFT_VERSION,
        "main_component_id": component_id,
        "component_list": [{
            "type": "image_base_component",
            "id": component_id,
            "min_version": DRAFT_VERSION,
            "generate_type": "generate",
            "aigc_mode": "workbench",
            "abilities": {
                "type": "",
                "id": generate_uuid(true),
                "generate": {
                    "type": "",
                    "id": generate_uuid(true),
                    "core_param": {
                        "type": "",
                        "id": generate_uuid(true),
                        "model": upstream_model,
                        "prompt": request.prompt,
                        "negative_prompt": request.negative_prompt,
                        "seed": generate_seed(),
                        "sample_strength": request.sample_strength,
                        "image_ratio": 1,
                        "large_image_info": {
                            "type": "",
                            "id": generate_uuid(true),
                            "height": request.height,
                            "width": request.width,
                        },
                    },
                    "history_option": {
                        "type": "",
                        "id": generate_uuid(true),
                    },
                },
            },
        }],
    })
}
