//! Job status polling

use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::transport::JimengClient;

use super::draft::http_common_info;
use super::types::{GenerationJob, JobStatus};

const HISTORY_URI: &str = "/mweb/v1/get_history_by_ids";

/// Edge length of the full-size rendition requested from history lookups
const HISTORY_IMAGE_EDGE: u32 = 2048;

const SMART_CROP_SIZES: &[(u32, u32)] = &[
    (360, 360),
    (480, 480),
    (720, 720),
    (720, 480),
    (360, 240),
    (240, 320),
    (480, 640),
];

const NORMAL_EDGES: &[u32] = &[2400, 1080, 720, 480, 360];

/// Renditions the upstream service should pre-render for a finished job
fn image_scene_list() -> Vec<Value> {
    let crops = SMART_CROP_SIZES.iter().map(|&(width, height)| {
        json!({
            "scene": "smart_crop",
            "width": width,
            "height": height,
            "uniq_key": format!("smart_crop-w:{}-h:{}", width, height),
            "format": "webp",
        })
    });
    let normals = NORMAL_EDGES.iter().map(|&edge| {
        json!({
            "scene": "normal",
            "width": edge,
            "height": edge,
            "uniq_key": edge.to_string(),
            "format": "webp",
        })
    });
    crops.chain(normals).collect()
}

fn history_body(history_id: &str, assistant_id: &str) -> Result<Value> {
    Ok(json!({
        "history_ids": [history_id],
        "image_info": {
            "width": HISTORY_IMAGE_EDGE,
            "height": HISTORY_IMAGE_EDGE,
            "format": "webp",
            "image_scene_list": image_scene_list(),
        },
        "http_common_info": http_common_info(assistant_id)?,
    }))
}

/// Fold one history record into the job
fn apply_record(job: &mut GenerationJob, record: &Value) {
    job.status = record.get("status").and_then(status_code).map(JobStatus::from_code);
    job.fail_code = record.get("fail_code").and_then(normalize_fail_code);
    job.items = record
        .get("item_list")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
}

fn status_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn normalize_fail_code(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn a terminal job into its item list or a typed error
fn finish(job: GenerationJob) -> Result<Vec<Value>> {
    if job.status == Some(JobStatus::Failed) {
        if job.is_content_filtered() {
            return Err(Error::content_filtered());
        }
        return Err(Error::generation_failed(format!(
            "Image generation failed (fail_code={})",
            job.fail_code.as_deref().unwrap_or("unknown")
        )));
    }
    Ok(job.items)
}

/// Null, false, zero, or an empty string, array or object
fn is_blank(record: &Value) -> bool {
    match record {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

impl JimengClient {
    /// Look up the current state of a job once
    pub async fn refresh_job(&self, job: &mut GenerationJob, token: &str) -> Result<()> {
        let body = history_body(&job.history_id, &self.upstream_config().assistant_id)?;
        let data = self.post(HISTORY_URI, body, token).await?;
        let record = data
            .get(&job.history_id)
            .filter(|record| !is_blank(record))
            .ok_or_else(|| Error::generation_failed("History record missing from status response"))?;
        apply_record(job, record);
        Ok(())
    }

    /// Wait for a job to reach a terminal status.
    ///
    /// Sleeps `poll_interval_ms` before every lookup. Polls until the status
    /// leaves in-progress, or until `max_poll_attempts` lookups when set.
    pub async fn poll_job(&self, mut job: GenerationJob, token: &str) -> Result<GenerationJob> {
        let interval = Duration::from_millis(self.generation_config().poll_interval_ms);
        let ceiling = self.generation_config().max_poll_attempts;
        let mut attempts: u32 = 0;

        loop {
            if let Some(max) = ceiling {
                if attempts >= max {
                    warn!(history_id = %job.history_id, attempts, "Job still in progress at poll ceiling");
                    return Err(Error::generation_failed(format!(
                        "Job {} still in progress after {} status checks",
                        job.history_id, attempts
                    )));
                }
            }

            tokio::time::sleep(interval).await;
            attempts += 1;
            self.refresh_job(&mut job, token).await?;
            debug!(history_id = %job.history_id, status = ?job.status, attempts, "Polled job");

            if job.status != Some(JobStatus::InProgress) {
                break;
            }
        }

        info!(history_id = %job.history_id, status = ?job.status, "Job reached terminal status");
        Ok(job)
    }

    /// Poll a job by history id and return its raw result items
    pub async fn poll(&self, history_id: &str, token: &str) -> Result<Vec<Value>> {
        let job = self
            .poll_job(GenerationJob::submitted(history_id), token)
            .await?;
        finish(job)
    }
}
