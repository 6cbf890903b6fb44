//! Job submission

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::transport::{JimengClient, UpstreamRequest};

use super::draft::{babi_param, build_submission};
use super::models::resolve_model;
use super::types::{GenerationJob, GenerationRequest};

const DRAFT_GENERATE_URI: &str = "/mweb/v1/aigc_draft/generate";

impl JimengClient {
    /// Submit one generation and return its job handle.
    ///
    /// An exhausted balance triggers one free-credit claim first. The claim
    /// is best effort: its failure is logged and submission proceeds.
    pub async fn submit(&self, request: &GenerationRequest, token: &str) -> Result<GenerationJob> {
        let upstream_model = resolve_model(&request.model);

        let credit = self.get_credit(token).await?;
        if credit.is_exhausted() {
            info!("Credit exhausted, claiming free credit before submitting");
            if let Err(e) = self.receive_credit(token).await {
                warn!(error = %e, "Free credit claim failed, submitting anyway");
            }
        }

        let body = build_submission(
            upstream_model,
            request,
            &self.upstream_config().assistant_id,
        )?;
        let upstream_request = UpstreamRequest::post(DRAFT_GENERATE_URI)
            .with_query("babi_param", babi_param(upstream_model))
            .with_json(body);

        let data = self.request(upstream_request, token).await?;
        let history_id = history_record_id(&data)
            .ok_or_else(|| Error::generation_failed("History record id missing from submission response"))?;

        info!(history_id = %history_id, model = %request.model, "Submitted generation job");
        Ok(GenerationJob::submitted(history_id))
    }
}

/// `aigc_data.history_record_id`, accepting a string or a number
fn history_record_id(data: &Value) -> Option<String> {
    match data.get("aigc_data")?.get("history_record_id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
