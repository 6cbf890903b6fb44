//! Account credit balance and free-credit claims

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::Result;
use crate::transport::{JimengClient, UpstreamRequest};

const USER_CREDIT_URI: &str = "/commerce/v1/benefits/user_credit";
const CREDIT_RECEIVE_URI: &str = "/commerce/v1/benefits/credit_receive";

/// Spendable balance of the account behind a session token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    pub gift_credit: i64,
    pub purchase_credit: i64,
    pub vip_credit: i64,
    /// Sum of the three balances
    pub total_credit: i64,
}

impl Credit {
    pub fn new(gift_credit: i64, purchase_credit: i64, vip_credit: i64) -> Self {
        Self {
            gift_credit,
            purchase_credit,
            vip_credit,
            total_credit: gift_credit + purchase_credit + vip_credit,
        }
    }

    /// Build from the `data` payload of the balance endpoint.
    /// Missing fields count as zero.
    pub fn from_payload(data: &Value) -> Self {
        let credit = data.get("credit");
        let field = |name: &str| {
            credit
                .and_then(|c| c.get(name))
                .and_then(Value::as_i64)
                .unwrap_or(0)
        };
        Self::new(
            field("gift_credit"),
            field("purchase_credit"),
            field("vip_credit"),
        )
    }

    pub fn is_exhausted(&self) -> bool {
        self.total_credit <= 0
    }
}

impl JimengClient {
    /// Read the credit balance
    pub async fn get_credit(&self, token: &str) -> Result<Credit> {
        let request = UpstreamRequest::post(USER_CREDIT_URI)
            .with_json(json!({}))
            .with_header("Referer", self.generate_page_referer());
        let data = self.request(request, token).await?;
        let credit = Credit::from_payload(&data);
        debug!(total = credit.total_credit, "Fetched credit balance");
        Ok(credit)
    }

    /// Claim the daily free credit. The caller decides when this is useful.
    pub async fn receive_credit(&self, token: &str) -> Result<()> {
        let request = UpstreamRequest::post(CREDIT_RECEIVE_URI)
            .with_json(json!({ "time_zone": self.upstream_config().time_zone }))
            .with_header("Referer", self.generate_page_referer());
        self.request(request, token).await?;
        info!("Claimed free credit");
        Ok(())
    }
}
