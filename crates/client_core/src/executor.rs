use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Identity, Network},
    error::{ApiError, ApiException},
    protocol::{ExecuteRequest, ExecuteResponse, MoveCall},
};
use tracing::{debug, info};
use url::Url;

use crate::{ExecutionOutcome, TransactionExecutor};

/// Hands move calls to an external wallet bridge over HTTP. The bridge owns
/// the keys; this side never signs.
pub struct WalletBridgeExecutor {
    http: Client,
    execute_url: Url,
    network: Network,
}

impl WalletBridgeExecutor {
    pub fn new(bridge_url: &Url, network: Network, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build wallet bridge http client")?;
        Ok(Self {
            http,
            execute_url: execute_endpoint(bridge_url)?,
            network,
        })
    }

    pub fn execute_url(&self) -> &Url {
        &self.execute_url
    }
}

fn execute_endpoint(bridge_url: &Url) -> Result<Url> {
    if bridge_url.cannot_be_a_base() {
        return Err(anyhow!("wallet bridge url '{bridge_url}' cannot be a base url"));
    }

    let mut base = bridge_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("execute")
        .with_context(|| format!("invalid wallet bridge url '{bridge_url}'"))
}

#[async_trait]
impl TransactionExecutor for WalletBridgeExecutor {
    async fn execute(&self, sender: &Identity, call: MoveCall) -> Result<ExecutionOutcome> {
        debug!(
            url = %self.execute_url,
            network = %self.network,
            "posting move call to wallet bridge"
        );
        let res = self
            .http
            .post(self.execute_url.clone())
            .json(&ExecuteRequest {
                sender: sender.clone(),
                network: self.network,
                call,
            })
            .send()
            .await
            .context("failed to reach wallet bridge")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                return Err(ApiException::from(api_error).into());
            }
            return Err(anyhow!("wallet bridge returned {status}: {body}"));
        }

        let body: ExecuteResponse = res
            .json()
            .await
            .context("wallet bridge sent an invalid execute response")?;
        Ok(ExecutionOutcome {
            digest: body.digest,
        })
    }
}

/// Logs the call instead of submitting it. Used when no bridge is configured.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    submitted: AtomicU64,
}

#[async_trait]
impl TransactionExecutor for DryRunExecutor {
    async fn execute(&self, sender: &Identity, call: MoveCall) -> Result<ExecutionOutcome> {
        let payload = serde_json::to_string(&call)?;
        let sequence = self.submitted.fetch_add(1, Ordering::Relaxed) + 1;
        info!(sender = %sender, payload = %payload, "dry run: move call not submitted");
        Ok(ExecutionOutcome {
            digest: format!("dry-run-{sequence}"),
        })
    }
}

#[cfg(test)]
#[path = "tests/executor_tests.rs"]
mod tests;
