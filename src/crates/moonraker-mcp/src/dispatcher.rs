//! Action dispatch pipeline
//!
//! lookup -> argument validation -> request build -> transport -> envelope
//! parse -> shaping. The first failing stage ends the invocation; its error is
//! turned into a failure record.

use crate::catalog::{ActionArgs, ActionCatalog};
use crate::envelope::Envelope;
use crate::error::DispatchError;
use serde_json::Value;
use std::sync::Arc;
use tooling::logging::{format_duration, sanitize_for_logging, truncate_for_logging, LogGuard};
use tooling::runtime::ToolResult;
use tracing::{debug, info, warn};
use utils::RemoteTransport;

const LOGGED_BODY_CHARS: usize = 256;

/// Runs catalog actions against one Moonraker instance
pub struct ActionDispatcher {
    catalog: ActionCatalog,
    transport: Arc<dyn RemoteTransport>,
    base_url: String,
    include_raw_result: bool,
}

impl ActionDispatcher {
    /// Create a dispatcher over the standard catalog
    pub fn new(transport: Arc<dyn RemoteTransport>, base_url: impl Into<String>) -> Self {
        Self {
            catalog: ActionCatalog::standard(),
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            include_raw_result: false,
        }
    }

    /// Add the unshaped `result` to success records as `raw_result`
    pub fn with_raw_result(mut self, include: bool) -> Self {
        self.include_raw_result = include;
        self
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one action; never fails, failures come back as records
    pub async fn dispatch(&self, action: &str, params: &Value) -> ToolResult {
        let guard = LogGuard::new(action);

        match self.run(action, params).await {
            Ok(result) => {
                info!(
                    action,
                    elapsed = %format_duration(guard.elapsed()),
                    "Action succeeded"
                );
                result
            }
            Err(err) => {
                warn!(
                    action,
                    code = err.error_code(),
                    elapsed = %format_duration(guard.elapsed()),
                    error = %sanitize_for_logging(&err.to_string()),
                    "Action failed"
                );
                err.into()
            }
        }
    }

    async fn run(&self, action: &str, params: &Value) -> Result<ToolResult, DispatchError> {
        let spec = self
            .catalog
            .get(action)
            .ok_or_else(|| DispatchError::UnknownAction(action.to_string()))?;

        let args = ActionArgs::validate(spec.params, params)?;
        let call = (spec.build)(&args)?;
        let (request, echo) = call.into_request(&self.base_url);

        debug!(
            action,
            method = %request.method,
            url = %request.url,
            payload = ?request.body,
            "Dispatching to Moonraker"
        );

        let reply = self.transport.send(request).await?;

        debug!(
            action,
            status = reply.status,
            body = %truncate_for_logging(&reply.text(), LOGGED_BODY_CHARS),
            "Moonraker replied"
        );

        let envelope = Envelope::parse(&reply)?;
        let shaped = (spec.shape)(echo, &envelope)?;

        let mut result = ToolResult::success(shaped);
        if self.include_raw_result {
            result.insert("raw_result", envelope.result().clone());
        }
        Ok(result)
    }
}
