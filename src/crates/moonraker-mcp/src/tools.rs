//! Tool registry exposed to the front end
//!
//! Every catalog action is a tool, plus `analyze_snapshot` served by the
//! vision adapter.

use crate::catalog::{input_schema, ActionArgs, ParamKind, ParamSpec};
use crate::dispatcher::ActionDispatcher;
use crate::vision::VisionAnalysisAdapter;
use serde_json::Value;
use std::sync::Arc;
use tooling::runtime::{ToolDefinition, ToolResult};

pub const ANALYZE_SNAPSHOT: &str = "analyze_snapshot";

const ANALYZE_PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "prompt",
    ParamKind::String,
    "Question or instruction about the current webcam image",
)];

/// All tools this server offers
#[derive(Clone)]
pub struct ToolRegistry {
    dispatcher: Arc<ActionDispatcher>,
    vision: Arc<VisionAnalysisAdapter>,
}

impl ToolRegistry {
    pub fn new(dispatcher: ActionDispatcher, vision: VisionAnalysisAdapter) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            vision: Arc::new(vision),
        }
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    pub fn vision(&self) -> &VisionAnalysisAdapter {
        &self.vision
    }

    pub fn contains(&self, name: &str) -> bool {
        name == ANALYZE_SNAPSHOT || self.dispatcher.catalog().contains(name)
    }

    /// Catalog actions first, then `analyze_snapshot`
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions = self.dispatcher.catalog().definitions();
        definitions.push(ToolDefinition::new(
            ANALYZE_SNAPSHOT,
            "Capture a webcam snapshot from the printer and analyze it with Gemini using the given prompt",
            input_schema(ANALYZE_PARAMS),
        ));
        definitions
    }

    /// Invoke a tool by name
    pub async fn call(&self, name: &str, arguments: &Value) -> ToolResult {
        if name != ANALYZE_SNAPSHOT {
            return self.dispatcher.dispatch(name, arguments).await;
        }

        match ActionArgs::validate(ANALYZE_PARAMS, arguments) {
            Ok(args) => self.vision.analyze(args.str("prompt").unwrap_or_default()).await,
            Err(err) => err.into(),
        }
    }
}
