//! Job queue mutations

use super::params::ActionArgs;
use super::RemoteCall;
use crate::error::DispatchError;
use serde_json::json;
use tooling::validation::Validator;

const JOB_PATH: &str = "/server/job_queue/job";
const JUMP_PATH: &str = "/server/job_queue/jump";

/// Which jobs a removal targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveTarget {
    All,
    Jobs(Vec<String>),
}

/// A change to the job queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueMutationRequest {
    Enqueue { filenames: Vec<String>, reset: bool },
    Remove(RemoveTarget),
    Jump { job_id: String },
}

impl QueueMutationRequest {
    /// From `filenames` (non-empty) and optional `reset`
    pub fn enqueue(args: &ActionArgs) -> Result<Self, DispatchError> {
        let filenames = args
            .string_list("filenames")
            .ok_or_else(|| DispatchError::MissingParameter("filenames".to_string()))?;
        let filenames = Validator::new(filenames, "filenames").not_empty().validate()?;

        Ok(QueueMutationRequest::Enqueue {
            filenames,
            reset: args.bool("reset").unwrap_or(false),
        })
    }

    /// From `job_ids` or `all`; one of them must select something
    ///
    /// `all = true` wins over any listed ids.
    pub fn remove(args: &ActionArgs) -> Result<Self, DispatchError> {
        if args.bool("all") == Some(true) {
            return Ok(QueueMutationRequest::Remove(RemoveTarget::All));
        }

        match args.string_list("job_ids") {
            Some(ids) if !ids.is_empty() => Ok(QueueMutationRequest::Remove(RemoveTarget::Jobs(ids))),
            _ => Err(DispatchError::InvalidRequest(
                "remove_job requires 'job_ids' or 'all': true".to_string(),
            )),
        }
    }

    /// From a non-blank `job_id`
    pub fn jump(args: &ActionArgs) -> Result<Self, DispatchError> {
        let job_id = args.require_str("job_id")?.to_string();
        let job_id = Validator::new(job_id, "job_id").not_empty().validate()?;
        Ok(QueueMutationRequest::Jump { job_id })
    }

    /// The controller call performing this mutation
    pub fn to_call(&self) -> RemoteCall {
        match self {
            QueueMutationRequest::Enqueue { filenames, reset } => RemoteCall::post(JOB_PATH)
                .with_payload(json!({"filenames": filenames, "reset": reset})),
            QueueMutationRequest::Remove(RemoveTarget::All) => {
                RemoteCall::delete(JOB_PATH).with_payload(json!({"all": true}))
            }
            QueueMutationRequest::Remove(RemoveTarget::Jobs(ids)) => {
                RemoteCall::delete(JOB_PATH).with_payload(json!({"job_ids": ids}))
            }
            QueueMutationRequest::Jump { job_id } => {
                RemoteCall::post(JUMP_PATH).with_payload(json!({"job_id": job_id}))
            }
        }
    }
}
