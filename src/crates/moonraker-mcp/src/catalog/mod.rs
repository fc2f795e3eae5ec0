//! The catalog of printer actions
//!
//! Each [`ActionSpec`] declares its parameters, how to build the controller
//! call, and how to shape a valid reply into the success record. Actions fall
//! into four shapes: stateless triggers, selector triggers, G-code commands,
//! and structured queries.

pub mod gcode;
pub mod params;
pub mod queue;

use crate::envelope::{Envelope, EnvelopeFailure};
use crate::error::DispatchError;
use gcode::Heater;
use queue::QueueMutationRequest;
use serde_json::{json, Map, Value};
use tooling::runtime::ToolDefinition;
use utils::{HttpMethod, RemoteRequest};

pub use params::{input_schema, ActionArgs, ParamKind, ParamSpec};

/// Builds the controller call from validated arguments
pub type BuildFn = fn(&ActionArgs) -> Result<RemoteCall, DispatchError>;

/// Turns a valid envelope into the success record
///
/// Receives the fields the builder asked to echo back.
pub type ShapeFn = fn(Map<String, Value>, &Envelope) -> Result<Value, EnvelopeFailure>;

/// A controller call relative to the base URL
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    pub method: HttpMethod,
    pub path: String,
    pub payload: Option<Value>,
    /// Fields copied into the success record
    pub echo: Map<String, Value>,
}

impl RemoteCall {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            payload: None,
            echo: Map::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn echo(mut self, key: &str, value: Value) -> Self {
        self.echo.insert(key.to_string(), value);
        self
    }

    /// Absolute URL under `base_url`
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }

    /// Split into the outbound request and the echo fields
    pub fn into_request(self, base_url: &str) -> (RemoteRequest, Map<String, Value>) {
        let mut request = RemoteRequest::new(self.method, self.url(base_url));
        if let Some(payload) = self.payload {
            request = request.with_json(payload);
        }
        (request, self.echo)
    }
}

/// One catalog entry
pub struct ActionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub build: BuildFn,
    pub shape: ShapeFn,
}

impl ActionSpec {
    /// JSON schema of this action's arguments
    pub fn input_schema(&self) -> Value {
        input_schema(self.params)
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name, self.description, self.input_schema())
    }
}

impl std::fmt::Debug for ActionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// A closed, immutable set of actions
#[derive(Debug, Clone, Copy)]
pub struct ActionCatalog {
    actions: &'static [ActionSpec],
}

impl ActionCatalog {
    /// The full Moonraker action surface
    pub fn standard() -> Self {
        Self { actions: ACTIONS }
    }

    pub fn get(&self, name: &str) -> Option<&'static ActionSpec> {
        self.actions.iter().find(|action| action.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ActionSpec> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.iter().map(ActionSpec::definition).collect()
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

const NO_PARAMS: &[ParamSpec] = &[];

const RESTART_ACTIONS: &[&str] = &["emergency_stop", "firmware_restart"];
const PRINT_ACTIONS: &[&str] = &["pause", "resume", "cancel"];
const QUEUE_ACTIONS: &[&str] = &["pause", "start"];

const PRINT_STATUS_OBJECTS: &[&str] = &["webhooks", "print_stats", "display_status"];

const RESTART_PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "action",
    ParamKind::Selector(RESTART_ACTIONS),
    "Restart kind: emergency_stop halts immediately, firmware_restart reboots the firmware",
)];

const PRINT_PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "action",
    ParamKind::Selector(PRINT_ACTIONS),
    "What to do with the current print job",
)];

const QUEUE_PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "action",
    ParamKind::Selector(QUEUE_ACTIONS),
    "Pause or start processing the job queue",
)];

const ENQUEUE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required(
        "filenames",
        ParamKind::StringList,
        "G-code files to add, relative to the gcodes root",
    ),
    ParamSpec::optional(
        "reset",
        ParamKind::Boolean,
        "Clear the queue before adding (default false)",
    ),
];

const REMOVE_PARAMS: &[ParamSpec] = &[
    ParamSpec::optional("job_ids", ParamKind::StringList, "IDs of the jobs to remove"),
    ParamSpec::optional("all", ParamKind::Boolean, "Remove every queued job"),
];

const JUMP_PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "job_id",
    ParamKind::String,
    "ID of the job to move to the front of the queue",
)];

const SET_TEMPERATURE_PARAMS: &[ParamSpec] = &[
    ParamSpec::required(
        "component",
        ParamKind::Selector(Heater::NAMES),
        "Heater to set",
    ),
    ParamSpec::required(
        "temperature",
        ParamKind::Number,
        "Target temperature in degrees Celsius (0 turns the heater off)",
    ),
];

const HEATER_PARAMS: &[ParamSpec] = &[ParamSpec::required(
    "temperature",
    ParamKind::Number,
    "Target temperature in degrees Celsius (0 turns the heater off)",
)];

static ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "get_printer_state",
        description: "Get state information about the 3D printer",
        params: NO_PARAMS,
        build: build_printer_info,
        shape: shape_printer_state,
    },
    ActionSpec {
        name: "get_print_status",
        description: "Get the current print job status from the 3D printer",
        params: NO_PARAMS,
        build: build_print_status,
        shape: shape_print_status,
    },
    ActionSpec {
        name: "emergency_stop",
        description: "Activate an emergency stop on the 3D printer",
        params: NO_PARAMS,
        build: build_emergency_stop,
        shape: shape_echo_result,
    },
    ActionSpec {
        name: "firmware_restart",
        description: "Activate a complete firmware restart of the 3D printer",
        params: NO_PARAMS,
        build: build_firmware_restart,
        shape: shape_echo_result,
    },
    ActionSpec {
        name: "restart_printer",
        description: "Emergency stop or firmware restart of the 3D printer",
        params: RESTART_PARAMS,
        build: build_restart_printer,
        shape: shape_echo_result,
    },
    ActionSpec {
        name: "pause_print",
        description: "Pause the current print job on the 3D printer",
        params: NO_PARAMS,
        build: build_pause_print,
        shape: shape_echo_result,
    },
    ActionSpec {
        name: "resume_print",
        description: "Resume the current print job on the 3D printer",
        params: NO_PARAMS,
        build: build_resume_print,
        shape: shape_echo_result,
    },
    ActionSpec {
        name: "cancel_print",
        description: "Cancel the current print job on the 3D printer",
        params: NO_PARAMS,
        build: build_cancel_print,
        shape: shape_echo_result,
    },
    ActionSpec {
        name: "control_print",
        description: "Pause, resume or cancel the current print job",
        params: PRINT_PARAMS,
        build: build_control_print,
        shape: shape_echo_result,
    },
    ActionSpec {
        name: "get_job_queue_status",
        description: "Get the job queue state and the queued jobs",
        params: NO_PARAMS,
        build: build_job_queue_status,
        shape: shape_job_queue,
    },
    ActionSpec {
        name: "enqueue_job",
        description: "Add one or more G-code files to the job queue",
        params: ENQUEUE_PARAMS,
        build: build_enqueue_job,
        shape: shape_job_queue,
    },
    ActionSpec {
        name: "remove_job",
        description: "Remove jobs from the job queue by ID, or all of them",
        params: REMOVE_PARAMS,
        build: build_remove_job,
        shape: shape_job_queue,
    },
    ActionSpec {
        name: "pause_job_queue",
        description: "Stop loading new jobs from the job queue",
        params: NO_PARAMS,
        build: build_pause_job_queue,
        shape: shape_job_queue,
    },
    ActionSpec {
        name: "start_job_queue",
        description: "Start loading jobs from the job queue",
        params: NO_PARAMS,
        build: build_start_job_queue,
        shape: shape_job_queue,
    },
    ActionSpec {
        name: "control_job_queue",
        description: "Pause or start the job queue",
        params: QUEUE_PARAMS,
        build: build_control_job_queue,
        shape: shape_job_queue,
    },
    ActionSpec {
        name: "jump_job",
        description: "Move a queued job to the front of the job queue",
        params: JUMP_PARAMS,
        build: build_jump_job,
        shape: shape_job_queue,
    },
    ActionSpec {
        name: "get_temperatures",
        description: "Ask the printer to report its current temperatures (M105)",
        params: NO_PARAMS,
        build: build_get_temperatures,
        shape: shape_echo_result,
    },
    ActionSpec {
        name: "set_temperature",
        description: "Set the target temperature of the nozzle, bed or enclosure",
        params: SET_TEMPERATURE_PARAMS,
        build: build_set_temperature,
        shape: shape_echo_result,
    },
    ActionSpec {
        name: "set_nozzle_temperature",
        description: "Set the nozzle target temperature",
        params: HEATER_PARAMS,
        build: build_set_nozzle_temperature,
        shape: shape_echo_result,
    },
    ActionSpec {
        name: "set_bed_temperature",
        description: "Set the heated bed target temperature",
        params: HEATER_PARAMS,
        build: build_set_bed_temperature,
        shape: shape_echo_result,
    },
    ActionSpec {
        name: "set_enclosure_temperature",
        description: "Set the enclosure target temperature",
        params: HEATER_PARAMS,
        build: build_set_enclosure_temperature,
        shape: shape_echo_result,
    },
];

// Request builders

fn trigger(path: &str, action: &str) -> RemoteCall {
    RemoteCall::post(path).echo("action", json!(action))
}

/// POST `{prefix}/{choice}` for the selector named `param`
fn selector_trigger(args: &ActionArgs, param: &str, prefix: &str) -> Result<RemoteCall, DispatchError> {
    let choice = args.require_str(param)?;
    Ok(trigger(&format!("{}/{}", prefix, choice), choice))
}

fn gcode_call(script: String) -> RemoteCall {
    RemoteCall::post("/printer/gcode/script")
        .with_payload(json!({"script": script}))
        .echo("gcode", json!(script))
}

fn heater_call(heater: Heater, args: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    let target = args.require_number("temperature")? + 0.0;
    let script = heater.set_temperature(target)?;
    Ok(gcode_call(script)
        .echo("component", json!(heater.as_str()))
        .echo("target", json!(target)))
}

fn build_printer_info(_: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(RemoteCall::get("/printer/info"))
}

fn build_print_status(_: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(RemoteCall::get(format!(
        "/printer/objects/query?{}",
        PRINT_STATUS_OBJECTS.join("&")
    )))
}

fn build_emergency_stop(_: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(trigger("/printer/emergency_stop", "emergency_stop"))
}

fn build_firmware_restart(_: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(trigger("/printer/firmware_restart", "firmware_restart"))
}

fn build_restart_printer(args: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    selector_trigger(args, "action", "/printer")
}

fn build_pause_print(_: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(trigger("/printer/print/pause", "pause"))
}

fn build_resume_print(_: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(trigger("/printer/print/resume", "resume"))
}

fn build_cancel_print(_: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(trigger("/printer/print/cancel", "cancel"))
}

fn build_control_print(args: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    selector_trigger(args, "action", "/printer/print")
}

fn build_job_queue_status(_: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(RemoteCall::get("/server/job_queue/status"))
}

fn build_enqueue_job(args: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(QueueMutationRequest::enqueue(args)?.to_call())
}

fn build_remove_job(args: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(QueueMutationRequest::remove(args)?.to_call())
}

fn build_pause_job_queue(_: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(RemoteCall::post("/server/job_queue/pause"))
}

fn build_start_job_queue(_: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(RemoteCall::post("/server/job_queue/start"))
}

fn build_control_job_queue(args: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    let choice = args.require_str("action")?;
    Ok(RemoteCall::post(format!("/server/job_queue/{}", choice)))
}

fn build_jump_job(args: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(QueueMutationRequest::jump(args)?.to_call())
}

fn build_get_temperatures(_: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    Ok(gcode_call(gcode::READ_TEMPERATURES.to_string()))
}

fn build_set_temperature(args: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    let name = args.require_str("component")?;
    let heater = Heater::from_name(name).ok_or_else(|| DispatchError::InvalidSelector {
        param: "component".to_string(),
        value: name.to_string(),
        allowed: Heater::NAMES.to_vec(),
    })?;
    heater_call(heater, args)
}

fn build_set_nozzle_temperature(args: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    heater_call(Heater::Nozzle, args)
}

fn build_set_bed_temperature(args: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    heater_call(Heater::Bed, args)
}

fn build_set_enclosure_temperature(args: &ActionArgs) -> Result<RemoteCall, DispatchError> {
    heater_call(Heater::Enclosure, args)
}

// Result shapers

fn shape_echo_result(mut echo: Map<String, Value>, envelope: &Envelope) -> Result<Value, EnvelopeFailure> {
    echo.insert("result".to_string(), envelope.result().clone());
    Ok(Value::Object(echo))
}

fn shape_printer_state(_: Map<String, Value>, envelope: &Envelope) -> Result<Value, EnvelopeFailure> {
    let mut record = Map::new();
    record.insert("state".into(), envelope.field_or("state", json!("Unknown")));
    record.insert(
        "state_message".into(),
        envelope.field_or("state_message", json!("Unknown")),
    );
    for optional in ["hostname", "software_version"] {
        if let Some(value) = envelope.result().get(optional).filter(|v| !v.is_null()) {
            record.insert(optional.into(), value.clone());
        }
    }
    Ok(Value::Object(record))
}

fn shape_print_status(_: Map<String, Value>, envelope: &Envelope) -> Result<Value, EnvelopeFailure> {
    let status = envelope.require_field("status")?;
    let record: Map<String, Value> = PRINT_STATUS_OBJECTS
        .iter()
        .map(|object| {
            let value = status.get(*object).cloned().unwrap_or_else(|| json!({}));
            (object.to_string(), value)
        })
        .collect();
    Ok(Value::Object(record))
}

fn shape_job_queue(_: Map<String, Value>, envelope: &Envelope) -> Result<Value, EnvelopeFailure> {
    let queue_state = envelope.require_field("queue_state")?.clone();
    Ok(json!({
        "queued_jobs": envelope.field_or("queued_jobs", json!([])),
        "queue_state": queue_state,
    }))
}
