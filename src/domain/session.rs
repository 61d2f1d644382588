//! Session state machine.
//!
//! The whole client is a reducer: an [`Input`] (operator action or backend
//! reply) is applied to a [`Session`], which returns the [`Effect`]s the
//! runtime must perform. No I/O happens here, so every transition can be
//! exercised without a backend.
//!
//! Two composed states, entered once and in order:
//! - device selection: `Unselected --(use_device success)--> DeviceConfirmed`
//! - recognition: `NotLoaded -> Loading -> Loaded`, with `Loading -> NotLoaded`
//!   on failure and `Loaded -> NotLoaded` when the operator stops listening.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::domain::config::StaleResponsePolicy;
use crate::domain::device::{parse_device_index, Device, DeviceId, SessionState};
use crate::domain::recognition::{Ack, ModelState, TranscriptField, TranscriptSnapshot};

/// Identifies the poll tick that issued a transcript request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollTicket {
    /// Polling scope the request belongs to. Bumped every time polling starts.
    pub generation: u64,
    /// Monotonic tick counter, never reused within a session.
    pub tick: u64,
}

/// Everything that can happen to a session.
#[derive(Debug, Clone)]
pub enum Input {
    /// Operator asked for the device list.
    RefreshDevices,
    DevicesListed(Vec<Device>),
    DeviceListFailed(String),
    /// Operator submitted raw text from the device index field.
    SubmitDeviceIndex(String),
    DeviceAcknowledged {
        device_id: DeviceId,
        /// `Err` carries the transport failure description.
        outcome: Result<Ack, String>,
    },
    /// Operator asked to load the model.
    LoadModel,
    ModelAcknowledged(Result<Ack, String>),
    /// Operator asked the backend to stop listening.
    StopListening,
    ListeningStopped(Result<(), String>),
    PollTick { generation: u64 },
    TextReceived {
        ticket: PollTicket,
        field: TranscriptField,
        text: String,
    },
    PollFailed {
        ticket: PollTicket,
        field: TranscriptField,
        error: String,
    },
    /// The session is going away; nothing may be written afterwards.
    Teardown,
}

/// Notifications for the rendering shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum UiEvent {
    DevicesChanged(Vec<Device>),
    /// Blocking notice: the operator must fix the input before continuing.
    ValidationNotice(String),
    DeviceConfirmed { device_id: String },
    ModelStateChanged(ModelState),
    ModelLoaded,
    TranscriptChanged(TranscriptSnapshot),
    Closed,
}

/// Work the runtime must carry out after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ListDevices,
    UseDevice(DeviceId),
    LoadModel,
    StopListening,
    StartPolling { generation: u64 },
    StopPolling,
    Fetch {
        field: TranscriptField,
        ticket: PollTicket,
    },
    Emit(UiEvent),
}

/// Client-side session state, owned by exactly one operator session.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    model: ModelState,
    devices: Vec<Device>,
    transcript: TranscriptSnapshot,
    policy: StaleResponsePolicy,
    generation: u64,
    next_tick: u64,
    last_final_tick: u64,
    last_partial_tick: u64,
    closed: bool,
}

impl Session {
    pub fn new(policy: StaleResponsePolicy) -> Self {
        Self {
            state: SessionState::Unselected,
            model: ModelState::NotLoaded,
            devices: Vec::new(),
            transcript: TranscriptSnapshot::default(),
            policy,
            generation: 0,
            next_tick: 1,
            last_final_tick: 0,
            last_partial_tick: 0,
            closed: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn model_state(&self) -> ModelState {
        self.model
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn transcript(&self) -> &TranscriptSnapshot {
        &self.transcript
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Apply one input and return the effects to perform, in order.
    pub fn step(&mut self, input: Input) -> Vec<Effect> {
        if self.closed {
            debug!(?input, "session closed, input dropped");
            return Vec::new();
        }

        match input {
            Input::RefreshDevices => self.on_refresh_devices(),
            Input::DevicesListed(devices) => self.on_devices_listed(devices),
            Input::DeviceListFailed(error) => self.on_device_list_failed(error),
            Input::SubmitDeviceIndex(raw) => self.on_submit_device_index(&raw),
            Input::DeviceAcknowledged { device_id, outcome } => {
                self.on_device_acknowledged(device_id, outcome)
            }
            Input::LoadModel => self.on_load_model(),
            Input::ModelAcknowledged(outcome) => self.on_model_acknowledged(outcome),
            Input::StopListening => self.on_stop_listening(),
            Input::ListeningStopped(outcome) => {
                match outcome {
                    Ok(()) => info!("backend stopped listening"),
                    Err(error) => error!(%error, "stop_listening request failed"),
                }
                Vec::new()
            }
            Input::PollTick { generation } => self.on_poll_tick(generation),
            Input::TextReceived {
                ticket,
                field,
                text,
            } => self.on_text_received(ticket, field, text),
            Input::PollFailed {
                ticket,
                field,
                error,
            } => {
                // Recurs every tick while the backend is down; keep it quiet.
                debug!(tick = ticket.tick, ?field, %error, "transcript poll failed, keeping last text");
                Vec::new()
            }
            Input::Teardown => self.on_teardown(),
        }
    }

    fn on_refresh_devices(&mut self) -> Vec<Effect> {
        if self.state.is_confirmed() {
            debug!("device already confirmed, refresh ignored");
            return Vec::new();
        }
        vec![Effect::ListDevices]
    }

    fn on_devices_listed(&mut self, devices: Vec<Device>) -> Vec<Effect> {
        if self.state.is_confirmed() {
            return Vec::new();
        }
        debug!(count = devices.len(), "device list replaced");
        self.devices = devices;
        vec![Effect::Emit(UiEvent::DevicesChanged(self.devices.clone()))]
    }

    fn on_device_list_failed(&mut self, error: String) -> Vec<Effect> {
        warn!(%error, "Error retrieving devices");
        if self.state.is_confirmed() {
            return Vec::new();
        }
        self.devices.clear();
        vec![Effect::Emit(UiEvent::DevicesChanged(Vec::new()))]
    }

    fn on_submit_device_index(&mut self, raw: &str) -> Vec<Effect> {
        if self.state.is_confirmed() {
            debug!(input = raw, "device already confirmed, submission ignored");
            return Vec::new();
        }
        match parse_device_index(raw) {
            Ok(device_id) => {
                info!(%device_id, "submitting device selection");
                vec![Effect::UseDevice(device_id)]
            }
            Err(err) => vec![Effect::Emit(UiEvent::ValidationNotice(err.to_string()))],
        }
    }

    fn on_device_acknowledged(
        &mut self,
        device_id: DeviceId,
        outcome: Result<Ack, String>,
    ) -> Vec<Effect> {
        if self.state.is_confirmed() {
            debug!(%device_id, "late device acknowledgement ignored");
            return Vec::new();
        }
        match outcome {
            Ok(Ack::Success) => {
                info!(%device_id, "device confirmed by backend");
                self.state = SessionState::DeviceConfirmed;
                vec![Effect::Emit(UiEvent::DeviceConfirmed {
                    device_id: device_id.to_string(),
                })]
            }
            Ok(Ack::Rejected(status)) => {
                warn!(%device_id, %status, "backend rejected device selection");
                Vec::new()
            }
            Err(error) => {
                error!(%device_id, %error, "use_device request failed");
                Vec::new()
            }
        }
    }

    fn on_load_model(&mut self) -> Vec<Effect> {
        if !self.state.is_confirmed() {
            warn!("load requested before a device was confirmed, ignored");
            return Vec::new();
        }
        if !self.model.can_load() {
            debug!(state = ?self.model, "model load already requested, ignored");
            return Vec::new();
        }
        self.model = ModelState::Loading;
        vec![
            Effect::Emit(UiEvent::ModelStateChanged(ModelState::Loading)),
            Effect::LoadModel,
        ]
    }

    fn on_model_acknowledged(&mut self, outcome: Result<Ack, String>) -> Vec<Effect> {
        if self.model != ModelState::Loading {
            debug!(state = ?self.model, "unexpected model acknowledgement ignored");
            return Vec::new();
        }
        match outcome {
            Ok(Ack::Success) => {
                self.model = ModelState::Loaded;
                self.generation += 1;
                info!(generation = self.generation, "model loaded, polling started");
                vec![
                    Effect::Emit(UiEvent::ModelStateChanged(ModelState::Loaded)),
                    Effect::Emit(UiEvent::ModelLoaded),
                    Effect::StartPolling {
                        generation: self.generation,
                    },
                ]
            }
            Ok(Ack::Rejected(status)) => {
                error!(%status, "error loading model");
                self.model = ModelState::NotLoaded;
                vec![Effect::Emit(UiEvent::ModelStateChanged(ModelState::NotLoaded))]
            }
            Err(error) => {
                error!(%error, "load_model request failed");
                self.model = ModelState::NotLoaded;
                vec![Effect::Emit(UiEvent::ModelStateChanged(ModelState::NotLoaded))]
            }
        }
    }

    fn on_stop_listening(&mut self) -> Vec<Effect> {
        if !self.model.is_loaded() {
            debug!(state = ?self.model, "nothing to stop");
            return Vec::new();
        }
        self.model = ModelState::NotLoaded;
        info!(generation = self.generation, "polling stopped");
        vec![
            Effect::StopPolling,
            Effect::Emit(UiEvent::ModelStateChanged(ModelState::NotLoaded)),
            Effect::StopListening,
        ]
    }

    fn on_poll_tick(&mut self, generation: u64) -> Vec<Effect> {
        if !self.model.is_loaded() || generation != self.generation {
            return Vec::new();
        }
        let ticket = PollTicket {
            generation,
            tick: self.next_tick,
        };
        self.next_tick += 1;
        vec![
            Effect::Fetch {
                field: TranscriptField::Final,
                ticket,
            },
            Effect::Fetch {
                field: TranscriptField::Partial,
                ticket,
            },
        ]
    }

    fn on_text_received(
        &mut self,
        ticket: PollTicket,
        field: TranscriptField,
        text: String,
    ) -> Vec<Effect> {
        if !self.model.is_loaded() || ticket.generation != self.generation {
            debug!(tick = ticket.tick, ?field, "response from cancelled polling discarded");
            return Vec::new();
        }

        let last_applied = match field {
            TranscriptField::Final => &mut self.last_final_tick,
            TranscriptField::Partial => &mut self.last_partial_tick,
        };
        if self.policy == StaleResponsePolicy::Discard && ticket.tick <= *last_applied {
            debug!(
                tick = ticket.tick,
                last_applied = *last_applied,
                ?field,
                "stale transcript response discarded"
            );
            return Vec::new();
        }
        *last_applied = (*last_applied).max(ticket.tick);

        if self.transcript.field(field) == text {
            return Vec::new();
        }
        self.transcript.set(field, text);
        vec![Effect::Emit(UiEvent::TranscriptChanged(
            self.transcript.clone(),
        ))]
    }

    fn on_teardown(&mut self) -> Vec<Effect> {
        self.closed = true;
        let mut effects = Vec::new();
        if self.model.is_loaded() {
            effects.push(Effect::StopPolling);
        }
        effects.push(Effect::Emit(UiEvent::Closed));
        info!("session torn down");
        effects
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(StaleResponsePolicy::default())
    }
}
