use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::app::polling::PollingScope;
use crate::domain::{
    Ack, Device, DomainError, Effect, Input, ModelState, Session, SessionState,
    StaleResponsePolicy, TranscriptSnapshot, UiEvent,
};
use crate::ports::SpeechBackend;

const EVENT_CAPACITY: usize = 64;

struct Inner {
    session: Mutex<Session>,
    polling: Mutex<Option<PollingScope>>,
    backend: Arc<dyn SpeechBackend>,
    events: broadcast::Sender<UiEvent>,
    poll_interval: Duration,
    root: CancellationToken,
}

/// Drives a [`Session`]: feeds it operator actions and backend replies, and
/// carries out the effects it returns.
///
/// Every backend call runs in its own task, so replies arrive in whatever
/// order the backend produces them. Cloning is cheap and shares the session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn SpeechBackend>,
        poll_interval: Duration,
        policy: StaleResponsePolicy,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                session: Mutex::new(Session::new(policy)),
                polling: Mutex::new(None),
                backend,
                events,
                poll_interval,
                root: CancellationToken::new(),
            }),
        }
    }

    /// Subscribe to rendering events.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.inner.events.subscribe()
    }

    /// Re-read the device list. Failures degrade to an empty list.
    pub fn refresh_device_list(&self) {
        self.dispatch(Input::RefreshDevices);
    }

    /// Validate the operator's device index and, if it is a number, ask the
    /// backend to use it. Invalid input is reported without touching the network.
    pub fn submit_device_index(&self, raw: &str) -> Result<(), DomainError> {
        self.ensure_open()?;
        // The session emits the validation notice; the caller also gets the error.
        let validated = crate::domain::parse_device_index(raw).map(|_| ());
        self.dispatch(Input::SubmitDeviceIndex(raw.to_string()));
        validated
    }

    /// Request a model load. No-op while a load is in flight or done.
    pub fn load_model(&self) {
        self.dispatch(Input::LoadModel);
    }

    /// Stop polling and tell the backend to stop listening.
    pub fn stop_listening(&self) {
        self.dispatch(Input::StopListening);
    }

    /// Tear the session down. Replies still in flight are dropped on arrival.
    pub fn shutdown(&self) {
        self.dispatch(Input::Teardown);
        self.inner.root.cancel();
    }

    pub fn session_state(&self) -> SessionState {
        self.inner.session.lock().state()
    }

    pub fn model_state(&self) -> ModelState {
        self.inner.session.lock().model_state()
    }

    pub fn devices(&self) -> Vec<Device> {
        self.inner.session.lock().devices().to_vec()
    }

    pub fn transcript(&self) -> TranscriptSnapshot {
        self.inner.session.lock().transcript().clone()
    }

    pub fn is_polling(&self) -> bool {
        self.inner
            .polling
            .lock()
            .as_ref()
            .is_some_and(|scope| !scope.is_finished())
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.inner.session.lock().is_closed() {
            return Err(DomainError::SessionClosed);
        }
        Ok(())
    }

    /// Apply an input and run the resulting effects. The session lock is
    /// released before any effect runs.
    fn dispatch(&self, input: Input) {
        let effects = self.inner.session.lock().step(input);
        for effect in effects {
            self.run(effect);
        }
    }

    fn run(&self, effect: Effect) {
        match effect {
            Effect::ListDevices => {
                let this = self.clone();
                tokio::spawn(async move {
                    let input = match this.inner.backend.list_devices().await {
                        Ok(devices) => Input::DevicesListed(devices),
                        Err(e) => Input::DeviceListFailed(e.to_string()),
                    };
                    this.dispatch(input);
                });
            }
            Effect::UseDevice(device_id) => {
                let this = self.clone();
                tokio::spawn(async move {
                    let outcome = this
                        .inner
                        .backend
                        .use_device(device_id)
                        .await
                        .map(|reply| Ack::from(&reply))
                        .map_err(|e| e.to_string());
                    this.dispatch(Input::DeviceAcknowledged { device_id, outcome });
                });
            }
            Effect::LoadModel => {
                let this = self.clone();
                tokio::spawn(async move {
                    let outcome = this
                        .inner
                        .backend
                        .load_model()
                        .await
                        .map(|reply| Ack::from(&reply))
                        .map_err(|e| e.to_string());
                    this.dispatch(Input::ModelAcknowledged(outcome));
                });
            }
            Effect::StopListening => {
                let this = self.clone();
                tokio::spawn(async move {
                    let outcome = this
                        .inner
                        .backend
                        .stop_listening()
                        .await
                        .map(|reply| debug!(?reply, "stop_listening replied"))
                        .map_err(|e| e.to_string());
                    this.dispatch(Input::ListeningStopped(outcome));
                });
            }
            Effect::StartPolling { generation } => {
                let this = self.clone();
                let scope = PollingScope::spawn(
                    self.inner.poll_interval,
                    self.inner.root.child_token(),
                    move || this.dispatch(Input::PollTick { generation }),
                );
                if let Some(previous) = self.inner.polling.lock().replace(scope) {
                    warn!("previous polling scope still present, cancelling it");
                    previous.cancel();
                }
            }
            Effect::StopPolling => {
                if let Some(scope) = self.inner.polling.lock().take() {
                    scope.cancel();
                }
            }
            Effect::Fetch { field, ticket } => {
                let this = self.clone();
                tokio::spawn(async move {
                    let input = match this.inner.backend.transcript(field).await {
                        Ok(text) => Input::TextReceived {
                            ticket,
                            field,
                            text,
                        },
                        Err(e) => Input::PollFailed {
                            ticket,
                            field,
                            error: e.to_string(),
                        },
                    };
                    this.dispatch(input);
                });
            }
            Effect::Emit(event) => {
                // No subscribers is fine; the session state is still queryable.
                let _ = self.inner.events.send(event);
            }
        }
    }
}
