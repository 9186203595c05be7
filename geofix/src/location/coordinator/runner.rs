//! Async actor for the location coordinator.
//!
//! [`LocationCoordinator::spawn`] moves the state machine onto a tokio task
//! that owns it exclusively. Callers talk to it through a cloneable
//! [`CoordinatorHandle`]; platform results arrive on the coordinator's event
//! receiver. Both streams are handled on the one task, so no two callbacks
//! ever run concurrently.
//!
//! # Design Notes
//!
//! The run loop uses `tokio::select!` with biased polling:
//! 1. Cancellation check (highest priority)
//! 2. Platform events
//! 3. Caller commands
//!
//! Platform events win over commands so a status query sent after a result
//! was queued observes that result. A platform that floods the queue would
//! starve commands, so at most [`MAX_EVENT_BURST`] events are handled in a
//! row while a command is waiting. Under such a flood a status query only
//! observes the results handled before it.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::location::platform::LocationPlatform;
use crate::location::presentation::PresentationSink;
use crate::location::sink::EventReceiver;

use super::core::{CoordinatorError, LocationCoordinator, StartOutcome};
use super::status::CoordinatorStatus;

const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Platform events handled back to back before a waiting command gets a turn.
const MAX_EVENT_BURST: usize = 64;

enum Command {
    Start(oneshot::Sender<Result<StartOutcome, CoordinatorError>>),
    Stop(oneshot::Sender<()>),
    OpenSettings(oneshot::Sender<bool>),
    Status(oneshot::Sender<CoordinatorStatus>),
}

impl<P, S> LocationCoordinator<P, S>
where
    P: LocationPlatform + 'static,
    S: PresentationSink + 'static,
{
    /// Run the coordinator on a new tokio task.
    ///
    /// `events` must be the receiver returned by [`LocationCoordinator::new`].
    /// The task stops acquisition and exits when the handle is shut down or
    /// every handle is dropped.
    pub fn spawn(self, events: EventReceiver) -> (CoordinatorHandle, JoinHandle<()>) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let cancellation = CancellationToken::new();

        let task = tokio::spawn(self.run(events, commands_rx, cancellation.clone()));

        let handle = CoordinatorHandle {
            commands: commands_tx,
            cancellation,
        };
        (handle, task)
    }

    async fn run(
        mut self,
        mut events: EventReceiver,
        mut commands: mpsc::Receiver<Command>,
        cancellation: CancellationToken,
    ) {
        tracing::info!("Location coordinator started");

        let mut burst = 0usize;
        loop {
            let events_open = burst < MAX_EVENT_BURST || commands.is_empty();

            tokio::select! {
                biased;

                _ = cancellation.cancelled() => break,

                event = events.recv(), if events_open => {
                    let Some(event) = event else { break };
                    self.handle_event(event);
                    burst += 1;
                }

                command = commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command);
                    burst = 0;
                }
            }
        }

        self.stop();
        tracing::info!("Location coordinator stopped");
    }

    fn handle_command(&mut self, command: Command) {
        // A caller that stopped waiting is not an error
        match command {
            Command::Start(reply) => {
                let _ = reply.send(self.start());
            }
            Command::Stop(reply) => {
                self.stop();
                let _ = reply.send(());
            }
            Command::OpenSettings(reply) => {
                let _ = reply.send(self.open_location_settings());
            }
            Command::Status(reply) => {
                let _ = reply.send(self.status());
            }
        }
    }
}

/// Handle to a spawned coordinator.
///
/// Cheap to clone. Every method returns [`CoordinatorError::Shutdown`] once
/// the coordinator task has exited.
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::Sender<Command>,
    cancellation: CancellationToken,
}

impl std::fmt::Debug for CoordinatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorHandle")
            .field("running", &self.is_running())
            .finish()
    }
}

impl CoordinatorHandle {
    /// Begin an acquisition attempt.
    pub async fn start(&self) -> Result<StartOutcome, CoordinatorError> {
        self.request(Command::Start).await?
    }

    /// Stop acquisition. Returns once subscriptions have been removed.
    pub async fn stop(&self) -> Result<(), CoordinatorError> {
        self.request(Command::Stop).await
    }

    /// Open platform location settings if they are currently offered.
    pub async fn open_location_settings(&self) -> Result<bool, CoordinatorError> {
        self.request(Command::OpenSettings).await
    }

    pub async fn status(&self) -> Result<CoordinatorStatus, CoordinatorError> {
        self.request(Command::Status).await
    }

    /// Stop the coordinator task. Acquisition is stopped before it exits.
    pub fn shutdown(&self) {
        self.cancellation.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancellation.is_cancelled() && !self.commands.is_closed()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, CoordinatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| CoordinatorError::Shutdown)?;
        reply_rx.await.map_err(|_| CoordinatorError::Shutdown)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;
    use crate::location::coordinator::{CoordinatorConfig, CoordinatorState};
    use crate::location::platform::PermissionResponse;
    use crate::location::presentation::{Fix, LocationEvent};
    use crate::location::simulated::SimulatedPlatform;
    use crate::location::state::{PositionSample, PositionSource};

    fn spawn(
        platform: &SimulatedPlatform,
    ) -> (
        CoordinatorHandle,
        JoinHandle<()>,
        mpsc::UnboundedReceiver<LocationEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (coordinator, events) =
            LocationCoordinator::new(platform.clone(), tx, CoordinatorConfig::default());
        let (handle, task) = coordinator.spawn(events);
        (handle, task, rx)
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<LocationEvent>) -> LocationEvent {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("presentation channel closed")
    }

    fn enabled_platform() -> SimulatedPlatform {
        let platform = SimulatedPlatform::new();
        platform.set_enabled(PositionSource::Precise, true);
        platform.set_enabled(PositionSource::Approximate, true);
        platform
    }

    #[tokio::test]
    async fn test_start_presents_last_known() {
        let platform = enabled_platform();
        platform.grant_all();
        let sample = PositionSample::observed_now(PositionSource::Precise, 53.63, 9.98, 5.0);
        platform.set_last_known(sample);

        let (handle, _task, mut rx) = spawn(&platform);

        assert_eq!(handle.start().await.unwrap(), StartOutcome::Acquiring);
        assert_eq!(
            next_event(&mut rx).await,
            LocationEvent::Fix(Fix::from(&sample))
        );
    }

    #[tokio::test]
    async fn test_live_sample_through_actor() {
        let platform = enabled_platform();
        platform.grant_all();
        let (handle, _task, mut rx) = spawn(&platform);

        handle.start().await.unwrap();
        assert_eq!(next_event(&mut rx).await, LocationEvent::Searching);

        let live = PositionSample::observed_now(PositionSource::Approximate, 43.6, 1.4, 90.0);
        assert_eq!(platform.emit(live), 1);

        assert_eq!(next_event(&mut rx).await, LocationEvent::Fix(Fix::from(&live)));
        let status = handle.status().await.unwrap();
        assert_eq!(status.current.sample(), Some(&live));
    }

    #[tokio::test]
    async fn test_prompt_result_processed_before_status() {
        let platform = enabled_platform();
        let (handle, _task, _rx) = spawn(&platform);

        assert_eq!(
            handle.start().await.unwrap(),
            StartOutcome::AwaitingAuthorization
        );
        assert!(platform.respond_to_prompt(PermissionResponse::granted()));

        let status = handle.status().await.unwrap();
        assert_eq!(status.state, CoordinatorState::Acquiring);
        assert_eq!(status.active_sources.len(), 2);
    }

    #[tokio::test]
    async fn test_stop_removes_subscriptions() {
        let platform = enabled_platform();
        platform.grant_all();
        let (handle, _task, _rx) = spawn(&platform);

        handle.start().await.unwrap();
        assert_eq!(platform.subscription_count(), 2);

        handle.stop().await.unwrap();
        assert_eq!(platform.subscription_count(), 0);
        assert_eq!(
            handle.status().await.unwrap().state,
            CoordinatorState::Idle
        );
    }

    #[tokio::test]
    async fn test_shutdown_stops_acquisition() {
        let platform = enabled_platform();
        platform.grant_all();
        let (handle, task, _rx) = spawn(&platform);

        handle.start().await.unwrap();
        handle.shutdown();
        task.await.unwrap();

        assert!(!handle.is_running());
        assert_eq!(platform.subscription_count(), 0);
        assert_eq!(handle.start().await, Err(CoordinatorError::Shutdown));
    }

    #[tokio::test]
    async fn test_event_flood_does_not_starve_commands() {
        let platform = enabled_platform();
        platform.grant_all();
        let (handle, _task, _rx) = spawn(&platform);
        handle.start().await.unwrap();

        // Each sample is ~111 m north of the previous one, past the throttle
        let samples: Vec<_> = (0..MAX_EVENT_BURST * 3)
            .map(|i| {
                PositionSample::observed_now(PositionSource::Precise, i as f64 * 0.001, 0.0, 5.0)
            })
            .collect();
        for sample in &samples {
            assert_eq!(platform.emit(*sample), 1);
        }

        let status = handle.status().await.unwrap();
        let seen = status.current.sample().copied();
        assert!(seen.is_some());
        assert_ne!(seen.as_ref(), samples.last());

        // The rest of the flood is still handled afterwards
        while handle.status().await.unwrap().current.sample() != samples.last() {}
    }

    #[tokio::test]
    async fn test_open_settings_after_all_disabled() {
        let platform = SimulatedPlatform::new();
        let (handle, _task, mut rx) = spawn(&platform);

        assert_eq!(
            handle.start().await.unwrap(),
            StartOutcome::AllSourcesDisabled
        );
        assert_eq!(next_event(&mut rx).await, LocationEvent::AllSourcesDisabled);

        // No launcher registered
        assert!(!handle.open_location_settings().await.unwrap());
    }
}
