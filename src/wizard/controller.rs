//! Wizard step controller
//!
//! The top-level state machine. Owns the session record, the progress
//! model, and the subscription registry; gates forward navigation; and
//! triggers engine operations at step transitions. Everything runs on the
//! single cooperative UI task.

use crate::engine::{Engine, EngineEvent, PipelinePhase, Topic, TransferMode};

use super::error::{ConfigPushError, PipelineFailure};
use super::preview::{self, NamingPreview};
use super::progress::{ProcessingPhase, ProgressModel};
use super::push;
use super::registry::{Delivery, SubscriptionRegistry};
use super::session::WizardSession;
use super::Step;

pub struct StepController<E: Engine> {
    engine: E,
    step: Step,
    session: WizardSession,
    progress: ProgressModel,
    registry: SubscriptionRegistry<ProgressModel>,
    has_started: bool,
    previews: Vec<NamingPreview>,
    previews_stale: bool,
    push_warning: Option<ConfigPushError>,
}

impl<E: Engine> StepController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            step: Step::Directories,
            session: WizardSession::default(),
            progress: ProgressModel::new(),
            registry: SubscriptionRegistry::new(),
            has_started: false,
            previews: Vec::new(),
            previews_stale: true,
            push_warning: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn progress(&self) -> &ProgressModel {
        &self.progress
    }

    pub fn previews(&self) -> &[NamingPreview] {
        &self.previews
    }

    pub fn previews_stale(&self) -> bool {
        self.previews_stale
    }

    pub fn push_warning(&self) -> Option<&ConfigPushError> {
        self.push_warning.as_ref()
    }

    pub fn run_started(&self) -> bool {
        self.has_started
    }

    /// The proceed gate for the current step.
    pub fn can_proceed(&self) -> bool {
        match self.step {
            Step::Directories => self.session.directories_ready(),
            Step::Filters | Step::Naming | Step::Organise => true,
            Step::Processing => self.progress.gate_open(),
        }
    }

    /// Advance one step if the gate allows it. Entering the execution step
    /// starts the processing run.
    pub async fn go_next(&mut self) -> bool {
        if !self.can_proceed() {
            return false;
        }
        let Some(next) = self.step.next() else {
            return false;
        };
        self.step = next;
        if self.step == Step::Processing {
            self.ensure_processing_started().await;
        }
        true
    }

    /// Step back. A no-op on the first step. Off the execution step this is
    /// refused while a run is in flight; once the run is terminal it clears
    /// the run state so a later re-entry starts fresh.
    pub fn go_previous(&mut self) -> bool {
        let Some(previous) = self.step.previous() else {
            return false;
        };
        if self.step == Step::Processing {
            if !self.progress.is_terminal() {
                return false;
            }
            self.exit_processing();
        }
        self.step = previous;
        true
    }

    /// Trigger the engine run for the execution step. Latched: however many
    /// times the entry condition is re-evaluated, the engine sees exactly
    /// one `process-run` per session. Subscriptions are installed before
    /// the call is issued so early events cannot be lost.
    pub async fn ensure_processing_started(&mut self) {
        if self.step != Step::Processing || self.has_started {
            return;
        }
        self.install_subscriptions();
        self.has_started = true;
        if let Err(e) = self.engine.process_run().await {
            tracing::error!(error = %e, "failed to start processing run");
            self.progress.pipeline_failed(PipelineFailure {
                phase: PipelinePhase::Finding,
                message: e.to_string(),
            });
        }
    }

    fn install_subscriptions(&mut self) {
        self.registry
            .subscribe(Topic::FindingFiles, Delivery::Persistent, |progress, ev| {
                if let EngineEvent::FindingFiles { files } = ev {
                    progress.replace_found(files.clone());
                }
            });
        self.registry
            .subscribe(Topic::FindingComplete, Delivery::Once, |progress, _| {
                progress.finding_complete();
            });
        self.registry
            .subscribe(Topic::RelocatingStart, Delivery::Once, |progress, _| {
                progress.relocating_start();
            });
        self.registry
            .subscribe(Topic::RelocatingFiles, Delivery::Persistent, |progress, ev| {
                if let EngineEvent::RelocatingFiles(batch) = ev {
                    progress.apply_relocating(batch.clone());
                }
            });
        self.registry
            .subscribe(Topic::RelocatingComplete, Delivery::Once, |progress, _| {
                progress.relocating_complete();
            });
        self.registry
            .subscribe(Topic::PipelineError, Delivery::Persistent, |progress, ev| {
                if let EngineEvent::PipelineError { phase, message } = ev {
                    progress.pipeline_failed(PipelineFailure {
                        phase: *phase,
                        message: message.clone(),
                    });
                }
            });
    }

    fn exit_processing(&mut self) {
        self.registry.clear();
        self.progress = ProgressModel::new();
        self.has_started = false;
    }

    /// Route an engine event through the registry into the progress model.
    pub fn handle_event(&mut self, event: &EngineEvent) -> usize {
        self.registry.dispatch(&mut self.progress, event)
    }

    pub async fn pick_start_directories(&mut self) {
        match self.engine.select_start_directories().await {
            Ok(directories) => self.session.set_start_directories(directories),
            Err(e) => tracing::warn!(error = %e, "start directory picker failed"),
        }
    }

    pub async fn pick_destination(&mut self) {
        match self.engine.select_destination_directory().await {
            Ok(Some(directory)) => {
                self.session.set_destination(directory);
                // Fixture paths embed the destination, so previews go stale.
                self.previews_stale = true;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "destination picker failed"),
        }
    }

    pub async fn remove_start_directory(&mut self, directory: &str) {
        match self.engine.remove_start_directory(directory).await {
            Ok(directories) => self.session.set_start_directories(directories),
            Err(e) => tracing::warn!(error = %e, "failed to remove start directory"),
        }
    }

    pub async fn set_min_size(&mut self, value: Option<u64>) {
        self.session.filters.min_size = value;
        let engine = self.engine.clone();
        self.push_warning = push::push_field("minimum file size", || engine.set_min_size(value)).await;
    }

    pub async fn set_min_width(&mut self, value: Option<u32>) {
        self.session.filters.min_width = value;
        let engine = self.engine.clone();
        self.push_warning = push::push_field("minimum width", || engine.set_min_width(value)).await;
    }

    pub async fn set_min_height(&mut self, value: Option<u32>) {
        self.session.filters.min_height = value;
        let engine = self.engine.clone();
        self.push_warning = push::push_field("minimum height", || engine.set_min_height(value)).await;
    }

    pub async fn set_naming_convention(&mut self, template: &str) {
        self.session.naming_convention = template.to_string();
        self.previews_stale = true;
        let engine = self.engine.clone();
        self.push_warning =
            push::push_field("naming convention", || engine.set_naming_convention(template)).await;
    }

    pub async fn set_transfer_mode(&mut self, mode: TransferMode) {
        self.session.transfer_mode = mode;
        let engine = self.engine.clone();
        self.push_warning = push::push_field("transfer mode", || engine.set_transfer_mode(mode)).await;
    }

    pub async fn toggle_transfer_mode(&mut self) {
        self.set_transfer_mode(self.session.transfer_mode.toggled())
            .await;
    }

    pub async fn set_verify(&mut self, value: bool) {
        self.session.verify_before_finalize = value;
        let engine = self.engine.clone();
        self.push_warning = push::push_field("verify flag", || engine.set_verify(value)).await;
    }

    pub async fn toggle_verify(&mut self) {
        self.set_verify(!self.session.verify_before_finalize).await;
    }

    /// Re-resolve naming previews if a template or destination edit made
    /// them stale.
    pub async fn refresh_previews(&mut self) {
        if !self.previews_stale {
            return;
        }
        self.previews_stale = false;
        let fixtures = preview::example_fixtures(&self.session.destination_prefix());
        let template = self.session.naming_convention.clone();
        self.previews = preview::resolve(&self.engine, &template, &fixtures).await;
    }

    /// Kick off the finalize phase. Only meaningful on the execution step,
    /// after a non-empty scan, when verification was requested.
    pub async fn verify(&mut self) -> bool {
        if self.step != Step::Processing
            || !self.session.verify_before_finalize
            || self.progress.phase() != ProcessingPhase::FindingComplete
            || !self.progress.gate_open()
        {
            return false;
        }
        match self.engine.verify_relocation().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "verify request failed");
                false
            }
        }
    }

    /// Full reset after the user acknowledges completion: engine state,
    /// session, progress, subscriptions, and the run latch all return to
    /// their initial defaults.
    pub async fn acknowledge_and_reset(&mut self) {
        if let Err(e) = self.engine.reset_everything().await {
            tracing::warn!(error = %e, "engine reset failed");
        }
        self.registry.clear();
        self.session = WizardSession::default();
        self.progress = ProgressModel::new();
        self.has_started = false;
        self.previews.clear();
        self.previews_stale = true;
        self.push_warning = None;
        self.step = Step::Directories;
    }

    pub fn open_destination(&self) {
        if !self.session.destination_directory.is_empty() {
            self.engine
                .open_host_location(&self.session.destination_directory);
        }
    }

    pub fn open_path(&self, path: &str) {
        self.engine.open_host_location(path);
    }
}
