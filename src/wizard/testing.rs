//! Scripted in-process engine for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use crate::engine::{Engine, EngineError, ImageFixture, Result, TransferMode};

#[derive(Default)]
struct StubState {
    pushes: Vec<(&'static str, String)>,
    push_failures: HashMap<&'static str, u32>,
    process_runs: u32,
    verify_calls: u32,
    resets: u32,
    preview_rejections: HashSet<String>,
    preview_delays: HashMap<String, u64>,
    start_directories: Vec<String>,
    destination: Option<String>,
    opened: Vec<String>,
}

/// Engine stand-in whose behavior tests script up front. Cheap to clone;
/// clones share state.
#[derive(Clone, Default)]
pub struct StubEngine {
    state: Rc<RefCell<StubState>>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script what the directory pickers return.
    pub fn with_pickers(directories: &[&str], destination: &str) -> Self {
        let stub = Self::new();
        {
            let mut state = stub.state.borrow_mut();
            state.start_directories = directories.iter().map(|d| d.to_string()).collect();
            state.destination = Some(destination.to_string());
        }
        stub
    }

    pub fn reject_preview(&self, description: &str) {
        self.state
            .borrow_mut()
            .preview_rejections
            .insert(description.to_string());
    }

    pub fn delay_preview(&self, description: &str, millis: u64) {
        self.state
            .borrow_mut()
            .preview_delays
            .insert(description.to_string(), millis);
    }

    /// Make the next `times` pushes of `field` fail.
    pub fn fail_push(&self, field: &'static str, times: u32) {
        self.state.borrow_mut().push_failures.insert(field, times);
    }

    pub fn process_runs(&self) -> u32 {
        self.state.borrow().process_runs
    }

    pub fn verify_calls(&self) -> u32 {
        self.state.borrow().verify_calls
    }

    pub fn resets(&self) -> u32 {
        self.state.borrow().resets
    }

    pub fn pushes(&self) -> Vec<(&'static str, String)> {
        self.state.borrow().pushes.clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.state.borrow().opened.clone()
    }

    fn push(&self, field: &'static str, value: String) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(remaining) = state.push_failures.get_mut(field) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(EngineError::Rejected(format!("scripted {field} failure")));
            }
        }
        state.pushes.push((field, value));
        Ok(())
    }
}

impl Engine for StubEngine {
    async fn select_start_directories(&self) -> Result<Vec<String>> {
        Ok(self.state.borrow().start_directories.clone())
    }

    async fn select_destination_directory(&self) -> Result<Option<String>> {
        Ok(self.state.borrow().destination.clone())
    }

    async fn remove_start_directory(&self, directory: &str) -> Result<Vec<String>> {
        let mut state = self.state.borrow_mut();
        state.start_directories.retain(|d| d != directory);
        Ok(state.start_directories.clone())
    }

    async fn set_min_size(&self, value: Option<u64>) -> Result<()> {
        self.push("min-size", format!("{value:?}"))
    }

    async fn set_min_width(&self, value: Option<u32>) -> Result<()> {
        self.push("min-width", format!("{value:?}"))
    }

    async fn set_min_height(&self, value: Option<u32>) -> Result<()> {
        self.push("min-height", format!("{value:?}"))
    }

    async fn set_naming_convention(&self, value: &str) -> Result<()> {
        self.push("naming-convention", value.to_string())
    }

    async fn set_transfer_mode(&self, value: TransferMode) -> Result<()> {
        self.push("transfer-mode", value.as_str().to_string())
    }

    async fn set_verify(&self, value: bool) -> Result<()> {
        self.push("verify", value.to_string())
    }

    async fn process_run(&self) -> Result<()> {
        self.state.borrow_mut().process_runs += 1;
        Ok(())
    }

    async fn verify_relocation(&self) -> Result<()> {
        self.state.borrow_mut().verify_calls += 1;
        Ok(())
    }

    async fn reset_everything(&self) -> Result<()> {
        self.state.borrow_mut().resets += 1;
        Ok(())
    }

    async fn preview_naming(
        &self,
        template: &str,
        _metadata: &ImageFixture,
        description: &str,
    ) -> Result<String> {
        let delay = self
            .state
            .borrow()
            .preview_delays
            .get(description)
            .copied();
        if let Some(millis) = delay {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
        if self.state.borrow().preview_rejections.contains(description) {
            return Err(EngineError::Rejected("scripted preview rejection".into()));
        }
        Ok(format!("{}/IMG_1234.jpg", template.trim_end_matches('/')))
    }

    fn open_host_location(&self, path: &str) {
        self.state.borrow_mut().opened.push(path.to_string());
    }
}
