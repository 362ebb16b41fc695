//! Wizard session state
//!
//! One exclusively-owned record holds everything the five steps configure.
//! All mutation goes through [`super::controller::StepController`], which
//! pairs each edit with the matching engine push.

use crate::engine::TransferMode;

/// Optional minimum-size/dimension filters applied during the scan.
/// `None` means the filter is off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub min_size: Option<u64>,
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
}

/// All configuration gathered across the wizard steps. Lifecycle is one
/// wizard run; a full reset swaps in `Self::default()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSession {
    pub start_directories: Vec<String>,
    pub destination_directory: String,
    pub filters: FilterCriteria,
    pub naming_convention: String,
    pub transfer_mode: TransferMode,
    pub verify_before_finalize: bool,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self {
            start_directories: Vec::new(),
            destination_directory: String::new(),
            filters: FilterCriteria::default(),
            naming_convention: String::new(),
            transfer_mode: TransferMode::Copy,
            verify_before_finalize: true,
        }
    }
}

impl WizardSession {
    /// The step-1 gate: at least one source and a destination.
    pub fn directories_ready(&self) -> bool {
        !self.start_directories.is_empty() && !self.destination_directory.is_empty()
    }

    /// Replace the source list with the engine picker's result, which is
    /// already deduplicated and ordered.
    pub fn set_start_directories(&mut self, directories: Vec<String>) {
        self.start_directories = directories;
    }

    pub fn set_destination(&mut self, directory: String) {
        self.destination_directory = directory;
    }

    /// Destination with a trailing separator, as prefixed onto naming
    /// previews and completion text.
    pub fn destination_prefix(&self) -> String {
        if self.destination_directory.is_empty() || self.destination_directory.ends_with('/') {
            self.destination_directory.clone()
        } else {
            format!("{}/", self.destination_directory)
        }
    }
}
