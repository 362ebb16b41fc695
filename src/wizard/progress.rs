//! Processing-run progress model
//!
//! Accumulates the engine's streamed events into a displayable view. Exists
//! only while the wizard sits on the execution step and is discarded whole
//! on reset.
//!
//! Contract notes carried over from the engine protocol:
//! - Repeatable deliveries *replace* the file list, never merge; an entry
//!   absent from a newer snapshot disappears.
//! - `totalRelocated`/`totalFiles` are authoritative, not derived locally,
//!   but are clamped monotonic within a run.
//! - Events for a phase that already completed are protocol violations and
//!   are ignored.

use std::collections::BTreeMap;

use crate::engine::{FileRecord, RelocationBatch};

use super::error::PipelineFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingPhase {
    #[default]
    Idle,
    Finding,
    FindingComplete,
    RelocatingStart,
    Relocating,
    RelocatingComplete,
}

#[derive(Debug, Default)]
pub struct ProgressModel {
    phase: ProcessingPhase,
    total_files: u64,
    total_relocated: u64,
    files: Vec<FileRecord>,
    failure: Option<PipelineFailure>,
}

impl ProgressModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ProcessingPhase {
        self.phase
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn found_count(&self) -> usize {
        self.files.len()
    }

    pub fn total_files(&self) -> u64 {
        self.total_files
    }

    pub fn total_relocated(&self) -> u64 {
        self.total_relocated
    }

    pub fn failure(&self) -> Option<&PipelineFailure> {
        self.failure.as_ref()
    }

    /// `finding-files`: replace the displayed list with the snapshot.
    pub fn replace_found(&mut self, files: BTreeMap<String, FileRecord>) {
        match self.phase {
            ProcessingPhase::Idle | ProcessingPhase::Finding => {
                self.phase = ProcessingPhase::Finding;
                self.files = files.into_values().collect();
            }
            _ => {
                tracing::debug!(phase = ?self.phase, "ignoring finding-files after phase completed");
            }
        }
    }

    /// `finding-complete`: the scan is done. Zero accumulated files is a
    /// terminal empty-result state.
    pub fn finding_complete(&mut self) {
        match self.phase {
            ProcessingPhase::Idle | ProcessingPhase::Finding => {
                self.phase = ProcessingPhase::FindingComplete;
            }
            _ => {
                tracing::debug!(phase = ?self.phase, "ignoring duplicate finding-complete");
            }
        }
    }

    /// `relocating-start`: files are about to move.
    pub fn relocating_start(&mut self) {
        match self.phase {
            ProcessingPhase::FindingComplete => {
                self.phase = ProcessingPhase::RelocatingStart;
            }
            _ => {
                tracing::debug!(phase = ?self.phase, "ignoring relocating-start out of order");
            }
        }
    }

    /// `relocating-files`: authoritative totals plus a replacement snapshot.
    pub fn apply_relocating(&mut self, batch: RelocationBatch) {
        match self.phase {
            ProcessingPhase::RelocatingStart | ProcessingPhase::Relocating => {
                self.phase = ProcessingPhase::Relocating;
                self.total_files = self.total_files.max(batch.total_files);
                self.total_relocated = self.total_relocated.max(batch.total_relocated);
                self.files = batch.files.into_values().collect();
            }
            _ => {
                tracing::debug!(phase = ?self.phase, "ignoring relocating-files after phase completed");
            }
        }
    }

    /// `relocating-complete`: the run is finished; the completion
    /// acknowledgment may now be presented.
    pub fn relocating_complete(&mut self) {
        match self.phase {
            ProcessingPhase::RelocatingStart | ProcessingPhase::Relocating => {
                self.phase = ProcessingPhase::RelocatingComplete;
            }
            _ => {
                tracing::debug!(phase = ?self.phase, "ignoring duplicate relocating-complete");
            }
        }
    }

    /// `pipeline-error`: the engine reported a failed run.
    pub fn pipeline_failed(&mut self, failure: PipelineFailure) {
        tracing::warn!(%failure, "engine reported pipeline failure");
        self.failure = Some(failure);
    }

    /// Proceed gate while on the execution step: open once the scan
    /// completed with at least one file, closed again for the duration of
    /// relocation, reopened when relocation completes. Never open after a
    /// reported failure.
    pub fn gate_open(&self) -> bool {
        if self.failure.is_some() {
            return false;
        }
        match self.phase {
            ProcessingPhase::FindingComplete => !self.files.is_empty(),
            ProcessingPhase::RelocatingComplete => true,
            _ => false,
        }
    }

    /// The scan finished without matching anything.
    pub fn empty_result(&self) -> bool {
        self.phase == ProcessingPhase::FindingComplete && self.files.is_empty()
    }

    /// A state from which the run cannot progress further: completed,
    /// empty, or failed. Backward navigation off the execution step is only
    /// allowed from here.
    pub fn is_terminal(&self) -> bool {
        self.phase == ProcessingPhase::RelocatingComplete
            || self.empty_result()
            || self.failure.is_some()
    }
}
