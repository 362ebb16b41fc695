//! External processing engine interface.
//!
//! Everything that actually touches the filesystem lives in a separate
//! engine process: directory scanning, EXIF/geo extraction, naming-token
//! substitution, and the move/copy/verify primitives. This module defines
//! the seam the wizard drives it through -- the [`Engine`] trait -- plus the
//! wire protocol and the child-process client implementation.

pub mod client;
pub mod error;
pub mod protocol;

pub use client::EngineClient;
pub use error::{EngineError, Result};
pub use protocol::{
    EngineEvent, FileRecord, GeoLocation, ImageFixture, PipelinePhase, RelocationBatch, Topic,
    TransferMode,
};

/// Remote operations of the processing engine.
///
/// The wizard is generic over this trait so tests can script an engine
/// in-process. All futures run on the single cooperative UI task; no Send
/// bound is required.
#[allow(async_fn_in_trait)]
pub trait Engine: Clone {
    /// Open the host directory picker for source directories. Returns the
    /// engine's full, deduplicated selection.
    async fn select_start_directories(&self) -> Result<Vec<String>>;

    /// Open the host directory picker for the destination. `None` when the
    /// user dismissed the dialog.
    async fn select_destination_directory(&self) -> Result<Option<String>>;

    /// Drop one source directory by value; returns the updated list.
    async fn remove_start_directory(&self, directory: &str) -> Result<Vec<String>>;

    async fn set_min_size(&self, value: Option<u64>) -> Result<()>;
    async fn set_min_width(&self, value: Option<u32>) -> Result<()>;
    async fn set_min_height(&self, value: Option<u32>) -> Result<()>;
    async fn set_naming_convention(&self, value: &str) -> Result<()>;
    async fn set_transfer_mode(&self, value: TransferMode) -> Result<()>;
    async fn set_verify(&self, value: bool) -> Result<()>;

    /// Kick off the find+relocate pipeline. The ack only confirms the run
    /// started; all results arrive as events.
    async fn process_run(&self) -> Result<()>;

    /// Begin the finalize phase from an already-found state.
    async fn verify_relocation(&self) -> Result<()>;

    /// Clear all engine-held session state.
    async fn reset_everything(&self) -> Result<()>;

    /// Resolve a naming template against one synthetic metadata fixture.
    /// May be rejected per call; a rejection only affects this fixture.
    async fn preview_naming(
        &self,
        template: &str,
        metadata: &ImageFixture,
        description: &str,
    ) -> Result<String>;

    /// Open a path in the host shell. Fire-and-forget, no return contract.
    fn open_host_location(&self, path: &str);
}
