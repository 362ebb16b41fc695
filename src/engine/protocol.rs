//! Wire protocol spoken with the external processing engine.
//!
//! The engine is a child process; both directions are newline-delimited JSON.
//! Requests carry a correlation id and a kebab-case `op` tag. Responses echo
//! the id with either a `result` or an `error`. Events are pushed by the
//! engine at any time and are tagged by `event`; payload field names are
//! camelCase on the wire.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single request sent to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: Uuid,
    #[serde(flatten)]
    pub op: RequestOp,
}

impl Request {
    pub fn new(op: RequestOp) -> Self {
        Self {
            id: Uuid::new_v4(),
            op,
        }
    }
}

/// Engine operations, one variant per remote call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum RequestOp {
    SelectStartDirectories,
    SelectDestinationDirectory,
    RemoveStartDirectory { directory: String },
    SetMinSize { value: Option<u64> },
    SetMinWidth { value: Option<u32> },
    SetMinHeight { value: Option<u32> },
    SetNamingConvention { value: String },
    SetTransferMode { value: TransferMode },
    SetVerify { value: bool },
    ProcessRun,
    VerifyRelocation,
    ResetEverything,
    PreviewNaming {
        template: String,
        metadata: ImageFixture,
        description: String,
    },
    OpenHostLocation { path: String },
}

/// Response to a [`Request`], matched by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Anything the engine may write on its stdout.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Response(Response),
    Event(EngineEvent),
}

/// How files reach their destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    #[default]
    Copy,
    Move,
}

impl TransferMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Copy => Self::Move,
            Self::Move => Self::Copy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Move => "move",
        }
    }

    /// Past-tense form used in status and completion text.
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Copy => "copied",
            Self::Move => "moved",
        }
    }
}

/// One file the engine plans to (or did) relocate.
///
/// Records are created engine-side only; the id in the surrounding map is
/// engine-assigned and duplicate `from` paths are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default)]
    pub relocated: bool,
}

impl FileRecord {
    /// Destination path as displayed: a collision suffix is spliced in
    /// before the file extension (`photo.jpg` + `2` -> `photo-2.jpg`).
    pub fn display_to(&self) -> String {
        let Some(suffix) = self.suffix.as_deref() else {
            return self.to.clone();
        };
        match self.to.rfind('.') {
            Some(dot) if dot > self.to.rfind('/').map_or(0, |s| s + 1) => {
                format!("{}-{}{}", &self.to[..dot], suffix, &self.to[dot..])
            }
            _ => format!("{}-{}", self.to, suffix),
        }
    }
}

/// Payload of a `relocating-files` event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocationBatch {
    pub total_files: u64,
    pub total_relocated: u64,
    pub files: BTreeMap<String, FileRecord>,
}

/// Phase names the engine reports in a `pipeline-error` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelinePhase {
    Finding,
    Relocating,
    Verifying,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finding => write!(f, "finding"),
            Self::Relocating => write!(f, "relocating"),
            Self::Verifying => write!(f, "verifying"),
        }
    }
}

/// Events streamed by the engine during a processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum EngineEvent {
    FindingFiles { files: BTreeMap<String, FileRecord> },
    FindingComplete,
    RelocatingStart,
    RelocatingFiles(RelocationBatch),
    RelocatingComplete,
    PipelineError { phase: PipelinePhase, message: String },
}

impl EngineEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::FindingFiles { .. } => Topic::FindingFiles,
            Self::FindingComplete => Topic::FindingComplete,
            Self::RelocatingStart => Topic::RelocatingStart,
            Self::RelocatingFiles(_) => Topic::RelocatingFiles,
            Self::RelocatingComplete => Topic::RelocatingComplete,
            Self::PipelineError { .. } => Topic::PipelineError,
        }
    }
}

/// Subscription topics, one per engine event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    FindingFiles,
    FindingComplete,
    RelocatingStart,
    RelocatingFiles,
    RelocatingComplete,
    PipelineError,
}

/// Geo fields a fixture (or the engine) may attach to image metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
}

/// Synthetic image metadata handed to `preview-naming` so a template can be
/// previewed without touching real files. Absent fields exercise the
/// placeholder fallback paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFixture {
    pub filepath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_taken: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_taken: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_taken: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_if_not_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_op_tag_is_kebab_case() {
        let req = Request::new(RequestOp::SetMinSize { value: Some(1024) });
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["op"], "set-min-size");
        assert_eq!(json["value"], 1024);
        assert!(json["id"].is_string());
    }

    #[test]
    fn null_filter_values_serialize_as_null() {
        let req = Request::new(RequestOp::SetMinWidth { value: None });
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["value"].is_null());
    }

    #[test]
    fn relocating_files_event_round_trips_camel_case() {
        let line = r#"{"event":"relocating-files","totalFiles":3,"totalRelocated":2,"files":{"1":{"from":"/a/x.jpg","to":"/out/x.jpg","relocated":true}}}"#;
        let msg: ServerMessage = serde_json::from_str(line).unwrap();
        let ServerMessage::Event(EngineEvent::RelocatingFiles(batch)) = msg else {
            panic!("expected relocating-files event");
        };
        assert_eq!(batch.total_files, 3);
        assert_eq!(batch.total_relocated, 2);
        assert!(batch.files["1"].relocated);
    }

    #[test]
    fn empty_events_parse_from_tag_alone() {
        for (line, topic) in [
            (r#"{"event":"finding-complete"}"#, Topic::FindingComplete),
            (r#"{"event":"relocating-start"}"#, Topic::RelocatingStart),
            (r#"{"event":"relocating-complete"}"#, Topic::RelocatingComplete),
        ] {
            let msg: ServerMessage = serde_json::from_str(line).unwrap();
            let ServerMessage::Event(ev) = msg else {
                panic!("expected event for {line}");
            };
            assert_eq!(ev.topic(), topic);
        }
    }

    #[test]
    fn response_parses_before_event() {
        let id = Uuid::new_v4();
        let line = format!(r#"{{"id":"{id}","result":["/photos"]}}"#);
        let msg: ServerMessage = serde_json::from_str(&line).unwrap();
        let ServerMessage::Response(resp) = msg else {
            panic!("expected response");
        };
        assert_eq!(resp.id, id);
        assert!(resp.error.is_none());
    }

    #[test]
    fn suffix_is_omitted_when_absent() {
        let record = FileRecord {
            from: "/a/x.jpg".into(),
            to: "/out/x.jpg".into(),
            suffix: None,
            relocated: false,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("suffix"));
    }

    #[test]
    fn display_to_splices_suffix_before_extension() {
        let mut record = FileRecord {
            from: "/a/x.jpg".into(),
            to: "/out/2023/x.jpg".into(),
            suffix: Some("2".into()),
            relocated: false,
        };
        assert_eq!(record.display_to(), "/out/2023/x-2.jpg");

        record.suffix = None;
        assert_eq!(record.display_to(), "/out/2023/x.jpg");

        record.suffix = Some("3".into());
        record.to = "/out/noext".into();
        assert_eq!(record.display_to(), "/out/noext-3");
    }

    #[test]
    fn fixture_omits_absent_metadata_fields() {
        let fixture = ImageFixture {
            filepath: "/photos/IMG_1234.jpg".into(),
            year: Some("2011".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&fixture).unwrap();
        assert_eq!(json["year"], "2011");
        assert!(json.get("year_taken").is_none());
        assert!(json.get("location").is_none());
    }

    #[test]
    fn pipeline_error_event_carries_phase() {
        let line = r#"{"event":"pipeline-error","phase":"relocating","message":"disk full"}"#;
        let msg: ServerMessage = serde_json::from_str(line).unwrap();
        let ServerMessage::Event(EngineEvent::PipelineError { phase, message }) = msg else {
            panic!("expected pipeline-error event");
        };
        assert_eq!(phase, PipelinePhase::Relocating);
        assert_eq!(message, "disk full");
    }
}
