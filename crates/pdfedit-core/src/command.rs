//! JSON command channel for the browser bridge
//!
//! Every call from JavaScript can be expressed as one [`EditorCommand`]; the
//! answer is always a [`CommandResponse`], never a panic or a thrown error.
//! Binary payloads travel base64-encoded.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::coords::DisplayPoint;
use crate::editor::Editor;
use crate::error::EditorError;
use crate::interaction::InputEvent;
use crate::model::{AnnotationId, RunRef};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorCommand {
    Load {
        name: String,
        /// Base64-encoded PDF
        data: String,
    },
    SetPage {
        page: u32,
    },
    NextPage,
    PrevPage,
    SetScale {
        scale: f64,
    },
    ZoomIn,
    ZoomOut,
    ToggleAddText,
    SetAddFontSize {
        size: f64,
    },
    SetEditExisting {
        enabled: bool,
    },
    Input {
        event: InputEvent,
    },
    HitTest {
        point: DisplayPoint,
    },
    Delete {
        id: AnnotationId,
    },
    DeleteSelected,
    SetText {
        id: AnnotationId,
        text: String,
    },
    RemoveTextEdit {
        run: RunRef,
    },
    Undo,
    Redo,
    Overlay,
    RunOverlay,
    Status,
    Export,
}

impl EditorCommand {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        serde_json::from_str(json).map_err(|e| EditorError::InvalidCommand(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl CommandResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: &EditorError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value, EditorError> {
    serde_json::to_value(value).map_err(|e| EditorError::InvalidCommand(e.to_string()))
}

impl Editor {
    /// Run one command and report the outcome
    pub fn execute(&mut self, command: EditorCommand) -> CommandResponse {
        match self.run_command(command) {
            Ok(data) => CommandResponse::ok(data),
            Err(e) => {
                warn!(error = %e, "command failed");
                CommandResponse::failed(&e)
            }
        }
    }

    /// Parse and run a JSON-encoded command
    pub fn execute_json(&mut self, json: &str) -> CommandResponse {
        match EditorCommand::from_json(json) {
            Ok(command) => self.execute(command),
            Err(e) => CommandResponse::failed(&e),
        }
    }

    fn run_command(&mut self, command: EditorCommand) -> Result<Value, EditorError> {
        match command {
            EditorCommand::Load { name, data } => {
                let bytes = STANDARD
                    .decode(data.as_bytes())
                    .map_err(|e| EditorError::Load(format!("invalid base64: {}", e)))?;
                to_value(self.load(&name, &bytes)?)
            }
            EditorCommand::SetPage { page } => Ok(json!({ "page": self.set_page(page)? })),
            EditorCommand::NextPage => Ok(json!({ "page": self.next_page()? })),
            EditorCommand::PrevPage => Ok(json!({ "page": self.prev_page()? })),
            EditorCommand::SetScale { scale } => Ok(json!({ "scale": self.set_scale(scale)? })),
            EditorCommand::ZoomIn => Ok(json!({ "scale": self.zoom_in()? })),
            EditorCommand::ZoomOut => Ok(json!({ "scale": self.zoom_out()? })),
            EditorCommand::ToggleAddText => Ok(json!({ "armed": self.toggle_add_text() })),
            EditorCommand::SetAddFontSize { size } => {
                Ok(json!({ "size": self.set_add_font_size(size) }))
            }
            EditorCommand::SetEditExisting { enabled } => {
                self.set_edit_existing(enabled);
                Ok(json!({ "enabled": enabled }))
            }
            EditorCommand::Input { event } => to_value(self.dispatch(event)?),
            EditorCommand::HitTest { point } => to_value(self.hit_test(point)?),
            EditorCommand::Delete { id } => to_value(self.delete(id)?),
            EditorCommand::DeleteSelected => to_value(self.delete_selected()?),
            EditorCommand::SetText { id, text } => to_value(self.set_text(id, &text)?),
            EditorCommand::RemoveTextEdit { run } => {
                Ok(json!({ "removed": self.remove_text_edit(run).is_some() }))
            }
            EditorCommand::Undo => to_value(self.undo()?),
            EditorCommand::Redo => to_value(self.redo()?),
            EditorCommand::Overlay => to_value(self.overlay()?),
            EditorCommand::RunOverlay => to_value(self.run_overlay()?),
            EditorCommand::Status => to_value(self.status()),
            EditorCommand::Export => {
                let exported = self.export()?;
                Ok(json!({
                    "filename": exported.filename,
                    "size": exported.bytes.len(),
                    "data": STANDARD.encode(&exported.bytes),
                }))
            }
        }
    }
}
