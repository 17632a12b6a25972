//! Scripted input replay.
//!
//! A script is either a bare JSON array of input events or an object:
//!
//! ```json
//! {
//!   "config": { "senseRange": 8 },
//!   "state": { "items": [] },
//!   "autoHover": true,
//!   "events": [{ "type": "menu", "intent": "line" }]
//! }
//! ```
//!
//! With `autoHover`, every pointer event is preceded by the hover event the
//! editor computes for that position, like a browser host would send.

use crate::editor::{Editor, EditorError, Snapshot};
use crate::input::InputEvent;
use serde::Deserialize;
use thiserror::Error;
use vd_core::{AppConfig, State};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid replay script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("event #{index} failed: {source}")]
    Dispatch {
        index: usize,
        #[source]
        source: EditorError,
    },
    #[error(transparent)]
    Editor(#[from] EditorError),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Script {
    pub config: Option<AppConfig>,
    pub state: Option<State>,
    pub auto_hover: bool,
    pub events: Vec<InputEvent>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptRepr {
    Events(Vec<InputEvent>),
    Full(Script),
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(match serde_json::from_str(json)? {
            ScriptRepr::Events(events) => Script {
                events,
                ..Script::default()
            },
            ScriptRepr::Full(script) => script,
        })
    }

    pub fn editor(&self) -> Result<Editor, ReplayError> {
        let config = self.config.clone().unwrap_or_default();
        let editor = match &self.state {
            Some(state) => Editor::with_state(config, state.clone())?,
            None => Editor::new(config)?,
        };
        Ok(editor)
    }

    /// Feed every event into `editor`.
    pub fn drive(&self, editor: &mut Editor) -> Result<(), ReplayError> {
        for (index, event) in self.events.iter().enumerate() {
            let fail = |source| ReplayError::Dispatch { index, source };
            if self.auto_hover
                && let Some(pos) = event.position()
                && !matches!(event, InputEvent::Wheel { .. } | InputEvent::DoubleClick { .. })
            {
                editor.dispatch(editor.hover_at(pos.x, pos.y)).map_err(fail)?;
            }
            log::trace!("replay: #{index} {event:?}");
            editor.dispatch(event.clone()).map_err(fail)?;
        }
        Ok(())
    }
}

/// Parse `json`, build an editor for it, drive it, and return the editor.
pub fn replay(json: &str) -> Result<Editor, ReplayError> {
    let script = Script::from_json(json)?;
    let mut editor = script.editor()?;
    script.drive(&mut editor)?;
    log::debug!("replay: {} events", script.events.len());
    Ok(editor)
}

pub fn replay_snapshot(json: &str) -> Result<Snapshot, ReplayError> {
    replay(json).map(|editor| editor.snapshot())
}
