//! WASM bridge for VD: exposes the editor engine to a browser canvas host.
//!
//! Compiled via `wasm-pack build --target web`. The host forwards pointer,
//! wheel, keyboard, menu and animation-frame events; every event method
//! returns whether the canvas needs a redraw, and the host reads the frame
//! from `snapshot_json`.

use std::str::FromStr;
use vd_core::{AppConfig, State};
use vd_editor::{Editor, InputEvent, KeyEvent, KeyKind, Modifiers, Resizer, Update};
use wasm_bindgen::prelude::*;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// The WASM-facing canvas controller.
///
/// Owns one editor. All interaction from the page goes through this
/// struct; errors surface as thrown strings.
#[wasm_bindgen]
pub struct VdCanvas {
    editor: Editor,
    /// Hit-test pointer events here instead of waiting for `hover`.
    auto_hover: bool,
}

#[wasm_bindgen]
impl VdCanvas {
    /// Create a controller. `config_json` is an optional `AppConfig`
    /// object; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<VdCanvas, JsValue> {
        console_error_panic_hook_setup();
        let config = match config_json.as_deref() {
            Some(json) => AppConfig::from_json(json).map_err(js_error)?,
            None => AppConfig::default(),
        };
        let editor = Editor::new(config).map_err(js_error)?;
        Ok(Self {
            editor,
            auto_hover: true,
        })
    }

    pub fn set_auto_hover(&mut self, enabled: bool) {
        self.auto_hover = enabled;
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.render_hint(InputEvent::PointerDown { x, y })
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.render_hint(InputEvent::PointerMove { x, y })
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.render_hint(InputEvent::PointerUp { x, y })
    }

    /// Pointer left the canvas.
    pub fn pointer_cancel(&mut self) -> Result<bool, JsValue> {
        self.render_hint(InputEvent::PointerCancel)
    }

    pub fn double_click(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.render_hint(InputEvent::DoubleClick { x, y })
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> Result<bool, JsValue> {
        self.render_hint(InputEvent::Wheel { x, y, delta_y })
    }

    /// Report what the pointer is over, for hosts that hit-test handles
    /// themselves. `resizer` is a tag such as `"se-resize"`; an unknown tag
    /// throws.
    pub fn hover(&mut self, resizer: Option<String>, vertex_index: Option<u32>) -> Result<bool, JsValue> {
        let resizer = resizer
            .as_deref()
            .map(Resizer::from_str)
            .transpose()
            .map_err(js_error)?;
        self.render_hint(InputEvent::Hover {
            resizer,
            vertex_index: vertex_index.map(|i| i as usize),
        })
    }

    /// Resize handle under the screen point, as a cursor tag (`""` for none).
    pub fn cursor_at(&self, x: f64, y: f64) -> String {
        match self.editor.hover_at(x, y) {
            InputEvent::Hover {
                resizer: Some(resizer),
                ..
            } => resizer.as_str().to_string(),
            _ => String::new(),
        }
    }

    // ─── Keyboard, menu, clock ───────────────────────────────────────────

    /// Handle a key event. `kind` is `"down"`, `"up"` or `"press"`. Returns
    /// whether the page should call `preventDefault`.
    #[allow(clippy::too_many_arguments)]
    pub fn key(
        &mut self,
        kind: &str,
        key: &str,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> Result<bool, JsValue> {
        let kind = match kind {
            "down" | "keydown" => KeyKind::Down,
            "up" | "keyup" => KeyKind::Up,
            "press" | "keypress" => KeyKind::Press,
            other => return Err(js_error(format!("unknown key event kind: {other}"))),
        };
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let update = self.dispatch(InputEvent::Key(KeyEvent::new(kind, key, modifiers)))?;
        Ok(update.prevent_default)
    }

    /// Invoke a menu intent such as `"line"`, `"undo"` or `"toggle-lock"`.
    pub fn menu(&mut self, intent: &str) -> Result<bool, JsValue> {
        self.render_hint(InputEvent::menu(intent))
    }

    /// Animation frame tick (`requestAnimationFrame` timestamp).
    pub fn frame(&mut self, time_ms: f64) -> Result<bool, JsValue> {
        self.render_hint(InputEvent::Frame { time_ms })
    }

    /// Dispatch one event in its JSON form, e.g.
    /// `{"type":"pointerDown","x":1,"y":2}`.
    pub fn dispatch_json(&mut self, json: &str) -> Result<bool, JsValue> {
        let event: InputEvent = serde_json::from_str(json).map_err(js_error)?;
        self.render_hint(event)
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Undo the last action. Returns true if the document changed.
    pub fn undo(&mut self) -> bool {
        self.editor.undo().state_changed
    }

    /// Redo the last undone action.
    pub fn redo(&mut self) -> bool {
        self.editor.redo().state_changed
    }

    pub fn can_undo(&self) -> bool {
        self.editor.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.history().can_redo()
    }

    // ─── Document & view ─────────────────────────────────────────────────

    /// Replace the document with `{"items":[...]}`. Clears the undo log.
    pub fn load_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state = State::from_json(json).map_err(js_error)?;
        self.editor.load_state(state);
        Ok(())
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        self.editor.state().to_json().map_err(js_error)
    }

    pub fn set_config_json(&mut self, json: &str) -> Result<(), JsValue> {
        let config = AppConfig::from_json(json).map_err(js_error)?;
        self.editor.set_config(config).map_err(js_error)
    }

    /// Everything needed to draw a frame: items, selection and its bbox,
    /// the line preview, the highlighted insert edge, transform and mode.
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.editor.snapshot()).map_err(js_error)
    }

    /// Current mode tag (`"idle"`, `"line.ready"`, ...).
    pub fn mode(&self) -> String {
        self.editor.mode().as_str().to_string()
    }
}

impl VdCanvas {
    fn dispatch(&mut self, event: InputEvent) -> Result<Update, JsValue> {
        if self.auto_hover
            && let InputEvent::PointerDown { x, y }
            | InputEvent::PointerMove { x, y }
            | InputEvent::PointerUp { x, y } = event
        {
            let hover = self.editor.hover_at(x, y);
            self.editor.dispatch(hover).map_err(js_error)?;
        }
        self.editor.dispatch(event).map_err(js_error)
    }

    fn render_hint(&mut self, event: InputEvent) -> Result<bool, JsValue> {
        self.dispatch(event).map(|update| update.needs_render())
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("VD WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone helpers (no canvas needed) ───────────────────────────────

/// Validate an `AppConfig` JSON object. Returns `{"ok":true}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_config(json: &str) -> String {
    match AppConfig::from_json(json) {
        Ok(_) => serde_json::json!({ "ok": true }).to_string(),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}
