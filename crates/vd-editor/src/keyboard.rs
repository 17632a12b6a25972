//! Keyboard source.
//!
//! Interactions ask for streams keyed by combo strings (`"l"`, `"mod+z"`,
//! `"shift+up"`). Requests are cached by (event type, combos): the first
//! request for a key creates the binding, later ones get the same stream.
//!
//! `mod` is platform-aware: it matches ctrl or meta (⌘ on macOS), the
//! same rule the old shortcut map used.

use crate::input::{KeyEvent, KeyKind, Modifiers};
use crate::stream::{SourceError, Stream};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Binding {
    Shortcut,
    KeyDown,
    KeyUp,
    KeyPress,
}

impl Binding {
    fn accepts(self, kind: KeyKind) -> bool {
        matches!(
            (self, kind),
            (Binding::Shortcut | Binding::KeyDown, KeyKind::Down)
                | (Binding::KeyUp, KeyKind::Up)
                | (Binding::KeyPress, KeyKind::Press)
        )
    }
}

/// Per-binding options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyConfig {
    /// Ask the host to suppress the browser's default handling.
    pub prevent_default: bool,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            prevent_default: true,
        }
    }
}

/// One parsed combo such as `mod+shift+z`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    key: String,
    shift: bool,
    alt: bool,
    ctrl: bool,
    meta: bool,
    /// `mod`: ctrl or meta, whichever the platform uses.
    cmd: bool,
}

impl KeyCombo {
    pub fn parse(combo: &str) -> Option<KeyCombo> {
        let mut parsed = KeyCombo {
            key: String::new(),
            shift: false,
            alt: false,
            ctrl: false,
            meta: false,
            cmd: false,
        };
        // "+" alone (or as the last part of "shift++") is the plus key.
        let combo = combo.trim().to_ascii_lowercase();
        if combo == "+" {
            parsed.key = canonical_key("+");
            return Some(parsed);
        }
        let (mods, key) = match combo.strip_suffix("++") {
            Some(rest) => (rest, "plus"),
            None => match combo.rsplit_once('+') {
                Some((mods, key)) => (mods, key),
                None => ("", combo.as_str()),
            },
        };
        for part in mods.split('+').filter(|p| !p.is_empty()) {
            match part {
                "shift" => parsed.shift = true,
                "alt" | "option" => parsed.alt = true,
                "ctrl" | "control" => parsed.ctrl = true,
                "meta" | "cmd" | "command" => parsed.meta = true,
                "mod" => parsed.cmd = true,
                _ => return None,
            }
        }
        if key.is_empty() {
            return None;
        }
        parsed.key = canonical_key(key);
        Some(parsed)
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        if canonical_key(&event.key.to_ascii_lowercase()) != self.key {
            return false;
        }
        let m: Modifiers = event.modifiers;
        // Printable symbols like "?" already encode shift.
        let symbol = self.key.chars().count() == 1 && !self.key.chars().all(char::is_alphanumeric);
        if !symbol && m.shift != self.shift {
            return false;
        }
        if m.alt != self.alt {
            return false;
        }
        if self.cmd {
            m.cmd()
        } else {
            m.ctrl == self.ctrl && m.meta == self.meta
        }
    }
}

fn canonical_key(key: &str) -> String {
    match key {
        " " | "spacebar" => "space",
        "escape" => "esc",
        "delete" => "del",
        "return" => "enter",
        "+" => "plus",
        "arrowup" => "up",
        "arrowdown" => "down",
        "arrowleft" => "left",
        "arrowright" => "right",
        other => other,
    }
    .to_string()
}

struct Registered {
    binding: Binding,
    combos: Vec<KeyCombo>,
    config: KeyConfig,
    stream: Stream<KeyEvent>,
}

#[derive(Default)]
struct Registry {
    by_key: HashMap<(Binding, Vec<String>), usize>,
    registered: Vec<Registered>,
    pressing: HashMap<String, Stream<bool>>,
}

/// Keyboard event source shared by all interactions.
#[derive(Clone, Default)]
pub struct KeyboardSource {
    registry: Rc<RefCell<Registry>>,
}

impl KeyboardSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key-down of any of `keys`.
    pub fn shortcut(&self, keys: &[&str]) -> Stream<KeyEvent> {
        self.stream(Binding::Shortcut, keys, KeyConfig::default())
    }

    pub fn shortcut_with(&self, keys: &[&str], config: KeyConfig) -> Stream<KeyEvent> {
        self.stream(Binding::Shortcut, keys, config)
    }

    pub fn keydown(&self, keys: &[&str]) -> Stream<KeyEvent> {
        self.stream(Binding::KeyDown, keys, KeyConfig::default())
    }

    pub fn keyup(&self, keys: &[&str]) -> Stream<KeyEvent> {
        self.stream(Binding::KeyUp, keys, KeyConfig::default())
    }

    pub fn keypress(&self, keys: &[&str]) -> Stream<KeyEvent> {
        self.stream(Binding::KeyPress, keys, KeyConfig::default())
    }

    /// Whether `key` is held: true after a keypress, false after keyup.
    /// Starts false and only emits on change.
    pub fn is_pressing(&self, key: &str) -> Stream<bool> {
        if let Some(stream) = self.registry.borrow().pressing.get(key) {
            return stream.clone();
        }
        let pressed = self.keypress(&[key]).map_to(true);
        let released = self.keyup(&[key]).map_to(false);
        let stream = Stream::merge(&[&pressed, &released])
            .start_with(false)
            .drop_repeats();
        self.registry
            .borrow_mut()
            .pressing
            .insert(key.to_string(), stream.clone());
        stream
    }

    fn stream(&self, binding: Binding, keys: &[&str], config: KeyConfig) -> Stream<KeyEvent> {
        let cache_key = (binding, keys.iter().map(|k| k.to_string()).collect::<Vec<_>>());
        let mut registry = self.registry.borrow_mut();
        if let Some(&index) = registry.by_key.get(&cache_key) {
            return registry.registered[index].stream.clone();
        }
        let combos: Vec<KeyCombo> = keys
            .iter()
            .filter_map(|k| {
                let combo = KeyCombo::parse(k);
                if combo.is_none() {
                    log::warn!("keyboard: ignoring unparsable combo {k:?}");
                }
                combo
            })
            .collect();
        let stream = Stream::new();
        registry.registered.push(Registered {
            binding,
            combos,
            config,
            stream: stream.clone(),
        });
        let index = registry.registered.len() - 1;
        registry.by_key.insert(cache_key, index);
        stream
    }

    /// Terminate every binding handed out so far.
    pub fn fail(&self, error: SourceError) {
        let streams: Vec<Stream<KeyEvent>> = self
            .registry
            .borrow()
            .registered
            .iter()
            .map(|r| r.stream.clone())
            .collect();
        for stream in streams {
            stream.fail(error.clone());
        }
    }

    /// Route a host key event to every matching binding. Returns whether
    /// the host should prevent the default action.
    pub fn dispatch(&self, event: &KeyEvent) -> bool {
        let matched: Vec<(Stream<KeyEvent>, bool)> = self
            .registry
            .borrow()
            .registered
            .iter()
            .filter(|r| r.binding.accepts(event.kind) && r.combos.iter().any(|c| c.matches(event)))
            .map(|r| (r.stream.clone(), r.config.prevent_default))
            .collect();
        let mut prevent = false;
        for (stream, prevent_default) in matched {
            prevent |= prevent_default;
            stream.emit(event.clone());
        }
        prevent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn key(kind: KeyKind, key: &str, modifiers: Modifiers) -> KeyEvent {
        KeyEvent::new(kind, key, modifiers)
    }

    fn count(stream: &Stream<KeyEvent>) -> (Rc<Cell<usize>>, crate::stream::Subscription) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, stream.subscribe(move |_| h.set(h.get() + 1)))
    }

    #[test]
    fn same_request_returns_same_stream() {
        let keyboard = KeyboardSource::new();
        let a = keyboard.shortcut(&["l"]);
        let b = keyboard.shortcut(&["l"]);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&keyboard.keyup(&["l"])));
    }

    #[test]
    fn mod_matches_ctrl_or_meta() {
        let keyboard = KeyboardSource::new();
        let (hits, _sub) = count(&keyboard.shortcut(&["mod+z"]));
        let ctrl = Modifiers { ctrl: true, ..Modifiers::NONE };
        let meta = Modifiers { meta: true, ..Modifiers::NONE };
        keyboard.dispatch(&key(KeyKind::Down, "z", ctrl));
        keyboard.dispatch(&key(KeyKind::Down, "Z", meta));
        keyboard.dispatch(&key(KeyKind::Down, "z", Modifiers::NONE));
        keyboard.dispatch(&key(KeyKind::Up, "z", ctrl));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn shift_must_match_for_letters() {
        let keyboard = KeyboardSource::new();
        let (undo, _a) = count(&keyboard.shortcut(&["mod+z"]));
        let (redo, _b) = count(&keyboard.shortcut(&["mod+shift+z", "mod+y"]));
        let cmd_shift = Modifiers { meta: true, shift: true, ..Modifiers::NONE };
        keyboard.dispatch(&key(KeyKind::Down, "Z", cmd_shift));
        assert_eq!((undo.get(), redo.get()), (0, 1));
    }

    #[test]
    fn named_keys_are_normalized() {
        let keyboard = KeyboardSource::new();
        let (hits, _sub) = count(&keyboard.shortcut(&["del", "backspace", "escape", "up"]));
        for k in ["Delete", "Backspace", "Escape", "ArrowUp"] {
            keyboard.dispatch(&KeyEvent::down(k));
        }
        assert_eq!(hits.get(), 4);
    }

    #[test]
    fn is_pressing_emits_on_change_only() {
        let keyboard = KeyboardSource::new();
        let pressing = keyboard.is_pressing("space");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = pressing.subscribe(move |v| sink.borrow_mut().push(*v));
        keyboard.dispatch(&key(KeyKind::Press, " ", Modifiers::NONE));
        keyboard.dispatch(&key(KeyKind::Press, " ", Modifiers::NONE));
        keyboard.dispatch(&key(KeyKind::Up, " ", Modifiers::NONE));
        assert_eq!(*seen.borrow(), vec![false, true, false]);
        assert!(pressing.ptr_eq(&keyboard.is_pressing("space")));
    }

    #[test]
    fn dispatch_reports_prevent_default() {
        let keyboard = KeyboardSource::new();
        let _quiet = keyboard.shortcut_with(&["f5"], KeyConfig { prevent_default: false });
        let _loud = keyboard.shortcut(&["l"]);
        assert!(!keyboard.dispatch(&KeyEvent::down("F5")));
        assert!(keyboard.dispatch(&KeyEvent::down("l")));
        assert!(!keyboard.dispatch(&KeyEvent::down("q")));
    }

    #[test]
    fn parses_plus_key() {
        let combo = KeyCombo::parse("mod++").unwrap();
        assert!(combo.matches(&key(KeyKind::Down, "+", Modifiers { ctrl: true, ..Modifiers::NONE })));
        assert!(KeyCombo::parse("hyper+x").is_none());
    }
}
