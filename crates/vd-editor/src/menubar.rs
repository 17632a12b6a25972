//! Menu bar source.
//!
//! Menu items fire named intents (`"line"`, `"undo"`, `"toggle-lock"`).
//! Each name maps to one shared stream, created on first request.

use crate::stream::{SourceError, Stream};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Default)]
pub struct MenuBarSource {
    intents: Rc<RefCell<HashMap<String, Stream<()>>>>,
}

impl MenuBarSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intent(&self, name: &str) -> Stream<()> {
        self.intents
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    pub fn fail(&self, error: SourceError) {
        let streams: Vec<Stream<()>> = self.intents.borrow().values().cloned().collect();
        for stream in streams {
            stream.fail(error.clone());
        }
    }

    /// Fire `name`. Returns false when nothing ever asked for it.
    pub fn invoke(&self, name: &str) -> bool {
        let stream = self.intents.borrow().get(name).cloned();
        match stream {
            Some(stream) => {
                stream.emit(());
                true
            }
            None => {
                log::debug!("menubar: no listener for intent {name:?}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn invoke_reaches_requested_intent() {
        let menu = MenuBarSource::new();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _sub = menu.intent("line").subscribe(move |_| h.set(h.get() + 1));
        assert!(menu.intent("line").ptr_eq(&menu.intent("line")));
        assert!(menu.invoke("line"));
        assert!(!menu.invoke("unknown"));
        assert_eq!(hits.get(), 1);
    }
}
