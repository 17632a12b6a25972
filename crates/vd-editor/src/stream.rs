//! Push-based event streams for the interaction engine.
//!
//! A `Stream<T>` is a shared broadcast point: producers `emit`, consumers
//! `subscribe` and get a `Subscription` back. Dropping the subscription
//! removes the listener, which is how gestures scope their move tracking:
//! a gesture holds its subscriptions and drops them when it ends.
//!
//! Derived streams (`map`, `filter`, `gate`, …) hold their upstream
//! subscriptions and are held by their own subscribers, so a chain lives
//! exactly as long as somebody listens to its end. Upstream listeners only
//! keep a weak handle to the derived stream, so there are no `Rc` cycles.
//!
//! Everything is single-threaded (`Rc`/`RefCell`). No borrow is held while
//! listeners run, so a listener may subscribe, unsubscribe or emit on other
//! streams. A listener that is re-entered while still running is skipped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;

/// An input source broke. Terminates the stream it is raised on and every
/// stream derived from it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("input source `{source_name}` failed: {message}")]
pub struct SourceError {
    pub source_name: String,
    pub message: String,
}

impl SourceError {
    pub fn new(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

enum Signal<'a, T> {
    Next(&'a T),
    Error(&'a SourceError),
}

type Callback<T> = Rc<RefCell<dyn FnMut(Signal<'_, T>)>>;

struct Listener<T> {
    id: u64,
    alive: Rc<Cell<bool>>,
    callback: Callback<T>,
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            alive: self.alive.clone(),
            callback: self.callback.clone(),
        }
    }
}

struct Inner<T> {
    listeners: Vec<Listener<T>>,
    next_id: u64,
    remember: bool,
    memory: Option<T>,
    failed: Option<SourceError>,
    upstream: Vec<Subscription>,
}

/// Handle to a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    fn detached() -> Self {
        Self { detach: None }
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

pub struct Stream<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + 'static> Default for Stream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Stream<T> {
    fn blank(remember: bool, memory: Option<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                listeners: Vec::new(),
                next_id: 0,
                remember,
                memory,
                failed: None,
                upstream: Vec::new(),
            })),
        }
    }

    /// A plain event stream: late subscribers see only later events.
    pub fn new() -> Self {
        Self::blank(false, None)
    }

    /// A remembered stream: keeps its latest value and replays it to every
    /// new subscriber.
    pub fn with_value(initial: T) -> Self {
        Self::blank(true, Some(initial))
    }

    /// A remembered stream with no value yet.
    pub fn remembered() -> Self {
        Self::blank(true, None)
    }

    /// Latest value of a remembered stream.
    pub fn value(&self) -> Option<T> {
        self.inner.borrow().memory.clone()
    }

    pub fn ptr_eq(&self, other: &Stream<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn is_failed(&self) -> bool {
        self.inner.borrow().failed.is_some()
    }

    pub fn emit(&self, value: T) {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            if inner.failed.is_some() {
                return;
            }
            if inner.remember {
                inner.memory = Some(value.clone());
            }
            inner.listeners.clone()
        };
        for listener in &listeners {
            if !listener.alive.get() {
                continue;
            }
            match listener.callback.try_borrow_mut() {
                Ok(mut callback) => callback(Signal::Next(&value)),
                Err(_) => log::warn!("stream: skipped re-entrant listener {}", listener.id),
            }
        }
    }

    /// Terminate the stream with `error`. Listeners are notified once and
    /// dropped; later emissions are ignored.
    pub fn fail(&self, error: SourceError) {
        let (listeners, upstream) = {
            let mut inner = self.inner.borrow_mut();
            if inner.failed.is_some() {
                return;
            }
            inner.failed = Some(error.clone());
            (
                std::mem::take(&mut inner.listeners),
                std::mem::take(&mut inner.upstream),
            )
        };
        log::debug!("stream: {error}");
        for listener in &listeners {
            if !listener.alive.get() {
                continue;
            }
            if let Ok(mut callback) = listener.callback.try_borrow_mut() {
                callback(Signal::Error(&error));
            }
        }
        drop(upstream);
    }

    fn attach(&self, callback: impl FnMut(Signal<'_, T>) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(RefCell::new(callback));
        let alive = Rc::new(Cell::new(true));
        let (id, replay, failed) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            if inner.failed.is_none() {
                inner.listeners.push(Listener {
                    id,
                    alive: alive.clone(),
                    callback: callback.clone(),
                });
            }
            (id, inner.memory.clone(), inner.failed.clone())
        };
        if let Some(error) = failed {
            (callback.borrow_mut())(Signal::Error(&error));
            return Subscription::detached();
        }
        if let Some(value) = replay {
            (callback.borrow_mut())(Signal::Next(&value));
        }
        let inner = self.inner.clone();
        Subscription::new(move || {
            alive.set(false);
            let removed = {
                let mut inner = inner.borrow_mut();
                inner
                    .listeners
                    .iter()
                    .position(|l| l.id == id)
                    .map(|pos| inner.listeners.remove(pos))
            };
            // Dropped outside the borrow: the callback may own subscriptions.
            drop(removed);
        })
    }

    pub fn subscribe(&self, mut next: impl FnMut(&T) + 'static) -> Subscription {
        self.attach(move |signal| {
            if let Signal::Next(value) = signal {
                next(value);
            }
        })
    }

    pub fn subscribe_with(
        &self,
        mut next: impl FnMut(&T) + 'static,
        mut error: impl FnMut(&SourceError) + 'static,
    ) -> Subscription {
        self.attach(move |signal| match signal {
            Signal::Next(value) => next(value),
            Signal::Error(e) => error(e),
        })
    }

    fn hold(&self, subscription: Subscription) {
        self.inner.borrow_mut().upstream.push(subscription);
    }

    fn derive<U: Clone + 'static>(
        &self,
        remember: bool,
        on_next: impl FnMut(&T, &Stream<U>) + 'static,
    ) -> Stream<U> {
        self.pipe(Stream::blank(remember, None), on_next)
    }

    fn pipe<U: Clone + 'static>(
        &self,
        out: Stream<U>,
        mut on_next: impl FnMut(&T, &Stream<U>) + 'static,
    ) -> Stream<U> {
        let weak = Rc::downgrade(&out.inner);
        let subscription = self.attach(move |signal| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let out = Stream { inner };
            match signal {
                Signal::Next(value) => on_next(value, &out),
                Signal::Error(e) => out.fail(e.clone()),
            }
        });
        out.hold(subscription);
        out
    }

    fn remembers(&self) -> bool {
        self.inner.borrow().remember
    }

    /// Mapping a remembered stream gives a remembered stream.
    pub fn map<U: Clone + 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Stream<U> {
        self.derive(self.remembers(), move |value, out| out.emit(f(value)))
    }

    pub fn map_to<U: Clone + 'static>(&self, constant: U) -> Stream<U> {
        self.derive(false, move |_, out| out.emit(constant.clone()))
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Stream<T> {
        self.derive(false, move |value, out| {
            if predicate(value) {
                out.emit(value.clone());
            }
        })
    }

    pub fn filter_map<U: Clone + 'static>(&self, f: impl Fn(&T) -> Option<U> + 'static) -> Stream<U> {
        self.derive(false, move |value, out| {
            if let Some(mapped) = f(value) {
                out.emit(mapped);
            }
        })
    }

    /// Remembered copy of this stream.
    pub fn remember(&self) -> Stream<T> {
        self.derive(true, |value, out| out.emit(value.clone()))
    }

    /// Remembered copy that holds `initial` until the first upstream value.
    pub fn start_with(&self, initial: T) -> Stream<T> {
        self.pipe(Stream::blank(true, Some(initial)), |value, out| {
            out.emit(value.clone())
        })
    }

    /// All events of all inputs, in arrival order. Fails when any input fails.
    pub fn merge(streams: &[&Stream<T>]) -> Stream<T> {
        let out = Stream::<T>::blank(false, None);
        for stream in streams {
            let weak = Rc::downgrade(&out.inner);
            let subscription = stream.attach(move |signal| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let out = Stream { inner };
                match signal {
                    Signal::Next(value) => out.emit(value.clone()),
                    Signal::Error(e) => out.fail(e.clone()),
                }
            });
            out.hold(subscription);
        }
        out
    }

    /// Forward each value unchanged, but only once `guard` has emitted and
    /// its latest value satisfies `predicate`.
    ///
    /// The predicate is evaluated against the guard value current at the
    /// moment the primary value arrives. Values arriving before the guard's
    /// first emission are dropped, not buffered. The forwarded value is the
    /// primary value itself, emitted synchronously, never a paired snapshot.
    pub fn gate<G: Clone + 'static>(
        &self,
        guard: &Stream<G>,
        predicate: impl Fn(&G) -> bool + 'static,
    ) -> Stream<T> {
        let out = Stream::<T>::blank(false, None);
        let last: Rc<RefCell<Option<G>>> = Rc::new(RefCell::new(None));

        let guard_last = last.clone();
        let guard_out = Rc::downgrade(&out.inner);
        let guard_sub = guard.attach(move |signal| match signal {
            Signal::Next(value) => *guard_last.borrow_mut() = Some(value.clone()),
            Signal::Error(e) => {
                if let Some(inner) = guard_out.upgrade() {
                    Stream { inner }.fail(e.clone());
                }
            }
        });
        out.hold(guard_sub);

        let weak = Rc::downgrade(&out.inner);
        let primary_sub = self.attach(move |signal| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let out = Stream { inner };
            match signal {
                Signal::Next(value) => {
                    let open = last.borrow().as_ref().is_some_and(&predicate);
                    if open {
                        out.emit(value.clone());
                    }
                }
                Signal::Error(e) => out.fail(e.clone()),
            }
        });
        out.hold(primary_sub);
        out
    }

    /// Cache of the latest value, for reading inside other listeners.
    pub fn latest(&self) -> Latest<T> {
        let value = Rc::new(RefCell::new(None));
        let slot = value.clone();
        let subscription = self.subscribe(move |v: &T| *slot.borrow_mut() = Some(v.clone()));
        Latest {
            value,
            _subscription: Rc::new(subscription),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Stream<T> {
    /// Skip values equal to the previous one. Keeps memory if the
    /// upstream has it.
    pub fn drop_repeats(&self) -> Stream<T> {
        let mut previous: Option<T> = None;
        self.derive(self.remembers(), move |value, out| {
            if previous.as_ref() != Some(value) {
                previous = Some(value.clone());
                out.emit(value.clone());
            }
        })
    }
}

/// The most recent value seen on a stream (`None` until the first one).
pub struct Latest<T> {
    value: Rc<RefCell<Option<T>>>,
    _subscription: Rc<Subscription>,
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _subscription: self._subscription.clone(),
        }
    }
}

impl<T: Clone> Latest<T> {
    pub fn get(&self) -> Option<T> {
        self.value.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.value.borrow().as_ref().map(f)
    }
}
