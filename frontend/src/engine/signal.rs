//! Single-threaded publish/subscribe used by every scroll and visibility
//! consumer on the page.
//!
//! Handlers run on the browser event loop, so everything here is `Rc` +
//! `RefCell`. A handler can drop itself by returning [`Flow::Stop`], which is
//! how the one-shot components guarantee they never see a second event.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// What a handler wants after it has been called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// Remove this handler; it will not be called again.
    Stop,
}

type Handler<T> = Rc<RefCell<dyn FnMut(&T) -> Flow>>;

struct Slots<T> {
    next_id: u64,
    handlers: Vec<(u64, Handler<T>)>,
}

pub struct Emitter<T> {
    slots: Rc<RefCell<Slots<T>>>,
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Emitter<T> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, handler: impl FnMut(&T) -> Flow + 'static) -> Subscription {
        let handler: Handler<T> = Rc::new(RefCell::new(handler));
        let id = {
            let mut slots = self.slots.borrow_mut();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.handlers.push((id, handler));
            id
        };

        let slots: Weak<RefCell<Slots<T>>> = Rc::downgrade(&self.slots);
        Subscription::new(move || {
            if let Some(slots) = slots.upgrade() {
                slots.borrow_mut().handlers.retain(|(other, _)| *other != id);
            }
        })
    }

    /// Delivers `value` to every handler in subscription order.
    ///
    /// Handlers may unsubscribe themselves or others while running. A handler
    /// that is already running (re-entrant emit) is skipped for the nested call.
    pub fn emit(&self, value: &T) {
        let mut index = 0;
        loop {
            let (id, handler) = match self.slots.borrow().handlers.get(index) {
                Some((id, handler)) => (*id, handler.clone()),
                None => break,
            };

            let flow = match handler.try_borrow_mut() {
                Ok(mut call) => (&mut *call)(value),
                Err(_) => Flow::Continue,
            };

            let mut slots = self.slots.borrow_mut();
            match slots.handlers.iter().position(|(other, _)| *other == id) {
                Some(pos) if flow == Flow::Stop => {
                    slots.handlers.remove(pos);
                    index = pos;
                }
                Some(pos) => index = pos + 1,
                // removed itself through its Subscription; the next handler
                // has shifted into `index`
                None => {}
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by `subscribe`. Dropping it leaves the handler registered;
/// call [`Subscription::unsubscribe`] to remove it.
#[must_use = "call unsubscribe() to stop delivery"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("pending", &self.cancel.is_some())
            .finish()
    }
}
