//! Frame-drained event queue between the chat session and the UI.
//!
//! Single-threaded: the session pushes while a turn streams, the UI takes
//! the whole backlog at the start of each frame.

use std::cell::RefCell;
use std::rc::Rc;
use workbench_types::event::ChatEvent;

/// Clones share one queue.
#[derive(Clone, Default)]
pub struct EventBus {
    queue: Rc<RefCell<Vec<ChatEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: ChatEvent) {
        log::trace!("event: {:?}", event);
        self.queue.borrow_mut().push(event);
    }

    /// Take every pending event, oldest first
    pub fn drain(&self) -> Vec<ChatEvent> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_pending()
    }
}
