//! Extension points fired around each output write. Callbacks are registered
//! per [`Event`] and run synchronously in registration order; an event with
//! no registrations is a no-op.
//!
//! A failing before-write callback skips the write for that item. A failing
//! after-write callback is reported, but the write has already happened and
//! is not rolled back.

use std::collections::HashMap;
use std::path::Path;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Event {
    BeforeWrite,
    AfterWrite,
}

/// What kind of item is being written.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ItemKind {
    Post,
    Page,
    Feed,
}

/// The payload handed to each callback: the item being written and where its
/// output is going.
pub struct Payload<'a> {
    pub kind: ItemKind,
    pub source: Option<&'a Path>,
    pub output: &'a Path,
}

pub type Hook = Box<dyn Fn(&Payload) -> Result<(), String>>;

#[derive(Default)]
pub struct Hooks {
    registered: HashMap<Event, Vec<Hook>>,
}

impl Hooks {
    pub fn register(&mut self, event: Event, hook: Hook) {
        self.registered.entry(event).or_insert_with(Vec::new).push(hook);
    }

    /// Fires every callback registered for `event`, in registration order,
    /// stopping at the first failure.
    pub fn fire(&self, event: Event, payload: &Payload) -> Result<(), String> {
        if let Some(hooks) = self.registered.get(&event) {
            for hook in hooks {
                hook(payload)?;
            }
        }
        Ok(())
    }
}
