/// Concurrent command registry.
///
/// Mutation (`register`/`unregister`) is serialized behind a single lock.
/// Lookups read an immutable-after-publish `Arc` snapshot of the name
/// maps, so concurrent dispatches see a consistent view and never contend
/// with writers beyond a pointer clone.
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::command::CommandSpec;

#[derive(Default)]
struct Published {
    /// Flat list, in registration order.
    list: Vec<Arc<CommandSpec>>,
    /// Case-folded name → command, reachable only with the prefix.
    required: HashMap<String, Arc<CommandSpec>>,
    /// Case-folded name → command, reachable without the prefix.
    optional: HashMap<String, Arc<CommandSpec>>,
}

/// Thread-safe registry of commands, keyed by case-insensitive names.
pub struct CommandRegistry {
    prefix: String,
    /// Serializes all mutation; never held during a lookup.
    write_lock: Mutex<()>,
    published: RwLock<Arc<Published>>,
}

impl CommandRegistry {
    /// `prefix` is the leading marker of a prefixed call, e.g. `/`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            write_lock: Mutex::new(()),
            published: RwLock::new(Arc::new(Published::default())),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn snapshot(&self) -> Arc<Published> {
        Arc::clone(&self.published.read())
    }

    fn publish(&self, next: Published) {
        *self.published.write() = Arc::new(next);
    }

    /// Register a command.
    ///
    /// Without `overwrite`, fails with `false` — mutating nothing — when
    /// any existing command shares a name case-insensitively. With
    /// `overwrite`, colliding commands are unregistered first.
    pub fn register(&self, command: Arc<CommandSpec>, overwrite: bool) -> bool {
        let _guard = self.write_lock.lock();
        let current = self.snapshot();

        let colliding: Vec<Arc<CommandSpec>> = current
            .list
            .iter()
            .filter(|existing| command.names().any(|n| existing.answers_to(n)))
            .cloned()
            .collect();
        if !colliding.is_empty() && !overwrite {
            debug!(
                "[Registry] refusing to register \"{}\": name collision with \"{}\"",
                command.primary_name(),
                colliding[0].primary_name()
            );
            return false;
        }

        let mut next = Published {
            list: current.list.clone(),
            required: current.required.clone(),
            optional: current.optional.clone(),
        };
        for stale in &colliding {
            Self::remove_from(&mut next, stale);
        }
        for name in command.names() {
            let folded = name.to_lowercase();
            next.required.insert(folded.clone(), Arc::clone(&command));
            if command.prefix_optional() {
                next.optional.insert(folded, Arc::clone(&command));
            } else {
                // A prefix-required command must not linger in the
                // optional map under a name it now owns.
                next.optional.remove(&folded);
            }
        }
        next.list.push(Arc::clone(&command));
        info!("[Registry] registered \"{}\"", command.primary_name());
        self.publish(next);
        true
    }

    /// Remove a command; returns whether it was registered.
    pub fn unregister(&self, command: &Arc<CommandSpec>) -> bool {
        let _guard = self.write_lock.lock();
        let current = self.snapshot();
        if !current.list.iter().any(|c| Arc::ptr_eq(c, command)) {
            return false;
        }
        let mut next = Published {
            list: current.list.clone(),
            required: current.required.clone(),
            optional: current.optional.clone(),
        };
        Self::remove_from(&mut next, command);
        info!("[Registry] unregistered \"{}\"", command.primary_name());
        self.publish(next);
        true
    }

    fn remove_from(published: &mut Published, command: &Arc<CommandSpec>) {
        published.list.retain(|c| !Arc::ptr_eq(c, command));
        published.required.retain(|_, c| !Arc::ptr_eq(c, command));
        published.optional.retain(|_, c| !Arc::ptr_eq(c, command));
    }

    /// Look up a command by the callee name as typed.
    ///
    /// A name starting with the prefix is stripped and looked up in the
    /// required map; anything else consults the optional map. Lock-free.
    pub fn match_command(&self, raw_name: &str) -> Option<Arc<CommandSpec>> {
        let snapshot = self.snapshot();
        let folded = raw_name.to_lowercase();
        match folded.strip_prefix(&self.prefix) {
            Some(stripped) => snapshot.required.get(stripped).cloned(),
            None => snapshot.optional.get(&folded).cloned(),
        }
    }

    /// All registered commands, in registration order. Lock-free.
    pub fn commands(&self) -> Vec<Arc<CommandSpec>> {
        self.snapshot().list.clone()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new("/")
    }
}
