//! Routing of folder listing failures to registered handlers.
//!
//! A walk does not stop on the first unreadable folder if a handler has been
//! registered for the failure's [`ErrorKind`] (or any of its ancestors). Every
//! matching handler runs, in registration order, and the folder is then
//! treated as empty. Handlers run either inline on the walking task or are
//! posted to a [`Dispatcher`] such as a tokio runtime or a channel drained by
//! a UI loop.

use std::fmt;
use std::sync::Arc;

use crate::error::{ErrorKind, FileSetError};

/// Callback invoked with a routed failure.
pub type ErrorHandler = Arc<dyn Fn(&FileSetError) + Send + Sync>;

/// A unit of work handed to a [`Dispatcher`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Somewhere a handler invocation can be posted to run later.
///
/// Posting never waits for the job to run.
pub trait Dispatcher: Send + Sync {
    fn post(&self, job: Job);
}

impl Dispatcher for tokio::runtime::Handle {
    fn post(&self, job: Job) {
        self.spawn(async move { job() });
    }
}

impl Dispatcher for tokio::sync::mpsc::UnboundedSender<Job> {
    fn post(&self, job: Job) {
        if self.send(job).is_err() {
            tracing::warn!("dispatch channel closed, dropping error handler");
        }
    }
}

/// Where a handler runs.
#[derive(Clone, Default)]
pub enum DispatchContext {
    /// On the walking task, before the walk continues.
    #[default]
    Inline,
    /// Posted to a dispatcher; the walk does not wait for it.
    Post(Arc<dyn Dispatcher>),
}

impl DispatchContext {
    /// Posts handlers onto a tokio runtime.
    pub fn runtime(handle: tokio::runtime::Handle) -> Self {
        Self::Post(Arc::new(handle))
    }

    /// Posts handlers into a channel; the receiver runs them.
    pub fn channel(sender: tokio::sync::mpsc::UnboundedSender<Job>) -> Self {
        Self::Post(Arc::new(sender))
    }
}

impl fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => f.write_str("Inline"),
            Self::Post(_) => f.write_str("Post(..)"),
        }
    }
}

struct HandlerEntry {
    kind: ErrorKind,
    handler: ErrorHandler,
    context: DispatchContext,
}

impl HandlerEntry {
    fn invoke(&self, error: &Arc<FileSetError>) {
        match &self.context {
            DispatchContext::Inline => (self.handler)(error),
            DispatchContext::Post(dispatcher) => {
                let handler = Arc::clone(&self.handler);
                let error = Arc::clone(error);
                dispatcher.post(Box::new(move || handler(&error)));
            }
        }
    }
}

/// Ordered list of failure handlers.
#[derive(Default)]
pub struct ErrorRouter {
    entries: Vec<HandlerEntry>,
}

impl ErrorRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler for `kind` and all of its subkinds.
    pub fn register(&mut self, kind: ErrorKind, handler: ErrorHandler, context: DispatchContext) {
        self.entries.push(HandlerEntry {
            kind,
            handler,
            context,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs every handler registered for the failure's kind.
    ///
    /// Single-cause aggregates are unwrapped first, so handlers see the
    /// underlying failure. Returns `Ok(())` when at least one handler matched,
    /// and hands the (unwrapped) failure back otherwise.
    pub fn dispatch(&self, error: FileSetError) -> Result<(), FileSetError> {
        let error = error.flatten();
        let matching: Vec<&HandlerEntry> = self
            .entries
            .iter()
            .filter(|entry| error.is_a(entry.kind))
            .collect();
        if matching.is_empty() {
            return Err(error);
        }

        let error = Arc::new(error);
        for entry in matching {
            entry.invoke(&error);
        }
        Ok(())
    }
}

impl fmt::Debug for ErrorRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.kind, &e.context)))
            .finish()
    }
}
