//! Document lifecycle events.
//!
//! Every step of opening and closing a document is announced to the
//! handlers registered on the [`View`](crate::View). Handlers of cancelable
//! events can prevent the step, redirect a download, or substitute the
//! document that is about to be used.

use std::sync::Arc;
use std::time::SystemTime;

use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use strum_macros::{AsRefStr, Display, EnumIter};

use crate::document::Document;
use crate::view::ViewId;

/// Event types, in the order they fire for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    /// Start of `open_document`.
    Opening,
    /// After the document and all its links loaded.
    Open,
    /// Start of `close_document`.
    Closing,
    /// After the document was unloaded.
    Close,
    /// The open was cancelled.
    Cancelled,
    /// Before a URL is fetched. Handlers may prevent the download or
    /// redirect it.
    Download,
    /// A download handler redirected to another URL.
    Redirect,
    /// Reserved.
    DataLoad,
    /// After the downloaded bytes were decoded, before links are walked.
    BeforeLoad,
    /// After a document and all its links loaded.
    Load,
    /// Before a document's links are released.
    BeforeUnload,
    /// After a document was released.
    Unload,
    /// Download or decoding failed.
    Error,
    /// A diagnostic, reported once per message per open.
    Warning,
    /// A document could not be parsed.
    ParseError,
}

impl EventKind {
    /// Whether handlers can prevent the step this event announces.
    #[must_use]
    pub const fn is_cancelable(self) -> bool {
        matches!(
            self,
            Self::Opening
                | Self::Open
                | Self::Closing
                | Self::Download
                | Self::Redirect
                | Self::BeforeLoad
                | Self::BeforeUnload
        )
    }
}

/// One lifecycle event.
#[derive(Debug, Clone)]
pub struct Event {
    /// Event type.
    pub kind: EventKind,
    /// View the event fired on.
    pub view: ViewId,
    /// URL the event is about.
    pub target: Option<String>,
    /// Free-form detail: a warning message, an error, a redirect target.
    pub detail: Option<String>,
    /// Document the event is about, once there is one.
    pub document: Option<Arc<Document>>,
    /// When the event was created.
    pub timestamp: SystemTime,
}

impl Event {
    /// An event with no target, detail or document.
    #[must_use]
    pub fn new(kind: EventKind, view: ViewId) -> Self {
        Self {
            kind,
            view,
            target: None,
            detail: None,
            document: None,
            timestamp: SystemTime::now(),
        }
    }

    /// Set the URL the event is about.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the document.
    #[must_use]
    pub fn with_document(mut self, document: Arc<Document>) -> Self {
        self.document = Some(document);
        self
    }

    /// Whether handlers can prevent the step this event announces.
    #[must_use]
    pub const fn cancelable(&self) -> bool {
        self.kind.is_cancelable()
    }
}

/// What a handler wants done after an event.
#[derive(Debug, Clone, Default)]
pub enum Response {
    /// Proceed.
    #[default]
    Continue,
    /// Skip the step; ignored for events that are not cancelable.
    Prevent,
    /// Download this URL instead (`download` events).
    Redirect(String),
    /// Use this document instead (`beforeload` and `load` events).
    Substitute(Arc<Document>),
}

impl Response {
    /// Fold the response of a later handler into this one.
    ///
    /// Prevention sticks; otherwise the later handler's wish wins.
    #[must_use]
    pub fn merge(self, later: Self, cancelable: bool) -> Self {
        match (self, later) {
            (Self::Prevent, _) => Self::Prevent,
            (_, Self::Prevent) if cancelable => Self::Prevent,
            (earlier, Self::Continue | Self::Prevent) => earlier,
            (_, later) => later,
        }
    }

    /// Whether the step was prevented.
    #[must_use]
    pub const fn is_prevented(&self) -> bool {
        matches!(self, Self::Prevent)
    }
}

/// Receives lifecycle events.
///
/// Plain functions and closures of type `Fn(&Event) -> Response` implement
/// this trait; implement it directly for handlers that need to await.
pub trait EventHandler: Send + Sync {
    /// React to `event`.
    fn handle<'a>(&'a self, event: &'a Event) -> BoxFuture<'a, Response>;
}

impl<F> EventHandler for F
where
    F: Fn(&Event) -> Response + Send + Sync,
{
    fn handle<'a>(&'a self, event: &'a Event) -> BoxFuture<'a, Response> {
        future::ready(self(event)).boxed()
    }
}

/// A handler that records every event it sees.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Kinds of the recorded events, oldest first.
    #[must_use]
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(|event| event.kind).collect()
    }

    /// Recorded events of one kind.
    #[must_use]
    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.kind == kind)
            .cloned()
            .collect()
    }

    /// Forget the recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventHandler for EventLog {
    fn handle<'a>(&'a self, event: &'a Event) -> BoxFuture<'a, Response> {
        self.events.lock().push(event.clone());
        future::ready(Response::Continue).boxed()
    }
}
