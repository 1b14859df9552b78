//! Views: the consumers of the document model.
//!
//! A view shows at most one document at a time. It owns the event
//! handlers, the warning set, the attribute cache and the referenced-by
//! index used to decide when linked documents can be released.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::trace;
use wombat_common::WarningSet;
use wombat_css::{CssError, MatchContext, MediaEnvironment, Node};
use wombat_dom::{DomTree, NodeId};

use crate::document::Document;
use crate::error::ModelError;
use crate::events::{Event, EventHandler, Response};

static NEXT_VIEW: AtomicU64 = AtomicU64::new(1);

/// Identifies a [`View`] in events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Tells which dynamic pseudo-classes (`hover`, `focus`, ...) an element
/// is in.
///
/// Closures of type `Fn(&DomTree, NodeId) -> Vec<String>` implement this
/// trait.
pub trait PseudoClassOracle: Send + Sync {
    /// Pseudo-classes `node` is in, without the colon.
    fn pseudo_classes(&self, tree: &DomTree, node: NodeId) -> Vec<String>;
}

impl<F> PseudoClassOracle for F
where
    F: Fn(&DomTree, NodeId) -> Vec<String> + Send + Sync,
{
    fn pseudo_classes(&self, tree: &DomTree, node: NodeId) -> Vec<String> {
        self(tree, node)
    }
}

/// Memoized attribute lookups: document, node, pseudo-element, property.
pub(crate) type StyleKey = (usize, NodeId, Option<String>, String);

#[derive(Default)]
struct ViewState {
    location: Option<String>,
    document: Option<Arc<Document>>,
    busy: bool,
    referenced: HashMap<String, HashSet<String>>,
}

/// One consumer of the document model.
pub struct View {
    id: ViewId,
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
    pub(crate) warnings: WarningSet,
    cancel: Mutex<CancellationToken>,
    state: Mutex<ViewState>,
    styles: Mutex<HashMap<StyleKey, Option<String>>>,
    oracle: RwLock<Option<Arc<dyn PseudoClassOracle>>>,
    media: RwLock<MediaEnvironment>,
}

impl View {
    /// A view with no handlers in the default media environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_media(MediaEnvironment::default())
    }

    /// A view laid out for `media`.
    #[must_use]
    pub fn with_media(media: MediaEnvironment) -> Self {
        Self {
            id: ViewId(NEXT_VIEW.fetch_add(1, Ordering::Relaxed)),
            handlers: RwLock::new(Vec::new()),
            warnings: WarningSet::new(),
            cancel: Mutex::new(CancellationToken::new()),
            state: Mutex::new(ViewState::default()),
            styles: Mutex::new(HashMap::new()),
            oracle: RwLock::new(None),
            media: RwLock::new(media),
        }
    }

    /// This view's id.
    #[must_use]
    pub const fn id(&self) -> ViewId {
        self.id
    }

    /// Register a handler; handlers run in registration order.
    pub fn add_handler(&self, handler: impl EventHandler + 'static) {
        self.handlers.write().push(Arc::new(handler));
    }

    /// Deliver `event` to every handler and combine their responses.
    pub async fn emit(&self, event: Event) -> Response {
        let handlers = self.handlers.read().clone();
        trace!(view = %self.id, kind = %event.kind, url = event.target.as_deref(), "event");
        let cancelable = event.cancelable();
        let mut response = Response::Continue;
        for handler in handlers {
            let wish = handler.handle(&event).await;
            response = response.merge(wish, cancelable);
        }
        response
    }

    /// Cancel the open in progress, if any.
    pub fn cancel(&self) {
        self.cancel.lock().cancel();
    }

    /// URL of the open document.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        self.state.lock().location.clone()
    }

    /// The open document.
    #[must_use]
    pub fn document(&self) -> Option<Arc<Document>> {
        self.state.lock().document.clone()
    }

    /// Documents that link to `url`.
    #[must_use]
    pub fn referenced_by(&self, url: &str) -> Vec<String> {
        let mut referrers: Vec<String> = self
            .state
            .lock()
            .referenced
            .get(url)
            .map(|referrers| referrers.iter().cloned().collect())
            .unwrap_or_default();
        referrers.sort();
        referrers
    }

    /// Whether no document link is recorded.
    #[must_use]
    pub fn references_empty(&self) -> bool {
        self.state.lock().referenced.is_empty()
    }

    /// Number of distinct warnings reported since the last open.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// The media environment.
    #[must_use]
    pub fn media(&self) -> MediaEnvironment {
        self.media.read().clone()
    }

    /// Change the media environment; cached attributes are dropped.
    pub fn set_media(&self, media: MediaEnvironment) {
        *self.media.write() = media;
        self.invalidate_styles();
    }

    /// Install the pseudo-class oracle; cached attributes are dropped.
    pub fn set_pseudo_class_oracle(&self, oracle: impl PseudoClassOracle + 'static) {
        *self.oracle.write() = Some(Arc::new(oracle));
        self.invalidate_styles();
    }

    /// Convert a CSS length to pixels at this view's resolution.
    ///
    /// # Errors
    ///
    /// Returns [`CssError`] when `spec` is not a length, or needs an
    /// `em_size` or `percentage` that is not given.
    pub fn units(
        &self,
        spec: &str,
        percentage: Option<f64>,
        origin: f64,
        em_size: Option<f64>,
    ) -> Result<f64, CssError> {
        wombat_css::units(spec, self.media.read().dpi, percentage, origin, em_size)
    }

    /// Drop every cached attribute value.
    pub fn invalidate_styles(&self) {
        self.styles.lock().clear();
    }

    /// Claim the view for opening `url`.
    pub(crate) fn begin_open(&self, url: &str) -> Result<CancellationToken, ModelError> {
        let mut state = self.state.lock();
        if state.busy || state.document.is_some() {
            return Err(ModelError::AlreadyOpen);
        }
        state.busy = true;
        state.location = Some(url.to_owned());
        state.referenced.clear();
        drop(state);

        self.warnings.clear();
        self.invalidate_styles();
        let token = CancellationToken::new();
        *self.cancel.lock() = token.clone();
        Ok(token)
    }

    /// Finish a successful open.
    pub(crate) fn finish_open(&self, document: Arc<Document>) {
        let mut state = self.state.lock();
        state.document = Some(document);
        state.busy = false;
    }

    /// Claim the view for closing; returns the URL and document shown.
    pub(crate) fn begin_close(&self) -> Result<(String, Arc<Document>), ModelError> {
        let mut state = self.state.lock();
        if state.busy {
            return Err(ModelError::NotOpen);
        }
        let (Some(location), Some(document)) = (state.location.clone(), state.document.clone())
        else {
            return Err(ModelError::NotOpen);
        };
        state.busy = true;
        Ok((location, document))
    }

    /// A `closing` handler kept the document open.
    pub(crate) fn close_prevented(&self) {
        self.state.lock().busy = false;
    }

    /// Forget the document, whether it opened or not.
    ///
    /// The referenced-by index is left as the unload walk left it.
    pub(crate) fn reset(&self) {
        let mut state = self.state.lock();
        state.location = None;
        state.document = None;
        state.busy = false;
        drop(state);
        self.invalidate_styles();
    }

    /// Record that `referrer` links to `url`.
    pub(crate) fn add_reference(&self, url: &str, referrer: &str) {
        let _ = self
            .state
            .lock()
            .referenced
            .entry(url.to_owned())
            .or_default()
            .insert(referrer.to_owned());
    }

    /// Drop the link from `referrer` to `url`; returns whether this removed
    /// the last link to `url`.
    pub(crate) fn remove_reference(&self, url: &str, referrer: &str) -> bool {
        let mut state = self.state.lock();
        let Some(referrers) = state.referenced.get_mut(url) else {
            return false;
        };
        let _ = referrers.remove(referrer);
        if referrers.is_empty() {
            let _ = state.referenced.remove(url);
            true
        } else {
            false
        }
    }

    pub(crate) fn cached_style(&self, key: &StyleKey) -> Option<Option<String>> {
        self.styles.lock().get(key).cloned()
    }

    pub(crate) fn cache_style(&self, key: StyleKey, value: Option<String>) {
        let _ = self.styles.lock().insert(key, value);
    }

    /// Selector matching context for this view's current state.
    pub(crate) fn match_context(&self) -> ViewContext {
        ViewContext {
            media: self.media(),
            oracle: self.oracle.read().clone(),
        }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id)
            .field("location", &self.location())
            .finish_non_exhaustive()
    }
}

/// Matching context built from a view's media environment and
/// pseudo-class oracle.
pub(crate) struct ViewContext {
    media: MediaEnvironment,
    oracle: Option<Arc<dyn PseudoClassOracle>>,
}

impl MatchContext for ViewContext {
    fn pseudo_classes(&self, tree: &DomTree, node: NodeId) -> Vec<String> {
        self.oracle
            .as_ref()
            .map(|oracle| oracle.pseudo_classes(tree, node))
            .unwrap_or_default()
    }

    fn media_matches(&self, prelude: &Node) -> bool {
        self.media.matches(prelude)
    }
}
