//! The document loader.
//!
//! [`Model::open_document`] downloads a document and, recursively, every
//! document it links to. Each URL is fetched once no matter how many
//! documents or views ask for it: the first task to ask claims the download
//! and the others wait for its completion signal. Documents stay cached
//! while any view uses them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, join_all};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace};
use wombat_common::{resolve_url, split_fragment, url_root};
use wombat_css::{scan_font_faces, scan_imports};
use wombat_dom::NodeId;
use wombat_net::{Dispatcher, Download, NULL_MIME};

use crate::config::ModelConfig;
use crate::document::{Document, get_document_fragment};
use crate::error::ModelError;
use crate::events::{Event, EventKind, Response};
use crate::fonts::{FontDirectory, FontRegistry};
use crate::formats::FormatRegistry;
use crate::links::{scan_document_links, stylesheet_links};
use crate::view::{View, ViewId};

/// Redirect chains longer than this are treated as missing documents.
const MAX_REDIRECTS: usize = 16;

/// What the caches know about a URL.
enum Lookup {
    Missing,
    /// Loading was prevented by a handler.
    Unavailable,
    Redirect(String),
    Found(Arc<Document>),
}

/// What fetching a URL produced.
enum Source {
    Redirect(String),
    Document(Arc<Document>),
}

/// URLs already walked during one `open_document` call.
#[derive(Default)]
struct Walk {
    visited: Mutex<HashSet<String>>,
}

/// Download claim on a URL; dropping it signals the waiters.
struct Downloading<'a> {
    model: &'a Model,
    url: String,
    _done: watch::Sender<()>,
}

impl Drop for Downloading<'_> {
    fn drop(&mut self) {
        let _ = self.model.downloading.lock().remove(&self.url);
    }
}

/// Puts a view back to its closed state unless the open completed.
struct OpenGuard<'a> {
    model: &'a Model,
    view: &'a View,
    armed: bool,
}

impl Drop for OpenGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.view.reset();
            self.model.release_view(self.view.id());
        }
    }
}

/// The document model: loader, document cache and style cascade shared by
/// any number of [`View`]s.
pub struct Model {
    config: ModelConfig,
    dispatcher: Dispatcher,
    formats: Arc<FormatRegistry>,
    fonts: Arc<dyn FontRegistry>,
    documents: Mutex<HashMap<String, Option<Arc<Document>>>>,
    redirects: Mutex<HashMap<String, String>>,
    downloading: Mutex<HashMap<String, watch::Receiver<()>>>,
    users: Mutex<HashMap<String, HashSet<ViewId>>>,
}

impl Model {
    /// A model with the standard scheme handlers, formats and a font
    /// directory, all configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Download`] when the HTTP client cannot be built.
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let dispatcher = Dispatcher::new(&config.dispatcher)?;
        let fonts = Arc::new(FontDirectory::new(config.font_dir.clone()));
        Ok(Self {
            config,
            dispatcher,
            formats: Arc::new(FormatRegistry::new()),
            fonts,
            documents: Mutex::new(HashMap::new()),
            redirects: Mutex::new(HashMap::new()),
            downloading: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
        })
    }

    /// Download through `dispatcher`.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Decode through `formats`.
    #[must_use]
    pub fn with_formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = Arc::new(formats);
        self
    }

    /// Install `@font-face` fonts into `fonts`.
    #[must_use]
    pub fn with_font_registry(mut self, fonts: Arc<dyn FontRegistry>) -> Self {
        self.fonts = fonts;
        self
    }

    /// The configuration the model was built with.
    #[must_use]
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// A view in the configured media environment.
    #[must_use]
    pub fn create_view(&self) -> View {
        View::with_media(self.config.media_environment())
    }

    /// Open `url` in `view`, loading everything it links to.
    ///
    /// Returns `None` when a handler prevented the open or the document
    /// could not be parsed. Download failures do not fail the open; they
    /// produce warnings and [`Document::Null`] placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::AlreadyOpen`] when the view shows a document
    /// and [`ModelError::Cancelled`] when [`View::cancel`] was called.
    pub async fn open_document(
        &self,
        view: &View,
        url: &str,
    ) -> Result<Option<Arc<Document>>, ModelError> {
        let token = view.begin_open(url)?;
        let mut guard = OpenGuard {
            model: self,
            view,
            armed: true,
        };
        debug!(view = %view.id(), url, "opening document");

        let opening = Event::new(EventKind::Opening, view.id()).with_target(url);
        if view.emit(opening).await.is_prevented() {
            debug!(view = %view.id(), url, "open prevented");
            return Ok(None);
        }

        let walk = Walk::default();
        let document = tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!(view = %view.id(), url, "open cancelled");
                let cancelled = Event::new(EventKind::Cancelled, view.id()).with_target(url);
                let _ = view.emit(cancelled).await;
                return Err(ModelError::Cancelled);
            }
            document = self.load(view, url, &walk, 0) => document,
        };
        let Some(document) = document else {
            return Ok(None);
        };

        self.install_fonts(view, url, &document).await;

        let open = Event::new(EventKind::Open, view.id())
            .with_target(url)
            .with_document(Arc::clone(&document));
        if view.emit(open).await.is_prevented() {
            return Ok(None);
        }

        view.finish_open(Arc::clone(&document));
        guard.armed = false;
        debug!(view = %view.id(), url, kind = %document.kind(), "document open");
        Ok(Some(document))
    }

    /// Close the document shown in `view`, releasing everything it linked
    /// to that no other view uses.
    ///
    /// Returns `false` when a `closing` handler prevented the close.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotOpen`] when the view shows no document.
    pub async fn close_document(&self, view: &View) -> Result<bool, ModelError> {
        let (url, document) = view.begin_close()?;

        let closing = Event::new(EventKind::Closing, view.id())
            .with_target(url.as_str())
            .with_document(document);
        if view.emit(closing).await.is_prevented() {
            view.close_prevented();
            return Ok(false);
        }

        let mut done = HashSet::new();
        self.unload(view, &url, &mut done).await;
        self.release_view(view.id());

        let unused = self.users.lock().is_empty();
        if unused {
            if let Err(error) = self.fonts.uninstall_fonts().await {
                self.emit_warning(view, &error.to_string(), None).await;
            }
        }

        let close = Event::new(EventKind::Close, view.id()).with_target(url.as_str());
        let _ = view.emit(close).await;
        view.reset();
        debug!(view = %view.id(), url = %url, "document closed");
        Ok(true)
    }

    /// The loaded document of `url`; the fragment is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DocumentNotFound`] when the URL is not loaded.
    pub fn get_document(&self, url: &str) -> Result<Arc<Document>, ModelError> {
        let mut key = url_root(url).to_owned();
        for _ in 0..MAX_REDIRECTS {
            match self.lookup(&key) {
                Lookup::Found(document) => return Ok(document),
                Lookup::Redirect(target) => key = target,
                Lookup::Missing | Lookup::Unavailable => break,
            }
        }
        Err(ModelError::DocumentNotFound(url.to_owned()))
    }

    /// The element a URL points at: the one named by its fragment, or the
    /// document element when it has none.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DocumentNotFound`] when the document is not
    /// loaded and [`ModelError::FragmentNotFound`] when it has no such
    /// element.
    pub fn get_fragment(&self, url: &str) -> Result<(Arc<Document>, NodeId), ModelError> {
        let (root, fragment) = split_fragment(url);
        let document = self.get_document(root)?;
        let node = match fragment {
            Some(id) => get_document_fragment(&document, id)?,
            None => document
                .tree()
                .and_then(wombat_dom::DomTree::document_element)
                .ok_or_else(|| ModelError::FragmentNotFound(String::new()))?,
        };
        Ok((document, node))
    }

    /// Whether `url` is in the document cache.
    #[must_use]
    pub fn is_cached(&self, url: &str) -> bool {
        self.documents.lock().contains_key(url_root(url))
    }

    /// URL `document` was loaded from.
    #[must_use]
    pub fn document_url(&self, document: &Arc<Document>) -> Option<String> {
        self.documents
            .lock()
            .iter()
            .find(|(_, cached)| cached.as_ref().is_some_and(|cached| Arc::ptr_eq(cached, document)))
            .map(|(url, _)| url.clone())
    }

    /// Report a diagnostic once per view and open.
    pub async fn emit_warning(&self, view: &View, message: &str, target: Option<&str>) {
        if !view.warnings.should_emit(message) {
            return;
        }
        let mut event = Event::new(EventKind::Warning, view.id()).with_detail(message);
        if let Some(target) = target {
            event = event.with_target(target);
        }
        let _ = view.emit(event).await;
    }

    /// CSS documents styling `document` (loaded from `url`), each preceded
    /// by the sheets it imports.
    pub(crate) fn stylesheets(&self, url: &str, document: &Document) -> Vec<(String, Arc<Document>)> {
        let base = url_root(url);
        let mut seen = HashSet::new();
        let mut sheets = Vec::new();
        for link in stylesheet_links(document) {
            self.collect_stylesheet(&resolve_url(&link, base), &mut seen, &mut sheets);
        }
        sheets
    }

    fn collect_stylesheet(
        &self,
        url: &str,
        seen: &mut HashSet<String>,
        sheets: &mut Vec<(String, Arc<Document>)>,
    ) {
        if !seen.insert(url.to_owned()) {
            return;
        }
        let Ok(document) = self.get_document(url) else {
            return;
        };
        let Some(css) = document.as_css() else {
            return;
        };
        for import in scan_imports(&css.stylesheet.root) {
            self.collect_stylesheet(&resolve_url(&import, url_root(url)), seen, sheets);
        }
        sheets.push((url.to_owned(), document));
    }

    fn lookup(&self, url: &str) -> Lookup {
        if let Some(target) = self.redirects.lock().get(url) {
            return Lookup::Redirect(target.clone());
        }
        match self.documents.lock().get(url) {
            Some(Some(document)) => Lookup::Found(Arc::clone(document)),
            Some(None) => Lookup::Unavailable,
            None => Lookup::Missing,
        }
    }

    fn store(&self, url: &str, document: Option<Arc<Document>>) {
        let _ = self.documents.lock().insert(url.to_owned(), document);
    }

    fn add_user(&self, url: &str, view: ViewId) {
        let _ = self
            .users
            .lock()
            .entry(url.to_owned())
            .or_default()
            .insert(view);
    }

    /// `view` no longer needs `url`; evict it when no view does.
    fn release(&self, url: &str, view: ViewId) {
        let mut users = self.users.lock();
        let Some(viewers) = users.get_mut(url) else {
            return;
        };
        let _ = viewers.remove(&view);
        if viewers.is_empty() {
            let _ = users.remove(url);
            drop(users);
            self.evict(url);
        }
    }

    /// Release every URL `view` uses.
    fn release_view(&self, view: ViewId) {
        let mut emptied = Vec::new();
        self.users.lock().retain(|url, viewers| {
            let _ = viewers.remove(&view);
            if viewers.is_empty() {
                emptied.push(url.clone());
            }
            !viewers.is_empty()
        });
        for url in emptied {
            self.evict(&url);
        }
    }

    fn evict(&self, url: &str) {
        let _ = self.documents.lock().remove(url);
        let _ = self.redirects.lock().remove(url);
        trace!(url, "document evicted");
    }

    /// Load `url` and, on its first visit in this walk, everything it links
    /// to. Fires `load` once the links are loaded.
    ///
    /// `hops` counts the redirects followed to reach `url`.
    fn load<'a>(
        &'a self,
        view: &'a View,
        url: &'a str,
        walk: &'a Walk,
        hops: usize,
    ) -> BoxFuture<'a, Option<Arc<Document>>> {
        async move {
            let url = url_root(url);
            self.add_user(url, view.id());
            let first_visit = walk.visited.lock().insert(url.to_owned());

            let document = match self.obtain(view, url).await? {
                Source::Redirect(target) if hops < MAX_REDIRECTS => {
                    return self.load(view, &target, walk, hops + 1).await;
                }
                Source::Redirect(target) => {
                    debug!(url, redirect = %target, "redirect limit reached");
                    self.emit_warning(view, "Too many redirects", Some(url)).await;
                    let _ = self.redirects.lock().remove(url);
                    self.store(url, None);
                    return None;
                }
                Source::Document(document) => document,
            };
            if !first_visit || url.starts_with("data:") {
                return Some(document);
            }

            let base = url_root(url);
            let mut seen = HashSet::new();
            let mut pending = Vec::new();
            for link in scan_document_links(&document) {
                let absolute = url_root(&resolve_url(&link, base)).to_owned();
                if !seen.insert(absolute.clone()) {
                    continue;
                }
                view.add_reference(&absolute, url);
                if absolute.starts_with("data:") {
                    let _ = self.load(view, &absolute, walk, 0).await;
                } else {
                    pending.push(absolute);
                }
            }
            trace!(url, links = seen.len(), "loading links");
            let _ = join_all(pending.iter().map(|link| self.load(view, link, walk, 0))).await;

            let load = Event::new(EventKind::Load, view.id())
                .with_target(url)
                .with_document(Arc::clone(&document));
            match view.emit(load).await {
                Response::Substitute(substitute) => {
                    self.store(url, Some(Arc::clone(&substitute)));
                    Some(substitute)
                }
                _ => Some(document),
            }
        }
        .boxed()
    }

    /// The cached entry of `url`, downloading it or waiting for the task
    /// that does.
    async fn obtain(&self, view: &View, url: &str) -> Option<Source> {
        let claim = {
            let mut downloading = self.downloading.lock();
            match self.lookup(url) {
                Lookup::Found(document) => return Some(Source::Document(document)),
                Lookup::Redirect(target) => return Some(Source::Redirect(target)),
                Lookup::Unavailable => return None,
                Lookup::Missing => {}
            }
            match downloading.get(url) {
                Some(signal) => Err(signal.clone()),
                None => {
                    let (done, signal) = watch::channel(());
                    let _ = downloading.insert(url.to_owned(), signal);
                    Ok(Downloading {
                        model: self,
                        url: url.to_owned(),
                        _done: done,
                    })
                }
            }
        };

        match claim {
            Ok(claim) => self.fetch(view, url, claim).await,
            Err(mut signal) => {
                trace!(url, "waiting for download");
                let _ = signal.changed().await;
                match self.lookup(url) {
                    Lookup::Found(document) => Some(Source::Document(document)),
                    Lookup::Redirect(target) => Some(Source::Redirect(target)),
                    Lookup::Unavailable => None,
                    Lookup::Missing => {
                        self.emit_warning(view, "Download not attempted", Some(url)).await;
                        None
                    }
                }
            }
        }
    }

    /// Download and decode `url` while holding its claim.
    async fn fetch(&self, view: &View, url: &str, claim: Downloading<'_>) -> Option<Source> {
        let download = Event::new(EventKind::Download, view.id()).with_target(url);
        match view.emit(download).await {
            Response::Prevent => {
                debug!(url, "download prevented");
                self.store(url, None);
                return None;
            }
            Response::Redirect(target) => {
                let target = url_root(&target).to_owned();
                if target != url {
                    let redirect = Event::new(EventKind::Redirect, view.id())
                        .with_target(url)
                        .with_detail(target.as_str());
                    if !view.emit(redirect).await.is_prevented() {
                        debug!(url, redirect = %target, "download redirected");
                        let _ = self
                            .redirects
                            .lock()
                            .insert(url.to_owned(), target.clone());
                        drop(claim);
                        return Some(Source::Redirect(target));
                    }
                }
            }
            Response::Continue | Response::Substitute(_) => {}
        }

        let Download { data, mime } = match self.dispatcher.download(url).await {
            Ok(download) => download,
            Err(error) => {
                self.emit_warning(view, &format!("Error downloading document: {error}"), Some(url))
                    .await;
                let failed = Event::new(EventKind::Error, view.id())
                    .with_target(url)
                    .with_detail(error.to_string());
                let _ = view.emit(failed).await;
                Download::new(Vec::new(), NULL_MIME)
            }
        };

        let formats = Arc::clone(&self.formats);
        let created =
            tokio::task::spawn_blocking(move || formats.create_document_with_issues(&data, &mime))
                .await
                .unwrap_or_else(|error| Err(ModelError::Parse(error.to_string())));
        let mut document = match created {
            Ok((document, issues)) => {
                for issue in issues {
                    self.emit_warning(view, &issue, Some(url)).await;
                }
                Arc::new(document)
            }
            Err(error) => {
                self.emit_warning(view, &format!("Error creating document: {error}"), Some(url))
                    .await;
                self.store(url, Some(Arc::new(Document::Null)));
                let kind = match error {
                    ModelError::Parse(_) => EventKind::ParseError,
                    _ => EventKind::Error,
                };
                let failed = Event::new(kind, view.id())
                    .with_target(url)
                    .with_detail(error.to_string());
                let _ = view.emit(failed).await;
                return None;
            }
        };
        trace!(url, kind = %document.kind(), "document created");

        let before_load = Event::new(EventKind::BeforeLoad, view.id())
            .with_target(url)
            .with_document(Arc::clone(&document));
        match view.emit(before_load).await {
            Response::Prevent => {
                debug!(url, "load prevented");
                self.store(url, None);
                return None;
            }
            Response::Substitute(substitute) => document = substitute,
            Response::Continue | Response::Redirect(_) => {}
        }
        self.store(url, Some(Arc::clone(&document)));
        drop(claim);
        Some(Source::Document(document))
    }

    /// Release `url` for `view`, walking its links and releasing those that
    /// nothing else references.
    fn unload<'a>(
        &'a self,
        view: &'a View,
        url: &'a str,
        done: &'a mut HashSet<String>,
    ) -> BoxFuture<'a, ()> {
        async move {
            if !done.insert(url.to_owned()) {
                return;
            }
            let target = self.redirects.lock().get(url).cloned();
            if let Some(target) = target {
                self.unload(view, &target, done).await;
                self.release(url, view.id());
                return;
            }

            let document = self.documents.lock().get(url).cloned().flatten();
            if let Some(document) = document {
                let before_unload = Event::new(EventKind::BeforeUnload, view.id())
                    .with_target(url)
                    .with_document(Arc::clone(&document));
                if !view.emit(before_unload).await.is_prevented() {
                    if !url.starts_with("data:") {
                        let base = url_root(url);
                        for link in scan_document_links(&document) {
                            let absolute = url_root(&resolve_url(&link, base)).to_owned();
                            if view.remove_reference(&absolute, url) {
                                self.unload(view, &absolute, done).await;
                            }
                        }
                    }
                    let unload = Event::new(EventKind::Unload, view.id())
                        .with_target(url)
                        .with_document(document);
                    let _ = view.emit(unload).await;
                }
            }
            self.release(url, view.id());
        }
        .boxed()
    }

    /// Install the fonts declared by `@font-face` rules of the document's
    /// stylesheets, using the first source that loaded as a font.
    async fn install_fonts(&self, view: &View, url: &str, document: &Document) {
        for (sheet_url, sheet) in self.stylesheets(url, document) {
            let Some(css) = sheet.as_css() else {
                continue;
            };
            for face in scan_font_faces(&css.stylesheet.root) {
                if self.fonts.is_font_installed(&face.family).await {
                    continue;
                }
                let mut installed = false;
                for source in &face.sources {
                    let font_url = resolve_url(&source.url, url_root(&sheet_url));
                    let Ok(loaded) = self.get_document(&font_url) else {
                        continue;
                    };
                    let Some(font) = loaded.as_font() else {
                        continue;
                    };
                    match self.fonts.install_font(font, &face.family, &font_url).await {
                        Ok(()) => {
                            debug!(family = %face.family, url = %font_url, "font installed");
                            installed = true;
                            break;
                        }
                        Err(error) => {
                            self.emit_warning(view, &error.to_string(), Some(&font_url)).await;
                        }
                    }
                }
                if !installed {
                    let message = format!("Could not load font: {}", face.family);
                    self.emit_warning(view, &message, Some(&sheet_url)).await;
                }
            }
        }
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("dispatcher", &self.dispatcher)
            .field("formats", &self.formats)
            .field("documents", &self.documents.lock().len())
            .finish_non_exhaustive()
    }
}
