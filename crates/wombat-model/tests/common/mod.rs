//! A scripted `test:` site shared by the model tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use wombat_model::{Model, ModelConfig};
use wombat_net::{Dispatcher, Download, DownloadError, SchemeHandler};

/// Serves fixed pages for `test:` URLs and counts the requests.
#[derive(Default)]
pub struct Site {
    pages: HashMap<String, (&'static str, String)>,
    hits: Mutex<HashMap<String, usize>>,
    delay: Duration,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, mime: &'static str, body: &str) -> Self {
        let _ = self.pages.insert(url.to_owned(), (mime, body.to_owned()));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().get(url).copied().unwrap_or(0)
    }
}

impl SchemeHandler for Site {
    fn accepts(&self, url: &str) -> bool {
        url.starts_with("test:")
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Download, DownloadError>> {
        async move {
            *self.hits.lock().entry(url.to_owned()).or_default() += 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.pages
                .get(url)
                .map(|(mime, body)| Download::new(body.as_bytes(), *mime))
                .ok_or_else(|| DownloadError::Network {
                    url: url.to_owned(),
                    message: "not found".to_owned(),
                })
        }
        .boxed()
    }
}

/// A model that downloads `test:` URLs from `site`.
pub fn model_with(site: &Arc<Site>) -> Model {
    let config = ModelConfig::default();
    let dispatcher = Dispatcher::new(&config.dispatcher)
        .unwrap()
        .with_handler(Arc::clone(site) as Arc<dyn SchemeHandler>);
    Model::new(config).unwrap().with_dispatcher(dispatcher)
}
