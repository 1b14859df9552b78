//! One handler per URL scheme.

mod chrome;
mod content;
mod data;
mod file;
mod http;

pub use chrome::ChromeHandler;
pub use content::{CidHandler, ContentSource, NULL_MIME, ResourceHandler};
pub use data::{DataHandler, DataUrl, download_data_url};
pub use file::{FileHandler, file_url_to_path};
pub use http::HttpHandler;

pub(crate) use file::read_file;
