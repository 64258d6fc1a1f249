//! Music library: scanning a directory into `Track`s, searching them and
//! managing the files behind them.

mod display;
mod download;
mod error;
mod model;
mod scan;
mod search;
mod store;

pub use download::{Downloader, is_remote_url};
pub use error::LibraryError;
pub use model::Track;
pub use search::filter;
pub use store::Library;
