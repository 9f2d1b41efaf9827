pub mod cache;
pub mod cli;
pub mod config;
pub mod context;
pub mod dex;
pub mod diag;
pub mod error;
pub mod lister;
pub mod paths;
pub mod prefs;

pub use config::Config;
pub use context::{ApplicationContext, ContextProvider, FsContextProvider};
pub use diag::{DiagnosticsSink, LogSink};
pub use error::{ListerError, Result};
pub use lister::ClassLister;
