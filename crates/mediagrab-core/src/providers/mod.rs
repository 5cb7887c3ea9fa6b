//! Media providers module
//!
//! Contains implementations of `MediaProvider` for each extraction backend.

pub mod fdown;
pub mod instagram;
pub mod mirror;
pub mod ytdlp;

mod http;

pub use fdown::FdownProvider;
pub use instagram::InstagramSessionProvider;
pub use mirror::AjaxMirrorProvider;
pub use ytdlp::YtdlpProvider;
