//! Interview backend adapters

mod http;

pub use http::HttpInterviewBackend;
