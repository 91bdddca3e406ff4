//! HTTP middleware

mod timing;

pub use timing::TimingMiddleware;
