//! Storage-side metrics integration

mod instrument;

pub use instrument::Instrumented;
