//! The signing engine: fields, capture, per-document sessions, the signing queue, submission
//! and the flow adapter that binds them to the platform API.

pub mod api;
pub mod capture;
pub mod document;
pub mod field;
pub mod flow;
pub mod queue;
pub mod submission;
