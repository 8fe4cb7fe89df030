#![doc = "A sequential document e-signature engine."]
//!
//! `esign-flow` drives a signer through an ordered queue of documents. Each document is opened
//! into a [DocumentSession](crate::signing::document::session::DocumentSession), its fields are
//! laid out over rendered pages at fractional coordinates by the
//! [FieldRenderer](crate::signing::field::render::FieldRenderer), signatures and initials are
//! captured as raster images by a [SignatureCapture](crate::signing::capture::SignatureCapture),
//! and completed documents are posted back to the platform through the
//! [SubmissionPipeline](crate::signing::submission::SubmissionPipeline).
//!
//! The [SigningFlow](crate::signing::flow::SigningFlow) ties these together against any
//! [SigningApi](crate::signing::api::SigningApi) implementation.

pub mod config;
pub mod error;
pub mod signing;

/// A prelude for conveniently importing all public `esign-flow` definitions at once.
///
/// Usage:
/// ```
/// use esign_flow::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        config::*,
        error::*,
        signing::api::*,
        signing::capture::canvas::*,
        signing::capture::stroke::*,
        signing::capture::typed::*,
        signing::capture::upload::*,
        signing::capture::*,
        signing::document::autofill::*,
        signing::document::session::*,
        signing::document::*,
        signing::field::checkbox::*,
        signing::field::geometry::*,
        signing::field::render::*,
        signing::field::signature::*,
        signing::field::text::*,
        signing::field::*,
        signing::flow::*,
        signing::queue::*,
        signing::submission::*,
    };

    #[cfg(feature = "http")]
    pub use crate::signing::api::http::*;
}
