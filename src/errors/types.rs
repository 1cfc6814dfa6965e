//! Error type definitions for playback resolution
//!
//! Errors are scoped to a single rendition wherever possible: the facades
//! treat a failed role (video or audio) as absent and only surface an error
//! when nothing at all can be built. Every raised error carries enough
//! context (service, content id, rendition id, delivery method) for an
//! external error reporter to produce an actionable report.

use std::fmt;

use thiserror::Error;

use crate::models::{DeliveryMethod, StreamDescriptor};
use crate::models::rendition::RenditionRef;

/// Identifies the rendition an error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenditionContext {
    pub service_id: String,
    pub content_id: String,
    pub rendition_id: Option<String>,
    pub delivery: DeliveryMethod,
}

impl RenditionContext {
    pub fn new(descriptor: &StreamDescriptor, rendition: RenditionRef<'_>) -> Self {
        Self {
            service_id: descriptor.service_id.clone(),
            content_id: descriptor.content_id.clone(),
            rendition_id: rendition.id().map(str::to_string),
            delivery: rendition.delivery(),
        }
    }
}

impl fmt::Display for RenditionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "service {} content {} rendition {} ({})",
            self.service_id,
            self.content_id,
            self.rendition_id.as_deref().unwrap_or("unknown"),
            self.delivery.name()
        )
    }
}

/// Resolution errors for a single rendition or source.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The rendition's delivery method has no source-building branch.
    #[error("Unsupported delivery method for {context}")]
    UnsupportedDelivery { context: RenditionContext },

    /// A rendition claims to be URL-backed but its content is empty.
    #[error("Empty stream content for {context}")]
    EmptyContent { context: RenditionContext },

    /// Manifest synthesis or manifest payload handling failed.
    #[error("Manifest error for {context}: {source}")]
    Manifest {
        context: RenditionContext,
        #[source]
        source: ManifestError,
    },
}

impl ResolveError {
    pub fn unsupported_delivery(context: RenditionContext) -> Self {
        Self::UnsupportedDelivery { context }
    }

    pub fn empty_content(context: RenditionContext) -> Self {
        Self::EmptyContent { context }
    }

    pub fn manifest(context: RenditionContext, source: ManifestError) -> Self {
        Self::Manifest { context, source }
    }
}

/// Manifest synthesis and manifest payload errors.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The rendition carries no codec/segment metadata at all.
    #[error("Rendition has no media profile")]
    MissingProfile,

    /// A required profile field is absent.
    #[error("Missing profile field: {field}")]
    MissingField { field: &'static str },

    /// On-the-fly synthesis needs at least one segment timeline entry.
    #[error("Empty segment timeline")]
    EmptyTimeline,

    /// A literal manifest/playlist payload could not be parsed.
    #[error("Malformed manifest payload: {message}")]
    MalformedPayload { message: String },

    /// Serializing the synthesized document failed.
    #[error("Manifest serialization failed: {message}")]
    Serialize { message: String },

    /// No synthesizer is registered for the requested mode.
    #[error("Synthesis mode {mode} is not supported here")]
    UnsupportedMode { mode: &'static str },
}

impl ManifestError {
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn malformed<M: Into<String>>(message: M) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    pub fn serialize<M: Into<String>>(message: M) -> Self {
        Self::Serialize {
            message: message.into(),
        }
    }
}
