// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Clarity query router.
//!
//! This crate provides the error type, the domain types shared by the
//! analyzer and the dispatch engine, the provider adapter traits, and the
//! tolerant text extraction applied to every provider result.

pub mod error;
pub mod extract;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ClarityError;
pub use extract::{extract_text, is_placeholder};
pub use types::{
    Candidate, ContentPart, FinishReason, GenerationParams, HealthStatus, MediaAttachment,
    MediaFlags, MediaKind, MediaPayload, ProviderRequest, ProviderResult, Tier, UploadHandle,
};

pub use traits::{PluginAdapter, ProviderAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clarity_error_has_all_variants() {
        let _config = ClarityError::Config("test".into());
        let _provider = ClarityError::Provider {
            message: "test".into(),
            status: Some(500),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _upload = ClarityError::Upload {
            name: "clip.mp4".into(),
            message: "test".into(),
        };
        let _media = ClarityError::Media {
            name: "big.png".into(),
            message: "test".into(),
        };
        let _internal = ClarityError::Internal("test".into());
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        let degraded = HealthStatus::Degraded("slow".into());
        let unhealthy = HealthStatus::Unhealthy("down".into());

        assert_eq!(healthy, HealthStatus::Healthy);
        assert_ne!(degraded, healthy);
        assert_ne!(unhealthy, healthy);
    }

    #[test]
    fn provider_traits_are_exported() {
        // Compile-time check that the traits are object safe.
        fn _assert_object_safe(_: &dyn ProviderAdapter) {}
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
    }
}
