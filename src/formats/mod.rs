//! Decoders that turn source records into [`VariantContext`] values.
//!
//! - [`ga4gh`] - GA4GH-style JSON payloads (eager bulk loads and the HTTP
//!   service's response body)
//! - [`VcfReader`] - VCF files, plain or BGZF-compressed, with optional
//!   tabix/CSI index for region queries
//!
//! [`VariantContext`]: crate::variant::VariantContext

pub mod ga4gh;
mod vcf;

pub use ga4gh::{VariantPayload, decode_payload, decode_payload_slice};
pub use vcf::VcfReader;
