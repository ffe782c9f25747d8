//! Retrieval backends for variant records.
//!
//! A data source only needs "give me the records overlapping this interval";
//! the [`Storage`] trait captures that, so file-backed and remote sources can
//! be used interchangeably.
//!
//! # Implementations
//!
//! - [`LocalStorage`] - VCF file on the local filesystem
//! - [`HttpStorage`] - remote GA4GH-style JSON endpoint (feature `http`)
//!
//! # Example
//!
//! ```no_run
//! use vcfrange::storage::LocalStorage;
//! use vcfrange::VariantDataSource;
//! use std::sync::Arc;
//!
//! # async fn run() -> vcfrange::Result<()> {
//! let storage = Arc::new(LocalStorage::new("data/snv.vcf.gz"));
//! let source = VariantDataSource::from_storage(storage)?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "http")]
mod http;
mod local;

#[cfg(feature = "http")]
pub use http::HttpStorage;
pub use local::LocalStorage;

use crate::Result;
use crate::interval::ContigInterval;
use crate::variant::VariantContext;
use async_trait::async_trait;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Every record whose position lies in `range`. A failure leaves the
    /// range unloaded; the caller may retry later.
    async fn fetch(&self, range: &ContigInterval) -> Result<Vec<VariantContext>>;

    /// Sample names known without loading any records (e.g. from a file
    /// header). `None` means they are only learned from fetched calls.
    async fn sample_names(&self) -> Result<Option<Vec<String>>> {
        Ok(None)
    }
}
