use super::Storage;
use crate::formats::VcfReader;
use crate::interval::ContigInterval;
use crate::variant::VariantContext;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// A VCF file on disk (`.vcf` or bgzipped `.vcf.gz`, with a `.tbi`/`.csi`
/// index used when present).
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_index(&self) -> bool {
        VcfReader::index_path(&self.path).is_some()
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn fetch(&self, range: &ContigInterval) -> Result<Vec<VariantContext>> {
        if !self.path.exists() {
            return Err(Error::NotFound(self.path.display().to_string()));
        }
        VcfReader::query(&self.path, range).await
    }

    async fn sample_names(&self) -> Result<Option<Vec<String>>> {
        VcfReader::sample_names(&self.path).await.map(Some)
    }
}
