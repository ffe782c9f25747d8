use crate::interval::ContigInterval;
use crate::variant::{Call, NO_CALL, Variant, VariantContext};
use crate::{Error, Result};
use noodles::core::{Position, Region};
use noodles::core::region::Interval;
use noodles::vcf;
use noodles::vcf::variant::RecordBuf;
use noodles::vcf::variant::io::Write as _;
use noodles::vcf::variant::record::samples::keys::key;
use noodles::vcf::variant::record_buf::samples::sample::Value;
use std::path::{Path, PathBuf};

pub struct VcfReader;

impl VcfReader {
    /// Sample names from the VCF header, in column order.
    pub async fn sample_names(path: &Path) -> Result<Vec<String>> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::read_sample_names(&path))
            .await
            .map_err(|e| Error::Internal(format!("VCF header task failed: {}", e)))?
    }

    /// Every record whose position falls in `range`.
    pub async fn query(path: &Path, range: &ContigInterval) -> Result<Vec<VariantContext>> {
        let path = path.to_path_buf();
        let range = range.clone();
        tokio::task::spawn_blocking(move || match Self::index_path(&path) {
            Some(_) => Self::read_indexed(&path, &range),
            None => Self::read_scan(&path, &range),
        })
        .await
        .map_err(|e| Error::Internal(format!("VCF query task failed: {}", e)))?
    }

    pub fn read_sample_names(path: &Path) -> Result<Vec<String>> {
        let mut reader = open(path)?;
        let header = reader.read_header()?;
        Ok(header.sample_names().iter().cloned().collect())
    }

    /// Tabix (`.tbi`) or CSI index next to a bgzipped VCF.
    pub fn index_path(path: &Path) -> Option<PathBuf> {
        ["tbi", "csi"]
            .iter()
            .map(|ext| PathBuf::from(format!("{}.{}", path.display(), ext)))
            .find(|p| p.exists())
    }

    fn read_scan(path: &Path, range: &ContigInterval) -> Result<Vec<VariantContext>> {
        let mut reader = open(path)?;
        let header = reader.read_header()?;

        let mut contexts = Vec::new();
        let mut record = vcf::Record::default();
        while reader.read_record(&mut record)? != 0 {
            if record.reference_sequence_name() != range.contig() {
                continue;
            }
            if let Some(ctx) = to_context(&header, &record, range)? {
                contexts.push(ctx);
            }
        }

        tracing::debug!("scanned {} for {}: {} records", path.display(), range, contexts.len());
        Ok(contexts)
    }

    fn read_indexed(path: &Path, range: &ContigInterval) -> Result<Vec<VariantContext>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = vcf::io::indexed_reader::Builder::default()
            .build_from_path(path)
            .map_err(|e| Error::NotFound(format!("{}: {}", path.display(), e)))?;
        let header = reader.read_header()?;

        // 0-based half-open to 1-based closed
        let start = Position::try_from(range.start() as usize + 1)
            .map_err(|e| Error::InvalidRange(format!("invalid start position: {}", e)))?;
        let end = Position::try_from(range.stop() as usize)
            .map_err(|e| Error::InvalidRange(format!("invalid end position: {}", e)))?;
        let region = Region::new(range.contig(), Interval::from(start..=end));

        let mut contexts = Vec::new();
        let query = reader
            .query(&header, &region)
            .map_err(|e| Error::Fetch(format!("index query failed for {}: {}", range, e)))?;
        for result in query {
            let record = result?;
            if let Some(ctx) = to_context(&header, &record, range)? {
                contexts.push(ctx);
            }
        }

        tracing::debug!("queried {} for {}: {} records", path.display(), range, contexts.len());
        Ok(contexts)
    }
}

fn open(path: &Path) -> Result<vcf::io::Reader<Box<dyn std::io::BufRead>>> {
    vcf::io::reader::Builder::default()
        .build_from_path(path)
        .map_err(|e| Error::NotFound(format!("{}: {}", path.display(), e)))
}

/// Convert a record to a context when its position lies in `range`.
fn to_context(
    header: &vcf::Header,
    record: &vcf::Record,
    range: &ContigInterval,
) -> Result<Option<VariantContext>> {
    let buf = RecordBuf::try_from_variant_record(header, record)?;

    // POS 0 marks a telomere; it has no 0-based position
    let Some(start) = buf.variant_start() else {
        return Ok(None);
    };
    let position = (usize::from(start) - 1) as u64;
    if !range.contains_position(position) {
        return Ok(None);
    }

    let variant = Variant {
        contig: buf.reference_sequence_name().to_string(),
        position,
        reference: buf.reference_bases().to_string(),
        alt: buf
            .alternate_bases()
            .as_ref()
            .first()
            .cloned()
            .unwrap_or_default(),
        id: buf.ids().as_ref().iter().next().cloned(),
        raw: raw_line(header, &buf)?,
    };

    let samples = buf.samples();
    let calls = header
        .sample_names()
        .iter()
        .enumerate()
        .map(|(i, name)| Call {
            call_set_name: name.clone(),
            genotype: samples
                .get_index(i)
                .and_then(|sample| sample.get(key::GENOTYPE).flatten().map(genotype_alleles))
                .unwrap_or_default(),
        })
        .collect();

    Ok(Some(VariantContext::new(variant, calls)))
}

fn genotype_alleles(value: &Value) -> Vec<i32> {
    match value {
        Value::Genotype(genotype) => genotype
            .as_ref()
            .iter()
            .map(|allele| allele.position().map_or(NO_CALL, |p| p as i32))
            .collect(),
        _ => Vec::new(),
    }
}

fn raw_line(header: &vcf::Header, record: &RecordBuf) -> Result<String> {
    let mut writer = vcf::io::Writer::new(Vec::new());
    writer.write_variant_record(header, record)?;
    let line = String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Internal(format!("VCF record is not UTF-8: {}", e)))?;
    Ok(line.trim_end_matches('\n').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/snv.vcf")
    }

    #[test]
    fn test_sample_names_from_header() {
        let names = VcfReader::read_sample_names(&fixture()).unwrap();
        assert_eq!(names, vec!["NORMAL", "TUMOR"]);
    }

    #[tokio::test]
    async fn test_query_range() {
        let range = ContigInterval::new("20", 63799, 69094).unwrap();
        let contexts = VcfReader::query(&fixture(), &range).await.unwrap();
        assert_eq!(contexts.len(), 6);

        let first = &contexts[0];
        assert_eq!(first.variant.contig, "20");
        assert_eq!(first.variant.position, 63799);
        assert_eq!(first.variant.reference, "C");
        assert_eq!(first.variant.alt, "T");
        assert_eq!(first.calls[0].call_set_name, "NORMAL");
        assert_eq!(first.calls[0].genotype, vec![0, 1]);
        assert_eq!(first.calls[1].call_set_name, "TUMOR");

        let fields: Vec<&str> = first.variant.raw.split('\t').collect();
        assert_eq!(fields[0], "20");
        assert_eq!(fields[1], "63800");
        assert_eq!(fields.len(), 11);
    }

    #[tokio::test]
    async fn test_query_other_contig_and_no_call() {
        let range = ContigInterval::new("21", 0, 1_000_000).unwrap();
        let contexts = VcfReader::query(&fixture(), &range).await.unwrap();
        assert_eq!(contexts.len(), 1);
        assert_eq!(contexts[0].calls[1].genotype, vec![NO_CALL, NO_CALL]);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let range = ContigInterval::new("20", 0, 10).unwrap();
        let err = VcfReader::query(Path::new("does/not/exist.vcf"), &range)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
