use crate::variant::{Call, Variant, VariantContext};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bulk variant payload: variant id mapped to a GA4GH-style variant record.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VariantPayload {
    #[serde(default)]
    pub variants: BTreeMap<String, Ga4ghVariant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ga4ghVariant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub reference_name: String,
    pub start: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
    pub reference_bases: String,
    #[serde(default)]
    pub alternate_bases: Vec<String>,
    #[serde(default)]
    pub calls: Vec<Call>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
}

impl From<Ga4ghVariant> for VariantContext {
    fn from(v: Ga4ghVariant) -> Self {
        let alt = v.alternate_bases.into_iter().next().unwrap_or_default();
        VariantContext::new(
            Variant {
                contig: v.reference_name,
                position: v.start,
                reference: v.reference_bases,
                alt,
                id: v.id,
                raw: v.record.unwrap_or_default(),
            },
            v.calls,
        )
    }
}

impl From<&VariantContext> for Ga4ghVariant {
    fn from(ctx: &VariantContext) -> Self {
        let v = &ctx.variant;
        Ga4ghVariant {
            id: v.id.clone(),
            reference_name: v.contig.clone(),
            start: v.position,
            end: Some(v.position.saturating_add(v.reference.len().max(1) as u64)),
            reference_bases: v.reference.clone(),
            alternate_bases: if v.alt.is_empty() {
                vec![]
            } else {
                vec![v.alt.clone()]
            },
            calls: ctx.calls.clone(),
            record: (!v.raw.is_empty()).then(|| v.raw.clone()),
        }
    }
}

impl VariantPayload {
    pub fn from_contexts<'a, I>(contexts: I) -> Self
    where
        I: IntoIterator<Item = &'a VariantContext>,
    {
        let variants = contexts
            .into_iter()
            .map(|ctx| (payload_key(&ctx.variant), Ga4ghVariant::from(ctx)))
            .collect();
        Self { variants }
    }

    /// Records sorted by contig and position.
    pub fn into_contexts(self) -> Vec<VariantContext> {
        let mut contexts: Vec<VariantContext> =
            self.variants.into_values().map(VariantContext::from).collect();
        contexts.sort_by(|a, b| {
            (&a.variant.contig, a.variant.position).cmp(&(&b.variant.contig, b.variant.position))
        });
        contexts
    }
}

fn payload_key(v: &Variant) -> String {
    format!("{}:{}:{}>{}", v.contig, v.position, v.reference, v.alt)
}

/// Decode a JSON payload. Blank input is the empty payload; anything that
/// does not match the schema is `MalformedPayload`.
pub fn decode_payload(json: &str) -> Result<Vec<VariantContext>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let payload: VariantPayload = serde_json::from_str(json)?;
    Ok(payload.into_contexts())
}

pub fn decode_payload_slice(bytes: &[u8]) -> Result<Vec<VariantContext>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let payload: VariantPayload = serde_json::from_slice(bytes)?;
    Ok(payload.into_contexts())
}
