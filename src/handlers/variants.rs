use super::AppState;
use crate::{
    Error, Result,
    formats::VariantPayload,
    interval::ContigInterval,
    types::VariantsQuery,
};
use axum::{
    Json,
    extract::{Query, State},
};

/// Load the requested range if needed and return every record in it.
pub async fn get_variants(
    State(state): State<AppState>,
    Query(query): Query<VariantsQuery>,
) -> Result<Json<VariantPayload>> {
    let range = parse_range(&query, state.info.max_range_width)?;

    if !state.source.load_range(&range).await {
        return Err(Error::Fetch(format!("could not load {}", range)));
    }

    let contexts = state.source.genotypes_in_range(Some(&range));
    tracing::debug!("{}: serving {} variant(s)", range, contexts.len());
    Ok(Json(VariantPayload::from_contexts(&contexts)))
}

fn parse_range(query: &VariantsQuery, max_width: u64) -> Result<ContigInterval> {
    let contig = query
        .reference_name
        .as_deref()
        .ok_or_else(|| Error::InvalidRange("referenceName is required".to_string()))?;
    let start = query.start.unwrap_or(0);
    let end = query
        .end
        .ok_or_else(|| Error::InvalidRange("end is required".to_string()))?;

    let range = ContigInterval::new(contig, start, end)?;
    if range.len() > max_width {
        return Err(Error::InvalidRange(format!(
            "{} is wider than {} bases",
            range, max_width
        )));
    }
    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(name: Option<&str>, start: Option<u64>, end: Option<u64>) -> VariantsQuery {
        VariantsQuery {
            reference_name: name.map(str::to_string),
            start,
            end,
        }
    }

    #[test]
    fn test_parse_range() {
        let range = parse_range(&query(Some("20"), Some(10), Some(20)), 100).unwrap();
        assert_eq!(range, ContigInterval::new("20", 10, 20).unwrap());

        let from_zero = parse_range(&query(Some("20"), None, Some(5)), 100).unwrap();
        assert_eq!(from_zero.start(), 0);
    }

    #[test]
    fn test_parse_range_errors() {
        for q in [
            query(None, Some(0), Some(10)),
            query(Some("20"), Some(0), None),
            query(Some("20"), Some(10), Some(5)),
            query(Some("20"), Some(0), Some(1_000)),
        ] {
            assert!(matches!(parse_range(&q, 100), Err(Error::InvalidRange(_))));
        }
    }
}
