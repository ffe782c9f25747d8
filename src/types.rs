use serde::{Deserialize, Serialize};

/// Query parameters for `GET /variants`
#[derive(Debug, Deserialize, Default)]
pub struct VariantsQuery {
    #[serde(rename = "referenceName")]
    pub reference_name: Option<String>,
    pub start: Option<u64>,
    pub end: Option<u64>,
}

/// Body of `GET /callsets`
#[derive(Debug, Serialize, Deserialize)]
pub struct CallSetsResponse {
    #[serde(rename = "callSetNames")]
    pub call_set_names: Vec<String>,
}

/// Service info response (GA4GH service-info)
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    pub r#type: ServiceType,
    pub description: Option<String>,
    pub organization: Organization,
    pub version: String,
    pub source: SourceInfo,
}

#[derive(Debug, Serialize)]
pub struct ServiceType {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct Organization {
    pub name: String,
    pub url: String,
}

/// What the served data source is backed by.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub kind: &'static str,
    pub location: String,
    #[serde(rename = "maxRangeWidth")]
    pub max_range_width: u64,
}
