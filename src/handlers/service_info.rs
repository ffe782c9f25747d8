use super::AppState;
use crate::types::{Organization, ServiceInfo, ServiceType};
use axum::{Json, extract::State};

pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        id: "org.example.vcfrange".to_string(),
        name: "vcfrange".to_string(),
        r#type: ServiceType {
            group: "org.ga4gh".to_string(),
            artifact: "variants".to_string(),
            version: "0.6.0".to_string(),
        },
        description: Some("Range-keyed variant and genotype service".to_string()),
        organization: Organization {
            name: "Example Organization".to_string(),
            url: "https://example.org".to_string(),
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        source: state.info.clone(),
    })
}
