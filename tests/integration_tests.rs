//! Integration tests for the vcfrange HTTP service
//!
//! These tests use the fixture in tests/data/

use axum_test::TestServer;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use vcfrange::{
    VariantDataSource,
    handlers::{AppState, create_router},
    storage::LocalStorage,
    types::SourceInfo,
};

fn test_vcf() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/snv.vcf")
}

fn vcf_state(path: PathBuf) -> AppState {
    let location = path.display().to_string();
    let source = VariantDataSource::from_storage(Arc::new(LocalStorage::new(path))).unwrap();
    AppState {
        source,
        info: SourceInfo {
            kind: "vcf",
            location,
            max_range_width: 1_000_000,
        },
    }
}

fn create_test_server() -> TestServer {
    TestServer::new(create_router(vcf_state(test_vcf()))).unwrap()
}

#[tokio::test]
async fn test_service_info() {
    let server = create_test_server();

    let response = server.get("/service-info").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["name"], "vcfrange");
    assert_eq!(body["source"]["kind"], "vcf");
    assert_eq!(body["source"]["maxRangeWidth"], 1_000_000);
}

#[tokio::test]
async fn test_variants_endpoint() {
    let server = create_test_server();

    let response = server
        .get("/variants?referenceName=20&start=63799&end=69094")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let variants = body["variants"].as_object().unwrap();
    assert_eq!(variants.len(), 6);

    let first = &variants["20:63799:C>T"];
    assert_eq!(first["referenceName"], "20");
    assert_eq!(first["start"], 63799);
    assert_eq!(first["referenceBases"], "C");
    assert_eq!(first["alternateBases"][0], "T");
    assert_eq!(first["id"], "rs6054257");
    assert_eq!(first["calls"][0]["callSetName"], "NORMAL");
    assert_eq!(first["calls"][0]["genotype"], serde_json::json!([0, 1]));
    assert!(first["record"].as_str().unwrap().starts_with("20\t63800\t"));
}

#[tokio::test]
async fn test_variants_endpoint_empty_region() {
    let server = create_test_server();

    let response = server.get("/variants?referenceName=X&start=0&end=1000").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["variants"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn test_callsets_endpoint() {
    let server = create_test_server();

    let response = server.get("/callsets").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["callSetNames"], serde_json::json!(["NORMAL", "TUMOR"]));
}

#[tokio::test]
async fn test_variants_endpoint_requires_end() {
    let server = create_test_server();

    let response = server.get("/variants?referenceName=20&start=0").await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "InvalidRange");
}

#[tokio::test]
async fn test_variants_endpoint_rejects_wide_range() {
    let server = create_test_server();

    let response = server
        .get("/variants?referenceName=20&start=0&end=5000000")
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_variants_endpoint_unreadable_source() {
    let server = TestServer::new(create_router(vcf_state(PathBuf::from("/nonexistent.vcf")))).unwrap();

    let response = server.get("/variants?referenceName=20&start=0&end=10").await;
    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert_eq!(body["error"]["type"], "FetchFailed");
}

#[tokio::test]
async fn test_json_source_server() {
    let json = r#"{"variants": {"a": {
        "referenceName": "17", "start": 100, "referenceBases": "A",
        "alternateBases": ["G"],
        "calls": [{"callSetName": "s1", "genotype": [1, 1]}]
    }}}"#;
    let state = AppState {
        source: VariantDataSource::from_json(json).unwrap(),
        info: SourceInfo {
            kind: "json",
            location: "inline".to_string(),
            max_range_width: 1_000_000,
        },
    };
    let server = TestServer::new(create_router(state)).unwrap();

    let body: Value = server.get("/variants?referenceName=17&start=0&end=1000").await.json();
    assert_eq!(body["variants"].as_object().unwrap().len(), 1);

    let body: Value = server.get("/callsets").await.json();
    assert_eq!(body["callSetNames"], serde_json::json!(["s1"]));
}

#[cfg(feature = "http")]
#[tokio::test]
async fn test_http_storage_against_live_server() {
    use std::time::Duration;
    use vcfrange::ContigInterval;
    use vcfrange::storage::HttpStorage;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(vcf_state(test_vcf()));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let storage = HttpStorage::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let source = VariantDataSource::from_storage(Arc::new(storage)).unwrap();

    assert_eq!(source.call_names().await, vec!["NORMAL", "TUMOR"]);

    let range = ContigInterval::new("20", 63799, 69094).unwrap();
    assert!(source.load_range(&range).await);

    let contexts = source.genotypes_in_range(Some(&range));
    assert_eq!(contexts.len(), 6);
    assert_eq!(contexts[0].variant.position, 63799);
    assert_eq!(contexts[0].calls[0].call_set_name, "NORMAL");
    assert_eq!(contexts[0].calls[0].genotype, vec![0, 1]);
    assert!(contexts[0].variant.raw.starts_with("20\t63800\t"));
}

/// Fixture storage that knows no sample names until records are loaded.
#[cfg(feature = "http")]
struct HeaderlessStorage(LocalStorage);

#[cfg(feature = "http")]
#[async_trait::async_trait]
impl vcfrange::storage::Storage for HeaderlessStorage {
    async fn fetch(
        &self,
        range: &vcfrange::ContigInterval,
    ) -> vcfrange::Result<Vec<vcfrange::VariantContext>> {
        vcfrange::storage::Storage::fetch(&self.0, range).await
    }
}

#[cfg(feature = "http")]
#[tokio::test]
async fn test_chained_server_without_header_names() {
    use std::time::Duration;
    use vcfrange::ContigInterval;
    use vcfrange::storage::{HttpStorage, Storage};

    let upstream = VariantDataSource::from_storage(Arc::new(HeaderlessStorage(
        LocalStorage::new(test_vcf()),
    )))
    .unwrap();
    let app = create_router(AppState {
        source: upstream,
        info: SourceInfo {
            kind: "vcf",
            location: test_vcf().display().to_string(),
            max_range_width: 1_000_000,
        },
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let storage = HttpStorage::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    // upstream has nothing loaded, so it reports no call sets yet
    assert_eq!(storage.sample_names().await.unwrap(), None);

    let source = VariantDataSource::from_storage(Arc::new(storage)).unwrap();
    assert!(source.call_names().await.is_empty());

    let range = ContigInterval::new("20", 63799, 69094).unwrap();
    assert!(source.load_range(&range).await);
    assert_eq!(source.variants_in_range(Some(&range)).len(), 6);
    assert_eq!(source.call_names().await, vec!["NORMAL", "TUMOR"]);
}
