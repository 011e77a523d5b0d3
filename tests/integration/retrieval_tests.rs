//! Integration tests for the retrieval pipeline
//!
//! These tests use wiremock to stand in for Space-Track and run the whole
//! chain: login, paced queries, retries, and files written to disk.

use chrono::NaiveDate;
use flate2::read::GzDecoder;
use gp_harvest::config::{PayloadFormat, RetrievalConfig, SpaceTrackConfig};
use gp_harvest::retrieval;
use gp_harvest::source::{DateField, IdClass, SatcatSelection};
use gp_harvest::{CatalogRange, FileSink, SpaceTrackClient};
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GP_PAYLOAD: &str = r#"[{"NORAD_CAT_ID":"1","EPOCH":"1958-02-05 00:00:00"}]"#;

fn space_track_config(base_url: &str) -> SpaceTrackConfig {
    SpaceTrackConfig {
        identity: "user@example.com".to_string(),
        password: "secret".to_string(),
        base_url: base_url.to_string(),
        timeout_secs: 5,
        connect_timeout_secs: 2,
    }
}

fn retrieval_config() -> RetrievalConfig {
    RetrievalConfig {
        min_interval_ms: 10, // Very short for testing
        max_retry: 2,
        max_error: 3,
    }
}

fn client(base_url: &str) -> SpaceTrackClient {
    SpaceTrackClient::new(&space_track_config(base_url), PayloadFormat::Json)
        .expect("Failed to create client")
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/ajaxauth/login"))
        .and(body_string_contains("identity=user%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#""""#))
        .mount(server)
        .await;
}

fn read_gz(path: &Path) -> String {
    let mut decoder = GzDecoder::new(std::fs::File::open(path).expect("Failed to open file"));
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .expect("Failed to decompress file");
    content
}

#[tokio::test]
async fn test_id_range_end_to_end() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    for key in ["1--3", "4--5"] {
        Mock::given(method("GET"))
            .and(path(format!(
                "/basicspacedata/query/class/gp_history/NORAD_CAT_ID/{}/orderby/NORAD_CAT_ID,EPOCH/format/json",
                key
            )))
            .respond_with(ResponseTemplate::new(200).set_body_string(GP_PAYLOAD))
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), PayloadFormat::Json);
    let mut harvester = retrieval::harvester(client(&server.uri()), &retrieval_config());

    let summary = harvester
        .run(&CatalogRange::new(1u32, 5), 3, &mut sink)
        .await
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.files_written, 2);
    assert_eq!(summary.bytes_written, 2 * GP_PAYLOAD.len() as u64);
    assert_eq!(read_gz(&dir.path().join("1-3.json.gz")), GP_PAYLOAD);
    assert_eq!(read_gz(&dir.path().join("4-5.json.gz")), GP_PAYLOAD);

    // Login happens once for the whole run
    let logins = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/ajaxauth/login")
        .count();
    assert_eq!(logins, 1);
}

#[tokio::test]
async fn test_tle_class_uncompressed() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/basicspacedata/query/class/tle/NORAD_CAT_ID/25544/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GP_PAYLOAD))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), PayloadFormat::Json).with_compression(false);
    let source = client(&server.uri()).with_id_class(IdClass::Tle);
    let mut harvester = retrieval::harvester(source, &retrieval_config());

    let summary = harvester
        .run(&CatalogRange::single(25544u32), 1, &mut sink)
        .await
        .unwrap();

    assert!(summary.is_success());
    let written = std::fs::read_to_string(dir.path().join("25544.json")).unwrap();
    assert_eq!(written, GP_PAYLOAD);
}

#[tokio::test]
async fn test_http_error_is_not_retried() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/basicspacedata/query/class/gp_history/NORAD_CAT_ID/1/"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/basicspacedata/query/class/gp_history/NORAD_CAT_ID/2/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GP_PAYLOAD))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), PayloadFormat::Json);
    let mut harvester = retrieval::harvester(client(&server.uri()), &retrieval_config());

    let summary = harvester
        .run(&CatalogRange::new(1u32, 2), 1, &mut sink)
        .await
        .unwrap();

    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.files_written, 1);
    assert!(!summary.aborted);
    assert!(!dir.path().join("1.json.gz").exists());
    assert!(dir.path().join("2.json.gz").exists());
}

#[tokio::test]
async fn test_failed_login_counts_as_permanent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ajaxauth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"Login":"Failed"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GP_PAYLOAD))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), PayloadFormat::Json);
    let mut harvester = retrieval::harvester(client(&server.uri()), &retrieval_config());

    let summary = harvester
        .run(&CatalogRange::single(1u32), 1, &mut sink)
        .await
        .unwrap();

    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.files_written, 0);
}

#[tokio::test]
async fn test_empty_response_writes_no_file() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), PayloadFormat::Json);
    let mut harvester = retrieval::harvester(client(&server.uri()), &retrieval_config());

    let summary = harvester
        .run(&CatalogRange::new(90000u32, 90001), 1, &mut sink)
        .await
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.files_written, 0);
    assert_eq!(summary.requests_attempted, 2);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_date_range_queries() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path(
            "/basicspacedata/query/class/gp_history/CREATION_DATE/2021-01-01--2021-01-03/orderby/NORAD_CAT_ID,CREATION_DATE/format/json",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(GP_PAYLOAD))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(
            "/basicspacedata/query/class/gp_history/CREATION_DATE/2021-01-03--2021-01-04/orderby/NORAD_CAT_ID,CREATION_DATE/format/json",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(GP_PAYLOAD))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), PayloadFormat::Json);
    let source = client(&server.uri()).with_date_field(DateField::CreationDate);
    let mut harvester = retrieval::harvester(source, &retrieval_config());
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();

    let summary = harvester
        .run(&CatalogRange::new(start, end), 2, &mut sink)
        .await
        .unwrap();

    assert!(summary.is_success());
    assert!(dir.path().join("20210101-20210102.json.gz").exists());
    assert!(dir.path().join("20210103.json.gz").exists());
}

#[tokio::test]
async fn test_satcat_single_request() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path(
            "/basicspacedata/query/class/satcat/NORAD_CAT_ID/25544,20580/orderby/NORAD_CAT_ID/format/csv",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("NORAD_CAT_ID\n25544\n20580\n"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), PayloadFormat::Csv);
    let source = SpaceTrackClient::new(&space_track_config(&server.uri()), PayloadFormat::Csv).unwrap();
    let mut harvester = retrieval::harvester(source, &retrieval_config());
    let selection = SatcatSelection::from_ids(vec![25544, 20580]);

    let summary = harvester.run_single(&selection, "satcat", &mut sink).await;

    assert!(summary.is_success());
    assert_eq!(
        read_gz(&dir.path().join("satcat.csv.gz")),
        "NORAD_CAT_ID\n25544\n20580\n"
    );
}

#[tokio::test]
async fn test_existing_file_is_kept() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GP_PAYLOAD))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("7.json"), "old").unwrap();
    let mut sink = FileSink::new(dir.path(), PayloadFormat::Json).with_compression(false);
    let mut harvester = retrieval::harvester(client(&server.uri()), &retrieval_config());

    let summary = harvester
        .run(&CatalogRange::single(7u32), 1, &mut sink)
        .await
        .unwrap();

    assert_eq!(summary.error_count, 1);
    assert_eq!(std::fs::read_to_string(dir.path().join("7.json")).unwrap(), "old");
}

#[tokio::test]
async fn test_unreachable_server_is_retried() {
    // Bind then release a port so that connections are refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), PayloadFormat::Json);
    let config = retrieval_config();
    let mut harvester = retrieval::harvester(client(&format!("http://{}", addr)), &config);
    let started = Instant::now();

    let summary = harvester
        .run(&CatalogRange::single(1u32), 1, &mut sink)
        .await
        .unwrap();

    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.files_written, 0);
    // Two backoffs: 20ms then 40ms
    assert!(started.elapsed() >= Duration::from_millis(60));
}
