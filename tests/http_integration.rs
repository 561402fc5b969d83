//! Integration tests for the GCP client and the export pipeline using wiremock
//!
//! The real `GcpClient` talks to a mock server through the `api_endpoint`
//! override, so requests, pagination and error handling go over HTTP exactly
//! as they would against Google.

use gcp2tf::config::PipelineSettings;
use gcp2tf::gcp::auth::GcpCredentials;
use gcp2tf::gcp::client::{Endpoints, GcpClient};
use gcp2tf::pipeline::pager::PageIterator;
use gcp2tf::resource::get_resource;
use gcp2tf::{ExportError, ItemsPath, ListRequest, PipelineContext, Provider, ProviderError, Scope};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{bearer_token, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT: &str = "proj-123456";

fn client(server: &MockServer, token: &str) -> GcpClient {
    GcpClient::new(
        GcpCredentials::from_token(token).unwrap(),
        Endpoints::single(&server.uri()).unwrap(),
    )
    .unwrap()
}

fn scope() -> Scope {
    Scope::new(PROJECT, "us-central1", "us-central1-a")
}

/// Generated text with all whitespace removed, so layout choices of the
/// formatter do not matter
fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn networks_request(page_size: u32) -> ListRequest {
    get_resource("network-networks")
        .unwrap()
        .list_request(&scope(), page_size)
        .unwrap()
}

/// Test module for raw client behavior
mod client_tests {
    use super::*;

    /// Test successful list call sends auth and page size and parses items
    #[tokio::test]
    async fn test_list_sends_token_and_page_size() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/compute/v1/projects/proj-123456/global/networks"))
            .and(query_param("maxResults", "25"))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "default"}, {"name": "prod"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client(&server, "test-token")
            .list(&networks_request(25), None)
            .await
            .expect("list should succeed");

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0]["name"], "default");
        assert!(page.next_token.is_none());
    }

    /// Test wrong token never matches the authenticated mock
    #[tokio::test]
    async fn test_wrong_token_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(bearer_token("right-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": 401, "message": "Invalid credentials"}
            })))
            .with_priority(10)
            .mount(&server)
            .await;

        let err = client(&server, "wrong-token")
            .list(&networks_request(10), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Status { status: 401, .. }));
        assert!(err.user_message().contains("Authentication failed"));
    }

    /// Test 403 maps to a permission hint without leaking the body
    #[tokio::test]
    async fn test_403_hint_hides_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "secret internal detail"}
            })))
            .mount(&server)
            .await;

        let err = client(&server, "t")
            .list(&networks_request(10), None)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Status { status: 403, .. }));
        assert!(!err.is_transient());
        assert!(err.user_message().contains("Permission denied"));
        assert!(!err.user_message().contains("secret"));
        assert!(!err.to_string().contains("secret"));
    }

    /// Test 503 is reported as transient
    #[tokio::test]
    async fn test_503_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client(&server, "t")
            .list(&networks_request(10), None)
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    /// Test malformed JSON is a decode error
    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
            .mount(&server)
            .await;

        let err = client(&server, "t")
            .list(&networks_request(10), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    /// Test aggregated responses are flattened in sorted scope order
    #[tokio::test]
    async fn test_aggregated_response_is_flattened() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/compute/v1/projects/proj-123456/aggregated/instances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": {
                    "zones/us-east1-b": {"instances": [{"name": "east"}]},
                    "zones/asia-east1-a": {"warning": {"code": "NO_RESULTS_ON_PAGE"}},
                    "zones/us-central1-a": {"instances": [{"name": "central-1"}, {"name": "central-2"}]}
                }
            })))
            .mount(&server)
            .await;

        let request = get_resource("compute-instances")
            .unwrap()
            .list_request(&scope(), 500)
            .unwrap();
        assert_eq!(request.items, ItemsPath::Aggregated("instances".to_string()));

        let page = client(&server, "t").list(&request, None).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|i| i["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["central-1", "central-2", "east"]);
    }
}

/// Test module for pagination over HTTP
mod pagination_tests {
    use super::*;

    /// Test the page iterator follows pageToken until it is absent
    #[tokio::test]
    async fn test_follows_page_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("pageToken", "t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "c"}],
                "nextPageToken": "t2"
            })))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("pageToken", "t2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "d"}],
                "nextPageToken": ""
            })))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "a"}, {"name": "b"}],
                "nextPageToken": "t1"
            })))
            .with_priority(5)
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server, "t");
        let request = networks_request(2);
        let items = PageIterator::new(&client, &request).fetch_all().await.unwrap();

        let names: Vec<_> = items.iter().map(|i| i["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    /// Test a token returned twice stops with a stale pagination error
    #[tokio::test]
    async fn test_repeated_token_is_detected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "loop"}],
                "nextPageToken": "same"
            })))
            .mount(&server)
            .await;

        let client = client(&server, "t");
        let request = networks_request(1);
        let err = PageIterator::new(&client, &request).fetch_all().await.unwrap_err();

        assert!(matches!(err, ExportError::StalePagination { page: 2, .. }));
    }
}

/// Test module for full exports
mod export_tests {
    use super::*;

    fn context(server: &MockServer, scope: Scope) -> PipelineContext<GcpClient> {
        PipelineContext::new(
            Arc::new(client(server, "t")),
            scope,
            PipelineSettings::new(3, 100).unwrap(),
        )
        .unwrap()
    }

    /// Test firewalls export end to end and write the result to a file
    #[tokio::test]
    async fn test_firewalls_export_to_file() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/compute/v1/projects/proj-123456/global/firewalls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "name": "allow-ssh",
                    "network": "https://www.googleapis.com/compute/v1/projects/proj-123456/global/networks/default",
                    "direction": "INGRESS",
                    "priority": 1000,
                    "description": "",
                    "sourceRanges": ["0.0.0.0/0"],
                    "targetTags": ["ssh"],
                    "allowed": [{"IPProtocol": "tcp", "ports": ["22"]}]
                }]
            })))
            .mount(&server)
            .await;

        let report = context(&server, scope())
            .export(get_resource("network-firewalls").unwrap())
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("firewalls.tf");
        std::fs::write(&out, &report.text).unwrap();
        let written = std::fs::read_to_string(&out).unwrap();
        let flat = written.split_whitespace().collect::<Vec<_>>().join(" ");

        assert!(flat.contains("resource \"google_compute_firewall\" \"allow-ssh\" {"));
        assert!(flat.contains("network = \"default\""));
        assert!(flat.contains("description = \"\""));
        assert!(flat.contains("priority = 1000"));
        assert!(flat.contains("protocol = \"tcp\""));
        assert!(squash(&written).contains("ports=[\"22\""));
        assert!(!flat.contains("destination_ranges"));
        assert_eq!(
            report.imports,
            vec!["terraform import google_compute_firewall.allow-ssh projects/proj-123456/global/firewalls/allow-ssh"]
        );
    }

    /// Test custom roles are enriched, and a failed describe only drops that role
    #[tokio::test]
    async fn test_roles_enrichment_isolates_failures() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/projects/proj-123456/roles"))
            .and(query_param("pageSize", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "roles": [
                    {"name": "projects/proj-123456/roles/auditor", "title": "Auditor", "stage": "GA"},
                    {"name": "projects/proj-123456/roles/flaky", "title": "Flaky"}
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/projects/proj-123456/roles/auditor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/proj-123456/roles/auditor",
                "includedPermissions": ["logging.logs.list", "compute.instances.list"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/projects/proj-123456/roles/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let report = context(&server, scope())
            .export(get_resource("iam-roles").unwrap())
            .await
            .unwrap();

        assert_eq!(report.rendered, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key, "projects/proj-123456/roles/flaky");

        let flat = report.text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(flat.contains("role_id = \"auditor\""));
        assert!(squash(&report.text)
            .contains("permissions=[\"compute.instances.list\",\"logging.logs.list\""));
        assert!(!flat.contains("Flaky"));
    }

    /// Test buckets carry their IAM bindings
    #[tokio::test]
    async fn test_buckets_include_iam_bindings() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/b"))
            .and(query_param("project", PROJECT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "name": "assets-bucket",
                    "location": "US",
                    "storageClass": "STANDARD",
                    "labels": {"team": "web", "env": "prod"},
                    "versioning": {"enabled": true}
                }]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/b/assets-bucket/iam"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bindings": [{
                    "role": "roles/storage.objectViewer",
                    "members": ["allUsers"]
                }]
            })))
            .mount(&server)
            .await;

        let report = context(&server, scope())
            .export(get_resource("storage-buckets").unwrap())
            .await
            .unwrap();

        assert!(report.failures.is_empty());
        let flat = report.text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(flat.contains("resource \"google_storage_bucket\" \"assets-bucket\""));
        assert!(flat.contains(
            "resource \"google_storage_bucket_iam_binding\" \"assets-bucket-roles-storage-objectViewer\""
        ));
        assert!(squash(&report.text).contains("members=[\"allUsers\""));
        assert!(flat.find("env").unwrap() < flat.find("team").unwrap());
    }

    /// Test instances sharing a name in different zones get distinct labels
    #[tokio::test]
    async fn test_same_name_in_two_zones() {
        let server = MockServer::start().await;

        let instance = |zone: &str| {
            json!({
                "name": "web",
                "zone": format!("https://www.googleapis.com/compute/v1/projects/proj-123456/zones/{zone}"),
                "machineType": format!("https://www.googleapis.com/compute/v1/projects/proj-123456/zones/{zone}/machineTypes/e2-small"),
                "status": "RUNNING"
            })
        };

        Mock::given(method("GET"))
            .and(path("/compute/v1/projects/proj-123456/aggregated/instances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": {
                    "zones/us-central1-a": {"instances": [instance("us-central1-a")]},
                    "zones/europe-west1-b": {"instances": [instance("europe-west1-b")]}
                }
            })))
            .mount(&server)
            .await;

        let report = context(&server, scope())
            .export(get_resource("compute-instances").unwrap())
            .await
            .unwrap();

        let flat = report.text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(flat.matches("resource \"google_compute_instance\"").count(), 2);
        assert!(flat.contains("resource \"google_compute_instance\" \"europe-west1-b-web\""));
        assert!(flat.contains("resource \"google_compute_instance\" \"us-central1-a-web\""));
        assert!(!flat.contains("\"web\" {"));
        assert_eq!(
            report.imports,
            vec![
                "terraform import google_compute_instance.europe-west1-b-web projects/proj-123456/zones/europe-west1-b/instances/web",
                "terraform import google_compute_instance.us-central1-a-web projects/proj-123456/zones/us-central1-a/instances/web",
            ]
        );
    }

    /// Test bucket names that sanitize to the same label, and conditional
    /// bindings sharing a role, stay unique
    #[tokio::test]
    async fn test_bucket_labels_stay_unique() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "my.bucket"}, {"name": "my-bucket"}]
            })))
            .mount(&server)
            .await;

        let conditional = |title: &str| {
            json!({
                "role": "roles/storage.admin",
                "members": ["group:ops@example.com"],
                "condition": {"title": title, "expression": "request.time < timestamp(\"2030-01-01T00:00:00Z\")"}
            })
        };
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/my.bucket/iam"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bindings": [conditional("until-2030"), conditional("also-until-2030")]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/my-bucket/iam"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bindings": [{"role": "roles/storage.admin", "members": ["allUsers"]}]
            })))
            .mount(&server)
            .await;

        let report = context(&server, scope())
            .export(get_resource("storage-buckets").unwrap())
            .await
            .unwrap();

        assert!(report.failures.is_empty());
        let flat = report.text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(flat.matches("\"google_storage_bucket\" \"my-bucket\" {").count(), 1);
        assert!(flat.contains("\"google_storage_bucket\" \"my-bucket-2\" {"));
        assert_eq!(
            flat.matches("\"google_storage_bucket_iam_binding\" \"my-bucket-roles-storage-admin\" {").count(),
            1
        );
        assert!(flat.contains("\"google_storage_bucket_iam_binding\" \"my-bucket-roles-storage-admin-2\" {"));
        assert!(flat.contains("\"google_storage_bucket_iam_binding\" \"my-bucket-2-roles-storage-admin\" {"));
        assert!(squash(&report.text).contains("bucket=google_storage_bucket.my-bucket-2.name"));
        assert!(squash(&report.text).contains("title=\"also-until-2030\""));
        assert_eq!(
            report.imports,
            vec![
                "terraform import google_storage_bucket.my-bucket proj-123456/my.bucket",
                "terraform import google_storage_bucket.my-bucket-2 proj-123456/my-bucket",
            ]
        );
    }

    /// Test lifecycle, CORS, logging, encryption and soft delete settings come
    /// straight from the listing
    #[tokio::test]
    async fn test_bucket_settings_blocks() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/b"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "name": "assets",
                    "location": "EU",
                    "lifecycle": {"rule": [
                        {
                            "action": {"type": "SetStorageClass", "storageClass": "NEARLINE"},
                            "condition": {"age": 30, "matchesStorageClass": ["STANDARD"]}
                        },
                        {
                            "action": {"type": "Delete"},
                            "condition": {"numNewerVersions": 3, "isLive": false}
                        }
                    ]},
                    "cors": [{
                        "origin": ["https://example.com"],
                        "method": ["GET", "HEAD"],
                        "responseHeader": ["Content-Type"],
                        "maxAgeSeconds": 3600
                    }],
                    "logging": {"logBucket": "audit-logs", "logObjectPrefix": "assets"},
                    "encryption": {"defaultKmsKeyName": "projects/p/locations/eu/keyRings/r/cryptoKeys/k"},
                    "softDeletePolicy": {"retentionDurationSeconds": "604800"}
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/storage/v1/b/assets/iam"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let report = context(&server, scope())
            .export(get_resource("storage-buckets").unwrap())
            .await
            .unwrap();

        let flat = report.text.split_whitespace().collect::<Vec<_>>().join(" ");
        let squashed = squash(&report.text);
        assert_eq!(flat.matches("lifecycle_rule {").count(), 2);
        assert!(squashed.contains("type=\"SetStorageClass\""));
        assert!(squashed.contains("storage_class=\"NEARLINE\""));
        assert!(squashed.contains("age=30"));
        assert!(squashed.contains("matches_storage_class=[\"STANDARD\""));
        assert!(squashed.contains("type=\"Delete\""));
        assert!(squashed.contains("num_newer_versions=3"));
        assert!(squashed.contains("with_state=\"ARCHIVED\""));
        assert!(squashed.contains("origin=[\"https://example.com\""));
        assert!(squashed.contains("max_age_seconds=3600"));
        assert!(squashed.contains("log_bucket=\"audit-logs\""));
        assert!(squashed.contains("log_object_prefix=\"assets\""));
        assert!(squashed
            .contains("default_kms_key_name=\"projects/p/locations/eu/keyRings/r/cryptoKeys/k\""));
        assert!(squashed.contains("retention_duration_seconds=604800"));
        assert!(!flat.contains("google_storage_bucket_iam_binding"));
        assert!(!flat.contains("website"));
    }

    /// Test instance templates export with disks and scheduling
    #[tokio::test]
    async fn test_instance_templates_export() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/compute/v1/projects/proj-123456/global/instanceTemplates"))
            .and(query_param("maxResults", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "name": "web-template",
                    "description": "web tier",
                    "properties": {
                        "machineType": "e2-medium",
                        "tags": {"items": ["http"]},
                        "disks": [{
                            "boot": true,
                            "autoDelete": true,
                            "initializeParams": {
                                "sourceImage": "projects/debian-cloud/global/images/family/debian-12",
                                "diskSizeGb": "20",
                                "diskType": "pd-balanced"
                            }
                        }],
                        "networkInterfaces": [{
                            "network": "https://www.googleapis.com/compute/v1/projects/proj-123456/global/networks/default",
                            "accessConfigs": [{"type": "ONE_TO_ONE_NAT"}]
                        }],
                        "scheduling": {"automaticRestart": true, "onHostMaintenance": "MIGRATE"}
                    }
                }]
            })))
            .mount(&server)
            .await;

        let report = context(&server, scope())
            .export(get_resource("autoscaling-instance-templates").unwrap())
            .await
            .unwrap();

        let flat = report.text.split_whitespace().collect::<Vec<_>>().join(" ");
        let squashed = squash(&report.text);
        assert!(flat.contains("resource \"google_compute_instance_template\" \"web-template\" {"));
        assert!(squashed.contains("machine_type=\"e2-medium\""));
        assert!(squashed.contains("tags=[\"http\""));
        assert!(squashed.contains("boot=true"));
        assert!(squashed.contains("auto_delete=true"));
        assert!(squashed.contains("source_image=\"projects/debian-cloud/global/images/family/debian-12\""));
        assert!(squashed.contains("disk_size_gb=20"));
        assert!(squashed.contains("disk_type=\"pd-balanced\""));
        assert!(squashed.contains("network=\"default\""));
        assert!(squashed.contains("access_config{"));
        assert!(squashed.contains("automatic_restart=true"));
        assert!(squashed.contains("on_host_maintenance=\"MIGRATE\""));
        assert!(!flat.contains("preemptible"));
        assert_eq!(
            report.imports,
            vec!["terraform import google_compute_instance_template.web-template projects/proj-123456/global/instanceTemplates/web-template"]
        );
    }

    /// Test record sets use the managed zone parameter and skip SOA
    #[tokio::test]
    async fn test_record_sets_with_managed_zone() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/dns/v1/projects/proj-123456/managedZones/example-zone/rrsets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rrsets": [
                    {"name": "example.com.", "type": "SOA", "ttl": 21600, "rrdatas": ["ns1. admin. 1 2 3 4 5"]},
                    {"name": "example.com.", "type": "TXT", "ttl": 300, "rrdatas": ["\"v=spf1 -all\""]}
                ]
            })))
            .mount(&server)
            .await;

        let report = context(&server, scope().with_param("managed_zone", "example-zone"))
            .export(get_resource("dns-record-sets").unwrap())
            .await
            .unwrap();

        assert_eq!(report.excluded, 1);
        assert_eq!(report.rendered, 1);
        assert!(report.text.contains("example-zone"));
        assert!(report.text.contains(r#"\"v=spf1 -all\""#));
        assert_eq!(
            report.imports,
            vec!["terraform import google_dns_record_set.example-com--TXT projects/proj-123456/managedZones/example-zone/rrsets/example.com./TXT"]
        );
    }

    /// Test a listing failure is fatal and produces no report
    #[tokio::test]
    async fn test_listing_failure_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = context(&server, scope())
            .export(get_resource("dns-zones").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, ExportError::Fetch { .. }));
        assert!(err.hint().unwrap().contains("Permission denied"));
    }
}
