//! Integration tests for the typed query helpers against a mock query API

use super::test_utils::harness;
use partner_link::{ApiError, BusinessPartnerFilter};
use serde_json::json;
use wiremock::{
    matchers::{body_string_contains, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

#[tokio::test]
async fn test_fetch_udf_meta_returns_records_unchanged() {
    let server = MockServer::start().await;
    let h = harness(&server);

    Mock::given(method("POST"))
        .and(path("/api/query/v1"))
        .and(query_param("account", "acme"))
        .and(query_param("company", "acme-pl"))
        .and(query_param("dtos", "UdfMeta.19;UdoMeta.9"))
        .and(header("authorization", "Bearer token-1"))
        .and(header("x-client-id", "fsm-ext-demo-uf4jra"))
        .and(header("x-client-version", "1.0.0"))
        .and(body_string_contains("WHERE udo_meta.name = 'Cennik_part'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "1", "udoMetaId": "2", "name": "price", "description": "Price" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fields = h.client.fetch_udf_meta("Cennik_part").await.unwrap();

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].id, "1");
    assert_eq!(fields[0].udo_meta_id, "2");
    assert_eq!(fields[0].name, "price");
    assert_eq!(fields[0].description.as_deref(), Some("Price"));
}

#[tokio::test]
async fn test_non_success_status_fails_the_fetch() {
    let server = MockServer::start().await;
    let h = harness(&server);

    Mock::given(method("POST"))
        .and(path("/api/query/v1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let err = h.client.fetch_udf_meta("Cennik_part").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::FetchFailed {
            resource: "UdfMeta",
            status: 500
        }
    ));
    assert_eq!(err.to_string(), "Failed to fetch UdfMeta, got status 500");

    let err = h
        .client
        .fetch_business_partners(&BusinessPartnerFilter::all())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::FetchFailed { status: 500, .. }));
}

#[tokio::test]
async fn test_fetch_udf_meta_by_field_names_uses_in_list() {
    let server = MockServer::start().await;
    let h = harness(&server);

    Mock::given(method("POST"))
        .and(path("/api/query/v1"))
        .and(query_param("dtos", "UdfMeta.19"))
        .and(body_string_contains("WHERE udf_meta.name IN ('z_price','z_unit')"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "10", "name": "z_price", "description": "Price" },
                { "id": "11", "name": "z_unit", "description": null }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fields = h
        .client
        .fetch_udf_meta_by_field_names(&["z_price", "z_unit"])
        .await
        .unwrap();

    assert_eq!(fields.len(), 2);
    assert_eq!(fields[1].name, "z_unit");
    assert_eq!(fields[1].description, None);
}

#[tokio::test]
async fn test_business_partner_filters_shape_the_query() {
    let server = MockServer::start().await;
    let h = harness(&server);

    Mock::given(method("POST"))
        .and(path("/api/query/v1"))
        .and(query_param("dtos", "BusinessPartner.23;Person.24"))
        .and(body_string_contains(
            "JOIN Person p ON bp.id = p.businessPartner WHERE p.id = 'P1' AND bp.crowdType = 'PARTNER'",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "BP1", "name": "Acme Services" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/query/v1"))
        .and(body_string_contains("FROM BusinessPartner bp WHERE bp.crowdType = 'PARTNER'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "BP2", "name": "Globex" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let linked = h
        .client
        .fetch_business_partners(&BusinessPartnerFilter::all().person("P1").crowd_type("PARTNER"))
        .await
        .unwrap();
    assert_eq!(linked[0].id, "BP1");

    let by_crowd = h
        .client
        .fetch_business_partners(&BusinessPartnerFilter::all().crowd_type("PARTNER"))
        .await
        .unwrap();
    assert_eq!(by_crowd[0].id, "BP2");
}

#[tokio::test]
async fn test_business_partner_map_keeps_last_duplicate() {
    let server = MockServer::start().await;
    let h = harness(&server);

    Mock::given(method("POST"))
        .and(path("/api/query/v1"))
        .and(body_string_contains("FROM BusinessPartner bp\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "1", "name": "Acme" },
                { "id": "2", "name": "Globex" },
                { "id": "3", "name": "Acme" }
            ]
        })))
        .mount(&server)
        .await;

    let map = h.client.fetch_business_partner_map().await.unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["Acme"], "3");
    assert_eq!(map["Globex"], "2");
}

#[tokio::test]
async fn test_person_is_fetched_once_per_id() {
    let server = MockServer::start().await;
    let h = harness(&server);

    for (id, first_name) in [("P1", "Jan"), ("P2", "Anna")] {
        Mock::given(method("POST"))
            .and(path("/api/query/v1"))
            .and(query_param("dtos", "Person.24"))
            .and(body_string_contains(format!("WHERE p.id = '{}'", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": id,
                    "crowdType": "PARTNER",
                    "firstName": first_name,
                    "lastName": "Kowalski"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let first = h.client.fetch_person("P1").await.unwrap();
    let again = h.client.fetch_person("P1").await.unwrap();
    let other = h.client.fetch_person("P2").await.unwrap();

    assert_eq!(first, again);
    assert_eq!(first.first_name.as_deref(), Some("Jan"));
    assert_eq!(other.first_name.as_deref(), Some("Anna"));
    assert_eq!(h.client.cached_person_count(), 2);
}

#[tokio::test]
async fn test_missing_person_is_an_error_and_not_cached() {
    let server = MockServer::start().await;
    let h = harness(&server);

    Mock::given(method("POST"))
        .and(path("/api/query/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(2)
        .mount(&server)
        .await;

    for _ in 0..2 {
        let err = h.client.fetch_person("GHOST").await.unwrap_err();
        assert!(matches!(err, ApiError::PersonNotFound(ref id) if id == "GHOST"));
    }
    assert_eq!(h.client.cached_person_count(), 0);
}

#[tokio::test]
async fn test_quoted_input_never_reaches_the_server() {
    let server = MockServer::start().await;
    let h = harness(&server);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let err = h
        .client
        .fetch_udf_meta("Cennik' OR '1'='1")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidQueryValue { .. }));
}

#[tokio::test]
async fn test_success_without_data_is_a_decode_error() {
    let server = MockServer::start().await;
    let h = harness(&server);

    Mock::given(method("POST"))
        .and(path("/api/query/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let err = h.client.fetch_business_partner_map().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Decode {
            resource: "BusinessPartners",
            ..
        }
    ));

    let err = h.client.fetch_udf_meta("Cennik_part").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { resource: "UdfMeta", .. }));
}
