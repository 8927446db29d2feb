use std::sync::Arc;

use bmx_auth::StaticToken;
use bmx_client::{ApiClient, ClientConfig, ClientError};
use bmx_id::{tagged_ids_to_numbers, Id, TaggedId};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_unlock_url(server.uri());
    ApiClient::new(Arc::new(StaticToken::new("meowmeow")), config).unwrap()
}

fn tenant_node(number: i64, name: &str) -> serde_json::Value {
    json!({
        "id": format!("prod-tenant-{number}"),
        "firstName": name,
        "lastName": "Resident",
        "name": format!("{name} Resident"),
        "pinCode": "1234",
        "unit": {"id": "prod-unit-55", "label": "4B", "floorNumber": 4},
        "building": {"id": "prod-building-9", "guid": "b-9", "name": "Harbor View"}
    })
}

fn access_point_node(number: i64, name: &str) -> serde_json::Value {
    json!({
        "id": format!("prod-access_point-{number}"),
        "name": name,
        "openDuration": 5,
        "online": true
    })
}

fn access_points_page(nodes: Vec<serde_json::Value>, end_cursor: Option<&str>) -> serde_json::Value {
    json!({
        "data": {
            "nodes": [{
                "__typename": "Tenant",
                "id": "prod-tenant-7",
                "accessPoints": {
                    "pageInfo": {"hasNextPage": end_cursor.is_some(), "endCursor": end_cursor},
                    "nodes": nodes
                }
            }]
        }
    })
}

#[tokio::test]
async fn tenants_follows_cursor_until_last_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/denizen/v1/graphql"))
        .and(header("authorization", "Bearer meowmeow"))
        .and(body_partial_json(json!({
            "operationName": "Tenants",
            "variables": {"after": null}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"tenants": {
                "pageInfo": {"hasNextPage": true, "endCursor": "cursor-1"},
                "nodes": [tenant_node(1, "Ada")]
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/denizen/v1/graphql"))
        .and(body_partial_json(json!({
            "operationName": "Tenants",
            "variables": {"after": "cursor-1"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"tenants": {
                "pageInfo": {"hasNextPage": false, "endCursor": "cursor-2"},
                "nodes": [tenant_node(2, "Grace")]
            }}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tenants = client_for(&server).tenants().await.unwrap();

    let ids: Vec<String> = tenants.iter().map(|t| t.id.to_string()).collect();
    assert_eq!(ids, vec!["prod-tenant-1", "prod-tenant-2"]);
    assert_eq!(tenants[1].first_name, "Grace");
    assert_eq!(tenants[0].unit.as_ref().unwrap().label, "4B");
}

#[tokio::test]
async fn tenant_access_points_collects_every_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/denizen/v1/graphql"))
        .and(body_partial_json(json!({
            "operationName": "TenantAccessPoints",
            "variables": {"ids": ["prod-tenant-7"], "after": null}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(access_points_page(
            vec![access_point_node(53449, "Lobby")],
            Some("ap-1"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/denizen/v1/graphql"))
        .and(body_partial_json(json!({
            "operationName": "TenantAccessPoints",
            "variables": {"ids": ["prod-tenant-7"], "after": "ap-1"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(access_points_page(
            vec![access_point_node(53450, "Garage")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let tenant = TaggedId::new("tenant", Id::new(7));
    let access_points = client_for(&server)
        .tenant_access_points(&tenant)
        .await
        .unwrap();

    assert_eq!(access_points.len(), 2);
    assert_eq!(access_points[0].name, "Lobby");
    assert_eq!(access_points[0].open_duration, 5);
    assert!(access_points[1].online);

    let tagged: Vec<TaggedId> = access_points.into_iter().map(|ap| ap.id).collect();
    assert_eq!(
        tagged_ids_to_numbers(&tagged),
        vec![Id::new(53449), Id::new(53450)]
    );
}

#[tokio::test]
async fn tenant_access_points_without_node_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/denizen/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"nodes": [null]}})))
        .expect(1)
        .mount(&server)
        .await;

    let tenant = TaggedId::new("tenant", Id::new(7));
    let access_points = client_for(&server)
        .tenant_access_points(&tenant)
        .await
        .unwrap();
    assert!(access_points.is_empty());
}

#[tokio::test]
async fn tenant_access_points_rejects_several_tenants() {
    let server = MockServer::start().await;

    let connection = json!({
        "pageInfo": {"hasNextPage": false, "endCursor": null},
        "nodes": []
    });
    Mock::given(method("POST"))
        .and(path("/denizen/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"nodes": [
                {"__typename": "Tenant", "id": "prod-tenant-7", "accessPoints": connection},
                {"__typename": "Tenant", "id": "prod-tenant-8", "accessPoints": connection}
            ]}
        })))
        .mount(&server)
        .await;

    let tenant = TaggedId::new("tenant", Id::new(7));
    let err = client_for(&server)
        .tenant_access_points(&tenant)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedResponse(_)));
    assert!(err.to_string().contains("2 tenants returned"));
}

#[tokio::test]
async fn graphql_errors_fail_the_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/denizen/v1/graphql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{"message": "not allowed"}, {"message": "try later"}]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).tenants().await.unwrap_err();
    match err {
        ClientError::GraphQl(message) => assert_eq!(message, "not allowed; try later"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn graphql_unauthorized_maps_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/denizen/v1/graphql"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).tenants().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
}

#[tokio::test]
async fn unlock_door_posts_tagged_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/access-point"))
        .and(header("authorization", "Bearer meowmeow"))
        .and(body_json(json!({
            "accessPointId": "prod-access_point-53449",
            "source": "mobile_app",
            "tenantId": "prod-tenant-7648837"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .unlock_door(Id::new(7648837), Id::new(53449))
        .await
        .unwrap();
}

#[tokio::test]
async fn unlock_door_surfaces_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/access-point"))
        .respond_with(ResponseTemplate::new(403).set_body_string("door offline"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .unlock_door(Id::new(1), Id::new(2))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(err.to_string().contains("door offline"));
}
