//! HTTP client for the access API.

use std::sync::Arc;

use async_trait::async_trait;
use bmx_auth::{CachedTokenProvider, TokenProvider};
use bmx_compound::{
    accumulate_pages, assemble, ObjectType, Page, PageSource, PaginatedDocument, RawReference,
    ResultWithReferences, ResultsWithReferences, SingleDocument,
};
use bmx_id::{Id, TaggedId};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::{ClientConfig, PAGE_SIZE};
use crate::error::ClientError;
use crate::graphql::{
    GraphQlRequest, GraphQlResponse, PageInfo, TenantAccessPointsData,
    TenantAccessPointsVariables, TenantNode, TenantsData, TenantsVariables, GRAPHQL_PATH,
    TENANTS_OPERATION, TENANTS_QUERY, TENANT_ACCESS_POINTS_OPERATION, TENANT_ACCESS_POINTS_QUERY,
};
use crate::models::{
    AccessCodeStatus, AccessPoint, CustomKeychainArgs, Keychain, KeychainKind, Tenant,
    VirtualKey, VirtualKeyArgs, TAGGED_ACCESS_POINT, TAGGED_TENANT, TYPE_ACCESS_POINT,
    TYPE_KEYCHAIN, TYPE_TENANT, TYPE_VIRTUAL_KEY,
};

/// Relationships side-loaded with the keychain list.
const KEYCHAINS_INCLUDE: &str = "virtual_keys.door_releases.panel,devices";

/// Path of the access point endpoint on the unlock service.
const UNLOCK_PATH: &str = "/v1/access-point";

/// Unlock requests identify themselves as coming from the mobile app.
const UNLOCK_SOURCE: &str = "mobile_app";

/// API client for the access endpoints.
///
/// Every request is stamped with a token from a [`CachedTokenProvider`].
/// A 401 surfaces as [`ClientError::Unauthorized`]; call
/// [`ApiClient::renew_token`] before retrying.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    tokens: Arc<CachedTokenProvider>,
    base_url: String,
    unlock_url: String,
}

impl ApiClient {
    /// Create a new API client. `tokens` is wrapped in a cache unless it
    /// already is one.
    pub fn new(tokens: Arc<dyn TokenProvider>, config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            tokens: CachedTokenProvider::reuse(tokens),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            unlock_url: config.unlock_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a URL for an endpoint.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch a fresh token from the provider, replacing the cached one.
    pub async fn renew_token(&self) -> Result<(), ClientError> {
        self.tokens.request(true).await?;
        Ok(())
    }

    /// List keychains of a tenant, with their virtual keys, door releases
    /// and panels side-loaded.
    ///
    /// Calls `GET /v3/access_codes` page by page and assembles the result
    /// once the last page has arrived.
    pub async fn keychains(
        &self,
        tenant: Id,
        status: AccessCodeStatus,
    ) -> Result<ResultsWithReferences<Keychain>, ClientError> {
        debug!(tenant_id = %tenant, status = %status, "Fetching keychains");

        let pages = AccessCodePages {
            client: self,
            tenant,
            status,
        };
        let accumulated = accumulate_pages(&pages).await?;

        debug!(
            pages = accumulated.pages(),
            data_count = accumulated.data().len(),
            included_count = accumulated.included().len(),
            "Fetched all keychain pages"
        );

        Ok(accumulated.assemble()?)
    }

    /// Get one keychain with its virtual keys side-loaded.
    ///
    /// Devices are not included by this endpoint.
    pub async fn keychain(&self, keychain: Id) -> Result<ResultWithReferences<Keychain>, ClientError> {
        let path = format!("/v3/keychains/{keychain}");
        debug!(keychain_id = %keychain, path = %path, "Fetching keychain");

        let request = self
            .request(Method::GET, &path)
            .await?
            .query(&[("include", "virtual_keys")]);
        let doc: SingleDocument = self.send(request).await?;

        Ok(doc.assemble()?)
    }

    /// Create a custom keychain granting access to `access_points`.
    pub async fn create_custom_keychain(
        &self,
        tenant: Id,
        access_points: &[Id],
        args: &CustomKeychainArgs,
    ) -> Result<ResultWithReferences<Keychain>, ClientError> {
        debug!(
            tenant_id = %tenant,
            access_point_count = access_points.len(),
            name = %args.name,
            "Creating custom keychain"
        );

        let body = ResourceBody {
            data: ResourceObject {
                object_type: TYPE_KEYCHAIN,
                attributes: CustomKeychainAttributes {
                    kind: KeychainKind::Custom,
                    args,
                },
                relationships: Some(CustomKeychainRelationships {
                    access_points: ToMany {
                        data: access_points
                            .iter()
                            .map(|id| RawReference::pointer(*id, TYPE_ACCESS_POINT))
                            .collect(),
                    },
                    // Devices are not supported; the API still wants the key.
                    devices: ToMany { data: Vec::new() },
                    tenant: ToOne {
                        data: RawReference::pointer(tenant, TYPE_TENANT),
                    },
                }),
            },
        };

        let request = self
            .request(Method::POST, "/v3/keychains/custom")
            .await?
            .json(&body);
        let doc: SingleDocument = self.send(request).await?;

        Ok(doc.assemble()?)
    }

    /// Create one virtual key per recipient on an existing keychain.
    pub async fn create_virtual_keys(
        &self,
        keychain: Id,
        args: &VirtualKeyArgs,
    ) -> Result<ResultsWithReferences<VirtualKey>, ClientError> {
        debug!(
            keychain_id = %keychain,
            recipient_count = args.recipients.len(),
            "Creating virtual keys"
        );

        let body = ResourceBody {
            data: ResourceObject::<_, ()> {
                object_type: TYPE_VIRTUAL_KEY,
                attributes: args,
                relationships: None,
            },
        };

        let path = format!("/v3/keychains/{keychain}/virtual_keys");
        let request = self.request(Method::POST, &path).await?.json(&body);
        let doc: PaginatedDocument = self.send(request).await?;

        Ok(assemble(doc.data, doc.included)?)
    }

    /// List every tenant the token can act for.
    ///
    /// Follows the GraphQL cursor until `hasNextPage` is false. A failed
    /// page fails the whole call.
    pub async fn tenants(&self) -> Result<Vec<Tenant>, ClientError> {
        debug!("Fetching tenants");

        let mut tenants = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let variables = TenantsVariables {
                after: after.as_deref(),
            };
            let data: TenantsData = self
                .graphql(TENANTS_OPERATION, TENANTS_QUERY, variables)
                .await?;

            tenants.extend(data.tenants.nodes);
            match next_cursor(data.tenants.page_info)? {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        debug!(tenant_count = tenants.len(), "Fetched all tenants");
        Ok(tenants)
    }

    /// List the access points of one tenant.
    ///
    /// The query asks for a single node. No node ends the listing, and
    /// more than one is rejected as [`ClientError::UnexpectedResponse`].
    pub async fn tenant_access_points(
        &self,
        tenant: &TaggedId,
    ) -> Result<Vec<AccessPoint>, ClientError> {
        debug!(tenant_id = %tenant, "Fetching tenant access points");

        let mut access_points = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let variables = TenantAccessPointsVariables {
                ids: [tenant],
                after: after.as_deref(),
            };
            let data: TenantAccessPointsData = self
                .graphql(
                    TENANT_ACCESS_POINTS_OPERATION,
                    TENANT_ACCESS_POINTS_QUERY,
                    variables,
                )
                .await?;

            let mut nodes: Vec<TenantNode> = data.nodes.into_iter().flatten().collect();
            if nodes.len() > 1 {
                return Err(ClientError::UnexpectedResponse(format!(
                    "{} tenants returned for {tenant}",
                    nodes.len()
                )));
            }
            let Some(connection) = nodes.pop().and_then(|node| node.access_points) else {
                break;
            };

            access_points.extend(connection.nodes);
            match next_cursor(connection.page_info)? {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }

        debug!(
            tenant_id = %tenant,
            access_point_count = access_points.len(),
            "Fetched all tenant access points"
        );
        Ok(access_points)
    }

    /// Release the door behind `access_point` on behalf of `tenant`.
    pub async fn unlock_door(&self, tenant: Id, access_point: Id) -> Result<(), ClientError> {
        let body = UnlockBody {
            access_point_id: TaggedId::new(TAGGED_ACCESS_POINT, access_point),
            source: UNLOCK_SOURCE,
            tenant_id: TaggedId::new(TAGGED_TENANT, tenant),
        };

        debug!(
            tenant_id = %body.tenant_id,
            access_point_id = %body.access_point_id,
            "Unlocking door"
        );

        let url = format!("{}{}", self.unlock_url, UNLOCK_PATH);
        let request = self.request_to(Method::POST, url).await?.json(&body);
        self.send::<IgnoredAny>(request).await?;

        info!(tenant_id = %tenant, access_point_id = %access_point, "Door unlocked");
        Ok(())
    }

    /// Run one GraphQL operation and return its `data`.
    async fn graphql<V, D>(
        &self,
        operation: &str,
        query: &str,
        variables: V,
    ) -> Result<D, ClientError>
    where
        V: Serialize,
        D: DeserializeOwned,
    {
        let body = GraphQlRequest {
            operation_name: operation,
            variables,
            query,
        };
        let request = self.request(Method::POST, GRAPHQL_PATH).await?.json(&body);
        let response: GraphQlResponse<D> = self.send(request).await?;

        if !response.errors.is_empty() {
            let message = response
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            error!(operation, errors = %message, "GraphQL query failed");
            return Err(ClientError::GraphQl(message));
        }

        response
            .data
            .ok_or_else(|| ClientError::UnexpectedResponse(format!("{operation} returned no data")))
    }

    /// Start a request against the API base URL with the cached token
    /// attached.
    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        self.request_to(method, self.url(path)).await
    }

    async fn request_to(&self, method: Method, url: String) -> Result<RequestBuilder, ClientError> {
        let token = self.tokens.request(false).await?;
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, token.bearer()))
    }

    /// Send a request and decode a successful JSON response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "API request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Cursor of the next page, or `None` on the last one.
fn next_cursor(page_info: PageInfo) -> Result<Option<String>, ClientError> {
    if !page_info.has_next_page {
        return Ok(None);
    }
    page_info.end_cursor.map(Some).ok_or_else(|| {
        ClientError::UnexpectedResponse("hasNextPage is set without an endCursor".to_string())
    })
}

/// Pages of `GET /v3/access_codes`.
struct AccessCodePages<'a> {
    client: &'a ApiClient,
    tenant: Id,
    status: AccessCodeStatus,
}

#[async_trait]
impl PageSource for AccessCodePages<'_> {
    type Error = ClientError;

    async fn fetch_page(&self, page: u32) -> Result<Page, ClientError> {
        let tenant = self.tenant.to_string();
        let page_size = PAGE_SIZE.to_string();
        let page_number = page.to_string();

        debug!(page, tenant_id = %tenant, "Fetching keychains page");

        let request = self
            .client
            .request(Method::GET, "/v3/access_codes")
            .await?
            .query(&[
                ("include", KEYCHAINS_INCLUDE),
                ("filter[tenant]", tenant.as_str()),
                ("filter[status]", self.status.as_str()),
                ("page[size]", page_size.as_str()),
                ("page[number]", page_number.as_str()),
            ]);

        let doc: PaginatedDocument = self.client.send(request).await?;
        Ok(doc.into())
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Serialize)]
struct ResourceBody<A, R> {
    data: ResourceObject<A, R>,
}

#[derive(Serialize)]
struct ResourceObject<A, R> {
    #[serde(rename = "type")]
    object_type: ObjectType,
    attributes: A,
    #[serde(skip_serializing_if = "Option::is_none")]
    relationships: Option<R>,
}

#[derive(Serialize)]
struct CustomKeychainAttributes<'a> {
    kind: KeychainKind,
    #[serde(flatten)]
    args: &'a CustomKeychainArgs,
}

#[derive(Serialize)]
struct CustomKeychainRelationships {
    access_points: ToMany,
    devices: ToMany,
    tenant: ToOne,
}

#[derive(Serialize)]
struct ToMany {
    data: Vec<RawReference>,
}

#[derive(Serialize)]
struct ToOne {
    data: RawReference,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UnlockBody {
    access_point_id: TaggedId,
    source: &'static str,
    tenant_id: TaggedId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmx_auth::StaticToken;

    #[test]
    fn test_url_building() {
        let config = ClientConfig::default().with_base_url("http://localhost:8080/");
        let client = ApiClient::new(Arc::new(StaticToken::new("t")), config).unwrap();
        assert_eq!(
            client.url("/v3/access_codes"),
            "http://localhost:8080/v3/access_codes"
        );
    }

    #[test]
    fn test_next_cursor() {
        let last = PageInfo {
            has_next_page: false,
            end_cursor: Some("ignored".to_string()),
        };
        assert_eq!(next_cursor(last).unwrap(), None);

        let more = PageInfo {
            has_next_page: true,
            end_cursor: Some("abc".to_string()),
        };
        assert_eq!(next_cursor(more).unwrap().as_deref(), Some("abc"));

        let broken = PageInfo {
            has_next_page: true,
            end_cursor: None,
        };
        assert!(matches!(
            next_cursor(broken),
            Err(ClientError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_unlock_body_uses_tagged_ids() {
        let body = UnlockBody {
            access_point_id: TaggedId::new(TAGGED_ACCESS_POINT, Id::new(53449)),
            source: UNLOCK_SOURCE,
            tenant_id: TaggedId::new(TAGGED_TENANT, Id::new(7648837)),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "accessPointId": "prod-access_point-53449",
                "source": "mobile_app",
                "tenantId": "prod-tenant-7648837"
            })
        );
    }

    #[test]
    fn test_virtual_key_body_has_no_relationships() {
        let args = VirtualKeyArgs::default();
        let body = ResourceBody {
            data: ResourceObject::<_, ()> {
                object_type: TYPE_VIRTUAL_KEY,
                attributes: &args,
                relationships: None,
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"data": {"type": "virtual_keys", "attributes": {"recipients": []}}})
        );
    }
}
