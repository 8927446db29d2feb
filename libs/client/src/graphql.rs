//! GraphQL envelope for the tenant endpoint.
//!
//! Lists are Relay-style connections: each page carries `nodes` and a
//! `pageInfo` cursor, and the next page is requested with `after`.

use bmx_id::TaggedId;
use serde::{Deserialize, Serialize};

use crate::models::{AccessPoint, Tenant};

/// Path of the tenant-facing GraphQL endpoint.
pub(crate) const GRAPHQL_PATH: &str = "/denizen/v1/graphql";

pub(crate) const TENANTS_OPERATION: &str = "Tenants";

pub(crate) const TENANTS_QUERY: &str = "query Tenants($after: String) { \
tenants(after: $after) { pageInfo { ...PageInfoFragment } nodes { ...TenantFragment } } } \
fragment PageInfoFragment on PageInfo { hasNextPage endCursor } \
fragment UnitFragment on Unit { id label floorNumber } \
fragment BuildingFragment on Building { id guid name } \
fragment TenantFragment on Tenant { id firstName lastName name pinCode \
unit { ...UnitFragment } building { ...BuildingFragment } }";

pub(crate) const TENANT_ACCESS_POINTS_OPERATION: &str = "TenantAccessPoints";

pub(crate) const TENANT_ACCESS_POINTS_QUERY: &str =
    "query TenantAccessPoints($ids: [ID!]!, $after: String) { \
nodes(ids: $ids) { __typename id ... on Tenant { accessPoints(after: $after) { \
pageInfo { ...PageInfoFragment } nodes { ...AccessPointFragment } } } } } \
fragment PageInfoFragment on PageInfo { hasNextPage endCursor } \
fragment AccessPointFragment on AccessPoint { id name openDuration online }";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphQlRequest<'a, V> {
    pub operation_name: &'a str,
    pub variables: V,
    pub query: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<D> {
    pub data: Option<D>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

/// One page of a connection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Connection<T> {
    #[serde(default)]
    pub nodes: Vec<T>,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TenantsVariables<'a> {
    pub after: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenantsData {
    pub tenants: Connection<Tenant>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TenantAccessPointsVariables<'a> {
    pub ids: [&'a TaggedId; 1],
    pub after: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TenantAccessPointsData {
    #[serde(default)]
    pub nodes: Vec<Option<TenantNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TenantNode {
    #[serde(default)]
    pub access_points: Option<Connection<AccessPoint>>,
}
