//! Tenant, access point and door commands.

use anyhow::Result;
use bmx_client::models::{AccessPoint, Tenant, TAGGED_ACCESS_POINT, TAGGED_TENANT};
use bmx_id::{Id, TaggedId};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{display_option, print_json, print_success, print_table, OutputFormat};

use super::CommandContext;

/// Tenant commands.
#[derive(Debug, Args)]
pub struct TenantsCommand {
    #[command(subcommand)]
    command: TenantsSubcommand,
}

#[derive(Debug, Subcommand)]
enum TenantsSubcommand {
    /// List the tenants the token can act for.
    List,

    /// List the doors a tenant can open.
    AccessPoints(AccessPointsArgs),

    /// Open a door.
    Unlock(UnlockArgs),
}

#[derive(Debug, Args)]
struct AccessPointsArgs {
    /// Tenant ID, numeric or tagged (prod-tenant-N).
    #[arg(value_parser = parse_tenant_id)]
    tenant: TaggedId,
}

#[derive(Debug, Args)]
struct UnlockArgs {
    /// Tenant ID, numeric or tagged (prod-tenant-N).
    #[arg(value_parser = parse_tenant_id)]
    tenant: TaggedId,

    /// Access point ID, numeric or tagged (prod-access_point-N).
    #[arg(long = "access-point", value_parser = parse_access_point_id)]
    access_point: TaggedId,
}

impl TenantsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            TenantsSubcommand::List => list_tenants(ctx).await,
            TenantsSubcommand::AccessPoints(args) => list_access_points(ctx, args).await,
            TenantsSubcommand::Unlock(args) => unlock(ctx, args).await,
        }
    }
}

fn parse_tenant_id(s: &str) -> Result<TaggedId, String> {
    parse_tagged(s, TAGGED_TENANT)
}

fn parse_access_point_id(s: &str) -> Result<TaggedId, String> {
    parse_tagged(s, TAGGED_ACCESS_POINT)
}

/// Accept either a bare number or a tagged ID of the given kind.
fn parse_tagged(s: &str, kind: &str) -> Result<TaggedId, String> {
    if let Ok(number) = s.parse::<Id>() {
        return Ok(TaggedId::new(kind, number));
    }

    let tagged = TaggedId::parse(s).map_err(|e| e.to_string())?;
    if tagged.kind() != kind {
        return Err(format!("expected a {kind} ID, got {s:?}"));
    }
    Ok(tagged)
}

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Serialize)]
struct TenantView {
    id: TaggedId,
    name: String,
    first_name: String,
    last_name: String,
    pin: Option<String>,
    unit: Option<String>,
    floor: Option<i64>,
    building: Option<String>,
}

impl From<Tenant> for TenantView {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
            first_name: tenant.first_name,
            last_name: tenant.last_name,
            pin: tenant.pin_code.map(|pin| pin.to_string()),
            unit: tenant.unit.as_ref().map(|unit| unit.label.clone()),
            floor: tenant.unit.map(|unit| unit.floor_number),
            building: tenant.building.map(|building| building.name),
        }
    }
}

#[derive(Debug, Serialize)]
struct AccessPointView {
    id: TaggedId,
    name: String,
    open_duration: i64,
    online: bool,
}

impl From<AccessPoint> for AccessPointView {
    fn from(access_point: AccessPoint) -> Self {
        Self {
            id: access_point.id,
            name: access_point.name,
            open_duration: access_point.open_duration,
            online: access_point.online,
        }
    }
}

#[derive(Debug, Tabled)]
struct TenantRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Unit")]
    unit: String,

    #[tabled(rename = "Building")]
    building: String,
}

impl From<&TenantView> for TenantRow {
    fn from(view: &TenantView) -> Self {
        Self {
            id: view.id.to_string(),
            name: view.name.clone(),
            unit: display_option(&view.unit),
            building: display_option(&view.building),
        }
    }
}

#[derive(Debug, Tabled)]
struct AccessPointRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Open (s)")]
    open_duration: i64,

    #[tabled(rename = "Online")]
    online: String,
}

impl From<&AccessPointView> for AccessPointRow {
    fn from(view: &AccessPointView) -> Self {
        Self {
            id: view.id.to_string(),
            name: view.name.clone(),
            open_duration: view.open_duration,
            online: if view.online { "yes" } else { "no" }.to_string(),
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

async fn list_tenants(ctx: CommandContext) -> Result<()> {
    let client = ctx.client()?;

    let views: Vec<TenantView> = client
        .tenants()
        .await?
        .into_iter()
        .map(TenantView::from)
        .collect();

    match ctx.format {
        OutputFormat::Table => {
            let rows: Vec<TenantRow> = views.iter().map(TenantRow::from).collect();
            print_table(&rows);
        }
        OutputFormat::Json => print_json(&views),
    }
    Ok(())
}

async fn list_access_points(ctx: CommandContext, args: AccessPointsArgs) -> Result<()> {
    let client = ctx.client()?;

    let views: Vec<AccessPointView> = client
        .tenant_access_points(&args.tenant)
        .await?
        .into_iter()
        .map(AccessPointView::from)
        .collect();

    match ctx.format {
        OutputFormat::Table => {
            let rows: Vec<AccessPointRow> = views.iter().map(AccessPointRow::from).collect();
            print_table(&rows);
        }
        OutputFormat::Json => print_json(&views),
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct UnlockResult<'a> {
    tenant: &'a TaggedId,
    access_point: &'a TaggedId,
    unlocked: bool,
}

async fn unlock(ctx: CommandContext, args: UnlockArgs) -> Result<()> {
    let client = ctx.client()?;

    client
        .unlock_door(args.tenant.number(), args.access_point.number())
        .await?;

    match ctx.format {
        OutputFormat::Table => print_success(&format!("Unlocked {}", args.access_point)),
        OutputFormat::Json => print_json(&UnlockResult {
            tenant: &args.tenant,
            access_point: &args.access_point,
            unlocked: true,
        }),
    }
    Ok(())
}
