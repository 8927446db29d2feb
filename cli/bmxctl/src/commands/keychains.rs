//! Keychain commands.

use anyhow::Result;
use bmx_client::models::{
    AccessCodeStatus, CustomKeychainArgs, Keychain, KeychainKind, Panel, VirtualKey,
    VirtualKeyArgs, VirtualKeyRecipient, WatchTime, Weekday, TAGGED_TENANT,
};
use bmx_compound::{DocumentError, ReferenceStore, Relationship, TypedReference};
use bmx_id::{tagged_ids_to_numbers, Id, TaggedId};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tabled::Tabled;

use crate::error::{not_found, CliError};
use crate::output::{display_option, print_json, print_success, print_table, OutputFormat};

use super::CommandContext;

/// Keychain commands.
#[derive(Debug, Args)]
pub struct KeychainsCommand {
    #[command(subcommand)]
    command: KeychainsSubcommand,
}

#[derive(Debug, Subcommand)]
enum KeychainsSubcommand {
    /// List keychains of a tenant.
    List(ListKeychainsArgs),

    /// Get keychain details with its virtual keys.
    Get(GetKeychainArgs),

    /// Create a custom keychain.
    Create(CreateKeychainArgs),

    /// Send virtual keys for a keychain.
    AddKeys(AddKeysArgs),
}

#[derive(Debug, Args)]
struct ListKeychainsArgs {
    /// Tenant ID.
    #[arg(long)]
    tenant: Id,

    /// Keychain status.
    #[arg(long, value_enum, default_value = "active")]
    status: StatusArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
}

impl From<StatusArg> for AccessCodeStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => AccessCodeStatus::Active,
        }
    }
}

#[derive(Debug, Args)]
struct GetKeychainArgs {
    /// Keychain ID.
    keychain: Id,
}

#[derive(Debug, Args)]
struct CreateKeychainArgs {
    /// Tenant ID.
    #[arg(long)]
    tenant: Id,

    /// Keychain name.
    #[arg(long)]
    name: String,

    /// Start of validity, e.g. 2025-12-09T16:58:00-08:00.
    #[arg(long)]
    starts_at: DateTime<FixedOffset>,

    /// End of validity.
    #[arg(long)]
    ends_at: DateTime<FixedOffset>,

    /// Access point ID. Repeat for several doors.
    #[arg(long = "access-point", required_unless_present = "all_doors")]
    access_points: Vec<Id>,

    /// Grant every door the tenant can open.
    #[arg(long, conflicts_with = "access_points")]
    all_doors: bool,

    /// Let the keys open the tenant's unit as well.
    #[arg(long)]
    allow_unit_access: bool,
}

#[derive(Debug, Args)]
struct AddKeysArgs {
    /// Keychain ID.
    keychain: Id,

    /// Recipient as NAME=EMAIL. Repeat for several recipients.
    #[arg(long = "recipient", value_parser = parse_recipient, required = true)]
    recipients: Vec<VirtualKeyRecipient>,
}

fn parse_recipient(s: &str) -> Result<VirtualKeyRecipient, String> {
    let (name, email) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=EMAIL, got {s:?}"))?;
    let (name, email) = (name.trim(), email.trim());
    if name.is_empty() || email.is_empty() {
        return Err(format!("expected NAME=EMAIL, got {s:?}"));
    }
    Ok(VirtualKeyRecipient {
        name: name.to_string(),
        deliver_to: email.to_string(),
    })
}

impl KeychainsCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            KeychainsSubcommand::List(args) => list_keychains(ctx, args).await,
            KeychainsSubcommand::Get(args) => get_keychain(ctx, args).await,
            KeychainsSubcommand::Create(args) => create_keychain(ctx, args).await,
            KeychainsSubcommand::AddKeys(args) => add_keys(ctx, args).await,
        }
    }
}

// =============================================================================
// Views
// =============================================================================

/// A keychain with its side-loaded resources resolved.
#[derive(Debug, Serialize)]
struct KeychainView {
    id: Id,
    name: String,
    kind: Option<KeychainKind>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    time_from: Option<WatchTime>,
    time_to: Option<WatchTime>,
    weekdays: Vec<Weekday>,
    virtual_keys: Vec<VirtualKeyView>,
    devices: Vec<PanelView>,
}

#[derive(Debug, Serialize)]
struct VirtualKeyView {
    id: Id,
    name: String,
    email: String,
    pin: String,
    sent_at: Option<DateTime<Utc>>,
    door_releases: Vec<DoorReleaseView>,
}

#[derive(Debug, Serialize)]
struct DoorReleaseView {
    id: Id,
    release_method: Option<String>,
    logged_at: Option<DateTime<Utc>>,
    panel: Option<PanelView>,
}

#[derive(Debug, Serialize)]
struct PanelView {
    id: Id,
    name: String,
}

impl From<Panel> for PanelView {
    fn from(panel: Panel) -> Self {
        Self {
            id: panel.id,
            name: panel.attributes.name,
        }
    }
}

/// Resolve the references present in `refs`, skipping the rest.
///
/// Endpoints side-load different relationship sets; the single keychain
/// endpoint includes virtual keys but not their door releases.
fn resolve_loaded<'a, T, I>(references: I, refs: &ReferenceStore) -> Result<Vec<T>, DocumentError>
where
    T: DeserializeOwned + 'a,
    I: IntoIterator<Item = &'a TypedReference<T>>,
{
    references
        .into_iter()
        .filter(|r| refs.contains(r.id()))
        .map(|r| r.resolve(refs))
        .collect()
}

fn resolve_loaded_one<T: DeserializeOwned>(
    relationship: &Relationship<T>,
    refs: &ReferenceStore,
) -> Result<Option<T>, DocumentError> {
    relationship
        .reference()
        .filter(|r| refs.contains(r.id()))
        .map(|r| r.resolve(refs))
        .transpose()
}

fn virtual_key_view(key: VirtualKey, refs: &ReferenceStore) -> Result<VirtualKeyView, DocumentError> {
    let door_releases = resolve_loaded(&key.relationships.door_releases, refs)?
        .into_iter()
        .map(|release| {
            let panel = resolve_loaded_one(&release.relationships.panel, refs)?;
            Ok(DoorReleaseView {
                id: release.id,
                release_method: release.attributes.release_method,
                logged_at: release.attributes.logged_at,
                panel: panel.map(PanelView::from),
            })
        })
        .collect::<Result<Vec<_>, DocumentError>>()?;

    Ok(VirtualKeyView {
        id: key.id,
        name: key.attributes.name,
        email: key.attributes.email,
        pin: key.attributes.pin_code.to_string(),
        sent_at: key.attributes.sent_at,
        door_releases,
    })
}

fn keychain_view(keychain: &Keychain, refs: &ReferenceStore) -> Result<KeychainView, DocumentError> {
    let virtual_keys = resolve_loaded(&keychain.relationships.virtual_keys, refs)?
        .into_iter()
        .map(|key| virtual_key_view(key, refs))
        .collect::<Result<Vec<_>, _>>()?;
    let devices = resolve_loaded(&keychain.relationships.devices, refs)?
        .into_iter()
        .map(PanelView::from)
        .collect();

    let attributes = &keychain.attributes;
    Ok(KeychainView {
        id: keychain.id,
        name: attributes.name.clone(),
        kind: attributes.kind,
        starts_at: attributes.starts_at,
        ends_at: attributes.ends_at,
        time_from: attributes.time_from,
        time_to: attributes.time_to,
        weekdays: attributes.weekdays.clone(),
        virtual_keys,
        devices,
    })
}

// =============================================================================
// Table Rows
// =============================================================================

#[derive(Debug, Tabled)]
struct KeychainRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Kind")]
    kind: String,

    #[tabled(rename = "Starts")]
    starts_at: String,

    #[tabled(rename = "Ends")]
    ends_at: String,

    #[tabled(rename = "Keys")]
    keys: usize,

    #[tabled(rename = "Devices")]
    devices: usize,
}

impl From<&KeychainView> for KeychainRow {
    fn from(view: &KeychainView) -> Self {
        Self {
            id: view.id.to_string(),
            name: view.name.clone(),
            kind: display_option(&view.kind),
            starts_at: display_time(view.starts_at),
            ends_at: display_time(view.ends_at),
            keys: view.virtual_keys.len(),
            devices: view.devices.len(),
        }
    }
}

#[derive(Debug, Tabled)]
struct VirtualKeyRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Name")]
    name: String,

    #[tabled(rename = "Email")]
    email: String,

    #[tabled(rename = "PIN")]
    pin: String,

    #[tabled(rename = "Sent")]
    sent_at: String,

    #[tabled(rename = "Releases")]
    releases: usize,
}

impl From<&VirtualKeyView> for VirtualKeyRow {
    fn from(view: &VirtualKeyView) -> Self {
        Self {
            id: view.id.to_string(),
            name: view.name.clone(),
            email: view.email.clone(),
            pin: view.pin.clone(),
            sent_at: display_time(view.sent_at),
            releases: view.door_releases.len(),
        }
    }
}

fn display_time(time: Option<DateTime<Utc>>) -> String {
    display_option(&time.map(|t| t.format("%Y-%m-%d %H:%M").to_string()))
}

fn print_keychain(view: &KeychainView, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_table(&[KeychainRow::from(view)]);
            let rows: Vec<VirtualKeyRow> = view.virtual_keys.iter().map(VirtualKeyRow::from).collect();
            print_table(&rows);
        }
        OutputFormat::Json => print_json(view),
    }
}

// =============================================================================
// Commands
// =============================================================================

/// List keychains of a tenant.
async fn list_keychains(ctx: CommandContext, args: ListKeychainsArgs) -> Result<()> {
    let client = ctx.client()?;

    let keychains = client.keychains(args.tenant, args.status.into()).await?;
    let views = keychains
        .data()
        .iter()
        .map(|keychain| keychain_view(keychain, keychains.refs()))
        .collect::<Result<Vec<_>, _>>()?;

    match ctx.format {
        OutputFormat::Table => {
            let rows: Vec<KeychainRow> = views.iter().map(KeychainRow::from).collect();
            print_table(&rows);
        }
        OutputFormat::Json => print_json(&views),
    }
    Ok(())
}

/// Get keychain details.
async fn get_keychain(ctx: CommandContext, args: GetKeychainArgs) -> Result<()> {
    let client = ctx.client()?;

    let keychain = client
        .keychain(args.keychain)
        .await
        .map_err(|e| not_found(e, || format!("Keychain '{}' not found", args.keychain)))?;
    let view = keychain_view(keychain.data(), keychain.refs())?;

    print_keychain(&view, ctx.format);
    Ok(())
}

/// Create a custom keychain.
async fn create_keychain(ctx: CommandContext, args: CreateKeychainArgs) -> Result<()> {
    if args.ends_at <= args.starts_at {
        return Err(CliError::InvalidArgument("--ends-at must be after --starts-at".to_string()).into());
    }

    let client = ctx.client()?;

    let access_points = if args.all_doors {
        let tenant = TaggedId::new(TAGGED_TENANT, args.tenant);
        let tagged: Vec<TaggedId> = client
            .tenant_access_points(&tenant)
            .await?
            .into_iter()
            .map(|access_point| access_point.id)
            .collect();
        if tagged.is_empty() {
            return Err(CliError::InvalidArgument(format!("tenant {tenant} has no doors")).into());
        }
        tagged_ids_to_numbers(&tagged)
    } else {
        args.access_points
    };

    let request = CustomKeychainArgs {
        name: args.name,
        starts_at: args.starts_at,
        ends_at: args.ends_at,
        allow_unit_access: args.allow_unit_access,
    };
    let created = client
        .create_custom_keychain(args.tenant, &access_points, &request)
        .await?;
    let view = keychain_view(created.data(), created.refs())?;

    if matches!(ctx.format, OutputFormat::Table) {
        print_success(&format!("Created keychain {} ({})", view.id, view.name));
    }
    print_keychain(&view, ctx.format);
    Ok(())
}

/// Send virtual keys for a keychain.
async fn add_keys(ctx: CommandContext, args: AddKeysArgs) -> Result<()> {
    let client = ctx.client()?;

    let request = VirtualKeyArgs {
        recipients: args.recipients,
    };
    let keys = client
        .create_virtual_keys(args.keychain, &request)
        .await
        .map_err(|e| not_found(e, || format!("Keychain '{}' not found", args.keychain)))?;

    let (keys, refs) = keys.into_parts();
    let views = keys
        .into_iter()
        .map(|key| virtual_key_view(key, &refs))
        .collect::<Result<Vec<_>, _>>()?;

    match ctx.format {
        OutputFormat::Table => {
            print_success(&format!("Sent {} virtual key(s)", views.len()));
            let rows: Vec<VirtualKeyRow> = views.iter().map(VirtualKeyRow::from).collect();
            print_table(&rows);
        }
        OutputFormat::Json => print_json(&views),
    }
    Ok(())
}
