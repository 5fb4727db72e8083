//! Address book commands.
//!
//! Regions are given by name or code and resolved against the region
//! catalog before anything is sent; the stored address carries the names.

use std::error::Error;
use std::sync::Arc;

use chodocu_client::{AddressEdit, AddressEditor, ClientConfig, HttpRegionCatalog};
use chodocu_core::{
    AddressDraft, AddressId, DefaultKind, RegionCode, RegionLevel, ShippingAddressPatch,
};

use super::{loaded_editor, report_saved};

/// List stored addresses, one per line.
///
/// # Errors
///
/// Returns an error if there is no session or the profile cannot be loaded.
#[allow(clippy::print_stdout)]
pub async fn list(config: &ClientConfig) -> Result<(), Box<dyn Error>> {
    let editor = loaded_editor(config).await?;
    let state = editor.state();
    let addresses = state.shipping_addresses();
    if addresses.is_empty() {
        tracing::info!("The address book is empty");
    }

    for address in addresses {
        let mut flags = Vec::new();
        if address.is_default_shipping {
            flags.push("shipping");
        }
        if address.is_default_pickup {
            flags.push("pickup");
        }
        println!(
            "{}\t{}\t{}\t{}\t[{}]",
            address.id.as_ref().map_or("-", AddressId::as_str),
            address.full_name,
            address.phone,
            address.formatted_single_line(),
            flags.join(",")
        );
    }
    Ok(())
}

/// Resolve region hints to their catalog names. The patch sets all three
/// levels.
async fn resolve_regions(
    config: &ClientConfig,
    province: &str,
    district: &str,
    ward: &str,
) -> Result<ShippingAddressPatch, Box<dyn Error>> {
    let regions = AddressEditor::new(Arc::new(HttpRegionCatalog::new(config)?));
    let draft = AddressDraft {
        province: province.to_string(),
        district: district.to_string(),
        ward: ward.to_string(),
        ..AddressDraft::default()
    };
    let codes = regions.hydrate(&draft).await;
    regions.close();

    let selector = regions.selector();
    let name = |level: RegionLevel, code: Option<RegionCode>, hint: &str| {
        code.and_then(|c| selector.name_of(level, &c))
            .ok_or_else(|| format!("Unknown {level}: {hint}"))
    };
    Ok(ShippingAddressPatch {
        province: Some(name(RegionLevel::Province, codes.province, province)?),
        district: Some(name(RegionLevel::District, codes.district, district)?),
        ward: Some(name(RegionLevel::Ward, codes.ward, ward)?),
        ..ShippingAddressPatch::default()
    })
}

/// Arguments of `addresses add`.
#[derive(clap::Args)]
pub struct AddArgs {
    /// Recipient name
    #[arg(short = 'n', long)]
    full_name: String,
    /// Recipient phone
    #[arg(short, long)]
    phone: String,
    /// Province name or code
    #[arg(long)]
    province: String,
    /// District name or code
    #[arg(long)]
    district: String,
    /// Ward name or code
    #[arg(long)]
    ward: String,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    note: Option<String>,
    #[arg(long)]
    default_shipping: bool,
    #[arg(long)]
    default_pickup: bool,
}

/// Add an address.
///
/// # Errors
///
/// Returns an error for unknown regions, incomplete input or a store
/// failure.
pub async fn add(config: &ClientConfig, args: AddArgs) -> Result<(), Box<dyn Error>> {
    let regions = resolve_regions(config, &args.province, &args.district, &args.ward).await?;
    let editor = loaded_editor(config).await?;

    editor.edit_new_address(&regions);
    let mut edits = vec![
        AddressEdit::FullName(args.full_name),
        AddressEdit::Phone(args.phone),
        AddressEdit::DefaultShipping(args.default_shipping),
        AddressEdit::DefaultPickup(args.default_pickup),
    ];
    edits.extend(args.street.map(AddressEdit::Street));
    edits.extend(args.note.map(AddressEdit::Note));
    for edit in edits {
        editor.edit_new_address(&edit.into());
    }

    editor.add_address().await.map_err(|e| e.user_message())?;
    report_saved(&editor);
    Ok(())
}

/// Arguments of `addresses update`.
#[derive(clap::Args)]
pub struct UpdateArgs {
    id: String,
    #[arg(short = 'n', long)]
    full_name: Option<String>,
    #[arg(short, long)]
    phone: Option<String>,
    /// Province name or code; district and ward must be given too
    #[arg(long, requires_all = ["district", "ward"])]
    province: Option<String>,
    #[arg(long, requires = "province")]
    district: Option<String>,
    #[arg(long, requires = "province")]
    ward: Option<String>,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    note: Option<String>,
}

/// Update fields of an address. Default flags are changed with
/// `set-default` only.
///
/// # Errors
///
/// Returns an error for unknown regions, an empty update or a store failure.
pub async fn update(config: &ClientConfig, args: UpdateArgs) -> Result<(), Box<dyn Error>> {
    let mut patch = match (&args.province, &args.district, &args.ward) {
        (Some(p), Some(d), Some(w)) => resolve_regions(config, p, d, w).await?,
        _ => ShippingAddressPatch::default(),
    };
    patch.full_name = args.full_name;
    patch.phone = args.phone;
    patch.street = args.street;
    patch.note = args.note;
    if patch.is_empty() {
        return Err("Nothing to update".into());
    }

    let editor = loaded_editor(config).await?;
    editor
        .update_address(&AddressId::new(args.id), &patch)
        .await
        .map_err(|e| e.user_message())?;
    report_saved(&editor);
    Ok(())
}

/// Delete an address.
///
/// # Errors
///
/// Returns the store failure.
pub async fn delete(config: &ClientConfig, id: &str) -> Result<(), Box<dyn Error>> {
    let editor = loaded_editor(config).await?;
    editor
        .delete_address(&AddressId::new(id))
        .await
        .map_err(|e| e.user_message())?;
    report_saved(&editor);
    Ok(())
}

/// Make an address the `kind` default.
///
/// # Errors
///
/// Returns the failure of the first failing store call.
pub async fn set_default(
    config: &ClientConfig,
    id: &str,
    kind: DefaultKind,
) -> Result<(), Box<dyn Error>> {
    let editor = loaded_editor(config).await?;
    let id = AddressId::new(id);
    let result = match kind {
        DefaultKind::Shipping => editor.set_default_shipping(&id).await,
        DefaultKind::Pickup => editor.set_default_pickup(&id).await,
    };
    result.map_err(|e| e.user_message())?;
    report_saved(&editor);
    Ok(())
}
