//! Profile commands: show the aggregate and edit basic and seller info.

use std::error::Error;

use chodocu_client::ClientConfig;
use chodocu_client::profile::{Agreement, ContactMethod, PaymentMethod};
use chodocu_core::AddressId;

use super::{loaded_editor, print_json, report_saved};

/// Print the profile aggregate.
///
/// # Errors
///
/// Returns an error if there is no session or the profile cannot be loaded.
pub async fn show(config: &ClientConfig) -> Result<(), Box<dyn Error>> {
    let editor = loaded_editor(config).await?;
    let state = editor.state();
    if let Some(profile) = &state.profile {
        print_json(profile)?;
        tracing::info!(
            percentage = profile.completion.percentage,
            missing = ?profile.completion.missing_fields,
            "Profile completion"
        );
    }
    Ok(())
}

/// Update basic info. Fields left out keep their stored value.
///
/// # Errors
///
/// Returns the validation or store failure as a user-facing message.
pub async fn basic_info(
    config: &ClientConfig,
    full_name: Option<String>,
    phone: Option<String>,
    avatar: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let editor = loaded_editor(config).await?;
    if let Some(full_name) = full_name {
        editor.set_full_name(full_name);
    }
    if let Some(phone) = phone {
        editor.set_phone(phone);
    }
    if avatar.is_some() {
        editor.set_avatar(avatar);
    }

    editor
        .save_basic_info()
        .await
        .map_err(|e| e.user_message())?;
    report_saved(&editor);
    Ok(())
}

/// Seller info fields. Left-out fields keep their stored value.
#[derive(clap::Args)]
pub struct SellerArgs {
    #[arg(long)]
    shop_name: Option<String>,
    #[arg(long)]
    trading_area: Option<String>,
    /// Address-book id used for pickups
    #[arg(long)]
    pickup_address: Option<String>,
    /// Accept the seller terms
    #[arg(long)]
    accept_terms: bool,
    /// Pledge not to sell prohibited items
    #[arg(long)]
    no_prohibited_items: bool,
    #[arg(long)]
    internal_chat: Option<bool>,
    #[arg(long)]
    phone_contact: Option<bool>,
    #[arg(long)]
    show_phone: Option<bool>,
    #[arg(long)]
    e_wallet: Option<bool>,
    #[arg(long)]
    bank_transfer: Option<bool>,
    #[arg(long)]
    bank_account: Option<String>,
}

/// Update seller info.
///
/// # Errors
///
/// Returns the first failing check or the store failure as a user-facing
/// message.
pub async fn seller_info(config: &ClientConfig, args: SellerArgs) -> Result<(), Box<dyn Error>> {
    let editor = loaded_editor(config).await?;

    if let Some(name) = args.shop_name {
        editor.set_shop_name(name);
    }
    if let Some(area) = args.trading_area {
        editor.set_trading_area(area);
    }
    if let Some(id) = args.pickup_address {
        editor.set_pickup_address(Some(AddressId::new(id)));
    }
    if args.accept_terms {
        editor.set_agreement(Agreement::Terms, true);
    }
    if args.no_prohibited_items {
        editor.set_agreement(Agreement::NoProhibitedItems, true);
    }

    let contacts = [
        (ContactMethod::InternalChat, args.internal_chat),
        (ContactMethod::Phone, args.phone_contact),
        (ContactMethod::ShowPhone, args.show_phone),
    ];
    for (method, enabled) in contacts {
        if let Some(enabled) = enabled {
            editor.set_contact_method(method, enabled);
        }
    }
    let payments = [
        (PaymentMethod::EWallet, args.e_wallet),
        (PaymentMethod::BankTransfer, args.bank_transfer),
    ];
    for (method, enabled) in payments {
        if let Some(enabled) = enabled {
            editor.set_payment_method(method, enabled);
        }
    }
    if let Some(account) = args.bank_account {
        editor.set_bank_account(account);
    }

    editor
        .save_seller_info()
        .await
        .map_err(|e| e.user_message())?;
    report_saved(&editor);
    Ok(())
}
