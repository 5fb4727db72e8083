//! Chợ Đồ Cũ CLI - drive the client core against a live backend.
//!
//! # Usage
//!
//! ```bash
//! # Log in and export the session
//! cho-cli login -e seller@chodocu.vn -p secret
//!
//! # Show the profile aggregate
//! cho-cli profile
//!
//! # Add an address (regions by name or code)
//! cho-cli addresses add -n "Nguyễn Văn A" -p 0912345678 \
//!     --province "Hà Nội" --district "Cầu Giấy" --ward "Dịch Vọng" --default-pickup
//!
//! # Make an address the shipping default
//! cho-cli addresses set-default 65f0c2 --kind shipping
//!
//! # Browse the region catalog
//! cho-cli regions --province 1
//! ```
//!
//! # Commands
//!
//! - `login` / `register` - Obtain a session
//! - `profile` - Show the profile aggregate
//! - `basic-info` / `seller-info` - Edit a profile section
//! - `addresses` - List, add, update, delete and set defaults
//! - `regions` - List provinces, districts or wards

#![cfg_attr(not(test), forbid(unsafe_code))]

use chodocu_client::ClientConfig;
use chodocu_core::DefaultKind;
use clap::{Parser, Subcommand, ValueEnum};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "cho-cli")]
#[command(author, version, about = "Chợ Đồ Cũ client tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the session variables
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Password confirmation
        #[arg(short, long)]
        confirm: String,
    },
    /// Show the profile aggregate as JSON
    Profile,
    /// Update basic info
    BasicInfo {
        #[arg(short = 'n', long)]
        full_name: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Update seller info
    SellerInfo(commands::profile::SellerArgs),
    /// Manage the address book
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// List regions: provinces, or the children of a province or district
    Regions {
        /// Province code; lists its districts
        #[arg(long, conflicts_with = "district")]
        province: Option<String>,
        /// District code; lists its wards
        #[arg(long)]
        district: Option<String>,
    },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List stored addresses
    List,
    /// Add an address
    Add(commands::addresses::AddArgs),
    /// Update fields of an address
    Update(commands::addresses::UpdateArgs),
    /// Delete an address
    Delete { id: String },
    /// Make an address the shipping or pickup default
    SetDefault {
        id: String,
        #[arg(short, long, value_enum)]
        kind: DefaultArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DefaultArg {
    Shipping,
    Pickup,
}

impl From<DefaultArg> for DefaultKind {
    fn from(arg: DefaultArg) -> Self {
        match arg {
            DefaultArg::Shipping => Self::Shipping,
            DefaultArg::Pickup => Self::Pickup,
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be up before the subscriber is installed
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chodocu_client=info,chodocu_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(config, &email, &password).await?;
        }
        Commands::Register {
            email,
            password,
            confirm,
        } => commands::auth::register(config, &email, &password, &confirm).await?,
        Commands::Profile => commands::profile::show(config).await?,
        Commands::BasicInfo {
            full_name,
            phone,
            avatar,
        } => commands::profile::basic_info(config, full_name, phone, avatar).await?,
        Commands::SellerInfo(args) => commands::profile::seller_info(config, args).await?,
        Commands::Addresses { action } => match action {
            AddressAction::List => commands::addresses::list(config).await?,
            AddressAction::Add(args) => commands::addresses::add(config, args).await?,
            AddressAction::Update(args) => commands::addresses::update(config, args).await?,
            AddressAction::Delete { id } => commands::addresses::delete(config, &id).await?,
            AddressAction::SetDefault { id, kind } => {
                commands::addresses::set_default(config, &id, kind.into()).await?;
            }
        },
        Commands::Regions { province, district } => {
            commands::regions::list(config, province.as_deref(), district.as_deref()).await?;
        }
    }
    Ok(())
}
