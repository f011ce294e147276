//! Shopfront CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! sf-cli migrate
//!
//! # Seed the catalog from a YAML file
//! sf-cli seed products -f products.yaml --owner seller@example.com
//!
//! # Grant or revoke admin console access
//! sf-cli user promote -e admin@example.com
//! sf-cli user demote -e admin@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed products` - Insert catalog products from YAML
//! - `user promote|demote` - Change a user's role

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use shopfront_core::UserRole;

mod commands;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage user roles
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products listed in a YAML file
    Products {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,

        /// Email of the owning user (overrides `owner` in the file)
        #[arg(short, long)]
        owner: Option<String>,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Grant admin console access
    Promote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke admin console access
    Demote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file, owner } => {
                commands::seed::products(&file, owner.as_deref()).await?;
            }
        },
        Commands::User { action } => match action {
            UserAction::Promote { email } => {
                commands::user::set_role(&email, UserRole::Admin).await?;
            }
            UserAction::Demote { email } => {
                commands::user::set_role(&email, UserRole::Customer).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed() {
        let cli = Cli::try_parse_from(["sf-cli", "seed", "products", "-f", "p.yaml"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed {
                target: SeedTarget::Products { owner: None, .. }
            })
        ));
    }

    #[test]
    fn test_parse_user_requires_email() {
        assert!(Cli::try_parse_from(["sf-cli", "user", "promote"]).is_err());
        assert!(Cli::try_parse_from(["sf-cli", "user", "demote", "-e", "a@b.co"]).is_ok());
    }
}
