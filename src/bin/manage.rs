//! Project management CLI
//!
//! ```text
//! manage runserver [ADDRESS]
//! manage migrate
//! manage createsuperuser --email .. --first-name .. --last-name .. --password ..
//! manage check
//! ```

use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use reinhardt::Argon2Hasher;
use reinhardt::server::{HttpServer, ShutdownCoordinator};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use issuetracker::app::{App, AppState};
use issuetracker::apps::accounts::models::{NewUser, User};
use issuetracker::auth::{PasswordValidators, UserAttributes, hash_password};
use issuetracker::conf::Settings;
use issuetracker::db;

#[derive(Parser, Debug)]
#[command(name = "manage")]
#[command(about = "Issue tracker management commands", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Apply migrations and start the HTTP server
	Runserver {
		/// Address to bind, defaults to the configured bind_address
		#[arg(value_name = "ADDRESS")]
		address: Option<String>,
	},
	/// Apply pending database migrations
	Migrate,
	/// Create a user with staff and admin flags
	Createsuperuser {
		#[arg(long, value_name = "EMAIL")]
		email: String,
		#[arg(long, value_name = "FIRST_NAME")]
		first_name: String,
		#[arg(long, value_name = "LAST_NAME")]
		last_name: String,
		#[arg(long, value_name = "PASSWORD")]
		password: String,
	},
	/// Validate settings and database connectivity
	Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let settings = Settings::load().context("Failed to load settings")?;
	init_tracing(&settings);

	match cli.command {
		Command::Runserver { address } => runserver(settings, address).await,
		Command::Migrate => {
			let pool = db::connect(&settings.database_url).await?;
			db::migrate(&pool).await?;
			println!("Migrations applied.");
			Ok(())
		}
		Command::Createsuperuser {
			email,
			first_name,
			last_name,
			password,
		} => {
			let pool = db::connect(&settings.database_url).await?;
			db::migrate(&pool).await?;

			if User::email_taken(&pool, &email).await? {
				bail!("A user with email {} already exists", email);
			}
			let attributes = UserAttributes {
				email: &email,
				first_name: &first_name,
				last_name: &last_name,
			};
			PasswordValidators::standard(settings.password_min_length)
				.validate(&password, &attributes)
				.context("Password rejected")?;

			let password_hash = hash_password(Arc::new(Argon2Hasher::new()), password).await?;
			let user = User::create(
				&pool,
				&NewUser::new(&email, &first_name, &last_name, &password_hash).superuser(),
			)
			.await?;
			println!("Superuser {} created (id {}).", user.email, user.id);
			Ok(())
		}
		Command::Check => {
			settings.validate()?;
			let pool = db::connect(&settings.database_url).await?;
			sqlx::query("SELECT 1").execute(&pool).await?;
			println!("System check identified no issues.");
			Ok(())
		}
	}
}

async fn runserver(settings: Settings, address: Option<String>) -> anyhow::Result<()> {
	settings.validate()?;
	let address = address.unwrap_or_else(|| settings.bind_address.clone());
	let addr: SocketAddr = address
		.parse()
		.with_context(|| format!("Invalid address: {}", address))?;

	let pool = db::connect(&settings.database_url).await?;
	db::migrate(&pool).await?;

	let app = App::new(AppState::new(settings, pool));
	let coordinator = ShutdownCoordinator::new(Duration::from_secs(30));

	let shutdown_tx = coordinator.clone();
	tokio::spawn(async move {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::error!(error = %e, "Failed to listen for CTRL-C");
			return;
		}
		tracing::info!("Received CTRL-C, shutting down gracefully");
		shutdown_tx.shutdown();
	});

	tracing::info!(%addr, "Starting server");
	HttpServer::new(Arc::new(app))
		.listen_with_shutdown(addr, coordinator)
		.await
		.map_err(|e| anyhow!("Server error: {}", e))
}

fn init_tracing(settings: &Settings) {
	let default = if settings.debug {
		"info,issuetracker=debug"
	} else {
		"info"
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}
