// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Vault document server binary.

use std::path::PathBuf;

use axum::http::HeaderValue;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vault_server::{create_app_state, create_router, version};
use vault_server_audit::ActorId;
use vault_server_auth::{generate_access_token, Role};
use vault_server_config::ServerConfig;
use vault_server_db::{create_pool, run_migrations, NewUser, UserRepository};

/// Vault server - HTTP server for document metadata.
#[derive(Parser, Debug)]
#[command(name = "vault-server", about = "Vault document metadata server", version)]
struct Args {
	/// Path to a TOML config file (default: /etc/vault/server.toml)
	#[arg(long, global = true, env = "VAULT_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run the HTTP server (default)
	Serve,
	/// Create a user and print its access token
	CreateUser(CreateUserArgs),
	/// Show version and build information
	Version,
}

#[derive(ClapArgs, Debug)]
struct CreateUserArgs {
	#[arg(long)]
	email: String,
	#[arg(long)]
	first_name: String,
	#[arg(long)]
	last_name: String,
	#[arg(long)]
	phone: Option<String>,
	/// GUEST, USER, MANAGER, ADMIN or SUPER_ADMIN
	#[arg(long, default_value = "USER")]
	role: Role,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match args.config {
		Some(ref path) => vault_server_config::load_config_with_file(path.clone())?,
		None => vault_server_config::load_config()?,
	};

	init_tracing(&config);

	let pool = create_pool(&config.database.url, config.database.max_connections).await?;
	run_migrations(&pool).await?;

	match args.command {
		Some(Command::CreateUser(user_args)) => create_user(pool, user_args).await,
		_ => serve(pool, &config).await,
	}
}

fn init_tracing(config: &ServerConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);

	if config.logging.json {
		registry.with(tracing_subscriber::fmt::layer().json()).init();
	} else {
		registry.with(tracing_subscriber::fmt::layer()).init();
	}
}

async fn create_user(
	pool: sqlx::SqlitePool,
	args: CreateUserArgs,
) -> Result<(), Box<dyn std::error::Error>> {
	let users = UserRepository::new(pool);
	let (token, token_hash) = generate_access_token();

	let record = users
		.create_user(
			NewUser {
				first_name: args.first_name,
				last_name: args.last_name,
				email: args.email,
				phone: args.phone,
				role: args.role,
			},
			&token_hash,
			&ActorId::SYSTEM,
		)
		.await?;

	tracing::info!(user_id = %record.user.id, role = %record.user.role, "user created");
	println!("Created user {} ({})", record.user.id, record.user.email);
	println!("Access token (shown once): {token}");
	Ok(())
}

async fn serve(pool: sqlx::SqlitePool, config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting vault-server"
	);

	let state = create_app_state(pool, config).await?;

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(cors_layer(&config.http.cors_origins));

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	// Run server with graceful shutdown
	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
	let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
	if origins.is_empty() {
		return layer.allow_origin(Any);
	}

	let origins: Vec<HeaderValue> = origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(e) => {
				tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
				None
			}
		})
		.collect();
	layer.allow_origin(AllowOrigin::list(origins))
}
