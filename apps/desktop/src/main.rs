use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    forms::{ForgotPasswordForm, LoginForm, RegisterForm},
    nav::{NavMenu, NavView},
    AuthClient, SessionStore, AUTH_TOKEN_KEY,
};
use serde::Deserialize;
use storage::{Storage, TokenStore};

#[derive(Parser, Debug)]
#[command(name = "storefront", about = "Storefront account client")]
struct Args {
    /// Base URL of the storefront API.
    #[arg(long)]
    server_url: Option<String>,
    /// Optional TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// SQLite URL for the legacy token store.
    #[arg(long)]
    token_db: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the navigation state for the current session.
    Status,
    /// Sign in with an email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and establish its session.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        accept_terms: bool,
    },
    /// Ask the server to send a password reset link.
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// End the current session.
    Logout,
}

#[derive(Debug, Deserialize)]
struct AppConfig {
    server_url: String,
    token_db: Option<String>,
}

/// Defaults, then the optional config file, then `STOREFRONT_*` environment
/// variables, then command-line flags.
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut builder =
        config::Config::builder().set_default("server_url", "http://localhost:3000")?;
    if let Some(path) = &args.config {
        builder = builder.add_source(config::File::from(path.clone()));
    }
    builder = builder.add_source(config::Environment::with_prefix("STOREFRONT"));
    let mut cfg: AppConfig = builder.build()?.try_deserialize()?;
    if let Some(server_url) = &args.server_url {
        cfg.server_url = server_url.clone();
    }
    if let Some(token_db) = &args.token_db {
        cfg.token_db = Some(token_db.clone());
    }
    Ok(cfg)
}

fn default_token_db() -> String {
    let base = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    let path = base.join("storefront").join("auth.db");
    format!("sqlite://{}", path.to_string_lossy().replace('\\', "/"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let cfg = load_config(&args)?;
    let token_db = cfg.token_db.clone().unwrap_or_else(default_token_db);

    let storage = Arc::new(
        Storage::new(&token_db)
            .await
            .with_context(|| format!("failed to open token store at {token_db}"))?,
    );
    let session = Arc::new(SessionStore::new());
    let client = AuthClient::new_with_token_store(
        cfg.server_url.clone(),
        Arc::clone(&session),
        Arc::clone(&storage) as Arc<dyn TokenStore>,
    )?;

    match args.command {
        Command::Status => {
            let mut menu = NavMenu::new(Arc::clone(&session), None);
            menu.ensure_fresh(&client).await;
            match menu.view().await {
                NavView::Account { first_name } => println!("Signed in as {first_name}."),
                NavView::Guest => {
                    println!("Browsing as a guest. Sign In or Create Account to continue.");
                }
            }
            if let Some(record) = storage.load_token_record(AUTH_TOKEN_KEY).await? {
                println!("Legacy token on file since {}.", record.stored_at);
            }
        }
        Command::Login { email, password } => {
            let mut form = LoginForm::default();
            form.email = email;
            form.password = password;
            if form.submit(&client).await {
                match session.snapshot().await.user() {
                    Some(user) => println!("Welcome back, {}.", user.first_name),
                    None => println!("Signed in."),
                }
            } else if let Some(error) = form.error() {
                println!("{error}");
            }
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
            accept_terms,
        } => {
            let mut form = RegisterForm::default();
            form.name = name;
            form.email = email;
            form.password = password;
            form.confirm_password = confirm_password;
            form.terms_accepted = accept_terms;
            if form.submit(&client).await {
                match session.snapshot().await.user() {
                    Some(user) => println!("Account created. Welcome, {}.", user.first_name),
                    None => println!("Account created."),
                }
            } else if let Some(error) = form.error() {
                println!("{error}");
            }
        }
        Command::ForgotPassword { email } => {
            let mut form = ForgotPasswordForm::default();
            form.email = email;
            form.submit(&client).await;
            if let Some(message) = form.message() {
                println!("{message}");
            }
            if let Some(error) = form.error() {
                println!("{error}");
            }
        }
        Command::Logout => {
            let mut menu = NavMenu::new(Arc::clone(&session), None);
            menu.log_out(&client).await;
            println!("Signed out.");
        }
    }

    Ok(())
}
