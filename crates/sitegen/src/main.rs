//! sitegen - AI website generator client

mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cli::CliError;
use indicatif::{ProgressBar, ProgressStyle};
use sitegen_core::pricing::{find_package, REDIRECT_DELAY};
use sitegen_core::preview::{export_to, write_sandbox_file};
use sitegen_core::storage::default_storage_path;
use sitegen_core::workflow::SUCCESS_NOTICE;
use sitegen_core::{
    format_tokens, Config, ConfigOverrides, EditWorkflow, GenerationWorkflow, PricingFlow, Route,
    Session, SitegenClient, TokenGate, TOKEN_PACKAGES,
};
use sitegen_tui::ColorScheme;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sitegen",
    version,
    about = "Generate websites from a prompt, in the terminal",
    long_about = "Describe a website, review the design plan, generate it, then refine it\n\
                  with plain-language edits. Every generation and edit spends tokens.\n\
                  \n\
                  Examples:\n\
                    sitegen                                   # Run TUI (default)\n\
                    sitegen login --id-token \"$ID_TOKEN\"       # Sign in\n\
                    sitegen balance                           # Show token balance\n\
                    sitegen generate \"A portfolio for a wildlife photographer\"\n\
                    sitegen show <ID> --download              # Save website-<ID>.html\n\
                    sitegen edit <ID> \"Make the header sticky\"\n\
                    sitegen packages                          # List token packages\n\
                    sitegen buy pro                           # Buy the Professional package\n\
                  \n\
                  Environment Variables:\n\
                    SITEGEN_API_URL                           # Backend base URL\n\
                    SITEGEN_AUTH_URL                          # Sign-in service base URL\n\
                    SITEGEN_REFRESH_SECS                      # Balance polling interval\n\
                    SITEGEN_STORAGE                           # Session storage file\n\
                    SITEGEN_NO_COLOR                          # Disable ANSI colors\n\
                    RUST_LOG                                  # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Backend base URL (default: http://localhost:5000)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Sign-in service base URL (default: same as the backend)
    #[arg(long, global = true)]
    auth_url: Option<String>,

    /// Session storage file (default: <data dir>/sitegen/storage.json)
    #[arg(long, global = true, env = "SITEGEN_STORAGE")]
    storage: Option<PathBuf>,

    /// Directory holding config.toml (default: <config dir>/sitegen)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Where downloaded websites are written
    #[arg(long, global = true)]
    download_dir: Option<PathBuf>,

    /// Log at info level (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, global = true, env = "SITEGEN_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Run TUI interface (default)
    Tui {
        /// Light color scheme
        #[arg(long)]
        light: bool,
        /// Start route, e.g. /generate or /preview/<ID>
        #[arg(long, default_value = "/")]
        route: String,
    },
    /// Sign in with a Google ID token
    Login {
        /// ID token (read from stdin when omitted)
        #[arg(long, env = "SITEGEN_ID_TOKEN")]
        id_token: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current token balance
    Balance {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyze a prompt and generate a website
    Generate {
        /// What the website should be
        prompt: String,
        /// Generate without asking for confirmation after the plan
        #[arg(long, short = 'y')]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Open the result in a browser
        #[arg(long)]
        open: bool,
    },
    /// Show a generated website
    Show {
        /// Website ID
        website_id: String,
        /// Print the markup
        #[arg(long)]
        code: bool,
        /// Save the markup as website-<ID>.html in the download directory
        #[arg(long)]
        download: bool,
        /// Copy the markup to the clipboard
        #[arg(long)]
        copy: bool,
        /// Open the website in a browser (sandboxed)
        #[arg(long)]
        open: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply a plain-language edit to a website
    Edit {
        /// Website ID
        website_id: String,
        /// What to change
        instruction: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List token packages
    Packages {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Buy a token package
    Buy {
        /// Package ID (see `sitegen packages`)
        package: String,
        /// Where to continue afterwards
        #[arg(long)]
        return_to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(hint) = e.suggestion() {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mode = cli.mode.unwrap_or(Mode::Tui {
        light: false,
        route: "/".to_string(),
    });
    let tui = matches!(mode, Mode::Tui { .. });
    init_tracing(cli.verbose, tui)?;

    // Packages are static; no backend needed
    if let Mode::Packages { json } = mode {
        println!(
            "{}",
            cli::format_packages_table(&TOKEN_PACKAGES, json, cli.no_color)
        );
        return Ok(());
    }

    let config_dir = cli.config_dir.or_else(Config::default_dir);
    let config = Config::load(
        config_dir.as_deref(),
        ConfigOverrides {
            api_url: cli.api_url,
            auth_url: cli.auth_url,
            download_dir: cli.download_dir,
        },
    )?;
    let storage = cli
        .storage
        .or_else(default_storage_path)
        .context("Could not determine data directory, pass --storage")?;
    let client = SitegenClient::open(config, &storage)?;
    let no_color = cli.no_color;

    match mode {
        Mode::Tui { light, route } => run_tui(client, light, &route).await,
        Mode::Login { id_token } => run_login(client, id_token).await,
        Mode::Logout => run_logout(client),
        Mode::Whoami { json } => run_whoami(client, json).await,
        Mode::Balance { json } => run_balance(client, json).await,
        Mode::Generate {
            prompt,
            yes,
            json,
            open,
        } => run_generate(client, prompt, yes, json, open, no_color).await,
        Mode::Show {
            website_id,
            code,
            download,
            copy,
            open,
            json,
        } => run_show(client, website_id, code, download, copy, open, json).await,
        Mode::Edit {
            website_id,
            instruction,
            json,
        } => run_edit(client, website_id, instruction, json).await,
        Mode::Buy { package, return_to } => run_buy(client, package, return_to).await,
        Mode::Packages { .. } => Ok(()),
    }
}

/// EnvFilter defaults to `warn` (`info` with --verbose). The TUI owns the
/// terminal, so its logs go to `<cache dir>/sitegen/sitegen.log`.
fn init_tracing(verbose: bool, tui: bool) -> anyhow::Result<()> {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if tui {
        let dir = dirs::cache_dir()
            .context("Could not determine cache directory")?
            .join("sitegen");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join("sitegen.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn spinner(message: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    spinner
}

fn require_session(client: &SitegenClient) -> Result<Session, CliError> {
    client.session().current().ok_or(CliError::NotSignedIn)
}

fn read_line(prompt: &str) -> Result<String, CliError> {
    eprint!("{}", prompt);
    io::stderr().flush().context("Failed to write prompt")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line)
}

async fn run_tui(client: SitegenClient, light: bool, route: &str) -> Result<(), CliError> {
    let route = Route::parse(route)?;
    let scheme = if light {
        ColorScheme::Light
    } else {
        ColorScheme::Dark
    };
    sitegen_tui::run(client, scheme, route).await?;
    Ok(())
}

async fn run_login(client: SitegenClient, id_token: Option<String>) -> Result<(), CliError> {
    let id_token = match id_token {
        Some(token) => token,
        None => read_line("Paste your Google ID token: ")?,
    };

    let sp = spinner("Signing in...", false);
    let session = match client.sign_in(id_token.trim()).await {
        Ok(session) => session,
        Err(e) => {
            sp.finish_and_clear();
            return Err(e.into());
        }
    };
    let balance = client.refresh_balance().await.ok().flatten();
    sp.finish_and_clear();

    println!("✓ Signed in as {}", session.user.display_name());
    if let Some(balance) = balance {
        println!("  Balance: {} tokens", format_tokens(balance));
    }
    Ok(())
}

fn run_logout(client: SitegenClient) -> Result<(), CliError> {
    if client.session().current().is_none() {
        println!("Not signed in");
        return Ok(());
    }
    client.logout()?;
    println!("✓ Signed out");
    Ok(())
}

async fn run_whoami(client: SitegenClient, json: bool) -> Result<(), CliError> {
    let session = require_session(&client)?;
    if let Err(e) = client.refresh_balance().await {
        tracing::warn!(error = %e, "Balance unavailable");
    }
    println!(
        "{}",
        cli::format_account(&session, client.balance().known(), json)
    );
    Ok(())
}

async fn run_balance(client: SitegenClient, json: bool) -> Result<(), CliError> {
    require_session(&client)?;
    client.refresh_balance().await?;
    let balance = client.balance().known();

    if json {
        println!("{}", serde_json::json!({ "tokenBalance": balance }));
    } else {
        match balance {
            Some(raw) => println!("{} tokens", format_tokens(raw)),
            None => println!("Balance unavailable"),
        }
    }
    Ok(())
}

async fn run_generate(
    client: SitegenClient,
    prompt: String,
    yes: bool,
    json: bool,
    open: bool,
    no_color: bool,
) -> Result<(), CliError> {
    require_session(&client)?;
    let mut workflow = GenerationWorkflow::new(TokenGate::default());
    workflow.set_prompt(prompt);

    let sp = spinner("Checking token balance...", json);
    let analyzed = async {
        client.refresh_balance().await?;
        sp.set_message("Analyzing your prompt...");
        workflow
            .analyze(client.backend(), client.session(), client.balance())
            .await
    }
    .await;
    sp.finish_and_clear();
    analyzed?;

    if let Some(plan) = workflow.plan() {
        if !json {
            println!("{}", cli::format_plan(plan, false, no_color));
        }
    }

    if !yes && !json {
        let answer = read_line(&format!(
            "Generate this website? Balance: {} tokens [Y/n] ",
            format_tokens(client.balance().current())
        ))?;
        if !cli::parse_confirmation(&answer) {
            return Err(CliError::Cancelled);
        }
    }

    let sp = spinner("Generating your website...", json);
    let generated = workflow
        .generate(client.backend(), client.session(), client.balance())
        .await;
    sp.finish_and_clear();
    let route = generated?;

    let website_id = workflow.website_id().unwrap_or_default().to_string();
    if json {
        let value = serde_json::json!({
            "websiteId": website_id,
            "route": route.path(),
            "plan": workflow.plan(),
            "tokenBalance": client.balance().known(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!("✓ Website generated: {}", website_id);
        println!("  Preview: sitegen show {} --open", website_id);
        println!(
            "  Balance: {} tokens",
            format_tokens(client.balance().current())
        );
    }

    if open {
        let artifact = client.backend().fetch_website(&website_id).await?;
        open_sandboxed(&artifact)?;
    }
    Ok(())
}

async fn run_show(
    client: SitegenClient,
    website_id: String,
    code: bool,
    download: bool,
    copy: bool,
    open: bool,
    json: bool,
) -> Result<(), CliError> {
    require_session(&client)?;
    let sp = spinner("Loading website...", json);
    let fetched = client.backend().fetch_website(&website_id).await;
    sp.finish_and_clear();
    let artifact = fetched?;

    if code {
        println!("{}", artifact.code);
    } else {
        println!("{}", cli::format_website_info(&artifact, json));
    }

    if download {
        let path = export_to(&client.config().download_dir, &artifact)?;
        eprintln!("✓ Saved {}", path.display());
    }
    if copy {
        let mut clipboard = arboard::Clipboard::new().context("Clipboard unavailable")?;
        clipboard
            .set_text(artifact.code.clone())
            .context("Failed to copy to clipboard")?;
        eprintln!("✓ Copied!");
    }
    if open {
        open_sandboxed(&artifact)?;
    }
    Ok(())
}

async fn run_edit(
    client: SitegenClient,
    website_id: String,
    instruction: String,
    json: bool,
) -> Result<(), CliError> {
    require_session(&client)?;

    let sp = spinner("Loading website...", json);
    let loaded = async {
        client.refresh_balance().await?;
        client.backend().fetch_website(&website_id).await
    }
    .await;
    let mut artifact = match loaded {
        Ok(artifact) => artifact,
        Err(e) => {
            sp.finish_and_clear();
            return Err(e.into());
        }
    };

    let mut workflow = EditWorkflow::new(TokenGate::default());
    let submitted = match workflow.open(client.balance().current()) {
        Ok(()) => {
            workflow.set_instruction(instruction);
            sp.set_message("Applying changes...");
            workflow
                .submit(
                    client.backend(),
                    client.session(),
                    client.balance(),
                    &mut artifact,
                )
                .await
        }
        Err(e) => Err(e),
    };
    sp.finish_and_clear();
    let outcome = submitted?;

    if json {
        let value = serde_json::json!({
            "websiteId": artifact.id,
            "persisted": outcome.persisted,
            "code": artifact.code,
            "tokenBalance": client.balance().known(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
        );
        return Ok(());
    }

    println!("✓ {}", SUCCESS_NOTICE);
    println!(
        "  Balance: {} tokens",
        format_tokens(client.balance().current())
    );
    Ok(())
}

async fn run_buy(
    client: SitegenClient,
    package: String,
    return_to: Option<String>,
) -> Result<(), CliError> {
    require_session(&client)?;
    find_package(&package)?;

    let mut flow = PricingFlow::new(client.store(), return_to.as_deref());
    let sp = spinner("Processing...", false);
    let purchased = flow
        .purchase(
            client.backend(),
            client.session(),
            client.event_bus(),
            &package,
        )
        .await;
    let bought_at = Instant::now();
    let refreshed = match &purchased {
        Ok(_) => client.refresh_balance().await.ok().flatten(),
        Err(_) => None,
    };
    sp.finish_and_clear();
    let bought = purchased?;

    println!("✓ {}", bought.success_message());
    if let Some(balance) = refreshed {
        println!("  Balance: {} tokens", format_tokens(balance));
    }
    if let Some(next) = flow.redirect_due(bought_at + REDIRECT_DELAY) {
        println!("  Continue at: {}", next);
    }
    Ok(())
}

fn open_sandboxed(artifact: &sitegen_types::WebsiteArtifact) -> Result<(), CliError> {
    let path = write_sandbox_file(artifact)?;
    open::that(&path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(())
}
