use ailocator::ai::GeminiClient;
use ailocator::ambient::OrbField;
use ailocator::arcgis::{ArcgisGeocoder, CredentialStore, FeatureLayer, IdentityManager};
use ailocator::config::{Config, ExtractionMode};
use ailocator::geometry::{harness, GeodesicBuffer};
use ailocator::intake;
use ailocator::workflow::{ActionOutcome, Pipeline, ProcessingLog, Session, WorkflowGate};
use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ailocator",
    version,
    about = "Read permit scans with a vision model, geocode, buffer and publish them as map features"
)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, env = "AILOCATOR_CONFIG")]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a dropped image, PDF or zip archive
    Process {
        /// File to process (only the first path is used)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        ai: AiArgs,

        #[command(flatten)]
        account: AccountArgs,

        /// Record shape to extract (permit or project)
        #[arg(long)]
        mode: Option<ExtractionMode>,

        /// Context appended to every geocode query, e.g. "Marion, IN"
        #[arg(long)]
        location: Option<String>,
    },
    /// Check that the AI key works
    CheckAi {
        #[command(flatten)]
        ai: AiArgs,
    },
    /// Sign in to the mapping platform and show the signed-in user
    SignIn {
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Buffer a fixed point and line and print their areas
    BufferTest {
        /// Buffer distance in meters
        #[arg(long, default_value_t = 10.0)]
        distance: f64,
    },
    /// Print frames of the background orb animation as JSON lines
    Orbs {
        #[arg(long, default_value_t = 1)]
        frames: usize,
        #[arg(long, default_value_t = 1280.0)]
        width: f64,
        #[arg(long, default_value_t = 720.0)]
        height: f64,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the JSON Schema of the config file
    Schema,
    /// Print the effective configuration as TOML
    Show,
}

#[derive(clap::Args, Debug)]
struct AiArgs {
    /// Generative-AI API key
    #[arg(long = "ai-key", env = "GEMINI_API_KEY", hide_env_values = true)]
    ai_key: Option<String>,
}

#[derive(clap::Args, Debug)]
struct AccountArgs {
    #[arg(long, env = "ARCGIS_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "ARCGIS_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

fn init_tracing(verbose: bool) {
    // progress lines already reach stdout through the log sink
    let default = if verbose {
        "ailocator=debug"
    } else {
        "ailocator=info,ailocator::log=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Process {
            paths,
            ai,
            account,
            mode,
            location,
        } => process(config, paths, ai, account, mode, location).await,
        Command::CheckAi { ai } => {
            let client = gemini(&config, &ai)?;
            let reply = client.check_key().await.context("AI key check failed")?;
            println!("{} {}", style("AI key OK:").green().bold(), reply);
            Ok(())
        }
        Command::SignIn { account } => {
            let identity = identity(&config)?;
            let credential = sign_in(&identity, account).await?;
            println!(
                "{}",
                style(format!(
                    "Signed into AGOL as {}",
                    credential.full_name.as_deref().unwrap_or(&credential.user_id)
                ))
                .green()
                .bold()
            );
            Ok(())
        }
        Command::BufferTest { distance } => {
            let areas = harness::run(distance)?;
            println!("{areas}");
            Ok(())
        }
        Command::Orbs {
            frames,
            width,
            height,
        } => {
            let mut field = OrbField::new(width, height);
            for _ in 0..frames {
                println!("{}", serde_json::to_string(&field.orbs)?);
                field.step();
            }
            Ok(())
        }
        Command::Config { action } => {
            match action {
                ConfigAction::Schema => println!("{}", Config::json_schema()?),
                ConfigAction::Show => print!("{}", config.to_toml()?),
            }
            Ok(())
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "ailocator", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn gemini(config: &Config, ai: &AiArgs) -> Result<GeminiClient> {
    let key = ai.ai_key.clone().unwrap_or_default();
    Ok(GeminiClient::new(config.http_client()?, &config.ai, key))
}

fn identity(config: &Config) -> Result<IdentityManager> {
    Ok(IdentityManager::new(
        config.http_client()?,
        &config.arcgis,
        CredentialStore::shared(),
    ))
}

/// Sign in with flags/env, prompting for whatever is missing.
async fn sign_in(
    identity: &IdentityManager,
    account: AccountArgs,
) -> Result<ailocator::arcgis::Credential> {
    let username = match account.username {
        Some(u) => u,
        None => dialoguer::Input::<String>::new()
            .with_prompt("ArcGIS username")
            .interact_text()
            .context("Failed to read username")?,
    };
    let password = match account.password {
        Some(p) => p,
        None => dialoguer::Password::new()
            .with_prompt("ArcGIS password")
            .interact()
            .context("Failed to read password")?,
    };
    eprintln!("{}", style("Signing in...").dim());
    match identity.sign_in(&username, &password).await {
        Ok(credential) => Ok(credential),
        Err(e) => {
            eprintln!("{}", style("Sign in failed. Please check your credentials.").red().bold());
            Err(e).context("Try Sign In Again")
        }
    }
}

async fn process(
    mut config: Config,
    paths: Vec<PathBuf>,
    ai: AiArgs,
    account: AccountArgs,
    mode: Option<ExtractionMode>,
    location: Option<String>,
) -> Result<()> {
    if let Some(mode) = mode {
        config.ai.mode = mode;
    }
    let paths: Vec<PathBuf> = paths
        .iter()
        .map(|p| intake::source::expand_path(&p.to_string_lossy()))
        .collect();
    let http = config.http_client()?;

    let gate = WorkflowGate::new(
        config.workflow.require_location_details,
        location.or_else(|| config.workflow.location_details.clone()),
    );
    let log = ProcessingLog::with_sink(|line| println!("{line}"));
    let mut session = Session::new(gate, log);

    // AI key
    let ai_client = GeminiClient::new(http.clone(), &config.ai, ai.ai_key.unwrap_or_default());
    let check = ai_client.check_key().await;
    match &check {
        Ok(reply) => eprintln!("{} {}", style("AI key OK:").green(), reply),
        Err(e) => eprintln!("{} {e}", style("Try Again Check Key:").red()),
    }
    session.record_ai_check(&check);

    // Sign in
    let identity = IdentityManager::new(http.clone(), &config.arcgis, CredentialStore::shared());
    session.begin_sign_in();
    let signed = sign_in(&identity, account).await;
    match signed {
        Ok(credential) => {
            session.record_sign_in(&Ok(credential));
            eprintln!("{}", style(session.session_button.label()).green());
        }
        Err(e) => {
            session.record_sign_in(&Err(ailocator::Error::SignIn(e.to_string())));
            eprintln!("{}", style(session.session_button.label()).red());
        }
    }

    // Intake
    let dropped = intake::accept_paths(&paths, &config.intake).await;
    let message = session.record_drop(dropped);
    eprintln!("{message}");
    for file in session.files() {
        eprintln!("  {}", file.name);
    }

    let buffer = GeodesicBuffer::new(config.buffer.distance_m)?;
    let pipeline = Pipeline::new(
        Arc::new(ai_client),
        Arc::new(ArcgisGeocoder::new(http.clone(), &config.arcgis.geocode_url)),
        Arc::new(FeatureLayer::new(http, &config.arcgis.feature_layer_url)),
        buffer,
    );

    let token = identity.token();
    match session.click_action(&pipeline, token.as_deref()).await {
        ActionOutcome::Ran(outcome) => {
            let summary = format!(
                "{}: {} published, {} skipped, {} failed",
                session.action.label(),
                outcome.published(),
                outcome.skipped(),
                outcome.failed()
            );
            if outcome.published() > 0 {
                eprintln!("{}", style(summary).green().bold());
                Ok(())
            } else {
                eprintln!("{}", style(&summary).yellow().bold());
                bail!("no feature was published")
            }
        }
        ActionOutcome::NotReady(missing) => bail!("cannot start: missing {}", missing.join(", ")),
        ActionOutcome::NoToken => bail!("Could not get AGOL token"),
        ActionOutcome::Cleared => Ok(()),
    }
}
