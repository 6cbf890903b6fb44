//! Jimeng CLI - generate images from the command line

use std::io::Write;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use jimeng_core::chat::{ChatAdapter, ChatMessage};
use jimeng_core::config::{Config, SESSION_TOKEN_ENV};
use jimeng_core::generation::{GenerationRequest, list_models};
use jimeng_core::identity::pick_token;
use jimeng_core::retry::RetryPolicy;
use jimeng_core::transport::JimengClient;
use jimeng_core::Error;
use tracing::debug;

/// Longest prompt accepted by `generate`
const MAX_PROMPT_CHARS: usize = 800;

/// Largest width or height accepted by `generate`
const MAX_DIMENSION: u32 = 1024;

#[derive(Parser)]
#[command(name = "jimeng")]
#[command(author, version, about = "Jimeng image generation client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Session token, or a comma-separated list to pick from
    /// (defaults to the JIMENG_SESSION_ID environment variable)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate images from a prompt
    Generate {
        /// Image description
        prompt: String,
        /// Model name (see `jimeng models`)
        #[arg(short, long)]
        model: Option<String>,
        #[arg(long, default_value_t = 1024)]
        width: u32,
        #[arg(long, default_value_t = 1024)]
        height: u32,
        /// Refinement strength, 0.0 to 1.0 (defaults to the configured value)
        #[arg(short, long)]
        sample_strength: Option<f64>,
        /// What the image should not contain
        #[arg(short, long, default_value = "")]
        negative_prompt: String,
    },

    /// Generate through the chat-completion adapter
    Chat {
        /// Message to send
        prompt: String,
        /// Model string, optionally with a size (jimeng-2.1:1280x720)
        #[arg(short, long, default_value = "jimeng-2.1")]
        model: String,
        /// Stream chunks as they are produced
        #[arg(long)]
        stream: bool,
    },

    /// Show the account credit balance
    Credit,

    /// Claim the daily free credit
    Claim,

    /// List available models
    Models,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all configuration values
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Show the config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let directive = if cli.verbose { "jimeng=debug" } else { "jimeng=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            prompt,
            model,
            width,
            height,
            sample_strength,
            negative_prompt,
        } => {
            let config = Config::load()?;
            let request = GenerationRequest::new(prompt)
                .with_model(model.unwrap_or_else(|| config.generation.default_model.clone()))
                .with_size(width, height)
                .with_sample_strength(sample_strength.unwrap_or(config.generation.sample_strength))
                .with_negative_prompt(negative_prompt);
            check_generate_args(&request)?;
            let token = resolve_token(cli.token.as_deref(), &config)?;
            cmd_generate(&config, &request, &token, cli.format).await
        }

        Commands::Chat {
            prompt,
            model,
            stream,
        } => {
            let config = Config::load()?;
            let token = resolve_token(cli.token.as_deref(), &config)?;
            cmd_chat(&config, &prompt, &model, stream, &token, cli.format).await
        }

        Commands::Credit => {
            let config = Config::load()?;
            let token = resolve_token(cli.token.as_deref(), &config)?;
            cmd_credit(&config, &token, cli.format).await
        }

        Commands::Claim => {
            let config = Config::load()?;
            let token = resolve_token(cli.token.as_deref(), &config)?;
            cmd_claim(&config, &token, cli.format).await
        }

        Commands::Models => cmd_models(cli.format),

        Commands::Config { action } => cmd_config(action, cli.format),
    }
}

/// Token from `--token` or the environment; a list yields one at random
fn resolve_token(flag: Option<&str>, config: &Config) -> anyhow::Result<String> {
    let raw = match flag {
        Some(value) => Some(value.to_string()),
        None => config.session_token()?,
    };
    raw.as_deref()
        .and_then(pick_token)
        .ok_or_else(|| {
            Error::invalid_params(format!(
                "No session token. Pass --token or set the {} environment variable.",
                SESSION_TOKEN_ENV
            ))
            .into()
        })
}

/// Argument checks done before any network call
fn check_generate_args(request: &GenerationRequest) -> Result<(), Error> {
    if request.prompt.trim().is_empty() {
        return Err(Error::invalid_params("Prompt must not be empty"));
    }
    if request.prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(Error::invalid_params(format!(
            "Prompt must be at most {} characters",
            MAX_PROMPT_CHARS
        )));
    }
    if !(0.0..=1.0).contains(&request.sample_strength) {
        return Err(Error::invalid_params("Sample strength must be between 0.0 and 1.0"));
    }
    if request.width == 0 || request.height == 0 {
        return Err(Error::invalid_params("Width and height must be positive"));
    }
    if request.width > MAX_DIMENSION || request.height > MAX_DIMENSION {
        return Err(Error::invalid_params(format!(
            "Width and height must be at most {}",
            MAX_DIMENSION
        )));
    }
    Ok(())
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_generate(
    config: &Config,
    request: &GenerationRequest,
    token: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let client = JimengClient::from_config(config)?;
    debug!(model = %request.model, width = request.width, height = request.height, "Generating");

    let urls = client.generate_images(request, token).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "urls": urls }))?);
        }
        OutputFormat::Text => {
            if urls.is_empty() {
                println!("No images returned.");
            }
            for url in urls {
                println!("{}", url);
            }
        }
    }
    Ok(())
}

async fn cmd_chat(
    config: &Config,
    prompt: &str,
    model: &str,
    stream: bool,
    token: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let client = JimengClient::from_config(config)?;
    let adapter = ChatAdapter::new(client).with_retry_policy(RetryPolicy::from(&config.retry));
    let messages = vec![ChatMessage::user(prompt)];

    if !stream {
        let completion = adapter.create_completion(&messages, model, token).await?;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&completion)?),
            OutputFormat::Text => print!("{}", completion.content().unwrap_or_default()),
        }
        return Ok(());
    }

    let mut chunks = std::pin::pin!(adapter.create_completion_stream(messages, model, token));
    let mut stdout = std::io::stdout();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        match format {
            OutputFormat::Json => writeln!(stdout, "{}", serde_json::to_string(&chunk)?)?,
            OutputFormat::Text => {
                let content = chunk.content().unwrap_or_default();
                write!(stdout, "{}", content)?;
                if !content.ends_with('\n') {
                    writeln!(stdout)?;
                }
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

async fn cmd_credit(config: &Config, token: &str, format: OutputFormat) -> anyhow::Result<()> {
    let client = JimengClient::from_config(config)?;
    let credit = client.get_credit(token).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&credit)?),
        OutputFormat::Text => {
            println!("Gift:     {}", credit.gift_credit);
            println!("Purchase: {}", credit.purchase_credit);
            println!("VIP:      {}", credit.vip_credit);
            println!("Total:    {}", credit.total_credit);
        }
    }
    Ok(())
}

async fn cmd_claim(config: &Config, token: &str, format: OutputFormat) -> anyhow::Result<()> {
    let client = JimengClient::from_config(config)?;
    client.receive_credit(token).await?;
    let credit = client.get_credit(token).await?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&credit)?),
        OutputFormat::Text => println!("Credit claimed. Total: {}", credit.total_credit),
    }
    Ok(())
}

fn cmd_models(format: OutputFormat) -> anyhow::Result<()> {
    let models = list_models();
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "object": "list", "data": models }))?
            );
        }
        OutputFormat::Text => {
            for model in models {
                println!("{:<16} {}", model.id, model.upstream_id);
            }
        }
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, format: OutputFormat) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            let items = config.list()?;
            match format {
                OutputFormat::Json => {
                    let map: serde_json::Map<String, serde_json::Value> = items
                        .into_iter()
                        .map(|(key, value)| (key, serde_json::Value::String(value)))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&map)?);
                }
                OutputFormat::Text => {
                    for (key, value) in items {
                        println!("{} = {}", key, value);
                    }
                }
            }
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}
