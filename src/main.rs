use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aicoder::config::Config;
use aicoder::core::{GenerationRequest, Orchestrator};
use aicoder::panel::{PanelBridge, PanelEvent};
use aicoder::tui;

#[derive(Parser)]
#[command(name = "aicoder")]
#[command(author, version, about = "AI code generation panel with streaming responses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive assistant panel (default)
    Panel,

    /// One-shot generation, streaming the response to stdout
    Generate {
        /// The prompt to generate code from
        prompt: String,

        /// Files whose contents are bundled with the prompt (repeatable)
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// Print the standalone PROMPT/MODEL/RESPONSE document afterwards
        #[arg(long)]
        doc: bool,

        /// Provider override for this invocation (openai, anthropic)
        #[arg(short, long)]
        provider: Option<String>,

        /// Model override for this invocation
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Persist provider/model/max-tokens selections to the config file
    Use {
        /// Provider to switch to (openai, anthropic)
        #[arg(long)]
        provider: Option<String>,

        /// Model for the active (or just-selected) provider
        #[arg(long)]
        model: Option<String>,

        /// Max-output-token budget
        #[arg(long)]
        max_tokens: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; the panel owns the terminal, so logs go to stderr
    let filter = if cli.verbose {
        "aicoder=debug"
    } else {
        "aicoder=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command.unwrap_or(Commands::Panel) {
        Commands::Panel => {
            let config = Config::load()?;
            tracing::info!(provider = %config.provider, "starting assistant panel");
            tui::run(config).await?;
        }
        Commands::Generate {
            prompt,
            files,
            doc,
            provider,
            model,
        } => {
            run_generate(prompt, files, doc, provider, model).await?;
        }
        Commands::Use {
            provider,
            model,
            max_tokens,
        } => {
            run_use(provider, model, max_tokens)?;
        }
    }

    Ok(())
}

/// One-shot generation: deltas stream to stdout as they arrive
async fn run_generate(
    prompt: String,
    files: Vec<PathBuf>,
    doc: bool,
    provider: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(p) = provider {
        config.provider = p;
    }
    if let Some(m) = model {
        match config.provider.to_lowercase().as_str() {
            "anthropic" | "claude" => config.anthropic.model = m,
            _ => config.openai.model = m,
        }
    }

    let (bridge, mut rx) = PanelBridge::channel();
    let printer = tokio::spawn(async move {
        use std::io::Write;
        let mut out = std::io::stdout();
        while let Some(event) = rx.recv().await {
            if let PanelEvent::ResponseDelta { text, .. } = event {
                let _ = write!(out, "{text}");
                let _ = out.flush();
            }
        }
    });

    let orchestrator = Orchestrator::new(bridge);
    let request = GenerationRequest::new(prompt).with_files(files);
    let result = orchestrator.generate(request, config.active()).await;

    // Dropping the orchestrator closes the bridge and ends the printer
    drop(orchestrator);
    let _ = printer.await;

    let outcome = result?;
    println!();
    if doc {
        println!("{}", outcome.document());
    }
    Ok(())
}

/// Persist configuration selections, mirroring the panel's settings flow
fn run_use(
    provider: Option<String>,
    model: Option<String>,
    max_tokens: Option<usize>,
) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(p) = &provider {
        config.provider = p.clone();
        println!("Switched to the '{p}' provider.");
    }
    if let Some(m) = &model {
        match config.provider.to_lowercase().as_str() {
            "anthropic" | "claude" => config.anthropic.model = m.clone(),
            "openai" => config.openai.model = m.clone(),
            other => anyhow::bail!("No settings table for provider '{other}'"),
        }
        println!("Switched to the '{m}' model.");
    }
    if let Some(t) = max_tokens {
        config.max_tokens = t;
        println!("Switched to '{t}' max tokens.");
    }

    config.save()?;
    println!("Saved {}", Config::config_path()?.display());
    Ok(())
}
