//! specbench CLI
//!
//! # Commands
//!
//! - `download` - Mirror the draft and target models from the HuggingFace Hub
//! - `generate` - Load one generator and run a single prompt
//! - `benchmark` - Run the baseline vs speculative benchmark and write reports
//! - `demo` - Open the interactive demo window
//! - `init-config` - Write the default settings file

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use specbench::{
    app::{App, DemoContext},
    benchmark::{self, prompts::SMOKE_TEST_PROMPT, report, FailurePolicy},
    demo::DemoService,
    error::{Error, Result},
    inference::{DecodingMode, EngineGenerator, Generator},
    logging,
    storage::{
        huggingface::{self, HuggingFaceHub},
        settings::{load_settings, save_settings, HarnessSettings},
    },
};

/// Baseline vs speculative decoding benchmark and demo
#[derive(Parser)]
#[command(name = "specbench")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to the platform data directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror the draft and target models into the models directory
    Download {
        /// Models root (overrides the settings file)
        #[arg(long)]
        models_dir: Option<PathBuf>,

        /// Draft repository (owner/name or huggingface.co URL)
        #[arg(long)]
        draft_repo: Option<String>,

        /// Target repository (owner/name or huggingface.co URL)
        #[arg(long)]
        target_repo: Option<String>,
    },
    /// Load one generator and run a single prompt
    Generate {
        #[arg(short, long, value_enum, default_value = "speculative")]
        mode: ModeArg,

        /// Prompt content (a short smoke-test prompt if omitted)
        #[arg(value_name = "PROMPT")]
        prompt: Option<String>,

        /// Maximum tokens to generate
        #[arg(short = 'n', long)]
        max_tokens: Option<u32>,
    },
    /// Run every benchmark prompt through both generators
    Benchmark {
        /// Record failed prompts and keep going instead of aborting
        #[arg(long)]
        keep_going: bool,

        /// Report directory (overrides the settings file)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Open the interactive demo window
    Demo,
    /// Write the default settings to the settings file
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Baseline,
    Speculative,
}

impl From<ModeArg> for DecodingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Baseline => DecodingMode::Baseline,
            ModeArg::Speculative => DecodingMode::Speculative,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = load_settings(cli.config.as_deref());

    let result = match cli.command {
        // The desktop runtime owns its own tokio runtime
        Commands::Demo => {
            run_demo(settings);
            Ok(())
        }
        Commands::Download {
            models_dir,
            draft_repo,
            target_repo,
        } => block_on(download(settings, models_dir, draft_repo, target_repo)),
        Commands::Generate {
            mode,
            prompt,
            max_tokens,
        } => block_on(generate(settings, mode.into(), prompt, max_tokens)),
        Commands::Benchmark {
            keep_going,
            output_dir,
        } => block_on(run_benchmark(settings, keep_going, output_dir)),
        Commands::InitConfig { force } => init_config(cli.config, force),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn block_on(future: impl Future<Output = Result<()>>) -> Result<()> {
    tokio::runtime::Runtime::new()?.block_on(future)
}

async fn download(
    mut settings: HarnessSettings,
    models_dir: Option<PathBuf>,
    draft_repo: Option<String>,
    target_repo: Option<String>,
) -> Result<()> {
    if let Some(dir) = models_dir {
        settings.set_models_dir(dir);
    }
    let mut artifacts = huggingface::default_artifacts(&settings.models_dir);
    if let Some(repo) = draft_repo {
        artifacts[0].repo_id = huggingface::parse_repo_id(&repo)?;
    }
    if let Some(repo) = target_repo {
        artifacts[1].repo_id = huggingface::parse_repo_id(&repo)?;
    }

    let hub = HuggingFaceHub::from_env()?;
    let outcomes = huggingface::download_models(&hub, &artifacts).await;
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        return Err(Error::Download {
            failed,
            total: outcomes.len(),
        });
    }
    println!("\n✅ All models downloaded to {}", settings.models_dir.display());
    Ok(())
}

async fn generate(
    mut settings: HarnessSettings,
    mode: DecodingMode,
    prompt: Option<String>,
    max_tokens: Option<u32>,
) -> Result<()> {
    if let Some(n) = max_tokens {
        settings.sampling.max_tokens = n;
    }
    settings.sampling.validate()?;

    let engine = match mode {
        DecodingMode::Baseline => settings.baseline.clone(),
        DecodingMode::Speculative => settings.speculative.clone(),
    };
    let generator = EngineGenerator::load(engine, settings.sampling.clone()).await?;

    let prompt = prompt.unwrap_or_else(|| SMOKE_TEST_PROMPT.to_string());
    println!("\nTesting {} generator...", mode);
    let result = generator.generate(&prompt).await?;

    print!("{}", report::format_generation_result(&result));
    Ok(())
}

async fn run_benchmark(
    mut settings: HarnessSettings,
    keep_going: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    if let Some(dir) = output_dir {
        settings.output_dir = dir;
    }
    let policy = if keep_going {
        FailurePolicy::Capture
    } else {
        FailurePolicy::Abort
    };
    benchmark::run_comprehensive_benchmark(&settings, policy).await?;
    Ok(())
}

fn init_config(config: Option<PathBuf>, force: bool) -> Result<()> {
    let target = match config {
        Some(path) => path,
        None => specbench::storage::settings::get_settings_path()?,
    };
    if target.exists() && !force {
        println!("Settings file already exists: {}", target.display());
        return Ok(());
    }
    let path = save_settings(&HarnessSettings::default(), Some(&target))?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}

fn run_demo(settings: HarnessSettings) {
    println!("\n{}", "=".repeat(70));
    println!("🌐 Launching Qwen 2.5 AI Response Accelerator Demo");
    println!("{}", "=".repeat(70));
    println!("🚀 Models will be loaded on first use to optimize memory...");

    let context = DemoContext {
        service: Arc::new(DemoService::from_settings(&settings)),
        settings,
    };

    let window = dioxus::desktop::WindowBuilder::new()
        .with_title("Qwen 2.5 AI Response Accelerator")
        .with_inner_size(dioxus::desktop::LogicalSize::new(1200.0, 860.0));

    dioxus::LaunchBuilder::desktop()
        .with_cfg(dioxus::desktop::Config::new().with_window(window))
        .with_context(context)
        .launch(App);
}
