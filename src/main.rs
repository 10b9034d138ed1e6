use clap::{Args, Parser, Subcommand};
use papyrus_ocr::batch::{self, BatchOptions};
use papyrus_ocr::config::Config;
use papyrus_ocr::preprocessing::PreprocessOptions;
use papyrus_ocr::recognizers::RecognizerRegistry;
use papyrus_ocr::server;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "papyrus-ocr")]
#[command(about = "OCR preparation pipeline for scanned documents")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP extraction service
    Serve(ServeArgs),
    /// Process every image in a directory
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Host address to bind to
    #[arg(long, env = "OCR_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "OCR_PORT", default_value = "9292")]
    port: u16,

    /// Default language for OCR (e.g., "eng", "deu", "fra")
    #[arg(long, env = "OCR_DEFAULT_LANGUAGE", default_value = "eng")]
    default_language: String,

    /// Maximum upload size in bytes (default: 50MB)
    #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value = "52428800")]
    max_file_size: usize,

    /// Path to tessdata directory (uses TESSDATA_PREFIX env var if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    tessdata_path: Option<String>,

    /// Correct page skew before binarization
    #[arg(long, env = "OCR_DESKEW")]
    deskew: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Directory of raw scans to process
    #[arg(long)]
    input_dir: PathBuf,

    /// Root directory for the four artifact directories
    #[arg(long)]
    output_dir: PathBuf,

    /// Language for OCR (e.g., "eng", "deu", "fra")
    #[arg(long, env = "OCR_DEFAULT_LANGUAGE", default_value = "eng")]
    language: String,

    /// Path to tessdata directory (uses TESSDATA_PREFIX env var if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    tessdata_path: Option<String>,

    /// Correct page skew before binarization
    #[arg(long, env = "OCR_DESKEW")]
    deskew: bool,
}

impl From<ServeArgs> for Config {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            default_language: args.default_language,
            max_file_size: args.max_file_size,
            tessdata_path: args.tessdata_path,
            preprocess: PreprocessOptions {
                deskew: args.deskew,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Command::Serve(args) => {
            let config = Config::from(args);

            tracing::info!("Starting papyrus-ocr v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("Binding to {}:{}", config.host, config.port);

            server::run(config).await
        }
        Command::Batch(args) => {
            let config = Config::for_batch(&args.language, args.tessdata_path.clone(), args.deskew);
            let registry = RecognizerRegistry::new(&config)?;
            let recognizer = registry
                .default()
                .ok_or_else(|| anyhow::anyhow!("no default recognizer"))?;

            let options = BatchOptions {
                input_dir: args.input_dir,
                output_dir: args.output_dir,
                language: args.language,
                preprocess: config.preprocess,
            };

            let summary = batch::run(recognizer, &options)?;
            tracing::info!(
                "Done: {} processed, {} skipped",
                summary.processed,
                summary.skipped
            );
            Ok(())
        }
    }
}
