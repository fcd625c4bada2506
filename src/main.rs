use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use unicorn_maker::config::Config;
use unicorn_maker::crudcrud::http::CrudHttpClient;
use unicorn_maker::host::{self, DriveOptions, DEFAULT_MAX_INVOCATIONS};
use unicorn_maker::resource::{self, HandlerRequest, UnicornHandler};

/// Resource provider for Brianterry::Unicorn::Maker
#[derive(Parser, Debug)]
#[command(name = "unicorn-maker", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// crudcrud collection endpoint (overrides env and config)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Write logs to a file instead of stderr (`--log-file=PATH`, default path when no value)
    #[arg(long, global = true, num_args = 0..=1, require_equals = true)]
    log_file: Option<Option<PathBuf>>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one handler invocation and print the progress event
    Invoke {
        /// Handler request file (JSON or YAML), or - for stdin
        request: PathBuf,
    },
    /// Reinvoke the handler until it stops reporting IN_PROGRESS
    Drive {
        /// Handler request file (JSON or YAML), or - for stdin
        request: PathBuf,

        /// Give up after this many invocations
        #[arg(long, default_value_t = DEFAULT_MAX_INVOCATIONS)]
        max_invocations: u32,

        /// Wait this many seconds between invocations instead of the handler's hint
        #[arg(long)]
        delay_override: Option<u64>,
    },
    /// Print the resource type schema
    Schema,
    /// Store the crudcrud API id or endpoint in the config file
    Configure {
        #[arg(long)]
        api_id: Option<String>,

        #[arg(long = "set-endpoint")]
        set_endpoint: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Option<PathBuf>>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let Some(log_file) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        return Ok(None);
    };

    let log_path = log_file.clone().unwrap_or_else(get_log_path);

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("unicorn-maker started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("unicorn-maker").join("unicorn-maker.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".unicorn-maker").join("unicorn-maker.log");
    }
    PathBuf::from("unicorn-maker.log")
}

fn read_request(path: &Path) -> Result<HandlerRequest> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read handler request from stdin")?;
        return HandlerRequest::parse(&content, None);
    }
    HandlerRequest::load(path)
}

fn build_handler(config: &Config, endpoint: Option<&str>) -> Result<UnicornHandler<CrudHttpClient>> {
    let endpoint = config.effective_endpoint(endpoint)?;
    tracing::info!("Using endpoint: {}", endpoint);
    let http = CrudHttpClient::new(endpoint, &config.effective_user_agent())?;
    Ok(UnicornHandler::new(http))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_ref())?;

    let mut config = Config::load();

    match args.command {
        Command::Invoke { request } => {
            let request = read_request(&request)?;
            let handler = build_handler(&config, args.endpoint.as_deref())?;
            let event = resource::invoke(&handler, &request).await;
            print_json(&event)?;
        }
        Command::Drive {
            request,
            max_invocations,
            delay_override,
        } => {
            let request = read_request(&request)?;
            let handler = build_handler(&config, args.endpoint.as_deref())?;
            let options = DriveOptions {
                max_invocations,
                delay_override: delay_override.map(Duration::from_secs),
            };

            let mut print_error = None;
            host::drive(&handler, request, &options, |invocation, event| {
                tracing::debug!("Invocation {} finished", invocation);
                if let Err(e) = print_json(event) {
                    print_error.get_or_insert(e);
                }
            })
            .await?;

            if let Some(e) = print_error {
                return Err(e);
            }
        }
        Command::Schema => {
            print_json(&resource::schema_document())?;
        }
        Command::Configure {
            api_id,
            set_endpoint,
        } => {
            if api_id.is_none() && set_endpoint.is_none() {
                print_json(&config)?;
                return Ok(());
            }
            if let Some(api_id) = api_id {
                config.set_api_id(&api_id)?;
            }
            if let Some(endpoint) = set_endpoint {
                config.set_endpoint(&endpoint)?;
            }
            if let Some(path) = Config::config_path() {
                eprintln!("Saved {}", path.display());
            }
        }
    }

    Ok(())
}
