/// Version injected at compile time via GCP2TF_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("GCP2TF_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gcp2tf::config::Config;
use gcp2tf::gcp::auth::{GcpCredentials, ACCESS_TOKEN_ENV};
use gcp2tf::gcp::client::{Endpoints, GcpClient};
use gcp2tf::resource::{self, ResourceDef};
use gcp2tf::{ExportError, ExportReport, PipelineContext, Scope};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Generate Terraform configuration from live GCP resources
#[derive(Parser, Debug)]
#[command(name = "gcp2tf", version = VERSION, about, long_about = None)]
struct Args {
    /// GCP project to read from
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// Region used for regional paths
    #[arg(short, long, global = true)]
    region: Option<String>,

    /// Zone used for zonal paths
    #[arg(short, long, global = true)]
    zone: Option<String>,

    /// OAuth access token to use instead of Application Default Credentials
    #[arg(long, global = true, env = ACCESS_TOKEN_ENV, hide_env_values = true)]
    access_token: Option<String>,

    /// Write the configuration to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Write `terraform import` commands to this file
    #[arg(long, global = true)]
    imports: Option<PathBuf>,

    /// Maximum number of detail calls in flight
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Items requested per page
    #[arg(long, global = true)]
    page_size: Option<u32>,

    /// Base URL replacing every Google API endpoint
    #[arg(long, global = true)]
    api_endpoint: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Log file to use instead of the default location
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every resource kind that can be exported
    Kinds,
    /// Manage the config file
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Compute Engine instances and disks
    #[command(subcommand)]
    Compute(ComputeCommand),
    /// VPC networking
    #[command(subcommand)]
    Network(NetworkCommand),
    /// Service accounts and custom roles
    #[command(subcommand)]
    Iam(IamCommand),
    /// Cloud Storage
    #[command(subcommand)]
    Storage(StorageCommand),
    /// Cloud DNS
    #[command(subcommand)]
    Dns(DnsCommand),
    /// Load balancing
    #[command(subcommand)]
    Lb(LbCommand),
    /// Instance templates, managed instance groups and autoscalers
    #[command(subcommand)]
    Autoscaling(AutoscalingCommand),
}

#[derive(Subcommand, Debug)]
enum ComputeCommand {
    Instances,
    Disks,
}

#[derive(Subcommand, Debug)]
enum NetworkCommand {
    Networks,
    Subnetworks,
    Firewalls,
    Routes,
}

#[derive(Subcommand, Debug)]
enum IamCommand {
    ServiceAccounts,
    Roles,
}

#[derive(Subcommand, Debug)]
enum StorageCommand {
    Buckets,
}

#[derive(Subcommand, Debug)]
enum DnsCommand {
    Zones,
    RecordSets {
        /// Managed zone whose record sets are exported
        #[arg(long)]
        managed_zone: String,
    },
}

#[derive(Subcommand, Debug)]
enum LbCommand {
    HealthChecks,
    BackendServices,
    ForwardingRules,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a config file from the current flags and gcloud defaults
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum AutoscalingCommand {
    InstanceTemplates,
    InstanceGroupManagers,
    Autoscalers,
}

/// Resource kind selected on the command line
#[derive(Debug, PartialEq, Eq)]
struct Target {
    family: &'static str,
    command: &'static str,
    params: Vec<(&'static str, String)>,
}

impl Target {
    fn new(family: &'static str, command: &'static str) -> Self {
        Self {
            family,
            command,
            params: Vec::new(),
        }
    }
}

impl Command {
    /// `None` for commands that do not export anything
    fn target(&self) -> Option<Target> {
        let target = match self {
            Command::Kinds | Command::Config(_) => return None,
            Command::Compute(c) => match c {
                ComputeCommand::Instances => Target::new("compute", "instances"),
                ComputeCommand::Disks => Target::new("compute", "disks"),
            },
            Command::Network(c) => match c {
                NetworkCommand::Networks => Target::new("network", "networks"),
                NetworkCommand::Subnetworks => Target::new("network", "subnetworks"),
                NetworkCommand::Firewalls => Target::new("network", "firewalls"),
                NetworkCommand::Routes => Target::new("network", "routes"),
            },
            Command::Iam(c) => match c {
                IamCommand::ServiceAccounts => Target::new("iam", "service-accounts"),
                IamCommand::Roles => Target::new("iam", "roles"),
            },
            Command::Storage(StorageCommand::Buckets) => Target::new("storage", "buckets"),
            Command::Dns(c) => match c {
                DnsCommand::Zones => Target::new("dns", "zones"),
                DnsCommand::RecordSets { managed_zone } => Target {
                    params: vec![("managed_zone", managed_zone.clone())],
                    ..Target::new("dns", "record-sets")
                },
            },
            Command::Lb(c) => match c {
                LbCommand::HealthChecks => Target::new("lb", "health-checks"),
                LbCommand::BackendServices => Target::new("lb", "backend-services"),
                LbCommand::ForwardingRules => Target::new("lb", "forwarding-rules"),
            },
            Command::Autoscaling(c) => match c {
                AutoscalingCommand::InstanceTemplates => {
                    Target::new("autoscaling", "instance-templates")
                }
                AutoscalingCommand::InstanceGroupManagers => {
                    Target::new("autoscaling", "instance-group-managers")
                }
                AutoscalingCommand::Autoscalers => Target::new("autoscaling", "autoscalers"),
            },
        };
        Some(target)
    }
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
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Logs go to a file only: stdout may carry the generated configuration
fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = log_file.map(Path::to_path_buf).unwrap_or_else(get_log_path);

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("gcp2tf {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = Config::config_dir() {
        return config_dir.join("gcp2tf.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".gcp2tf").join("gcp2tf.log");
    }
    PathBuf::from("gcp2tf.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level, args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {err:#}");
            if let Some(hint) = err.downcast_ref::<ExportError>().and_then(ExportError::hint) {
                eprintln!("Hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let Some(target) = args.command.target() else {
        return run_local(&args);
    };

    let def = resource::find_resource(target.family, target.command).with_context(|| {
        format!("no resource kind for {} {}", target.family, target.command)
    })?;

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let settings = config.settings(args.concurrency, args.page_size)?;

    let project = config
        .effective_project(args.project.as_deref())
        .ok_or_else(|| {
            ExportError::Credential(
                "no project set. Pass --project or run 'gcloud config set project <id>'"
                    .to_string(),
            )
        })?;

    let mut scope = Scope::new(
        &project,
        &config.effective_region(args.region.as_deref()),
        &config.effective_zone(args.zone.as_deref()),
    );
    for (name, value) in &target.params {
        scope = scope.with_param(name, value);
    }
    tracing::info!(
        "Exporting {} from project {} (region {}, zone {})",
        def.key,
        scope.project,
        scope.region,
        scope.zone
    );

    let credentials = GcpCredentials::resolve(args.access_token.as_deref()).await?;
    let api_endpoint = config.effective_api_endpoint(args.api_endpoint.as_deref());
    let endpoints = Endpoints::resolve(api_endpoint.as_deref())
        .map_err(|e| ExportError::Config(e.to_string()))?;
    let client = GcpClient::new(credentials, endpoints)
        .map_err(|e| ExportError::Config(e.to_string()))?;

    let ctx = PipelineContext::new(Arc::new(client), scope, settings)?;

    let cancel = ctx.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping at the next page or job");
            cancel.cancel();
        }
    });

    let report = ctx.export(def).await?;

    write_output(args.output.as_deref(), &report.text)?;
    if let Some(path) = &args.imports {
        write_imports(path, &report.imports)?;
    }
    print_summary(def, &report);

    Ok(())
}

/// Commands that never talk to the API
fn run_local(args: &Args) -> Result<()> {
    match &args.command {
        Command::Config(ConfigCommand::Init { force }) => {
            let path = match &args.config {
                Some(path) => path.clone(),
                None => Config::config_path().context("no config directory on this system")?,
            };
            let config = init_config(args, &path, *force)?;
            eprintln!(
                "Wrote {} (project {})",
                path.display(),
                config.project_id.as_deref().unwrap_or("unset")
            );
            Ok(())
        }
        _ => {
            print_kinds();
            Ok(())
        }
    }
}

/// Resolve every setting the way an export would and save the result to `path`
fn init_config(args: &Args, path: &Path, force: bool) -> Result<Config> {
    let existing = if path.exists() {
        if !force {
            anyhow::bail!("{} already exists. Pass --force to replace it", path.display());
        }
        Config::load_from(path)?
    } else {
        Config::default()
    };

    let settings = existing.settings(args.concurrency, args.page_size)?;
    let config = Config {
        project_id: existing.effective_project(args.project.as_deref()),
        region: Some(existing.effective_region(args.region.as_deref())),
        zone: Some(existing.effective_zone(args.zone.as_deref())),
        concurrency: Some(settings.concurrency),
        page_size: Some(settings.page_size),
        api_endpoint: existing.effective_api_endpoint(args.api_endpoint.as_deref()),
    };

    config
        .save_to(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("wrote config file {}", path.display());
    Ok(config)
}

/// Write the configuration. Only called once the whole kind succeeded.
fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .map_err(ExportError::from)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes()).map_err(ExportError::from)?;
            stdout.flush().map_err(ExportError::from)?;
            Ok(())
        }
    }
}

fn write_imports(path: &Path, imports: &[String]) -> Result<()> {
    let mut content = imports.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content)
        .map_err(ExportError::from)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn print_summary(def: &ResourceDef, report: &ExportReport) {
    eprintln!(
        "{}: {} fetched, {} rendered, {} excluded, {} without exportable fields",
        def.display_name, report.fetched, report.rendered, report.excluded, report.skipped_empty
    );

    if report.has_failures() {
        eprintln!("{} records were left out:", report.failures.len());
        for failure in &report.failures {
            eprintln!("  {}: {}", failure.key, failure.message);
        }
    }
}

fn print_kinds() {
    for def in resource::all_resources() {
        println!(
            "{:<12} {:<24} {:<40} {}",
            def.family, def.command, def.terraform_type, def.display_name
        );
    }
}
