use clap::{Parser, Subcommand};
use liveview::config::LiveViewConfig;
use liveview::host::{ResourceId, SurfaceId, Workspace};
use liveview::service::{LiveViewService, ServiceHandle};
use liveview::sim::SimHost;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), String> {
    init_logging();

    let config = LiveViewConfig::load();
    let host = SimHost::new();
    let (service, handle) = LiveViewService::new(host.clone(), host.clone(), &config);
    let service_task = tokio::spawn(service.run());

    if config.active_on_start {
        handle.activate().await;
    }

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &host, &handle).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    handle.shutdown().await;
    let _ = service_task.await;
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so they do not interleave with the prompt.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Parser)]
#[command(version, about = "live-mode reconciliation sandbox")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a resource, optionally backed by a storage path
    Open { path: Option<String> },
    /// Show a resource on a new surface
    Show { resource: u64 },
    /// Hide a surface
    Hide { surface: u64 },
    /// Close a resource (its handle goes dead)
    Close { resource: u64 },
    /// Activate live-mode reconciliation
    On,
    /// Deactivate live-mode reconciliation
    Off,
    /// Set and persist the debounce delay in milliseconds
    Delay { ms: u64 },
    /// Print monitored and live-mode state
    Status,
    Exit,
}

async fn respond(line: &str, host: &SimHost, handle: &ServiceHandle) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "liveview".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Open { path }) => {
            let id = host.open(path.as_ref().map(PathBuf::from));
            println!("opened resource {id}");
        }
        Some(Commands::Show { resource }) => {
            let resource = ResourceId(*resource);
            if !host.is_live(resource) {
                println!("no live resource {resource}");
            } else {
                let surface = host.show(resource);
                println!("surface {surface} shows resource {resource}");
            }
        }
        Some(Commands::Hide { surface }) => {
            if !host.hide(SurfaceId(*surface)) {
                println!("no such surface {surface}");
            }
        }
        Some(Commands::Close { resource }) => {
            if !host.close(ResourceId(*resource)) {
                println!("no live resource {resource}");
            }
        }
        Some(Commands::On) => handle.activate().await,
        Some(Commands::Off) => handle.deactivate().await,
        Some(Commands::Delay { ms }) => {
            let mut config = LiveViewConfig::load();
            config.debounce_ms = *ms;
            if let Err(err) = config.save() {
                println!("{err}");
            }
            handle.set_debounce(Duration::from_millis(*ms)).await;
            println!("debounce delay set to {ms}ms");
        }
        Some(Commands::Status) => {
            let mut monitored: Vec<ResourceId> = handle.monitored().into_iter().collect();
            monitored.sort();
            let mut enabled: Vec<ResourceId> = host.enabled_set().into_iter().collect();
            enabled.sort();
            println!("monitored: {monitored:?}");
            println!("live mode enabled: {enabled:?}");
        }
        Some(Commands::Exit) => {
            write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
            std::io::stdout().flush().map_err(|e| e.to_string())?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}

fn readline() -> Result<String, String> {
    write!(std::io::stdout(), "> ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;
    let mut buffer = String::new();
    std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    Ok(buffer)
}
