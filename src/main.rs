use anyhow::Result;
use clap::Parser;
use plantscan::error::NavigationError;
use plantscan::feedback::LoggingHaptics;
use plantscan::{
    sample_history, CycleOutcome, EventFilter, EventReceiver, HistorySource,
    KeyboardInputHandler, Navigator, RouteRequest, ScanCommand, ScanConfig, ScanWorkflow,
    ScanWorkflowBuilder, ScreenView, SimulatedAuthorizer, SimulatedCamera,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(name = "plantscan")]
#[command(about = "Capture a plant photo, diagnose it and hand the result to the analysis view")]
#[command(version)]
#[command(long_about = "Terminal driver for the plant-health scan screen. Runs the camera \
permission gate, photo capture, simulated diagnosis and result hand-off against simulated \
devices, either interactively from the keyboard or as a single scripted cycle.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "plantscan.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Print the diagnosis history as JSON and exit
    #[arg(long, help = "Print the diagnosis history as JSON and exit")]
    history: bool,

    /// Run a single capture cycle without keyboard input
    #[arg(long, help = "Run one capture-to-analysis cycle and print the route as JSON")]
    once: bool,

    /// Start with camera access denied
    #[arg(long, help = "Simulated platform starts with camera access denied")]
    deny_permission: bool,

    /// Make the first capture fail
    #[arg(long, help = "Simulated camera fails its first shot")]
    fail_capture: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args)?;

    if args.history {
        let records = sample_history().records();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    info!("Starting plantscan v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = match ScanConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                info!("Configuration validation successful");
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    let workflow = Arc::new(build_workflow(&args, config)?);
    spawn_event_logger(&workflow, args.debug);

    if args.once {
        run_once(&workflow).await
    } else {
        run_interactive(&workflow).await
    }
}

fn build_workflow(args: &Args, config: ScanConfig) -> Result<ScanWorkflow> {
    let mut camera = SimulatedCamera::from_config(&config.camera);
    if args.fail_capture {
        camera = camera.then_fail("simulated shutter failure");
    }

    let authorizer = if args.deny_permission {
        SimulatedAuthorizer::grants_on_request()
    } else {
        SimulatedAuthorizer::granted()
    };

    let navigator = |route: RouteRequest| -> Result<(), NavigationError> {
        info!("Opening {} view with {:?}", route.pathname, route.params);
        Ok(())
    };
    let navigator: Arc<dyn Navigator> = Arc::new(navigator);

    let workflow = ScanWorkflowBuilder::new()
        .config(config)
        .camera(Arc::new(camera))
        .authorizer(Arc::new(authorizer))
        .haptics(Arc::new(LoggingHaptics))
        .navigator(navigator)
        .build()?;

    Ok(workflow)
}

/// Record screen-level events; with `--debug` every event is recorded
fn spawn_event_logger(workflow: &ScanWorkflow, everything: bool) {
    let filter = if everything {
        EventFilter::All
    } else {
        EventFilter::EventTypes(vec![
            "permission_changed",
            "alert_raised",
            "alert_acknowledged",
            "handoff_delivered",
            "handoff_suppressed",
        ])
    };
    let mut events = EventReceiver::new(
        workflow.event_bus().subscribe(),
        filter,
        "cli-logger".to_string(),
    );
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(event = event.event_type(), "{}", event.description());
        }
    });
}

async fn run_once(workflow: &ScanWorkflow) -> Result<()> {
    let view = workflow.activate().await;
    if !view.is_camera() {
        eprintln!("✗ {}", view.caption().unwrap_or("Camera unavailable"));
        std::process::exit(1);
    }

    let outcome = workflow.capture_and_diagnose().await;
    workflow.deactivate();

    match outcome {
        CycleOutcome::Delivered(route) => {
            println!("{}", serde_json::to_string_pretty(&route)?);
            Ok(())
        }
        CycleOutcome::Failed(alert) => {
            eprintln!("✗ {}: {}", alert.title, alert.message);
            std::process::exit(1);
        }
        other => {
            eprintln!("✗ Capture did not run: {:?}", other);
            std::process::exit(1);
        }
    }
}

async fn run_interactive(workflow: &Arc<ScanWorkflow>) -> Result<()> {
    let view = workflow.activate().await;
    show_view(&view);

    let (command_tx, mut command_rx) = mpsc::channel(16);
    let keyboard = KeyboardInputHandler::new();
    let keyboard_task = keyboard.start(command_tx);

    while let Some(command) = command_rx.recv().await {
        match command {
            ScanCommand::Capture => {
                let cycle = workflow.spawn_cycle();
                let observer = Arc::clone(workflow);
                tokio::spawn(async move {
                    match cycle.await {
                        Ok(outcome) => show_outcome(&outcome),
                        Err(e) => error!("Capture cycle panicked: {}", e),
                    }
                    show_view(&observer.view());
                });
                // Let the cycle claim the session before rendering
                tokio::task::yield_now().await;
            }
            ScanCommand::Flip => {
                if workflow.toggle_facing().is_none() {
                    debug!("Facing toggle ignored");
                }
            }
            ScanCommand::RequestPermission => {
                workflow.request_permission().await;
            }
            ScanCommand::Acknowledge => {
                workflow.acknowledge_alert();
            }
            ScanCommand::Back => {
                workflow.go_back();
                break;
            }
            ScanCommand::Quit => {
                workflow.deactivate();
                break;
            }
        }
        show_view(&workflow.view());
    }

    keyboard.stop();
    if let Err(e) = keyboard_task.await {
        error!("Keyboard task failed: {}", e);
    }

    info!("plantscan exited");
    Ok(())
}

// Raw mode needs explicit carriage returns
fn show(line: &str) {
    print!("{}\r\n", line);
}

fn show_view(view: &ScreenView) {
    if let Some(alert) = view.alert() {
        show(&format!("[{}] {} (press a)", alert.title, alert.message));
        return;
    }

    match view {
        ScreenView::Camera {
            facing,
            capturing: false,
            ..
        } => show(&format!("Camera ready ({:?})", facing)),
        ScreenView::PermissionRequired { .. } => {
            show(plantscan::workflow::PERMISSION_TITLE);
            show(&format!("{} (press r)", plantscan::workflow::PERMISSION_TEXT));
        }
        other => {
            if let Some(caption) = other.caption() {
                show(caption);
            }
        }
    }
}

fn show_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Delivered(route) => {
            let params = serde_json::to_string(&route.params).unwrap_or_default();
            show(&format!("→ {} {}", route.pathname, params));
        }
        CycleOutcome::Rejected(reason) => debug!("Capture ignored: {:?}", reason),
        CycleOutcome::Failed(_) | CycleOutcome::Abandoned => {}
    }
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{
        fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    };

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("plantscan={}", log_level)));

    // Logs go to stderr so route JSON on stdout stays parseable
    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("pretty") => fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some("compact") | None => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# plantscan configuration file");
    println!("# Every key is optional; environment overrides use PLANTSCAN__SECTION__KEY");
    println!();
    println!("{}", ScanConfig::default().to_toml()?);
    Ok(())
}
