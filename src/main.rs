//! Warecore CLI - the thin external collaborator around the warehouse
//! core (§6). Loads an initial-state file, builds a `Warehouse`, and
//! either steps it to completion in-process (`simulate`) or exposes it
//! to the deploy-mode transport (`deploy`).

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::Mutex;

use warecore_config::WarehouseConfig;
use warecore_sim::Warehouse;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "warecore")]
#[command(author = "Warecore Team")]
#[command(version = "0.1.0")]
#[command(about = "Warehouse robot dispatch, planning, and tick-loop core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Step the core to completion in-process, with no external transport.
    Simulate,
    /// Expose the core over the deploy-mode WebSocket transport (§5).
    Deploy,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a warehouse from an initial-state file and run it
    Run {
        /// Path to the initial-state file (YAML or JSON, §6 `Initialise`)
        #[arg(short, long)]
        state: PathBuf,

        /// simulate: run in-process to completion. deploy: serve over the network transport.
        #[arg(short, long, value_enum, default_value_t = Mode::Simulate)]
        mode: Mode,

        /// Port the deploy-mode transport listens on (ignored in simulate mode)
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Ticks to run before stopping (simulate mode only; default runs
        /// until no orders are pending and no tasks remain in flight)
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Load and validate an initial-state file without running it
    Validate {
        /// Path to the initial-state file (YAML or JSON)
        #[arg(short, long)]
        state: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { state, mode, port, ticks } => run(&state, mode, port, ticks),
        Commands::Validate { state } => validate(&state),
    }
}

fn load_config(path: &Path) -> Result<WarehouseConfig, ExitCode> {
    let path_str = path.to_string_lossy();
    WarehouseConfig::from_file(&path_str).map_err(|e| {
        eprintln!("error loading initial state {}: {e}", path.display());
        ExitCode::FAILURE
    })
}

fn print_errors(path: &Path, errors: &[warecore_config::ValidationError]) {
    eprintln!("{}: {} validation error(s)", path.display(), errors.len());
    for error in errors {
        eprintln!("  {error}");
    }
}

fn validate(state: &Path) -> ExitCode {
    let config = match load_config(state) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let errors = warecore_config::validate_scenario(&config);
    if errors.is_empty() {
        println!("{}: valid", state.display());
        ExitCode::SUCCESS
    } else {
        print_errors(state, &errors);
        ExitCode::FAILURE
    }
}

fn run(state: &Path, mode: Mode, port: u16, ticks: Option<u64>) -> ExitCode {
    let config = match load_config(state) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let warehouse = match Warehouse::from_config(&config) {
        Ok(warehouse) => warehouse,
        Err(errors) => {
            print_errors(state, &errors);
            return ExitCode::FAILURE;
        }
    };

    match mode {
        Mode::Simulate => run_simulate(warehouse, ticks),
        Mode::Deploy => run_deploy(warehouse, port),
    }
}

fn run_simulate(mut warehouse: Warehouse, ticks: Option<u64>) -> ExitCode {
    let max_ticks = ticks.unwrap_or(u64::MAX);
    let mut advanced = 0u64;

    while advanced < max_ticks {
        if warehouse.is_idle() {
            break;
        }
        warehouse.tick();
        advanced += 1;
    }

    let fulfilled = warehouse
        .orders
        .values()
        .filter(|o| o.status == warecore_entities::OrderStatus::Fulfilled)
        .count();
    let dismissed =
        warehouse.orders.values().filter(|o| o.status == warecore_entities::OrderStatus::Dismissed).count();

    println!(
        "ran {advanced} tick(s): {fulfilled} order(s) fulfilled, {dismissed} dismissed, {} pending",
        warehouse.pending_orders.len()
    );
    ExitCode::SUCCESS
}

fn run_deploy(warehouse: Warehouse, port: u16) -> ExitCode {
    let config = warecore_ui::ServerConfig { port };
    let world = Arc::new(Mutex::new(warehouse));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(warecore_ui::run_server(config, world)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}
