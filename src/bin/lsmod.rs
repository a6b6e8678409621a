//! lsmod - show the loaded kernel modules.
//!
//! Reads `/proc/modules` (or another file in the same format) and prints it
//! the way `lsmod(8)` does, or as JSON.

use std::collections::BTreeMap;
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, debug, error};
use tracing_subscriber::EnvFilter;

use lsmod::model::{ModuleInfo, ModuleTable};

/// Show the status of modules in the Linux kernel.
#[derive(Parser)]
#[command(name = "lsmod", about = "Show loaded kernel modules", version)]
struct Args {
    /// Path to the module listing. Empty means /proc/modules.
    #[arg(long, env = "LSMOD_PROC_MODULES", default_value = "")]
    path: String,

    /// Print the table as a JSON object keyed by module name.
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber on stderr.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("lsmod={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Formats one row in `lsmod(8)` layout.
fn format_row(info: &ModuleInfo) -> String {
    let row = format!("{:<19} {:>8}  {}", info.name, info.mem, info.instances);
    if info.depends.is_empty() {
        row
    } else {
        format!("{} {}", row, info.depends.join(","))
    }
}

fn print_table(modules: &ModuleTable) {
    let sorted: BTreeMap<_, _> = modules.iter().collect();
    println!("{:<19} {:>8}  Used by", "Module", "Size");
    for info in sorted.values() {
        println!("{}", format_row(info));
    }
}

fn print_json(modules: &ModuleTable) -> Result<(), serde_json::Error> {
    let sorted: BTreeMap<_, _> = modules.iter().collect();
    println!("{}", serde_json::to_string_pretty(&sorted)?);
    Ok(())
}

/// Formats an error with its whole source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let modules = match lsmod::lsmod(&args.path) {
        Ok(modules) => modules,
        Err(e) => {
            error!("{}", error_chain(&e));
            return ExitCode::FAILURE;
        }
    };
    debug!(modules = modules.len(), "printing module table");

    if args.json {
        if let Err(e) = print_json(&modules) {
            error!("failed to encode JSON: {}", e);
            return ExitCode::FAILURE;
        }
    } else {
        print_table(&modules);
    }

    ExitCode::SUCCESS
}
