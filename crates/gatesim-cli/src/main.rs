//! Binary entrypoint for the gatesim shell.
//!
//! Opens every `FILE` given, then either runs the `--exec` commands in
//! order or reads commands from stdin until `exit` or end of input.
//! Exit codes: 0 = success, 1 = a command failed, 2 = startup error.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gatesim_cli::{Config, Shell};
use gatesim_storage::{FileStore, Library, Tabs};

/// A logic circuit simulator shell.
#[derive(Parser)]
#[command(name = "gatesim", version, about = "Logic circuit simulator shell")]
struct Cli {
    /// Documents to open (`.circuit`).
    files: Vec<PathBuf>,

    /// Enable debug logging.
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Run a command and exit; repeat to run several in order.
    #[arg(short = 'c', long = "exec", value_name = "CMD")]
    exec: Vec<String>,

    /// Component library directory (default: $GATESIM_LIBRARY).
    #[arg(long, value_name = "DIR")]
    library: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let config = Config::from_env(cli.library.clone(), cli.verbose);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(io::stderr)
        .init();

    let tabs = Tabs::new(FileStore::new());
    let library = Library::new(FileStore::new(), config.library.clone());
    let mut shell = Shell::new(tabs, library);
    tracing::debug!("library at {}", config.library.display());

    for file in &cli.files {
        if let Err(e) = shell.open_file(file) {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }

    let result = if cli.exec.is_empty() {
        interactive(&mut shell)
    } else {
        shell.run_lines(&cli.exec, &mut io::stdout(), &mut io::stderr())
    };
    match result {
        Ok(0) => {}
        Ok(failed) => {
            if !cli.exec.is_empty() {
                tracing::debug!("{} command(s) failed", failed);
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("I/O error: {}", e);
            process::exit(2);
        }
    }
}

/// Reads commands from stdin, printing a prompt before each line.
fn interactive(shell: &mut Shell<FileStore>) -> io::Result<usize> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut failed = 0;
    let mut lines = stdin.lock().lines();
    while shell.is_running() {
        write!(stdout, "{}", shell.prompt())?;
        stdout.flush()?;
        let Some(line) = lines.next().transpose()? else {
            writeln!(stdout)?;
            break;
        };
        failed += shell.run_lines([line], &mut stdout, &mut io::stderr())?;
    }
    Ok(failed)
}
