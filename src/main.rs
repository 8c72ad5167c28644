mod chunked;
mod commands;
mod cursor;
mod error;
mod identity;
mod mapped_stream;
mod record;
mod search;
mod server;
mod stream;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use chunked::ChunkedJournal;
use mapped_stream::MappedJournal;

#[derive(Parser)]
#[command(name = "jview")]
#[command(about = "A fast scrolling viewer for system journal logs")]
struct Args {
    /// Log file to view
    file: PathBuf,

    /// Records cached per chunk
    #[arg(long, default_value_t = 500)]
    chunk_size: usize,

    /// Listen for remote control commands on this local port
    #[arg(long)]
    port: Option<u16>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if args.chunk_size == 0 {
        eprintln!("chunk size must be at least 1");
        return ExitCode::FAILURE;
    }

    let stream = match MappedJournal::open(&args.file) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("failed to open {}: {}", args.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut journal = ChunkedJournal::new(stream, args.chunk_size);

    let (command_tx, command_rx) = async_channel::bounded(16);
    if let Some(port) = args.port {
        if let Err(e) = server::start_server(port, command_tx) {
            eprintln!("failed to start control server: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match ui::run(&mut journal, command_rx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("terminal error: {}", e);
            ExitCode::FAILURE
        }
    }
}
