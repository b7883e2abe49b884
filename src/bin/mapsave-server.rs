use clap::Parser;
use mapsave::config::ServerArgs;
use mapsave::{display_chain, init_logging, server};
use std::process::ExitCode;

fn main() -> ExitCode {
    init_logging();
    let args = ServerArgs::parse();
    match args.into_cfg().and_then(server::run_server) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mapsave-server failed -> {}", display_chain(&*e));
            ExitCode::FAILURE
        }
    }
}
