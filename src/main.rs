mod app;
mod ui;

use std::env;
use std::io;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = if args.is_empty() {
        app::run_interactive()
    } else {
        app::run_command(&args)
    };

    if let Err(message) = result {
        ui::render_error(&message);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
