// Line-oriented bridge: a host process describes fields and keystrokes on
// stdin and reads normalized values back on stdout. Logs go to stderr.
use numeral_core::bridge::Bridge;
use numeral_core::config::DEFAULT_CONFIG_PATH;
use numeral_core::NumeralEngine;
use std::io::{self, BufRead};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("numeral_core=info,numeral_engine=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let mut engine = NumeralEngine::from_file_or_default(&config_path);
    let mut bridge = Bridge::new(&mut engine)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        if !bridge.handle_line(&line?, &mut stdout)? {
            break;
        }
    }

    // The config file is only read here, never written back.
    engine.shutdown(bridge.page_mut());
    Ok(())
}
