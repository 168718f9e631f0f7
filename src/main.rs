use std::io::Write;

use anyhow::Result;
use clap::Parser;
use fontweave::cli::{self, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize unified logging: routes all log::info!() etc. to the debug log file.
    // When RUST_LOG is set, also mirrors to stderr.
    // CLI --log-level flag takes highest precedence, then RUST_LOG, then config (applied below).
    fontweave::debug::init_log_bridge(cli.log_level);
    log::info!("Starting fontweave {}", fontweave::VERSION);

    let config = cli::load_config(&cli)?;
    fontweave::debug::apply_config_level(config.log_level);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = cli::run(&cli.command, &config, &mut out).and_then(|code| {
        out.flush()?;
        Ok(code)
    });
    let code = match result {
        Ok(code) => code,
        Err(e) if cli::is_broken_pipe(&e) => {
            log::debug!("Output closed early: {}", e);
            0
        }
        Err(e) => return Err(e),
    };
    log::logger().flush();

    if code != 0 {
        // Nothing holds resources needing Drop at this point
        std::process::exit(code);
    }
    Ok(())
}
