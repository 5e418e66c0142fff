use anyhow::Result;
use clap::Parser;
use simctl_bridge::cli::{self, exit_codes, Cli};

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(exit_codes::INVALID_ARGS);
        }
        // --help and --version
        Err(e) => e.exit(),
    };

    // the server keeps SIGPIPE ignored so a tool closing stdin early is only EPIPE
    if !cli.is_server() {
        reset_sigpipe();
    }

    cli::init_logging();
    cli::run(cli)
}

/// reset SIGPIPE to default behavior (terminate process) instead of panicking
/// this is the standard Unix behavior for CLI tools
fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
