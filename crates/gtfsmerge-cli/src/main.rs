pub mod cli;
pub mod cmd;
pub mod error;

pub use cli::Cli;

use clap::Parser;

fn main() {
    #[cfg(unix)]
    install_sigpipe_default();

    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = cmd::merge::run(&cli) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

/// Initializes `env_logger` with `RUST_LOG` as the default source of
/// verbosity; `--debug` raises the default filter to `debug` when
/// `RUST_LOG` is unset.
fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if debug && std::env::var("RUST_LOG").is_err() {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

/// Resets `SIGPIPE` to its default disposition (`SIG_DFL`).
///
/// Rust's runtime ignores `SIGPIPE` by default, which causes programs that
/// write to a closed pipe (e.g. `gtfsmerge a b out.zip | head`) to receive
/// an `Err(BrokenPipe)` from a write call rather than being terminated
/// silently. Restoring the default disposition lets the kernel terminate
/// the process with exit code 0 when a write to a closed pipe occurs.
#[cfg(unix)]
fn install_sigpipe_default() {
    // SAFETY: signal() is safe to call during single-threaded program
    // initialization before any other threads are spawned. SIG_DFL is a
    // valid handler for SIGPIPE. The return value (previous handler) is
    // discarded.
    #[allow(unsafe_code)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
}
