use std::ffi::OsString;
use std::io::IsTerminal;

use nimbus::{
    cli,
    commands::params::{ENV_VERBOSITY, PARAMETER_VERBOSITY},
    configuration::Configuration,
    context::ExecutionContext,
    error::CliError,
    print::{Printer, Verbosity},
    sdk::HttpClientFactory,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// `--verbosity debug` or `NIMBUS_VERBOSITY=debug`.
fn debug_requested(args: &[OsString]) -> bool {
    let flag = format!("--{PARAMETER_VERBOSITY}");
    let inline = format!("{flag}=debug");
    let words: Vec<&str> = args.iter().filter_map(|arg| arg.to_str()).collect();
    let from_args = words.iter().any(|word| *word == inline)
        || words
            .windows(2)
            .any(|pair| pair[0] == flag && pair[1] == "debug");
    from_args || std::env::var(ENV_VERBOSITY).is_ok_and(|value| value == "debug")
}

fn init_tracing(args: &[OsString]) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug_requested(args) {
            "nimbus=debug"
        } else {
            "off"
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

/// Cancel the token on Ctrl-C or SIGTERM.
fn cancel_on_signal(token: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut terminate) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = terminate.recv() => {}
                    }
                }
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        tracing::debug!("Received a termination signal, cancelling");
        token.cancel();
    });
}

/// Main entry point for the program
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();
    init_tracing(&args);

    let mut printer = Printer::stdio();
    // Usage errors are reported before the global flags are parsed.
    if debug_requested(&args) {
        printer.set_verbosity(Verbosity::Debug);
    }
    let configuration = match Configuration::load_default() {
        Ok(configuration) => configuration,
        Err(e) => {
            let err = CliError::from(e);
            cli::report_error(&mut printer, &err);
            std::process::exit(err.exit_code().code());
        }
    };

    let cancellation = CancellationToken::new();
    cancel_on_signal(cancellation.clone());

    let clients = Box::new(HttpClientFactory::new(configuration.clone()));
    let mut ctx =
        ExecutionContext::new(printer, configuration, clients).with_cancellation(cancellation);

    let code = match cli::run(args, &mut ctx).await {
        Ok(()) => exitcode::OK,
        Err(e) => {
            cli::report_error(&mut ctx.printer, &e);
            e.exit_code().code()
        }
    };
    let _ = ctx.printer.flush();
    std::process::exit(code);
}
