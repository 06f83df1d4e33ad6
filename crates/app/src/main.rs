//! acctl binary entry point.

use std::io;
use std::process::ExitCode;

use clap::Parser;

use acctl::{Cli, exit_code, logging};
use acctl_application::CancellationToken;
use acctl_infrastructure::TerminalPrompt;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let (token, cancel) = CancellationToken::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let prompt = if cli.global.no_prompts {
        TerminalPrompt::non_interactive()
    } else {
        TerminalPrompt::new()
    };
    let mut stdout = io::stdout();

    match acctl::run(cli, &prompt, &mut stdout, cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(exit_code(&error))
        }
    }
}
