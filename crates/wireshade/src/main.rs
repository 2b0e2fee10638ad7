mod cli;
mod run;

use std::process::ExitCode;

use renderer::BackendError;

fn main() -> ExitCode {
    let cli = cli::parse();
    run::initialise_tracing();

    match run::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.is::<BackendError>() {
                // The one user-facing failure path: tell the user plainly
                // that their system cannot render.
                eprintln!("wireshade: {err}");
            } else {
                // Fetch and build failures stay operator-facing.
                tracing::error!("{err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
