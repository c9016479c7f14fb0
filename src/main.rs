use std::process::ExitCode;

fn main() -> ExitCode {
    match forge_relay::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
