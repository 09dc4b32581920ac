use std::process::ExitCode;

fn main() -> ExitCode {
    match teamkv::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            teamkv::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
