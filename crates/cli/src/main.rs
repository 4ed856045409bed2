use std::process::ExitCode;

fn main() -> ExitCode {
    comparcar_cli::run()
}
