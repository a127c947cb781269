use std::process::ExitCode;

fn main() -> ExitCode {
    freightwatch_cli::run()
}
