use std::process::ExitCode;

fn main() -> ExitCode {
    restock_cli::run()
}
