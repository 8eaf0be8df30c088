use std::process::ExitCode;

fn main() -> ExitCode {
    match stresstest::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(stresstest_cli::EXIT_FATAL)
        }
    }
}
