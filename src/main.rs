use std::process::ExitCode;

use toastline::app;

#[tokio::main]
async fn main() -> ExitCode {
    app::startup::startup().await
}
