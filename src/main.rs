use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    gesture_arena::cli::run_cli().await
}
