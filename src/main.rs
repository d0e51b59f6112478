#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    // Set up logging for development
    env_logger::init();

    // Run the portfolio application
    corvid_portfolio::run_app()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
