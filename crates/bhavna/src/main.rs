use std::sync::Arc;

use bhavna::{logging, ClientConfig, HttpAnalyzer, Session, SessionFlags};
use bhavna_core::ProgramOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::default();
    let _logging = logging::init(&config.resolved_log_dir());

    let analyzer = HttpAnalyzer::new(&config.endpoint)?;
    let options = ProgramOptions {
        mouse_capture: true,
        title: Some("bhavna".into()),
        ..ProgramOptions::default()
    };
    let flags = SessionFlags {
        config,
        analyzer: Arc::new(analyzer),
    };

    bhavna_core::run_with::<Session>(flags, options).await?;
    tracing::info!("session ended");
    Ok(())
}
