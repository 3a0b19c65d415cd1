use tokio::signal::ctrl_c;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Clone, Default)]
pub struct ShutdownManager {
    token: CancellationToken,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn wait_for_shutdown(&self) {
        self.token.cancelled().await;
    }

    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            info!("Shutdown requested");
            self.token.cancel();
        }
    }

    async fn wait_for_signal(&self) -> std::io::Result<()> {
        ctrl_c().await?;
        info!("Received shutdown signal (Ctrl-C)");
        self.shutdown();
        Ok(())
    }
}

/// Start listening for Ctrl-C on a background task.
pub fn setup_shutdown_handler() -> ShutdownManager {
    let shutdown_manager = ShutdownManager::new();

    let listener = shutdown_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = listener.wait_for_signal().await {
            warn!("Error setting up signal handler: {}", e);
        }
    });

    shutdown_manager
}
