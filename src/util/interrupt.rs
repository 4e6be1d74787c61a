//! Ctrl-C handling.
//!
//! Once installed, SIGINT no longer kills the process outright. It sets a
//! flag that supervised subprocesses poll, so the pipeline unwinds through
//! its normal error path and the build workspace is always removed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Shared interrupt flag.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// A flag that is only ever set by [`Interrupt::trigger`].
    pub fn new() -> Self {
        Interrupt::default()
    }

    /// A flag that is also set when the process receives Ctrl-C.
    pub fn install() -> Self {
        let interrupt = Interrupt::new();
        let handle = interrupt.clone();

        let spawned = thread::Builder::new()
            .name("ctrl-c".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        tracing::warn!("failed to start signal listener: {}", e);
                        return;
                    }
                };

                runtime.block_on(async move {
                    loop {
                        match tokio::signal::ctrl_c().await {
                            Ok(()) => {
                                tracing::info!("Received Ctrl+C, stopping build...");
                                handle.trigger();
                            }
                            Err(e) => {
                                tracing::warn!("failed to listen for Ctrl+C: {}", e);
                                return;
                            }
                        }
                    }
                });
            });

        if let Err(e) = spawned {
            tracing::warn!("failed to spawn signal listener: {}", e);
        }

        interrupt
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_is_shared_between_clones() {
        let interrupt = Interrupt::new();
        let clone = interrupt.clone();
        assert!(!clone.is_triggered());
        interrupt.trigger();
        assert!(clone.is_triggered());
    }
}
