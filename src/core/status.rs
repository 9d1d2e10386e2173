use std::sync::atomic::{AtomicBool, Ordering};

/// Global readiness flag, set once the order store has been seeded.
///
/// Read by the `/status/ready` probe.
static STORE_LOADED: AtomicBool = AtomicBool::new(false);

/// Mark the service as ready. `seeded` is the number of orders loaded from
/// configuration and is only used for the log line.
pub fn mark_ready(seeded: usize) {
    STORE_LOADED.store(true, Ordering::SeqCst);
    log::info!("Order store loaded with {seeded} seed orders, service is ready");
}

/// Check if the service is ready to handle traffic.
pub fn is_ready() -> bool {
    STORE_LOADED.load(Ordering::SeqCst)
}

/// Reset readiness status (useful for testing)
#[allow(dead_code)]
pub fn reset() {
    STORE_LOADED.store(false, Ordering::SeqCst);
    log::debug!("Readiness status reset");
}
