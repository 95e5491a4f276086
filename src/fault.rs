//! Process-wide transport-fault handler.
//!
//! One handler serves the whole process: installed at startup, consulted for
//! every transport failure. Installing again replaces the previous handler,
//! which a long-running host may want.

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::TransportFault;

/// Handler signature: the rendered error message plus the fault itself as
/// opaque detail.
pub type FaultHandler = dyn Fn(&str, &TransportFault) + Send + Sync;

static HANDLER: RwLock<Option<Arc<FaultHandler>>> = RwLock::new(None);

/// Install the process-wide fault handler. Call once at startup; calling
/// again replaces the previous handler for the rest of the process lifetime.
pub fn set_fault_handler<F>(handler: F)
where
    F: Fn(&str, &TransportFault) + Send + Sync + 'static,
{
    let mut slot = HANDLER.write().unwrap_or_else(PoisonError::into_inner);
    *slot = Some(Arc::new(handler));
}

/// Route a transport fault to the installed handler. Without one the fault
/// is logged so it is never silently dropped.
pub fn report(fault: &TransportFault) {
    let handler = {
        let slot = HANDLER.read().unwrap_or_else(PoisonError::into_inner);
        slot.clone()
    };
    match handler {
        Some(handler) => handler(&fault.to_string(), fault),
        None => log::error!("unhandled transport fault: {fault}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_handler_receives_message_and_is_replaceable() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        set_fault_handler(move |message, _| sink.lock().unwrap().push(message.to_string()));

        let fault = TransportFault::Service {
            status: 500,
            message: "index unavailable".to_string(),
        };
        report(&fault);
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["search service returned 500: index unavailable"]
        );

        // Re-registration swaps the handler out; the old sink stays quiet.
        set_fault_handler(|_, _| {});
        report(&fault);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
