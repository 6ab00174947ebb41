//! Process-wide panic hook
//!
//! Routes panic location and payload through `tracing` so a dying trader
//! thread shows up in the structured log, then hands off to the previous hook.
//! The process is not terminated: the venue joins the panicked thread, lists
//! it in the report, and finishes the shutdown sequence.

use std::any::Any;
use std::panic;
use tracing::error;

/// Extract the human-readable part of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<no message>".to_string()
    }
}

/// Install the logging hook in front of whatever hook is current
///
/// Safe to call more than once; each call wraps the previous hook.
pub fn install_panic_handler() {
    let previous = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "<unknown location>".to_string());
        let thread = std::thread::current()
            .name()
            .unwrap_or("<unnamed>")
            .to_string();

        error!(
            thread = %thread,
            location = %location,
            message = %panic_message(info.payload()),
            "Thread panicked"
        );

        previous(info);
    }));

    tracing::debug!("Panic handler installed");
}
