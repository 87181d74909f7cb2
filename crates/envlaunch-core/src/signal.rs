//! Ctrl+C handling while the launcher is in charge.
//!
//! The terminal delivers SIGINT to the whole foreground process group, so once the target is
//! running it receives the interrupt directly and decides how to exit. The launcher must stay
//! alive until then to report the target's exit code.

use std::process::exit;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

static TARGET_HAS_CONTROL: AtomicBool = AtomicBool::new(false);
const INTERRUPTED_EXIT_CODE: i32 = 130;

pub fn pass_control_to_target() {
    TARGET_HAS_CONTROL.store(true, Ordering::SeqCst);
}

fn target_has_control() -> bool {
    TARGET_HAS_CONTROL.load(Ordering::SeqCst)
}

pub fn setup_signal_handler() {
    let result = ctrlc::set_handler(|| {
        if !target_has_control() {
            exit(INTERRUPTED_EXIT_CODE);
        }
    });

    if result.is_err() {
        debug!("Unable to set Ctrl+C handler, SIGINT will not be handled correctly");
    }
}
