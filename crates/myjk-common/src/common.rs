// common.rs — misc printing and error functions used by all modules
// Converted from: myjk-original/codemp/qcommon/common.c

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::q_shared::ERR_FATAL;

// ============================================================
// Redirect buffer for Com_Printf
// ============================================================

static RD_BUFFER: Mutex<Option<String>> = Mutex::new(None);

/// Begin redirecting printf output into a buffer.
pub fn com_begin_redirect() {
    let mut buf = RD_BUFFER.lock().unwrap();
    *buf = Some(String::new());
}

/// End redirect and return the captured output.
pub fn com_end_redirect() -> Option<String> {
    let mut buf = RD_BUFFER.lock().unwrap();
    buf.take()
}

// ============================================================
// Com_Printf / Com_DPrintf / Com_Error
// ============================================================

static DEVELOPER: AtomicBool = AtomicBool::new(false);

/// Toggle developer-only printing (the "developer" cvar in the engine).
pub fn com_set_developer(on: bool) {
    DEVELOPER.store(on, Ordering::Relaxed);
}

/// General-purpose print function. Prints to stdout and appends to redirect
/// buffer if one is active.
pub fn com_printf(msg: &str) {
    // If redirecting, append to buffer
    {
        let mut buf = RD_BUFFER.lock().unwrap();
        if let Some(ref mut s) = *buf {
            s.push_str(msg);
            return;
        }
    }
    print!("{}", msg);
}

/// Developer-only print. Only prints when developer mode is active.
pub fn com_dprintf(msg: &str) {
    if !DEVELOPER.load(Ordering::Relaxed) {
        return;
    }
    com_printf(msg);
}

/// Engine error handler. In the engine ERR_DROP longjmps back to the main
/// loop and ERR_FATAL exits; the client game module never runs past either
/// one, so both abort here.
pub fn com_error(code: i32, msg: &str) -> ! {
    if code == ERR_FATAL {
        eprintln!("Error: {}", msg);
        panic!("Fatal error: {}", msg);
    }
    eprintln!("********************\nERROR: {}\n********************", msg);
    panic!("{}", msg);
}

// ============================================================
// Unit tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::q_shared::ERR_DROP;

    // single test so the process-wide redirect buffer is not contended by
    // parallel test threads
    #[test]
    fn test_redirect_and_developer_gate() {
        com_begin_redirect();
        com_printf("captured line\n");
        let out = com_end_redirect();
        assert_eq!(out.as_deref(), Some("captured line\n"));
        // second end returns nothing
        assert!(com_end_redirect().is_none());

        com_set_developer(false);
        com_begin_redirect();
        com_dprintf("should not appear");
        assert_eq!(com_end_redirect().as_deref(), Some(""));

        com_set_developer(true);
        com_begin_redirect();
        com_dprintf("now visible");
        assert_eq!(com_end_redirect().as_deref(), Some("now visible"));
        com_set_developer(false);
    }

    #[test]
    #[should_panic(expected = "went wrong")]
    fn test_com_error_drop_panics() {
        com_error(ERR_DROP, "went wrong");
    }
}
