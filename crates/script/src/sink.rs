//! The write sink: the slot that executed code writes through.
//!
//! In a live browser this slot is the global `document.write`. Here it is
//! a thread-local stack of capture buffers: all script execution
//! for one session happens on that session's worker thread, so thread-local
//! state gives the same "one process-wide slot" semantics while keeping
//! concurrent test binaries isolated from each other.
//!
//! Overriding the sink is stack-disciplined through [`Capture`], whose
//! `Drop` restores the previous sink on every exit path, including panics
//! inside executed code.

use std::cell::RefCell;

thread_local! {
    static SINKS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Append `text` through the active sink.
///
/// Executed code calls this (directly or via an [`crate::Engine`]
/// implementation) to write into the document stream. With no capture
/// active there is no document to write to, so the text is dropped.
pub fn write(text: &str) {
    SINKS.with(|sinks| {
        let mut stack = sinks.borrow_mut();
        match stack.last_mut() {
            Some(buffer) => buffer.push_str(text),
            None => {
                log::trace!(target: "script.sink", "dropping {} bytes written outside a capture", text.len());
            }
        }
    });
}

/// A scoped sink override. Creating one pushes a fresh capture buffer;
/// [`Capture::finish`] pops it and hands back what was written. If the
/// guard is dropped without `finish` (a script panicked), the buffer is
/// popped anyway so the previous sink is restored.
#[must_use = "dropping a Capture discards everything written into it"]
pub struct Capture {
    finished: bool,
}

impl Capture {
    pub fn begin() -> Self {
        SINKS.with(|sinks| sinks.borrow_mut().push(String::new()));
        Capture { finished: false }
    }

    pub fn finish(mut self) -> String {
        self.finished = true;
        SINKS.with(|sinks| {
            sinks
                .borrow_mut()
                .pop()
                .expect("capture buffer pushed by begin")
        })
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        if !self.finished {
            SINKS.with(|sinks| {
                sinks.borrow_mut().pop();
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_outside_capture_is_dropped() {
        write("lost");
        let capture = Capture::begin();
        write("kept");
        assert_eq!(capture.finish(), "kept");
    }

    #[test]
    fn captures_nest_lifo() {
        let outer = Capture::begin();
        write("a");
        let inner = Capture::begin();
        write("b");
        assert_eq!(inner.finish(), "b");
        write("c");
        assert_eq!(outer.finish(), "ac");
    }

    #[test]
    fn drop_without_finish_restores_previous_sink() {
        let outer = Capture::begin();
        write("before");
        {
            let _inner = Capture::begin();
            write("discarded");
        }
        write("after");
        assert_eq!(outer.finish(), "beforeafter");
    }

    #[test]
    fn panic_inside_capture_still_restores() {
        let outer = Capture::begin();
        let result = std::panic::catch_unwind(|| {
            let _inner = Capture::begin();
            write("doomed");
            panic!("script blew up");
        });
        assert!(result.is_err());
        write("alive");
        assert_eq!(outer.finish(), "alive");
    }
}
