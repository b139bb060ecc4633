//! The call serializer's pending queue: at most one write-capture session
//! runs at a time; requests submitted while one is active wait their turn
//! and start in arrival order.

use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) type Callback = Box<dyn FnOnce(String) + Send + 'static>;

pub(crate) struct Call {
    pub html: String,
    pub callback: Callback,
}

pub(crate) struct CallQueue {
    state: Mutex<State>,
}

struct State {
    pending: VecDeque<Call>,
    session_active: bool,
}

impl CallQueue {
    pub fn new() -> Self {
        CallQueue {
            state: Mutex::new(State {
                pending: VecDeque::new(),
                session_active: false,
            }),
        }
    }

    /// Enqueue a call. Returns true when the caller should start a session
    /// worker; false means one is already draining the queue and will reach
    /// this call.
    pub fn submit(&self, call: Call) -> bool {
        let mut state = self.state.lock().expect("queue lock");
        state.pending.push_back(call);
        if state.session_active {
            return false;
        }
        state.session_active = true;
        true
    }

    /// Next call for the session worker, FIFO. Returns None once the queue
    /// is empty, at which point the session is over and the next `submit`
    /// starts a fresh worker.
    pub fn next(&self) -> Option<Call> {
        let mut state = self.state.lock().expect("queue lock");
        match state.pending.pop_front() {
            Some(call) => Some(call),
            None => {
                state.session_active = false;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(html: &str) -> Call {
        Call {
            html: html.to_string(),
            callback: Box::new(|_| {}),
        }
    }

    #[test]
    fn first_submit_starts_a_session_later_ones_wait() {
        let queue = CallQueue::new();
        assert!(queue.submit(call("a")));
        assert!(!queue.submit(call("b")));
        assert!(!queue.submit(call("c")));
    }

    #[test]
    fn drains_fifo_then_reopens() {
        let queue = CallQueue::new();
        assert!(queue.submit(call("a")));
        assert!(!queue.submit(call("b")));

        assert_eq!(queue.next().map(|c| c.html).as_deref(), Some("a"));
        assert_eq!(queue.next().map(|c| c.html).as_deref(), Some("b"));
        assert!(queue.next().is_none());

        // Queue is idle again; a new submit starts a new session.
        assert!(queue.submit(call("c")));
    }

    #[test]
    fn submit_during_drain_is_picked_up_by_the_running_session() {
        let queue = CallQueue::new();
        assert!(queue.submit(call("a")));
        assert_eq!(queue.next().map(|c| c.html).as_deref(), Some("a"));
        // Still active: nothing popped it to empty yet.
        assert!(!queue.submit(call("b")));
        assert_eq!(queue.next().map(|c| c.html).as_deref(), Some("b"));
        assert!(queue.next().is_none());
    }
}
