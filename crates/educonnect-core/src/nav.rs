//! Views and navigation between them.
//!
//! `Router` stands in for the browser's history: it knows which view is
//! showing, counts visits so late responses can tell whether their view is
//! still on screen, and holds at most one delayed redirect.

use std::time::{Duration, Instant};

use tracing::debug;

/// Number of recent views the router remembers.
pub const HISTORY_LIMIT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Register,
    Dashboard,
    Materials,
    Upload,
}

impl View {
    /// Where users land when they have no session.
    pub const ENTRY: View = View::Login;

    /// Protected views require an authenticated session to render.
    pub fn is_protected(&self) -> bool {
        matches!(self, View::Dashboard | View::Upload)
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Register => "Register",
            View::Dashboard => "Dashboard",
            View::Materials => "Browse Materials",
            View::Upload => "Upload New",
        }
    }
}

/// One showing of a view. Every navigation starts a new visit, even to the
/// view that is already current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub view: View,
    pub id: u64,
}

pub trait Navigator {
    fn current(&self) -> View;

    fn visit(&self) -> Visit;

    fn navigate(&mut self, to: View);

    /// Navigate after `delay`, replacing any previously scheduled navigation.
    fn schedule(&mut self, to: View, delay: Duration);

    fn is_current(&self, visit: Visit) -> bool {
        self.visit() == visit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    to: View,
    due: Instant,
    /// Visit that scheduled it; any navigation in between cancels it.
    from: u64,
}

#[derive(Debug)]
pub struct Router {
    current: View,
    visit_id: u64,
    history: Vec<View>,
    scheduled: Option<Scheduled>,
}

impl Router {
    pub fn new(start: View) -> Self {
        Self {
            current: start,
            visit_id: 0,
            history: vec![start],
            scheduled: None,
        }
    }

    /// The most recent views shown, oldest first, at most [`HISTORY_LIMIT`].
    pub fn history(&self) -> &[View] {
        &self.history
    }

    pub fn has_scheduled(&self) -> bool {
        self.scheduled.is_some()
    }

    /// Fire the scheduled navigation if it is due. Returns true if it fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.scheduled {
            Some(s) if s.from != self.visit_id => {
                self.scheduled = None;
                false
            }
            Some(s) if now >= s.due => {
                self.scheduled = None;
                self.navigate(s.to);
                true
            }
            _ => false,
        }
    }
}

impl Navigator for Router {
    fn current(&self) -> View {
        self.current
    }

    fn visit(&self) -> Visit {
        Visit {
            view: self.current,
            id: self.visit_id,
        }
    }

    fn navigate(&mut self, to: View) {
        debug!(from = ?self.current, ?to, "navigate");
        self.current = to;
        self.visit_id += 1;
        if self.history.len() == HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.history.push(to);
    }

    fn schedule(&mut self, to: View, delay: Duration) {
        self.scheduled = Some(Scheduled {
            to,
            due: Instant::now() + delay,
            from: self.visit_id,
        });
    }
}
