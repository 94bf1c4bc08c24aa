//! Messages delivered to the host loop

use crate::clock::Tick;
use crate::timer::{Key, RemoteRequest};

use super::WindowId;

/// Everything the host loop reacts to. Schedules, completion handlers and
/// input readers only ever post these; all state changes happen in the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A schedule of one window fired
    Tick { window: WindowId, tick: Tick },
    /// A window's countdown reached zero
    Completed { window: WindowId },
    /// A keystroke for the focused window
    Key(Key),
    /// A remote command from the command line, a URL or the terminal
    Remote(RemoteRequest),
    /// Move keyboard focus to a 1-based window index
    Focus(i64),
    /// Show the dock badge for a 1-based window index, or hide it
    Badge(Option<i64>),
    /// Drag the focused window's dial to a position and release it
    Dial(f64),
    /// Close a 1-based window index
    Close(i64),
    /// Dump every window's status
    Status,
    /// Terminal input ended; exit once no countdown is in progress
    InputClosed,
}
