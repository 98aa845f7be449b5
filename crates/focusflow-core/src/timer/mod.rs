mod engine;
mod runtime;
mod schedule;
mod ticker;

pub use engine::{FocusTimer, TickSourceId, TimerState};
pub use runtime::{RuntimeClosed, TimerCommand, TimerHandle, TimerRuntime};
pub use schedule::{Bounds, DurationSettings, TimerMode, FOCUS_INTERVALS_PER_LONG_BREAK};
pub use ticker::{Ticker, TICK_PERIOD};
