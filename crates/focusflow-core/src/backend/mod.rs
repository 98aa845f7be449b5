//! Collaborators on the far side of the timer: the hosted backend, the local
//! fallback session log and the task cache.

pub mod local;
pub mod supabase;
pub mod task_cache;
pub mod traits;
pub mod types;

pub use local::{LocalSessionLog, MirroredSessionLog};
pub use supabase::SupabaseClient;
pub use task_cache::CachedTaskSource;
pub use traits::{SessionLogger, TaskSource};
pub use types::{FocusSessionRecord, NewFocusSession, SessionType, Task, TaskId};
