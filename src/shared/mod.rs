pub mod fs_atomic;
pub mod ids;
pub mod logging;

pub use ids::{MemberId, PrincipalId, ProjectId, RoleId};
pub use logging::{append_event_log, event_log_path, EventLog, LogLevel};
