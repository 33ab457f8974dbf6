/// Middleware module
///
/// Bearer-token authentication and request timing.

mod bearer;
mod process_time;

pub use bearer::BearerAuth;
pub use process_time::ProcessTime;
