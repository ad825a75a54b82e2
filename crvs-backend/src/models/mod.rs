mod application_config;
mod informant_sms_notification;
mod record;
mod session;
mod user_audit;

pub use application_config::*;
pub use informant_sms_notification::*;
pub use record::*;
pub use session::*;
pub use user_audit::*;
