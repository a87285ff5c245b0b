pub mod backend;
pub mod dispatch;
pub mod status;
