pub mod bridge;
pub mod health;
pub mod logs;
pub mod status;
