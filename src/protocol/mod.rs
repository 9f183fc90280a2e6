//! 프로토콜 메시지

pub mod messages;

pub use messages::*;
