//! 방 모델, 코드 생성, 역할 배정

pub mod id;
pub mod model;
pub mod roles;

pub use id::*;
pub use model::*;
pub use roles::*;
