//! 워크플로 전반에서 사용되는 공통 타입.

mod configuration;
mod horizon;
mod model;

pub use configuration::*;
pub use horizon::*;
pub use model::*;
