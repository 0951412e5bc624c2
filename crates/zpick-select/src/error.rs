//! 选择器注册错误定义

use crate::entity::ShapeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
    #[error("Shape id already registered: {0}")]
    DuplicateId(ShapeId),

    #[error("Shape id not found: {0}")]
    UnknownId(ShapeId),
}
