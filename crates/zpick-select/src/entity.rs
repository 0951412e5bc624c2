//! 可选实体
//!
//! 注册表中的每条记录都是值类型：几何句柄加上一组激活的选择模式。

use crate::mode::{ModeSet, SelectionMode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 形状标识符（由调用方分配）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(pub i32);

impl ShapeId {
    /// 原始值
    pub fn raw(&self) -> i32 {
        self.0
    }
}

impl From<i32> for ShapeId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 注册的可选实体
#[derive(Debug, Clone, PartialEq)]
pub struct SelectableEntity<S> {
    /// 几何句柄
    pub geometry: S,

    /// 激活的选择模式
    pub modes: ModeSet,
}

impl<S> SelectableEntity<S> {
    /// 创建新实体，默认激活 `Shape` 模式
    pub fn new(geometry: S) -> Self {
        Self {
            geometry,
            modes: ModeSet::default(),
        }
    }

    /// 使用指定的模式集合
    pub fn with_modes(mut self, modes: ModeSet) -> Self {
        self.modes = modes;
        self
    }

    /// 是否激活了指定模式
    pub fn is_mode_active(&self, mode: SelectionMode) -> bool {
        self.modes.contains(mode)
    }

    /// 是否参与拾取（至少一个模式激活）
    pub fn is_selectable(&self) -> bool {
        !self.modes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_has_shape_mode() {
        let entity = SelectableEntity::new("geometry");
        assert!(entity.is_mode_active(SelectionMode::Shape));
        assert!(!entity.is_mode_active(SelectionMode::Face));
        assert!(entity.is_selectable());

        let hidden = entity.with_modes(ModeSet::empty());
        assert!(!hidden.is_selectable());
    }

    #[test]
    fn test_shape_id() {
        let id: ShapeId = 42.into();
        assert_eq!(id.raw(), 42);
        assert_eq!(id.to_string(), "42");
        assert!(ShapeId(1) < ShapeId(2));
    }
}
