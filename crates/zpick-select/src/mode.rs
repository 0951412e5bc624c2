//! 选择模式
//!
//! 每个实体持有一个模式位集，决定拾取时生成哪些粒度的候选。

use serde::{Deserialize, Serialize};
use std::fmt;
use zpick_core::kernel::SubShapeType;

/// 选择模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SelectionMode {
    /// 整个形状作为一个候选
    Shape,
    /// 每个面一个候选
    Face,
    /// 每条边一个候选
    Edge,
    /// 每个顶点一个候选
    Vertex,
}

impl SelectionMode {
    /// 所有模式，按候选生成顺序排列
    pub const ALL: [SelectionMode; 4] = [
        SelectionMode::Shape,
        SelectionMode::Face,
        SelectionMode::Edge,
        SelectionMode::Vertex,
    ];

    /// 该模式产生的子形状类型
    pub fn sub_shape_type(&self) -> SubShapeType {
        match self {
            SelectionMode::Shape => SubShapeType::Shape,
            SelectionMode::Face => SubShapeType::Face,
            SelectionMode::Edge => SubShapeType::Edge,
            SelectionMode::Vertex => SubShapeType::Vertex,
        }
    }

    fn bit(self) -> u8 {
        match self {
            SelectionMode::Shape => 1 << 0,
            SelectionMode::Face => 1 << 1,
            SelectionMode::Edge => 1 << 2,
            SelectionMode::Vertex => 1 << 3,
        }
    }
}

/// 模式位集
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModeSet(u8);

impl ModeSet {
    /// 空集合
    pub const fn empty() -> Self {
        Self(0)
    }

    /// 由模式列表创建
    pub fn from_modes(modes: impl IntoIterator<Item = SelectionMode>) -> Self {
        let mut set = Self::empty();
        for mode in modes {
            set.insert(mode);
        }
        set
    }

    /// 激活模式，返回之前是否未激活
    pub fn insert(&mut self, mode: SelectionMode) -> bool {
        let was_absent = !self.contains(mode);
        self.0 |= mode.bit();
        was_absent
    }

    /// 取消模式，返回之前是否已激活
    pub fn remove(&mut self, mode: SelectionMode) -> bool {
        let was_present = self.contains(mode);
        self.0 &= !mode.bit();
        was_present
    }

    pub fn contains(&self, mode: SelectionMode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// 按固定顺序（Shape、Face、Edge、Vertex）遍历激活的模式
    pub fn iter(&self) -> impl Iterator<Item = SelectionMode> + '_ {
        SelectionMode::ALL
            .into_iter()
            .filter(move |mode| self.contains(*mode))
    }
}

impl Default for ModeSet {
    /// 默认只激活 `Shape` 模式
    fn default() -> Self {
        Self::from_modes([SelectionMode::Shape])
    }
}

impl fmt::Debug for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
