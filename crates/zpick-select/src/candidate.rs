//! 候选生成
//!
//! 按形状ID升序、模式固定顺序展开所有可拾取的子形状。

use crate::entity::{SelectableEntity, ShapeId};
use std::collections::HashMap;
use zpick_core::kernel::{GeometryKernel, SubShape};

/// 拾取候选
#[derive(Debug)]
pub struct Candidate<'a, S> {
    pub shape_id: ShapeId,
    pub geometry: &'a S,
    pub sub: SubShape,
}

// 手动实现，避免对 S 施加 Clone/Copy 约束
impl<S> Clone for Candidate<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Candidate<'_, S> {}

/// 展开注册表中的所有候选
pub fn generate<'a, K: GeometryKernel>(
    kernel: &K,
    entities: &'a HashMap<ShapeId, SelectableEntity<K::Shape>>,
) -> Vec<Candidate<'a, K::Shape>> {
    let mut ids: Vec<&ShapeId> = entities.keys().collect();
    ids.sort();

    let mut candidates = Vec::new();
    for id in ids {
        let entity = &entities[id];
        for mode in entity.modes.iter() {
            let kind = mode.sub_shape_type();
            let count = kernel.sub_shape_count(&entity.geometry, kind);
            candidates.extend((0..count).map(|i| Candidate {
                shape_id: *id,
                geometry: &entity.geometry,
                sub: SubShape::new(kind, i),
            }));
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{ModeSet, SelectionMode};
    use zpick_core::kernel::BRepKernel;
    use zpick_core::shape::Shape;

    #[test]
    fn test_candidate_order() {
        let kernel = BRepKernel;
        let shape = Shape::make_box(1.0, 1.0, 1.0).unwrap();
        let mut entities = HashMap::new();
        entities.insert(
            ShapeId(5),
            SelectableEntity::new(shape.clone())
                .with_modes(ModeSet::from_modes([SelectionMode::Vertex, SelectionMode::Shape])),
        );
        entities.insert(ShapeId(-1), SelectableEntity::new(shape.clone()));
        entities.insert(
            ShapeId(3),
            SelectableEntity::new(shape).with_modes(ModeSet::empty()),
        );

        let candidates = generate(&kernel, &entities);
        // -1: 整体；5: 整体 + 8个顶点；3: 无模式
        assert_eq!(candidates.len(), 1 + 1 + 8);
        assert_eq!(candidates[0].shape_id, ShapeId(-1));
        assert_eq!(candidates[1].shape_id, ShapeId(5));
        assert_eq!(candidates[1].sub, SubShape::Whole);
        assert_eq!(candidates[2].sub, SubShape::Vertex(0));
        assert_eq!(candidates[9].sub, SubShape::Vertex(7));
    }

    #[test]
    fn test_empty_registry() {
        let entities: HashMap<ShapeId, SelectableEntity<Shape>> = HashMap::new();
        assert!(generate(&BRepKernel, &entities).is_empty());
    }
}
