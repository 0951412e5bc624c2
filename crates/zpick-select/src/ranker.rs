//! 命中结果排序

use crate::config::SelectorConfig;
use crate::hit::HitResult;
use std::cmp::Ordering;
use std::collections::HashSet;

/// 按深度升序排序，深度相同时按 (形状ID, 子形状类型, 子形状索引) 决定先后
pub fn compare(a: &HitResult, b: &HitResult) -> Ordering {
    a.depth
        .total_cmp(&b.depth)
        .then_with(|| a.sub_shape().cmp(&b.sub_shape()))
}

/// 排序、按需去重并截断
pub fn rank(mut hits: Vec<HitResult>, config: &SelectorConfig) -> Vec<HitResult> {
    hits.sort_by(compare);

    if config.dedupe_by_shape {
        let mut seen = HashSet::new();
        hits.retain(|hit| seen.insert(hit.shape_id));
    }

    if config.max_results > 0 {
        hits.truncate(config.max_results);
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ShapeId;
    use zpick_core::kernel::SubShape;
    use zpick_core::math::Point3;

    fn hit(id: i32, sub: SubShape, depth: f64) -> HitResult {
        HitResult::new(ShapeId(id), sub, Point3::origin(), depth)
    }

    #[test]
    fn test_rank_by_depth_then_identity() {
        let hits = vec![
            hit(2, SubShape::Face(0), 10.0),
            hit(1, SubShape::Edge(3), 5.0),
            hit(1, SubShape::Face(1), 10.0),
            hit(1, SubShape::Whole, 10.0),
        ];
        let ranked = rank(hits, &SelectorConfig::default());

        let order: Vec<_> = ranked
            .iter()
            .map(|h| (h.shape_id.raw(), h.sub_shape_index))
            .collect();
        assert_eq!(order, vec![(1, 4), (1, 0), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_rank_dedupe_and_truncate() {
        let hits = vec![
            hit(1, SubShape::Face(0), 3.0),
            hit(2, SubShape::Face(0), 2.0),
            hit(1, SubShape::Edge(0), 1.0),
            hit(3, SubShape::Whole, 4.0),
        ];

        let config = SelectorConfig::default().with_dedupe_by_shape(true);
        let ranked = rank(hits.clone(), &config);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].shape_id, ShapeId(1));
        assert_eq!(ranked[0].depth, 1.0);

        let config = SelectorConfig::default().with_max_results(2);
        assert_eq!(rank(hits.clone(), &config).len(), 2);

        let unlimited = SelectorConfig::default().with_max_results(0);
        assert_eq!(rank(hits, &unlimited).len(), 4);
    }
}
