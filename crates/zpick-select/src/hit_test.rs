//! 命中测试
//!
//! 对单个候选执行点选或区域（矩形/多边形）测试。
//! 点选先尝试射线求交，再退回到屏幕空间的像素容差；
//! 区域选择投影采样点，任一采样点落在区域内即命中。

use crate::candidate::Candidate;
use crate::hit::HitResult;
use zpick_core::kernel::{GeometryKernel, SampleDensity};
use zpick_core::math::{polygon_contains_point, BoundingBox2, PickRay, Point2};
use zpick_view::Projector;

/// 屏幕空间查询区域
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenRegion {
    /// 规范化后的矩形
    Rect(BoundingBox2),
    /// 多边形（可闭合也可不闭合）
    Polygon(Vec<Point2>),
}

impl ScreenRegion {
    /// 由任意两个对角点创建矩形区域
    pub fn rect(a: Point2, b: Point2) -> Self {
        ScreenRegion::Rect(BoundingBox2::from_corners(a, b))
    }

    /// 区域是否为空（零面积矩形或少于3个顶点的多边形）
    pub fn is_degenerate(&self) -> bool {
        match self {
            ScreenRegion::Rect(rect) => rect.is_degenerate(),
            ScreenRegion::Polygon(points) => points.len() < 3,
        }
    }

    /// 像素是否在区域内（矩形含边界）
    pub fn contains(&self, pixel: &Point2) -> bool {
        match self {
            ScreenRegion::Rect(rect) => rect.contains(pixel),
            ScreenRegion::Polygon(points) => polygon_contains_point(points, pixel),
        }
    }
}

/// 一次查询内共享的命中测试器
pub struct HitTester<'k, K> {
    kernel: &'k K,
    projector: Projector,
    pixel_tolerance: f64,
    density: SampleDensity,
}

impl<'k, K: GeometryKernel> HitTester<'k, K> {
    pub fn new(
        kernel: &'k K,
        projector: Projector,
        pixel_tolerance: f64,
        density: SampleDensity,
    ) -> Self {
        Self {
            kernel,
            projector,
            pixel_tolerance,
            density,
        }
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// 点选测试
    pub fn pick_point(
        &self,
        candidate: &Candidate<'_, K::Shape>,
        pixel: &Point2,
        ray: &PickRay,
    ) -> Option<HitResult> {
        if candidate.sub.is_areal() {
            if let Some(point) = self
                .kernel
                .intersect_ray(candidate.geometry, candidate.sub, ray)
            {
                let depth = self.projector.depth_of(&point);
                return Some(HitResult::new(candidate.shape_id, candidate.sub, point, depth));
            }
        }

        let nearest = self
            .kernel
            .nearest_to_ray(candidate.geometry, candidate.sub, ray)?;
        let screen = self.projector.world_to_screen(&nearest)?;
        let distance = (screen.pixel - pixel).norm();
        if distance <= self.pixel_tolerance {
            Some(HitResult::new(
                candidate.shape_id,
                candidate.sub,
                nearest,
                screen.depth,
            ))
        } else {
            None
        }
    }

    /// 区域测试：命中点取区域内深度最小的采样点
    pub fn pick_region(
        &self,
        candidate: &Candidate<'_, K::Shape>,
        region: &ScreenRegion,
    ) -> Option<HitResult> {
        self.kernel
            .sample_points(candidate.geometry, candidate.sub, &self.density)
            .into_iter()
            .filter_map(|point| {
                let screen = self.projector.world_to_screen(&point)?;
                region.contains(&screen.pixel).then_some((point, screen))
            })
            .min_by(|a, b| a.1.depth.total_cmp(&b.1.depth))
            .map(|(point, screen)| {
                HitResult::new(candidate.shape_id, candidate.sub, point, screen.depth)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ShapeId;
    use zpick_core::kernel::{BRepKernel, SubShape, SubShapeType};
    use zpick_core::math::{approx_eq_tol, Point3};
    use zpick_core::shape::Shape;
    use zpick_view::{Camera, Viewport};

    fn tester(kernel: &BRepKernel, tolerance: f64) -> HitTester<'_, BRepKernel> {
        let projector = Camera::new().projector(Viewport::new(800.0, 600.0)).unwrap();
        HitTester::new(kernel, projector, tolerance, SampleDensity::default())
    }

    fn candidate(shape: &Shape, sub: SubShape) -> Candidate<'_, Shape> {
        Candidate {
            shape_id: ShapeId(1),
            geometry: shape,
            sub,
        }
    }

    #[test]
    fn test_region() {
        let rect = ScreenRegion::rect(Point2::new(10.0, 10.0), Point2::new(0.0, 0.0));
        assert!(rect.contains(&Point2::new(10.0, 5.0)));
        assert!(!rect.is_degenerate());
        assert!(ScreenRegion::rect(Point2::new(1.0, 1.0), Point2::new(1.0, 9.0)).is_degenerate());

        let lasso = ScreenRegion::Polygon(vec![Point2::new(0.0, 0.0), Point2::new(5.0, 5.0)]);
        assert!(lasso.is_degenerate());
    }

    #[test]
    fn test_pick_point_face_intersection() {
        let kernel = BRepKernel;
        let tester = tester(&kernel, 2.0);
        let shape = Shape::make_box_centered(Point3::origin(), 10.0, 10.0, 10.0).unwrap();

        let pixel = Point2::new(400.0, 300.0);
        let ray = tester.projector().pick_ray(&pixel);
        let hit = tester
            .pick_point(&candidate(&shape, SubShape::Whole), &pixel, &ray)
            .unwrap();
        assert_eq!(hit.sub_shape_type, SubShapeType::Shape);
        assert_eq!(hit.sub_shape_index, 0);
        assert!(approx_eq_tol(hit.depth, 45.0, 1e-6));

        // -Z 面在盒体背面，射线同样穿过
        let back = tester
            .pick_point(&candidate(&shape, SubShape::Face(4)), &pixel, &ray)
            .unwrap();
        assert!(approx_eq_tol(back.depth, 55.0, 1e-6));
        assert_eq!(back.sub_shape_index, 5);
    }

    #[test]
    fn test_pick_point_edge_tolerance() {
        let kernel = BRepKernel;
        let shape = Shape::make_box_centered(Point3::origin(), 10.0, 10.0, 10.0).unwrap();
        // 前上边 y = 5, z = 5 投影在像素 y ≈ 219.5
        let front_top = shape
            .edges()
            .iter()
            .position(|e| {
                e.points()
                    .iter()
                    .all(|p| approx_eq_tol(p.y, 5.0, 1e-9) && approx_eq_tol(p.z, 5.0, 1e-9))
            })
            .unwrap();
        let edge = candidate(&shape, SubShape::Edge(front_top));

        let tight = tester(&kernel, 2.0);
        let pixel = Point2::new(400.0, 221.0);
        let ray = tight.projector().pick_ray(&pixel);
        let hit = tight.pick_point(&edge, &pixel, &ray).unwrap();
        assert!(approx_eq_tol(hit.point.y, 5.0, 1e-6));
        assert!(approx_eq_tol(hit.depth, 45.0, 1e-6));

        let pixel = Point2::new(400.0, 226.0);
        let ray = tight.projector().pick_ray(&pixel);
        assert!(tight.pick_point(&edge, &pixel, &ray).is_none());

        let loose = tester(&kernel, 8.0);
        assert!(loose.pick_point(&edge, &pixel, &ray).is_some());
    }

    #[test]
    fn test_pick_region() {
        let kernel = BRepKernel;
        let tester = tester(&kernel, 2.0);
        let shape = Shape::make_box_centered(Point3::origin(), 10.0, 10.0, 10.0).unwrap();
        let whole = candidate(&shape, SubShape::Whole);

        let region = ScreenRegion::rect(Point2::new(100.0, 100.0), Point2::new(700.0, 500.0));
        let hit = tester.pick_region(&whole, &region).unwrap();
        // 区域内最近的采样点在前表面 z = 5 上
        assert!(approx_eq_tol(hit.depth, 45.0, 1e-6));

        // 只框住右上角顶点附近
        let corner = ScreenRegion::rect(Point2::new(500.0, 210.0), Point2::new(520.0, 225.0));
        let hit = tester.pick_region(&whole, &corner).unwrap();
        assert!(approx_eq_tol(hit.point.x, 5.0, 1e-9));
        assert!(approx_eq_tol(hit.point.y, 5.0, 1e-9));

        let outside = ScreenRegion::rect(Point2::new(0.0, 0.0), Point2::new(50.0, 50.0));
        assert!(tester.pick_region(&whole, &outside).is_none());
    }
}
