//! 几何内核接口
//!
//! 选择引擎只通过 [`GeometryKernel`] 访问几何：枚举子形状、
//! 射线求交、求离射线最近的点以及采样代表点。
//! [`BRepKernel`] 是基于 [`Shape`] 的默认实现，射线粗筛使用 parry3d 的包围盒。

use crate::math::{closest_points_segments, ray_triangle_intersection, PickRay, Point3, EPSILON};
use crate::shape::{Edge, Shape};
use parry3d::bounding_volume::Aabb;
use parry3d::math::{Point as ParryPoint, Vector as ParryVector};
use parry3d::query::{Ray, RayCast};
use serde::{Deserialize, Serialize};

/// 子形状类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubShapeType {
    /// 整个形状
    Shape,
    /// 面
    Face,
    /// 边
    Edge,
    /// 顶点
    Vertex,
}

impl SubShapeType {
    /// 类型名称
    pub fn name(&self) -> &'static str {
        match self {
            SubShapeType::Shape => "Shape",
            SubShapeType::Face => "Face",
            SubShapeType::Edge => "Edge",
            SubShapeType::Vertex => "Vertex",
        }
    }
}

/// 形状内部的子形状（索引从0开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubShape {
    Whole,
    Face(usize),
    Edge(usize),
    Vertex(usize),
}

impl SubShape {
    /// 由类型和0基索引构造；`Shape` 类型忽略索引
    pub fn new(kind: SubShapeType, index: usize) -> Self {
        match kind {
            SubShapeType::Shape => SubShape::Whole,
            SubShapeType::Face => SubShape::Face(index),
            SubShapeType::Edge => SubShape::Edge(index),
            SubShapeType::Vertex => SubShape::Vertex(index),
        }
    }

    /// 子形状类型
    pub fn sub_shape_type(&self) -> SubShapeType {
        match self {
            SubShape::Whole => SubShapeType::Shape,
            SubShape::Face(_) => SubShapeType::Face,
            SubShape::Edge(_) => SubShapeType::Edge,
            SubShape::Vertex(_) => SubShapeType::Vertex,
        }
    }

    /// 对外索引：整体为0，其余从1开始
    pub fn external_index(&self) -> usize {
        match *self {
            SubShape::Whole => 0,
            SubShape::Face(i) | SubShape::Edge(i) | SubShape::Vertex(i) => i + 1,
        }
    }

    /// 是否是有面积的子形状（可以做射线求交）
    pub fn is_areal(&self) -> bool {
        matches!(self, SubShape::Whole | SubShape::Face(_))
    }
}

/// 区域查询时的采样密度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDensity {
    /// 每个边线段内部额外插入的采样点数
    pub edge_samples: usize,
}

impl SampleDensity {
    /// 每段内部采样点数的上限
    pub const MAX_EDGE_SAMPLES: usize = 1024;

    /// 实际使用的每段采样点数（不超过上限）
    pub fn clamped_edge_samples(&self) -> usize {
        self.edge_samples.min(Self::MAX_EDGE_SAMPLES)
    }
}

impl Default for SampleDensity {
    fn default() -> Self {
        Self { edge_samples: 8 }
    }
}

/// 几何内核
///
/// 实现必须是无副作用的：同样的输入总是给出同样的结果。
/// 索引越界的子形状视为不存在（返回 `None` 或空列表）。
pub trait GeometryKernel {
    /// 不透明的形状句柄
    type Shape;

    /// 指定类型子形状的数量；`Shape` 类型总是1
    fn sub_shape_count(&self, shape: &Self::Shape, kind: SubShapeType) -> usize;

    /// 射线与子形状的最近交点；边和顶点没有交点
    fn intersect_ray(&self, shape: &Self::Shape, sub: SubShape, ray: &PickRay) -> Option<Point3>;

    /// 子形状上离射线最近的点
    fn nearest_to_ray(&self, shape: &Self::Shape, sub: SubShape, ray: &PickRay) -> Option<Point3>;

    /// 子形状的代表采样点，用于屏幕空间包含测试
    fn sample_points(
        &self,
        shape: &Self::Shape,
        sub: SubShape,
        density: &SampleDensity,
    ) -> Vec<Point3>;
}

/// 基于 [`Shape`] 的默认几何内核
#[derive(Debug, Clone, Copy, Default)]
pub struct BRepKernel;

impl GeometryKernel for BRepKernel {
    type Shape = Shape;

    fn sub_shape_count(&self, shape: &Shape, kind: SubShapeType) -> usize {
        match kind {
            SubShapeType::Shape => 1,
            SubShapeType::Face => shape.face_count(),
            SubShapeType::Edge => shape.edge_count(),
            SubShapeType::Vertex => shape.vertex_count(),
        }
    }

    fn intersect_ray(&self, shape: &Shape, sub: SubShape, ray: &PickRay) -> Option<Point3> {
        match sub {
            SubShape::Whole => {
                let triangles = shape.faces().iter().flat_map(|f| f.triangles());
                cast_triangles(triangles, ray)
            }
            SubShape::Face(i) => cast_triangles(shape.face(i)?.triangles().iter(), ray),
            SubShape::Edge(_) | SubShape::Vertex(_) => None,
        }
    }

    fn nearest_to_ray(&self, shape: &Shape, sub: SubShape, ray: &PickRay) -> Option<Point3> {
        match sub {
            SubShape::Whole => {
                if shape.edges().is_empty() {
                    nearest_vertex(shape.vertices().iter(), ray)
                } else {
                    nearest_on_edges(shape.edges().iter(), ray)
                }
            }
            SubShape::Face(i) => {
                let face = shape.face(i)?;
                let boundary = face.boundary().iter().filter_map(|&e| shape.edge(e));
                nearest_on_edges(boundary, ray).or_else(|| {
                    // 没有记录边界时退回三角形轮廓
                    nearest_on_segments(
                        face.triangles()
                            .iter()
                            .flat_map(|[a, b, c]| [(*a, *b), (*b, *c), (*c, *a)]),
                        ray,
                    )
                })
            }
            SubShape::Edge(i) => nearest_on_edges(std::iter::once(shape.edge(i)?), ray),
            SubShape::Vertex(i) => shape.vertex(i).copied(),
        }
    }

    fn sample_points(&self, shape: &Shape, sub: SubShape, density: &SampleDensity) -> Vec<Point3> {
        let mut samples = Vec::new();
        match sub {
            SubShape::Whole => {
                samples.extend_from_slice(shape.vertices());
                for edge in shape.edges() {
                    sample_edge(edge, density, &mut samples);
                }
                for face in shape.faces() {
                    samples.extend(face.triangles().iter().map(triangle_centroid));
                }
            }
            SubShape::Face(i) => {
                if let Some(face) = shape.face(i) {
                    for tri in face.triangles() {
                        samples.extend_from_slice(tri);
                        samples.push(triangle_centroid(tri));
                    }
                    for edge in face.boundary().iter().filter_map(|&e| shape.edge(e)) {
                        sample_edge(edge, density, &mut samples);
                    }
                }
            }
            SubShape::Edge(i) => {
                if let Some(edge) = shape.edge(i) {
                    sample_edge(edge, density, &mut samples);
                }
            }
            SubShape::Vertex(i) => samples.extend(shape.vertex(i).copied()),
        }
        samples
    }
}

fn to_parry_point(p: &Point3) -> ParryPoint<f32> {
    ParryPoint::new(p.x as f32, p.y as f32, p.z as f32)
}

/// 射线与三角形集合求最近交点
///
/// 先用 parry3d 的包围盒射线测试做粗筛，再逐个三角形精确求交。
fn cast_triangles<'a>(
    triangles: impl Iterator<Item = &'a [Point3; 3]> + Clone,
    ray: &PickRay,
) -> Option<Point3> {
    if ray.is_degenerate() {
        return None;
    }

    let dir = ray.direction();
    let max_toi = ray.length() as f32;
    let parry_ray = Ray::new(
        to_parry_point(&ray.origin),
        ParryVector::new(dir.x as f32, dir.y as f32, dir.z as f32),
    );

    // 先用包围盒快速剔除
    let mut mins = ParryPoint::new(f32::MAX, f32::MAX, f32::MAX);
    let mut maxs = ParryPoint::new(f32::MIN, f32::MIN, f32::MIN);
    for p in triangles.clone().flatten() {
        let q = to_parry_point(p);
        mins = mins.inf(&q);
        maxs = maxs.sup(&q);
    }
    if mins.x > maxs.x {
        return None;
    }
    // f32 精度下的保守边距
    let magnitude = mins.coords.abs().max().max(maxs.coords.abs().max());
    let margin = ParryVector::repeat(1.0e-3_f32.max(magnitude * 1.0e-5));
    let aabb = Aabb::new(mins - margin, maxs + margin);
    if !aabb.intersects_local_ray(&parry_ray, max_toi) {
        return None;
    }

    triangles
        .filter_map(|tri| ray_triangle_intersection(ray, tri))
        .min_by(f64::total_cmp)
        .map(|toi| ray.point_at(toi))
}

fn nearest_on_edges<'a>(edges: impl Iterator<Item = &'a Edge>, ray: &PickRay) -> Option<Point3> {
    nearest_on_segments(edges.flat_map(|e| e.segments()), ray)
}

/// 所有线段上离射线最近的点
fn nearest_on_segments(
    segments: impl Iterator<Item = (Point3, Point3)>,
    ray: &PickRay,
) -> Option<Point3> {
    let mut best: Option<(Point3, f64)> = None;
    for (a, b) in segments {
        let (on_segment, on_ray) = closest_points_segments(&a, &b, &ray.origin, &ray.end);
        let dist = (on_segment - on_ray).norm();
        if best.map_or(true, |(_, d)| dist < d - EPSILON) {
            best = Some((on_segment, dist));
        }
    }
    best.map(|(p, _)| p)
}

fn nearest_vertex<'a>(vertices: impl Iterator<Item = &'a Point3>, ray: &PickRay) -> Option<Point3> {
    vertices
        .map(|v| (*v, ray.distance_to_point(v)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p)
}

fn triangle_centroid(tri: &[Point3; 3]) -> Point3 {
    Point3::from((tri[0].coords + tri[1].coords + tri[2].coords) / 3.0)
}

/// 采样一条边：所有折线点，加上每段内部的均匀插值点
fn sample_edge(edge: &Edge, density: &SampleDensity, out: &mut Vec<Point3>) {
    out.extend_from_slice(edge.points());
    let n = density.clamped_edge_samples();
    let divisor = n as f64 + 1.0;
    for (a, b) in edge.segments() {
        for k in 1..=n {
            let t = k as f64 / divisor;
            out.push(a + (b - a) * t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq, points_approx_eq};

    fn unit_box_at_origin() -> Shape {
        Shape::make_box_centered(Point3::origin(), 10.0, 10.0, 10.0).unwrap()
    }

    fn down_z_ray(x: f64, y: f64) -> PickRay {
        PickRay::new(Point3::new(x, y, 50.0), Point3::new(x, y, -50.0))
    }

    #[test]
    fn test_sub_shape_counts() {
        let kernel = BRepKernel;
        let shape = unit_box_at_origin();
        assert_eq!(kernel.sub_shape_count(&shape, SubShapeType::Shape), 1);
        assert_eq!(kernel.sub_shape_count(&shape, SubShapeType::Face), 6);
        assert_eq!(kernel.sub_shape_count(&shape, SubShapeType::Edge), 12);
        assert_eq!(kernel.sub_shape_count(&shape, SubShapeType::Vertex), 8);
    }

    #[test]
    fn test_external_index() {
        assert_eq!(SubShape::Whole.external_index(), 0);
        assert_eq!(SubShape::Face(0).external_index(), 1);
        assert_eq!(SubShape::new(SubShapeType::Edge, 4), SubShape::Edge(4));
        assert_eq!(SubShape::new(SubShapeType::Shape, 4), SubShape::Whole);
        assert!(SubShape::Face(2).is_areal());
        assert!(!SubShape::Edge(2).is_areal());
    }

    #[test]
    fn test_intersect_whole_shape_nearest_face() {
        let kernel = BRepKernel;
        let shape = unit_box_at_origin();

        let hit = kernel
            .intersect_ray(&shape, SubShape::Whole, &down_z_ray(1.0, 2.0))
            .unwrap();
        // 射线从 +Z 方向进入，最先碰到 z = 5 的顶面
        assert!((hit - Point3::new(1.0, 2.0, 5.0)).norm() < 1e-4);

        assert!(kernel
            .intersect_ray(&shape, SubShape::Whole, &down_z_ray(20.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_intersect_single_face() {
        let kernel = BRepKernel;
        let shape = unit_box_at_origin();

        // 面4是 -Z 面
        let hit = kernel
            .intersect_ray(&shape, SubShape::Face(4), &down_z_ray(0.0, 0.0))
            .unwrap();
        assert!((hit.z + 5.0).abs() < 1e-4);

        // 侧面与竖直射线平行，没有交点
        assert!(kernel
            .intersect_ray(&shape, SubShape::Face(0), &down_z_ray(0.0, 0.0))
            .is_none());
        assert!(kernel
            .intersect_ray(&shape, SubShape::Edge(0), &down_z_ray(0.0, 0.0))
            .is_none());
        assert!(kernel
            .intersect_ray(&shape, SubShape::Face(99), &down_z_ray(0.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_intersect_concave_face_gap() {
        let kernel = BRepKernel;
        let shape = Shape::make_planar_face(&[
            Point3::new(10.0, 4.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(4.0, 10.0, 0.0),
            Point3::new(-10.0, 10.0, 0.0),
            Point3::new(-10.0, -10.0, 0.0),
            Point3::new(10.0, -10.0, 0.0),
        ])
        .unwrap();

        // (5, 5) 在 L 形的缺口里
        assert!(kernel
            .intersect_ray(&shape, SubShape::Whole, &down_z_ray(5.0, 5.0))
            .is_none());
        assert!(kernel
            .intersect_ray(&shape, SubShape::Face(0), &down_z_ray(8.0, 8.0))
            .is_none());

        let hit = kernel
            .intersect_ray(&shape, SubShape::Whole, &down_z_ray(-5.0, 0.0))
            .unwrap();
        assert!(approx_eq(hit.z, 0.0));
    }

    #[test]
    fn test_nearest_to_ray_on_edge() {
        let kernel = BRepKernel;
        let shape = Shape::make_polyline(&[Point3::new(-5.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0)])
            .unwrap();

        let nearest = kernel
            .nearest_to_ray(&shape, SubShape::Edge(0), &down_z_ray(2.0, 0.3))
            .unwrap();
        assert!(points_approx_eq(&nearest, &Point3::new(2.0, 0.0, 0.0)));

        // 整体模式下没有面，也使用边
        let whole = kernel
            .nearest_to_ray(&shape, SubShape::Whole, &down_z_ray(-7.0, 0.0))
            .unwrap();
        assert!(points_approx_eq(&whole, &Point3::new(-5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_nearest_to_ray_on_face_boundary() {
        let kernel = BRepKernel;
        let shape = unit_box_at_origin();

        // 射线在盒体外侧，+X 面（面1）的最近点在 x = 5 上
        let nearest = kernel
            .nearest_to_ray(&shape, SubShape::Face(1), &down_z_ray(6.0, 0.0))
            .unwrap();
        assert!(approx_eq(nearest.x, 5.0));

        let vertex = kernel
            .nearest_to_ray(&shape, SubShape::Vertex(7), &down_z_ray(0.0, 0.0))
            .unwrap();
        assert!(points_approx_eq(&vertex, &Point3::new(5.0, 5.0, 5.0)));
    }

    #[test]
    fn test_sample_points() {
        let kernel = BRepKernel;
        let shape = unit_box_at_origin();
        let density = SampleDensity { edge_samples: 3 };

        let edge_samples = kernel.sample_points(&shape, SubShape::Edge(0), &density);
        assert_eq!(edge_samples.len(), 2 + 3);

        let vertex_samples = kernel.sample_points(&shape, SubShape::Vertex(0), &density);
        assert_eq!(vertex_samples.len(), 1);

        // 面：2个三角形 × (3顶点 + 形心) + 4条边 × 5
        let face_samples = kernel.sample_points(&shape, SubShape::Face(0), &density);
        assert_eq!(face_samples.len(), 2 * 4 + 4 * 5);

        // 整体：8顶点 + 12条边 × 5 + 12个三角形形心
        let whole = kernel.sample_points(&shape, SubShape::Whole, &density);
        assert_eq!(whole.len(), 8 + 12 * 5 + 12);

        assert!(kernel
            .sample_points(&shape, SubShape::Edge(42), &density)
            .is_empty());

        let dense = SampleDensity {
            edge_samples: usize::MAX,
        };
        let capped = kernel.sample_points(&shape, SubShape::Edge(0), &dense);
        assert_eq!(capped.len(), 2 + SampleDensity::MAX_EDGE_SAMPLES);
    }
}
