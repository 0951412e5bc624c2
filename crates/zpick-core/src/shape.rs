//! 边界表示（B-rep）形状
//!
//! 轻量的拓扑模型：形状由顶点、边和面组成。
//! - 边用折线表示（曲线边按段数离散）
//! - 面用三角形集合表示，并记录其边界边的索引
//!
//! 所有索引在形状内部从0开始；选择结果中对外暴露的索引从1开始。

use crate::error::ShapeError;
use crate::math::{BoundingBox3, Point2, Point3, Vector3, EPSILON};
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};

/// 平面面的共面容差（相对于轮廓尺寸）
const PLANAR_TOLERANCE: f64 = 1e-9;

/// 盒体的边（角点索引对），角点编号见 [`BoundingBox3::corners`]
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// 盒体的面：-X, +X, -Y, +Y, -Z, +Z
const BOX_FACES: [[usize; 4]; 6] = [
    [0, 4, 6, 2],
    [1, 3, 7, 5],
    [0, 1, 5, 4],
    [2, 6, 7, 3],
    [0, 2, 3, 1],
    [4, 5, 7, 6],
];

/// 边（折线）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    points: Vec<Point3>,
}

impl Edge {
    /// 创建直线边
    pub fn line(start: Point3, end: Point3) -> Self {
        Self {
            points: vec![start, end],
        }
    }

    /// 从折线点创建边，至少需要2个点
    pub fn polyline(points: Vec<Point3>) -> Result<Self, ShapeError> {
        if points.len() < 2 {
            return Err(ShapeError::TooFewPoints {
                required: 2,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// 折线点
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// 遍历所有线段
    pub fn segments(&self) -> impl Iterator<Item = (Point3, Point3)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// 边长
    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| (b - a).norm()).sum()
    }

    /// 是否闭合（首尾重合）
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => self.points.len() > 2 && (last - first).norm() <= EPSILON,
            _ => false,
        }
    }

    fn transformed(&self, transform: &Transform3D) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| transform.transform_point(p))
                .collect(),
        }
    }
}

/// 面（三角化表示）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    triangles: Vec<[Point3; 3]>,
    /// 边界边在所属形状中的索引
    boundary: Vec<usize>,
}

impl Face {
    /// 三角形列表
    pub fn triangles(&self) -> &[[Point3; 3]] {
        &self.triangles
    }

    /// 边界边索引
    pub fn boundary(&self) -> &[usize] {
        &self.boundary
    }

    /// 面积
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|[a, b, c]| (b - a).cross(&(c - a)).norm() * 0.5)
            .sum()
    }

    /// 面积加权的形心
    pub fn centroid(&self) -> Option<Point3> {
        let mut weighted = Vector3::zeros();
        let mut total = 0.0;
        for [a, b, c] in &self.triangles {
            let area = (b - a).cross(&(c - a)).norm() * 0.5;
            weighted += (a.coords + b.coords + c.coords) / 3.0 * area;
            total += area;
        }
        (total > EPSILON).then(|| Point3::from(weighted / total))
    }

    fn transformed(&self, transform: &Transform3D) -> Self {
        Self {
            triangles: self
                .triangles
                .iter()
                .map(|tri| tri.map(|p| transform.transform_point(&p)))
                .collect(),
            boundary: self.boundary.clone(),
        }
    }
}

/// 形状
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    vertices: Vec<Point3>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
}

impl Shape {
    /// 创建长方体，一个角点位于原点，沿正方向延伸
    pub fn make_box(dx: f64, dy: f64, dz: f64) -> Result<Self, ShapeError> {
        check_dimension("dx", dx)?;
        check_dimension("dy", dy)?;
        check_dimension("dz", dz)?;

        let corners = BoundingBox3::new(Point3::origin(), Point3::new(dx, dy, dz)).corners();

        let edges = BOX_EDGES
            .iter()
            .map(|&(a, b)| Edge::line(corners[a], corners[b]))
            .collect();

        let faces = BOX_FACES
            .iter()
            .map(|quad| {
                let boundary = (0..4)
                    .filter_map(|i| box_edge_index(quad[i], quad[(i + 1) % 4]))
                    .collect();
                Face {
                    triangles: vec![
                        [corners[quad[0]], corners[quad[1]], corners[quad[2]]],
                        [corners[quad[0]], corners[quad[2]], corners[quad[3]]],
                    ],
                    boundary,
                }
            })
            .collect();

        Ok(Self {
            vertices: corners.to_vec(),
            edges,
            faces,
        })
    }

    /// 创建以 `center` 为中心的长方体
    pub fn make_box_centered(
        center: Point3,
        dx: f64,
        dy: f64,
        dz: f64,
    ) -> Result<Self, ShapeError> {
        Ok(Self::make_box(dx, dy, dz)?.translated(Vector3::new(
            center.x - dx / 2.0,
            center.y - dy / 2.0,
            center.z - dz / 2.0,
        )))
    }

    /// 创建圆柱体，底面圆心位于原点，轴线沿 +Z
    ///
    /// 拓扑：3个面（侧面、底面、顶面），3条边（底圆、顶圆、接缝），2个顶点。
    pub fn make_cylinder(radius: f64, height: f64, segments: usize) -> Result<Self, ShapeError> {
        check_dimension("radius", radius)?;
        check_dimension("height", height)?;
        if segments < 3 {
            return Err(ShapeError::TooFewPoints {
                required: 3,
                actual: segments,
            });
        }

        let ring = |z: f64| -> Vec<Point3> {
            (0..=segments)
                .map(|i| {
                    // 最后一个点与第一个点严格重合
                    let angle = std::f64::consts::TAU * (i % segments) as f64 / segments as f64;
                    Point3::new(radius * angle.cos(), radius * angle.sin(), z)
                })
                .collect()
        };
        let bottom = ring(0.0);
        let top = ring(height);

        let mut lateral = Vec::with_capacity(segments * 2);
        for i in 0..segments {
            lateral.push([bottom[i], bottom[i + 1], top[i + 1]]);
            lateral.push([bottom[i], top[i + 1], top[i]]);
        }

        let bottom_center = Point3::origin();
        let top_center = Point3::new(0.0, 0.0, height);
        let bottom_cap = (0..segments)
            .map(|i| [bottom_center, bottom[i + 1], bottom[i]])
            .collect();
        let top_cap = (0..segments)
            .map(|i| [top_center, top[i], top[i + 1]])
            .collect();

        let seam_start = bottom[0];
        let seam_end = top[0];

        Ok(Self {
            vertices: vec![seam_start, seam_end],
            edges: vec![
                Edge { points: bottom },
                Edge { points: top },
                Edge::line(seam_start, seam_end),
            ],
            faces: vec![
                Face {
                    triangles: lateral,
                    boundary: vec![0, 1, 2],
                },
                Face {
                    triangles: bottom_cap,
                    boundary: vec![0],
                },
                Face {
                    triangles: top_cap,
                    boundary: vec![1],
                },
            ],
        })
    }

    /// 由简单多边形轮廓创建单个平面面
    ///
    /// 轮廓可以是凹多边形，但必须共面且不自相交；面用耳切法三角化。
    pub fn make_planar_face(points: &[Point3]) -> Result<Self, ShapeError> {
        if points.len() < 3 {
            return Err(ShapeError::TooFewPoints {
                required: 3,
                actual: points.len(),
            });
        }

        // Newell 法向量，长度为面积的两倍
        let mut normal = Vector3::zeros();
        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            normal += a.coords.cross(&b.coords);
        }
        if normal.norm() <= EPSILON {
            return Err(ShapeError::DegenerateFace);
        }
        let normal = normal.normalize();

        let size = points
            .iter()
            .map(|p| (p - points[0]).norm())
            .fold(1.0, f64::max);
        let deviation = points
            .iter()
            .map(|p| (p - points[0]).dot(&normal).abs())
            .fold(0.0, f64::max);
        if deviation > PLANAR_TOLERANCE * size {
            return Err(ShapeError::NonPlanarFace { deviation });
        }

        let triangles = ear_clip(points, &normal, size).ok_or(ShapeError::NonSimpleFace)?;

        let n = points.len();
        let edges = (0..n)
            .map(|i| Edge::line(points[i], points[(i + 1) % n]))
            .collect();

        Ok(Self {
            vertices: points.to_vec(),
            edges,
            faces: vec![Face {
                triangles,
                boundary: (0..n).collect(),
            }],
        })
    }

    /// 由点序列创建开放折线（无面），每一段是一条边
    pub fn make_polyline(points: &[Point3]) -> Result<Self, ShapeError> {
        if points.len() < 2 {
            return Err(ShapeError::TooFewPoints {
                required: 2,
                actual: points.len(),
            });
        }

        Ok(Self {
            vertices: points.to_vec(),
            edges: points.windows(2).map(|w| Edge::line(w[0], w[1])).collect(),
            faces: Vec::new(),
        })
    }

    /// 组合多个形状，子形状的索引按输入顺序依次排列
    pub fn compound(shapes: impl IntoIterator<Item = Shape>) -> Self {
        let mut result = Shape::default();
        for shape in shapes {
            let edge_offset = result.edges.len();
            result.vertices.extend(shape.vertices);
            result.edges.extend(shape.edges);
            result.faces.extend(shape.faces.into_iter().map(|mut face| {
                for idx in &mut face.boundary {
                    *idx += edge_offset;
                }
                face
            }));
        }
        result
    }

    /// 应用变换，返回新形状
    pub fn transformed(&self, transform: &Transform3D) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|p| transform.transform_point(p))
                .collect(),
            edges: self.edges.iter().map(|e| e.transformed(transform)).collect(),
            faces: self.faces.iter().map(|f| f.transformed(transform)).collect(),
        }
    }

    /// 平移，返回新形状
    pub fn translated(&self, offset: Vector3) -> Self {
        self.transformed(&Transform3D::translation(offset.x, offset.y, offset.z))
    }

    /// 获取包围盒；空形状返回无效包围盒
    pub fn bounding_box(&self) -> BoundingBox3 {
        let mut bbox = BoundingBox3::from_points(&self.vertices);
        for edge in &self.edges {
            for p in edge.points() {
                bbox.expand_to_include(p);
            }
        }
        for face in &self.faces {
            for p in face.triangles.iter().flatten() {
                bbox.expand_to_include(p);
            }
        }
        bbox
    }

    /// 是否为空形状
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.faces.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// 按索引获取顶点（从0开始）
    pub fn vertex(&self, index: usize) -> Option<&Point3> {
        self.vertices.get(index)
    }

    /// 按索引获取边（从0开始）
    pub fn edge(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    /// 按索引获取面（从0开始）
    pub fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index)
    }
}

fn check_dimension(name: &'static str, value: f64) -> Result<(), ShapeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ShapeError::InvalidDimension { name, value })
    }
}

/// 耳切法三角化共面的简单多边形
///
/// 多边形投影到垂直于 `normal` 的平面上，按逆时针方向逐个切下凸顶点。
/// 共线顶点直接移除。轮廓自相交导致找不到耳朵时返回 `None`。
fn ear_clip(points: &[Point3], normal: &Vector3, size: f64) -> Option<Vec<[Point3; 3]>> {
    let axis = if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
        Vector3::x()
    } else if normal.y.abs() <= normal.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let u = normal.cross(&axis).normalize();
    let v = normal.cross(&u);
    let flat: Vec<Point2> = points
        .iter()
        .map(|p| Point2::new((p - points[0]).dot(&u), (p - points[0]).dot(&v)))
        .collect();

    let eps = EPSILON * size * size;
    let area = |a: usize, b: usize, c: usize| (flat[b] - flat[a]).perp(&(flat[c] - flat[a]));
    let inside = |p: usize, a: usize, b: usize, c: usize| {
        area(a, b, p) >= -eps && area(b, c, p) >= -eps && area(c, a, p) >= -eps
    };

    let mut remaining: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len() - 2);
    while remaining.len() > 3 {
        let m = remaining.len();
        let (k, ear) = (0..m).find_map(|k| {
            let (a, b, c) = (remaining[(k + m - 1) % m], remaining[k], remaining[(k + 1) % m]);
            let signed = area(a, b, c);
            if signed.abs() <= eps {
                return Some((k, None));
            }
            if signed < 0.0 {
                return None;
            }
            // 与三角形顶点重合的点不算阻挡
            let blocked = remaining.iter().any(|&j| {
                [a, b, c].iter().all(|&q| flat[q] != flat[j]) && inside(j, a, b, c)
            });
            (!blocked).then_some((k, Some([points[a], points[b], points[c]])))
        })?;
        triangles.extend(ear);
        remaining.remove(k);
    }

    let (a, b, c) = (remaining[0], remaining[1], remaining[2]);
    if area(a, b, c) > eps {
        triangles.push([points[a], points[b], points[c]]);
    }
    (!triangles.is_empty()).then_some(triangles)
}

fn box_edge_index(a: usize, b: usize) -> Option<usize> {
    BOX_EDGES
        .iter()
        .position(|&(p, q)| (p == a && q == b) || (p == b && q == a))
}
