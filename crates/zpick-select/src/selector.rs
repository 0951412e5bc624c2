//! 选择器
//!
//! 持有可选实体注册表与配置，对外提供点选、框选和套索选择。
//! 拾取只读取注册表（`&self`），注册表的修改需要 `&mut self`。

use crate::candidate::{self, Candidate};
use crate::config::{sanitize_tolerance, SelectorConfig};
use crate::entity::{SelectableEntity, ShapeId};
use crate::error::SelectError;
use crate::hit::HitResult;
use crate::hit_test::{HitTester, ScreenRegion};
use crate::mode::{ModeSet, SelectionMode};
use crate::ranker;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace, warn};
use zpick_core::kernel::{BRepKernel, GeometryKernel};
use zpick_core::math::{BoundingBox2, Point2};
use zpick_view::{Camera, Viewport};

/// 选择器
pub struct Selector<K: GeometryKernel = BRepKernel> {
    kernel: K,
    entities: HashMap<ShapeId, SelectableEntity<K::Shape>>,
    config: SelectorConfig,
}

impl Selector<BRepKernel> {
    /// 使用默认内核创建空选择器
    pub fn new() -> Self {
        Self::with_kernel(BRepKernel)
    }
}

impl Default for Selector<BRepKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: GeometryKernel> Selector<K> {
    /// 使用指定内核创建空选择器
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            entities: HashMap::new(),
            config: SelectorConfig::default(),
        }
    }

    /// 使用指定配置
    pub fn with_config(mut self, config: SelectorConfig) -> Self {
        self.config = config.sanitized();
        self
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    // ========== 注册表 ==========

    /// 注册实体，默认激活 `Shape` 模式
    ///
    /// ID 已存在时返回 `false`，注册表不变。
    pub fn add(&mut self, geometry: K::Shape, id: ShapeId) -> bool {
        self.try_add(geometry, id).is_ok()
    }

    /// 注册实体；ID 已存在时返回 [`SelectError::DuplicateId`]
    pub fn try_add(&mut self, geometry: K::Shape, id: ShapeId) -> Result<(), SelectError> {
        if self.entities.contains_key(&id) {
            debug!("Rejected duplicate shape id {}", id);
            return Err(SelectError::DuplicateId(id));
        }
        self.entities.insert(id, SelectableEntity::new(geometry));
        debug!("Added shape {} ({} registered)", id, self.entities.len());
        Ok(())
    }

    /// 插入或覆盖实体，模式重置为默认；返回是否覆盖了已有实体
    pub fn replace(&mut self, geometry: K::Shape, id: ShapeId) -> bool {
        let replaced = self
            .entities
            .insert(id, SelectableEntity::new(geometry))
            .is_some();
        debug!("Replaced shape {} (existed: {})", id, replaced);
        replaced
    }

    /// 移除实体；ID 不存在时返回 `false`
    pub fn remove(&mut self, id: ShapeId) -> bool {
        self.try_remove(id).is_ok()
    }

    /// 移除实体并返回其几何；ID 不存在时返回 [`SelectError::UnknownId`]
    pub fn try_remove(&mut self, id: ShapeId) -> Result<K::Shape, SelectError> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(SelectError::UnknownId(id))?;
        debug!("Removed shape {} ({} registered)", id, self.entities.len());
        Ok(entity.geometry)
    }

    /// 清空注册表
    pub fn clear_all(&mut self) {
        if !self.entities.is_empty() {
            debug!("Cleared {} shapes", self.entities.len());
        }
        self.entities.clear();
    }

    /// 激活模式；ID 不存在时忽略
    pub fn activate_mode(&mut self, mode: SelectionMode, id: ShapeId) {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                if entity.modes.insert(mode) {
                    debug!("Activated {:?} mode on shape {}", mode, id);
                }
            }
            None => debug!("Ignoring {:?} activation for unknown shape {}", mode, id),
        }
    }

    /// 取消模式；ID 不存在时忽略
    pub fn deactivate_mode(&mut self, mode: SelectionMode, id: ShapeId) {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                if entity.modes.remove(mode) {
                    debug!("Deactivated {:?} mode on shape {}", mode, id);
                }
            }
            None => debug!("Ignoring {:?} deactivation for unknown shape {}", mode, id),
        }
    }

    /// 模式是否激活；ID 不存在时返回 `None`
    pub fn is_mode_active(&self, mode: SelectionMode, id: ShapeId) -> Option<bool> {
        self.entities.get(&id).map(|e| e.is_mode_active(mode))
    }

    pub fn active_modes(&self, id: ShapeId) -> Option<ModeSet> {
        self.entities.get(&id).map(|e| e.modes)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.entities.contains_key(&id)
    }

    /// 所有已注册的ID（升序）
    pub fn ids(&self) -> Vec<ShapeId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn geometry(&self, id: ShapeId) -> Option<&K::Shape> {
        self.entities.get(&id).map(|e| &e.geometry)
    }

    // ========== 配置 ==========

    pub fn pixel_tolerance(&self) -> f64 {
        self.config.pixel_tolerance
    }

    /// 设置像素容差；负数或非有限值按0处理
    pub fn set_pixel_tolerance(&mut self, pixels: f64) {
        self.config.pixel_tolerance = sanitize_tolerance(pixels);
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SelectorConfig) {
        self.config = config.sanitized();
    }

    // ========== 拾取 ==========

    /// 点选：返回按深度排序的命中，第一个为主选择
    pub fn pick(&self, pixel: Point2, camera: &Camera, viewport: Viewport) -> Vec<HitResult> {
        self.run_query(camera, viewport, "point", |tester, candidates| {
            let ray = tester.projector().pick_ray(&pixel);
            candidates
                .iter()
                .filter_map(|c| tester.pick_point(c, &pixel, &ray))
                .collect()
        })
    }

    /// 框选：矩形可由任意两个对角点给出，零面积返回空
    pub fn pick_rect(
        &self,
        rect: BoundingBox2,
        camera: &Camera,
        viewport: Viewport,
    ) -> Vec<HitResult> {
        let region = ScreenRegion::rect(rect.min, rect.max);
        self.pick_region(&region, camera, viewport)
    }

    /// 套索选择：少于3个顶点返回空；首尾闭合与否结果相同
    pub fn pick_polygon(
        &self,
        polygon: &[Point2],
        camera: &Camera,
        viewport: Viewport,
    ) -> Vec<HitResult> {
        let region = ScreenRegion::Polygon(polygon.to_vec());
        self.pick_region(&region, camera, viewport)
    }

    /// 任意屏幕区域选择
    pub fn pick_region(
        &self,
        region: &ScreenRegion,
        camera: &Camera,
        viewport: Viewport,
    ) -> Vec<HitResult> {
        if region.is_degenerate() {
            trace!("Degenerate selection region, nothing picked");
            return Vec::new();
        }
        self.run_query(camera, viewport, "region", |tester, candidates| {
            candidates
                .iter()
                .filter_map(|c| tester.pick_region(c, region))
                .collect()
        })
    }

    fn run_query<F>(
        &self,
        camera: &Camera,
        viewport: Viewport,
        kind: &str,
        test: F,
    ) -> Vec<HitResult>
    where
        F: FnOnce(&HitTester<'_, K>, &[Candidate<'_, K::Shape>]) -> Vec<HitResult>,
    {
        if self.entities.is_empty() {
            return Vec::new();
        }

        let projector = match camera.projector(viewport) {
            Ok(projector) => projector,
            Err(e) => {
                warn!("Skipping {} pick: {}", kind, e);
                return Vec::new();
            }
        };

        let candidates = candidate::generate(&self.kernel, &self.entities);
        if candidates.is_empty() {
            return Vec::new();
        }

        let tester = HitTester::new(
            &self.kernel,
            projector,
            self.config.pixel_tolerance,
            self.config.sample_density(),
        );
        let hits = test(&tester, &candidates);
        trace!(
            "{} pick: {} candidates, {} hits",
            kind,
            candidates.len(),
            hits.len()
        );
        ranker::rank(hits, &self.config)
    }
}

impl<K: GeometryKernel + fmt::Debug> fmt::Debug for Selector<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("kernel", &self.kernel)
            .field("ids", &self.ids())
            .field("config", &self.config)
            .finish()
    }
}
