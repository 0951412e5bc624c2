//! 选择器配置
//!
//! 配置由每个 [`Selector`](crate::Selector) 按值持有，不存在进程级全局状态。

use serde::{Deserialize, Serialize};
use zpick_core::kernel::SampleDensity;

/// 默认像素容差
pub const DEFAULT_PIXEL_TOLERANCE: f64 = 2.0;

/// 默认最大结果数
pub const DEFAULT_MAX_RESULTS: usize = 32;

/// 选择器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// 像素容差：候选离查询点的屏幕距离不超过该值即算命中
    pub pixel_tolerance: f64,

    /// 单次查询返回的最大结果数，0 表示不限制
    pub max_results: usize,

    /// 框选/套索时每个边线段内部的采样点数，上限为
    /// [`SampleDensity::MAX_EDGE_SAMPLES`]
    pub edge_samples: usize,

    /// 每个形状只保留最近的一个命中
    pub dedupe_by_shape: bool,
}

impl SelectorConfig {
    /// 区域查询使用的采样密度
    pub fn sample_density(&self) -> SampleDensity {
        SampleDensity {
            edge_samples: self.edge_samples,
        }
    }

    /// 设置像素容差
    pub fn with_pixel_tolerance(mut self, pixel_tolerance: f64) -> Self {
        self.pixel_tolerance = pixel_tolerance;
        self
    }

    /// 设置最大结果数
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// 设置是否按形状去重
    pub fn with_dedupe_by_shape(mut self, dedupe: bool) -> Self {
        self.dedupe_by_shape = dedupe;
        self
    }

    /// 修正非法值：负数或非有限的像素容差归零，过大的采样数截断到上限
    pub(crate) fn sanitized(mut self) -> Self {
        self.pixel_tolerance = sanitize_tolerance(self.pixel_tolerance);
        if self.edge_samples > SampleDensity::MAX_EDGE_SAMPLES {
            tracing::warn!(
                "Edge sample count {} exceeds {}, clamping",
                self.edge_samples,
                SampleDensity::MAX_EDGE_SAMPLES
            );
            self.edge_samples = SampleDensity::MAX_EDGE_SAMPLES;
        }
        self
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            pixel_tolerance: DEFAULT_PIXEL_TOLERANCE,
            max_results: DEFAULT_MAX_RESULTS,
            edge_samples: SampleDensity::default().edge_samples,
            dedupe_by_shape: false,
        }
    }
}

pub(crate) fn sanitize_tolerance(pixels: f64) -> f64 {
    if pixels.is_finite() && pixels >= 0.0 {
        pixels
    } else {
        tracing::warn!("Invalid pixel tolerance {}, clamping to 0", pixels);
        0.0
    }
}
