// 该文件是 Checha （查车） 项目的一部分。
// src/classifier.rs - 车型识别能力
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use anyhow::Result;

use crate::region::Region;

/// 未能识别时的占位字段值
pub const UNKNOWN: &str = "Unknown";

/// 单次车型识别的结果
#[derive(Debug, Clone)]
pub struct VehicleGuess {
  /// 品牌
  pub make: String,
  /// 型号
  pub model: String,
  /// 年份
  pub year: String,
  /// 置信度，[0, 1]
  pub confidence: f32,
}

impl VehicleGuess {
  /// 全部字段降级为 Unknown 的结果
  pub fn unknown() -> Self {
    Self {
      make: UNKNOWN.to_string(),
      model: UNKNOWN.to_string(),
      year: UNKNOWN.to_string(),
      confidence: 0.0,
    }
  }
}

/// 车型识别能力
///
/// 流水线对实现保持多态，生产模型可以在不改动流水线的前提下
/// 替换占位实现。流水线不假定实现是确定性的，
/// 也不允许它的失败波及颜色分类。
pub trait VehicleClassifier {
  fn identify(&self, region: &Region) -> Result<VehicleGuess>;
}

mod stub;
pub use self::stub::StubClassifier;
