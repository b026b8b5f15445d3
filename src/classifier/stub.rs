// 该文件是 Checha （查车） 项目的一部分。
// src/classifier/stub.rs - 占位车型识别器
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
use rand::seq::IndexedRandom;

use super::{VehicleClassifier, VehicleGuess};
use crate::region::Region;

/// 候选品牌
const MAKES: [&str; 7] = [
  "Tesla", "Toyota", "Honda", "Ford", "BMW", "Mercedes", "Audi",
];

/// 候选型号
const MODELS: [&str; 7] = [
  "Model 3", "Model Y", "Camry", "Accord", "F-150", "X5", "C-Class",
];

/// 候选年份
const YEARS: [&str; 5] = ["2020", "2021", "2022", "2023", "2024"];

/// 占位实现的固定置信度
const STUB_CONFIDENCE: f32 = 0.85;

/// 占位车型识别器
///
/// 从固定候选表中随机取值，不具备真实识别能力，
/// 仅用来占住生产模型的接口位置。空区域降级为 Unknown 而不是瞎猜。
#[derive(Debug, Clone, Copy, Default)]
pub struct StubClassifier;

impl VehicleClassifier for StubClassifier {
  fn identify(&self, region: &Region) -> Result<VehicleGuess> {
    if region.is_empty() {
      return Ok(VehicleGuess::unknown());
    }

    let mut rng = rand::rng();
    Ok(VehicleGuess {
      make: pick(&MAKES, &mut rng),
      model: pick(&MODELS, &mut rng),
      year: pick(&YEARS, &mut rng),
      confidence: STUB_CONFIDENCE,
    })
  }
}

fn pick<R: rand::Rng>(candidates: &[&str], rng: &mut R) -> String {
  candidates.choose(rng).unwrap_or(&super::UNKNOWN).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{ImageBuffer, Rgb};

  fn red_region() -> Region {
    Region::new(ImageBuffer::from_pixel(16, 16, Rgb([255, 0, 0])))
  }

  #[test]
  fn guess_is_drawn_from_candidate_lists() {
    let guess = StubClassifier.identify(&red_region()).unwrap();
    assert!(MAKES.contains(&guess.make.as_str()));
    assert!(MODELS.contains(&guess.model.as_str()));
    assert!(YEARS.contains(&guess.year.as_str()));
    assert_eq!(guess.confidence, STUB_CONFIDENCE);
  }

  #[test]
  fn empty_region_degrades_to_unknown() {
    let guess = StubClassifier
      .identify(&Region::new(ImageBuffer::new(0, 0)))
      .unwrap();
    assert_eq!(guess.make, "Unknown");
    assert_eq!(guess.model, "Unknown");
    assert_eq!(guess.year, "Unknown");
    assert_eq!(guess.confidence, 0.0);
  }
}
