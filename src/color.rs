// 该文件是 Checha （查车） 项目的一部分。
// src/color.rs - 最近邻颜色分类
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

use crate::region::Region;

/// 未能分类时的占位颜色名
pub const UNKNOWN_COLOR: &str = "Unknown";

/// 调色板参考色，进程级只读常量
///
/// 声明顺序即距离并列时的优先顺序，改动顺序会改变分类结果。
pub const PALETTE: [(&str, [u8; 3]); 7] = [
  ("White", [255, 255, 255]),
  ("Black", [0, 0, 0]),
  ("Silver", [192, 192, 192]),
  ("Gray", [128, 128, 128]),
  ("Red", [255, 0, 0]),
  ("Blue", [0, 0, 255]),
  ("Green", [0, 255, 0]),
];

/// 对区域做最近邻颜色分类
///
/// 先对全部像素按 (R, G, B) 通道求均值，再取与均值欧氏距离最小的
/// 调色板颜色；空区域返回 Unknown。RGB 空间直接比较，
/// 不做感知色彩空间转换，保证结果可逐字节复现。
pub fn classify(region: &Region) -> String {
  if region.is_empty() {
    return UNKNOWN_COLOR.to_string();
  }

  nearest(channel_mean(region)).to_string()
}

/// 区域内逐通道像素均值，(R, G, B) 顺序
fn channel_mean(region: &Region) -> [f64; 3] {
  let mut sum = [0.0f64; 3];
  let mut count = 0u64;

  for pixel in region.image().pixels() {
    sum[0] += pixel[0] as f64;
    sum[1] += pixel[1] as f64;
    sum[2] += pixel[2] as f64;
    count += 1;
  }

  [
    sum[0] / count as f64,
    sum[1] / count as f64,
    sum[2] / count as f64,
  ]
}

/// 与均值欧氏距离最小的调色板颜色
///
/// 比较平方距离即可，argmin 不变；严格小于保证并列时首个条目胜出。
fn nearest(mean: [f64; 3]) -> &'static str {
  let mut best_name = UNKNOWN_COLOR;
  let mut best_dist = f64::INFINITY;

  for (name, reference) in PALETTE {
    let dist = mean
      .iter()
      .zip(reference.iter())
      .map(|(m, r)| (m - *r as f64).powi(2))
      .sum::<f64>();
    if dist < best_dist {
      best_dist = dist;
      best_name = name;
    }
  }

  best_name
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{ImageBuffer, Rgb};

  fn uniform_region(width: u32, height: u32, rgb: [u8; 3]) -> Region {
    Region::new(ImageBuffer::from_pixel(width, height, Rgb(rgb)))
  }

  #[test]
  fn every_palette_reference_classifies_as_itself() {
    for (name, reference) in PALETTE {
      let region = uniform_region(8, 8, reference);
      assert_eq!(classify(&region), name);
    }
  }

  #[test]
  fn classification_is_invariant_to_region_size() {
    for size in [1u32, 2, 16, 64, 128] {
      let region = uniform_region(size, size, [255, 0, 0]);
      assert_eq!(classify(&region), "Red");
    }
  }

  #[test]
  fn empty_region_is_unknown() {
    let region = Region::new(ImageBuffer::new(0, 0));
    assert_eq!(classify(&region), UNKNOWN_COLOR);
  }

  #[test]
  fn pure_black_is_black() {
    assert_eq!(classify(&uniform_region(4, 4, [0, 0, 0])), "Black");
  }

  #[test]
  fn pure_red_is_red() {
    assert_eq!(classify(&uniform_region(4, 4, [255, 0, 0])), "Red");
  }

  #[test]
  fn tie_resolves_to_earlier_palette_entry() {
    // (160, 160, 160) 到 Silver (192) 与 Gray (128) 距离相等，
    // 调色板中 Silver 声明在前，必须胜出
    let region = uniform_region(4, 4, [160, 160, 160]);
    assert_eq!(classify(&region), "Silver");
  }

  #[test]
  fn mixed_region_classifies_by_channel_mean() {
    // 一半纯黑一半纯红，均值 (127.5, 0, 0)，距 Black 与 Red 相等，
    // Black 声明在前
    let mut image: image::RgbImage = ImageBuffer::new(2, 1);
    image.put_pixel(0, 0, Rgb([0, 0, 0]));
    image.put_pixel(1, 0, Rgb([255, 0, 0]));
    assert_eq!(classify(&Region::new(image)), "Black");
  }

  #[test]
  fn near_white_is_white() {
    assert_eq!(classify(&uniform_region(4, 4, [240, 238, 245])), "White");
  }
}
