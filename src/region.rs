// 该文件是 Checha （查车） 项目的一部分。
// src/region.rs - 边界框裁剪
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

use image::RgbImage;

/// 帧内的像素级子区域
///
/// 由归一化边界框映射而来，只在一次流水线调用内存活。
/// 面积为零的区域是合法值，下游分类器对其降级为 Unknown。
#[derive(Debug, Clone)]
pub struct Region {
  image: RgbImage,
}

impl Region {
  pub fn new(image: RgbImage) -> Self {
    Self { image }
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  pub fn is_empty(&self) -> bool {
    self.image.width() == 0 || self.image.height() == 0
  }

  pub fn image(&self) -> &RgbImage {
    &self.image
  }
}

/// 把归一化边界框映射到像素矩形并裁剪
///
/// 像素坐标按四舍五入计算，矩形被钳位在帧内，
/// 因此边缘处的舍入溢出不会越界。
pub fn crop(frame: &RgbImage, bbox: [f64; 4]) -> Region {
  let (frame_w, frame_h) = frame.dimensions();

  let x = ((bbox[0] * frame_w as f64).round() as i64).clamp(0, frame_w as i64) as u32;
  let y = ((bbox[1] * frame_h as f64).round() as i64).clamp(0, frame_h as i64) as u32;
  let w = ((bbox[2] * frame_w as f64).round() as i64).clamp(0, (frame_w - x) as i64) as u32;
  let h = ((bbox[3] * frame_h as f64).round() as i64).clamp(0, (frame_h - y) as i64) as u32;

  Region::new(image::imageops::crop_imm(frame, x, y, w, h).to_image())
}
