// 该文件是 Checha （查车） 项目的一部分。
// src/pipeline.rs - 识别请求流水线
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

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::classifier::{StubClassifier, UNKNOWN, VehicleClassifier, VehicleGuess};
use crate::color;
use crate::error::IdentifyError;
use crate::region::{self, Region};
use crate::request::Request;
use crate::source;

/// 识别结果，成功与失败共用同一形状
///
/// 失败时 error 字段给出原因，其余字段固定为 Unknown / 0.0；
/// 成功输出不携带 error 字段。
#[derive(Debug, Clone, Serialize)]
pub struct VehicleInfo {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub make: String,
  pub model: String,
  pub color: String,
  pub year: String,
  pub confidence: f32,
}

impl VehicleInfo {
  /// 失败形状的结果
  pub fn failure(error: impl Into<String>) -> Self {
    Self {
      error: Some(error.into()),
      make: UNKNOWN.to_string(),
      model: UNKNOWN.to_string(),
      color: UNKNOWN.to_string(),
      year: UNKNOWN.to_string(),
      confidence: 0.0,
    }
  }

  pub fn is_failure(&self) -> bool {
    self.error.is_some()
  }
}

/// 识别请求流水线
///
/// 取帧、裁剪、颜色与车型分类的编排者，并负责把内部错误
/// 翻译成合法的失败形状结果。每次 run 都是一次全新的执行，
/// 调用之间不保留任何状态。
pub struct Pipeline<C> {
  classifier: C,
  decode_timeout: Option<Duration>,
}

impl Pipeline<StubClassifier> {
  /// 使用占位车型识别器的流水线
  pub fn new(decode_timeout: Option<Duration>) -> Self {
    Self::with_classifier(StubClassifier, decode_timeout)
  }
}

impl<C: VehicleClassifier> Pipeline<C> {
  pub fn with_classifier(classifier: C, decode_timeout: Option<Duration>) -> Self {
    Self {
      classifier,
      decode_timeout,
    }
  }

  /// 执行一次识别请求
  ///
  /// 任何内部失败都被折算进返回值，本函数不会向上抛错。
  pub fn run(&self, request: &Request) -> VehicleInfo {
    if let Err(e) = request.validate() {
      return VehicleInfo::failure(e.to_string());
    }

    let frame = match source::frame_at_with_timeout(
      &request.video_path,
      request.timestamp,
      self.decode_timeout,
    ) {
      Ok(Some(frame)) => frame,
      Ok(None) => {
        return VehicleInfo::failure(format!(
          "frame unavailable: no frame at {}s in {}",
          request.timestamp, request.video_path
        ));
      }
      Err(e) => return VehicleInfo::failure(e.to_string()),
    };

    info!(
      "帧解码完成: 第 {} 帧, {}x{}, 呈现时间 {:.3}s",
      frame.index,
      frame.image.width(),
      frame.image.height(),
      frame.timestamp_secs
    );

    let region = region::crop(&frame.image, request.bbox);
    if region.is_empty() {
      warn!("分类输入降级为 Unknown: {}", IdentifyError::EmptyRegion);
    }

    self.classify_region(&region)
  }

  /// 对区域做颜色与车型分类并装配结果
  ///
  /// 两侧分类相互独立，任一侧失败只让自己的字段降级，
  /// 不中断另一侧，也不把整个结果变成失败形状。
  fn classify_region(&self, region: &Region) -> VehicleInfo {
    let color = color::classify(region);

    let guess = match self.classifier.identify(region) {
      Ok(guess) => guess,
      Err(e) => {
        let e = IdentifyError::ClassifierFailure(format!("{e:#}"));
        warn!("车型识别失败，相关字段降级: {e}");
        VehicleGuess::unknown()
      }
    };

    VehicleInfo {
      error: None,
      make: guess.make,
      model: guess.model,
      color,
      year: guess.year,
      confidence: guess.confidence,
    }
  }
}
