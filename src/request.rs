// 该文件是 Checha （查车） 项目的一部分。
// src/request.rs - 识别请求定义与校验
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

use serde::Deserialize;

use crate::error::IdentifyError;

/// 车辆识别请求
///
/// 由上层应用（行车记录仪回放界面）按检测事件逐条下发，
/// 一次请求在一次流水线调用内被完整消费。
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
  /// 视频文件路径
  pub video_path: String,
  /// 时间点（秒）
  pub timestamp: f64,
  /// 归一化边界框 [x, y, w, h]，各分量取值 [0, 1]
  pub bbox: [f64; 4],
}

impl Request {
  /// 从 JSON 文本解析请求并完成校验
  pub fn from_json(text: &str) -> Result<Self, IdentifyError> {
    let request: Request = serde_json::from_str(text)
      .map_err(|e| IdentifyError::InvalidRequest(format!("malformed JSON: {e}")))?;
    request.validate()?;
    Ok(request)
  }

  /// 校验请求字段，必须在任何解码动作之前完成
  ///
  /// 越界边界框按非法请求拒绝而不是静默钳位，
  /// 避免掩盖上层应用的几何换算缺陷。
  pub fn validate(&self) -> Result<(), IdentifyError> {
    if !self.timestamp.is_finite() || self.timestamp < 0.0 {
      return Err(IdentifyError::InvalidRequest(format!(
        "timestamp must be a finite number >= 0, got {}",
        self.timestamp
      )));
    }

    let [x, y, w, h] = self.bbox;
    for component in self.bbox {
      if !component.is_finite() || !(0.0..=1.0).contains(&component) {
        return Err(IdentifyError::InvalidRequest(format!(
          "bbox components must lie in [0, 1], got [{x}, {y}, {w}, {h}]"
        )));
      }
    }
    if x + w > 1.0 {
      return Err(IdentifyError::InvalidRequest(format!(
        "bbox exceeds right edge: x + w = {}",
        x + w
      )));
    }
    if y + h > 1.0 {
      return Err(IdentifyError::InvalidRequest(format!(
        "bbox exceeds bottom edge: y + h = {}",
        y + h
      )));
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request(timestamp: f64, bbox: [f64; 4]) -> Request {
    Request {
      video_path: "front.mp4".to_string(),
      timestamp,
      bbox,
    }
  }

  #[test]
  fn parses_well_formed_request() {
    let text = r#"{"video_path": "clips/front.mp4", "timestamp": 12.5, "bbox": [0.1, 0.2, 0.3, 0.4]}"#;
    let request = Request::from_json(text).unwrap();
    assert_eq!(request.video_path, "clips/front.mp4");
    assert_eq!(request.timestamp, 12.5);
    assert_eq!(request.bbox, [0.1, 0.2, 0.3, 0.4]);
  }

  #[test]
  fn rejects_malformed_json() {
    let err = Request::from_json("not json").unwrap_err();
    assert!(err.to_string().contains("malformed JSON"));
  }

  #[test]
  fn rejects_missing_fields() {
    let err = Request::from_json(r#"{"video_path": "a.mp4"}"#).unwrap_err();
    assert!(matches!(err, IdentifyError::InvalidRequest(_)));
  }

  #[test]
  fn rejects_negative_timestamp() {
    let err = request(-0.5, [0.0, 0.0, 0.5, 0.5]).validate().unwrap_err();
    assert!(err.to_string().contains("timestamp"));
  }

  #[test]
  fn rejects_bbox_component_out_of_range() {
    let err = request(1.0, [0.0, 0.0, 1.5, 0.5]).validate().unwrap_err();
    assert!(err.to_string().contains("[0, 1]"));
  }

  #[test]
  fn rejects_bbox_spilling_over_right_edge() {
    let err = request(1.0, [0.75, 0.0, 0.5, 0.5]).validate().unwrap_err();
    assert!(err.to_string().contains("x + w"));
  }

  #[test]
  fn rejects_bbox_spilling_over_bottom_edge() {
    let err = request(1.0, [0.0, 0.75, 0.5, 0.5]).validate().unwrap_err();
    assert!(err.to_string().contains("y + h"));
  }

  #[test]
  fn accepts_full_frame_bbox() {
    request(0.0, [0.0, 0.0, 1.0, 1.0]).validate().unwrap();
  }

  #[test]
  fn accepts_degenerate_bbox() {
    // 零面积的框是合法请求，下游降级为 Unknown
    request(3.0, [0.5, 0.5, 0.0, 0.0]).validate().unwrap();
  }
}
