// 该文件是 Checha （查车） 项目的一部分。
// src/error.rs - 错误分类
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

use thiserror::Error;

/// 识别流水线的错误分类
///
/// 所有错误最终都会在流水线边界被转换为失败形状的 JSON 输出，
/// 不允许任何错误让进程静默崩溃。
#[derive(Error, Debug)]
pub enum IdentifyError {
  /// 请求本身不合法，在解码之前就被拒绝
  #[error("invalid request: {0}")]
  InvalidRequest(String),
  /// 视频打开、定位或解码失败，或时间点超出视频时长
  #[error("frame unavailable: {0}")]
  FrameUnavailable(String),
  /// 解码超出时间预算
  #[error("decode timed out after {0:?}")]
  DecodeTimeout(Duration),
  /// 裁剪区域面积为零
  #[error("empty region")]
  EmptyRegion,
  /// 分类器执行失败，按字段隔离，不中断另一侧分类
  #[error("classifier failure: {0}")]
  ClassifierFailure(String),
}
