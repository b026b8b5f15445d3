// 该文件是 Checha （查车） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Parser;

/// Checha 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 识别请求 JSON（传 "-" 则从标准输入读取）
  /// 形如: {"video_path": "clips/front.mp4", "timestamp": 12.5, "bbox": [0.1, 0.2, 0.3, 0.4]}
  #[arg(value_name = "REQUEST")]
  pub request: String,

  /// 单次解码的时间预算（秒，0 表示不限制）
  #[arg(long, default_value = "10", value_name = "SECS")]
  pub decode_timeout: u64,

  /// 缩进输出结果 JSON
  #[arg(long)]
  pub pretty: bool,
}
