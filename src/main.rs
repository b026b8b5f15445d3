// 该文件是 Checha （查车） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use std::io::Read;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use checha::pipeline::{Pipeline, VehicleInfo};
use checha::request::Request;

/// 结果序列化本身失败时的兜底输出，保证 stdout 永远是合法 JSON
const FALLBACK_FAILURE_JSON: &str = r#"{"error":"failed to encode result","make":"Unknown","model":"Unknown","color":"Unknown","year":"Unknown","confidence":0.0}"#;

fn main() -> ExitCode {
  // 日志一律走 stderr，stdout 只承载结果 JSON
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .init();

  let args = args::Args::parse();

  let request_text = if args.request == "-" {
    let mut buffer = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
      let info = VehicleInfo::failure(format!("invalid request: cannot read stdin: {e}"));
      return finish(&info, args.pretty);
    }
    buffer
  } else {
    args.request.clone()
  };

  let decode_timeout = (args.decode_timeout > 0).then(|| Duration::from_secs(args.decode_timeout));

  let info = match Request::from_json(&request_text) {
    Ok(request) => {
      info!(
        "收到识别请求: {} @ {:.3}s bbox {:?}",
        request.video_path, request.timestamp, request.bbox
      );
      Pipeline::new(decode_timeout).run(&request)
    }
    Err(e) => VehicleInfo::failure(e.to_string()),
  };

  finish(&info, args.pretty)
}

/// 输出结果 JSON 并折算退出码
fn finish(info: &VehicleInfo, pretty: bool) -> ExitCode {
  let rendered = if pretty {
    serde_json::to_string_pretty(info)
  } else {
    serde_json::to_string(info)
  };

  match rendered {
    Ok(text) => println!("{text}"),
    Err(e) => {
      error!("无法序列化结果: {e}");
      println!("{FALLBACK_FAILURE_JSON}");
      return ExitCode::FAILURE;
    }
  }

  if info.is_failure() {
    ExitCode::FAILURE
  } else {
    ExitCode::SUCCESS
  }
}
