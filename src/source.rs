// 该文件是 Checha （查车） 项目的一部分。
// src/source.rs - 视频帧源
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

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use ffmpeg_next as ffmpeg;
use ffmpeg_next::format::{Pixel, input};
use ffmpeg_next::media::Type;
use ffmpeg_next::software::scaling::{context::Context as ScalingContext, flag::Flags};
use ffmpeg_next::util::frame::video::Video;
use image::RgbImage;
use tracing::debug;

use crate::error::IdentifyError;

/// 解码得到的帧
///
/// 只在一次流水线调用内存活，裁剪之后即被丢弃。
#[derive(Debug)]
pub struct Frame {
  /// RGB 图像数据
  pub image: RgbImage,
  /// 请求命中的帧索引
  pub index: u64,
  /// 实际呈现时间（秒）
  pub timestamp_secs: f64,
}

/// 视频帧源，按时间点解码单帧
///
/// 每次调用各自打开解码句柄，句柄不跨调用复用。
pub struct FrameSource {
  /// FFmpeg 输入上下文
  input_context: ffmpeg::format::context::Input,
  /// 视频流索引
  video_stream_index: usize,
  /// 视频解码器
  decoder: ffmpeg::decoder::Video,
  /// 缩放上下文
  scaler: ScalingContext,
  /// 视频宽度
  width: u32,
  /// 视频高度
  height: u32,
  /// 帧率
  fps: f64,
  /// 时间基准
  time_base: f64,
  /// 视频时长（秒），容器未上报时为 0
  duration_secs: f64,
}

impl FrameSource {
  /// 打开视频文件
  pub fn open(path: &str) -> Result<Self> {
    ffmpeg::init().context("无法初始化 FFmpeg")?;

    let input_context = input(&path).with_context(|| format!("无法打开视频文件: {}", path))?;

    let video_stream = input_context
      .streams()
      .best(Type::Video)
      .context("找不到视频流")?;

    let video_stream_index = video_stream.index();
    let context_decoder =
      ffmpeg::codec::context::Context::from_parameters(video_stream.parameters())?;
    let decoder = context_decoder.decoder().video()?;

    let width = decoder.width();
    let height = decoder.height();

    let fps = video_stream.avg_frame_rate();
    let fps = fps.numerator() as f64 / fps.denominator() as f64;

    let time_base = video_stream.time_base();
    let time_base = time_base.numerator() as f64 / time_base.denominator() as f64;

    let duration = input_context.duration();
    let duration_secs = if duration > 0 {
      duration as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE)
    } else {
      0.0
    };

    let scaler = ScalingContext::get(
      decoder.format(),
      width,
      height,
      Pixel::RGB24,
      width,
      height,
      Flags::BILINEAR,
    )?;

    Ok(Self {
      input_context,
      video_stream_index,
      decoder,
      scaler,
      width,
      height,
      fps,
      time_base,
      duration_secs,
    })
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn fps(&self) -> f64 {
    self.fps
  }

  pub fn duration_secs(&self) -> f64 {
    self.duration_secs
  }

  /// 解码离指定时间点最近的一帧
  ///
  /// 时间点超出视频时长或解码到文件尾都返回 Ok(None)，
  /// 这是可恢复的缺帧，不是缺陷。
  pub fn frame_at(&mut self, timestamp_secs: f64) -> Result<Option<Frame>> {
    if self.duration_secs > 0.0 && timestamp_secs > self.duration_secs {
      debug!(
        "时间点 {:.3}s 超出视频时长 {:.3}s",
        timestamp_secs, self.duration_secs
      );
      return Ok(None);
    }

    let frame_index = frame_index_for(self.fps, timestamp_secs);
    let target_secs = if self.fps > 0.0 && self.fps.is_finite() {
      frame_index as f64 / self.fps
    } else {
      0.0
    };

    // 回退到目标之前的关键帧，再向前解码到目标呈现时间
    let position = (target_secs * f64::from(ffmpeg::ffi::AV_TIME_BASE)) as i64;
    self
      .input_context
      .seek(position, ..position)
      .with_context(|| format!("无法定位到 {:.3}s", target_secs))?;
    self.decoder.flush();

    let half_frame = if self.fps > 0.0 && self.fps.is_finite() {
      0.5 / self.fps
    } else {
      0.0
    };

    while let Some(decoded) = self.decode_next()? {
      let pts_secs = decoded
        .timestamp()
        .map_or(0.0, |ts| ts as f64 * self.time_base);
      if pts_secs + half_frame >= target_secs {
        let image = self.to_rgb(&decoded)?;
        return Ok(Some(Frame {
          image,
          index: frame_index,
          timestamp_secs: pts_secs,
        }));
      }
    }

    Ok(None)
  }

  /// 解码下一帧
  fn decode_next(&mut self) -> Result<Option<Video>> {
    loop {
      // 首先尝试从解码器获取已解码的帧
      let mut decoded = Video::empty();
      if self.decoder.receive_frame(&mut decoded).is_ok() {
        return Ok(Some(decoded));
      }

      // 读取下一个数据包
      let mut packet_iter = self.input_context.packets();
      loop {
        match packet_iter.next() {
          Some((stream, packet)) => {
            if stream.index() == self.video_stream_index {
              self.decoder.send_packet(&packet)?;
              break;
            }
          }
          None => {
            // 发送 EOF
            self.decoder.send_eof()?;
            // 尝试获取剩余帧
            if self.decoder.receive_frame(&mut decoded).is_ok() {
              return Ok(Some(decoded));
            }
            return Ok(None);
          }
        }
      }
    }
  }

  /// 把解码帧转换为 RGB 图像
  fn to_rgb(&mut self, decoded: &Video) -> Result<RgbImage> {
    let mut rgb_frame = Video::empty();
    self.scaler.run(decoded, &mut rgb_frame)?;

    let data = rgb_frame.data(0);
    let stride = rgb_frame.stride(0);
    let width = self.width as usize;
    let height = self.height as usize;

    // 处理步长对齐的数据
    let mut image_data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
      let row_start = y * stride;
      let row_end = row_start + width * 3;
      image_data.extend_from_slice(&data[row_start..row_end]);
    }

    RgbImage::from_raw(self.width, self.height, image_data).context("无法创建 RGB 图像")
  }
}

/// 时间点对应的帧索引
///
/// 帧率缺失或不合法时钳位到 0，避免索引计算被污染。
pub fn frame_index_for(fps: f64, timestamp_secs: f64) -> u64 {
  if fps.is_finite() && fps > 0.0 && timestamp_secs > 0.0 {
    (timestamp_secs * fps).floor() as u64
  } else {
    0
  }
}

/// 带解码时间预算的单帧解码
///
/// 解码在工作线程中执行，超出预算的请求以 DecodeTimeout 失败；
/// 被放弃的线程不再回收，进程输出结果后随即退出。
pub fn frame_at_with_timeout(
  path: &str,
  timestamp_secs: f64,
  timeout: Option<Duration>,
) -> Result<Option<Frame>, IdentifyError> {
  let Some(budget) = timeout else {
    return decode_one(path, timestamp_secs);
  };

  let (tx, rx) = mpsc::channel();
  let path = path.to_string();
  thread::spawn(move || {
    let _ = tx.send(decode_one(&path, timestamp_secs));
  });

  match rx.recv_timeout(budget) {
    Ok(result) => result,
    Err(_) => Err(IdentifyError::DecodeTimeout(budget)),
  }
}

fn decode_one(path: &str, timestamp_secs: f64) -> Result<Option<Frame>, IdentifyError> {
  let mut source =
    FrameSource::open(path).map_err(|e| IdentifyError::FrameUnavailable(format!("{e:#}")))?;
  source
    .frame_at(timestamp_secs)
    .map_err(|e| IdentifyError::FrameUnavailable(format!("{e:#}")))
}

/// 测试用的短视频生成器，向 path 写出若干全黑帧
#[cfg(test)]
pub(crate) fn write_test_video(path: &str, frames: i64, fps: i32) -> Result<()> {
  ffmpeg::init().context("无法初始化 FFmpeg")?;

  let mut octx = ffmpeg::format::output(&path)?;
  let global_header = octx
    .format()
    .flags()
    .contains(ffmpeg::format::flag::Flags::GLOBAL_HEADER);

  let codec = ffmpeg::encoder::find(ffmpeg::codec::Id::MPEG4).context("找不到 MPEG4 编码器")?;
  let mut ost = octx.add_stream(codec)?;

  let mut encoder = ffmpeg::codec::context::Context::new_with_codec(codec)
    .encoder()
    .video()?;
  encoder.set_width(64);
  encoder.set_height(48);
  encoder.set_format(Pixel::YUV420P);
  encoder.set_time_base(ffmpeg::Rational(1, fps));
  encoder.set_frame_rate(Some(ffmpeg::Rational(fps, 1)));
  if global_header {
    encoder.set_flags(ffmpeg::codec::flag::Flags::GLOBAL_HEADER);
  }
  let mut encoder = encoder.open_as(codec)?;
  ost.set_parameters(&encoder);

  octx.write_header()?;
  let stream_time_base = octx.stream(0).context("无输出流")?.time_base();

  let mut frame = Video::new(Pixel::YUV420P, 64, 48);
  // 黑色: Y=16, U=V=128
  frame.data_mut(0).fill(16);
  frame.data_mut(1).fill(128);
  frame.data_mut(2).fill(128);

  let mut packet = ffmpeg::Packet::empty();
  for index in 0..frames {
    frame.set_pts(Some(index));
    encoder.send_frame(&frame)?;
    while encoder.receive_packet(&mut packet).is_ok() {
      packet.set_stream(0);
      packet.set_duration(1);
      packet.rescale_ts(ffmpeg::Rational(1, fps), stream_time_base);
      packet.write_interleaved(&mut octx)?;
    }
  }
  encoder.send_eof()?;
  while encoder.receive_packet(&mut packet).is_ok() {
    packet.set_stream(0);
    packet.set_duration(1);
    packet.rescale_ts(ffmpeg::Rational(1, fps), stream_time_base);
    packet.write_interleaved(&mut octx)?;
  }
  octx.write_trailer()?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn frame_index_floors_toward_zero() {
    assert_eq!(frame_index_for(30.0, 0.0), 0);
    assert_eq!(frame_index_for(30.0, 1.0), 30);
    assert_eq!(frame_index_for(30.0, 1.999), 59);
    assert_eq!(frame_index_for(29.97, 10.0), 299);
  }

  #[test]
  fn degenerate_fps_clamps_index_to_zero() {
    assert_eq!(frame_index_for(0.0, 5.0), 0);
    assert_eq!(frame_index_for(-1.0, 5.0), 0);
    assert_eq!(frame_index_for(f64::NAN, 5.0), 0);
    assert_eq!(frame_index_for(f64::INFINITY, 5.0), 0);
  }

  #[test]
  fn missing_file_is_frame_unavailable() {
    let err = frame_at_with_timeout("no-such-video.mp4", 1.0, None).unwrap_err();
    assert!(matches!(err, IdentifyError::FrameUnavailable(_)));
  }

  #[test]
  fn beyond_duration_timestamp_has_no_frame() {
    let path = std::env::temp_dir()
      .join(format!("checha-source-duration-{}.mp4", std::process::id()))
      .to_string_lossy()
      .into_owned();
    // 1 秒长的视频: 10 帧 @ 10fps
    write_test_video(&path, 10, 10).unwrap();

    let mut source = FrameSource::open(&path).unwrap();
    assert_eq!(source.width(), 64);
    assert_eq!(source.height(), 48);
    assert!((source.fps() - 10.0).abs() < 0.5);
    assert!(source.duration_secs() > 0.5 && source.duration_secs() < 2.0);

    assert!(source.frame_at(999999.0).unwrap().is_none());

    // 视频内的时间点仍然可以正常命中
    let frame = source.frame_at(0.2).unwrap().expect("应当命中视频内的帧");
    assert_eq!(frame.image.width(), 64);
    assert_eq!(frame.image.height(), 48);

    std::fs::remove_file(&path).ok();
  }
}
