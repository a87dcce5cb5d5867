use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

type DecodeResult = Result<Frame, Box<dyn std::error::Error>>;

/// Decodes a video with ffmpeg-next and scales every frame to a fixed
/// output resolution in RGB24, so frames line up with the density grid no
/// matter what the source resolution is.
pub struct FfmpegReader {
    output_width: u32,
    output_height: u32,
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    video_stream_index: usize,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new(output_width: u32, output_height: u32) -> Self {
        Self {
            output_width,
            output_height,
            input_ctx: None,
            video_stream_index: 0,
        }
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        log::info!(
            "Opened {} ({}x{} @ {fps:.2} fps), scaling to {}x{}",
            path.display(),
            decoder.width(),
            decoder.height(),
            self.output_width,
            self.output_height
        );

        let metadata = VideoMetadata {
            width: self.output_width,
            height: self.output_height,
            fps,
            total_frames: stream.frames().max(0) as usize,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        self.video_stream_index = stream.index();
        self.input_ctx = Some(ictx);
        Ok(metadata)
    }

    fn frames(&mut self) -> Box<dyn Iterator<Item = DecodeResult> + '_> {
        let (out_w, out_h) = (self.output_width, self.output_height);
        let stream_index = self.video_stream_index;
        let Some(ictx) = self.input_ctx.as_mut() else {
            return Box::new(std::iter::once(Err("FfmpegReader: not opened".into())));
        };

        match build_decoder(ictx, stream_index, out_w, out_h) {
            Ok((decoder, scaler)) => Box::new(ScaledFrameIter {
                ictx,
                decoder,
                scaler,
                out_w,
                out_h,
                stream_index,
                next_index: 0,
                state: DecodeState::Reading,
            }),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }

    fn close(&mut self) {
        self.input_ctx = None;
    }
}

fn build_decoder(
    ictx: &ffmpeg_next::format::context::Input,
    stream_index: usize,
    out_w: u32,
    out_h: u32,
) -> Result<
    (
        ffmpeg_next::decoder::Video,
        ffmpeg_next::software::scaling::Context,
    ),
    Box<dyn std::error::Error>,
> {
    let stream = ictx
        .stream(stream_index)
        .ok_or("Video stream disappeared after open")?;
    let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
    let decoder = codec_ctx.decoder().video()?;
    let scaler = ffmpeg_next::software::scaling::Context::get(
        decoder.format(),
        decoder.width(),
        decoder.height(),
        ffmpeg_next::format::Pixel::RGB24,
        out_w,
        out_h,
        ffmpeg_next::software::scaling::Flags::BILINEAR,
    )?;
    Ok((decoder, scaler))
}

/// Copies the visible rows of a (possibly padded) RGB24 plane.
fn packed_rgb(rgb: &ffmpeg_next::util::frame::video::Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let plane = rgb.data(0);
    let row_bytes = width as usize * 3;
    (0..height as usize)
        .flat_map(|row| &plane[row * stride..row * stride + row_bytes])
        .copied()
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Reading,
    Draining,
    Finished,
}

struct ScaledFrameIter<'a> {
    ictx: &'a mut ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    out_w: u32,
    out_h: u32,
    stream_index: usize,
    next_index: usize,
    state: DecodeState,
}

impl ScaledFrameIter<'_> {
    /// Pulls one decoded picture, if the decoder has one ready. Scaling and
    /// packet failures still consume a frame index so sequence numbers stay
    /// aligned with the detection log.
    fn receive(&mut self) -> Option<DecodeResult> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        self.decoder.receive_frame(&mut decoded).ok()?;

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb) {
            return Some(self.lost_frame(&format!("scaling failed: {e}")));
        }
        let index = self.next_index;
        self.next_index += 1;
        let pixels = packed_rgb(&rgb, self.out_w, self.out_h);
        Some(Ok(Frame::new(pixels, self.out_w, self.out_h, 3, index)))
    }

    /// Reports a frame whose pixels are gone, keeping its index reserved.
    fn lost_frame(&mut self, reason: &str) -> DecodeResult {
        let index = self.next_index;
        self.next_index += 1;
        Err(format!("Frame {index}: {reason}").into())
    }
}

impl Iterator for ScaledFrameIter<'_> {
    type Item = DecodeResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == DecodeState::Finished {
                return None;
            }
            if let Some(result) = self.receive() {
                return Some(result);
            }
            if self.state == DecodeState::Draining {
                self.state = DecodeState::Finished;
                continue;
            }

            match self.ictx.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        return Some(self.lost_frame(&format!("undecodable packet: {e}")));
                    }
                }
                None => {
                    let _ = self.decoder.send_eof();
                    self.state = DecodeState::Draining;
                }
            }
        }
    }
}
