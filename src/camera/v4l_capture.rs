use image::{ImageFormat, RgbImage};
use log::{debug, info};
use v4l::buffer::Type;
use v4l::capability::Flags;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use super::{Camera, CaptureDevice};
use crate::config::Resolution;
use crate::error::CaptureError;

const FRAME_BUFFERS: u32 = 2;
const MJPG: &[u8; 4] = b"MJPG";
const YUYV: &[u8; 4] = b"YUYV";

/// Video4Linux2 cameras, e.g. a USB webcam or the Pi camera through its V4L2 driver.
#[derive(Debug, Default)]
pub struct V4lCamera;

impl V4lCamera {
    pub fn new() -> Self {
        Self
    }
}

impl Camera for V4lCamera {
    type Device = V4lDevice;

    /// Opens the lowest numbered `/dev/video*` node that can capture video.
    fn open(&mut self) -> Result<V4lDevice, CaptureError> {
        let mut nodes = v4l::context::enum_devices();
        nodes.sort_by_key(|node| node.index());

        for node in nodes {
            let Ok(device) = Device::with_path(node.path()) else {
                debug!("skipping {}: cannot open", node.path().display());
                continue;
            };
            match device.query_caps() {
                Ok(caps) if caps.capabilities.contains(Flags::VIDEO_CAPTURE) => {
                    info!("Camera {} ({})", node.path().display(), caps.card);
                    return Ok(V4lDevice {
                        device,
                        fourcc: FourCC::new(MJPG),
                        size: Resolution::new(0, 0),
                        stride: 0,
                    });
                }
                _ => debug!("skipping {}: not a capture device", node.path().display()),
            }
        }
        Err(CaptureError::Open("no V4L2 capture device found".to_string()))
    }
}

/// An open V4L2 device. The file descriptor is closed on drop.
pub struct V4lDevice {
    device: Device,
    fourcc: FourCC,
    size: Resolution,
    /// Bytes per row as reported by the driver, padding included.
    stride: u32,
}

impl V4lDevice {
    /// MJPG when offered since it is cheap to transfer, otherwise YUYV.
    fn pick_fourcc(&self) -> Option<FourCC> {
        let offered: Vec<FourCC> = self
            .device
            .enum_formats()
            .map(|descs| descs.into_iter().map(|d| d.fourcc).collect())
            .unwrap_or_default();
        [MJPG, YUYV]
            .into_iter()
            .map(FourCC::new)
            .find(|wanted| offered.contains(wanted))
    }
}

impl CaptureDevice for V4lDevice {
    fn set_resolution(&mut self, requested: Resolution) -> Result<Resolution, CaptureError> {
        let rejected = |reason: String| CaptureError::Resolution {
            width: requested.width,
            height: requested.height,
            reason,
        };

        let fourcc = self
            .pick_fourcc()
            .ok_or_else(|| rejected("neither MJPG nor YUYV offered".to_string()))?;
        let mut fmt = self.device.format().map_err(|e| rejected(e.to_string()))?;
        fmt.width = requested.width;
        fmt.height = requested.height;
        fmt.fourcc = fourcc;

        let fmt = self
            .device
            .set_format(&fmt)
            .map_err(|e| rejected(e.to_string()))?;
        if fmt.fourcc != FourCC::new(MJPG) && fmt.fourcc != FourCC::new(YUYV) {
            return Err(rejected(format!("driver switched to {}", fmt.fourcc)));
        }

        debug!(
            "format {} {}x{} stride {}",
            fmt.fourcc, fmt.width, fmt.height, fmt.stride
        );
        self.fourcc = fmt.fourcc;
        self.size = Resolution::new(fmt.width, fmt.height);
        self.stride = fmt.stride;
        Ok(self.size)
    }

    fn grab_frame(&mut self) -> Result<RgbImage, CaptureError> {
        let mut stream = Stream::with_buffers(&self.device, Type::VideoCapture, FRAME_BUFFERS)
            .map_err(|e| CaptureError::Grab(e.to_string()))?;
        let (buf, meta) = stream
            .next()
            .map_err(|e| CaptureError::Grab(e.to_string()))?;

        let used = (meta.bytesused as usize).min(buf.len());
        let data = &buf[..used];
        if data.is_empty() {
            return Err(CaptureError::Grab("empty frame".to_string()));
        }

        if self.fourcc == FourCC::new(MJPG) {
            image::load_from_memory_with_format(data, ImageFormat::Jpeg)
                .map(|img| img.to_rgb8())
                .map_err(|e| CaptureError::Decode(e.to_string()))
        } else {
            yuyv_to_rgb(data, self.size.width, self.size.height, self.stride).ok_or_else(|| {
                CaptureError::Decode(format!(
                    "{} bytes is short for a {}x{} YUYV frame",
                    data.len(),
                    self.size.width,
                    self.size.height
                ))
            })
        }
    }
}

/// Converts packed YUYV 4:2:2 (BT.601, limited range) to RGB.
///
/// Rows start every `stride` bytes; a stride below `width * 2` (some drivers
/// report 0) means tightly packed rows. `None` if `width` is odd, the frame is
/// empty or `data` ends before the last row does.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32, stride: u32) -> Option<RgbImage> {
    let row_len = width as usize * 2;
    let stride = (stride as usize).max(row_len);
    if width % 2 != 0 || width == 0 || height == 0 {
        return None;
    }
    if data.len() < stride * (height as usize - 1) + row_len {
        return None;
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for row in data.chunks(stride).take(height as usize) {
        for chunk in row[..row_len].chunks_exact(4) {
            let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
            rgb.extend_from_slice(&ycbcr_to_rgb(y0, u, v));
            rgb.extend_from_slice(&ycbcr_to_rgb(y1, u, v));
        }
    }
    RgbImage::from_raw(width, height, rgb)
}

fn ycbcr_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = (i32::from(y) - 16) * 298;
    let d = i32::from(u) - 128;
    let e = i32::from(v) - 128;
    let clamp = |x: i32| ((x + 128) >> 8).clamp(0, 255) as u8;
    [
        clamp(c + 409 * e),
        clamp(c - 100 * d - 208 * e),
        clamp(c + 516 * d),
    ]
}
