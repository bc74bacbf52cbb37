use super::FrameSource;
use crate::error::{HeadcountError, Result};
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

/// A system camera streaming RGB frames.
pub struct NokhwaCamera {
    camera: Camera,
    released: bool,
}

#[derive(Debug, Clone)]
pub struct CameraDevice {
    pub index: String,
    pub name: String,
    pub description: String,
}

impl NokhwaCamera {
    pub fn open(index: u32) -> Result<Self> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|e| HeadcountError::Device(format!("Could not open camera {}: {}", index, e)))?;
        camera
            .open_stream()
            .map_err(|e| HeadcountError::Device(format!("Could not start camera {}: {}", index, e)))?;

        let opened = Self {
            camera,
            released: false,
        };
        tracing::info!(index, name = %opened.name(), "camera opened");
        Ok(opened)
    }

    pub fn name(&self) -> String {
        self.camera.info().human_name()
    }
}

impl FrameSource for NokhwaCamera {
    fn read_frame(&mut self) -> Result<RgbImage> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| HeadcountError::Device(format!("Failed to read frame: {}", e)))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| HeadcountError::Device(format!("Failed to decode frame: {}", e)))?;

        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| HeadcountError::Device("frame buffer size mismatch".into()))
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.camera.stop_stream() {
            tracing::warn!("failed to stop camera stream: {}", e);
        }
        tracing::info!("camera released");
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.release();
    }
}

pub fn list_cameras() -> Result<Vec<CameraDevice>> {
    let cameras = nokhwa::query(ApiBackend::Auto)
        .map_err(|e| HeadcountError::Device(format!("Could not query cameras: {}", e)))?;

    Ok(cameras
        .into_iter()
        .map(|info| CameraDevice {
            index: info.index().to_string(),
            name: info.human_name(),
            description: info.description().to_string(),
        })
        .collect())
}
