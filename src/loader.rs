use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use image::RgbaImage;
use log::{debug, error};
use parking_lot::Mutex;

use crate::error::MarkupError;

/// Where the session's background image comes from.
///
/// Fetching over the network (and any CORS proxying) is the host
/// application's job; by the time bytes reach this crate they are plain
/// encoded image data.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

type LoadSlot = Arc<Mutex<Option<Result<RgbaImage, MarkupError>>>>;

/// Decodes the background image off the UI thread.
///
/// Loading is the only asynchronous operation in the session; the app polls
/// once per frame and refuses pointer input until the result has landed.
pub struct ImageLoader {
    slot: LoadSlot,
}

impl ImageLoader {
    pub fn spawn(source: ImageSource) -> Self {
        let slot: LoadSlot = Arc::new(Mutex::new(None));
        let result_slot = Arc::clone(&slot);

        thread::spawn(move || {
            let result = decode(source);
            match &result {
                Ok(img) => debug!("decoded background image {}x{}", img.width(), img.height()),
                Err(err) => error!("background image failed to load: {err}"),
            }
            *result_slot.lock() = Some(result);
        });

        Self { slot }
    }

    /// Take the finished result, if the worker is done.
    pub fn poll(&self) -> Option<Result<RgbaImage, MarkupError>> {
        self.slot.lock().take()
    }
}

fn decode(source: ImageSource) -> Result<RgbaImage, MarkupError> {
    let dynamic = match source {
        ImageSource::Path(path) => image::open(path)?,
        ImageSource::Bytes(bytes) => image::load_from_memory(&bytes)?,
    };
    Ok(dynamic.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;

    #[test]
    fn loads_encoded_bytes() {
        let img = RgbaImage::from_pixel(6, 4, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

        let loader = ImageLoader::spawn(ImageSource::Bytes(bytes.into_inner()));
        let mut waited = 0;
        loop {
            if let Some(result) = loader.poll() {
                let decoded = result.unwrap();
                assert_eq!(decoded.dimensions(), (6, 4));
                break;
            }
            waited += 1;
            assert!(waited < 500, "loader never finished");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn reports_decode_failure() {
        let loader = ImageLoader::spawn(ImageSource::Bytes(vec![1, 2, 3]));
        let mut waited = 0;
        loop {
            if let Some(result) = loader.poll() {
                assert!(result.is_err());
                break;
            }
            waited += 1;
            assert!(waited < 500, "loader never finished");
            thread::sleep(Duration::from_millis(10));
        }
    }
}
