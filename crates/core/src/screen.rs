//! Screen geometry: logical size from WDA and pixel size from screenshots.

use std::io::Cursor;

use base64::Engine;
use wdactl_protocol::WindowSize;

use crate::error::{Error, Result, TransportError};

/// Session and screen sizes of the device behind a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
	pub session_id: String,
	/// Logical size in points; `None` when the backend does not report it.
	pub size_pt: Option<WindowSize>,
	/// Screenshot size in pixels; `None` when skipped or unavailable.
	pub size_px: Option<WindowSize>,
}

/// Pixel dimensions of a base64 screenshot. Only the image header is read.
pub fn image_dimensions(encoded: &str) -> Result<WindowSize> {
	let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
	let bytes = base64::prelude::BASE64_STANDARD
		.decode(compact)
		.map_err(|e| decode_error(format!("decode screenshot: {e}")))?;
	let (width, height) = image::io::Reader::new(Cursor::new(bytes))
		.with_guessed_format()
		.map_err(|e| decode_error(format!("read screenshot: {e}")))?
		.into_dimensions()
		.map_err(|e| decode_error(format!("screenshot header: {e}")))?;
	Ok(WindowSize { width, height })
}

fn decode_error(message: String) -> Error {
	Error::Transport(TransportError::Decode(message))
}

#[cfg(test)]
pub(crate) fn png_base64(width: u32, height: u32) -> String {
	let mut png = Cursor::new(Vec::new());
	image::DynamicImage::new_rgb8(width, height)
		.write_to(&mut png, image::ImageOutputFormat::Png)
		.unwrap();
	base64::prelude::BASE64_STANDARD.encode(png.into_inner())
}
