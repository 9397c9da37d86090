//! Print resolution stored by the container itself.
//!
//! JPEG keeps it in the JFIF APP0 segment, PNG in the `pHYs` chunk and BMP in
//! the info header as pixels per metre. Values are dots per inch, unrounded.

const CM_PER_INCH: f64 = 2.54;
const METRES_PER_INCH: f64 = 0.0254;
const INCHES_PER_METRE: f64 = 39.3701;

/// Dots per inch from the container header, when it records an absolute one.
pub fn container_dpi(bytes: &[u8]) -> Option<(f64, f64)> {
    if bytes.starts_with(&[0xFF, 0xD8]) {
        jfif_dpi(bytes)
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        png_dpi(bytes)
    } else if bytes.starts_with(b"BM") {
        bmp_dpi(bytes)
    } else {
        None
    }
}

/// Walks the marker segments up to the start of scan looking for JFIF APP0.
fn jfif_dpi(bytes: &[u8]) -> Option<(f64, f64)> {
    let mut pos = 2;
    loop {
        if *bytes.get(pos)? != 0xFF {
            return None;
        }
        let marker = *bytes.get(pos + 1)?;
        match marker {
            // Fill byte before a marker
            0xFF => {
                pos += 1;
                continue;
            }
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            0xD9 | 0xDA => return None,
            _ => {}
        }

        let length = usize::from(be_u16(bytes, pos + 2)?);
        if length < 2 {
            return None;
        }
        let segment = bytes.get(pos + 4..pos + 2 + length)?;

        if marker == 0xE0 && segment.starts_with(b"JFIF\0") {
            let unit = *segment.get(7)?;
            let x = f64::from(be_u16(segment, 8)?);
            let y = f64::from(be_u16(segment, 10)?);
            return match unit {
                1 => positive_pair(x, y),
                2 => positive_pair(x * CM_PER_INCH, y * CM_PER_INCH),
                _ => None,
            };
        }
        pos += 2 + length;
    }
}

/// Reads `pHYs`, which must precede the image data.
fn png_dpi(bytes: &[u8]) -> Option<(f64, f64)> {
    let mut pos = 8;
    loop {
        let length = usize::try_from(be_u32(bytes, pos)?).ok()?;
        let kind = bytes.get(pos + 4..pos + 8)?;
        let data = bytes.get(pos + 8..pos + 8 + length)?;

        match kind {
            b"pHYs" => {
                // Unit 1 is the metre; unit 0 only gives an aspect ratio.
                if *data.get(8)? != 1 {
                    return None;
                }
                let x = f64::from(be_u32(data, 0)?);
                let y = f64::from(be_u32(data, 4)?);
                return positive_pair(x * METRES_PER_INCH, y * METRES_PER_INCH);
            }
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }
        // length, type, data, CRC
        pos += 12 + length;
    }
}

/// `biXPelsPerMeter` / `biYPelsPerMeter` of a BITMAPINFOHEADER or later.
fn bmp_dpi(bytes: &[u8]) -> Option<(f64, f64)> {
    if le_u32(bytes, 14)? < 40 {
        return None;
    }
    let x = f64::from(le_i32(bytes, 38)?);
    let y = f64::from(le_i32(bytes, 42)?);
    positive_pair(x / INCHES_PER_METRE, y / INCHES_PER_METRE)
}

/// Zero or negative densities mean "unspecified".
fn positive_pair(x: f64, y: f64) -> Option<(f64, f64)> {
    (x > 0.0 && y > 0.0).then_some((x, y))
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_be_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn le_u32(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn le_i32(bytes: &[u8], at: usize) -> Option<i32> {
    Some(i32::from_le_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}
