//! Radiance header and resolution-line parsing.

use super::FormatError;
use super::cursor::Cursor;
use std::collections::BTreeMap;

/// Parsed Radiance header.
///
/// Only `width`, `height` and `data_offset` drive decoding. The variables
/// and program identifier are kept for display (`info` command) and are
/// never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub width: usize,
    pub height: usize,
    /// `KEY=VALUE` header lines, e.g. `FORMAT`, `EXPOSURE`, `SOFTWARE`.
    pub variables: BTreeMap<String, String>,
    /// Text after a leading `#?`, usually `RADIANCE` or `RGBE`.
    pub program: Option<String>,
    /// Byte offset of the first scanline.
    pub data_offset: usize,
}

/// Parse the header and resolution line of a Radiance file.
pub fn read_header(data: &[u8]) -> Result<Header, FormatError> {
    let mut cursor = Cursor::new(data);
    let mut variables = BTreeMap::new();
    let mut program = None;

    loop {
        let raw = cursor.read_line().ok_or(FormatError::HeaderNotTerminated)?;
        let line = ascii_line(raw);
        if line.is_empty() {
            break;
        }
        if let Some(name) = line.strip_prefix("#?") {
            if program.is_none() {
                program = Some(name.trim().to_string());
            }
        } else if let Some((key, value)) = line.split_once('=') {
            variables.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    let raw = cursor.read_line().ok_or(FormatError::MissingResolution)?;
    let (height, width) = parse_resolution(&ascii_line(raw))?;

    Ok(Header {
        width,
        height,
        variables,
        program,
        data_offset: cursor.position(),
    })
}

/// Parse a `-Y <height> +X <width>` style resolution line into
/// `(height, width)`.
///
/// Only the axis letters are checked: the first token must end in `Y`/`y`
/// and the third in `X`/`x`. Sign prefixes (flip flags) are accepted but do
/// not change the output orientation.
pub fn parse_resolution(line: &str) -> Result<(usize, usize), FormatError> {
    let invalid = || FormatError::InvalidResolution(line.to_string());

    let parts: Vec<&str> = line.split_whitespace().collect();
    let [y_axis, height, x_axis, width] = parts.as_slice() else {
        return Err(invalid());
    };
    if !ends_with_axis(y_axis, 'y') || !ends_with_axis(x_axis, 'x') {
        return Err(invalid());
    }

    let height: usize = height.parse().map_err(|_| invalid())?;
    let width: usize = width.parse().map_err(|_| invalid())?;
    if height == 0 || width == 0 {
        return Err(invalid());
    }
    // Scanline headers carry the width in 16 bits.
    if width > usize::from(u16::MAX) {
        return Err(invalid());
    }
    width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(invalid)?;
    Ok((height, width))
}

fn ends_with_axis(token: &str, axis: char) -> bool {
    token
        .chars()
        .next_back()
        .is_some_and(|c| c.eq_ignore_ascii_case(&axis))
}

/// Decode a header line as ASCII, dropping other bytes, and trim it.
fn ascii_line(raw: &[u8]) -> String {
    raw.iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect::<String>()
        .trim()
        .to_string()
}
