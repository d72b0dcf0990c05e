//! Scalar decoding: percent-decoding plus charset interpretation.

use std::borrow::Cow;

use crate::options::{Charset, Options};

/// Decodes one key segment or value. Applies the custom decoder when one is
/// configured, otherwise percent-decodes (`+` becomes a space) and
/// interprets the bytes per the configured charset.
///
/// Errors are plain messages; the caller attaches the offending segment
/// name.
pub(crate) fn decode_scalar(input: &str, options: &Options) -> Result<String, String> {
    if let Some(decoder) = options.decoder {
        return decoder(input.as_bytes(), options.charset);
    }
    let bytes = decode_bytes(input.as_bytes())?;
    match options.charset {
        Charset::Utf8 => match bytes {
            Cow::Borrowed(bytes) => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| e.to_string()),
            Cow::Owned(bytes) => String::from_utf8(bytes).map_err(|e| e.utf8_error().to_string()),
        },
        // ISO-8859-1 maps every byte to its own code point, so this cannot fail
        Charset::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Replaces `+` with a space and decodes percent-encoded bytes.
///
/// Adapted from `rust-url`, which splits each of these steps into separate
/// functions. Avoids allocating when the input contains neither `+` nor `%`.
fn decode_bytes(input: &[u8]) -> Result<Cow<'_, [u8]>, String> {
    if !input.iter().any(|&b| b == b'+' || b == b'%') {
        return Ok(Cow::Borrowed(input));
    }

    let mut decoded = Vec::with_capacity(input.len());
    let mut last_segment = 0;
    let mut bytes_iter = input.iter().enumerate();

    while let Some((idx, &b)) = bytes_iter.next() {
        if b == b'+' {
            decoded.extend_from_slice(&input[last_segment..idx]);
            decoded.push(b' ');
            last_segment = idx + 1;
        } else if b == b'%' {
            let hi = bytes_iter.next().and_then(|(_, b)| char::from(*b).to_digit(16));
            let lo = bytes_iter.next().and_then(|(_, b)| char::from(*b).to_digit(16));
            let (Some(hi), Some(lo)) = (hi, lo) else {
                return Err(format!("malformed percent-encoding at byte {idx}"));
            };
            decoded.extend_from_slice(&input[last_segment..idx]);
            decoded.push((hi * 0x10 + lo) as u8);
            last_segment = idx + 3;
        }
    }

    decoded.extend_from_slice(&input[last_segment..]);
    Ok(Cow::Owned(decoded))
}
