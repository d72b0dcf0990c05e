use std::borrow::Cow;

use percent_encoding::AsciiSet;

/// As defined in https://url.spec.whatwg.org/#query-percent-encode-set
///
/// The set of characters that need to be encoded in a _query_ string
/// are:
/// - CONTROL characters
/// - SPACE (encoded separately as `+`)
/// - U+0022 ("), U+0023 (#), U+003C (<), and U+003E (>).
///
/// The querystring-specific control characters are added on top, since
/// this is only ever applied to individual keys and values where they
/// would otherwise be ambiguous.
const MINIMAL_QS_SET: &AsciiSet = &percent_encoding::CONTROLS
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    // `+` represents a space in query strings
    .add(b'+')
    // denote nested keys
    .add(b'[')
    .add(b']')
    // key, value separator
    .add(b'=')
    // denote key-value pairs
    .add(b'&');

/// Percent-encodes bytes for use in a querystring, with spaces written as
/// `+`. Returns an iterator to avoid allocating when nothing needs
/// encoding.
pub(crate) fn encode(bytes: &[u8]) -> impl Iterator<Item = Cow<'_, [u8]>> + '_ {
    percent_encoding::percent_encode(bytes, MINIMAL_QS_SET).map(|chunk| {
        if chunk.as_bytes().contains(&b' ') {
            Cow::Owned(
                chunk
                    .as_bytes()
                    .iter()
                    .map(|b| if *b == b' ' { b'+' } else { *b })
                    .collect(),
            )
        } else {
            Cow::Borrowed(chunk.as_bytes())
        }
    })
}
