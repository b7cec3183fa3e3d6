/// Characters per token assumed when only raw text is available
pub const CHARS_PER_TOKEN: usize = 4;

/// Approximate token count of `text` as ceil(length / 4)
///
/// Length is measured in UTF-16 code units, the unit browsers report for
/// string length, so counts agree with what the extension logs.
pub fn approx_token_count(text: &str) -> u32 {
    let units = text.encode_utf16().count();
    let tokens = units.div_ceil(CHARS_PER_TOKEN);
    u32::try_from(tokens).unwrap_or(u32::MAX)
}
