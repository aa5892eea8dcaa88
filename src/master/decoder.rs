use encoding_rs::WINDOWS_1252;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Spreadsheet tools often export CSV in the local code page instead of
/// UTF-8, so anything that is not valid UTF-8 is read as Windows-1252.
pub fn decode_master(raw: &[u8]) -> String {
    let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
    match std::str::from_utf8(raw) {
        Ok(text) => text.to_owned(),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(raw).0.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_test() {
        assert_eq!(decode_master(b"ACCT_ID\n1\n"), "ACCT_ID\n1\n");
        assert_eq!(decode_master(b"\xEF\xBB\xBFACCT_ID"), "ACCT_ID");
        // 0xE9 is 'é' in Windows-1252 and invalid on its own in UTF-8
        assert_eq!(decode_master(b"Z\xE9ro"), "Zéro");
    }
}
