//! Binary file to JavaScript array conversion

use std::fmt::Write;

/// Variable name used when none is given
pub const DEFAULT_NAME: &str = "Bin";

/// Array entries per output line
pub const ENTRIES_PER_LINE: usize = 10;

/// Render `bytes` as `var <name> = [ ... ];`
///
/// Entries are uppercase `0xHH`, separated by `", "`, ten to a line and
/// tab indented. The closing bracket sits on its own line with no
/// trailing newline.
pub fn format(name: &str, bytes: &[u8]) -> String {
    let mut out = String::with_capacity(16 + bytes.len() * 6);
    let _ = write!(out, "var {} = [\n\t", name);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
            if i % ENTRIES_PER_LINE == 0 {
                out.push_str("\n\t");
            }
        }
        let _ = write!(out, "0x{:02X}", byte);
    }
    out.push_str("\n];");
    out
}
