//! Byte-array embedding laid out the way `xxd -i` prints it, so the
//! generated headers stay diff-compatible with ones produced by `xxd`.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;

const BYTES_PER_LINE: usize = 12;

/// A named blob destined for a `static const unsigned char[]` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteArray {
    pub symbol: String,
    pub bytes: Vec<u8>,
}

impl ByteArray {
    pub fn new(path: &str, bytes: Vec<u8>) -> Self {
        Self {
            symbol: symbol_for_path(path),
            bytes,
        }
    }

    /// Read `root/rel_path`; the symbol is derived from `rel_path` alone.
    pub async fn from_file(root: &Path, rel_path: &str) -> anyhow::Result<Self> {
        let full = root.join(rel_path);
        let bytes = tokio::fs::read(&full)
            .await
            .with_context(|| format!("reading shader library {}", full.display()))?;
        Ok(Self::new(rel_path, bytes))
    }

    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.bytes.len() * 6 + 128);
        let _ = writeln!(out, "static const unsigned char {}[] = {{", self.symbol);
        // ISO C++ has no zero-length arrays; `_len` still reports 0.
        if self.bytes.is_empty() {
            out.push_str("  0x00\n");
        }
        let lines = self.bytes.chunks(BYTES_PER_LINE).count();
        for (i, chunk) in self.bytes.chunks(BYTES_PER_LINE).enumerate() {
            out.push_str("  ");
            let hex: Vec<String> = chunk.iter().map(|b| format!("0x{b:02x}")).collect();
            out.push_str(&hex.join(", "));
            if i + 1 < lines {
                out.push(',');
            }
            out.push('\n');
        }
        out.push_str("};\n");
        let _ = writeln!(
            out,
            "static const unsigned int {}_len = {};",
            self.symbol,
            self.bytes.len()
        );
        out
    }
}

/// `xxd -i` naming: non-alphanumerics become `_`, a leading digit gets `__`.
pub fn symbol_for_path(path: &str) -> String {
    let mut symbol = String::with_capacity(path.len() + 2);
    if path.starts_with(|c: char| c.is_ascii_digit()) {
        symbol.push_str("__");
    }
    symbol.extend(
        path.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' }),
    );
    symbol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_matches_xxd_naming() {
        assert_eq!(
            symbol_for_path("compiled/default.ios_sim.metallib"),
            "compiled_default_ios_sim_metallib"
        );
        assert_eq!(symbol_for_path("3d.bin"), "__3d_bin");
    }

    #[test]
    fn wraps_after_twelve_bytes() {
        let arr = ByteArray::new("a.bin", (0u8..14).collect());
        let expected = "static const unsigned char a_bin[] = {\n  \
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b,\n  \
            0x0c, 0x0d\n\
            };\n\
            static const unsigned int a_bin_len = 14;\n";
        assert_eq!(arr.render(), expected);
    }

    #[test]
    fn exact_multiple_has_no_trailing_comma() {
        let arr = ByteArray::new("x", vec![0xff; 12]);
        let body = arr.render();
        assert!(body.contains("0xff, 0xff\n};"));
        assert!(body.ends_with("x_len = 12;\n"));
    }

    #[test]
    fn empty_array_gets_one_pad_byte_and_zero_length() {
        let arr = ByteArray::new("compiled/default.metallib", Vec::new());
        assert_eq!(
            arr.render(),
            "static const unsigned char compiled_default_metallib[] = {\n  0x00\n};\n\
             static const unsigned int compiled_default_metallib_len = 0;\n"
        );
    }
}
