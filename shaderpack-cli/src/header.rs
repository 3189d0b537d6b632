use std::collections::HashMap;

use anyhow::Context;

use crate::embed::ByteArray;
use crate::manifest::{SOURCE_SYMBOL, UNIFIED_SYMBOL};
use crate::state::{Flavor, ShaderTarget, Variant};

/// Linked libraries keyed by what they were built for.
#[derive(Debug, Default)]
pub struct LibrarySet {
    arrays: HashMap<(ShaderTarget, Flavor), ByteArray>,
}

impl LibrarySet {
    pub fn insert(&mut self, target: ShaderTarget, flavor: Flavor, array: ByteArray) {
        self.arrays.insert((target, flavor), array);
    }

    pub fn get(&self, target: ShaderTarget, flavor: Flavor) -> anyhow::Result<&ByteArray> {
        self.arrays.get(&(target, flavor)).with_context(|| {
            format!("no {flavor:?} library for {} was packaged", target.label())
        })
    }
}

pub fn disclaimer(timestamp: &str) -> String {
    format!("// GENERATED FILE on {timestamp} - DO NOT EDIT.\n")
}

/// Render the header that selects one embedded library per platform.
pub fn render_binary_header(
    timestamp: &str,
    variant: Variant,
    libs: &LibrarySet,
) -> anyhow::Result<String> {
    let mut out = disclaimer(timestamp);
    out.push_str("#pragma once\n\n");
    out.push_str("#include <TargetConditionals.h>\n\n");

    for (i, target) in ShaderTarget::HEADER_ORDER.into_iter().enumerate() {
        if i == 0 {
            out.push_str(&format!("#if {}\n\n", target.target_macro()));
        } else {
            out.push_str(&format!(
                "\n#elif {}  // {}\n\n",
                target.target_macro(),
                ShaderTarget::MacOs.target_macro()
            ));
        }

        if target == ShaderTarget::MacOs && variant.has_debug_flavor() {
            out.push_str("#  if defined (NDEBUG)\n\n");
            push_library(&mut out, libs.get(target, Flavor::Release)?);
            out.push_str("#  else  // NDEBUG\n\n");
            push_library(&mut out, libs.get(target, Flavor::Debug)?);
            out.push_str("#  endif  // NDEBUG\n");
        } else {
            push_library(&mut out, libs.get(target, Flavor::Release)?);
        }
    }

    out.push_str(&format!(
        "#endif  // {}\n",
        ShaderTarget::MacOs.target_macro()
    ));
    Ok(out)
}

fn push_library(out: &mut String, array: &ByteArray) {
    if array.symbol != UNIFIED_SYMBOL {
        out.push_str(&format!(
            "#define {UNIFIED_SYMBOL}     {}\n",
            array.symbol
        ));
        out.push_str(&format!(
            "#define {UNIFIED_SYMBOL}_len {}_len\n\n",
            array.symbol
        ));
    }
    out.push_str(&array.render());
}

/// Render the debug header carrying the shader text as a raw string.
pub fn render_source_header(timestamp: &str, source: &str) -> String {
    let delim = raw_string_delimiter(source);
    let mut out = disclaimer(timestamp);
    out.push_str("\n\n");
    out.push_str(&format!("static const char {SOURCE_SYMBOL}[] = R\"{delim}(\n"));
    out.push_str(source);
    if !source.is_empty() && !source.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("){delim}\";\n"));
    out
}

/// Shortest delimiter whose closing sequence never appears in `text`.
pub fn raw_string_delimiter(text: &str) -> String {
    if !text.contains(")\"") {
        return String::new();
    }
    (0u32..)
        .map(|n| if n == 0 { "mtl".to_string() } else { format!("mtl{n}") })
        .find(|d| !text.contains(&format!("){d}\"")))
        .unwrap_or_default()
}
