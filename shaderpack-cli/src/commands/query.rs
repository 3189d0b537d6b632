use std::io::{self, Write};
use std::process::ExitCode;

use crate::manifest::ShaderManifest;

/// Dependency-discovery answer for `arg`, or `None` if `arg` is not a query.
pub fn answer(arg: &str, manifest: &ShaderManifest) -> Option<String> {
    match arg {
        "inputs" => Some(manifest.inputs.join(",")),
        "outputs" => Some(manifest.outputs().join(",")),
        _ => None,
    }
}

pub fn run(arg: &str, manifest: &ShaderManifest) -> ExitCode {
    let status = respond(arg, manifest, &mut io::stdout(), &mut io::stderr()).unwrap_or(1);
    ExitCode::from(status)
}

/// Write the answer to `out` or the rejection to `err`; returns the exit status.
pub fn respond(
    arg: &str,
    manifest: &ShaderManifest,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<u8> {
    match answer(arg, manifest) {
        Some(list) => {
            writeln!(out, "{list}")?;
            Ok(0)
        }
        None => {
            writeln!(err, "Invalid script parameters: {arg}")?;
            Ok(1)
        }
    }
}
