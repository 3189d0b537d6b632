use std::path::Path;
use std::process::Output;

use tokio::process::Command;

use crate::config::PackagerConfig;
use crate::state::{ToolSet, ToolStatus};

/// Resolve `program` on `PATH` and ask it for its version banner.
/// A tool that resolves but cannot report a version still counts as found.
pub async fn probe(program: &Path) -> ToolStatus {
    let Ok(path) = which::which(program) else {
        return ToolStatus::NotFound;
    };

    let version = match Command::new(&path).arg("--version").output().await {
        Ok(out) => version_banner(&out),
        Err(e) => {
            log::debug!("{} --version: {e}", path.display());
            None
        }
    };

    ToolStatus::Found {
        version: version.unwrap_or_else(|| "unknown".to_string()),
        path,
    }
}

/// First non-blank line the tool printed, preferring stdout; `xcrun`
/// reports on stdout while some compilers only write to stderr.
pub fn version_banner(out: &Output) -> Option<String> {
    [&out.stdout, &out.stderr]
        .into_iter()
        .flat_map(|stream| {
            String::from_utf8_lossy(stream)
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(str::to_string)
        })
        .next()
}

pub async fn detect_all_tools(config: &PackagerConfig) -> ToolSet {
    let (xcrun, cpp) = tokio::join!(probe(&config.xcrun), probe(&config.cpp));
    ToolSet { xcrun, cpp }
}

/// Names of tools the configured run cannot do without.
pub fn missing_required(tools: &ToolSet, config: &PackagerConfig) -> Vec<String> {
    let mut missing = Vec::new();
    if !tools.xcrun.is_available() {
        missing.push(config.xcrun.display().to_string());
    }
    if config.preprocess && !tools.cpp.is_available() {
        missing.push(config.cpp.display().to_string());
    }
    missing
}
