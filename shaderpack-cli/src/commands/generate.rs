use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::{enter_shader_dir, PackagerConfig};
use crate::embed::ByteArray;
use crate::header::{render_binary_header, render_source_header, LibrarySet};
use crate::manifest::{ShaderManifest, COMPILED_DIR};
use crate::state::{FailurePolicy, Flavor};
use crate::toolchain::Toolchain;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Standard headers the preprocessed source would otherwise drop.
const METAL_STD_INCLUDES: &str = "#include <metal_stdlib>\n#include <simd/simd.h>\n";

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub outputs: Vec<PathBuf>,
    pub failed_steps: usize,
}

pub async fn run(config: PackagerConfig) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let dir = config.resolve_shader_dir(&cwd)?;
    let root = enter_shader_dir(&dir)?;

    let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    let report = generate(&config, &root, &timestamp).await?;

    for output in &report.outputs {
        println!("Generated {}", output.display());
    }
    if report.failed_steps > 0 {
        log::warn!(
            "{} step(s) failed; generated headers may be incomplete",
            report.failed_steps
        );
    }
    Ok(())
}

/// Compile, link and package every target, writing both headers under `root`.
pub async fn generate(
    config: &PackagerConfig,
    root: &Path,
    timestamp: &str,
) -> anyhow::Result<GenerateReport> {
    let manifest = config.manifest();
    let toolchain = Toolchain::new(config, root);
    let mut report = GenerateReport::default();

    let compiled = root.join(COMPILED_DIR);
    tokio::fs::create_dir_all(&compiled)
        .await
        .with_context(|| format!("creating {}", compiled.display()))?;

    let artifacts = manifest.artifacts();
    for artifact in &artifacts {
        if artifact.flavor == Flavor::Release {
            println!(
                "Compiling {} version of default shaders ...",
                artifact.target.label()
            );
        }
        if !toolchain.compile(artifact, manifest.source).await? {
            report.failed_steps += 1;
        }
        if !toolchain.link(artifact).await? {
            report.failed_steps += 1;
        }
    }

    let mut libs = LibrarySet::default();
    for artifact in &artifacts {
        let name = artifact.metallib_display();
        let array = match ByteArray::from_file(root, &name).await {
            Ok(array) => array,
            Err(e) if config.policy == FailurePolicy::Ignore => {
                log::warn!("{e:#}; embedding an empty library");
                report.failed_steps += 1;
                ByteArray::new(&name, Vec::new())
            }
            Err(e) => return Err(e),
        };
        libs.insert(artifact.target, artifact.flavor, array);
    }

    let binary_header = root.join(manifest.binary_header);
    let text = render_binary_header(timestamp, manifest.variant, &libs)?;
    write_output(&binary_header, &text).await?;
    report.outputs.push(binary_header);

    let source = source_text(config, &manifest, &toolchain, root, &mut report).await?;
    let source_header = root.join(manifest.source_header);
    write_output(&source_header, &render_source_header(timestamp, &source)).await?;
    report.outputs.push(source_header);

    if config.clean_intermediates {
        for artifact in &artifacts {
            let air = root.join(&artifact.air);
            if let Err(e) = tokio::fs::remove_file(&air).await {
                log::debug!("could not remove {}: {e}", air.display());
            }
        }
    }

    Ok(report)
}

/// Shader text for the debug header: the preprocessed master source with
/// the standard includes spelled out, or the raw source file.
async fn source_text(
    config: &PackagerConfig,
    manifest: &ShaderManifest,
    toolchain: &Toolchain<'_>,
    root: &Path,
    report: &mut GenerateReport,
) -> anyhow::Result<String> {
    if config.preprocess {
        match toolchain.preprocess(manifest.source).await? {
            Some(flat) => return Ok(format!("{METAL_STD_INCLUDES}{flat}")),
            None => {
                report.failed_steps += 1;
                log::warn!("embedding {} without preprocessing", manifest.source);
            }
        }
    }

    let path = root.join(manifest.source);
    tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

async fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("writing {}", path.display()))
}
