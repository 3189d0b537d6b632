use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cli::Cli;
use crate::manifest::ShaderManifest;
use crate::state::{FailurePolicy, MinVersions, Variant};

#[derive(Debug, Clone)]
pub struct PackagerConfig {
    pub variant: Variant,
    pub shader_dir: Option<PathBuf>,
    pub xcrun: PathBuf,
    pub cpp: PathBuf,
    pub min_versions: MinVersions,
    pub preprocess: bool,
    pub policy: FailurePolicy,
    pub clean_intermediates: bool,
}

impl PackagerConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            variant: cli.variant,
            shader_dir: cli.shader_dir.clone(),
            xcrun: cli.xcrun.clone(),
            cpp: cli.cpp.clone(),
            min_versions: MinVersions {
                macos: cli.macos_min.clone(),
                ios: cli.ios_min.clone(),
            },
            preprocess: cli.variant.preprocesses_source() && !cli.no_preprocess,
            policy: if cli.keep_going {
                FailurePolicy::Ignore
            } else {
                FailurePolicy::Abort
            },
            clean_intermediates: cli.clean_intermediates,
        }
    }

    pub fn manifest(&self) -> ShaderManifest {
        ShaderManifest::for_variant(self.variant)
    }

    /// The explicit `--shader-dir`, otherwise the first place holding the
    /// variant's source among: the executable's directory and its parents,
    /// the directory baked in at build time, then `cwd` and its parents.
    pub fn resolve_shader_dir(&self, cwd: &Path) -> anyhow::Result<PathBuf> {
        if let Some(dir) = &self.shader_dir {
            let dir = if dir.is_relative() {
                cwd.join(dir)
            } else {
                dir.clone()
            };
            let source = self.manifest().source;
            if !dir.join(source).is_file() {
                anyhow::bail!("{} not found in {}", source, dir.display());
            }
            return Ok(dir);
        }

        let mut roots = Vec::new();
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            roots.push(exe_dir);
        }
        if let Some(baked) = option_env!("SHADERPACK_DEFAULT_DIR") {
            roots.push(PathBuf::from(baked));
        }
        roots.push(cwd.to_path_buf());
        self.search_shader_dir(&roots)
    }

    /// Nearest ancestor (inclusive) of the first root that has the source.
    pub fn search_shader_dir(&self, roots: &[PathBuf]) -> anyhow::Result<PathBuf> {
        let source = self.manifest().source;
        roots
            .iter()
            .find_map(|root| root.ancestors().find(|dir| dir.join(source).is_file()))
            .map(Path::to_path_buf)
            .with_context(|| {
                let searched: Vec<_> = roots.iter().map(|r| r.display().to_string()).collect();
                format!(
                    "could not find {source} above {}; pass --shader-dir",
                    searched.join(", ")
                )
            })
    }
}

/// Make `dir` the working directory so every relative artifact path
/// (and every symbol derived from one) resolves against it.
pub fn enter_shader_dir(dir: &Path) -> anyhow::Result<PathBuf> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("resolving shader directory {}", dir.display()))?;
    std::env::set_current_dir(&dir)
        .with_context(|| format!("changing directory to {}", dir.display()))?;
    log::debug!("working directory is now {}", dir.display());
    Ok(dir)
}
