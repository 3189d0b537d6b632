use std::path::PathBuf;

use crate::state::{Flavor, ShaderTarget, Variant};

/// Directory (relative to the shader dir) holding compiled artifacts.
pub const COMPILED_DIR: &str = "compiled";

/// Symbol every platform branch of the binary header resolves to.
pub const UNIFIED_SYMBOL: &str = "compiled_default_metallib";

pub const SOURCE_SYMBOL: &str = "default_metallib_src";

const MASTER_INPUTS: &[&str] = &[
    "master_source.metal",
    "blit.metal",
    "clear.metal",
    "gen_indices.metal",
    "gen_mipmap.metal",
    "common.h",
    "constants.h",
];

/// Declared inputs, outputs and artifact layout for one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderManifest {
    pub variant: Variant,
    pub source: &'static str,
    pub inputs: Vec<&'static str>,
    pub binary_header: &'static str,
    pub source_header: &'static str,
}

impl ShaderManifest {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Legacy => Self {
                variant,
                source: "default.metal",
                inputs: vec!["default.metal"],
                binary_header: "compiled/mtl_default_shaders.inc",
                source_header: "mtl_default_shaders_src_autogen.inc",
            },
            Variant::Master => Self {
                variant,
                source: "master_source.metal",
                inputs: MASTER_INPUTS.to_vec(),
                binary_header: "compiled/mtl_default_shaders_autogen.inc",
                source_header: "mtl_default_shaders_src_autogen.inc",
            },
        }
    }

    pub fn outputs(&self) -> Vec<&'static str> {
        vec![self.binary_header, self.source_header]
    }

    /// Every (target, flavor) pair to build, in build order.
    pub fn artifacts(&self) -> Vec<Artifact> {
        let mut artifacts = Vec::new();
        for target in ShaderTarget::BUILD_ORDER {
            artifacts.push(Artifact::new(target, Flavor::Release));
            if target == ShaderTarget::MacOs && self.variant.has_debug_flavor() {
                artifacts.push(Artifact::new(target, Flavor::Debug));
            }
        }
        artifacts
    }
}

/// Paths of one compiled intermediate and its linked library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub target: ShaderTarget,
    pub flavor: Flavor,
    pub air: PathBuf,
    pub metallib: PathBuf,
}

impl Artifact {
    pub fn new(target: ShaderTarget, flavor: Flavor) -> Self {
        let stem = format!(
            "default{}{}",
            flavor.artifact_suffix(),
            target.artifact_suffix()
        );
        let dir = PathBuf::from(COMPILED_DIR);
        Self {
            target,
            flavor,
            air: dir.join(format!("{stem}.air")),
            metallib: dir.join(format!("{stem}.metallib")),
        }
    }

    /// Relative library path with forward slashes, as handed to `xxd -i`.
    pub fn metallib_display(&self) -> String {
        self.metallib
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
