use std::path::PathBuf;

use clap::Parser;

use crate::state::Variant;

#[derive(Parser, Debug)]
#[command(
    name = "shaderpack",
    about = "Compile the default Metal shaders and package them as C++ headers",
    version
)]
pub struct Cli {
    /// Dependency query for the host build system: `inputs` or `outputs`.
    /// Without it the full generation pipeline runs.
    pub query: Option<String>,

    /// Which shader source layout to package
    #[arg(long, value_enum, default_value = "master", env = "SHADERPACK_VARIANT")]
    pub variant: Variant,

    /// Directory holding the shader sources. Discovered from the current
    /// directory upwards when omitted.
    #[arg(long, env = "SHADERPACK_DIR")]
    pub shader_dir: Option<PathBuf>,

    /// `xcrun` executable used for `metal` and `metallib`
    #[arg(long, default_value = "xcrun", env = "SHADERPACK_XCRUN")]
    pub xcrun: PathBuf,

    /// C preprocessor used to flatten the master source
    #[arg(long, default_value = "clang", env = "SHADERPACK_CPP")]
    pub cpp: PathBuf,

    /// Minimum macOS version passed to the compiler
    #[arg(long, default_value = "10.13")]
    pub macos_min: String,

    /// Minimum iOS version passed to the compiler
    #[arg(long, default_value = "8.0")]
    pub ios_min: String,

    /// Embed the master source as-is instead of running the preprocessor
    #[arg(long)]
    pub no_preprocess: bool,

    /// Continue past failing tool invocations
    #[arg(long)]
    pub keep_going: bool,

    /// Delete `.air` intermediates once linked
    #[arg(long)]
    pub clean_intermediates: bool,

    /// Report whether the required tools are installed, then exit
    #[arg(long)]
    pub check_tools: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
