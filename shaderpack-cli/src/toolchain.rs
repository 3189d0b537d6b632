use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;

use crate::config::PackagerConfig;
use crate::manifest::Artifact;
use crate::state::{FailurePolicy, Flavor};

/// Define that makes the shared headers skip the Metal standard includes,
/// which the source header writes out by name instead.
pub const SOURCE_STRING_DEFINE: &str = "-DGENERATE_SOURCE_STRING";

/// Runs the external Metal toolchain from inside the shader directory.
pub struct Toolchain<'a> {
    config: &'a PackagerConfig,
    root: PathBuf,
}

impl<'a> Toolchain<'a> {
    pub fn new(config: &'a PackagerConfig, root: &Path) -> Self {
        Self {
            config,
            root: root.to_path_buf(),
        }
    }

    pub fn compile_args(&self, artifact: &Artifact, source: &str) -> Vec<String> {
        let target = artifact.target;
        let mut args = vec![
            "-sdk".to_string(),
            target.sdk().to_string(),
            "metal".to_string(),
            source.to_string(),
        ];
        if artifact.flavor == Flavor::Debug {
            args.push("-g".to_string());
        }
        if let Some(flag) = target.min_version_flag(&self.config.min_versions) {
            args.push(flag);
        }
        args.extend([
            "-c".to_string(),
            "-o".to_string(),
            artifact.air.display().to_string(),
        ]);
        args
    }

    pub fn link_args(&self, artifact: &Artifact) -> Vec<String> {
        vec![
            "-sdk".to_string(),
            artifact.target.sdk().to_string(),
            "metallib".to_string(),
            artifact.air.display().to_string(),
            "-o".to_string(),
            artifact.metallib.display().to_string(),
        ]
    }

    /// `.air` from the shader source. Returns whether the step succeeded.
    pub async fn compile(&self, artifact: &Artifact, source: &str) -> anyhow::Result<bool> {
        let args = self.compile_args(artifact, source);
        let step = format!("compiling {}", artifact.air.display());
        self.run_step(&step, &self.config.xcrun, &args).await
    }

    /// `.metallib` from the `.air`. Returns whether the step succeeded.
    pub async fn link(&self, artifact: &Artifact) -> anyhow::Result<bool> {
        let args = self.link_args(artifact);
        let step = format!("linking {}", artifact.metallib.display());
        self.run_step(&step, &self.config.xcrun, &args).await
    }

    /// Run `source` through the C preprocessor and capture the result.
    /// `None` when the preprocessor failed and failures are ignored.
    pub async fn preprocess(&self, source: &str) -> anyhow::Result<Option<String>> {
        let args = ["-xc++", "-E", SOURCE_STRING_DEFINE, source];
        let program = &self.config.cpp;
        log::debug!("$ {} {}", program.display(), args.join(" "));

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .await;

        let step = format!("preprocessing {source}");
        match output {
            Ok(out) if out.status.success() => {
                Ok(Some(String::from_utf8_lossy(&out.stdout).into_owned()))
            }
            Ok(out) => {
                self.on_failure(&step, program, &args.join(" "), out.status.code())?;
                Ok(None)
            }
            Err(e) => {
                self.on_spawn_error(&step, program, e)?;
                Ok(None)
            }
        }
    }

    async fn run_step(&self, step: &str, program: &Path, args: &[String]) -> anyhow::Result<bool> {
        log::debug!("$ {} {}", program.display(), args.join(" "));

        let status = Command::new(program)
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(true),
            Ok(status) => {
                self.on_failure(step, program, &args.join(" "), status.code())?;
                Ok(false)
            }
            Err(e) => {
                self.on_spawn_error(step, program, e)?;
                Ok(false)
            }
        }
    }

    fn on_failure(
        &self,
        step: &str,
        program: &Path,
        args: &str,
        code: Option<i32>,
    ) -> anyhow::Result<()> {
        let code = match code {
            Some(c) => c.to_string(),
            None => "signal".to_string(),
        };
        match self.config.policy {
            FailurePolicy::Abort => anyhow::bail!(
                "{step} failed (exit {code}): {} {args}",
                program.display()
            ),
            FailurePolicy::Ignore => {
                log::warn!("{step} failed (exit {code}), continuing");
                Ok(())
            }
        }
    }

    fn on_spawn_error(&self, step: &str, program: &Path, err: std::io::Error) -> anyhow::Result<()> {
        match self.config.policy {
            FailurePolicy::Abort => Err(err)
                .with_context(|| format!("{step}: failed to spawn {}", program.display())),
            FailurePolicy::Ignore => {
                log::warn!("{step}: failed to spawn {}: {err}", program.display());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;
    use crate::state::ShaderTarget;

    fn config(args: &[&str]) -> PackagerConfig {
        let mut argv = vec!["shaderpack"];
        argv.extend_from_slice(args);
        PackagerConfig::from_cli(&Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn mac_compile_passes_min_version() {
        let cfg = config(&["--macos-min", "11.0"]);
        let tc = Toolchain::new(&cfg, Path::new("."));
        let artifact = Artifact::new(ShaderTarget::MacOs, Flavor::Release);
        assert_eq!(
            tc.compile_args(&artifact, "master_source.metal").join(" "),
            "-sdk macosx metal master_source.metal -mmacosx-version-min=11.0 -c -o compiled/default.air"
        );
    }

    #[test]
    fn debug_flavor_adds_symbols_flag() {
        let cfg = config(&[]);
        let tc = Toolchain::new(&cfg, Path::new("."));
        let artifact = Artifact::new(ShaderTarget::MacOs, Flavor::Debug);
        let args = tc.compile_args(&artifact, "default.metal");
        assert!(args.contains(&"-g".to_string()));
        assert_eq!(args.last().unwrap(), "compiled/default.debug.air");
    }

    #[test]
    fn simulator_link_uses_simulator_sdk() {
        let cfg = config(&[]);
        let tc = Toolchain::new(&cfg, Path::new("."));
        let artifact = Artifact::new(ShaderTarget::IosSimulator, Flavor::Release);
        assert_eq!(
            tc.link_args(&artifact).join(" "),
            "-sdk iphonesimulator metallib compiled/default.ios_sim.air -o compiled/default.ios_sim.metallib"
        );
        assert!(!tc
            .compile_args(&artifact, "default.metal")
            .iter()
            .any(|a| a.contains("version-min")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_aborts_by_default() {
        let scratch = crate::testutil::ScratchDir::new("tc-abort");
        let tool = scratch.script("xcrun", "exit 3\n");
        let xcrun = tool.to_str().unwrap();
        let cfg = config(&["--xcrun", xcrun]);
        let tc = Toolchain::new(&cfg, scratch.path());
        let artifact = Artifact::new(ShaderTarget::IosDevice, Flavor::Release);

        let err = tc.compile(&artifact, "default.metal").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("compiling compiled/default.ios.air failed (exit 3)"), "{msg}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_is_tolerated_when_keeping_going() {
        let scratch = crate::testutil::ScratchDir::new("tc-ignore");
        let tool = scratch.script("xcrun", "exit 1\n");
        let xcrun = tool.to_str().unwrap();
        let cfg = config(&["--xcrun", xcrun, "--keep-going"]);
        let tc = Toolchain::new(&cfg, scratch.path());
        let artifact = Artifact::new(ShaderTarget::MacOs, Flavor::Release);

        assert!(!tc.link(&artifact).await.unwrap());
    }

    #[tokio::test]
    async fn missing_program_reports_spawn_failure() {
        let cfg = config(&["--xcrun", "/nonexistent/shaderpack-xcrun"]);
        let tc = Toolchain::new(&cfg, Path::new("/"));
        let artifact = Artifact::new(ShaderTarget::MacOs, Flavor::Release);
        let err = tc.link(&artifact).await.unwrap_err();
        assert!(format!("{err:#}").contains("failed to spawn /nonexistent/shaderpack-xcrun"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn preprocess_captures_stdout() {
        let scratch = crate::testutil::ScratchDir::new("tc-cpp");
        std::fs::write(scratch.path().join("master_source.metal"), "kernel void k();\n").unwrap();
        let cpp = scratch.script("cpp", "for last; do :; done\ncat \"$last\"\n");
        let cfg = config(&["--cpp", cpp.to_str().unwrap()]);
        let tc = Toolchain::new(&cfg, scratch.path());

        let text = tc.preprocess("master_source.metal").await.unwrap();
        assert_eq!(text.as_deref(), Some("kernel void k();\n"));
    }
}
