//! Runs an external STL generator as a blocking subprocess.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::{LaunchError, Result};

/// Output captured from a successful generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutput {
    /// Everything the generator printed on stdout.
    pub stdout: String,
    /// Everything the generator printed on stderr.
    pub stderr: String,
}

/// An external program that turns text into an STL file.
///
/// The command line is `program leading_args… -- text font [glyph_count]`.
/// A missing font is passed as an empty argument when a glyph count follows
/// and left out otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalGenerator {
    program: OsString,
    leading_args: Vec<OsString>,
}

impl ExternalGenerator {
    /// Creates a generator running `program` with the given leading arguments.
    #[must_use]
    pub fn new<I, S>(program: impl Into<OsString>, leading_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            leading_args: leading_args.into_iter().map(Into::into).collect(),
        }
    }

    /// A headless Blender session running `script`.
    #[must_use]
    pub fn blender(script: impl Into<PathBuf>) -> Self {
        let script: PathBuf = script.into();
        Self::new(
            "blender",
            [
                OsString::from("--background"),
                OsString::from("--python"),
                script.into_os_string(),
            ],
        )
    }

    /// The full argument list passed after the program name.
    #[must_use]
    pub fn arguments(&self, text: &str, font: Option<&Path>, glyph_count: Option<usize>) -> Vec<OsString> {
        let mut args = self.leading_args.clone();
        args.push("--".into());
        args.push(text.into());
        match (font, glyph_count) {
            (Some(font), _) => args.push(font.as_os_str().to_owned()),
            (None, Some(_)) => args.push(OsString::new()),
            (None, None) => {}
        }
        if let Some(count) = glyph_count {
            args.push(count.to_string().into());
        }
        args
    }

    /// Runs the generator and waits for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Spawn`] if the program cannot be started and
    /// [`LaunchError::Failed`] with the captured output if it exits
    /// unsuccessfully.
    pub fn execute(&self, text: &str, font: Option<&Path>, glyph_count: Option<usize>) -> Result<LaunchOutput> {
        let program = self.program.to_string_lossy().into_owned();
        let args = self.arguments(text, font, glyph_count);
        debug!(%program, ?args, "starting generator");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| LaunchError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(LaunchError::Failed {
                program,
                status: output.status.to_string(),
                code: output.status.code(),
                stdout,
                stderr,
            }
            .into());
        }
        info!(%program, "generator finished");
        Ok(LaunchOutput { stdout, stderr })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::HollowTextError;

    #[test]
    fn arguments_follow_separator() {
        let generator = ExternalGenerator::blender("gen.py");
        let args = generator.arguments("Hi", Some(Path::new("a.ttf")), Some(2));
        let expected: Vec<OsString> = ["--background", "--python", "gen.py", "--", "Hi", "a.ttf", "2"]
            .into_iter()
            .map(OsString::from)
            .collect();
        assert_eq!(args, expected);
    }

    #[test]
    fn missing_font_keeps_positions() {
        let generator = ExternalGenerator::new("gen", Vec::<OsString>::new());
        assert_eq!(generator.arguments("A", None, None), vec![OsString::from("--"), "A".into()]);
        assert_eq!(
            generator.arguments("A", None, Some(1)),
            vec![OsString::from("--"), "A".into(), OsString::new(), "1".into()]
        );
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_on_success() {
        // `sh -c script name args...` binds "--" to $0.
        let generator = ExternalGenerator::new("sh", ["-c", "echo \"$1\""]);
        let out = generator.execute("hello", None, None).unwrap();
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_carries_output() {
        let generator = ExternalGenerator::new("sh", ["-c", "echo boom >&2; exit 3"]);
        let err = generator.execute("x", None, None).unwrap_err();
        match err {
            HollowTextError::Launch(LaunchError::Failed { code, stderr, .. }) => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let generator = ExternalGenerator::new("hollowtext-no-such-program", Vec::<OsString>::new());
        let err = generator.execute("x", None, None).unwrap_err();
        assert!(matches!(err, HollowTextError::Launch(LaunchError::Spawn { .. })));
    }
}
