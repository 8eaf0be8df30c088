//! Command Specifications
//!
//! Describes how an external program is launched: either an already-built
//! executable invoked with no arguments, or a script handed to an interpreter.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Interpreter used when scripts are not run directly
pub const DEFAULT_INTERPRETER: &str = "python";

/// How to launch one of the three programs of a case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    /// Already-compiled executable, run with no arguments
    Executable(PathBuf),
    /// `{interpreter} {script}`
    Script {
        /// Interpreter program, e.g. `python` or `python3`
        interpreter: String,
        /// Script path passed as the only argument
        script: PathBuf,
    },
}

impl CommandSpec {
    /// Run `path` directly.
    pub fn executable(path: impl Into<PathBuf>) -> Self {
        CommandSpec::Executable(path.into())
    }

    /// Run `script` through `interpreter`.
    pub fn script(interpreter: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        CommandSpec::Script {
            interpreter: interpreter.into(),
            script: script.into(),
        }
    }

    /// Run `script` with `python`, or `python3` when requested.
    pub fn python(script: impl Into<PathBuf>, python3: bool) -> Self {
        let interpreter = if python3 { "python3" } else { DEFAULT_INTERPRETER };
        Self::script(interpreter, script)
    }

    /// Build the spec for a user-supplied path.
    pub fn resolve(path: impl Into<PathBuf>, exe: bool, interpreter: &str) -> Self {
        if exe {
            Self::executable(path)
        } else {
            Self::script(interpreter, path)
        }
    }

    /// Build a [`Command`] with no environment overrides, inheriting the cwd.
    pub fn to_command(&self) -> Command {
        match self {
            CommandSpec::Executable(path) => Command::new(local_program(path)),
            CommandSpec::Script {
                interpreter,
                script,
            } => {
                let mut command = Command::new(interpreter);
                command.arg(script);
                command
            }
        }
    }
}

/// A bare file name like `a.out` would otherwise be looked up on `PATH`.
fn local_program(path: &Path) -> PathBuf {
    let bare = path.components().count() == 1 && path.is_relative();
    if bare && path.is_file() {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandSpec::Executable(path) => write!(f, "{}", path.display()),
            CommandSpec::Script {
                interpreter,
                script,
            } => write!(f, "{} {}", interpreter, script.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_selects_interpreter() {
        assert_eq!(
            CommandSpec::python("sol.py", false),
            CommandSpec::script("python", "sol.py")
        );
        assert_eq!(
            CommandSpec::python("sol.py", true),
            CommandSpec::script("python3", "sol.py")
        );
    }

    #[test]
    fn test_resolve_exe_ignores_interpreter() {
        let spec = CommandSpec::resolve("./gen", true, "python3");
        assert_eq!(spec, CommandSpec::Executable(PathBuf::from("./gen")));
    }

    #[test]
    fn test_display() {
        assert_eq!(CommandSpec::script("python3", "brute.py").to_string(), "python3 brute.py");
        assert_eq!(CommandSpec::executable("bin/gen").to_string(), "bin/gen");
    }

    #[test]
    fn test_bare_name_of_local_file_runs_from_cwd() {
        // Unit tests run with the package root as cwd
        let command = CommandSpec::executable("Cargo.toml").to_command();
        assert_eq!(command.get_program(), Path::new(".").join("Cargo.toml").as_os_str());
    }

    #[test]
    fn test_bare_name_without_local_file_is_left_for_path_lookup() {
        let command = CommandSpec::executable("no-such-program-here").to_command();
        assert_eq!(command.get_program(), "no-such-program-here");
    }

    #[test]
    fn test_paths_with_directories_are_untouched() {
        let command = CommandSpec::executable("src/lib.rs").to_command();
        assert_eq!(command.get_program(), "src/lib.rs");
    }

    #[test]
    fn test_script_command_passes_script_as_only_arg() {
        let command = CommandSpec::script("sh", "gen.sh").to_command();
        assert_eq!(command.get_program(), "sh");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, vec!["gen.sh"]);
    }
}
