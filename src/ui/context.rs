//! UI context for detecting interactive vs CI environments

use std::io::IsTerminal;

/// Common CI environment indicators
const CI_VARS: [&str; 9] = [
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "TEAMCITY_VERSION",
    "TF_BUILD",
];

/// Output behaviour for one run
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Spinners and colours allowed
    interactive: bool,
    /// Print `[cwd] $ command` before each package manager invocation
    echo_commands: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(),
            echo_commands: true,
        }
    }

    /// Plain output, no spinners (for tests and explicit CI mode)
    pub fn non_interactive() -> Self {
        Self {
            interactive: false,
            echo_commands: true,
        }
    }

    pub fn with_echo_commands(mut self, echo: bool) -> Self {
        self.echo_commands = echo;
        self
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn echo_commands(&self) -> bool {
        self.echo_commands
    }

    /// Check if we should use fancy output (spinners, colors)
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    fn detect_interactive() -> bool {
        if !std::io::stdout().is_terminal() || !std::io::stderr().is_terminal() {
            return false;
        }
        !CI_VARS.iter().any(|var| std::env::var_os(var).is_some())
    }
}
