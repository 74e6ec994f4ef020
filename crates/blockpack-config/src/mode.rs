//! Build mode detection.
//!
//! The mode is decided once from the invocation arguments and environment
//! and then threaded through every other resolution step.
//!
//! Precedence, highest first:
//!
//! 1. An explicit flag (`--production`, `--mode=production`,
//!    `BLOCKPACK_MODE=production`, or the development equivalents).
//!    Explicit production beats explicit development.
//! 2. A dev-server argument (anything containing `dev-server`, or exactly
//!    `dev` / `serve`) selects development.
//! 3. `NODE_ENV=production` selects production.
//! 4. Otherwise development.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Environment variable that overrides the mode explicitly.
pub const MODE_ENV_VAR: &str = "BLOCKPACK_MODE";

/// Environment variable consulted when no flag decides the mode.
pub const NODE_ENV_VAR: &str = "NODE_ENV";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Production,
    Development,
}

impl BuildMode {
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Development => "development",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which modes a declared path or plugin applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Applicability {
    Production,
    Development,
    Both,
}

impl Applicability {
    pub fn applies_to(self, mode: BuildMode) -> bool {
        match self {
            Self::Both => true,
            Self::Production => mode == BuildMode::Production,
            Self::Development => mode == BuildMode::Development,
        }
    }
}

impl From<BuildMode> for Applicability {
    fn from(mode: BuildMode) -> Self {
        match mode {
            BuildMode::Production => Self::Production,
            BuildMode::Development => Self::Development,
        }
    }
}

/// Why a mode was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeReason {
    ExplicitFlag,
    /// An explicit production flag overrode a dev-server argument.
    ExplicitFlagOverDevServer,
    DevServerArgument,
    NodeEnv,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDecision {
    pub mode: BuildMode,
    pub reason: ModeReason,
}

#[derive(Debug, Default)]
struct ModeSignals {
    explicit_production: bool,
    explicit_development: bool,
    dev_server: bool,
}

impl ModeSignals {
    fn collect<S: AsRef<str>>(argv: &[S], env: &HashMap<String, String>) -> Self {
        let mut signals = Self::default();

        let mut args = argv.iter().map(|a| AsRef::<str>::as_ref(a)).peekable();
        while let Some(arg) = args.next() {
            match arg {
                "--production" | "--mode=production" => signals.explicit_production = true,
                "--development" | "--mode=development" => signals.explicit_development = true,
                "--mode" => match args.peek().copied() {
                    Some("production") => signals.explicit_production = true,
                    Some("development") => signals.explicit_development = true,
                    _ => {}
                },
                "dev" | "serve" => signals.dev_server = true,
                other if other.contains("dev-server") => signals.dev_server = true,
                _ => {}
            }
        }

        match env.get(MODE_ENV_VAR).map(|v| v.trim()) {
            Some("production") => signals.explicit_production = true,
            Some("development") => signals.explicit_development = true,
            Some(other) if !other.is_empty() => {
                warn!("ignoring unrecognised {MODE_ENV_VAR} value '{other}'");
            }
            _ => {}
        }

        signals
    }
}

/// Decide the build mode and report which signal decided it.
pub fn decide_mode<S: AsRef<str>>(argv: &[S], env: &HashMap<String, String>) -> ModeDecision {
    let signals = ModeSignals::collect(argv, env);

    let decision = if signals.explicit_production {
        if signals.dev_server {
            warn!("explicit production flag overrides dev-server invocation");
            ModeDecision {
                mode: BuildMode::Production,
                reason: ModeReason::ExplicitFlagOverDevServer,
            }
        } else {
            if signals.explicit_development {
                warn!("both production and development requested; production wins");
            }
            ModeDecision {
                mode: BuildMode::Production,
                reason: ModeReason::ExplicitFlag,
            }
        }
    } else if signals.explicit_development {
        ModeDecision {
            mode: BuildMode::Development,
            reason: ModeReason::ExplicitFlag,
        }
    } else if signals.dev_server {
        ModeDecision {
            mode: BuildMode::Development,
            reason: ModeReason::DevServerArgument,
        }
    } else if env.get(NODE_ENV_VAR).map(String::as_str) == Some("production") {
        ModeDecision {
            mode: BuildMode::Production,
            reason: ModeReason::NodeEnv,
        }
    } else {
        ModeDecision {
            mode: BuildMode::Development,
            reason: ModeReason::Default,
        }
    };

    debug!(mode = %decision.mode, reason = ?decision.reason, "build mode decided");
    decision
}

/// Decide production vs. development from `argv` and `env` alone.
pub fn detect_mode<S: AsRef<str>>(argv: &[S], env: &HashMap<String, String>) -> BuildMode {
    decide_mode(argv, env).mode
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn no_signals_is_development() {
        let decision = decide_mode::<&str>(&[], &env(&[]));
        assert_eq!(decision.mode, BuildMode::Development);
        assert_eq!(decision.reason, ModeReason::Default);
    }

    #[test]
    fn node_env_production_is_production() {
        let decision = decide_mode(&["blockpack", "build"], &env(&[("NODE_ENV", "production")]));
        assert_eq!(decision.mode, BuildMode::Production);
        assert_eq!(decision.reason, ModeReason::NodeEnv);
    }

    #[test]
    fn dev_server_argument_beats_node_env() {
        let argv = ["node", "node_modules/.bin/webpack-dev-server"];
        let mode = detect_mode(&argv, &env(&[("NODE_ENV", "production")]));
        assert_eq!(mode, BuildMode::Development);
    }

    #[test]
    fn explicit_flag_beats_dev_server() {
        let decision = decide_mode(&["blockpack", "dev", "--production"], &env(&[]));
        assert_eq!(decision.mode, BuildMode::Production);
        assert_eq!(decision.reason, ModeReason::ExplicitFlagOverDevServer);
    }

    #[test]
    fn split_mode_flag_is_recognised() {
        let mode = detect_mode(&["blockpack", "build", "--mode", "production"], &env(&[]));
        assert_eq!(mode, BuildMode::Production);
    }

    #[test]
    fn mode_env_override_counts_as_explicit() {
        let mode = detect_mode(
            &["blockpack", "build"],
            &env(&[("BLOCKPACK_MODE", "development"), ("NODE_ENV", "production")]),
        );
        assert_eq!(mode, BuildMode::Development);
    }

    #[test]
    fn explicit_production_beats_explicit_development() {
        let mode = detect_mode(&["--development"], &env(&[("BLOCKPACK_MODE", "production")]));
        assert_eq!(mode, BuildMode::Production);
    }

    #[test]
    fn unknown_mode_override_is_ignored() {
        let mode = detect_mode(&["build"], &env(&[("BLOCKPACK_MODE", "staging")]));
        assert_eq!(mode, BuildMode::Development);
    }

    #[test]
    fn applicability_filters_modes() {
        assert!(Applicability::Both.applies_to(BuildMode::Production));
        assert!(Applicability::Development.applies_to(BuildMode::Development));
        assert!(!Applicability::Development.applies_to(BuildMode::Production));
        assert_eq!(Applicability::from(BuildMode::Production), Applicability::Production);
    }

    #[test]
    fn display_matches_serde() {
        assert_eq!(BuildMode::Production.to_string(), "production");
        assert_eq!(
            serde_json::to_string(&BuildMode::Development).unwrap(),
            "\"development\""
        );
    }
}
