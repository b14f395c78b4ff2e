// ABOUTME: Deployment target names.
// ABOUTME: A closed set of environments, each with its own config record and strategy.

use std::fmt;
use std::str::FromStr;

use crate::deploy::DeployError;

/// A named deployment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Environment {
    Local,
    Docker,
    Kubernetes,
    Github,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Local,
        Environment::Docker,
        Environment::Kubernetes,
        Environment::Github,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Docker => "docker",
            Environment::Kubernetes => "kubernetes",
            Environment::Github => "github",
        }
    }
}

impl FromStr for Environment {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| DeployError::unknown_environment(s))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
