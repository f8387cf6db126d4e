use crate::ConfigError;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// An ActivationType represents the activation
/// function following a gene's linear layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActivationType {
    // max(0, x)
    ReLU,
    // x if x > 0, 0.01x otherwise
    LeakyReLU,
    // 1 / (1 + exp(-x))
    Sigmoid,
    // tanh(x)
    Tanh,
    /// Only reachable through mutation; networks
    /// cannot be built with softmax hidden layers.
    Softmax,
}

impl ActivationType {
    pub const ALL: [ActivationType; 5] = [
        ActivationType::ReLU,
        ActivationType::LeakyReLU,
        ActivationType::Sigmoid,
        ActivationType::Tanh,
        ActivationType::Softmax,
    ];

    /// Returns the activation's configuration name.
    ///
    /// # Examples
    /// ```
    /// use oxinas_nn::genomics::ActivationType;
    ///
    /// assert_eq!(ActivationType::LeakyReLU.name(), "leaky_relu");
    /// assert_eq!("leaky_relu".parse(), Ok(ActivationType::LeakyReLU));
    /// assert!("swish".parse::<ActivationType>().is_err());
    /// ```
    pub fn name(self) -> &'static str {
        match self {
            ActivationType::ReLU => "relu",
            ActivationType::LeakyReLU => "leaky_relu",
            ActivationType::Sigmoid => "sigmoid",
            ActivationType::Tanh => "tanh",
            ActivationType::Softmax => "softmax",
        }
    }

    /// Returns whether hidden layers can use this activation.
    pub fn is_buildable(self) -> bool {
        self != ActivationType::Softmax
    }
}

type LookupTable = HashMap<&'static str, ActivationType, RandomState>;

fn lookup_table() -> &'static LookupTable {
    static TABLE: OnceLock<LookupTable> = OnceLock::new();
    TABLE.get_or_init(|| ActivationType::ALL.iter().map(|a| (a.name(), *a)).collect())
}

impl FromStr for ActivationType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<ActivationType, ConfigError> {
        lookup_table()
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| ConfigError::UnknownActivation(s.to_string()))
    }
}

impl TryFrom<String> for ActivationType {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<ActivationType, ConfigError> {
        s.parse()
    }
}

impl From<ActivationType> for String {
    fn from(activation: ActivationType) -> String {
        activation.name().to_string()
    }
}

impl fmt::Display for ActivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
