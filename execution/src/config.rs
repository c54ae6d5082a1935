use crate::casino::{
    bones::BonesSetup,
    cases::LootTable,
    doors::DoorsRules,
    selector::PoolError,
};
use arcade_types::casino::{Case, DOORS_INITIAL, MAX_HANDS};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, str::FromStr};
use thiserror::Error;
use tracing::Level;

/// Table configuration, as read from YAML.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub bones: BonesConfig,
    #[serde(default)]
    pub doors: DoorsConfig,
    #[serde(default)]
    pub blackjack: BlackjackConfig,
    #[serde(default)]
    pub cases: Vec<Case>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BonesConfig {
    #[serde(default = "default_traps")]
    pub default_traps: u8,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DoorsConfig {
    #[serde(default = "default_initial_doors")]
    pub initial_doors: u8,
    #[serde(default = "default_max_depth")]
    pub max_depth: u8,
    /// Payout (in chips) at which a run cashes out on its own.
    #[serde(default)]
    pub payout_cap: Option<u64>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BlackjackConfig {
    #[serde(default = "default_max_hands")]
    pub max_hands: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_traps() -> u8 {
    3
}

fn default_initial_doors() -> u8 {
    DOORS_INITIAL
}

fn default_max_depth() -> u8 {
    DOORS_INITIAL - 1
}

fn default_max_hands() -> usize {
    MAX_HANDS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            bones: BonesConfig::default(),
            doors: DoorsConfig::default(),
            blackjack: BlackjackConfig::default(),
            cases: Vec::new(),
        }
    }
}

impl Default for BonesConfig {
    fn default() -> Self {
        Self {
            default_traps: default_traps(),
        }
    }
}

impl Default for DoorsConfig {
    fn default() -> Self {
        Self {
            initial_doors: default_initial_doors(),
            max_depth: default_max_depth(),
            payout_cap: None,
        }
    }
}

impl Default for BlackjackConfig {
    fn default() -> Self {
        Self {
            max_hands: default_max_hands(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("bones trap count must be 1-24 (got {value})")]
    InvalidTrapCount { value: u8 },
    #[error("invalid door setup: {initial_doors} doors, depth {max_depth}, cap {payout_cap:?}")]
    InvalidDoors {
        initial_doors: u8,
        max_depth: u8,
        payout_cap: Option<u64>,
    },
    #[error("max_hands out of range (got {value})")]
    InvalidMaxHands { value: usize },
    #[error("case {id} has an invalid item pool")]
    InvalidPool {
        id: u32,
        #[source]
        source: PoolError,
    },
    #[error("case {id} is defined twice")]
    DuplicateCase { id: u32 },
}

/// Configuration with every pool and rule checked.
#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    pub log_level: Level,
    pub bones: BonesSetup,
    pub doors: DoorsRules,
    pub max_hands: usize,
    pub cases: BTreeMap<u32, LootTable>,
}

impl Config {
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        let bones = BonesSetup::new(self.bones.default_traps).map_err(|_| {
            ConfigError::InvalidTrapCount {
                value: self.bones.default_traps,
            }
        })?;

        let doors = DoorsRules::new(
            self.doors.initial_doors,
            self.doors.max_depth,
            self.doors.payout_cap,
        )
        .map_err(|_| ConfigError::InvalidDoors {
            initial_doors: self.doors.initial_doors,
            max_depth: self.doors.max_depth,
            payout_cap: self.doors.payout_cap,
        })?;

        if !(1..=MAX_HANDS).contains(&self.blackjack.max_hands) {
            return Err(ConfigError::InvalidMaxHands {
                value: self.blackjack.max_hands,
            });
        }

        let mut cases = BTreeMap::new();
        for case in self.cases {
            let id = case.id;
            let table =
                LootTable::new(case).map_err(|source| ConfigError::InvalidPool { id, source })?;
            if cases.insert(id, table).is_some() {
                return Err(ConfigError::DuplicateCase { id });
            }
        }

        Ok(ValidatedConfig {
            log_level,
            bones,
            doors,
            max_hands: self.blackjack.max_hands,
            cases,
        })
    }
}

impl ValidatedConfig {
    pub fn case(&self, id: u32) -> Option<&LootTable> {
        self.cases.get(&id)
    }
}

impl Default for ValidatedConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            bones: BonesSetup::default(),
            doors: DoorsRules::default(),
            max_hands: MAX_HANDS,
            cases: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
log_level: debug
bones:
  default_traps: 5
doors:
  initial_doors: 8
  max_depth: 6
  payout_cap: 50000
blackjack:
  max_hands: 3
cases:
  - id: 1
    name: starter
    price: 100
    items:
      - { id: 10, name: sticker, price: 20, odds: 80 }
      - { id: 11, name: knife, price: 300, odds: 20 }
"#;

    #[test]
    fn test_parse_and_validate() {
        let config = Config::from_yaml(SAMPLE).unwrap().validate().unwrap();
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.bones.trap_count(), 5);
        assert_eq!(config.doors.initial_doors(), 8);
        assert_eq!(config.doors.max_depth(), 6);
        assert_eq!(config.doors.payout_cap(), Some(50_000));
        assert_eq!(config.max_hands, 3);
        let case = config.case(1).unwrap();
        assert_eq!(case.price(), 100);
        assert_eq!(case.pool().len(), 2);
        assert!(config.case(2).is_none());
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("{}").unwrap().validate().unwrap();
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.bones.trap_count(), 3);
        assert_eq!(config.doors.initial_doors(), 10);
        assert_eq!(config.doors.max_depth(), 9);
        assert_eq!(config.doors.payout_cap(), None);
        assert_eq!(config.max_hands, 4);
        assert!(config.cases.is_empty());
    }

    #[test]
    fn test_rejects_bad_odds() {
        let yaml = SAMPLE.replace("odds: 20", "odds: 15");
        let err = Config::from_yaml(&yaml).unwrap().validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPool {
                id: 1,
                source: PoolError::BadTotal { .. }
            }
        ));
    }

    #[test]
    fn test_rejects_negative_odds() {
        let yaml = SAMPLE
            .replace("odds: 80", "odds: 120")
            .replace("odds: 20", "odds: -20");
        let err = Config::from_yaml(&yaml).unwrap().validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPool {
                source: PoolError::InvalidWeight { index: 1, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_bad_rules() {
        let mut config = Config::default();
        config.log_level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogLevel { .. })
        ));

        let mut config = Config::default();
        config.bones.default_traps = 25;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTrapCount { value: 25 })
        ));

        let mut config = Config::default();
        config.doors.initial_doors = 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDoors { .. })
        ));

        let mut config = Config::default();
        config.doors.max_depth = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.blackjack.max_hands = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMaxHands { value: 0 })
        ));
    }

    #[test]
    fn test_rejects_duplicate_case() {
        let mut config = Config::from_yaml(SAMPLE).unwrap();
        config.cases.push(config.cases[0].clone());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateCase { id: 1 })
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            Config::from_yaml("doors: [1, 2"),
            Err(ConfigError::Parse(_))
        ));
    }
}
