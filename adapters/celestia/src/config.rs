use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::share_commit::subtree_width;

/// The number of subtree roots above which the subtree width starts to grow
pub const DEFAULT_SUBTREE_ROOT_THRESHOLD: usize = 64;
/// The largest data square width a block may use
pub const DEFAULT_MAX_SQUARE_SIZE: usize = 128;

fn default_subtree_root_threshold() -> usize {
    DEFAULT_SUBTREE_ROOT_THRESHOLD
}

fn default_max_square_size() -> usize {
    DEFAULT_MAX_SQUARE_SIZE
}

/// Parameters of the commitment scheme that depend on chain configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlobConfig {
    /// Subtree width is only increased once the number of subtree roots would exceed this value.
    #[serde(default = "default_subtree_root_threshold")]
    pub subtree_root_threshold: usize,
    /// Upper bound on the subtree width. Must be a power of two.
    #[serde(default = "default_max_square_size")]
    pub max_square_size: usize,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            subtree_root_threshold: DEFAULT_SUBTREE_ROOT_THRESHOLD,
            max_square_size: DEFAULT_MAX_SQUARE_SIZE,
        }
    }
}

impl BlobConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.subtree_root_threshold == 0 {
            anyhow::bail!("subtree_root_threshold must be greater than zero");
        }
        if !self.max_square_size.is_power_of_two() {
            anyhow::bail!(
                "max_square_size must be a power of two, got {}",
                self.max_square_size
            );
        }
        Ok(())
    }

    /// The maximum subtree width used to commit to a blob of `share_count` shares.
    pub fn subtree_width(&self, share_count: usize) -> usize {
        subtree_width(share_count, self.subtree_root_threshold).min(self.max_square_size)
    }

    /// Reads and validates a config from a TOML file.
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let config: Self = from_toml_path(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Reads a TOML file into any deserializable type.
pub fn from_toml_path<P: AsRef<Path>, R: DeserializeOwned>(path: P) -> anyhow::Result<R> {
    let mut contents = String::new();
    {
        let mut file = File::open(path)?;
        file.read_to_string(&mut contents)?;
    }

    let result: R = toml::from_str(&contents)?;

    Ok(result)
}
