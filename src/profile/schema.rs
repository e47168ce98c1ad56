use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Channels registered with the package manager, in order
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,

    /// Pinned dependency spec handed verbatim to the package manager,
    /// relative to the profile (or bundle root) unless absolute
    #[serde(default = "default_spec")]
    pub spec: String,

    #[serde(default)]
    pub hooks: HooksConfig,

    /// What to do when the environment already exists
    #[serde(default)]
    pub on_existing: ExistingPolicy,
}

fn default_channels() -> Vec<String> {
    vec!["conda-forge".into()]
}

fn default_spec() -> String {
    "requirements.txt".into()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            environment: EnvironmentConfig::default(),
            channels: default_channels(),
            spec: default_spec(),
            hooks: HooksConfig::default(),
            on_existing: ExistingPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default = "default_env_name")]
    pub name: String,
}

fn default_env_name() -> String {
    "dev".into()
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: default_env_name(),
        }
    }
}

/// Scripts copied into the environment's activate.d / deactivate.d
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HooksConfig {
    #[serde(default = "default_activate")]
    pub activate: String,

    #[serde(default = "default_deactivate")]
    pub deactivate: String,
}

fn default_activate() -> String {
    "hooks/activate.sh".into()
}

fn default_deactivate() -> String {
    "hooks/deactivate.sh".into()
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            activate: default_activate(),
            deactivate: default_deactivate(),
        }
    }
}

/// Policy when the named environment already exists:
/// `fail` hands the name collision to the package manager,
/// `repair` skips creation and proceeds to hook installation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingPolicy {
    #[default]
    Fail,
    Repair,
}
