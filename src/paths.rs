/// Activation hook directory, relative to the environment root
pub const ACTIVATE_HOOKS_DIR: &str = "etc/conda/activate.d";

/// Deactivation hook directory, relative to the environment root
pub const DEACTIVATE_HOOKS_DIR: &str = "etc/conda/deactivate.d";

/// Profile file looked up in the current directory when no source is given
pub const DEFAULT_PROFILE_FILE: &str = "envstrap.yaml";

/// Package manager invoked unless overridden (mamba/micromamba are drop-ins)
pub const DEFAULT_CONDA_PROGRAM: &str = "conda";
