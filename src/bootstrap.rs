use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::conda::Conda;
use crate::hooks;
use crate::profile::{ExistingPolicy, Profile, ProfileBundle};

/// Runs the bootstrap pipeline: probe the package manager, register
/// channels, create the environment, resolve its root, install hooks.
/// Strictly sequential; the first failing step aborts the rest and leaves
/// whatever partial state the package manager produced.
pub struct Bootstrapper {
    profile: Profile,
    files_dir: Option<PathBuf>,
    conda: Conda,
}

impl Bootstrapper {
    pub fn new(bundle: ProfileBundle) -> Self {
        Self {
            profile: bundle.profile,
            files_dir: bundle.files_dir,
            conda: Conda::new(),
        }
    }

    pub fn with_conda(mut self, conda: Conda) -> Self {
        self.conda = conda;
        self
    }

    pub fn run(&self) -> Result<()> {
        let name = &self.profile.environment.name;

        println!("\n=== envstrap ===\n");
        println!("Bootstrapping environment '{}'...\n", name);

        self.conda.ensure_available()?;

        self.register_channels()?;
        let created = self.create_environment()?;
        let root = self.activate()?;
        self.install_hooks(&root)?;

        println!("\n=== Bootstrap Complete ===\n");
        if !created {
            println!("Environment existed; hooks were repaired.");
        }
        println!("Activate with: {} activate {}\n", self.conda.program(), name);

        Ok(())
    }

    fn register_channels(&self) -> Result<()> {
        for channel in &self.profile.channels {
            self.conda.add_channel(channel)?;
            println!("✓ Registered channel: {}", channel);
        }
        Ok(())
    }

    /// Returns false when creation was skipped under the repair policy
    fn create_environment(&self) -> Result<bool> {
        let name = &self.profile.environment.name;

        let spec = self.resolve(&self.profile.spec);
        if !spec.is_file() {
            bail!(
                "Dependency spec {} does not exist, cannot create environment '{}'",
                spec.display(),
                name
            );
        }

        if self.profile.on_existing == ExistingPolicy::Repair && self.conda.env_exists(name)? {
            println!("Environment '{}' already exists, skipping creation", name);
            return Ok(false);
        }

        self.conda.create_env(name, &spec)?;
        println!("✓ Created environment: {}", name);

        Ok(true)
    }

    /// The activation step. A child process cannot mutate its parent shell,
    /// so activation here means resolving the environment root and passing
    /// it forward explicitly.
    fn activate(&self) -> Result<PathBuf> {
        let name = &self.profile.environment.name;
        let root = self
            .conda
            .env_root(name)
            .with_context(|| format!("Failed to resolve root of environment '{}'", name))?;
        println!("✓ Environment root: {}", root.display());
        Ok(root)
    }

    fn install_hooks(&self, root: &Path) -> Result<()> {
        let activate = self.resolve(&self.profile.hooks.activate);
        let deactivate = self.resolve(&self.profile.hooks.deactivate);
        hooks::install_hooks(root, &activate, &deactivate)
    }

    /// Profile paths resolve against the bundle/profile directory when one
    /// exists, else against the current directory
    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.files_dir {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        }
    }
}
