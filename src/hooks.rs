use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Install the activation and deactivation hook scripts under the
/// environment root. Directories are created as needed; a same-named hook
/// already present at the destination is overwritten.
pub fn install_hooks(env_root: &Path, activate: &Path, deactivate: &Path) -> Result<()> {
    // The root comes from the activation query; a missing directory means
    // activation never happened and hooks would land in the wrong place.
    if !env_root.is_dir() {
        bail!(
            "Environment root {} does not exist, refusing to install hooks",
            env_root.display()
        );
    }

    let dst = install_hook(&env_root.join(paths::ACTIVATE_HOOKS_DIR), activate)?;
    println!("✓ Installed activation hook at {}", dst.display());

    let dst = install_hook(&env_root.join(paths::DEACTIVATE_HOOKS_DIR), deactivate)?;
    println!("✓ Installed deactivation hook at {}", dst.display());

    Ok(())
}

/// Copy one hook script into a hook directory, keeping its file name
fn install_hook(hooks_dir: &Path, src: &Path) -> Result<PathBuf> {
    fs::create_dir_all(hooks_dir)
        .with_context(|| format!("Failed to create hook directory {}", hooks_dir.display()))?;

    let name = src
        .file_name()
        .with_context(|| format!("Hook script path {} has no file name", src.display()))?;
    let dst = hooks_dir.join(name);

    fs::copy(src, &dst).with_context(|| {
        format!(
            "Failed to copy hook script {} to {}",
            src.display(),
            dst.display()
        )
    })?;

    // Hook scripts are sourced by the shell, but conda tolerates both;
    // mark executable to match the upstream layout
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&dst, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to set permissions on {}", dst.display()))?;
    }

    Ok(dst)
}
