mod schema;

pub use schema::*;

use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::paths;

/// A loaded profile plus the directory its relative paths resolve against
/// (profile file's parent, or the extracted bundle root)
#[derive(Debug)]
pub struct ProfileBundle {
    pub profile: Profile,
    pub files_dir: Option<PathBuf>,
}

/// Input source for profile loading
#[derive(Debug, Clone)]
pub enum ProfileSource {
    File(PathBuf),
    Url(String),
    Stdin,
    /// No argument given: `envstrap.yaml` in the current directory if
    /// present, else built-in defaults
    Default,
}

impl ProfileSource {
    /// Parse from command line argument
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => Self::Default,
            Some("-") => Self::Stdin,
            Some(s) if s.starts_with("http://") || s.starts_with("https://") => {
                Self::Url(s.to_string())
            }
            Some(s) => Self::File(PathBuf::from(s)),
        }
    }
}

/// Load a profile from any supported source
pub fn load(source: &ProfileSource) -> Result<ProfileBundle> {
    match source {
        ProfileSource::File(path) => load_from_file(path),
        ProfileSource::Url(url) => load_from_url(url),
        ProfileSource::Stdin => load_from_stdin(),
        ProfileSource::Default => {
            let local = Path::new(paths::DEFAULT_PROFILE_FILE);
            if local.is_file() {
                load_from_file(local)
            } else {
                Ok(ProfileBundle {
                    profile: Profile::default(),
                    files_dir: None,
                })
            }
        }
    }
}

/// Load from a file: YAML, JSON, or a tar bundle carrying the profile
/// alongside the spec and hook scripts it references
fn load_from_file(path: &Path) -> Result<ProfileBundle> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match extension {
        "tar" | "tgz" => load_from_tar_file(path),
        "gz" if is_tar_gz(path) => load_from_tar_file(path),
        _ => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read profile: {}", path.display()))?;
            let profile = parse_auto(&content)?;
            Ok(ProfileBundle {
                profile,
                files_dir: path.parent().map(|p| p.to_path_buf()),
            })
        }
    }
}

/// Extract a tar bundle to a temp directory and load the profile from it
fn load_from_tar_file(path: &Path) -> Result<ProfileBundle> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open bundle: {}", path.display()))?;

    let is_gzip = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "tgz" || e == "gz")
        .unwrap_or(false);

    let extract_dir = tempfile::tempdir().context("Failed to create temp directory")?;
    let extract_path = extract_dir.path().to_path_buf();

    unpack_tar(file, is_gzip, &extract_path)?;

    let profile_path = find_profile_in_dir(&extract_path)?;
    let content = fs::read_to_string(&profile_path).with_context(|| {
        format!(
            "Failed to read profile from bundle: {}",
            profile_path.display()
        )
    })?;
    let profile = parse_auto(&content)?;

    // Keep the temp dir alive so spec/hook paths stay resolvable
    let files_dir = extract_dir.keep();

    Ok(ProfileBundle {
        profile,
        files_dir: Some(files_dir),
    })
}

/// Only `.tar.gz` is a bundle; a bare `.gz` profile is not supported and
/// falls through to plain-text loading
fn is_tar_gz(path: &Path) -> bool {
    path.file_stem()
        .map(|stem| Path::new(stem).extension() == Some("tar".as_ref()))
        .unwrap_or(false)
}

fn unpack_tar(file: File, is_gzip: bool, dest: &Path) -> Result<()> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    if is_gzip {
        let decoder = GzDecoder::new(file);
        let mut archive = Archive::new(decoder);
        archive.unpack(dest).context("Failed to extract tar.gz bundle")
    } else {
        let mut archive = Archive::new(file);
        archive.unpack(dest).context("Failed to extract tar bundle")
    }
}

/// Find envstrap.yaml / envstrap.yml / envstrap.json in a directory
fn find_profile_in_dir(dir: &Path) -> Result<PathBuf> {
    for candidate in ["envstrap.yaml", "envstrap.yml", "envstrap.json"] {
        let path = dir.join(candidate);
        if path.exists() {
            return Ok(path);
        }
    }

    bail!(
        "No profile found in bundle root. \
         Expected one of: envstrap.yaml, envstrap.yml, envstrap.json"
    );
}

/// Load from URL (YAML, JSON, or tar bundle)
fn load_from_url(url: &str) -> Result<ProfileBundle> {
    let response = ureq::get(url)
        .call()
        .with_context(|| format!("Failed to fetch profile from URL: {}", url))?;

    let content_type = response.header("content-type").unwrap_or("").to_lowercase();

    let is_tar = content_type.contains("application/x-tar")
        || content_type.contains("application/gzip")
        || url.ends_with(".tar")
        || url.ends_with(".tgz")
        || url.ends_with(".tar.gz");

    if is_tar {
        load_tar_from_url(url, response)
    } else {
        let content = response
            .into_string()
            .context("Failed to read response body")?;
        let profile = parse_auto(&content)?;
        Ok(ProfileBundle {
            profile,
            files_dir: None,
        })
    }
}

fn load_tar_from_url(url: &str, response: ureq::Response) -> Result<ProfileBundle> {
    let is_gzip = url.ends_with(".tgz") || url.ends_with(".tar.gz");

    let mut temp_file = tempfile::NamedTempFile::new().context("Failed to create temp file")?;
    let mut reader = response.into_reader();
    io::copy(&mut reader, &mut temp_file).context("Failed to download bundle")?;

    let file = File::open(temp_file.path()).context("Failed to open downloaded bundle")?;

    let extract_dir = tempfile::tempdir().context("Failed to create temp directory")?;
    let extract_path = extract_dir.path().to_path_buf();

    unpack_tar(file, is_gzip, &extract_path)?;

    let profile_path = find_profile_in_dir(&extract_path)?;
    let content = fs::read_to_string(&profile_path).with_context(|| {
        format!(
            "Failed to read profile from bundle: {}",
            profile_path.display()
        )
    })?;
    let profile = parse_auto(&content)?;

    let files_dir = extract_dir.keep();

    Ok(ProfileBundle {
        profile,
        files_dir: Some(files_dir),
    })
}

/// Load from stdin
fn load_from_stdin() -> Result<ProfileBundle> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read profile from stdin")?;

    let profile = parse_auto(&content)?;
    Ok(ProfileBundle {
        profile,
        files_dir: None,
    })
}

fn parse_yaml(content: &str) -> Result<Profile> {
    serde_yaml::from_str(content).context("Failed to parse YAML profile")
}

fn parse_json(content: &str) -> Result<Profile> {
    serde_json::from_str(content).context("Failed to parse JSON profile")
}

/// Auto-detect format and parse
fn parse_auto(content: &str) -> Result<Profile> {
    let trimmed = content.trim();

    // JSON starts with { or [
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        parse_json(content)
    } else {
        // Assume YAML (which is a superset of JSON anyway)
        parse_yaml(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_profile() {
        let yaml = r#"
environment:
  name: pybot
"#;
        let profile = parse_yaml(yaml).unwrap();
        assert_eq!(profile.environment.name, "pybot");
        assert_eq!(profile.channels, vec!["conda-forge".to_string()]);
        assert_eq!(profile.spec, "requirements.txt");
        assert_eq!(profile.on_existing, ExistingPolicy::Fail);
    }

    #[test]
    fn minimal_json_profile() {
        let json = r#"{"environment": {"name": "pybot"}}"#;
        let profile = parse_json(json).unwrap();
        assert_eq!(profile.environment.name, "pybot");
    }

    #[test]
    fn full_profile() {
        let yaml = r#"
environment:
  name: vision
channels:
  - menpo
  - conda-forge
spec: pinned/conda-spec.txt
hooks:
  activate: env/activate.sh
  deactivate: env/deactivate.sh
on_existing: repair
"#;
        let profile = parse_yaml(yaml).unwrap();
        assert_eq!(profile.environment.name, "vision");
        assert_eq!(profile.channels.len(), 2);
        assert_eq!(profile.channels[0], "menpo");
        assert_eq!(profile.spec, "pinned/conda-spec.txt");
        assert_eq!(profile.hooks.activate, "env/activate.sh");
        assert_eq!(profile.hooks.deactivate, "env/deactivate.sh");
        assert_eq!(profile.on_existing, ExistingPolicy::Repair);
    }

    #[test]
    fn default_hook_paths() {
        let profile = parse_yaml("environment:\n  name: x\n").unwrap();
        assert_eq!(profile.hooks.activate, "hooks/activate.sh");
        assert_eq!(profile.hooks.deactivate, "hooks/deactivate.sh");
    }

    #[test]
    fn auto_detect_json() {
        let json = r#"{"environment": {"name": "x"}}"#;
        let profile = parse_auto(json).unwrap();
        assert_eq!(profile.environment.name, "x");
    }

    #[test]
    fn auto_detect_yaml() {
        let profile = parse_auto("environment:\n  name: x\n").unwrap();
        assert_eq!(profile.environment.name, "x");
    }

    #[test]
    fn unknown_on_existing_is_rejected() {
        assert!(parse_yaml("on_existing: recreate\n").is_err());
    }

    #[test]
    fn source_from_arg() {
        assert!(matches!(
            ProfileSource::from_arg(None),
            ProfileSource::Default
        ));
        assert!(matches!(
            ProfileSource::from_arg(Some("-")),
            ProfileSource::Stdin
        ));
        assert!(matches!(
            ProfileSource::from_arg(Some("https://example.com/envstrap.yaml")),
            ProfileSource::Url(_)
        ));
        assert!(matches!(
            ProfileSource::from_arg(Some("profiles/envstrap.yaml")),
            ProfileSource::File(_)
        ));
    }

    #[test]
    fn file_profile_resolves_against_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("envstrap.yaml");
        fs::write(&path, "spec: deps.txt\n").unwrap();

        let bundle = load(&ProfileSource::File(path)).unwrap();
        assert_eq!(bundle.files_dir.as_deref(), Some(dir.path()));
        assert_eq!(bundle.profile.spec, "deps.txt");
    }

    #[test]
    fn only_tar_gz_counts_as_a_bundle() {
        assert!(is_tar_gz(Path::new("bundle.tar.gz")));
        assert!(!is_tar_gz(Path::new("profile.yaml.gz")));
        assert!(!is_tar_gz(Path::new("profile.gz")));
    }

    #[test]
    fn plain_gz_suffixed_profile_is_not_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.yaml.gz");
        fs::write(&path, "environment:\n  name: x\n").unwrap();

        // Must not be routed into tar extraction; text loading handles it
        let bundle = load(&ProfileSource::File(path)).unwrap();
        assert_eq!(bundle.profile.environment.name, "x");
    }

    #[test]
    fn bundle_profile_missing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_profile_in_dir(dir.path()).is_err());
    }
}
