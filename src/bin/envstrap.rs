use anyhow::{bail, Result};
use std::env;
use tracing_subscriber::EnvFilter;

use envstrap::bootstrap::Bootstrapper;
use envstrap::conda::Conda;
use envstrap::profile::{self, ExistingPolicy, ProfileSource};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    let mut source_arg: Option<String> = None;
    let mut name: Option<String> = None;
    let mut channels: Vec<String> = Vec::new();
    let mut spec: Option<String> = None;
    let mut activate: Option<String> = None;
    let mut deactivate: Option<String> = None;
    let mut repair = false;
    let mut program: Option<String> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "help" | "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--name" => name = Some(next_value(&mut iter, "--name")?),
            "--channel" => channels.push(next_value(&mut iter, "--channel")?),
            "--spec" => spec = Some(next_value(&mut iter, "--spec")?),
            "--activate" => activate = Some(next_value(&mut iter, "--activate")?),
            "--deactivate" => deactivate = Some(next_value(&mut iter, "--deactivate")?),
            "--repair" => repair = true,
            "--conda" => program = Some(next_value(&mut iter, "--conda")?),
            s if s.starts_with('-') && s != "-" => {
                eprintln!("Unknown option: {}", s);
                print_usage();
                std::process::exit(1);
            }
            s => {
                if source_arg.is_some() {
                    bail!("Only one profile argument is accepted");
                }
                source_arg = Some(s.to_string());
            }
        }
    }

    let source = ProfileSource::from_arg(source_arg.as_deref());
    let mut bundle = profile::load(&source)?;

    // Flags override the profile
    if let Some(name) = name {
        bundle.profile.environment.name = name;
    }
    if !channels.is_empty() {
        bundle.profile.channels = channels;
    }
    if let Some(spec) = spec {
        bundle.profile.spec = spec;
    }
    if let Some(activate) = activate {
        bundle.profile.hooks.activate = activate;
    }
    if let Some(deactivate) = deactivate {
        bundle.profile.hooks.deactivate = deactivate;
    }
    if repair {
        bundle.profile.on_existing = ExistingPolicy::Repair;
    }

    let mut bootstrapper = Bootstrapper::new(bundle);
    if let Some(program) = program {
        bootstrapper = bootstrapper.with_conda(Conda::with_program(program));
    }

    bootstrapper.run()
}

fn next_value(iter: &mut std::slice::Iter<'_, String>, flag: &str) -> Result<String> {
    match iter.next() {
        Some(value) => Ok(value.clone()),
        None => bail!("{} requires a value", flag),
    }
}

fn print_usage() {
    println!(
        r#"envstrap - one-time conda environment bootstrap

Usage:
    envstrap [profile] [options]

Profile:
    <path>                YAML/JSON profile, or a .tar/.tgz bundle holding
                          the profile plus the spec and hook scripts
    <url>                 http(s) source for the same
    -                     read the profile from stdin
    (none)                ./envstrap.yaml if present, else built-in defaults

Options:
    --name <name>         Environment name
    --channel <channel>   Channel to register (repeatable, replaces profile list)
    --spec <path>         Pinned dependency spec handed to the package manager
    --activate <path>     Activation hook script
    --deactivate <path>   Deactivation hook script
    --repair              Skip creation if the environment exists; reinstall hooks
    --conda <program>     Package manager binary (default: conda)

Examples:
    envstrap                          # bootstrap from ./envstrap.yaml
    envstrap profiles/vision.yaml     # bootstrap from a profile file
    envstrap bundle.tgz               # profile + spec + hooks in one archive
    envstrap --name pybot --channel menpo --spec conda-spec.txt
    envstrap --repair                 # re-run to fix missing hooks
"#
    );
}
