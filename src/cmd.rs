use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::process::Command;

const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

fn echo(program: &str, args: &[String]) {
    println!("{}> {} {}{}", CYAN, program, args.join(" "), RESET);
    tracing::debug!(program, args = %args.join(" "), "spawning");
}

/// Run a command, inheriting stdio, failing on non-zero exit
pub fn run<I, S>(program: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().collect();
    let shown: Vec<String> = args
        .iter()
        .map(|s| s.as_ref().to_string_lossy().into_owned())
        .collect();
    echo(program, &shown);

    let status = Command::new(program)
        .args(&args)
        .status()
        .with_context(|| format!("Failed to run {}", program))?;

    if !status.success() {
        anyhow::bail!("{} failed with exit code {:?}", program, status.code());
    }

    Ok(())
}

/// Run a command and capture trimmed stdout, failing on non-zero exit.
/// stderr passes through to the terminal.
pub fn run_output<I, S>(program: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().collect();
    let shown: Vec<String> = args
        .iter()
        .map(|s| s.as_ref().to_string_lossy().into_owned())
        .collect();
    echo(program, &shown);

    let output = Command::new(program)
        .args(&args)
        .output()
        .with_context(|| format!("Failed to run {}", program))?;

    if !output.status.success() {
        anyhow::bail!(
            "{} failed with exit code {:?}",
            program,
            output.status.code()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
