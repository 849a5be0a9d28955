use std::error::Error;
use std::process::Command;

use clap::Args;
use serde::Serialize;
use twiss_core::SchemaVersion;
use twiss_optics::serde::to_canonical_json_bytes;

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Emit extended metadata including the report schema and toolchain.
    #[arg(long)]
    pub long: bool,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: String,
    report_schema: SchemaVersion,
    rustc: String,
}

pub fn run(args: &VersionArgs) -> Result<(), Box<dyn Error>> {
    if !args.long {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let rustc = Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .unwrap_or_else(|| "rustc unavailable".into());
    let info = VersionInfo {
        version: env!("CARGO_PKG_VERSION").into(),
        report_schema: SchemaVersion::default(),
        rustc,
    };
    let json = to_canonical_json_bytes(&info)?;
    println!("{}", String::from_utf8(json)?);
    Ok(())
}
