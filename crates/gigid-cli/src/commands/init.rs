//! `gigid init` — Write a starter node configuration file.

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the configuration file.
    #[arg(short, long, default_value = "gigid.toml")]
    pub output: PathBuf,

    /// Administrator address to configure.
    #[arg(long)]
    pub admin: Option<String>,
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    if args.output.exists() {
        anyhow::bail!("{} already exists", args.output.display());
    }

    let admin = args.admin.as_deref().unwrap_or("");
    let contents = format!(
        r#"[admin]
# The administrator address. The node refuses to start without one.
address = "{admin}"

[api]
listen_addr = "127.0.0.1"
port = 9100

[storage]
data_dir = "./data"

[logging]
level = "info"
format = "text"
"#
    );

    std::fs::write(&args.output, contents)?;
    println!("Wrote {}", args.output.display());
    if admin.is_empty() {
        println!("Set [admin] address before starting the node.");
    }
    Ok(())
}
