use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("hostpulse version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
