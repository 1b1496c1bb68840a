use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = code_splash::config::Config::parse();
    code_splash::app::init_logging(&cfg)?;
    code_splash::app::run(cfg)
}
