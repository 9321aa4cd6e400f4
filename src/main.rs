use anyhow::{anyhow, Result};
use clap::{App, Arg};
use halite::config::Config;
use halite::site::Site;
use log::info;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let matches = App::new("halite")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A static site generator for blogs")
        .arg(
            Arg::with_name("source")
                .help("Path to the site source directory")
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Overrides the configured output directory"),
        )
        .get_matches();

    let source = Path::new(matches.value_of("source").unwrap_or("."))
        .canonicalize()
        .map_err(|e| anyhow!("Resolving source directory: {}", e))?;
    let output = matches.value_of("output").map(Path::new);
    let config = Config::from_directory(&source, output)?;

    let mut site = Site::new(config);
    site.generate().map_err(|err| anyhow!("{}", err))?;

    if site.errors.is_empty() {
        info!(
            "Site generated at {}",
            site.config.output_directory.display()
        );
        Ok(())
    } else {
        for err in &site.errors {
            eprintln!("{}", err);
        }
        Err(anyhow!(
            "Build finished with {} error(s)",
            site.errors.len()
        ))
    }
}
