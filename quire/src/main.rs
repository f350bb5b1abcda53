use color_eyre::eyre::Result;
use log::LevelFilter;
use quire::{
  cli::{Cli, Commands},
  commands,
};
use quire_config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  // `init` must work before any configuration exists
  if let Some(Commands::Init {
    output,
    format,
    force,
  }) = &cli.command
  {
    return commands::init::run(output, format, *force);
  }

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)?;

  match cli.command {
    Some(Commands::Substitute { file }) => {
      commands::substitute::run(&config, &file)
    },
    Some(Commands::Index(args)) => {
      commands::index::apply_args(&mut config, &args);
      commands::index::run(&config).map(drop)
    },
    None => commands::index::run(&config).map(drop),
    Some(Commands::Init { .. }) => Ok(()),
  }
}
