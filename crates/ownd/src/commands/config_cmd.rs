//! `ownd config`: inspect the configuration file.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => output::print_output(&config::path(global), global.quiet),

        ConfigCommand::Profiles => {
            let cfg = config::load(global)?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            let mut names: Vec<_> = cfg.profiles.keys().collect();
            names.sort();

            if names.is_empty() {
                return output::print_output(
                    &format!("No profiles configured in {}", config::path(global)),
                    global.quiet,
                );
            }
            for name in names {
                let marker = if name == default { "*" } else { " " };
                let address = cfg.profiles.get(name).map_or("", |p| p.address.as_str());
                output::print_output(&format!("{marker} {name:<16} {address}"), global.quiet)?;
            }
            Ok(())
        }
    }
}
