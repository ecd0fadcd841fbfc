//! [`Args`] definitions.

use clap::Parser;

/// Backend of the Bullet Note note-taking application.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::Args;

    #[test]
    fn defaults_to_local_config() {
        let args = Args::try_parse_from(["bulletnote"]).unwrap();

        assert_eq!(args.config, "config.toml");
    }

    #[test]
    fn accepts_config_path() {
        let args =
            Args::try_parse_from(["bulletnote", "-c", "/etc/bulletnote.toml"])
                .unwrap();

        assert_eq!(args.config, "/etc/bulletnote.toml");
    }
}
