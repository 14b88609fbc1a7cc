use clap::{Parser, Subcommand};

/// `Cogito` - stake-weighted reasoning core for autonomous social agents.
#[derive(Parser, Debug)]
#[command(name = "cogito")]
#[command(version)]
#[command(about = "Stake-weighted reasoning core for autonomous social agents.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the voting weight of a token balance
    Weight {
        /// Balance in base units (non-negative integer, any size)
        balance: String,
    },

    /// Reason toward a task with the configured model
    Think {
        /// Extra instruction added to the character's goals for this run
        #[arg(short, long)]
        prompt: Option<String>,

        /// Also plan the actions for the generated task
        #[arg(long)]
        actions: bool,
    },

    /// Print the aggregated stakeholder preferences as JSON
    Prefs,

    /// Fold one stakeholder message into the preference store.
    ///
    /// Only the sqlite backend keeps the result across runs.
    Ingest {
        /// Platform the message came from (e.g. twitter, discord)
        platform: String,

        /// Sender's id on that platform
        id: String,

        /// Message text
        message: String,

        /// Sender's token balance in base units; the stored balance is kept when omitted
        #[arg(long)]
        balance: Option<String>,

        /// Mark the sender as a priority stakeholder
        #[arg(long)]
        priority: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_think_prompt() {
        let cli = Cli::parse_from(["cogito", "think", "--prompt", "plan an AMA"]);
        match cli.command {
            Commands::Think { prompt, actions } => {
                assert_eq!(prompt.as_deref(), Some("plan an AMA"));
                assert!(!actions);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_ingest() {
        let cli = Cli::parse_from([
            "cogito",
            "ingest",
            "twitter",
            "alice",
            "post less, thread more",
            "--balance",
            "5000",
        ]);
        match cli.command {
            Commands::Ingest {
                platform,
                id,
                message,
                balance,
                priority,
            } => {
                assert_eq!(platform, "twitter");
                assert_eq!(id, "alice");
                assert_eq!(message, "post less, thread more");
                assert_eq!(balance.as_deref(), Some("5000"));
                assert!(!priority);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_weight_balance() {
        let cli = Cli::parse_from(["cogito", "weight", "1000000"]);
        assert!(matches!(cli.command, Commands::Weight { balance } if balance == "1000000"));
    }
}
