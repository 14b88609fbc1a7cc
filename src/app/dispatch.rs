use crate::cli::commands::{Cli, Commands};
use anyhow::{Context, Result};
use async_trait::async_trait;
use cogito::agent::DecisionCore;
use cogito::config::{Config, StakeholderBackend};
use cogito::llm::{CompletionTransport, OpenAiCompatibleTransport};
use cogito::outcome::ActionCatalog;
use cogito::persona::{Character, Goal};
use cogito::reasoning::{ChainSettings, ThoughtChainEngine};
use cogito::stakeholders::{
    AggregatedPreferences, BalanceOracle, LlmPreferenceExtractor, MemoryStakeholderStore,
    PreferenceAggregator, SqliteStakeholderStore, StakeholderIdentity, StakeholderKind,
    StakeholderStore, TokenBalance,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Balance supplied on the command line, standing in for an on-chain lookup.
struct FixedBalance(TokenBalance);

#[async_trait]
impl BalanceOracle for FixedBalance {
    async fn balance(&self, _identity: &StakeholderIdentity) -> anyhow::Result<TokenBalance> {
        Ok(self.0.clone())
    }
}

async fn open_store(config: &Config) -> Result<Arc<dyn StakeholderStore>> {
    Ok(match config.stakeholders.backend {
        StakeholderBackend::Memory => Arc::new(MemoryStakeholderStore::new()),
        StakeholderBackend::Sqlite => {
            let path = config.stakeholder_db_path();
            info!(path = %path.display(), "opening stakeholder store");
            Arc::new(SqliteStakeholderStore::open(&path).await?)
        }
    })
}

async fn build_aggregator(
    config: &Config,
    transport: Arc<dyn CompletionTransport>,
    oracle: Option<Arc<dyn BalanceOracle>>,
) -> Result<Arc<PreferenceAggregator>> {
    let store = open_store(config).await?;
    let extractor = Arc::new(LlmPreferenceExtractor::new(transport, &config.llm.model));
    let aggregator = PreferenceAggregator::new(store, extractor);
    Ok(Arc::new(match oracle {
        Some(oracle) => aggregator.with_oracle(oracle),
        None => aggregator,
    }))
}

fn configured_transport(config: &Config) -> Arc<dyn CompletionTransport> {
    Arc::new(OpenAiCompatibleTransport::from_config(&config.llm))
}

fn print_weight(config: &Config, balance: &str) -> Result<()> {
    let balance: TokenBalance = balance.parse()?;
    let token = &config.stakeholders;
    println!("balance: {balance} {} ({})", token.ticker, token.network);
    println!("weight:  {:.6}", balance.weight());
    Ok(())
}

async fn load_preferences(config: &Config) -> Result<AggregatedPreferences> {
    let aggregator = build_aggregator(config, configured_transport(config), None).await?;
    Ok(aggregator.aggregated_preferences().await?)
}

async fn print_preferences(config: &Config) -> Result<()> {
    let preferences = load_preferences(config).await?;
    println!("{}", serde_json::to_string_pretty(&preferences)?);
    Ok(())
}

/// One stakeholder message to fold into the store.
struct Ingestion {
    identity: StakeholderIdentity,
    message: String,
    balance: Option<TokenBalance>,
    kind: StakeholderKind,
}

/// Extract and store the message's preferences, then record the message in
/// the sender's history. Returns the preference names written.
async fn ingest(config: &Config, ingestion: Ingestion) -> Result<Vec<String>> {
    if config.stakeholders.backend == StakeholderBackend::Memory {
        warn!(
            "memory stakeholder backend: ingested preferences are lost when this process exits; \
             set stakeholders.backend = \"sqlite\" to keep them"
        );
    }

    let Ingestion {
        identity,
        message,
        balance,
        kind,
    } = ingestion;
    let oracle = balance.map(|balance| Arc::new(FixedBalance(balance)) as Arc<dyn BalanceOracle>);
    let aggregator = build_aggregator(config, configured_transport(config), oracle).await?;

    aggregator.fetch_or_create(&identity, kind).await?;
    let names = aggregator.process_message(&identity, &message).await?;
    aggregator
        .add_historical_messages(&identity, vec![message])
        .await?;

    info!(key = %identity, preferences = names.len(), "ingested stakeholder message");
    Ok(names)
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

async fn think(config: &Config, prompt: Option<String>, with_actions: bool) -> Result<()> {
    let transport = configured_transport(config);
    let aggregator = build_aggregator(config, Arc::clone(&transport), None).await?;
    let character = Character::load_or_default(config.character_path.as_deref())?;
    let engine = ThoughtChainEngine::new(transport, ChainSettings::from_config(config))?;
    let core = DecisionCore::new(engine, aggregator, Arc::new(ActionCatalog::new()), character);

    let mut state = core.snapshot_state().await?;
    if let Some(prompt) = prompt {
        state.goals.push(Goal {
            id: "operator".into(),
            name: prompt,
            description: "Request from the operator for this run".into(),
            weight: 1.0,
        });
    }

    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let generation = core.generate_tasks(&state, &cancel).await?;
    for (index, step) in generation.chain.steps().iter().enumerate() {
        println!(
            "── step {} ({}, confidence {:.2}) ──\n{}\n",
            index + 1,
            step.purpose,
            step.confidence,
            step.content
        );
    }

    for task in &generation.tasks {
        println!("{}", serde_json::to_string_pretty(task)?);
        if with_actions {
            let actions = core.generate_actions(task, &state, &cancel).await?;
            println!("{}", serde_json::to_string_pretty(&actions.actions)?);
        }
    }
    Ok(())
}

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Weight { balance } => print_weight(&config, &balance),
        Commands::Think { prompt, actions } => think(&config, prompt, actions)
            .await
            .context("reasoning run failed"),
        Commands::Prefs => print_preferences(&config).await,
        Commands::Ingest {
            platform,
            id,
            message,
            balance,
            priority,
        } => {
            let ingestion = Ingestion {
                identity: StakeholderIdentity::new(platform, id),
                message,
                balance: balance.as_deref().map(str::parse).transpose()?,
                kind: if priority {
                    StakeholderKind::Priority
                } else {
                    StakeholderKind::User
                },
            };
            let names = ingest(&config, ingestion)
                .await
                .context("stakeholder ingestion failed")?;
            if names.is_empty() {
                println!("no preferences found in message");
            } else {
                println!("updated preferences: {}", names.join(", "));
            }
            Ok(())
        }
    }
}
