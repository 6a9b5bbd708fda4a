use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use url::Url;

use rule_router::config::{load_config, validation::lint_rules};
use rule_router::routing::{step, DestinationRegistry, RequestTarget, RuleSet, ScanState};
use rule_router::http::RoutingTarget;
use rule_router::DestinationPool;

#[derive(Parser)]
#[command(name = "route-cli")]
#[command(about = "Offline tooling for rule-router configurations", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print lints
    Validate,
    /// Show which rule a URL would be routed by
    Check {
        url: Url,
        /// Treat every destination name as registered
        #[arg(long)]
        any_destination: bool,
    },
}

/// Registry that resolves every name.
struct AnyDestination;

impl DestinationRegistry for AnyDestination {
    type Handle = ();

    fn resolve(&self, _name: &str) -> Option<&()> {
        Some(&())
    }
}

#[derive(Serialize)]
struct CheckReport {
    hostname: String,
    pathname: String,
    skipped: Vec<SkippedRule>,
    matched: Option<MatchedRule>,
}

#[derive(Serialize)]
struct SkippedRule {
    rule: String,
    destination: String,
}

#[derive(Serialize)]
struct MatchedRule {
    rule: String,
    destination: String,
}

/// Walk the scan one transition at a time, recording skipped rules.
fn explain<R>(rules: &RuleSet, target: &RequestTarget<'_>, registry: &R) -> (Vec<SkippedRule>, Option<MatchedRule>)
where
    R: DestinationRegistry + ?Sized,
{
    let mut skipped = Vec::new();
    let mut state = ScanState::Start;
    loop {
        state = match step(rules, target, registry, state) {
            ScanState::MatchedResolved(resolved) => {
                let matched = MatchedRule {
                    rule: resolved.rule_name().to_string(),
                    destination: resolved.destination_name().to_string(),
                };
                return (skipped, Some(matched));
            }
            ScanState::ExhaustedNoMatch => return (skipped, None),
            ScanState::MatchedUnresolved(index) => {
                if let Some(rule) = rules.get(index) {
                    skipped.push(SkippedRule {
                        rule: rule.name().to_string(),
                        destination: rule.destination().to_string(),
                    });
                }
                ScanState::MatchedUnresolved(index)
            }
            next => next,
        };
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Validate => {
            let lints = lint_rules(&config);
            for lint in &lints {
                println!("warning: {}", lint);
            }
            println!(
                "{}: {} rules, {} destinations, {} warnings",
                cli.config.display(),
                config.rules.len(),
                config.destinations.len(),
                lints.len()
            );
        }
        Commands::Check { url, any_destination } => {
            let rules = RuleSet::from_config(&config.rules).map_err(|errors| {
                errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
            })?;
            let RoutingTarget { hostname, pathname } = RoutingTarget::from(&url);
            let target = RequestTarget::new(&hostname, &pathname);

            let (skipped, matched) = if any_destination {
                explain(&rules, &target, &AnyDestination)
            } else {
                let pool = DestinationPool::new(&config.destinations)?;
                explain(&rules, &target, &pool)
            };

            let report = CheckReport {
                hostname,
                pathname,
                skipped,
                matched,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
