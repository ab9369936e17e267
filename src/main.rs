use clap::{Arg, Command};
use log::LevelFilter;
use phishguard::{
    AnalysisEngine, Config, DomainBlocklist, HistoryStore, StaticTokenVerifier, TextScoreResult,
    TokenVerifier, UrlAnalysis, Verdict,
};
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("phishguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Phishing detection for URLs and free text with multi-source verdict combination")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/phishguard.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("Analyze a URL")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("text")
                .short('t')
                .long("text")
                .value_name("TEXT")
                .help("Analyze free text")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .help("Analyze the contents of a text file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print machine-readable JSON instead of human output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .value_name("NAME")
                .help("Username to attribute history entries to")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("token")
                .long("token")
                .value_name("TOKEN")
                .help("Resolve the username from an auth token instead of --user")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("history")
                .long("history")
                .help("Show the user's analysis history")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Show the user's aggregated statistics")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("clear-history")
                .long("clear-history")
                .help("Delete the user's analysis history")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = load_config(config_path);

    if matches.get_flag("test-config") {
        test_config(&config);
        return;
    }

    let username = resolve_username(&matches, &config);
    let json = matches.get_flag("json");

    if matches.get_flag("history") || matches.get_flag("stats") || matches.get_flag("clear-history")
    {
        run_history_command(&matches, &config, &username, json);
        return;
    }

    let engine = build_engine(&config);

    if let Some(url) = matches.get_one::<String>("url") {
        let analysis = engine.analyze_url(url, &username).await;
        print_url_analysis(&analysis, json);
    } else if let Some(text) = matches.get_one::<String>("text") {
        let result = engine.analyze_text(text, &username).await;
        print_text_result(&result, json);
    } else if let Some(path) = matches.get_one::<String>("file") {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("❌ Failed to read {path}: {e}");
                process::exit(1);
            }
        };
        let result = engine.analyze_text(&text, &username).await;
        print_text_result(&result, json);
    } else {
        println!("Nothing to do. Use --url, --text or --file to analyze something,");
        println!("or --history/--stats to inspect past analyses. See --help for details.");
    }
}

fn load_config(config_path: &str) -> Config {
    if Path::new(config_path).exists() {
        match Config::from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration from {config_path}: {e}");
                process::exit(1);
            }
        }
    } else {
        log::warn!("Configuration file {config_path} not found, using defaults");
        Config::default()
    }
}

fn generate_default_config(path: &str) {
    let config = Config::default();
    match config.to_file(path) {
        Ok(()) => {
            println!("✅ Default configuration written to {path}");
            println!("Edit it to configure the blocklist, history database and auth tokens.");
        }
        Err(e) => {
            eprintln!("❌ Failed to write configuration: {e}");
            process::exit(1);
        }
    }
}

fn test_config(config: &Config) {
    println!("🔍 Testing configuration...");
    println!();

    if let Some(blocklist_config) = &config.blocklist {
        match DomainBlocklist::new(blocklist_config) {
            Ok(_) => {
                println!(
                    "Blocklist: {} domains, {} host patterns",
                    blocklist_config.domains.len(),
                    blocklist_config.host_patterns.len()
                );
                println!("All blocklist patterns compiled successfully.");
            }
            Err(e) => {
                println!("❌ Configuration validation failed:");
                println!("Error: {e}");
                process::exit(1);
            }
        }
    } else {
        println!("Blocklist: not configured");
    }

    if config.history.enabled {
        println!("History database: {}", config.history.database_path);
    } else {
        println!("History: disabled");
    }
    println!(
        "Timeouts: blacklist {}s, AI {}s",
        config.blacklist_timeout_seconds, config.ai_timeout_seconds
    );
    println!("✅ Configuration is valid");
}

fn resolve_username(matches: &clap::ArgMatches, config: &Config) -> String {
    if let Some(token) = matches.get_one::<String>("token") {
        let verifier = StaticTokenVerifier::new(config.auth_tokens.clone().unwrap_or_default());
        match verifier.verify(token) {
            Some(username) => username,
            None => {
                eprintln!("❌ Invalid token");
                process::exit(1);
            }
        }
    } else if let Some(user) = matches.get_one::<String>("user") {
        user.clone()
    } else {
        config.default_user.clone()
    }
}

fn open_history(config: &Config) -> HistoryStore {
    if !config.history.enabled {
        eprintln!("❌ History is not enabled in configuration");
        process::exit(1);
    }
    match HistoryStore::new(&config.history.database_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Failed to open history database: {e}");
            process::exit(1);
        }
    }
}

fn run_history_command(matches: &clap::ArgMatches, config: &Config, username: &str, json: bool) {
    let store = open_history(config);

    if matches.get_flag("clear-history") {
        match store.clear(username) {
            Ok(deleted) => println!("✅ Deleted {deleted} history entries for {username}"),
            Err(e) => {
                eprintln!("❌ Failed to clear history: {e}");
                process::exit(1);
            }
        }
    } else if matches.get_flag("stats") {
        match store.stats(username) {
            Ok(stats) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&stats).unwrap());
                } else {
                    println!("📊 Statistics for {username}");
                    println!("  Total analyses: {}", stats.total);
                    println!("  Average risk:   {}%", stats.avg_risk);
                    println!("  Safe:           {}%", stats.safe_pct);
                    println!("  Suspicious:     {}%", stats.suspicious_pct);
                    println!("  Phishing:       {}%", stats.phishing_pct);
                }
            }
            Err(e) => {
                eprintln!("❌ Failed to compute statistics: {e}");
                process::exit(1);
            }
        }
    } else {
        match store.list(username) {
            Ok(entries) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(&entries).unwrap());
                } else if entries.is_empty() {
                    println!("No history for {username}");
                } else {
                    println!("📜 History for {username} ({} entries)", entries.len());
                    for entry in entries {
                        let percentage = entry
                            .percentage
                            .map(|p| format!(" {p}%"))
                            .unwrap_or_default();
                        println!(
                            "  {} {} [{:?}]{} {}",
                            verdict_emoji(entry.verdict),
                            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                            entry.kind,
                            percentage,
                            entry.input
                        );
                    }
                }
            }
            Err(e) => {
                eprintln!("❌ Failed to read history: {e}");
                process::exit(1);
            }
        }
    }
}

fn build_engine(config: &Config) -> AnalysisEngine {
    let mut engine = AnalysisEngine::new(config);

    if let Some(blocklist_config) = &config.blocklist {
        match DomainBlocklist::new(blocklist_config) {
            Ok(blocklist) => {
                engine = engine.with_blacklist(Box::new(blocklist));
            }
            Err(e) => {
                eprintln!("❌ Failed to load blocklist: {e}");
                process::exit(1);
            }
        }
    }

    if config.history.enabled {
        match HistoryStore::new(&config.history.database_path) {
            Ok(store) => {
                engine = engine.with_history(store);
            }
            Err(e) => {
                log::warn!("History disabled, failed to open database: {e}");
            }
        }
    }

    engine
}

fn verdict_emoji(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Safe => "✅",
        Verdict::Suspicious => "⚠️",
        Verdict::Malicious => "❌",
    }
}

fn print_url_analysis(analysis: &UrlAnalysis, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(analysis).unwrap());
        return;
    }

    let combined = &analysis.combined;
    println!(
        "{} {} — {}",
        verdict_emoji(combined.verdict),
        analysis.url,
        combined.verdict
    );
    println!("  Reason: {}", combined.reason);
    println!(
        "  Heuristic score: {}% ({})",
        analysis.heuristic.score, analysis.heuristic.verdict
    );

    let breakdown = &combined.breakdown;
    for source in [&breakdown.heuristic, &breakdown.blacklist, &breakdown.ai]
        .into_iter()
        .flatten()
    {
        let verdict = source
            .verdict
            .map(|v| v.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        println!(
            "  {} voted {} (weight {})",
            source.source, verdict, source.weight
        );
    }
}

fn print_text_result(result: &TextScoreResult, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(result).unwrap());
        return;
    }

    println!(
        "{} {} ({}% risk)",
        verdict_emoji(result.verdict),
        result.verdict.text_label(),
        result.score
    );
    for reason in &result.reasons {
        println!("  • {reason}");
    }
    for scored in &result.url_results {
        println!(
            "  {} {} scored {}%",
            verdict_emoji(scored.result.verdict),
            scored.url,
            scored.result.score
        );
    }
}
