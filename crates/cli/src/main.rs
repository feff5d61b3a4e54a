use analysis::{
    AnalysisReport, KnnAnalyzer, ScoreLabel, log_report, recommendation_diversity,
    validate_recommendations,
};
use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::{ColoredString, Colorize};
use futures::stream::{self, StreamExt};
use metadata_client::TmdbClient;
use pipeline::Recommendation;
use rand::seq::IndexedRandom;
use server::{Config, RecommendationOrchestrator, RecommendationRun, RecommenderConfig};
use sources::{NeighborFinder, common_items, cosine_similarity, rating_vector};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use store::{ContentList, DocumentStore, MemoryStore, USERNAMES_DOC_ID, UserId, lookup_uid};

/// CineCircle - social movie & TV recommendations
#[derive(Parser)]
#[command(name = "cinecircle")]
#[command(about = "Movie and TV recommendations from people who rate like you", long_about = None)]
struct Cli {
    /// Path to a store snapshot (JSON)
    #[arg(short, long, default_value = "data/sample_snapshot.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get recommendations for a user
    Recommend {
        /// User id or username
        #[arg(long)]
        user: String,

        /// Number of recommendations to return
        #[arg(long)]
        limit: Option<usize>,

        /// Show the reason, source and support of each recommendation
        #[arg(long)]
        explain: bool,

        /// Run the analysis engine on the result
        #[arg(long)]
        analyze: bool,
    },

    /// Run the full analysis for a user's recommendations
    Analyze {
        /// User id or username
        #[arg(long)]
        user: String,

        #[arg(long)]
        limit: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what a user's friends watched recently
    Activity {
        /// User id or username
        #[arg(long)]
        user: String,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show a user's profile and lists
    User {
        /// User id or username
        #[arg(long)]
        user: String,
    },

    /// Show a user's nearest neighbors
    Neighbors {
        /// User id or username
        #[arg(long)]
        user: String,

        /// Number of neighbors
        #[arg(long, default_value = "15")]
        k: usize,
    },

    /// Compare two users' ratings
    Similarity {
        #[arg(long)]
        a: String,

        #[arg(long)]
        b: String,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading store snapshot from {}...", cli.data.display());
    let start = Instant::now();
    let store: Arc<dyn DocumentStore> = Arc::new(
        MemoryStore::load_from_file(&cli.data).context("Failed to load store snapshot")?,
    );
    println!("{} Loaded snapshot in {:?}", "✓".green(), start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            user,
            limit,
            explain,
            analyze,
        } => handle_recommend(store, &user, limit, explain, analyze).await?,
        Commands::Analyze { user, limit, json } => handle_analyze(store, &user, limit, json).await?,
        Commands::Activity { user, limit } => handle_activity(store, &user, limit).await?,
        Commands::User { user } => handle_user(store, &user).await?,
        Commands::Neighbors { user, k } => handle_neighbors(store, &user, k).await?,
        Commands::Similarity { a, b } => handle_similarity(store, &a, &b).await?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(store, requests, concurrent).await?,
    }

    Ok(())
}

/// Accept either a uid or a username
async fn resolve_user(store: &dyn DocumentStore, input: &str) -> Result<UserId> {
    if store.get_user(input).await?.is_some() {
        return Ok(input.to_string());
    }
    lookup_uid(store, input)
        .await?
        .ok_or_else(|| anyhow!("User {} not found", input))
}

/// The orchestrator needs the catalog, so TMDB settings come from the environment
fn build_orchestrator(store: Arc<dyn DocumentStore>) -> Result<RecommendationOrchestrator> {
    let config = Config::from_env().context("TMDB_API_KEY must be set for this command")?;
    let provider = TmdbClient::new(&config.tmdb_api_key).with_api_url(&config.tmdb_api_url);
    Ok(RecommendationOrchestrator::with_config(
        store,
        Arc::new(provider),
        config.recommender(),
    ))
}

async fn run_recommendations(
    orchestrator: &RecommendationOrchestrator,
    uid: &str,
    limit: Option<usize>,
) -> Result<RecommendationRun> {
    let limit = limit.unwrap_or(orchestrator.config().default_limit);
    orchestrator.recommend_with_trace(uid, limit).await
}

async fn analyze_run(store: Arc<dyn DocumentStore>, run: &RecommendationRun) -> AnalysisReport {
    KnnAnalyzer::new(store)
        .run_comprehensive_analysis(
            &run.uid,
            &run.recommendations,
            run.started_at,
            run.finished_at,
            &run.neighbors,
        )
        .await
}

/// Handle the 'recommend' command
async fn handle_recommend(
    store: Arc<dyn DocumentStore>,
    user: &str,
    limit: Option<usize>,
    explain: bool,
    analyze: bool,
) -> Result<()> {
    let uid = resolve_user(store.as_ref(), user).await?;
    let orchestrator = build_orchestrator(store.clone())?;

    let run = run_recommendations(&orchestrator, &uid, limit).await?;
    println!(
        "{} tier, {} neighbors, {}ms",
        run.tier.as_str().bold(),
        run.neighbors.len(),
        run.duration_ms()
    );
    print_recommendations(&run.recommendations, explain);

    if analyze {
        let report = analyze_run(store, &run).await;
        print_report_summary(&report);
    }
    Ok(())
}

/// Handle the 'analyze' command
async fn handle_analyze(
    store: Arc<dyn DocumentStore>,
    user: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let uid = resolve_user(store.as_ref(), user).await?;
    let orchestrator = build_orchestrator(store.clone())?;
    let run = run_recommendations(&orchestrator, &uid, limit).await?;

    let watched = store.get_watched(&uid).await?;
    let report = analyze_run(store, &run).await;

    if json {
        println!("{}", KnnAnalyzer::export_json(&report)?);
        return Ok(());
    }

    log_report(&report);

    let validation = validate_recommendations(&run.recommendations, &watched);
    let diversity = recommendation_diversity(&run.recommendations);
    println!("{}", "Validation:".bold().blue());
    println!("{}Total: {} ({} unique)", "• ".green(), validation.total, validation.unique);
    println!("{}Already watched: {}", "• ".green(), validation.already_watched);
    println!("{}With provider rating: {}", "• ".green(), validation.has_ratings);
    println!("{}With social score: {}", "• ".green(), validation.has_social_score);
    println!(
        "{}Distinct genres: {}, distinct years: {}",
        "• ".green(),
        diversity.genre_diversity,
        diversity.year_diversity
    );

    print_report_summary(&report);
    Ok(())
}

/// Handle the 'activity' command
async fn handle_activity(store: Arc<dyn DocumentStore>, user: &str, limit: usize) -> Result<()> {
    let uid = resolve_user(store.as_ref(), user).await?;
    let entries = server::get_friend_activity(store.as_ref(), &uid, limit).await?;

    println!("{}", format!("Friend activity for {}:", uid).bold().blue());
    if entries.is_empty() {
        println!("  (nothing yet)");
    }
    for entry in entries {
        let rating = entry
            .content
            .rating
            .map(|r| format!(" {}", "★".repeat(r as usize)))
            .unwrap_or_default();
        println!(
            "  {} {} watched {}{}",
            entry.timestamp.format("%Y-%m-%d").to_string().dimmed(),
            entry.friend_username.green(),
            entry.content.title,
            rating.yellow()
        );
    }
    Ok(())
}

/// Handle the 'user' command
async fn handle_user(store: Arc<dyn DocumentStore>, user: &str) -> Result<()> {
    let uid = resolve_user(store.as_ref(), user).await?;
    let (profile, watched, watchlist, watching) = tokio::try_join!(
        store.get_user(&uid),
        store.get_watched(&uid),
        store.get_list(&uid, ContentList::Watchlist),
        store.get_list(&uid, ContentList::Watching),
    )?;
    let profile = profile.ok_or_else(|| anyhow!("User {} not found", uid))?;

    println!("{}", format!("User: {} ({})", profile.username, uid).bold().blue());
    if !profile.bio.is_empty() {
        println!("{}{}", "• ".green(), profile.bio);
    }
    println!("{}Friends: {}", "• ".green(), profile.friends.len());
    println!(
        "{}Pending requests: {} sent, {} received",
        "• ".green(),
        profile.sent_requests.len(),
        profile.received_requests.len()
    );
    println!("{}Blocked: {}", "• ".green(), profile.blocked.len());

    let rated: Vec<_> = watched.iter().filter_map(|w| w.rating).collect();
    let avg_rating = if rated.is_empty() {
        0.0
    } else {
        rated.iter().map(|r| *r as f32).sum::<f32>() / rated.len() as f32
    };
    println!("{}Watched: {} ({} rated)", "• ".cyan(), watched.len(), rated.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), avg_rating);
    println!("{}Watchlist: {}", "• ".cyan(), watchlist.len());
    println!("{}Watching: {}", "• ".cyan(), watching.len());

    let mut top_rated: Vec<_> = watched.iter().filter(|w| w.is_rated()).collect();
    top_rated.sort_by(|a, b| b.rating.cmp(&a.rating));
    println!("Top rated:");
    for item in top_rated.iter().take(5) {
        println!(
            "  - {} [{}] (Rating: {})",
            item.title,
            item.media_type,
            item.rating.unwrap_or_default()
        );
    }
    Ok(())
}

/// Handle the 'neighbors' command
async fn handle_neighbors(store: Arc<dyn DocumentStore>, user: &str, k: usize) -> Result<()> {
    let uid = resolve_user(store.as_ref(), user).await?;
    let config = RecommenderConfig::default();
    let finder = NeighborFinder::new(store)
        .with_candidate_cap(config.candidate_cap)
        .with_friend_boost(config.friend_boost)
        .with_min_watched(config.min_watched);

    let neighbors = finder.find_neighbors(&uid, k).await?;
    println!("{}", format!("Nearest neighbors of {}:", uid).bold().blue());
    for (i, neighbor) in neighbors.iter().enumerate() {
        let friend = if neighbor.is_friend { " (friend)".green() } else { "".normal() };
        println!(
            "{}. {}{} - similarity {:.3} (raw {:.3}), {} watched",
            (i + 1).to_string().green(),
            neighbor.username(),
            friend,
            neighbor.similarity,
            neighbor.raw_similarity,
            neighbor.user.watched.len()
        );
    }
    Ok(())
}

/// Handle the 'similarity' command
async fn handle_similarity(store: Arc<dyn DocumentStore>, a: &str, b: &str) -> Result<()> {
    let uid_a = resolve_user(store.as_ref(), a).await?;
    let uid_b = resolve_user(store.as_ref(), b).await?;
    let (watched_a, watched_b) =
        tokio::try_join!(store.get_watched(&uid_a), store.get_watched(&uid_b))?;

    let vector_a = rating_vector(&watched_a);
    let vector_b = rating_vector(&watched_b);
    let similarity = cosine_similarity(&vector_a, &vector_b);

    println!("{}", format!("{} vs {}", uid_a, uid_b).bold().blue());
    println!("{}Common items: {}", "• ".green(), common_items(&vector_a, &vector_b));
    println!(
        "{}Similarity: {:.3} ({})",
        "• ".green(),
        similarity,
        ScoreLabel::from_score(similarity)
    );
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    store: Arc<dyn DocumentStore>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }
    let orchestrator = Arc::new(build_orchestrator(store.clone())?);

    let user_ids: Vec<UserId> = store
        .list_user_ids()
        .await?
        .into_iter()
        .filter(|uid| uid != USERNAMES_DOC_ID)
        .collect();
    if user_ids.is_empty() {
        bail!("Snapshot has no users");
    }

    let mut rng = rand::rng();
    let picks: Vec<UserId> = (0..requests)
        .filter_map(|_| user_ids.choose(&mut rng).cloned())
        .collect();

    let wall = Instant::now();
    let results: Vec<Result<Duration>> = stream::iter(picks)
        .map(|uid| {
            let orchestrator = orchestrator.clone();
            async move {
                let start = Instant::now();
                orchestrator.get_social_recommendations(&uid, 20).await?;
                Ok::<_, anyhow::Error>(start.elapsed())
            }
        })
        .buffer_unordered(concurrent.max(1))
        .collect()
        .await;
    let total_time = wall.elapsed();

    let mut timings = results.into_iter().collect::<Result<Vec<_>>>()?;
    timings.sort();

    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(recommendations: &[Recommendation], explain: bool) {
    println!("{}", "Recommendations:".bold().blue());
    if recommendations.is_empty() {
        println!("  (none)");
    }
    for (i, rec) in recommendations.iter().enumerate() {
        let year = rec
            .release_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "????".to_string());
        println!(
            "{}. {} ({}) [{}] - Score: {:.2}",
            (i + 1).to_string().green(),
            rec.title,
            year,
            rec.media_type,
            rec.score
        );
        if explain {
            if let Some(reason) = &rec.reason {
                println!("   {}", reason.italic());
            }
            println!(
                "   source: {}, support: {}, rating: {}",
                rec.source.as_str(),
                rec.contributing_count,
                rec.vote_average
                    .map(|v| format!("{:.1}", v))
                    .unwrap_or_else(|| "n/a".to_string())
            );
        }
    }
}

fn colored_label(label: ScoreLabel) -> ColoredString {
    match label {
        ScoreLabel::Excellent | ScoreLabel::Good => label.as_str().green(),
        ScoreLabel::Fair => label.as_str().yellow(),
        ScoreLabel::Poor | ScoreLabel::VeryPoor => label.as_str().red(),
    }
}

fn print_report_summary(report: &AnalysisReport) {
    let labels = &report.labels;
    println!("{}", "Analysis summary:".bold().blue());
    println!(
        "Overall score: {:.3} ({})",
        report.overall_score,
        colored_label(ScoreLabel::from_score(report.overall_score))
    );
    println!("  User similarity strength: {}", colored_label(labels.similarity));
    println!("  Recommendation quality:   {}", colored_label(labels.quality));
    println!("  Performance efficiency:   {}", colored_label(labels.performance));
    println!("  Social network strength:  {}", colored_label(labels.social));
    println!("  Cold start handling:      {}", colored_label(labels.cold_start));
    if let Some(cold) = &report.cold_start {
        println!(
            "  Cold start level: {} ({} rated items)",
            cold.cold_start_level.as_str(),
            cold.rated_count
        );
    }
}
