use clap::Parser;
use sharesync::{SyncConfig, SyncSession};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sharesync")]
#[command(about = "Mirror a public cloud share folder to local disk", long_about = None)]
#[command(version)]
struct Args {
    /// Public share URL to mirror
    url: String,

    /// Largest file to download, in MiB
    #[arg(long, default_value_t = 2048)]
    limit_size: u64,

    /// Read chunk size used when re-hashing local files, in KiB
    #[arg(long, default_value_t = 4)]
    validate_chunksize: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sharesync=info".into()),
        )
        .init();

    info!("🚀 ShareSync - Public Share Mirror");
    info!("Share: {}", args.url);

    let config = SyncConfig {
        public_url: args.url,
        size_limit: args.limit_size * 1024 * 1024,
        hash_chunk_size: args.validate_chunksize * 1024,
        ..SyncConfig::default()
    };

    let mut session = SyncSession::new(config);

    tokio::select! {
        result = session.run() => match result {
            Ok(report) => {
                info!(
                    "✅ Sync complete: {} downloaded, {} already in sync, {} too big, {} failed",
                    report.downloaded,
                    report.skipped_validated,
                    report.skipped_too_big,
                    report.failed
                );
                if report.skipped_subtrees > 0 {
                    info!(
                        "⚠️  {} subtree(s) could not be listed and were skipped; re-run to retry",
                        report.skipped_subtrees
                    );
                }
                Ok(())
            }
            Err(e) => {
                eprintln!("❌ Error: {}", e);
                std::process::exit(1);
            }
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, exiting");
            Ok(())
        }
    }
}
