use relief_core::audit::log::{verify_chain, JOURNAL_FILE_NAME};
use relief_core::relief::render::{render_request_markdown, render_view_csv};
use relief_core::relief::stats::dashboard_stats;
use relief_core::relief::view::{project, SortDirection, SortField, ViewQuery};
use relief_core::storage::cache::{LoadOutcome, RequestCache};
use relief_core::storage::store::FileStore;
use serde_json::json;
use std::path::PathBuf;
use tracing::{error, warn};

const USAGE: &str = "usage: cache_report <data_dir> [--filter TEXT] \
[--sort urgency|timestamp|peopleCount|location] [--asc] [--csv] [--show ID] [--verify-journal]";

struct Args {
    data_dir: PathBuf,
    query: ViewQuery,
    csv: bool,
    show: Option<String>,
    verify_journal: bool,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut it = raw.iter();
    let data_dir = it.next().ok_or_else(|| USAGE.to_string())?;
    let mut args = Args {
        data_dir: PathBuf::from(data_dir),
        query: ViewQuery::default(),
        csv: false,
        show: None,
        verify_journal: false,
    };
    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--filter" => {
                args.query.location_filter = it.next().ok_or("--filter needs a value")?.clone();
            }
            "--sort" => {
                let raw = it.next().ok_or("--sort needs a value")?;
                args.query.sort_field = serde_json::from_value::<SortField>(json!(raw))
                    .map_err(|_| format!("unknown sort field: {}", raw))?;
            }
            "--asc" => args.query.sort_direction = SortDirection::Asc,
            "--csv" => args.csv = true,
            "--show" => args.show = Some(it.next().ok_or("--show needs an id")?.clone()),
            "--verify-journal" => args.verify_journal = true,
            other => return Err(format!("unknown flag {}\n{}", other, USAGE)),
        }
    }
    Ok(args)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(2);
        }
    };

    let store = match FileStore::open(&args.data_dir) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "cannot open data dir");
            std::process::exit(1);
        }
    };
    let cache = RequestCache::load(store);
    if let LoadOutcome::Recovered { reason } = cache.load_outcome() {
        warn!(%reason, "stored cache was unreadable; reporting an empty cache");
    }

    if let Some(id) = &args.show {
        match cache.get(id) {
            Some(r) => {
                println!("{}", render_request_markdown(r));
                std::process::exit(0);
            }
            None => {
                eprintln!("no request with id {}", id);
                std::process::exit(1);
            }
        }
    }

    let rows = project(cache.records(), &args.query);
    if args.csv {
        match render_view_csv(&rows) {
            Ok(csv) => print!("{}", csv),
            Err(e) => {
                eprintln!("csv export failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let journal = if args.verify_journal {
        let path = args.data_dir.join(JOURNAL_FILE_NAME);
        Some(match verify_chain(&path) {
            Ok(entries) => json!({ "status": "PASS", "entries": entries }),
            Err(e) => json!({ "status": "FAIL", "reason": e.to_string() }),
        })
    } else {
        None
    };

    let report = json!({
        "data_dir": args.data_dir.display().to_string(),
        "load_outcome": format!("{:?}", cache.load_outcome()),
        "total": cache.len(),
        "matching": rows.len(),
        "query": args.query,
        "stats": dashboard_stats(cache.records()),
        "journal": journal,
    });
    match serde_json::to_string_pretty(&report) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("report encoding failed: {}", e);
            std::process::exit(1);
        }
    }
    let journal_failed = report
        .pointer("/journal/status")
        .and_then(|s| s.as_str())
        == Some("FAIL");
    if journal_failed {
        std::process::exit(1);
    }
}
