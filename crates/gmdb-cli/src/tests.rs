use chrono::{Days, NaiveDate, Utc};
use gmdb_core::{BulletinWindow, MemoryStore, Metascore, ScoreRecord, SoftwareSale};
use gmdb_scraper::CrawlMode;

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("gmdb-cli-{name}-{}", std::process::id()))
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["gmdb-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_migrate_command() {
    let cli = Cli::try_parse_from(["gmdb-cli", "migrate"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Migrate)));
}

#[test]
fn crawl_bulletins_defaults_to_latest() {
    let cli = Cli::try_parse_from(["gmdb-cli", "crawl-bulletins"]).unwrap();
    let Some(Commands::CrawlBulletins {
        all_pages,
        page,
        poll,
    }) = cli.command
    else {
        panic!("expected crawl-bulletins");
    };
    assert_eq!(crawl::crawl_mode(all_pages, page, poll), CrawlMode::Latest);
}

#[test]
fn crawl_bulletins_flags_map_to_modes() {
    let cases: [(&[&str], CrawlMode); 3] = [
        (&["--all-pages"], CrawlMode::Full),
        (&["--page", "3"], CrawlMode::Page(3)),
        (&["--poll"], CrawlMode::Poll),
    ];
    for (flags, expected) in cases {
        let args = ["gmdb-cli", "crawl-bulletins"].into_iter().chain(flags.iter().copied());
        let cli = Cli::try_parse_from(args).unwrap();
        let Some(Commands::CrawlBulletins {
            all_pages,
            page,
            poll,
        }) = cli.command
        else {
            panic!("expected crawl-bulletins");
        };
        assert_eq!(crawl::crawl_mode(all_pages, page, poll), expected, "{flags:?}");
    }
}

#[test]
fn crawl_bulletins_flags_are_exclusive() {
    assert!(Cli::try_parse_from(["gmdb-cli", "crawl-bulletins", "--all-pages", "--poll"]).is_err());
    assert!(Cli::try_parse_from(["gmdb-cli", "crawl-bulletins", "--page", "2", "--poll"]).is_err());
    assert!(Cli::try_parse_from(["gmdb-cli", "crawl-bulletins", "--page", "0"]).is_err());
}

#[test]
fn report_defaults_to_current_directory() {
    let cli = Cli::try_parse_from(["gmdb-cli", "report"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Report { days: None, ref out }) if out == &PathBuf::from(".")
    ));

    let cli = Cli::try_parse_from(["gmdb-cli", "report", "--days", "30", "--out", "/tmp/x"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Report { days: Some(30), .. })
    ));
}

#[test]
fn clear_parses_collection() {
    let cli = Cli::try_parse_from(["gmdb-cli", "clear", "Scores"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Clear {
            collection: Collection::Scores
        })
    ));
    assert!(Cli::try_parse_from(["gmdb-cli", "clear", "everything"]).is_err());
}

#[tokio::test]
async fn export_scores_writes_dated_file() {
    let store = MemoryStore::new();
    store
        .upsert_score(&ScoreRecord {
            title: "Elden Ring".to_string(),
            release_date: NaiveDate::from_ymd_opt(2022, 2, 25),
            content_rating: "M".to_string(),
            score: Metascore::Scored(96),
        })
        .await
        .unwrap();

    let dir = temp_dir("scores");
    let path = export::write_scores(&store, &dir).await.unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("gmdb_scores_") && name.ends_with("_utc.csv"));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("Elden Ring,2022-02-25,M,96"));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn report_writes_recent_windows_only() {
    let today = Utc::now().date_naive();
    let window = |link: &str, end: NaiveDate, title: &str| BulletinWindow {
        link: link.to_string(),
        start_date: end - Days::new(6),
        end_date: end,
        software_sales: vec![SoftwareSale {
            platform: "NSW".to_string(),
            title: title.to_string(),
            publisher: None,
            release_date: None,
            weekly_units: Some(1_000),
            lifetime_units: None,
        }],
        hardware_sales: vec![],
        ingested_at: Utc::now(),
    };
    let store = MemoryStore::with_windows(vec![
        window("/recent", today - Days::new(3), "Fresh"),
        window("/stale", today - Days::new(200), "Stale"),
    ]);

    let dir = temp_dir("report");
    let path = export::write_report(&store, 90, &dir).await.unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("# software_sales\n"));
    assert!(contents.contains(",Fresh,"));
    assert!(!contents.contains("Stale"));
    std::fs::remove_dir_all(&dir).unwrap();
}
