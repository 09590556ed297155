//! CSV ledger behavior through the public store API.

use harvester::{CsvHistory, HistoryStore, Posting, RunStamp};

fn stamp(time: &str) -> RunStamp {
    RunStamp {
        date: "2025-05-04".to_string(),
        time: time.to_string(),
    }
}

fn accepted(url: &str, title: &str, company: &str, time: &str) -> harvester::AcceptedPosting {
    Posting::new(url, title)
        .with_company(company)
        .with_location("Pune")
        .accepted_at(&stamp(time))
}

#[tokio::test]
async fn ledger_layout_is_header_then_stamped_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.csv");
    let store = CsvHistory::open(&path).await.unwrap();

    store
        .append_run(
            &stamp("09:00:00"),
            &[accepted("https://jobs.example/1", "Data Engineer", "Acme", "09:00:00")],
        )
        .await
        .unwrap();
    store
        .append_run(
            &stamp("10:00:00"),
            &[accepted("https://jobs.example/2", "ML Engineer", "Beta", "10:00:00")],
        )
        .await
        .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = contents.lines().collect();

    assert_eq!(
        lines[0],
        "\"job_url\",\"title\",\"company\",\"location\",\"scrape_date\",\"scrape_time\""
    );
    assert_eq!(lines[1], "# Jobs Scraped at : , #, 2025-05-04, 09:00:00");
    assert_eq!(
        lines[2],
        "\"https://jobs.example/1\",\"Data Engineer\",\"Acme\",\"Pune\",\"2025-05-04\",\"09:00:00\""
    );
    assert_eq!(lines[3], "# Jobs Scraped at : , #, 2025-05-04, 10:00:00");
    assert!(lines[4].starts_with("\"https://jobs.example/2\""));
    assert_eq!(lines.len(), 5);
}

#[tokio::test]
async fn awkward_field_values_round_trip_through_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.csv");
    let store = CsvHistory::open(&path).await.unwrap();

    store
        .append_run(
            &stamp("09:00:00"),
            &[
                accepted(
                    "https://jobs.example/1",
                    "Engineer, \"Data\" Platform",
                    "Acme \\ Co",
                    "09:00:00",
                ),
                accepted(
                    "https://jobs.example/2",
                    "ML Engineer\nNight Shift",
                    "Beta",
                    "09:00:00",
                ),
            ],
        )
        .await
        .unwrap();

    let urls = store.read_existing_urls().await.unwrap();
    assert!(urls.contains("https://jobs.example/1"));
    assert!(urls.contains("https://jobs.example/2"));

    // The embedded newline collapsed, so the file stays line-oriented:
    // header, separator, two records.
    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 4);
}

#[tokio::test]
async fn remove_company_drops_records_but_keeps_structure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.csv");
    let store = CsvHistory::open(&path).await.unwrap();

    store
        .append_run(
            &stamp("09:00:00"),
            &[
                accepted("https://jobs.example/1", "Data Engineer", "Acme", "09:00:00"),
                accepted("https://jobs.example/2", "ML Engineer", "Acme", "09:00:00"),
                accepted("https://jobs.example/3", "AI Engineer", "Beta", "09:00:00"),
            ],
        )
        .await
        .unwrap();

    let removed = store.remove_company("Acme").await.unwrap();
    assert_eq!(removed, 2);

    let urls = store.read_existing_urls().await.unwrap();
    assert_eq!(urls.len(), 1);
    assert!(urls.contains("https://jobs.example/3"));

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.lines().next().unwrap().contains("job_url"));
    assert!(contents.contains("# Jobs Scraped at : , #, 2025-05-04, 09:00:00"));
}

#[tokio::test]
async fn dropping_the_store_releases_the_ledger_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.csv");

    let first = CsvHistory::open(&path).await.unwrap();
    first
        .append_run(
            &stamp("09:00:00"),
            &[accepted("https://jobs.example/1", "Data Engineer", "Acme", "09:00:00")],
        )
        .await
        .unwrap();
    drop(first);

    let second = CsvHistory::open(&path).await.unwrap();
    let urls = second.read_existing_urls().await.unwrap();
    assert!(urls.contains("https://jobs.example/1"));
}

#[tokio::test]
async fn reading_a_record_written_by_a_collaborator_with_padding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.csv");
    // Collaborator-style file: padded header, an unquoted field, comments.
    std::fs::write(
        &path,
        "job_url, title, company, location, scrape_date, scrape_time\n\
         # Jobs Scraped at : , #, 2025-05-03, 20:00:00\n\
         \"https://jobs.example/9\", \"Data Engineer\", Acme, Pune, 2025-05-03, 20:00:00\n",
    )
    .unwrap();

    let store = CsvHistory::open(&path).await.unwrap();
    let urls = store.read_existing_urls().await.unwrap();
    assert_eq!(urls.len(), 1);
    assert!(urls.contains("https://jobs.example/9"));
}

#[tokio::test]
async fn doubled_quote_escapes_from_a_collaborator_stay_deduplicated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.csv");
    // Collaborator-written files double embedded quotes rather than
    // backslash-escaping them. Those records must still feed the dedup set,
    // or their postings would be accepted a second time.
    std::fs::write(
        &path,
        "\"job_url\",\"title\",\"company\",\"location\",\"scrape_date\",\"scrape_time\"\n\
         # Jobs Scraped at : , #, 2025-05-03, 20:00:00\n\
         \"https://jobs.example/legacy\",\"Data \"\"Engineer\"\"\",\"Acme\",\"Pune\",\"2025-05-03\",\"20:00:00\"\n\
         \"https://jobs.example/plain\",\"ML Engineer\",\"Beta\",\"Remote\",\"2025-05-03\",\"20:00:00\"\n",
    )
    .unwrap();

    let store = CsvHistory::open(&path).await.unwrap();
    let urls = store.read_existing_urls().await.unwrap();
    assert_eq!(urls.len(), 2);
    assert!(urls.contains("https://jobs.example/legacy"));
    assert!(urls.contains("https://jobs.example/plain"));
}
