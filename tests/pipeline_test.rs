//! End-to-end pipeline: input CSV, filter, run, output dataset

mod common;

use common::{fast_config, watch_url, FakePage, FakeSurface};
use std::fs;
use tempfile::TempDir;
use tokio::sync::watch;
use tubecomments::config::FilterBounds;
use tubecomments::crawler::run_session;
use tubecomments::filter::filter;
use tubecomments::storage::{load_videos, output_path, write_comments, CheckpointManager};

fn input_csv(rows: &[(usize, &str, &str)]) -> String {
    let mut csv = String::from("\u{feff}No.,날짜,채널명,제목,URL,댓글 수,좋아요 수,조회수\n");
    for (no, url, views) in rows {
        csv.push_str(&format!(
            "{no},2024-05-0{no},테스트채널,영상 {no},{url},\"1,200\",30,\"{views}\"\n"
        ));
    }
    csv
}

#[tokio::test]
async fn test_full_run_writes_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let config = fast_config(temp_dir.path());

    let (a, b, c) = (watch_url("aaa"), watch_url("bbb"), watch_url("ccc"));
    let input = temp_dir.path().join("videos.csv");
    fs::write(
        &input,
        input_csv(&[
            (1, a.as_str(), "10,000"),
            (2, b.as_str(), "120"),
            (3, c.as_str(), "2,500"),
        ]),
    )
    .unwrap();

    let videos = load_videos(&input).unwrap();
    assert_eq!(videos.len(), 3);

    let bounds = FilterBounds {
        min_views: Some(500),
        ..FilterBounds::default()
    };
    let (videos, report) = filter(videos, &bounds);
    assert_eq!(report.kept, 2);

    let surface = FakeSurface::new()
        .with_page(&a, FakePage::with_schedule(vec![2, 3]))
        .with_page(&c, FakePage::unavailable());

    let (_tx, rx) = watch::channel(false);
    let progress = run_session(&surface, &config, &videos, rx).await;

    // the filtered-out video is never rendered
    assert!(!surface.navigations().contains(&b));
    assert_eq!(progress.total_comments(), 3);
    assert_eq!(progress.failed_videos.len(), 1);

    let at = chrono::Local::now();
    let path = output_path(&config.run.output_dir, &at);
    let rows = write_comments(&path, &progress.accumulated_records).unwrap();
    assert_eq!(rows, 3);

    let bytes = fs::read(&path).unwrap();
    let text = String::from_utf8_lossy(&bytes[3..]).into_owned();
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

    assert_eq!(records.len(), 3);
    assert_eq!(&records[0][0], "1");
    assert_eq!(&records[0][2], "테스트채널");
    assert_eq!(&records[0][4], a.as_str());
    assert_eq!(&records[0][5], "1,200");
    assert_eq!(&records[2][8], "3");

    assert!(CheckpointManager::new(&config.run.checkpoint_path).exists());
}

#[tokio::test]
async fn test_everything_filtered_out() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("videos.csv");
    fs::write(&input, input_csv(&[(1, watch_url("x").as_str(), "10")])).unwrap();

    let videos = load_videos(&input).unwrap();
    let (videos, report) = filter(videos, &FilterBounds::production());

    assert!(videos.is_empty());
    assert_eq!(report.removed(), 1);
}
