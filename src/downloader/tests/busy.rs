use super::*;

#[tokio::test]
async fn test_service_started_and_stopped_once_per_busy_period() {
    let h = create_test_harness().await;
    let second_url = "https://video.example.com/watch?v=def456";
    h.executor
        .with_metadata(second_url, metadata_json("def456", "Other Video", "vp9"));
    h.executor.set_script(TransferScript {
        wait_for_cancel: true,
        ..Default::default()
    });

    // Overlapping named + two quick downloads form a single busy period
    h.downloader.set_pending_url(TEST_URL);
    let StartOutcome::Started(named) = h.downloader.start_named_download() else {
        panic!("start rejected");
    };
    let quick_a = h.downloader.download_from_shared(second_url, None).unwrap();
    let audio = DownloadOptions {
        extract_audio: true,
        ..Default::default()
    };
    let quick_b = h
        .downloader
        .download_from_shared(second_url, Some(audio))
        .unwrap();

    let ids = [
        default_task_id(),
        TaskId::derive("def456", &DownloadOptions::default()),
        TaskId::derive("def456", &audio),
    ];
    for id in &ids {
        wait_for_transfer(&h, id).await;
    }
    wait_until(|| h.lifecycle.calls() == vec!["start"]).await;

    for id in &ids {
        h.downloader.cancel(id);
    }
    named.await.unwrap().unwrap_err();
    quick_a.await.unwrap().unwrap_err();
    quick_b.await.unwrap().unwrap_err();

    wait_until(|| h.lifecycle.calls() == vec!["start", "stop"]).await;
    assert!(!h.downloader.is_busy());
}

#[tokio::test]
async fn test_busy_edges_for_sequential_downloads() {
    let h = create_test_harness().await;
    let mut busy_events = h.downloader.subscribe();

    for _ in 0..3 {
        h.downloader
            .download_from_shared(TEST_URL, None)
            .unwrap()
            .await
            .unwrap()
            .unwrap();
    }

    wait_until(|| h.lifecycle.calls().len() == 6).await;
    assert_eq!(
        h.lifecycle.calls(),
        vec!["start", "stop", "start", "stop", "start", "stop"]
    );

    let edges: Vec<bool> = drain_events(&mut busy_events)
        .into_iter()
        .filter_map(|event| match event {
            crate::types::Event::BusyChanged { busy } => Some(busy),
            _ => None,
        })
        .collect();
    assert_eq!(edges, vec![true, false, true, false, true, false]);
}

#[tokio::test]
async fn test_rejected_start_does_not_touch_busy() {
    let h = create_test_harness().await;

    h.downloader.set_pending_url("");
    assert!(!h.downloader.start_named_download().is_started());

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(h.lifecycle.calls().is_empty());
    assert!(!h.downloader.is_busy());
}
