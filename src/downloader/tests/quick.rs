use super::*;

#[tokio::test]
async fn test_quick_download_never_touches_task_state() {
    let h = create_test_harness().await;
    h.executor.set_script(TransferScript {
        progress: vec![(50.0, "[download]  50.0% of 10.00MiB at 1.00MiB/s ETA 00:05")],
        create_files: vec!["Test_Video [0-0].mp4".to_string()],
        ..Default::default()
    });
    let mut task_updates = h.downloader.subscribe_task();

    let files = h
        .downloader
        .download_from_shared(TEST_URL, None)
        .unwrap()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(h.downloader.task(), TaskState::default());
    assert!(task_updates.try_recv().is_err(), "no task updates from the quick lane");
    assert_eq!(h.downloader.state(), EngineState::Idle);

    let percents: Vec<u8> = h.notifier.progress().iter().map(|p| p.percent).collect();
    assert_eq!(percents, vec![0, 50]);
    let finishes = h.notifier.finishes();
    assert_eq!(finishes.len(), 1);
    assert!(finishes[0].open_target.is_some());
}

#[tokio::test]
async fn test_quick_counter_covers_whole_run() {
    let h = create_test_harness().await;
    h.executor.set_script(TransferScript {
        wait_for_cancel: true,
        ..Default::default()
    });

    let handle = h.downloader.download_from_shared(TEST_URL, None).unwrap();
    // Incremented before download_from_shared returns
    assert_eq!(h.downloader.status().quick_downloads, 1);
    assert!(h.downloader.is_busy());

    wait_for_transfer(&h, &default_task_id()).await;
    h.downloader.cancel(&default_task_id());
    handle.await.unwrap().unwrap_err();

    assert_eq!(h.downloader.status().quick_downloads, 0);
    assert!(!h.downloader.is_busy());
}

#[tokio::test]
async fn test_quick_downloads_run_alongside_named() {
    let h = create_test_harness().await;
    let second_url = "https://video.example.com/watch?v=def456";
    h.executor
        .with_metadata(second_url, metadata_json("def456", "Other Video", "vp9"));
    h.executor.set_script(TransferScript {
        wait_for_cancel: true,
        ..Default::default()
    });

    h.downloader.set_pending_url(TEST_URL);
    let StartOutcome::Started(named) = h.downloader.start_named_download() else {
        panic!("start rejected");
    };
    let quick = h.downloader.download_from_shared(second_url, None).unwrap();

    let named_id = default_task_id();
    let quick_id = TaskId::derive("def456", &DownloadOptions::default());
    wait_for_transfer(&h, &named_id).await;
    wait_for_transfer(&h, &quick_id).await;

    assert_eq!(h.downloader.state(), EngineState::Downloading);
    assert_eq!(h.downloader.status().quick_downloads, 1);
    assert_ne!(
        NotificationId::for_task(&named_id),
        NotificationId::for_task(&quick_id)
    );

    h.downloader.cancel(&quick_id);
    quick.await.unwrap().unwrap_err();
    assert_eq!(h.downloader.state(), EngineState::Downloading, "named lane unaffected");
    assert_eq!(h.downloader.task().id, named_id.to_string());

    h.downloader.cancel(&named_id);
    named.await.unwrap().unwrap_err();
    assert!(!h.downloader.is_busy());
}

#[tokio::test]
async fn test_quick_resolution_failure_is_logged_not_notified() {
    let h = create_test_harness().await;
    let mut events = h.downloader.subscribe();

    let result = h
        .downloader
        .download_from_shared("https://unknown.example.com/x", None)
        .unwrap()
        .await
        .unwrap();

    assert!(matches!(
        result,
        Err(Error::Download(DownloadError::ResolutionFailed { .. }))
    ));
    assert!(h.notifier.calls().is_empty());
    assert_eq!(h.downloader.status().quick_downloads, 0);
    assert!(drain_events(&mut events).iter().any(|event| matches!(
        event,
        crate::types::Event::DownloadFailed {
            lane: Lane::Quick,
            ..
        }
    )));
}

#[tokio::test]
async fn test_quick_download_rejected_after_shutdown() {
    let h = create_test_harness().await;
    h.downloader.shutdown().await.unwrap();

    let result = h.downloader.download_from_shared(TEST_URL, None);
    assert!(matches!(result, Err(Error::ShuttingDown)));
    assert_eq!(h.downloader.status().quick_downloads, 0);
}
