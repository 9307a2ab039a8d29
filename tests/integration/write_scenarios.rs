use super::report;
use futures::future::join_all;
use safewrite::{identity, WriteError, WriteSerializer};
use tempfile::TempDir;
use tokio::sync::mpsc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn back_to_back_writes_complete_in_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a.txt");
    let serializer = WriteSerializer::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    serializer.submit(&path, "x", Some(report(&tx, 1))).await.unwrap();
    serializer.submit(&path, "y", Some(report(&tx, 2))).await.unwrap();

    let (first, first_result) = rx.recv().await.unwrap();
    let (second, second_result) = rx.recv().await.unwrap();
    assert_eq!((first, second), (1, 2));
    assert!(first_result.is_ok());
    assert!(second_result.is_ok());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "y");
}

#[tokio::test]
async fn write_to_missing_path_creates_it() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.txt");
    assert!(!path.exists());

    let serializer = WriteSerializer::new();
    serializer.write(&path, "data").await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "data");
    let id = identity::resolve(&path).await.unwrap();
    assert_eq!(identity::resolve(&path).await.unwrap(), id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn text_and_binary_share_one_queue() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("mixed.bin");
    let serializer = WriteSerializer::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let id = serializer
        .submit(&path, "text", Some(report(&tx, 1)))
        .await
        .unwrap();
    let id_bin = serializer
        .submit(&path, vec![0u8, 159, 146, 150], Some(report(&tx, 2)))
        .await
        .unwrap();
    assert_eq!(id, id_bin);

    assert_eq!(rx.recv().await.unwrap().0, 1);
    assert_eq!(rx.recv().await.unwrap().0, 2);
    assert_eq!(std::fs::read(&path).unwrap(), vec![0u8, 159, 146, 150]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_files_all_land() {
    let temp = TempDir::new().unwrap();
    let serializer = WriteSerializer::new();

    let writes = (0..16).map(|i| {
        let serializer = serializer.clone();
        let path = temp.path().join(format!("file-{}.txt", i));
        async move {
            serializer.write(&path, format!("content {}", i)).await?;
            Ok::<_, WriteError>(path)
        }
    });

    for (i, result) in join_all(writes).await.into_iter().enumerate() {
        let path = result.unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("content {}", i)
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_write_is_delivered_to_callback() {
    let temp = TempDir::new().unwrap();
    // A directory resolves to an identity but cannot be written as a file.
    let dir_target = temp.path().join("not_a_file");
    std::fs::create_dir(&dir_target).unwrap();
    let serializer = WriteSerializer::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    serializer
        .submit(&dir_target, "data", Some(report(&tx, 1)))
        .await
        .unwrap();

    let (label, result) = rx.recv().await.unwrap();
    assert_eq!(label, 1);
    assert!(matches!(result, Err(WriteError::Io { .. })));

    let err = serializer.write(&dir_target, "again").await.unwrap_err();
    assert!(matches!(err, WriteError::Io { .. }));
}
