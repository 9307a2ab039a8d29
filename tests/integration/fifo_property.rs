use super::report;
use proptest::prelude::*;
use safewrite::WriteSerializer;
use tempfile::TempDir;
use tokio::sync::mpsc;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn same_file_callbacks_follow_submission_order(
        payloads in prop::collection::vec("[a-z0-9]{0,24}", 1..12)
    ) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();

        let (order, content) = runtime.block_on(async {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("target.txt");
            let serializer = WriteSerializer::new();
            let (tx, mut rx) = mpsc::unbounded_channel();

            for (i, payload) in payloads.iter().enumerate() {
                serializer
                    .submit(&path, payload.as_str(), Some(report(&tx, i)))
                    .await
                    .unwrap();
            }

            let mut order = Vec::new();
            for _ in 0..payloads.len() {
                let (label, result) = rx.recv().await.unwrap();
                assert!(result.is_ok());
                order.push(label);
            }
            (order, std::fs::read_to_string(&path).unwrap())
        });

        prop_assert_eq!(order, (0..payloads.len()).collect::<Vec<_>>());
        prop_assert_eq!(&content, payloads.last().unwrap());
    }
}
