use proptest::prelude::*;
use sha2::{Digest, Sha256};
use qrft_core::header::read_header;
use qrft_core::merge::{merge_fragments, MergeConfig};
use qrft_core::split::{expected_fragments, SplitConfig, Splitter};
use qrft_core::value::{join_bytes, split_bytes};
use std::io::Cursor;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn split_then_merge_is_identity(
        data in proptest::collection::vec(any::<u8>(), 0..6000),
        chunks in 2usize..24,
    ) {
        let td = tempfile::tempdir().unwrap();
        let report = Splitter::split_stream(
            Cursor::new(&data),
            data.len() as u64,
            "prop.bin",
            td.path(),
            &SplitConfig::with_chunks(chunks),
        )
        .unwrap();
        let expected = expected_fragments(data.len() as u64, chunks);
        prop_assert_eq!(report.fragments.len() as u64, expected);

        let meta = read_header(&report.fragments[0]).unwrap();
        let digest: [u8; 32] = Sha256::digest(&data).into();
        prop_assert_eq!(meta.hash, digest);
        prop_assert_eq!(meta.size, data.len() as i64);

        let merged = merge_fragments(td.path(), &MergeConfig::default()).unwrap();
        prop_assert_eq!(std::fs::read(&merged.output).unwrap(), data);
        prop_assert!(report.fragments.iter().all(|p| !p.exists()));
    }

    #[test]
    fn byte_split_partitions_exactly(
        data in proptest::collection::vec(any::<u8>(), 0..512),
        chunks in 2usize..40,
    ) {
        let parts = split_bytes(&data, chunks).unwrap();
        prop_assert_eq!(parts.len(), chunks);
        let part = if data.is_empty() { 0 } else { (data.len() / chunks).max(1) };
        for p in &parts[..chunks - 1] {
            prop_assert!(p.len() == part || p.is_empty());
        }
        prop_assert_eq!(join_bytes(&parts).unwrap(), data);
    }
}
