//! Integration tests exercising `ByteMap` through files on disk, the mmap
//! reader, and property-style random workloads.

use std::collections::BTreeMap;

use mapbufr::bytemap::{ByteMapReader, ByteMapWriter};
use mapbufr::{MapbufrError, Method};
use proptest::prelude::*;
use tempfile::NamedTempFile;

#[test]
fn ten_thousand_random_entries_round_trip() {
    // A cheap, seedless LCG stands in for a full proptest run here so the
    // key set and value sizes are both large and reproducible.
    let mut state = 0x9E3779B97F4A7C15u64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let mut model: BTreeMap<u64, Vec<u8>> = BTreeMap::new();
    while model.len() < 10_000 {
        let key = next();
        let len = (next() % 64) as usize;
        let value: Vec<u8> = (0..len).map(|_| (next() % 256) as u8).collect();
        model.insert(key, value);
    }

    let bytes = ByteMapWriter::default()
        .build_bytes(model.iter().map(|(k, v)| (*k, v.clone())))
        .unwrap();
    let reader = ByteMapReader::from_bytes(bytes);
    assert_eq!(reader.len().unwrap(), model.len());
    reader.validate().unwrap();

    for (key, value) in &model {
        assert_eq!(&reader.get(*key).unwrap(), value);
    }

    let mut seen: Vec<u64> = reader.keys().unwrap().collect();
    seen.sort_unstable();
    let mut expected: Vec<u64> = model.keys().copied().collect();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

#[test]
fn mmap_reader_opens_a_file_written_to_disk() {
    let bytes = ByteMapWriter::new(Method::Zstd)
        .build_bytes([(1u64, b"alpha".to_vec()), (2u64, b"beta".to_vec()), (3u64, b"gamma".to_vec())])
        .unwrap();

    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), &bytes).unwrap();

    let reader = ByteMapReader::open(file.path()).unwrap();
    assert_eq!(reader.get(1).unwrap(), b"alpha");
    assert_eq!(reader.get(2).unwrap(), b"beta");
    assert_eq!(reader.get(3).unwrap(), b"gamma");
    reader.validate().unwrap();
}

#[test]
fn empty_map_round_trips_through_a_file() {
    let bytes = ByteMapWriter::default().build_bytes(Vec::<(u64, Vec<u8>)>::new()).unwrap();
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), &bytes).unwrap();

    let reader = ByteMapReader::open(file.path()).unwrap();
    assert!(reader.is_empty().unwrap());
    reader.validate().unwrap();
}

#[test]
fn compression_is_transparent_to_callers() {
    let payload = b"the quick brown fox jumps over the lazy dog".repeat(8);
    for method in Method::ALL {
        let bytes = ByteMapWriter::new(method).build_bytes([(42u64, payload.clone())]).unwrap();
        let reader = ByteMapReader::from_bytes(bytes);
        assert_eq!(reader.get(42).unwrap(), payload);
    }
}

#[test]
fn format_version_0_carries_no_checksum_trailer_and_still_round_trips() {
    let bytes =
        ByteMapWriter::default().without_checksum().build_bytes([(1u64, b"no-crc".to_vec())]).unwrap();
    let reader = ByteMapReader::from_bytes(bytes);
    assert_eq!(reader.get(1).unwrap(), b"no-crc");
    assert!(!reader.header().unwrap().has_checksum());
}

#[test]
fn corrupting_the_index_key_breaks_eytzinger_validation() {
    let bytes = ByteMapWriter::default()
        .build_bytes((0u64..64).map(|k| (k, vec![k as u8])))
        .unwrap();
    let header = mapbufr::bytemap::Header::parse(&bytes).unwrap();
    let index_start = header.index_start() as usize;

    let mut corrupted = bytes.clone();
    // Flip the on-disk key of the first index slot; this desyncs the
    // Eytzinger ordering invariant without touching any offset.
    corrupted[index_start] ^= 0xFF;
    let reader = ByteMapReader::from_bytes(corrupted);
    assert!(matches!(reader.validate(), Err(MapbufrError::ValidationError(_))));
}

proptest! {
    #[test]
    fn arbitrary_key_sets_round_trip(
        keys in prop::collection::btree_set(any::<u64>(), 1..64),
    ) {
        let entries: Vec<(u64, Vec<u8>)> =
            keys.iter().map(|&k| (k, k.to_le_bytes().to_vec())).collect();
        let bytes = ByteMapWriter::default().build_bytes(entries.clone()).unwrap();
        let reader = ByteMapReader::from_bytes(bytes);
        for (key, value) in &entries {
            prop_assert_eq!(&reader.get(*key).unwrap(), value);
        }
    }
}
