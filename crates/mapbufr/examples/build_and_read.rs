//! Build a small ByteMap in memory, write it to a temp file, and reopen it
//! through the mmap reader — the write-once/read-many lifecycle the format
//! is designed around.

use mapbufr::bytemap::{ByteMapReader, ByteMapWriter};
use mapbufr::Method;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let entries = [
        (1u64, b"hello".to_vec()),
        (2u64, b"world".to_vec()),
        (42u64, b"the answer".to_vec()),
    ];
    let bytes = ByteMapWriter::new(Method::Zstd).build_bytes(entries)?;

    let path = std::env::temp_dir().join("mapbufr-build-and-read-example.mapbufr");
    std::fs::write(&path, &bytes)?;

    let reader = ByteMapReader::open(&path)?;
    println!("entries: {}", reader.len()?);
    for key in [1u64, 2, 42] {
        let value = reader.get(key)?;
        println!("{key} -> {}", String::from_utf8_lossy(&value));
    }
    reader.validate()?;

    std::fs::remove_file(&path)?;
    Ok(())
}
