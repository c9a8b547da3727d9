use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
};

use bcp_huffman::{
    container::EXTENSION,
    io::{ensure_distinct, FixedMemory, SystemMemory},
    Compressor, Decompressor, EngineConfig, Error, Parallel, Sequential,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn text_like(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(42);
    let words: [&[u8]; 6] = [b"the ", b"quick ", b"brown ", b"fox ", b"jumps\n", b"over "];

    let mut data = Vec::with_capacity(len);
    while data.len() < len {
        data.extend_from_slice(words[rng.gen_range(0..words.len())]);
    }
    data.truncate(len);
    data
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("words.txt");
    let packed = dir.path().join("words.bcp");
    let data = text_like(300_000);
    fs::write(&input, &data).unwrap();

    let config = EngineConfig {
        compress_macrochunk_max: 64 * 1024,
        decompress_macrochunk_max: 10_000,
        ..Default::default()
    };

    let report = {
        let mut source = BufReader::new(File::open(&input).unwrap());
        let mut sink = BufWriter::new(File::create(&packed).unwrap());
        let report = Compressor::new(Sequential, config.clone())
            .compress(&mut source, "words.txt", &mut SystemMemory::new(), &mut sink)
            .unwrap();
        sink.flush().unwrap();
        report
    };

    assert_eq!(report.input_bytes, data.len() as u64);
    assert_eq!(report.output_bytes, fs::metadata(&packed).unwrap().len());
    // 22 distinct bytes never need more than 5 bits each.
    assert!(report.output_bytes < report.input_bytes * 3 / 4);

    let mut source = BufReader::new(File::open(&packed).unwrap());
    let decompressor = Decompressor::open(&mut source, config).unwrap();
    assert_eq!(decompressor.header().filename, "words.txt");

    let mut restored = Vec::new();
    let report = decompressor.decode_into(&mut restored).unwrap();

    assert_eq!(report.output_bytes, data.len() as u64);
    assert_eq!(restored, data);
}

#[test]
fn test_parallel_file_matches_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let packed = dir.path().join("blob.bcp");
    let data = text_like(120_000);

    let config = EngineConfig { threads: 3, parallel_grain: 1024, ..Default::default() };
    let compressor = Compressor::new(Parallel::from_config(&config).unwrap(), config);

    let mut sink = File::create(&packed).unwrap();
    compressor
        .compress(&mut std::io::Cursor::new(&data), "blob", &mut FixedMemory(1 << 18), &mut sink)
        .unwrap();
    drop(sink);

    let on_disk = fs::read(&packed).unwrap();
    assert_eq!(on_disk, bcp_huffman::compress_bytes(&data, "blob").unwrap());
    assert_eq!(bcp_huffman::decompress_bytes(&on_disk).unwrap().1, data);
}

#[test]
fn test_not_a_container() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.txt");
    fs::write(&path, b"definitely not compressed").unwrap();

    let mut source = File::open(&path).unwrap();
    assert!(matches!(
        Decompressor::open(&mut source, EngineConfig::default()),
        Err(Error::Format(_))
    ));
}

#[test]
fn test_container_named_like_its_output_is_left_intact() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.bcp");
    let container = bcp_huffman::compress_bytes(b"thirty-three bytes of plain text!", "notes.txt").unwrap();
    fs::write(&input, &container).unwrap();

    // Compressing `notes.bcp` would write `notes.bcp` again.
    let output = dir.path().join(input.file_name().unwrap()).with_extension(EXTENSION);
    assert!(matches!(
        ensure_distinct(&input, &output),
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::AlreadyExists
    ));

    // A container whose stored name is its own file name restores onto itself too.
    let self_named = dir.path().join("self.bin");
    fs::write(&self_named, bcp_huffman::compress_bytes(b"xyz", "self.bin").unwrap()).unwrap();
    let (header, _) = bcp_huffman::decompress_bytes(&fs::read(&self_named).unwrap()).unwrap();
    assert!(ensure_distinct(&self_named, &dir.path().join(&header.filename)).is_err());

    assert_eq!(fs::read(&input).unwrap(), container);
    assert_eq!(bcp_huffman::decompress_bytes(&container).unwrap().1, b"thirty-three bytes of plain text!");
}
