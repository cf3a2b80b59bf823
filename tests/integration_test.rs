//! Integration tests for arith-coder

use arith_coder::config::{CoderConfig, ModelFormat};
use arith_coder::error::CoderError;
use arith_coder::packing::{CodeFile, WordPacker};
use arith_coder::*;

#[test]
fn test_full_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let coder = Coder::default();
    let text = "the quick brown fox jumps over the lazy dog ".repeat(5);

    let (model, code) = coder.train_encode(&text).unwrap();
    coder.save_model(&model, dir.path().join("stat.bin")).unwrap();
    coder.write_code(&code, dir.path().join("file.bin")).unwrap();

    let model = coder.load_model(dir.path().join("stat.bin")).unwrap();
    let code = coder.read_code(dir.path().join("file.bin")).unwrap();
    assert_eq!(coder.decode(&code, &model).unwrap(), text);
}

#[test]
fn test_single_char_through_code_file() {
    let dir = tempfile::tempdir().unwrap();
    let coder = Coder::default();
    let (model, code) = coder.train_encode("b").unwrap();
    assert_eq!(code.to_string(), "011");

    let file = CodeFile::new(dir.path().join("file.bin"));
    file.write(&code).unwrap();
    let read = file.read().unwrap();
    assert_eq!(read.len(), 31);
    assert_eq!(coder.decode(&read, &model).unwrap(), "b");
}

#[test]
fn test_word_boundaries() {
    let packer = WordPacker::default();
    let coder = Coder::default();
    // codes around the 31-bit window edge
    for text in ["abcabcabcab", "zyxwvutsrqponmlkjihgfedcba", "hello, world"] {
        let (model, code) = coder.train_encode(text).unwrap();
        let unpacked = packer.unpack(&packer.pack(&code)).unwrap();
        assert_eq!(unpacked.len() % 31, 0);
        assert_eq!(coder.decode(&unpacked, &model).unwrap(), text);
    }
}

#[test]
fn test_json_model_and_narrow_words() {
    let dir = tempfile::tempdir().unwrap();
    let coder = Coder::new(CoderConfig {
        terminator: '~',
        word_payload_bits: 16,
        model_format: ModelFormat::Json,
    });
    let text = "mississippi river";
    let (model, code) = coder.train_encode(text).unwrap();
    coder.save_model(&model, dir.path().join("stat.json")).unwrap();
    coder.write_code(&code, dir.path().join("code.bin")).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("stat.json")).unwrap();
    assert!(raw.contains("terminator"));

    let model = coder.load_model(dir.path().join("stat.json")).unwrap();
    let code = coder.read_code(dir.path().join("code.bin")).unwrap();
    assert_eq!(code.len() % 16, 0);
    assert_eq!(coder.decode(&code, &model).unwrap(), text);
}

#[test]
fn test_unicode_text() {
    let coder = Coder::default();
    let text = "naïve café · 日本語 ΔΕΛΤΑ";
    let (model, code) = coder.train_encode(text).unwrap();
    assert_eq!(coder.decode(&code, &model).unwrap(), text);
}

#[test]
fn test_skewed_distribution_compresses() {
    let coder = Coder::default();
    let text = "aaaaaaaaab";
    let (model, code) = coder.train_encode(text).unwrap();
    assert!(code.len() < text.len() * 8);
    assert_eq!(coder.decode(&code, &model).unwrap(), text);
}

#[test]
fn test_code_grows_sublinearly_for_skewed_text() {
    let coder = Coder::default();
    let short = "aaaaaaaaab".repeat(4);
    let long = "aaaaaaaaab".repeat(16);
    let (_, short_code) = coder.train_encode(&short).unwrap();
    let (_, long_code) = coder.train_encode(&long).unwrap();
    // roughly half a bit per symbol, far below eight
    assert!(long_code.len() < long.len());
    assert!(short_code.len() < long_code.len());
}

#[test]
fn test_generic_byte_symbols() {
    let data: Vec<u8> = (0u8..=200).chain((0u8..50).rev()).collect();
    // 255 never occurs in the data
    let model = Model::train(data.iter().copied(), 255u8);
    let code = encode(data.iter().copied(), &model).unwrap();
    let decoded = decode(&code, &model).unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn test_compressed_output_serializes() {
    let coder = Coder::default();
    let output = coder.compress("serialize this container").unwrap();
    let bytes = bincode::serialize(&output).unwrap();
    let restored: CompressedOutput = bincode::deserialize(&bytes).unwrap();
    assert_eq!(restored.code_bits, output.code_bits);
    assert_eq!(
        coder.decompress(&restored).unwrap(),
        "serialize this container"
    );
}

#[test]
fn test_metadata_populated() {
    let coder = Coder::default();
    let output = coder.compress("metadata test data here").unwrap();
    assert!(output.metadata.entropy_bits > 0.0);
    assert_eq!(output.metadata.symbol_count, 23);
    assert_eq!(output.code_bits.div_ceil(8), output.compressed_size);
}

#[test]
fn test_unknown_symbol_error() {
    let coder = Coder::default();
    let model = coder.train("abc");
    let result = coder.encode("abz", &model);
    assert!(matches!(result, Err(CoderError::UnknownSymbol { .. })));
}

#[test]
fn test_other_model_never_hangs() {
    let coder = Coder::default();
    let (_, code) = coder.train_encode("compression").unwrap();
    let other = coder.train("decompression");
    match coder.decode(&code, &other) {
        Ok(text) => assert_ne!(text, "compression"),
        Err(e) => assert!(matches!(
            e,
            CoderError::MissingTerminator { .. } | CoderError::ValueOutOfRange { .. }
        )),
    }
}

#[test]
fn test_long_text_roundtrip() {
    let coder = Coder::default();
    let alphabet: Vec<char> = "etaoin shrdlu".chars().collect();
    let text: String = (0..5000)
        .map(|i| alphabet[(i * 7 + i / 13) % alphabet.len()])
        .collect();
    let (model, code) = coder.train_encode(&text).unwrap();
    assert_eq!(coder.decode(&code, &model).unwrap(), text);

    // exact arithmetic stays within two bits of the information content
    let total = (text.chars().count() + 1) as f64;
    let info: f64 = model
        .entries()
        .map(|(symbol, _)| {
            let count = if *symbol == '\0' {
                1
            } else {
                text.chars().filter(|c| c == symbol).count()
            };
            -(count as f64) * (count as f64 / total).log2()
        })
        .sum();
    assert!((code.len() as f64) <= info.ceil() + 2.0);
}
