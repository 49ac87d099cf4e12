//! Subcommand implementations.
//!
//! Each command writes its report to `out` so it can run against a buffer
//! in tests.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use log::{info, warn};
use model_blob::{Element, ElementKind, Framing, Layout, ModelBlob};
use model_blob_buffers::print_octets;
use model_blob_langid::Model;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::LayoutConfig;

/// Picks the concrete element types for a runtime float/int pair.
macro_rules! with_kinds {
    (@int $float:ty, $int:expr, $func:ident($($arg:expr),*)) => {
        match $int {
            ElementKind::I16 => $func::<$float, i16>($($arg),*),
            ElementKind::U16 => $func::<$float, u16>($($arg),*),
            ElementKind::I32 => $func::<$float, i32>($($arg),*),
            ElementKind::U32 => $func::<$float, u32>($($arg),*),
            ElementKind::I64 => $func::<$float, i64>($($arg),*),
            other => Err(anyhow!("{} is not an integer element type", other)),
        }
    };
    ($float:expr, $int:expr, $func:ident($($arg:expr),*)) => {
        match $float {
            ElementKind::F32 => with_kinds!(@int f32, $int, $func($($arg),*)),
            ElementKind::F64 => with_kinds!(@int f64, $int, $func($($arg),*)),
            other => Err(anyhow!("{} is not a float element type", other)),
        }
    };
}

/// Reads a JSON blob from `input` and writes it to `output`.
///
/// A partially written output file is removed.
pub fn encode(input: &Path, output: &Path, config: &LayoutConfig) -> anyhow::Result<()> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let layout = config.layout();
    with_kinds!(config.float, config.int, encode_as(&json, output, layout))
}

fn encode_as<F, I>(json: &str, output: &Path, layout: Layout) -> anyhow::Result<()>
where
    F: Element + DeserializeOwned,
    I: Element + DeserializeOwned,
{
    let blob: ModelBlob<F, I> = serde_json::from_str(json).context("invalid blob JSON")?;
    if blob.vector.len() != blob.matrix.rows() {
        info!(
            "vector has {} elements for {} matrix rows; writing as given",
            blob.vector.len(),
            blob.matrix.rows()
        );
    }
    if let Err(err) = model_blob::write_file(output, &blob, layout) {
        if output.is_file() {
            remove_partial(output);
        }
        return Err(err).with_context(|| format!("failed to write {}", output.display()));
    }
    Ok(())
}

/// Deletes a partially written output, warning when it has to stay on disk.
fn remove_partial(output: &Path) -> bool {
    warn!("removing incomplete {}", output.display());
    match fs::remove_file(output) {
        Ok(()) => true,
        Err(err) => {
            warn!("incomplete {} left on disk: {}", output.display(), err);
            false
        }
    }
}

/// Prints the blob at `file` as JSON.
pub fn decode<W: Write>(
    file: &Path,
    config: &LayoutConfig,
    pretty: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let data = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let layout = detect_layout(&data, config);
    let json = with_kinds!(config.float, config.int, decode_as(&data, layout, pretty))?;
    writeln!(out, "{}", json)?;
    Ok(())
}

fn decode_as<F, I>(data: &[u8], layout: Layout, pretty: bool) -> anyhow::Result<String>
where
    F: Element + Serialize,
    I: Element + Serialize,
{
    let blob: ModelBlob<F, I> = model_blob::decode(data, layout)?;
    let json = if pretty {
        serde_json::to_string_pretty(&blob)?
    } else {
        serde_json::to_string(&blob)?
    };
    Ok(json)
}

/// Prints where each section sits in `file`.
pub fn inspect<W: Write>(file: &Path, config: &LayoutConfig, out: &mut W) -> anyhow::Result<()> {
    let data = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let layout = detect_layout(&data, config);
    let spans = model_blob::inspect(&data, layout, config.float, config.int)?;
    writeln!(
        out,
        "{} bytes, {} framing, {} endian",
        data.len(),
        layout.framing,
        layout.byte_order
    )?;
    writeln!(
        out,
        "{:<14}{:>10}{:>10}{:>10}  type",
        "section", "offset", "bytes", "count"
    )?;
    for span in &spans {
        writeln!(
            out,
            "{:<14}{:>10}{:>10}{:>10}  {}",
            span.section.as_str(),
            span.offset,
            span.len,
            span.count,
            span.element.map_or("-", ElementKind::as_str)
        )?;
    }
    writeln!(out, "head: {}", print_octets(&data, 16))?;
    Ok(())
}

/// Prints the most likely language of each text.
///
/// Only byte order and framing are taken from `config`; language models
/// always hold f32 / u16 tables.
pub fn classify<W: Write>(
    model: &Path,
    config: &LayoutConfig,
    langs: &[String],
    norm: bool,
    texts: &[String],
    out: &mut W,
) -> anyhow::Result<()> {
    if texts.is_empty() {
        bail!("nothing to classify");
    }
    let data = fs::read(model).with_context(|| format!("failed to read {}", model.display()))?;
    let mut model = Model::from_bytes(&data, detect_layout(&data, config))
        .with_context(|| format!("failed to load model {}", model.display()))?;
    if !langs.is_empty() {
        model.set_langs(Some(langs.iter().cloned().collect::<HashSet<_>>()))?;
    }
    model.set_norm_probs(norm);
    for text in texts {
        match model.classify(text) {
            Some((lang, score)) => writeln!(out, "{}\t{}", lang, score)?,
            None => writeln!(out, "unknown")?,
        }
    }
    Ok(())
}

/// Honours a tagged header even when the configuration says raw.
fn detect_layout(data: &[u8], config: &LayoutConfig) -> Layout {
    let layout = config.layout();
    if layout.framing == Framing::Raw && Framing::detect(data) == Framing::Tagged {
        info!("found a tagged header, reading as tagged");
        return Layout::new(layout.byte_order, Framing::Tagged);
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_blob::{BlobEncoder, ByteOrder};

    const EXAMPLE: &str = r#"{
        "matrix": {"rows": 2, "cols": 3, "data": [1, 2, 3, 4, 5, 6]},
        "vector": [0.5, -1.5],
        "int_vector": [7, -3, 0],
        "strings": ["alpha", "β"],
        "sparse": [[1, [10, -10]], [5, []]]
    }"#;

    fn write_example(dir: &Path) -> std::path::PathBuf {
        let input = dir.join("blob.json");
        fs::write(&input, EXAMPLE).unwrap();
        input
    }

    #[test]
    fn encode_writes_the_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_example(dir.path());
        let output = dir.path().join("model.bin");
        encode(&input, &output, &LayoutConfig::default()).unwrap();

        let blob: ModelBlob<f64, i32> = serde_json::from_str(EXAMPLE).unwrap();
        let expected = BlobEncoder::default().encode(&blob).unwrap();
        assert_eq!(fs::read(&output).unwrap(), expected);
        assert_eq!(expected.len(), 139);
    }

    #[test]
    fn encode_rejects_bad_json_without_creating_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("blob.json");
        fs::write(&input, r#"{"matrix": {"rows": 2, "cols": 2, "data": [1]}}"#).unwrap();
        let output = dir.path().join("model.bin");
        assert!(encode(&input, &output, &LayoutConfig::default()).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn remove_partial_reports_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join("model.bin");
        fs::write(&partial, [1, 2, 3]).unwrap();
        assert!(remove_partial(&partial));
        assert!(!partial.exists());

        let stuck = dir.path().join("stuck");
        fs::create_dir(&stuck).unwrap();
        assert!(!remove_partial(&stuck));
        assert!(stuck.exists());
    }

    #[test]
    fn encode_rejects_non_integer_int_type() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_example(dir.path());
        let config = LayoutConfig {
            int: ElementKind::F32,
            ..LayoutConfig::default()
        };
        let err = encode(&input, &dir.path().join("model.bin"), &config).unwrap_err();
        assert!(err.to_string().contains("not an integer element type"));
    }

    #[test]
    fn decode_prints_json_and_detects_tagged_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_example(dir.path());
        let output = dir.path().join("model.bin");
        let tagged = LayoutConfig {
            byte_order: ByteOrder::Big,
            framing: Framing::Tagged,
            ..LayoutConfig::default()
        };
        encode(&input, &output, &tagged).unwrap();

        let mut out = Vec::new();
        decode(&output, &LayoutConfig::default(), false, &mut out).unwrap();
        let printed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let expected: serde_json::Value = serde_json::from_str(EXAMPLE).unwrap();
        assert_eq!(printed["strings"], expected["strings"]);
        assert_eq!(printed["sparse"], expected["sparse"]);
        assert_eq!(printed["int_vector"], expected["int_vector"]);
    }

    #[test]
    fn inspect_lists_every_section() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_example(dir.path());
        let output = dir.path().join("model.bin");
        encode(&input, &output, &LayoutConfig::default()).unwrap();

        let mut out = Vec::new();
        inspect(&output, &LayoutConfig::default(), &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.starts_with("139 bytes, raw framing, little endian"));
        for name in ["matrix", "vector", "int vector", "string table", "sparse table"] {
            assert!(report.contains(name), "missing {}", name);
        }
        assert!(report.contains("head: 02 00 00 00 03 00 00 00"));
    }

    fn two_languages() -> ModelBlob<f32, u16> {
        let mut tk_nextmove = vec![0u16; 512];
        tk_nextmove[b'a' as usize] = 1;
        tk_nextmove[256 + b'a' as usize] = 1;
        let blob: ModelBlob<f32, u16> = ModelBlob {
            matrix: model_blob::Matrix::new(1, 2, vec![1.0, 0.0]).unwrap(),
            vector: vec![0.0, 0.5],
            int_vector: tk_nextmove,
            strings: vec!["en".to_owned(), "fr".to_owned()],
            sparse: vec![(1, vec![0])].into(),
        };
        blob
    }

    fn langid_config() -> LayoutConfig {
        LayoutConfig {
            float: ElementKind::F32,
            int: ElementKind::U16,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn classify_prints_one_line_per_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("langid.bin");
        model_blob::write_file(&path, &two_languages(), Layout::LEGACY).unwrap();

        let mut out = Vec::new();
        let texts = vec!["aaaa".to_owned(), "zzz".to_owned()];
        classify(&path, &langid_config(), &[], false, &texts, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "en\t4\nfr\t0.5\n");
    }

    #[test]
    fn classify_detects_tagged_models() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("langid.tagged.bin");
        let layout = Layout::tagged(ByteOrder::Big);
        model_blob::write_file(&path, &two_languages(), layout).unwrap();

        let mut report = Vec::new();
        inspect(&path, &langid_config(), &mut report).unwrap();
        assert!(String::from_utf8(report).unwrap().contains("tagged framing, big endian"));

        let mut out = Vec::new();
        let texts = vec!["aa".to_owned()];
        classify(&path, &LayoutConfig::default(), &[], false, &texts, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "en\t2\n");
    }

}
