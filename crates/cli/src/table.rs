// Loading the input table and writing the reduced one.

use std::{
    collections::HashSet,
    error::Error,
    fs::File,
    io::{Read, Write},
    path::Path,
};

use corrsum::{Dataset, Orientation, RetentionRecord};
use csv::{ReaderBuilder, WriterBuilder};
use flate2::{
    Compression,
    read::{GzDecoder, MultiGzDecoder},
    write::GzEncoder,
};
use ndarray::Array2;
use tar::Archive;

/// Reads a dataset from a plain, gzip or tar.gz file.
pub fn load_dataset(path: &Path, transposed: bool) -> Result<Dataset, Box<dyn Error>> {
    let name = path.to_string_lossy();
    if name.ends_with(".tar.gz") {
        let file = File::open(path)?;
        let gz = GzDecoder::new(file);
        let mut archive = Archive::new(gz);

        for entry in archive.entries()? {
            let mut entry = entry?;
            if entry.header().entry_type().is_file() {
                return read_dataset(&mut entry, transposed);
            }
        }
        Err("No readable file found in tar archive".into())
    } else if name.ends_with(".gz") {
        read_dataset(MultiGzDecoder::new(File::open(path)?), transposed)
    } else {
        read_dataset(File::open(path)?, transposed)
    }
}

/// Parses a comma separated table with a header row.
///
/// Natural layout: header `label, name...`, records `key, value...`.
/// Transposed layout: header `label, key...`, records `name, value...`.
/// Unparsable numbers become NaN.
pub fn read_dataset<R: Read>(reader: R, transposed: bool) -> Result<Dataset, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let header = rdr.headers()?.clone();
    if header.len() < 2 {
        return Err("Input file must contain a key column and at least one value column".into());
    }
    let label = header.get(0).unwrap_or("").trim().to_string();
    let header_ids: Vec<String> = header.iter().skip(1).map(|s| s.trim().to_string()).collect();

    let mut row_ids = Vec::new();
    let mut flat = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        let row_id = record.get(0).unwrap_or("").trim();
        if row_id.is_empty() {
            return Err(format!(
                "Empty row ID encountered on line {}",
                idx + 2 /* header offset */
            )
            .into());
        }
        row_ids.push(row_id.to_string());
        flat.extend(
            record
                .iter()
                .skip(1)
                .map(|s| s.trim().parse().unwrap_or(f64::NAN)),
        );
    }
    if row_ids.is_empty() {
        return Err("Input file contains no data rows".into());
    }

    let values = Array2::from_shape_vec((row_ids.len(), header_ids.len()), flat)?;
    let (names, keys) = if transposed {
        (row_ids, header_ids)
    } else {
        (header_ids, row_ids)
    };
    check_unique_keys(&keys)?;

    let dataset = Dataset::new(values, Orientation::from_transposed(transposed), names, keys)?;
    Ok(dataset.with_key_label(label))
}

fn check_unique_keys(keys: &[String]) -> Result<(), Box<dyn Error>> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key.as_str()) {
            return Err(format!("Duplicate row ID '{}'", key).into());
        }
    }
    Ok(())
}

/// Writes only the retained variables, in the input's layout, key column
/// first.
pub fn write_reduced<W: Write>(
    writer: W,
    dataset: &Dataset,
    retention: &RetentionRecord,
) -> Result<(), Box<dyn Error>> {
    let kept = retention.kept_variables();
    let names = dataset.names();
    let keys = dataset.keys();
    let mut wtr = WriterBuilder::new().from_writer(writer);

    if dataset.orientation().is_transposed() {
        wtr.write_record(
            std::iter::once(dataset.key_label()).chain(keys.iter().map(String::as_str)),
        )?;
        for &v in &kept {
            let row_vals: Vec<String> = dataset.variable(v).iter().map(|x| x.to_string()).collect();
            wtr.write_record(
                std::iter::once(names[v].as_str()).chain(row_vals.iter().map(String::as_str)),
            )?;
        }
    } else {
        wtr.write_record(
            std::iter::once(dataset.key_label()).chain(kept.iter().map(|&v| names[v].as_str())),
        )?;
        for (o, key) in keys.iter().enumerate() {
            let row_vals: Vec<String> = kept
                .iter()
                .map(|&v| dataset.value(o, v).to_string())
                .collect();
            wtr.write_record(
                std::iter::once(key.as_str()).chain(row_vals.iter().map(String::as_str)),
            )?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `contents` to `path`, gzip-compressed when the name ends in `.gz`.
pub fn save_output(path: &Path, contents: &[u8]) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    if path.to_string_lossy().ends_with(".gz") {
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(contents)?;
        enc.finish()?;
    } else {
        let mut file = file;
        file.write_all(contents)?;
    }
    Ok(())
}
