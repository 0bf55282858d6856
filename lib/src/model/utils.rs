use std::{fs::File, io::Read, path::Path};

use csv::ReaderBuilder;
use rand::{seq::SliceRandom, Rng};
use tracing::info;

use super::Sample;
use crate::Result;

/// Parses headerless `label,pixel_0,...,pixel_783` rows. The first bad row aborts the load.
pub fn parse_dataset<R: Read>(reader: R) -> Result<Vec<Sample>> {
  let mut rdr = ReaderBuilder::new()
    .has_headers(false)
    // row length is checked per sample so the error names the row
    .flexible(true)
    .from_reader(reader);

  rdr
    .records()
    .enumerate()
    .map(|(row, record)| Sample::from_record(row, record?.iter()))
    .collect()
}

pub fn read_dataset(path: &Path) -> Result<Vec<Sample>> {
  info!("Loading samples from {} ...", path.display());
  let file = File::open(path)?;
  let samples = parse_dataset(file)?;
  info!("Found {} samples in {}", samples.len(), path.display());
  Ok(samples)
}

/// Reorders samples in place. Only the order of updates within an epoch depends on it.
pub fn shuffle_samples<R: Rng>(samples: &mut [Sample], rng: &mut R) {
  samples.shuffle(rng);
}
