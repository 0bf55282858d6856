use super::{Label, INPUT_DIMENSION, MAX_LABEL, MAX_PIXEL_VALUE, PIXEL_COUNT};
use crate::{Error, Result};

/// One labelled image. `inputs[0]` is the bias feature and is always exactly `1.0`,
/// the remaining 784 entries are pixel intensities scaled into `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
  index: usize,
  true_label: Label,
  inputs: Vec<f64>,
}

impl Sample {
  /// Builds a sample from raw intensities. The bias is stored as a pixel of value 255
  /// so that it lands on `1.0` after the same scaling as everything else.
  pub fn from_pixels(index: usize, true_label: Label, pixels: &[u8]) -> Result<Self> {
    if true_label > MAX_LABEL {
      return Err(Error::MalformedRow {
        row: index,
        reason: format!("label {} is outside 0..={}", true_label, MAX_LABEL),
      });
    }
    if pixels.len() != PIXEL_COUNT {
      return Err(Error::MalformedRow {
        row: index,
        reason: format!("expected {} pixels, found {}", PIXEL_COUNT, pixels.len()),
      });
    }
    let inputs: Vec<f64> = std::iter::once(MAX_PIXEL_VALUE)
      .chain(pixels.iter().map(|&p| f64::from(p)))
      .map(|v| v / MAX_PIXEL_VALUE)
      .collect();
    debug_assert_eq!(inputs.len(), INPUT_DIMENSION);
    Ok(Self {
      index,
      true_label,
      inputs,
    })
  }

  /// Parses one dataset row: field 0 is the label, fields 1..=784 the pixels.
  pub fn from_record<'r, I>(index: usize, mut fields: I) -> Result<Self>
  where
    I: Iterator<Item = &'r str>,
  {
    let malformed = |reason: String| Error::MalformedRow { row: index, reason };

    let label_field = fields.next().ok_or_else(|| malformed("empty row".to_string()))?;
    let label: Label = label_field
      .trim()
      .parse()
      .map_err(|_| malformed(format!("label {:?} is not an integer in 0..={}", label_field, MAX_LABEL)))?;

    let pixels = fields
      .enumerate()
      .map(|(i, field)| {
        field.trim().parse::<u8>().map_err(|_| {
          malformed(format!("pixel #{} {:?} is not an integer in 0..=255", i, field))
        })
      })
      .collect::<Result<Vec<u8>>>()?;

    Self::from_pixels(index, label, &pixels)
  }

  pub fn index(&self) -> usize {
    self.index
  }

  pub fn true_label(&self) -> Label {
    self.true_label
  }

  pub fn inputs(&self) -> &[f64] {
    &self.inputs
  }
}
