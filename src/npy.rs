//! `.npy` files shared with the external training and quantization tooling: `<f4` feature
//! matrices and calibration samples, `<i4` label vectors, C order only.

use crate::error::{PipelineError, Result};
use ndarray::{Array2, ArrayD, IxDyn};
use npyz::{AutoSerialize, Deserialize, NpyFile, Order, Serialize, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::Path;

/// Write `data` with the given C-order shape.
pub fn write_file<T>(path: &Path, shape: &[usize], data: impl IntoIterator<Item = T>) -> Result<()>
where
    T: Serialize + AutoSerialize,
{
    let shape: Vec<u64> = shape.iter().map(|&d| d as u64).collect();
    let file = File::create(path)?;
    let mut writer = npyz::WriteOptions::<T>::new()
        .default_dtype()
        .shape(&shape)
        .writer(BufWriter::new(file))
        .begin_nd()?;
    writer.extend(data)?;
    writer.finish()?;
    Ok(())
}

/// Parse `.npy` bytes into the shape and flat C-order values.
///
/// The declared shape is checked against the buffer size before any element is read.
pub fn from_bytes<T: Deserialize>(buf: &[u8]) -> Result<(Vec<usize>, Vec<T>)> {
    let npy = NpyFile::new(buf).map_err(|e| PipelineError::Npy(e.to_string()))?;
    if matches!(npy.order(), Order::Fortran) {
        return Err(PipelineError::Npy("fortran order is not supported".into()));
    }

    let shape = npy
        .shape()
        .iter()
        .map(|&d| usize::try_from(d))
        .collect::<std::result::Result<Vec<usize>, _>>()
        .map_err(|_| PipelineError::Npy(format!("shape {:?} exceeds address space", npy.shape())))?;
    let declared = shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .and_then(|count| count.checked_mul(std::mem::size_of::<T>().max(1)))
        .ok_or_else(|| PipelineError::Npy(format!("shape {:?} overflows", shape)))?;
    if declared > buf.len() {
        return Err(PipelineError::Npy(format!(
            "shape {:?} needs {} bytes, file holds {}",
            shape,
            declared,
            buf.len()
        )));
    }

    let values = npy
        .into_vec::<T>()
        .map_err(|e| PipelineError::Npy(e.to_string()))?;
    Ok((shape, values))
}

pub fn read_file<T: Deserialize>(path: &Path) -> Result<(Vec<usize>, Vec<T>)> {
    let mut buf = Vec::new();
    File::open(path)?.read_to_end(&mut buf)?;
    from_bytes(&buf).map_err(|e| match e {
        PipelineError::Npy(msg) => PipelineError::Npy(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

pub fn write_matrix(path: &Path, m: &Array2<f32>) -> Result<()> {
    write_file(path, m.shape(), m.iter().copied())
}

pub fn read_array(path: &Path) -> Result<ArrayD<f32>> {
    let (shape, values) = read_file::<f32>(path)?;
    ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|e| PipelineError::Npy(e.to_string()))
}
