//! Sequential, random and memory-mapped reads of the file written by `write_arrays`

use arrayfile::{BinFile, ElementType, MappedBinFile, OpenMode, PayloadSource, Result};
use std::time::Instant;

fn main() -> Result<()> {
    let filename = "example_arrays.bin";
    println!("Reading arrays from {filename}...");

    let mut file = BinFile::open(filename, OpenMode::In)?;
    println!(
        "Element type: {}, shape: {}, samples: {}",
        file.element_type()?,
        file.shape()?,
        file.n_samples()?
    );

    // Sequential pass
    let start = Instant::now();
    let mut checksum = 0.0f64;
    for _ in 0..file.n_samples()? {
        let array = file.read_cast(ElementType::Float64)?;
        checksum += array.as_slice::<f64>().map_or(0.0, |v| v[0]);
    }
    println!("Sequential read in {:?} (checksum {checksum:.3})", start.elapsed());

    // Random access leaves the cursor after the requested array
    let last = file.n_samples()? - 1;
    let array = file.read_at(last)?;
    println!("Array {last} first element: {:?}", array.get(&[0, 0, 0]));

    // Zero-copy view through a memory map
    let start = Instant::now();
    let mapped = MappedBinFile::open(filename)?;
    let view = mapped.view::<f32>(mapped.n_samples() - 1)?;
    println!(
        "Mapped view of {} elements in {:?} (borrowed: {})",
        view.len(),
        start.elapsed(),
        matches!(view, std::borrow::Cow::Borrowed(_))
    );
    Ok(())
}
