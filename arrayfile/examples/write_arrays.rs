//! Streaming write example for a sequence of 3-D float arrays

use arrayfile::{Array, ArrayShape, BinFile, IoConfig, OpenMode, Result};
use std::time::Instant;

fn main() -> Result<()> {
    println!("Writing a sequence of arrays using the streaming writer...");

    let shape = ArrayShape::new(&[64, 64, 3])?;
    let n_samples = 500;
    println!("Array shape: {shape}, samples: {n_samples}");

    let start = Instant::now();
    let config = IoConfig::default().with_buffer_capacity(1 << 20);
    let mut file = BinFile::open_with_config("example_arrays.bin", OpenMode::Out, config)?;
    for sample in 0..n_samples {
        file.write(&build_demo_array(shape, sample)?)?;
    }
    file.close()?;
    let write_time = start.elapsed();

    let file_size = std::fs::metadata("example_arrays.bin")
        .map(|m| m.len())
        .unwrap_or(0);
    println!("Arrays written in {write_time:?}");
    println!(
        "Throughput: {:.1} MB/s",
        (file_size as f64 / (1024.0 * 1024.0)) / write_time.as_secs_f64()
    );
    println!("\nRun 'cargo run --example read_arrays' to read them back!");
    Ok(())
}

/// Build a deterministic array for demo purposes
fn build_demo_array(shape: ArrayShape, sample: usize) -> Result<Array> {
    let values = (0..shape.n_elements())
        .map(|i| sample as f32 + i as f32 * 0.001)
        .collect();
    Array::new(shape, values)
}
