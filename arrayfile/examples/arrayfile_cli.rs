#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use arrayfile::{
    file_extension, AccessMode, ArraysetCodec, CodecRegistry, HierarchicalCodec, HierarchicalFile,
    IoConfig,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "arrayfile CLI - Inspect and convert typed array files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Show element type, shape and sample count of an arrayset file
    Info {
        /// File to inspect; the codec is chosen by extension
        file: String,
    },
    /// Re-encode an arrayset into the format implied by the output extension
    Convert {
        input: String,
        output: String,

        /// Compression level for container outputs (0-9)
        #[arg(long, default_value_t = 0)]
        compression: u8,
    },
    /// List registered codecs and their extensions
    Codecs,
    /// List dataset paths inside a container file
    Paths {
        file: String,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let start_time = std::time::Instant::now();

    match &cli.command {
        Commands::Info { file } => handle_info(file)?,
        Commands::Convert {
            input,
            output,
            compression,
        } => handle_convert(input, output, *compression)?,
        Commands::Codecs => handle_codecs(),
        Commands::Paths { file } => handle_paths(file)?,
    }

    let elapsed = start_time.elapsed();
    eprintln!("Completed in {elapsed:.2?}");

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This example requires the 'cli' feature to be enabled.");
    eprintln!("Run with: cargo run --features cli --example arrayfile_cli");
    std::process::exit(1);
}

#[cfg(feature = "cli")]
fn handle_info(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let registry = CodecRegistry::global();
    let codec = registry.codec_by_extension(file)?;
    let info = codec.peek(file.as_ref())?;

    println!("File: {file}");
    println!("Codec: {}", codec.name());
    println!("Element type: {}", info.element_type);
    println!("Shape: {}", info.shape);
    println!("Samples: {}", info.n_samples);
    Ok(())
}

#[cfg(feature = "cli")]
fn handle_convert(
    input: &str,
    output: &str,
    compression: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = CodecRegistry::global();
    let set = registry.load(input)?;

    if compression > 0 {
        // Only container outputs carry a compression level
        let config = IoConfig::default().with_default_compression(compression)?;
        let codec = HierarchicalCodec::new(config);
        let ext = file_extension(output);
        if !codec.extensions().iter().any(|e| e == ext) {
            return Err(format!("--compression requires a container output, got '{ext}'").into());
        }
        codec.encode(&set, output.as_ref())?;
    } else {
        registry.save(output, &set)?;
    }

    println!(
        "Converted {} arrays of {} {} from {input} to {output}",
        set.len(),
        set.element_type(),
        set.shape()
    );
    Ok(())
}

#[cfg(feature = "cli")]
fn handle_codecs() {
    let registry = CodecRegistry::global();
    for name in registry.codec_names() {
        let extensions: Vec<String> = registry
            .registered_extensions()
            .into_iter()
            .filter(|(_, codec)| *codec == name)
            .map(|(ext, _)| ext)
            .collect();
        println!("{name}: {}", extensions.join(", "));
    }
}

#[cfg(feature = "cli")]
fn handle_paths(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let container = HierarchicalFile::open(file, AccessMode::In)?;
    for path in container.paths() {
        let description = container.describe(&path)?;
        let object = description.object;
        println!(
            "{path}: {} {} x{}{}",
            object.element_type,
            object.shape,
            object.count,
            if object.expandable { " (expandable)" } else { "" }
        );
    }
    Ok(())
}
