//! threatpack entrypoint: each stage is a standalone batch job (input path → output path).

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use threatpack::{
    artifact::{parse_artifacts, ArtifactEncoder, EmbeddableArtifact},
    capture::{CalibrationCorpus, CaptureBatch},
    config::{PipelineConfig, SchemaKind},
    dataset::{DatasetAssembler, DatasetWriter},
    features::{FeatureCodec, FeatureSchema, BEHAVIORAL, WIFI_THREAT},
    logging::{StageReport, StructuredLogger},
    model::{CommandQuantizer, ModelQuantizer, PrebuiltModel, QuantizeRequest},
    scenario::{ScenarioRegistry, ScenarioSampleGenerator},
};
use tracing::{info, warn};

type CliResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "threatpack")]
#[command(author, version, about = "WiFi threat telemetry packaging for embedded classifiers")]
struct Cli {
    /// Path to JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaArg {
    WifiThreat,
    Behavioral,
}

impl From<SchemaArg> for SchemaKind {
    fn from(s: SchemaArg) -> Self {
        match s {
            SchemaArg::WifiThreat => SchemaKind::WifiThreat,
            SchemaArg::Behavioral => SchemaKind::Behavioral,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert raw device captures into a calibration corpus
    Convert {
        /// Directory of feature_*.raw files
        input: Option<PathBuf>,

        /// Calibration corpus directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of capture files to process
        #[arg(short, long)]
        max_files: Option<usize>,
    },

    /// Generate a shuffled synthetic dataset
    Generate {
        #[arg(long, value_enum)]
        schema: Option<SchemaArg>,

        #[arg(short = 'n', long)]
        samples_per_class: Option<usize>,

        /// Seed for a reproducible dataset
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        prefix: Option<String>,
    },

    /// Render a binary file as an embeddable byte array
    Embed {
        input: PathBuf,

        output: Option<PathBuf>,

        /// Array symbol name
        #[arg(short, long)]
        symbol: Option<String>,

        #[arg(long)]
        bytes_per_line: Option<usize>,

        /// Accept an empty input as an explicit placeholder
        #[arg(long)]
        placeholder: bool,
    },

    /// Render several binaries plus a {data, length} lookup table
    EmbedTable {
        output: PathBuf,

        /// Table symbol name
        #[arg(short, long)]
        table: String,

        /// Entries as symbol=path, in table order
        #[arg(required = true)]
        entries: Vec<String>,
    },

    /// Run the external quantizer (or take a prebuilt model) and embed the result
    Quantize {
        /// Quantizer program
        #[arg(long, required_unless_present = "prebuilt", conflicts_with = "prebuilt")]
        command: Option<PathBuf>,

        /// Already quantized model to embed as is
        #[arg(long)]
        prebuilt: Option<PathBuf>,

        /// Extra arguments passed before the standard ones
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Dataset prefix path
        #[arg(long)]
        dataset: Option<PathBuf>,

        #[arg(long)]
        calibration: Option<PathBuf>,

        /// Quantized model output file
        #[arg(short, long, default_value = "model_int8.tflite")]
        output: PathBuf,

        /// Header to render the model into
        #[arg(long)]
        header: Option<PathBuf>,
    },

    /// Parse a generated header and report its arrays
    Verify {
        header: PathBuf,

        /// Binary the first array must match
        #[arg(long)]
        against: Option<PathBuf>,
    },
}

fn schema_for(kind: SchemaKind) -> (&'static FeatureSchema, ScenarioRegistry) {
    match kind {
        SchemaKind::WifiThreat => (&WIFI_THREAT, ScenarioRegistry::wifi_threat()),
        SchemaKind::Behavioral => (&BEHAVIORAL, ScenarioRegistry::behavioral()),
    }
}

fn report(r: &StageReport<'_>) -> io::Result<()> {
    StructuredLogger::emit_json(r, &mut io::stdout())
}

fn run_convert(
    config: &PipelineConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    max_files: Option<usize>,
) -> CliResult {
    let mut capture = config.capture.clone();
    if let Some(n) = max_files {
        capture.max_files = n;
    }
    let input = input.unwrap_or_else(|| capture.input_dir.clone());
    let output = output.unwrap_or_else(|| config.calibration.dir.clone());

    let batch = CaptureBatch::decode_dir(&input, &capture)?;
    if batch.succeeded() == 0 {
        return Err(format!("no usable captures in {}", input.display()).into());
    }
    let written = CalibrationCorpus::write(&output, &batch.records)?;
    report(
        &StageReport::new("convert")
            .input(&input)
            .output(&output)
            .counts(written.len(), batch.failed()),
    )?;
    Ok(())
}

fn run_generate(
    config: &PipelineConfig,
    schema: Option<SchemaArg>,
    samples_per_class: Option<usize>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    prefix: Option<String>,
) -> CliResult {
    let ds = &config.dataset;
    let kind = schema.map(SchemaKind::from).unwrap_or(ds.schema);
    let (schema, registry) = schema_for(kind);
    let per_class = samples_per_class.unwrap_or(ds.samples_per_class);
    let class_count = registry.class_count();

    let mut generator = match seed.or(ds.seed) {
        Some(seed) => ScenarioSampleGenerator::seeded(registry, seed),
        None => ScenarioSampleGenerator::from_entropy(registry),
    };
    let codec = FeatureCodec::new(schema)?.with_jitter(ds.jitter_std);
    let dataset = DatasetAssembler::assemble(class_count, per_class, &mut generator, &codec)?;

    let dir = output.unwrap_or_else(|| ds.output_dir.clone());
    let prefix = prefix.unwrap_or_else(|| ds.prefix.clone());
    let files = DatasetWriter::new(&dir, prefix).persist(&dataset)?;
    report(
        &StageReport::new("generate")
            .output(&files.features)
            .counts(dataset.len(), 0),
    )?;
    Ok(())
}

fn run_embed(
    config: &PipelineConfig,
    input: &Path,
    output: Option<PathBuf>,
    symbol: Option<String>,
    bytes_per_line: Option<usize>,
    placeholder: bool,
) -> CliResult {
    let bytes = std::fs::read(input)?;
    let symbol = symbol.unwrap_or_else(|| config.artifact.symbol.clone());
    let artifact = if placeholder {
        EmbeddableArtifact::placeholder(symbol, bytes)
    } else {
        EmbeddableArtifact::new(symbol, bytes)
    };
    let encoder = ArtifactEncoder::new(
        bytes_per_line.unwrap_or(config.artifact.bytes_per_line),
        config.artifact.alignment,
    );
    let text = encoder.encode(&artifact)?;
    let output = output.unwrap_or_else(|| config.artifact.output_path.clone());
    write_text(&output, &text)?;
    report(
        &StageReport::new("embed")
            .input(input)
            .output(&output)
            .bytes(artifact.len()),
    )?;
    Ok(())
}

fn run_embed_table(config: &PipelineConfig, output: &Path, table: &str, entries: &[String]) -> CliResult {
    let artifacts = entries
        .iter()
        .map(|entry| {
            let (symbol, path) = entry
                .split_once('=')
                .ok_or_else(|| format!("entry `{}` is not symbol=path", entry))?;
            Ok(EmbeddableArtifact::new(symbol, std::fs::read(path)?))
        })
        .collect::<Result<Vec<_>, Box<dyn std::error::Error + Send + Sync>>>()?;
    let encoder = ArtifactEncoder::new(config.artifact.bytes_per_line, config.artifact.alignment);
    let text = encoder.encode_table(table, &artifacts)?;
    write_text(output, &text)?;
    report(
        &StageReport::new("embed-table")
            .output(output)
            .counts(artifacts.len(), 0)
            .bytes(artifacts.iter().map(EmbeddableArtifact::len).sum()),
    )?;
    Ok(())
}

fn run_quantize(
    config: &PipelineConfig,
    quantizer: Quantizer,
    dataset: Option<PathBuf>,
    calibration: Option<PathBuf>,
    output: PathBuf,
    header: Option<PathBuf>,
) -> CliResult {
    let dataset_prefix =
        dataset.unwrap_or_else(|| config.dataset.output_dir.join(&config.dataset.prefix));
    let source = calibration.unwrap_or_else(|| config.calibration.dir.clone());
    let (quantizer, calibration_dir): (Box<dyn ModelQuantizer>, PathBuf) = match quantizer {
        Quantizer::Command(command) => {
            // the framework reads every sample it is given, so hand it a capped copy
            let staged = output.with_extension("calibration");
            let mut features = dataset_prefix.clone().into_os_string();
            features.push("_X.npy");
            CalibrationCorpus::stage(
                &source,
                Path::new(&features),
                &staged,
                config.calibration.max_samples,
            )?;
            (Box::new(command), staged)
        }
        Quantizer::Prebuilt(model) => (Box::new(model), source),
    };
    let request = QuantizeRequest {
        dataset_prefix,
        calibration_dir,
        output,
    };
    let blob = quantizer.quantize(&request)?;
    let model_len = blob.len();
    let header = header.unwrap_or_else(|| config.artifact.output_path.clone());
    let encoder = ArtifactEncoder::new(config.artifact.bytes_per_line, config.artifact.alignment);
    let text = encoder.encode(&EmbeddableArtifact::new(config.artifact.symbol.clone(), blob))?;
    write_text(&header, &text)?;
    report(
        &StageReport::new("quantize")
            .input(&request.calibration_dir)
            .output(&header)
            .bytes(model_len),
    )?;
    Ok(())
}

enum Quantizer {
    Command(CommandQuantizer),
    Prebuilt(PrebuiltModel),
}

fn run_verify(header: &Path, against: Option<PathBuf>) -> CliResult {
    let text = std::fs::read_to_string(header)?;
    let arrays = parse_artifacts(&text)?;
    for (name, bytes) in &arrays {
        info!(symbol = %name, bytes = bytes.len(), "array parsed");
    }
    if let Some(path) = against {
        let expected = std::fs::read(&path)?;
        let first = arrays.first().map(|(_, b)| b.as_slice()).unwrap_or(&[]);
        if first != expected.as_slice() {
            return Err(format!("{} does not embed {}", header.display(), path.display()).into());
        }
    }
    report(
        &StageReport::new("verify")
            .input(header)
            .counts(arrays.len(), 0)
            .bytes(arrays.iter().map(|(_, b)| b.len()).sum()),
    )?;
    Ok(())
}

fn write_text(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)
}

fn main() -> CliResult {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("THREATPACK_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("threatpack.json"));
    let (config, config_error) = match PipelineConfig::try_load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (PipelineConfig::default(), Some(e)),
    };

    let level = if cli.debug { "debug" } else { config.log.level.as_str() };
    StructuredLogger::init(config.log.json, level)?;
    if let Some(e) = config_error {
        warn!(config = %config_path.display(), error = %e, "invalid config; using defaults");
    }
    info!(config = %config_path.display(), "threatpack starting");

    match cli.command {
        Commands::Convert {
            input,
            output,
            max_files,
        } => run_convert(&config, input, output, max_files),
        Commands::Generate {
            schema,
            samples_per_class,
            seed,
            output,
            prefix,
        } => run_generate(&config, schema, samples_per_class, seed, output, prefix),
        Commands::Embed {
            input,
            output,
            symbol,
            bytes_per_line,
            placeholder,
        } => run_embed(&config, &input, output, symbol, bytes_per_line, placeholder),
        Commands::EmbedTable {
            output,
            table,
            entries,
        } => run_embed_table(&config, &output, &table, &entries),
        Commands::Quantize {
            command,
            prebuilt,
            args,
            dataset,
            calibration,
            output,
            header,
        } => {
            let quantizer = match (prebuilt, command) {
                (Some(model), _) => Quantizer::Prebuilt(PrebuiltModel::new(model)),
                (None, Some(command)) => Quantizer::Command(
                    args.into_iter()
                        .fold(CommandQuantizer::new(command), |q, a| q.arg(a)),
                ),
                (None, None) => return Err("quantize needs --command or --prebuilt".into()),
            };
            run_quantize(&config, quantizer, dataset, calibration, output, header)
        }
        Commands::Verify { header, against } => run_verify(&header, against),
    }
}
