use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use synthtiger::render::raster::to_rgba8;
use synthtiger::template::{MultilineMeta, MultilineTemplate, MultilineTemplateConfig};
use synthtiger::{
    DefaultTemplate, DefaultTemplateConfig, GeneratorOpts, Raster, RetryPolicy, Sample, SynthResult,
    Template, TemplateMeta, run_generator,
};

#[derive(Parser, Debug)]
#[command(name = "synthtiger", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a dataset.
    Gen(GenArgs),
    /// Re-render one sample from its recorded meta.
    Replay(ReplayArgs),
}

/// Generation pipeline to run.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum TemplateKind {
    /// Single text line over a background.
    #[default]
    Default,
    /// Wrapped paragraph on a white page.
    Multiline,
}

#[derive(Parser, Debug)]
struct GenArgs {
    /// Template configuration JSON.
    #[arg(short, long)]
    config: PathBuf,

    /// Pipeline the configuration belongs to.
    #[arg(short, long, value_enum, default_value_t)]
    template: TemplateKind,

    /// Output directory.
    #[arg(short, long)]
    output: PathBuf,

    /// Number of samples.
    #[arg(long, default_value_t = 100)]
    count: u64,

    /// Worker threads (0 generates on the main thread).
    #[arg(short, long, default_value_t = 0)]
    workers: usize,

    /// Top-level seed; random when omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Drop a sample after its first failed attempt instead of retrying.
    #[arg(long)]
    no_retry: bool,
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Template configuration JSON used for the original run.
    #[arg(short, long)]
    config: PathBuf,

    /// Pipeline of the original run.
    #[arg(short, long, value_enum, default_value_t)]
    template: TemplateKind,

    /// `metas.jsonl` written by `gen`.
    #[arg(long)]
    meta: PathBuf,

    /// Sample index to re-render.
    #[arg(long)]
    index: u64,

    /// Output image path.
    #[arg(short, long)]
    output: PathBuf,
}

/// One line of `metas.jsonl`.
#[derive(serde::Serialize, serde::Deserialize)]
struct MetaRecord<M> {
    index: u64,
    seed: u128,
    label: String,
    meta: M,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Gen(args) => cmd_gen(args),
        Command::Replay(args) => cmd_replay(args),
    }
}

fn read_config<C>(path: &Path, load: fn(&Path) -> SynthResult<C>) -> anyhow::Result<C> {
    load(path).with_context(|| format!("load template config '{}'", path.display()))
}

fn to_rgb(image: &Raster) -> image::RgbImage {
    DynamicImage::ImageRgba8(to_rgba8(image)).to_rgb8()
}

/// gt.txt holds one sample per line, so line breaks inside a label are escaped.
fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('\n', "\\n").replace('\t', "\\t")
}

fn cmd_gen(args: GenArgs) -> anyhow::Result<()> {
    match args.template {
        TemplateKind::Default => {
            let config = read_config(&args.config, DefaultTemplateConfig::from_path)?;
            generate(&args, || DefaultTemplate::new(config.clone()))
        }
        TemplateKind::Multiline => {
            let config = read_config(&args.config, MultilineTemplateConfig::from_path)?;
            generate(&args, || MultilineTemplate::new(config.clone()))
        }
    }
}

fn generate<T, F, M>(args: &GenArgs, make: F) -> anyhow::Result<()>
where
    T: Template<Output = Sample<M>>,
    F: Fn() -> SynthResult<T> + Sync,
    M: serde::Serialize,
{
    fs::create_dir_all(&args.output)
        .with_context(|| format!("create output dir '{}'", args.output.display()))?;
    let mut gt = BufWriter::new(File::create(args.output.join("gt.txt")).context("create gt.txt")?);
    let mut metas = BufWriter::new(
        File::create(args.output.join("metas.jsonl")).context("create metas.jsonl")?,
    );

    let opts = GeneratorOpts {
        count: Some(args.count),
        workers: args.workers,
        seed: args.seed,
        retry: if args.no_retry {
            RetryPolicy::Never
        } else {
            RetryPolicy::Forever
        },
    };

    let root = args.output.clone();
    let stats = run_generator(make, &opts, |result| {
        let Some(sample) = result.output else {
            return Ok(ControlFlow::Continue(()));
        };
        let index = result.task.index;
        let key = format!("images/{}/{index}.jpg", index / 1000);
        let path = root.join(&key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create '{}'", dir.display()))?;
        }
        let file = File::create(&path).with_context(|| format!("create '{}'", path.display()))?;
        JpegEncoder::new_with_quality(BufWriter::new(file), sample.quality)
            .encode_image(&to_rgb(&sample.image))
            .with_context(|| format!("encode '{}'", path.display()))?;

        writeln!(gt, "{key}\t{}", escape_label(&sample.label)).context("write gt.txt")?;
        let record = MetaRecord {
            index,
            seed: result.task.seed,
            label: sample.label,
            meta: sample.meta,
        };
        serde_json::to_writer(&mut metas, &record)?;
        writeln!(metas).context("write metas.jsonl")?;
        Ok(ControlFlow::Continue(()))
    })?;

    gt.flush().context("flush gt.txt")?;
    metas.flush().context("flush metas.jsonl")?;
    eprintln!(
        "generated {} samples ({} dropped, {} attempts) into {}",
        stats.produced,
        stats.failed,
        stats.attempts,
        args.output.display()
    );
    Ok(())
}

fn find_record<M: serde::de::DeserializeOwned>(
    path: &Path,
    index: u64,
) -> anyhow::Result<MetaRecord<M>> {
    let f = File::open(path).with_context(|| format!("open '{}'", path.display()))?;
    for (n, line) in BufReader::new(f).lines().enumerate() {
        let line = line.with_context(|| format!("read '{}'", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: MetaRecord<M> = serde_json::from_str(&line)
            .with_context(|| format!("parse line {} of '{}'", n + 1, path.display()))?;
        if record.index == index {
            return Ok(record);
        }
    }
    anyhow::bail!("no sample {index} in '{}'", path.display())
}

fn cmd_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let (image, label, recorded) = match args.template {
        TemplateKind::Default => {
            let config = read_config(&args.config, DefaultTemplateConfig::from_path)?;
            let record: MetaRecord<TemplateMeta> = find_record(&args.meta, args.index)?;
            let sample = DefaultTemplate::new(config)?.replay(&record.meta)?;
            (sample.image, sample.label, record.label)
        }
        TemplateKind::Multiline => {
            let config = read_config(&args.config, MultilineTemplateConfig::from_path)?;
            let record: MetaRecord<MultilineMeta> = find_record(&args.meta, args.index)?;
            let sample = MultilineTemplate::new(config)?.replay(&record.meta)?;
            (sample.image, sample.label, record.label)
        }
    };
    if label != recorded {
        tracing::warn!(%recorded, replayed = %label, "label mismatch");
    }
    to_rgba8(&image)
        .save(&args.output)
        .with_context(|| format!("write '{}'", args.output.display()))?;
    eprintln!("wrote {}", args.output.display());
    Ok(())
}
