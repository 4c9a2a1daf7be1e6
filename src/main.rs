use anomaly_frames::config::{DatasetConfig, Roi, ShortReadPolicy};
use anomaly_frames::decoder::VideoBackend;
use anomaly_frames::{logging, AnomalyDataset, SequenceDataset};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index the dataset and print per-video sample counts
    Summary {
        #[command(flatten)]
        dataset: DatasetArgs,
    },
    /// Write the processed frames of one sample as PNG files
    Extract {
        #[command(flatten)]
        dataset: DatasetArgs,
        #[arg(short, long)]
        index: usize,
        #[arg(short, long)]
        output_dir: PathBuf,
    },
}

#[derive(Args)]
struct DatasetArgs {
    /// Directory of per-video JSON annotations (multi-video dataset)
    #[arg(short, long, required_unless_present = "annotation", conflicts_with = "annotation")]
    label_dir: Option<PathBuf>,
    /// A single JSON annotation (single-video dataset)
    #[arg(short, long)]
    annotation: Option<PathBuf>,
    /// JSON dataset config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    seq_len: Option<usize>,
    #[arg(long)]
    fps: Option<u32>,
    /// Default region of interest as x1,y1,x2,y2
    #[arg(long)]
    roi: Option<Roi>,
    #[arg(long)]
    output_size: Option<u32>,
    #[arg(long, value_enum)]
    short_read: Option<ShortReadPolicy>,
}

impl DatasetArgs {
    fn config(&self) -> Result<DatasetConfig> {
        let mut cfg = match &self.config {
            Some(path) => DatasetConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => DatasetConfig::default(),
        };
        if let Some(seq_len) = self.seq_len {
            cfg.seq_len = seq_len;
        }
        if let Some(fps) = self.fps {
            cfg.fps = fps;
        }
        if let Some(roi) = self.roi {
            cfg.default_roi = roi;
        }
        if let Some(size) = self.output_size {
            cfg.output_size = size;
        }
        if let Some(policy) = self.short_read {
            cfg.short_read = policy;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    fn build<B: VideoBackend>(&self, backend: B) -> Result<AnomalyDataset<B>> {
        let cfg = self.config()?;
        let dataset = match (&self.label_dir, &self.annotation) {
            (Some(dir), _) => AnomalyDataset::from_label_dir(dir, cfg, backend)
                .with_context(|| format!("Failed to index {}", dir.display()))?,
            (None, Some(ann)) => AnomalyDataset::from_annotation(ann, cfg, backend)
                .with_context(|| format!("Failed to index {}", ann.display()))?,
            (None, None) => anyhow::bail!("Either --label-dir or --annotation is required"),
        };
        Ok(dataset)
    }
}

#[cfg(feature = "opencv")]
fn video_backend() -> Result<anomaly_frames::decoder::OpenCvBackend> {
    Ok(anomaly_frames::decoder::OpenCvBackend::new())
}

#[cfg(not(feature = "opencv"))]
fn video_backend() -> Result<anomaly_frames::decoder::MemoryBackend> {
    anyhow::bail!("Video decoding needs the `opencv` feature; rebuild with --features opencv")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init("info", cli.json_logs);

    match &cli.command {
        Commands::Summary { dataset } => {
            let dataset = dataset.build(video_backend()?)?;
            println!("{}", serde_json::to_string_pretty(&dataset.summary())?);
        }
        Commands::Extract {
            dataset,
            index,
            output_dir,
        } => {
            let dataset = dataset.build(video_backend()?)?;
            write_sample(&dataset, *index, output_dir)?;
        }
    }

    Ok(())
}

fn write_sample<B: VideoBackend>(dataset: &AnomalyDataset<B>, index: usize, output_dir: &Path) -> Result<()> {
    let item = dataset.get(index)?;
    let sample = dataset
        .sample(index)
        .context("Sample vanished between get and lookup")?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let [frames, _, size, _] = item.sequence.shape();
    for t in 0..frames {
        let rgb = item
            .sequence
            .frame_rgb8(t)
            .context("Frame index out of range")?;
        let image = image::RgbImage::from_raw(size as u32, size as u32, rgb)
            .context("Frame buffer does not match its shape")?;
        let path = output_dir.join(format!("frame_{t:03}.png"));
        image
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let meta = json!({
        "index": index,
        "video": sample.video.display().to_string(),
        "start": sample.start,
        "label": item.label,
        "roi": sample.roi.as_array(),
        "shape": item.sequence.shape(),
    });
    let meta_path = output_dir.join("sample.json");
    fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)
        .with_context(|| format!("Failed to write {}", meta_path.display()))?;

    tracing::info!(index, frames, dir = %output_dir.display(), "sample written");
    Ok(())
}
