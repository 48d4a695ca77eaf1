//! CLI entry point for spliceanno.
//!
//! Reads a VCF, annotates every record against the transcripts of a GTF,
//! and writes the VCF back with four additional INFO fields.

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender};
use log::{error, info, warn, Level};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use spliceanno::annotator::annotate_variant;
use spliceanno::config::{
    AnnotateConfig, GtfTags, DEFAULT_EXONIC_MIN_DISTANCE, DEFAULT_INTRONIC_MIN_DISTANCE,
    MAX_MIN_DISTANCE,
};
use spliceanno::output::{format_output_line, write_header};
use spliceanno::parser::util::create_writer;
use spliceanno::parser::{parse_gtf, VcfReader, VcfRecord};
use spliceanno::store::GenomeFeatureStore;

/// Splice-region annotation of VCF variants.
///
/// Annotates each variant with the genes and transcripts whose exon/intron
/// boundaries lie within the configured distances.
#[derive(Parser, Debug)]
#[command(name = "spliceanno")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Variants to annotate (VCF, optionally gzipped)
    variants: PathBuf,

    /// Transcript annotation (GTF, optionally gzipped)
    gtf: PathBuf,

    /// Maximum distance from the start/end of an exon to annotate a variant
    /// in exonic space as relevant to splicing [default: 3]
    #[arg(short = 'e', long = "exonic-distance")]
    exonic_distance: Option<i64>,

    /// Maximum distance from the start/end of an exon to annotate a variant
    /// in intronic space as relevant to splicing [default: 2]
    #[arg(short = 'i', long = "intronic-distance")]
    intronic_distance: Option<i64>,

    /// Annotate every variant in exonic space within a transcript
    #[arg(short = 'E', long = "all-exonic")]
    all_exonic: bool,

    /// Annotate every variant in intronic space within a transcript
    #[arg(short = 'I', long = "all-intronic")]
    all_intronic: bool,

    /// Don't skip single exon transcripts
    #[arg(short = 'S', long = "keep-single-exon")]
    keep_single_exon: bool,

    /// Output file (stdout when omitted, gzipped when ending in .gz)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// GTF tag for gene ID
    #[arg(short = 'G', long = "gene-tag", default_value = "gene_id")]
    gene_tag: String,

    /// GTF tag for transcript ID
    #[arg(short = 'T', long = "transcript-tag", default_value = "transcript_id")]
    transcript_tag: String,

    /// Number of worker threads (0 = auto-detect, 1 = sequential)
    #[arg(long = "threads", short = 'j', default_value = "1")]
    threads: usize,

    /// Batch size for streaming VCF records in parallel mode
    #[arg(long = "batch-size", default_value = "5000")]
    batch_size: usize,

    /// Log debug messages
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy)]
struct RunSummary {
    records: u64,
    splice_relevant: u64,
}

impl RunSummary {
    fn add(&mut self, other: RunSummary) {
        self.records += other.records;
        self.splice_relevant += other.splice_relevant;
    }
}

fn main() {
    let start = Instant::now();
    let args = Args::parse();

    let level = if args.verbose { Level::Debug } else { Level::Info };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("Failed to initialise logger: {}", e);
    }

    if let Err(e) = run(&args) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    info!("Elapsed time: {:?}", start.elapsed());
}

/// Build the annotation settings from the command line.
fn build_config(args: &Args) -> Result<AnnotateConfig> {
    let mut config = AnnotateConfig::new();

    if args.all_intronic && args.intronic_distance.is_some() {
        warn!("-I annotates all intronic space; -i only sets the bin search radius");
    }
    if args.all_exonic && args.exonic_distance.is_some() {
        warn!("-E annotates all exonic space; -e has no effect");
    }

    config.exonic_min_distance = args.exonic_distance.unwrap_or(DEFAULT_EXONIC_MIN_DISTANCE);
    if config.exonic_min_distance < 0 {
        bail!("The exonic distance cannot be lower than 0 bps.");
    }
    if config.exonic_min_distance > MAX_MIN_DISTANCE {
        bail!(
            "The exonic distance cannot be greater than {} bps.",
            MAX_MIN_DISTANCE
        );
    }

    config.intronic_min_distance = args
        .intronic_distance
        .unwrap_or(DEFAULT_INTRONIC_MIN_DISTANCE);
    if config.intronic_min_distance < 0 {
        bail!("The intronic distance cannot be lower than 0 bps.");
    }
    if config.intronic_min_distance > MAX_MIN_DISTANCE {
        bail!(
            "The intronic distance cannot be greater than {} bps.",
            MAX_MIN_DISTANCE
        );
    }

    config.all_exonic_space = args.all_exonic;
    config.all_intronic_space = args.all_intronic;
    config.skip_single_exon_transcripts = !args.keep_single_exon;

    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    // Validate inputs
    if !args.variants.exists() {
        bail!("Variant file not found: {}", args.variants.display());
    }
    if !args.gtf.exists() {
        bail!("GTF file not found: {}", args.gtf.display());
    }
    if args.batch_size == 0 {
        bail!("Batch size must be greater than 0");
    }

    let config = build_config(args)?;
    let tags = GtfTags {
        gene_id: args.gene_tag.clone(),
        transcript_id: args.transcript_tag.clone(),
    };

    info!("Variant file: {}", args.variants.display());
    info!("GTF file: {}", args.gtf.display());
    match &args.output {
        Some(path) => info!("Output file: {}", path.display()),
        None => info!("Output file: stdout"),
    }
    if !config.all_intronic_space {
        info!("Intronic min distance: {}", config.intronic_min_distance);
    }
    if !config.all_exonic_space {
        info!("Exonic min distance: {}", config.exonic_min_distance);
    }
    if !config.skip_single_exon_transcripts {
        info!("Not skipping single exon transcripts.");
    }

    let store = parse_gtf(&args.gtf, &tags)?;
    let stats = store.stats();
    info!(
        "Loaded {} transcripts of {} genes on {} chromosomes ({} exons, {} single-exon transcripts)",
        stats.transcripts, stats.genes, stats.chromosomes, stats.exons, stats.single_exon_transcripts
    );
    if store.is_empty() {
        warn!("No exons found in {}", args.gtf.display());
    }

    let num_threads = if args.threads == 0 {
        num_cpus::get()
    } else {
        args.threads
    };

    let summary = if num_threads == 1 {
        run_sequential(args, &store, &config)?
    } else {
        run_parallel(args, store, config, num_threads)?
    };

    info!(
        "Annotated {} records, {} in a splice region",
        summary.records, summary.splice_relevant
    );
    Ok(())
}

/// Annotate one record and format its output line.
fn annotate_record(
    record: &VcfRecord,
    store: &GenomeFeatureStore,
    config: &AnnotateConfig,
) -> Result<(String, bool)> {
    let variant = record.variant();
    let annotated = annotate_variant(&variant, store, config).with_context(|| {
        format!(
            "Failed to annotate VCF line {} ({}:{})",
            record.line_number,
            variant.chrom,
            variant.coordinate()
        )
    })?;
    if !store.contains_chrom(&variant.chrom) {
        log::debug!("Chromosome {} not in GTF", variant.chrom);
    }
    Ok((
        format_output_line(record, &annotated),
        annotated.is_splice_relevant(),
    ))
}

/// Sequential implementation: one record at a time.
fn run_sequential(
    args: &Args,
    store: &GenomeFeatureStore,
    config: &AnnotateConfig,
) -> Result<RunSummary> {
    let mut reader = VcfReader::new(&args.variants)?;
    let mut writer = create_writer(args.output.as_deref())?;
    write_header(&mut writer, reader.header())?;

    let mut summary = RunSummary::default();
    while let Some(record) = reader.read_record()? {
        let (line, relevant) = annotate_record(&record, store, config)?;
        writeln!(writer, "{}", line).context("Failed to write output record")?;

        summary.records += 1;
        if relevant {
            summary.splice_relevant += 1;
        }
    }

    writer.flush().context("Failed to flush output")?;
    Ok(summary)
}

/// Work item for the parallel pipeline.
struct WorkItem {
    /// Sequence number for ordering (file order).
    seq_id: u64,
    /// Records to process, in file order.
    records: Vec<VcfRecord>,
}

/// Result from processing a work item.
struct WorkResult {
    /// Sequence number matching the input WorkItem.
    seq_id: u64,
    /// Output lines in the same order as the input records.
    lines: Result<Vec<String>>,
    summary: RunSummary,
}

/// Parallel implementation with streaming.
///
/// Records are read in batches, annotated by a pool of workers, and written
/// back in input order by a dedicated writer thread, so the output is
/// identical to the sequential mode.
fn run_parallel(
    args: &Args,
    store: GenomeFeatureStore,
    config: AnnotateConfig,
    num_threads: usize,
) -> Result<RunSummary> {
    info!("Using parallel mode with {} threads", num_threads);

    let mut reader = VcfReader::new(&args.variants)?;
    let mut writer = create_writer(args.output.as_deref())?;
    write_header(&mut writer, reader.header())?;

    let (work_tx, work_rx): (Sender<WorkItem>, Receiver<WorkItem>) = bounded(num_threads * 4);
    let (result_tx, result_rx): (Sender<WorkResult>, Receiver<WorkResult>) =
        bounded(num_threads * 16);

    let writer_handle = thread::spawn(move || write_results_ordered(writer, result_rx));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("Failed to create thread pool")?;

    let store = Arc::new(store);
    let config = Arc::new(config);

    // Spawn workers in a separate thread to avoid blocking the producer
    let workers_handle = thread::spawn(move || {
        pool.scope(|s| {
            for _ in 0..num_threads {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let store = Arc::clone(&store);
                let config = Arc::clone(&config);

                s.spawn(move |_| {
                    worker_loop(work_rx, result_tx, &store, &config);
                });
            }
        });
    });

    // Producer: read the VCF in chunks
    let mut seq_id = 0;
    let mut read_error = None;
    loop {
        match reader.read_chunk(args.batch_size) {
            Ok(Some(records)) => {
                if work_tx.send(WorkItem { seq_id, records }).is_err() {
                    break;
                }
                seq_id += 1;
            }
            Ok(None) => break,
            Err(e) => {
                read_error = Some(e);
                break;
            }
        }
    }

    // Close work channel to signal workers to exit
    drop(work_tx);

    workers_handle
        .join()
        .map_err(|_| anyhow::anyhow!("Worker thread panicked"))?;

    let summary = writer_handle
        .join()
        .map_err(|_| anyhow::anyhow!("Writer thread panicked"))??;

    if let Some(e) = read_error {
        return Err(e);
    }

    Ok(summary)
}

/// Worker loop: receives work items and sends results.
fn worker_loop(
    work_rx: Receiver<WorkItem>,
    result_tx: Sender<WorkResult>,
    store: &GenomeFeatureStore,
    config: &AnnotateConfig,
) {
    while let Ok(work_item) = work_rx.recv() {
        let mut summary = RunSummary::default();
        let lines = work_item
            .records
            .iter()
            .map(|record| {
                let (line, relevant) = annotate_record(record, store, config)?;
                summary.records += 1;
                if relevant {
                    summary.splice_relevant += 1;
                }
                Ok(line)
            })
            .collect::<Result<Vec<String>>>();

        let work_result = WorkResult {
            seq_id: work_item.seq_id,
            lines,
            summary,
        };

        if result_tx.send(work_result).is_err() {
            break;
        }
    }
}

/// Write results in order, buffering out-of-order results.
fn write_results_ordered(
    mut writer: Box<dyn Write + Send>,
    result_rx: Receiver<WorkResult>,
) -> Result<RunSummary> {
    // Buffer for out-of-order results
    let mut pending: BTreeMap<u64, WorkResult> = BTreeMap::new();
    let mut next_expected: u64 = 0;
    let mut summary = RunSummary::default();

    for result in result_rx {
        pending.insert(result.seq_id, result);

        // Write all ready consecutive results
        while let Some(ready) = pending.remove(&next_expected) {
            for line in ready.lines? {
                writeln!(writer, "{}", line).context("Failed to write output record")?;
            }
            summary.add(ready.summary);
            next_expected += 1;
        }
    }

    if !pending.is_empty() {
        bail!("{} annotated batches were never written", pending.len());
    }

    writer.flush().context("Failed to flush output")?;
    Ok(summary)
}
