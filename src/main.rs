use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swp_arq::core::policy::SrRetransmitStrategy;
use swp_arq::simulation::{run_transfer, Variant};

/// Sliding-window ARQ protocol simulator.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single simulated transfer and report its statistics.
    Run {
        /// Protocol variant to simulate.
        #[arg(value_enum, default_value_t = VariantArg::GbnAck)]
        variant: VariantArg,
        /// Payload bytes per packet.
        #[arg(short, long, default_value_t = 256)]
        packet_size: usize,
        /// Largest sequence number for the `sr` variant (ignored otherwise).
        #[arg(long, default_value_t = 63)]
        sr_max_seq: u8,
        /// Retransmit-target strategy for the `sr` variant.
        #[arg(long, value_enum, default_value_t = SrStrategyArg::SingleSlot)]
        sr_strategy: SrStrategyArg,
    },
    /// Sweep packet size across a range, running each variant in parallel.
    Sweep {
        /// Smallest packet size to try.
        #[arg(long, default_value_t = 64)]
        min_packet_size: usize,
        /// Largest packet size to try.
        #[arg(long, default_value_t = 2048)]
        max_packet_size: usize,
        /// Number of packet sizes to sample between min and max.
        #[arg(long, default_value_t = 8)]
        steps: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    GbnAck,
    GbnNak,
    GbnNoAck,
    Sr,
}

#[derive(Clone, Copy, ValueEnum)]
enum SrStrategyArg {
    SingleSlot,
    OldestScan,
}

impl From<SrStrategyArg> for SrRetransmitStrategy {
    fn from(value: SrStrategyArg) -> Self {
        match value {
            SrStrategyArg::SingleSlot => SrRetransmitStrategy::SingleSlot,
            SrStrategyArg::OldestScan => SrRetransmitStrategy::OldestScan,
        }
    }
}

fn to_variant(arg: VariantArg, sr_max_seq: u8, sr_strategy: SrStrategyArg) -> Variant {
    match arg {
        VariantArg::GbnAck => Variant::GbnAck,
        VariantArg::GbnNak => Variant::GbnNak,
        VariantArg::GbnNoAck => Variant::GbnNoAck,
        VariantArg::Sr => Variant::Sr {
            max_seq: sr_max_seq,
            strategy: sr_strategy.into(),
        },
    }
}

fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            variant,
            packet_size,
            sr_max_seq,
            sr_strategy,
        } => {
            let variant = to_variant(variant, sr_max_seq, sr_strategy);
            let report = run_transfer(variant, packet_size);
            info!(
                %variant,
                packet_size,
                goodput = report.goodput,
                retransmissions = report.retransmissions,
                elapsed = report.elapsed_seconds,
                completed = report.completed,
                "Transfer finished"
            );
        }

        Command::Sweep {
            min_packet_size,
            max_packet_size,
            steps,
        } => {
            let variants = [
                Variant::GbnAck,
                Variant::GbnNak,
                Variant::GbnNoAck,
                Variant::Sr {
                    max_seq: 63,
                    strategy: SrRetransmitStrategy::SingleSlot,
                },
            ];

            let (min_packet_size, max_packet_size) = if min_packet_size <= max_packet_size {
                (min_packet_size, max_packet_size)
            } else {
                (max_packet_size, min_packet_size)
            };

            let step = ((max_packet_size - min_packet_size) / steps.max(1)).max(1);
            let packet_sizes: Vec<usize> = (0..=steps).map(|i| min_packet_size + i * step).collect();

            let jobs: Vec<(Variant, usize)> = variants
                .iter()
                .flat_map(|v| packet_sizes.iter().map(move |&size| (*v, size)))
                .collect();

            let progress = ProgressBar::new(jobs.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );

            let results: Vec<(Variant, usize, f64, u64)> = jobs
                .into_par_iter()
                .map(|(variant, packet_size)| {
                    let report = run_transfer(variant, packet_size);
                    progress.inc(1);
                    (variant, packet_size, report.goodput, report.retransmissions)
                })
                .collect();

            progress.finish_and_clear();

            for (variant, packet_size, goodput, retransmissions) in results {
                info!(%variant, packet_size, goodput, retransmissions, "Sweep point");
            }
        }
    }
}
