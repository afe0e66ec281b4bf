use std::fmt::{Display, Formatter};
use std::thread;

use anyhow::Error;
use benchmark_rs::benchmarks::Benchmarks;
use benchmark_rs::stopwatch::StopWatch;
use crossbeam_channel::bounded;
use simple_logger::SimpleLogger;

use ext_merge_sort::cancel::CancellationToken;
use ext_merge_sort::codec::Codec;
use ext_merge_sort::config::Config;
use ext_merge_sort::sort::Sorter;

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;
#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Clone)]
pub struct BenchmarkConfig {
    element_count: usize,
    num_workers: usize,
    chunk_size: usize,
    merge_fan_in: usize,
    description: String,
}

impl BenchmarkConfig {
    pub fn new(element_count: usize, num_workers: usize, chunk_size: usize, merge_fan_in: usize, description: &str) -> BenchmarkConfig {
        BenchmarkConfig {
            element_count,
            num_workers,
            chunk_size,
            merge_fan_in,
            description: description.to_string(),
        }
    }
}

impl Display for BenchmarkConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "elements: {}, workers: {}, chunk_size: {}, merge_fan_in: {}, description: {}",
            self.element_count, self.num_workers, self.chunk_size, self.merge_fan_in, self.description,
        )
    }
}

fn int_codec() -> Codec<i64> {
    Codec::new(
        |e: &i64| e.to_le_bytes().to_vec(),
        |bytes: &[u8]| Ok(i64::from_le_bytes(bytes.try_into()?)),
    )
}

// A cheap deterministic shuffle so repeated benchmark runs see the same input without needing a
// seed file on disk.
fn pseudo_shuffled(count: usize) -> Vec<i64> {
    let mut values: Vec<i64> = (0..count as i64).collect();
    let mut state: u64 = 0x9E3779B97F4A7C15;
    for i in (1..values.len()).rev() {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let j = (state >> 33) as usize % (i + 1);
        values.swap(i, j);
    }
    values
}

fn sort(stop_watch: &mut StopWatch, config: BenchmarkConfig, work: usize) -> Result<(), anyhow::Error> {
    stop_watch.pause();
    let values = pseudo_shuffled(work);
    log::info!("start sorting {} elements ({})", work, config.description);
    let sort_config = Config::default()
        .with_chunk_size(config.chunk_size)
        .with_num_workers(config.num_workers)
        .with_merge_fan_in(config.merge_fan_in);
    let (input_tx, input_rx) = bounded(0);
    let (sorter, output_rx, error_rx) = Sorter::new(input_rx, int_codec(), |a: &i64, b: &i64| a < b, sort_config)?;
    stop_watch.resume();

    sorter.sort(CancellationToken::new())?;
    let sender = thread::spawn(move || {
        for v in values {
            if input_tx.send(v).is_err() {
                break;
            }
        }
    });

    let mut count = 0usize;
    while output_rx.recv().is_ok() {
        count += 1;
    }
    sender.join().ok();
    if let Ok(e) = error_rx.try_recv() {
        return Err(anyhow::anyhow!("sort failed: {e}"));
    }
    stop_watch.pause();
    log::info!("finished sorting {} elements, got {} back", work, count);
    Ok(())
}

#[test]
fn ext_merge_sort_bench() -> Result<(), Error> {
    SimpleLogger::new().init().ok();
    log::info!("started ext_merge_sort_bench");

    let small = 100_000;
    let medium = 1_000_000;
    let large = 5_000_000;

    let mut benchmarks = Benchmarks::new("ext-merge-sort");

    for &workers in &[1usize, 2, 4, 8] {
        benchmarks.add(
            &format!("small-{workers}-workers"),
            sort,
            BenchmarkConfig::new(small, workers, 8192, 64, "small"),
            vec![small],
            3,
            0,
        )?;
        benchmarks.add(
            &format!("medium-{workers}-workers"),
            sort,
            BenchmarkConfig::new(medium, workers, 32768, 64, "medium"),
            vec![medium],
            3,
            0,
        )?;
        benchmarks.add(
            &format!("large-{workers}-workers"),
            sort,
            BenchmarkConfig::new(large, workers, 65536, 32, "large"),
            vec![large],
            3,
            0,
        )?;
    }

    benchmarks.run()?;
    benchmarks.save_to_csv(std::path::PathBuf::from("./target/benchmarks/"), true, true)?;
    benchmarks.save_to_json(std::path::PathBuf::from("./target/benchmarks/"))?;

    log::info!("finished ext_merge_sort_bench");
    Ok(())
}
