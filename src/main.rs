/*
 * Copyright (c) 2026 Yumechi <yume@yumechi.jp>
 *
 * Created on Thursday, October 15, 2026
 * Author: Yumechi <yume@yumechi.jp>
 *
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use clap::{Arg, ArgAction, ArgMatches, Command, error::ErrorKind, value_parser};
use flexi_logger::{Logger, LoggerHandle};
use std::{
    fmt::Display,
    hash::{BuildHasher, RandomState},
    num::NonZeroUsize,
    path::PathBuf,
    process::ExitCode,
};

use luma_bench::{
    BenchmarkResult, BenchmarkRunner, ChannelOrder, PixelBuffer,
    error::Error,
    io,
    kernel::{
        Kernel, LoopKernel, SmartKernelConcreteType, VectorKernel, portable_kernel, smart_kernel,
    },
    synthetic,
};

const EXIT_INVALID_INPUT: u8 = 1;
const EXIT_RESOURCE: u8 = 2;
const EXIT_BAD_ARGUMENTS: u8 = 255;

fn build_cli() -> Command {
    Command::new("luma-bench")
        .about("Compare a per-pixel loop against bulk plane arithmetic for RGB to grayscale conversion")
        .long_about(concat!(
r#"
Converts a color image to grayscale twice: once with an explicit row-major loop over
every pixel, once with whole-plane multiply-accumulate (hand-vectorized with AVX2 when
the CPU supports it). Both outputs are saved and both conversions are timed.

Build Facts:
  Version: "#, env!("CARGO_PKG_VERSION")
        ))
        .version(env!("CARGO_PKG_VERSION"))
        .flatten_help(true)
        .arg(
            Arg::new("log_level")
                .long("log-level")
                .help("Log level filter")
                .long_help("Log level filter passed to the logger, e.g. 'info', 'debug' or 'luma_bench=trace'. RUST_LOG takes precedence.")
                .global(true)
                .default_value("info"),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert an image file with both kernels and save the results")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .help("Input image path")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("images/sample.jpg"),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .help("Directory for the grayscale images")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("."),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .help("Output file extension")
                        .long_help("Extension of the saved grayscale images. Decides the encoder.")
                        .value_parser(["png", "jpg"])
                        .default_value("png"),
                )
                .arg(repetitions_arg())
                .arg(kernel_arg())
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .help("Reject images that are not 8-bit RGB")
                        .long_help("Reject images that are not 8-bit RGB instead of dropping alpha and narrowing deeper samples.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("bgr")
                        .long("bgr")
                        .help("Treat samples as blue, green, red")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("synthetic")
                .about("Benchmark both kernels on a generated image")
                .long_about("Benchmark both kernels on a generated noise image, without reading or writing any file.")
                .arg(
                    Arg::new("height")
                        .long("height")
                        .help("Image height")
                        .value_parser(value_parser!(usize))
                        .default_value("1080"),
                )
                .arg(
                    Arg::new("width")
                        .long("width")
                        .help("Image width")
                        .value_parser(value_parser!(usize))
                        .default_value("1920"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Noise seed, random if omitted")
                        .value_parser(value_parser!(u64)),
                )
                .arg(repetitions_arg())
                .arg(kernel_arg()),
        )
        .subcommand(
            Command::new("vectorization-info")
                .about("Display vectorization information")
                .long_about(
                    "Displays which bulk kernel the runtime router selects on this CPU and why.",
                ),
        )
        .subcommand(
            Command::new("bench")
                .hide(!cfg!(feature = "cli-bench"))
                .about("Run a formal benchmark")
                .long_about(
                    "Run a formal benchmark using Criterion.rs on an internal synthetic 1920x1080 image.",
                ),
        )
}

fn repetitions_arg() -> Arg {
    Arg::new("repetitions")
        .short('n')
        .long("repetitions")
        .help("Calls per kernel, the fastest is reported")
        .value_parser(value_parser!(NonZeroUsize))
        .default_value("1")
}

fn kernel_arg() -> Arg {
    Arg::new("kernel")
        .long("kernel")
        .help("Bulk kernel selection")
        .long_help("'auto' lets the router pick the fastest bulk kernel for this CPU, 'portable' pins the portable kernel.")
        .value_parser(["auto", "portable"])
        .default_value("auto")
}

fn setup_logging(level: &str) -> Option<LoggerHandle> {
    match Logger::try_with_env_or_str(level).and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Logger initialization failed: {e}");
            None
        }
    }
}

fn selected_kernel(matches: &ArgMatches) -> SmartKernelConcreteType {
    match matches.get_one::<String>("kernel").map(String::as_str) {
        Some("portable") => portable_kernel(),
        _ => smart_kernel(),
    }
}

fn repetitions(matches: &ArgMatches) -> NonZeroUsize {
    matches
        .get_one::<NonZeroUsize>("repetitions")
        .copied()
        .unwrap_or(NonZeroUsize::MIN)
}

fn print_report(result: &BenchmarkResult, reference: impl Display, candidate: impl Display) {
    let mpx = result.pixels() as f64 / 1e6;

    println!("[Reference] {reference}:");
    println!("Time taken: {:.4} seconds.", result.loop_seconds());
    println!();
    println!("[Bulk] {candidate}:");
    println!("Time taken: {:.4} seconds.", result.vector_seconds());
    println!();

    if result.vector_seconds() > 0.0 {
        println!("Bulk conversion speedup: ~{:.1}x", result.speedup());
        println!(
            "Throughput: {:.1} Mpx/s (reference), {:.1} Mpx/s (bulk)",
            mpx / result.loop_seconds().max(f64::MIN_POSITIVE),
            mpx / result.vector_seconds()
        );
    } else {
        println!("Bulk conversion finished below timer resolution.");
    }
    println!("Max per-pixel difference: {}", result.max_abs_difference());
}

fn convert(matches: &ArgMatches) -> Result<(), Error> {
    let input = matches
        .get_one::<PathBuf>("input")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("images/sample.jpg"));
    let output_dir = matches
        .get_one::<PathBuf>("output_dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let format = matches
        .get_one::<String>("format")
        .map_or("png", String::as_str);
    let order = if matches.get_flag("bgr") {
        ChannelOrder::Bgr
    } else {
        ChannelOrder::Rgb
    };

    let img = if matches.get_flag("strict") {
        io::load_rgb8(&input)?
    } else {
        io::load_rgb8_coerced(&input)?
    };
    let buffer = io::pixel_buffer(&img).with_order(order);

    println!(
        "Processing a ({}, {}, 3) image...\n",
        buffer.height(),
        buffer.width()
    );

    let mut runner =
        BenchmarkRunner::new(LoopKernel, selected_kernel(matches)).repetitions(repetitions(matches));
    let result = runner.run(&buffer)?;
    print_report(&result, runner.reference().ident(), runner.candidate().ident());

    let (loop_output, vector_output) = result.into_outputs();
    for (name, gray) in [("loop", &loop_output), ("vectorized", &vector_output)] {
        let path = output_dir.join(format!("grayscale_{name}.{format}"));
        io::save_luma8(&path, gray)?;
        log::info!("saved {}", path.display());
    }

    Ok(())
}

fn synthetic(matches: &ArgMatches) -> Result<(), Error> {
    let height = matches.get_one::<usize>("height").copied().unwrap_or(1080);
    let width = matches.get_one::<usize>("width").copied().unwrap_or(1920);
    let seed = matches
        .get_one::<u64>("seed")
        .copied()
        .unwrap_or_else(|| RandomState::new().hash_one(0));
    log::debug!("synthetic noise seed: {seed}");

    let samples = synthetic::noise_rgb8(height, width, seed);
    let buffer = PixelBuffer::rgb8(&samples, height, width);

    println!("Processing a ({height}, {width}, 3) image...\n");

    let mut runner =
        BenchmarkRunner::new(LoopKernel, selected_kernel(matches)).repetitions(repetitions(matches));
    let result = runner.run(&buffer)?;
    print_report(&result, runner.reference().ident(), runner.candidate().ident());

    Ok(())
}

fn vectorization_info() {
    println!("=== Feature flag information ===\n");
    println!("  Target architecture: {}", std::env::consts::ARCH);

    println!("\n=== Runtime Routing Information ===\n");

    let kernel = smart_kernel();
    let ident = kernel.ident();

    println!("  Runtime decision: {ident}");
    println!();
    println!("  Runtime decision details: {ident:?}");
    println!();
    println!("  Router type: {}", std::any::type_name_of_val(&kernel));
    println!("  Portable kernel: {}", VectorKernel.ident());
}

#[cfg(feature = "cli-bench")]
fn formal_bench() {
    use criterion::{BenchmarkId, Throughput, black_box};

    let mut crit = criterion::Criterion::default().without_plots();
    let (height, width) = (1080, 1920);
    let samples = synthetic::noise_rgb8(height, width, RandomState::new().hash_one(0));
    let input = PixelBuffer::rgb8(&samples, height, width);

    let mut group = crit.benchmark_group("rgb8_to_luma8");
    group.throughput(Throughput::Elements((height * width) as u64));

    group.bench_function(BenchmarkId::new("loop", "1920x1080"), |b| {
        let mut kernel = LoopKernel;
        b.iter(|| kernel.convert(black_box(&input)));
    });
    group.bench_function(BenchmarkId::new("portable", "1920x1080"), |b| {
        let mut kernel = portable_kernel();
        b.iter(|| kernel.convert(black_box(&input)));
    });
    group.bench_function(BenchmarkId::new("smart", "1920x1080"), |b| {
        let mut kernel = smart_kernel();
        b.iter(|| kernel.convert(black_box(&input)));
    });

    group.finish();
    crit.final_summary();
}

fn exit_code_for(error: &Error) -> u8 {
    if error.is_invalid_input() {
        EXIT_INVALID_INPUT
    } else {
        EXIT_RESOURCE
    }
}

fn usage_exit_code(error: &clap::Error) -> u8 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_BAD_ARGUMENTS,
    }
}

fn report_error(error: &Error) -> ExitCode {
    eprintln!("Error: {error}");
    ExitCode::from(exit_code_for(error))
}

fn main() -> ExitCode {
    let matches = match build_cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            // help and version go to stdout, usage errors to stderr
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };

    let _logger = setup_logging(
        matches
            .get_one::<String>("log_level")
            .map_or("info", String::as_str),
    );

    match matches.subcommand() {
        Some(("convert", sub_matches)) => match convert(sub_matches) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => report_error(&e),
        },
        Some(("synthetic", sub_matches)) => match synthetic(sub_matches) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => report_error(&e),
        },
        Some(("vectorization-info", _)) => {
            vectorization_info();
            ExitCode::SUCCESS
        }
        #[cfg(feature = "cli-bench")]
        Some(("bench", _)) => {
            formal_bench();
            ExitCode::SUCCESS
        }
        #[cfg(not(feature = "cli-bench"))]
        Some(("bench", _)) => {
            eprintln!("This binary was built without the 'cli-bench' feature.");
            ExitCode::from(EXIT_BAD_ARGUMENTS)
        }
        _ => {
            eprintln!("Invalid subcommand, try --help for usage");
            ExitCode::from(EXIT_BAD_ARGUMENTS)
        }
    }
}
