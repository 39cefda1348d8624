//! Autocorrelation CLI
//!
//! Command-line interface for the autocorrelation library.
//! Provides an interactive shell to load frames, place the ROI, tune the
//! parameter bundle and run the spatial, temporal and wavelength operations.

use std::process;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use autocorr_lib::{
    params::presets,
    synthetic,
    utils::format_time,
    AcfEngine, AcfParams, BandResolution, Calibration, CurveSet, Roi, RoiShape, Sequence,
    SpacingScheme, StackMode, TemporalMode, WavelengthResult,
};

#[cfg(feature = "image")]
use autocorr_lib::bandpass::image::{save_grid, save_mask, ColorMap};
#[cfg(feature = "image")]
use autocorr_lib::Frame;

/// Application state
struct AppState {
    engine: AcfEngine,
    source: Option<String>,
    last: Option<CurveSet>,
    last_series: Option<CurveSet>,
    last_wavelength: Option<WavelengthResult>,
}

impl AppState {
    fn new() -> Self {
        Self {
            engine: AcfEngine::new(),
            source: None,
            last: None,
            last_series: None,
            last_wavelength: None,
        }
    }

    fn load(&mut self, sequence: Sequence, source: String) {
        self.engine.load_sequence(sequence);
        self.engine.clear_roi();
        self.source = Some(source);
        self.last = None;
        self.last_series = None;
        self.last_wavelength = None;
    }
}

/// Print the help message showing available commands
fn print_help() {
    println!("Available commands:");
    println!("  load <file> [file...]              - Load one image per frame (grayscale)");
    println!("  synth <kind> [size] [frames] [seed] - Generate a synthetic sequence");
    println!("  roi <cx> <cy> <radius> [shape]     - Place the ROI (shape: circle, square)");
    println!("  roi bounds <x> <y> <w> <h>         - ROI inscribed in a rectangle");
    println!("  roi reset                          - Centre the ROI on the frame");
    println!("  set <parameter> <value>            - Change a parameter");
    println!("  calibrate pixel <size> [height] <unit> - Set the pixel size");
    println!("  calibrate time <interval> <unit>   - Set the frame interval");
    println!("  calibrate reset                    - Remove the calibration");
    println!("  config                             - Show the parameter bundle");
    println!("  preset <n>                         - Load a parameter preset");
    println!("  presets                            - List available presets");
    println!("  spatial                            - Spatial ACF (current frame or stack)");
    println!("  temporal                           - Temporal ACF in the configured mode");
    println!("  pixel                              - Pooled pixel temporal ACF");
    println!("  area                               - Temporal ACF of growing sub-ROI means");
    println!("  wavelength                         - Wavelength-resolved temporal ACF");
    println!("  amplitude                          - Amplitude curve of the last wavelength run");
    println!("  bands                              - Show the filter bank for the current ROI");
    println!("  series                             - Show the intensity series of the last run");
    println!("  export <file> [acf|series|amplitude] - Write a result as tab separated text");
    println!("  filters <prefix> [colormap]        - Save every band mask as an image");
    println!("  filtered <prefix> [colormap]       - Save the filtered frames of the display band");
    println!("                                       (colormap: grayscale, diverging)");
    println!("  status                             - Show engine status");
    println!("  help                               - Show this help message");
    println!("  quit                               - Exit the program");
    println!();
    println!("Parameters:");
    println!("  fft on|off, shape circle|square, stack none|all|mean, temporal pixels|area,");
    println!("  spacing pow2|linear|inverse, bands <n>, step <percent>, smooth on|off,");
    println!("  spatial_cal on|off, time_cal on|off, centered on|off, collect on|off,");
    println!("  display_band <n>|off, masks on|off, frame <n>");
    println!();
    println!("Synthetic kinds: constant, sine, stripes, noise, speckle, drift");
    println!();
    println!("Examples:");
    println!("  synth drift 64 32");
    println!("  roi 32 32 16 circle");
    println!("  set spacing linear");
    println!("  set bands 8");
    println!("  wavelength");
    println!("  export bands.tsv amplitude");
    println!("  filters mask_");
    println!("  filtered band_ diverging");
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(feature = "image")]
fn parse_colormap(name: Option<&&str>) -> ColorMap {
    match name.map(|n| n.to_lowercase()).as_deref() {
        None | Some("grayscale") | Some("gray") => ColorMap::Grayscale,
        Some("diverging") | Some("signed") => ColorMap::Diverging,
        Some(other) => {
            log::warn!("Unknown colormap: {}. Using grayscale.", other);
            ColorMap::Grayscale
        }
    }
}

#[cfg(feature = "image")]
fn load_images(paths: &[&str]) -> Result<Sequence, String> {
    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        let img = image::open(path)
            .map_err(|e| format!("Failed to open {}: {}", path, e))?
            .to_luma32f();
        let (width, height) = (img.width() as usize, img.height() as usize);
        let frame = Frame::from_f32(width, height, img.as_raw()).map_err(|e| e.to_string())?;
        frames.push(frame);
    }
    Sequence::new(frames).map_err(|e| e.to_string())
}

fn synthesize(kind: &str, size: usize, frames: usize, seed: u64) -> autocorr_lib::Result<Sequence> {
    match kind {
        "constant" => synthetic::constant_stack(size, size, 10.0, frames),
        "sine" => synthetic::sine_stack(size, size, frames, 3.0, 10.0, 1.0),
        "stripes" => Ok(Sequence::single(synthetic::stripes(size, size, 8.0)?)),
        "noise" => Sequence::new(
            (0..frames as u64)
                .map(|t| synthetic::noise(size, size, 1.0, seed + t))
                .collect::<autocorr_lib::Result<Vec<_>>>()?,
        ),
        "speckle" => Ok(Sequence::single(synthetic::speckle(size, size, 4.0, seed)?)),
        "drift" => synthetic::drifting_speckle(size, size, frames, 4.0, 1.0, seed),
        _ => Err(autocorr_lib::AcfError::InvalidParameter(format!(
            "unknown synthetic kind '{}'",
            kind
        ))),
    }
}

fn print_curves(set: &CurveSet) {
    println!("{} ({} curve(s), {} points)", set.title, set.len(), set.bin_count());
    for warning in &set.warnings {
        println!("  warning: {}", warning);
    }
    if let Some((min, max)) = set.extrema() {
        println!("  {} range: {:.4} .. {:.4}", set.y_label, min, max);
    }
    print!("{}", set.to_table());
}

fn print_config(state: &AppState) {
    let params = state.engine.params();
    let calibration = state.engine.calibration();
    println!("Current Configuration:");
    println!("  FFT: {}", if params.use_fft { "on" } else { "off (exact scan)" });
    println!("  ROI shape: {}", params.roi_shape);
    println!("  Stack mode: {}", params.stack_mode);
    println!("  Temporal mode: {}", params.temporal_mode.name());
    println!("  Spacing: {}", params.spacing);
    match params.resolution {
        BandResolution::Count(k) => println!("  Bands: {}", k),
        BandResolution::StepPercent(p) => {
            println!("  Band step: {}% ({} bands)", p, params.requested_bands())
        }
    }
    println!("  Masks: {}", params.mask_mode().name());
    println!("  Spatial calibration: {}", params.use_spatial_calibration);
    println!("  Time calibration: {}", params.use_time_calibration);
    println!("  Centered intensity: {}", params.centered_intensity);
    println!("  Collect series: {}", params.collect_series);
    match params.display_band {
        Some(band) => println!("  Display band: {}", band + 1),
        None => println!("  Display band: off"),
    }
    println!("  Export masks: {}", params.export_masks);
    println!(
        "  Pixel size: {:?} x {:?} {}",
        calibration.pixel_width, calibration.pixel_height, calibration.spatial_unit
    );
    println!(
        "  Frame interval: {:?} {}",
        calibration.frame_interval, calibration.time_unit
    );
}

fn set_parameter(state: &mut AppState, param: &str, value: &str) -> Result<String, String> {
    let mut params = state.engine.params().clone();
    let switch = || parse_switch(value).ok_or_else(|| format!("Expected on or off, got {}", value));

    let message = match param {
        "fft" => {
            params.use_fft = switch()?;
            format!("FFT {}", if params.use_fft { "enabled" } else { "disabled" })
        }
        "shape" => {
            params.roi_shape = value.parse::<RoiShape>().map_err(|e| e.to_string())?;
            format!("ROI shape set to {}", params.roi_shape)
        }
        "stack" => {
            params.stack_mode = value.parse::<StackMode>().map_err(|e| e.to_string())?;
            format!("Stack mode set to {}", params.stack_mode)
        }
        "temporal" => {
            params.temporal_mode = value.parse::<TemporalMode>().map_err(|e| e.to_string())?;
            format!("Temporal mode set to {}", params.temporal_mode.name())
        }
        "spacing" => {
            params.spacing = value.parse::<SpacingScheme>().map_err(|e| e.to_string())?;
            format!("Spacing set to {}", params.spacing)
        }
        "bands" => {
            let k = value
                .parse::<usize>()
                .map_err(|_| format!("Invalid band count: {}", value))?;
            params.resolution = BandResolution::Count(k);
            format!("Band count set to {}", k)
        }
        "step" => {
            let p = value
                .trim_end_matches('%')
                .parse::<f64>()
                .map_err(|_| format!("Invalid band step: {}", value))?;
            params.resolution = BandResolution::StepPercent(p);
            format!("Band step set to {}%", p)
        }
        "smooth" => {
            params.smooth_bandpass = switch()?;
            format!("Masks set to {}", params.mask_mode().name())
        }
        "spatial_cal" => {
            params.use_spatial_calibration = switch()?;
            format!("Spatial calibration {}", params.use_spatial_calibration)
        }
        "time_cal" => {
            params.use_time_calibration = switch()?;
            format!("Time calibration {}", params.use_time_calibration)
        }
        "centered" => {
            params.centered_intensity = switch()?;
            format!("Centered intensity {}", params.centered_intensity)
        }
        "collect" => {
            params.collect_series = switch()?;
            format!("Collect series {}", params.collect_series)
        }
        "masks" => {
            params.export_masks = switch()?;
            format!("Export masks {}", params.export_masks)
        }
        "display_band" => {
            if parse_switch(value) == Some(false) {
                params.display_band = None;
                "Display band off".to_string()
            } else {
                let band = value
                    .parse::<usize>()
                    .ok()
                    .filter(|&b| b >= 1)
                    .ok_or_else(|| format!("Invalid band number: {}", value))?;
                params.display_band = Some(band - 1);
                format!("Display band set to {}", band)
            }
        }
        "frame" => {
            let frame = value
                .parse::<usize>()
                .ok()
                .filter(|&f| f >= 1)
                .ok_or_else(|| format!("Invalid frame number: {}", value))?;
            state
                .engine
                .set_current_frame(frame - 1)
                .map_err(|e| e.to_string())?;
            return Ok(format!("Current frame set to {}", frame));
        }
        _ => return Err(format!("Unknown parameter: {}", param)),
    };

    state.engine.set_params(params).map_err(|e| e.to_string())?;
    Ok(message)
}

fn calibrate(state: &mut AppState, parts: &[&str]) -> Result<String, String> {
    let number = |s: &str| {
        s.parse::<f64>()
            .map_err(|_| format!("Invalid number: {}", s))
    };
    let current = state.engine.calibration().clone();

    let (calibration, message) = match parts {
        ["reset"] => (Calibration::default(), "Calibration removed".to_string()),
        ["pixel", size, unit] => {
            let size = number(*size)?;
            (
                current.with_pixel_size(size, size, unit),
                format!("Pixel size set to {} {}", size, unit),
            )
        }
        ["pixel", width, height, unit] => {
            let (width, height) = (number(*width)?, number(*height)?);
            (
                current.with_pixel_size(width, height, unit),
                format!("Pixel size set to {} x {} {}", width, height, unit),
            )
        }
        ["time", interval, unit] => {
            let interval = number(*interval)?;
            (
                current.with_frame_interval(interval, unit),
                format!("Frame interval set to {} {}", interval, unit),
            )
        }
        _ => {
            return Err(
                "Usage: calibrate pixel <size> [height] <unit> | time <interval> <unit> | reset"
                    .to_string(),
            )
        }
    };

    state.engine.set_calibration(calibration);
    Ok(message)
}

/// Process a user command
fn process_command(command: &str, state: &mut AppState) {
    let parts: Vec<&str> = command.split_whitespace().collect();

    if parts.is_empty() {
        return;
    }

    match parts[0] {
        "load" => {
            if parts.len() < 2 {
                println!("Usage: load <file> [file...]");
                return;
            }

            #[cfg(feature = "image")]
            {
                log::info!("Loading {} file(s)", parts.len() - 1);
                match load_images(&parts[1..]) {
                    Ok(sequence) => {
                        let frames = sequence.len();
                        state.load(sequence, parts[1..].join(" "));
                        println!("Loaded {} frame(s)", frames);
                    }
                    Err(e) => println!("Error loading files: {}", e),
                }
            }

            #[cfg(not(feature = "image"))]
            {
                println!("Image loading not available. Compile with --features image");
            }
        }

        "synth" => {
            if parts.len() < 2 {
                println!("Usage: synth <kind> [size] [frames] [seed]");
                return;
            }
            let size = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(64);
            let frames = parts.get(3).and_then(|s| s.parse().ok()).unwrap_or(16);
            let seed = parts.get(4).and_then(|s| s.parse().ok()).unwrap_or(1);

            match synthesize(parts[1], size, frames, seed) {
                Ok(sequence) => {
                    let frames = sequence.len();
                    state.load(sequence, format!("synthetic {}", parts[1]));
                    println!("Generated {} frame(s) of {}x{}", frames, size, size);
                }
                Err(e) => println!("Error generating sequence: {}", e),
            }
        }

        "roi" => {
            let shape = state.engine.params().roi_shape;
            let number = |s: &str| s.parse::<f64>().ok();
            let roi = match parts[1..] {
                ["reset"] => {
                    state.engine.clear_roi();
                    println!("ROI reset to the frame centre");
                    return;
                }
                ["bounds", x, y, w, h] => match (number(x), number(y), number(w), number(h)) {
                    (Some(x), Some(y), Some(w), Some(h)) => Roi::from_bounds(x, y, w, h, shape),
                    _ => {
                        println!("Invalid bounds");
                        return;
                    }
                },
                [cx, cy, r] | [cx, cy, r, _] => match (number(cx), number(cy), number(r)) {
                    (Some(cx), Some(cy), Some(r)) => {
                        let shape = match parts.get(4) {
                            Some(name) => match name.parse::<RoiShape>() {
                                Ok(shape) => shape,
                                Err(e) => {
                                    println!("{}", e);
                                    return;
                                }
                            },
                            None => shape,
                        };
                        Roi::new(cx, cy, r, shape)
                    }
                    _ => {
                        println!("Invalid ROI geometry");
                        return;
                    }
                },
                _ => {
                    match state.engine.roi() {
                        Ok(roi) => println!("ROI: {}", roi),
                        Err(_) => println!("Usage: roi <cx> <cy> <radius> [shape]"),
                    }
                    return;
                }
            };

            match roi {
                Ok(roi) => {
                    state.engine.set_roi(roi);
                    println!("ROI set to {}", roi);
                }
                Err(e) => println!("Error setting ROI: {}", e),
            }
        }

        "set" => {
            if parts.len() != 3 {
                println!("Usage: set <parameter> <value>");
                return;
            }
            match set_parameter(state, parts[1], parts[2]) {
                Ok(message) => println!("{}", message),
                Err(e) => println!("Error: {}", e),
            }
        }

        "calibrate" => match calibrate(state, &parts[1..]) {
            Ok(message) => println!("{}", message),
            Err(e) => println!("Error: {}", e),
        },

        "config" => print_config(state),

        "preset" => {
            if parts.len() != 2 {
                println!("Usage: preset <number>");
                return;
            }

            match parts[1].parse::<usize>() {
                Ok(n) => match presets::get_preset_by_id(n) {
                    Some(params) => match state.engine.set_params(params) {
                        Ok(()) => println!("Applied preset {}", n),
                        Err(e) => println!("Error applying preset: {}", e),
                    },
                    None => println!("Invalid preset number: {}", n),
                },
                Err(_) => println!("Invalid preset number: {}", parts[1]),
            }
        }

        "presets" => {
            println!("Available presets:");
            for preset in presets::list_presets() {
                println!("  {}: {} - {}", preset.id, preset.name, preset.description);
            }
        }

        "spatial" => {
            let start = std::time::Instant::now();
            match state.engine.spatial() {
                Ok(set) => {
                    print_curves(&set);
                    log::info!(
                        "{} done in {}",
                        parts[0],
                        format_time(start.elapsed().as_secs_f64())
                    );
                    state.last = Some(set);
                }
                Err(e) => println!("Error: {}", e),
            }
        }

        "temporal" | "pixel" | "area" => {
            let start = std::time::Instant::now();
            let result = match parts[0] {
                "pixel" => state.engine.pixel_temporal(),
                "area" => state.engine.area_temporal(),
                _ => state.engine.temporal(),
            };
            match result {
                Ok(result) => {
                    print_curves(&result.acf);
                    if let Some(series) = &result.series {
                        println!("Collected {} intensity series", series.len());
                    }
                    log::info!(
                        "{} done in {}",
                        parts[0],
                        format_time(start.elapsed().as_secs_f64())
                    );
                    state.last = Some(result.acf);
                    state.last_series = result.series;
                }
                Err(e) => println!("Error: {}", e),
            }
        }

        "wavelength" => {
            let start = std::time::Instant::now();
            match state.engine.wavelength() {
                Ok(result) => {
                    print_curves(&result.acf);
                    println!(
                        "{} bands, {} spacing, {} masks",
                        result.bank.len(),
                        result.bank.scheme(),
                        result.bank.mode().name()
                    );
                    log::info!(
                        "{} done in {}",
                        parts[0],
                        format_time(start.elapsed().as_secs_f64())
                    );
                    state.last = Some(result.acf.clone());
                    state.last_series = result.series.clone();
                    state.last_wavelength = Some(result);
                }
                Err(e) => println!("Error: {}", e),
            }
        }

        "amplitude" => match &state.last_wavelength {
            Some(result) => print_curves(&result.amplitude),
            None => println!("No wavelength run yet. Run 'wavelength' first."),
        },

        "bands" => match state.engine.filter_bank() {
            Ok(bank) => {
                println!(
                    "{} spacing, {} masks, spectrum {}x{}",
                    bank.scheme(),
                    bank.mode().name(),
                    bank.fft_size(),
                    bank.fft_size()
                );
                for band in bank.bands() {
                    println!(
                        "  band {}: {:.4} .. {:.4}",
                        band.index + 1,
                        band.low_cutoff,
                        band.high_cutoff
                    );
                }
            }
            Err(e) => println!("Error: {}", e),
        },

        "series" => match &state.last_series {
            Some(series) => print_curves(series),
            None => println!("No series collected. Use 'set collect on' and run again."),
        },

        "export" => {
            if parts.len() < 2 {
                println!("Usage: export <file> [acf|series|amplitude]");
                return;
            }
            let set = match parts.get(2).copied().unwrap_or("acf") {
                "acf" => state.last.as_ref(),
                "series" => state.last_series.as_ref(),
                "amplitude" => state.last_wavelength.as_ref().map(|r| &r.amplitude),
                other => {
                    println!("Unknown result: {}", other);
                    return;
                }
            };
            match set {
                Some(set) => match std::fs::write(parts[1], set.to_table()) {
                    Ok(()) => println!("Wrote {} curve(s) to {}", set.len(), parts[1]),
                    Err(e) => println!("Error writing {}: {}", parts[1], e),
                },
                None => println!("Nothing to export yet"),
            }
        }

        "filters" => {
            #[cfg(feature = "image")]
            {
                if parts.len() < 2 {
                    println!("Usage: filters <prefix> [colormap]");
                    return;
                }
                let colormap = parse_colormap(parts.get(2));
                match state.engine.filter_bank() {
                    Ok(bank) => {
                        let bank = bank.with_masks();
                        for j in 0..bank.len() {
                            let path = format!("{}{:02}.png", parts[1], j + 1);
                            match save_mask(&bank, j, &path, colormap) {
                                Ok(()) => println!("Saved {}", path),
                                Err(e) => {
                                    println!("Error: {}", e);
                                    return;
                                }
                            }
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }

            #[cfg(not(feature = "image"))]
            {
                println!("Image export not available. Compile with --features image");
            }
        }

        "filtered" => {
            #[cfg(feature = "image")]
            {
                if parts.len() < 2 {
                    println!("Usage: filtered <prefix> [colormap]");
                    return;
                }
                let colormap = parse_colormap(parts.get(2));
                let Some(filtered) = state
                    .last_wavelength
                    .as_ref()
                    .and_then(|r| r.filtered.as_ref())
                else {
                    println!("No filtered frames. Use 'set display_band <n>' and run 'wavelength'.");
                    return;
                };
                for (t, frame) in filtered.frames.iter().enumerate() {
                    let path = format!("{}{:04}.png", parts[1], t + 1);
                    if let Err(e) = save_grid(frame, filtered.size, filtered.size, &path, colormap) {
                        println!("Error: {}", e);
                        return;
                    }
                }
                println!(
                    "Saved {} filtered frame(s) of band {}",
                    filtered.frames.len(),
                    filtered.band + 1
                );
            }

            #[cfg(not(feature = "image"))]
            {
                println!("Image export not available. Compile with --features image");
            }
        }

        "status" => {
            println!("Engine Status:");
            match &state.source {
                Some(source) => println!("  Source: {}", source),
                None => println!("  Source: none"),
            }
            if let Some(sequence) = state.engine.sequence() {
                println!(
                    "  Frames: {} of {}x{} (current {})",
                    sequence.len(),
                    sequence.width(),
                    sequence.height(),
                    state.engine.current_frame() + 1
                );
            }
            match state.engine.roi() {
                Ok(roi) => {
                    println!("  ROI: {}", roi);
                    if let Ok(size) = roi.fft_size() {
                        println!("  Spectrum size: {}, radial bins: {}", size, roi.bin_count());
                    }
                }
                Err(_) => println!("  ROI: none"),
            }
            if let Some(last) = &state.last {
                println!("  Last result: {} ({} curve(s))", last.title, last.len());
            }
        }

        "help" => print_help(),

        "quit" | "exit" => {
            println!("Goodbye!");
            process::exit(0);
        }

        _ => {
            println!("Unknown command: '{}'", parts[0]);
            println!("Type 'help' for available commands");
        }
    }
}

/// Command line definition
fn build_cli() -> Command {
    Command::new("Autocorrelation")
        .version(autocorr_lib::VERSION)
        .about("Spatial and temporal autocorrelation of image regions and stacks")
        .arg(
            Arg::new("files")
                .help("Image files to load as frames on startup")
                .value_name("FILE")
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("radius")
                .long("radius")
                .short('r')
                .help("ROI radius in pixels, centred on the frame")
                .value_name("RADIUS"),
        )
        .arg(
            Arg::new("shape")
                .long("shape")
                .short('s')
                .help("ROI shape (circle, square)")
                .value_name("SHAPE"),
        )
        .arg(
            Arg::new("spacing")
                .long("spacing")
                .help("Band spacing (pow2, linear, inverse)")
                .value_name("SCHEME"),
        )
        .arg(
            Arg::new("bands")
                .long("bands")
                .short('k')
                .help("Requested number of wavelength bands")
                .value_name("COUNT"),
        )
        .arg(
            Arg::new("smooth")
                .long("smooth")
                .help("Use smooth Gaussian-difference band masks")
                .action(ArgAction::SetTrue),
        )
}

/// Parameter bundle from the command line, invalid values keep their default
fn startup_params(matches: &ArgMatches) -> AcfParams {
    let mut params = AcfParams::default();

    if let Some(shape) = matches.get_one::<String>("shape") {
        match shape.parse::<RoiShape>() {
            Ok(shape) => params.roi_shape = shape,
            Err(e) => log::warn!("{}", e),
        }
    }

    if let Some(spacing) = matches.get_one::<String>("spacing") {
        match spacing.parse::<SpacingScheme>() {
            Ok(spacing) => params.spacing = spacing,
            Err(e) => log::warn!("{}", e),
        }
    }

    if let Some(bands) = matches.get_one::<String>("bands") {
        match bands.parse::<usize>() {
            Ok(k) => params.resolution = BandResolution::Count(k),
            Err(_) => log::warn!("Invalid band count: {}", bands),
        }
    }

    params.smooth_bandpass = matches.get_flag("smooth");
    params
}

fn main() {
    // Parse command line arguments
    let matches = build_cli().get_matches();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("Autocorrelation v{}", autocorr_lib::VERSION);
    println!("Type 'help' for available commands\n");

    let mut state = AppState::new();

    // Apply command line configuration
    if let Err(e) = state.engine.set_params(startup_params(&matches)) {
        log::warn!("Invalid parameters: {}", e);
    }

    // Load files from command line if provided
    if let Some(files) = matches.get_many::<String>("files") {
        let command = format!(
            "load {}",
            files.map(String::as_str).collect::<Vec<_>>().join(" ")
        );
        process_command(&command, &mut state);
    }

    if let Some(radius) = matches.get_one::<String>("radius") {
        match (radius.parse::<f64>(), state.engine.roi()) {
            (Ok(r), Ok(roi)) => match roi.with_radius(r) {
                Ok(roi) => {
                    state.engine.set_roi(roi);
                    println!("ROI set to {}", roi);
                }
                Err(e) => log::warn!("{}", e),
            },
            (Err(_), _) => log::warn!("Invalid radius: {}", radius),
            (_, Err(_)) => log::warn!("Load frames before setting the radius"),
        }
    }

    // Setup readline
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            log::error!("Failed to create readline: {}", e);
            process::exit(1);
        }
    };

    // Main command loop
    loop {
        let readline = rl.readline("acf> ");
        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    rl.add_history_entry(trimmed).ok();
                    process_command(trimmed, &mut state);
                }
            }
            Err(ReadlineError::Interrupted) => {
                state.engine.cancel_flag().cancel();
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                log::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_switch() {
        assert_eq!(parse_switch("ON"), Some(true));
        assert_eq!(parse_switch("0"), Some(false));
        assert_eq!(parse_switch("maybe"), None);
    }

    #[test]
    fn test_startup_params() {
        let matches = build_cli()
            .try_get_matches_from(["acf", "--spacing", "linear", "-k", "8", "--smooth"])
            .unwrap();
        let params = startup_params(&matches);
        assert_eq!(params.spacing, SpacingScheme::Linear);
        assert_eq!(params.resolution, BandResolution::Count(8));
        assert!(params.smooth_bandpass);
    }

    #[test]
    fn test_invalid_startup_values_keep_defaults() {
        let matches = build_cli()
            .try_get_matches_from(["acf", "--shape", "hexagon", "--bands", "many"])
            .unwrap();
        let params = startup_params(&matches);
        let defaults = AcfParams::default();
        assert_eq!(params.roi_shape, defaults.roi_shape);
        assert_eq!(params.resolution, defaults.resolution);
    }

    #[test]
    fn test_synthesize_kinds() {
        assert_eq!(synthesize("constant", 16, 3, 1).unwrap().len(), 3);
        assert_eq!(synthesize("speckle", 16, 3, 1).unwrap().len(), 1);
        assert!(synthesize("plasma", 16, 3, 1).is_err());
    }

    #[cfg(feature = "image")]
    #[test]
    fn test_parse_colormap() {
        assert_eq!(parse_colormap(Some(&"Diverging")), ColorMap::Diverging);
        assert_eq!(parse_colormap(None), ColorMap::Grayscale);
        assert_eq!(parse_colormap(Some(&"plasma")), ColorMap::Grayscale);
    }
}
