mod logger;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::LevelFilter;
use logger::AppLogger;
use std::path::{Path, PathBuf};
use tcg_async_runtime::{SessionHandle, SessionUpdate, spawn_session};
use tcg_layout::constants::SLOT_COUNT;
use tcg_layout::{CropRequest, ExportReport, LayoutMode, LayoutOptions, LibraryIndex, PixelRect};
use tokio::sync::mpsc::UnboundedReceiver;

const LOG_CAPACITY: usize = 500;

#[derive(Parser)]
#[command(name = "tcgl", about = "Lay out trading cards on an A4 sheet", version)]
struct Cli {
    /// Card images, placed into the free slots in row-major order
    images: Vec<PathBuf>,

    /// Place an image in a specific slot (0-8, row-major)
    #[arg(long = "slot", value_name = "N=FILE", value_parser = parse_slot)]
    slots: Vec<(usize, PathBuf)>,

    /// Leave a 5mm gap between cards
    #[arg(long)]
    spacing: bool,

    /// Draw crop marks at every card corner
    #[arg(long)]
    crop_marks: bool,

    /// Print only the first card, centered on the page
    #[arg(long)]
    single: bool,

    /// Crop every image to a card-shaped window inside this pixel region,
    /// given before zoom is applied
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_crop)]
    crop: Option<PixelRect>,

    /// Zoom into the crop region (1.0 to 3.0), shrinking it about its center
    #[arg(long, default_value = "1.0", requires = "crop")]
    zoom: f32,

    /// Rotate clockwise by this many degrees before cropping
    #[arg(long, default_value = "0", requires = "crop", allow_negative_numbers = true)]
    rotate: f32,

    /// Output PDF file (defaults to tcg-layout.pdf, or tcg-cards.pdf with --single)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Echo the log to stderr (-v warnings and info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl From<&Cli> for LayoutOptions {
    fn from(cli: &Cli) -> Self {
        LayoutOptions::new(cli.spacing, cli.crop_marks)
    }
}

impl From<&Cli> for LayoutMode {
    fn from(cli: &Cli) -> Self {
        if cli.single {
            LayoutMode::SingleCard
        } else {
            LayoutMode::Grid
        }
    }
}

impl Cli {
    fn crop_request(&self) -> Option<CropRequest> {
        self.crop.map(|region| {
            CropRequest::new(region)
                .with_zoom(self.zoom)
                .with_rotation(self.rotate)
        })
    }

    /// Skipped cards are listed after the export unless the log already showed them
    fn lists_warnings_at_end(&self) -> bool {
        self.log_level() < LevelFilter::Warn
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }

    /// Pair every image with its slot: explicit slots first, then the rest in order
    fn placements(&self) -> Result<Vec<(usize, PathBuf)>> {
        let mut taken = [false; SLOT_COUNT];
        let mut placements = Vec::new();

        for (slot, path) in &self.slots {
            if let Some(seen) = taken.get_mut(*slot) {
                if *seen {
                    bail!("slot {} given more than once", slot);
                }
                *seen = true;
            }
            placements.push((*slot, path.clone()));
        }

        let mut free = (0..SLOT_COUNT).filter(|slot| !taken[*slot]);
        for path in &self.images {
            let Some(slot) = free.next() else {
                bail!("more than {} cards given", SLOT_COUNT);
            };
            placements.push((slot, path.clone()));
        }

        Ok(placements)
    }
}

fn parse_slot(s: &str) -> std::result::Result<(usize, PathBuf), String> {
    let (slot, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected N=FILE, got '{s}'"))?;
    let slot = slot
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad slot number '{slot}': {e}"))?;
    if path.is_empty() {
        return Err(format!("missing file for slot {slot}"));
    }
    Ok((slot, PathBuf::from(path)))
}

fn parse_crop(s: &str) -> std::result::Result<PixelRect, String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("bad crop region '{s}': {e}"))?;
    match values.as_slice() {
        &[x, y, width, height] => Ok(PixelRect::new(x, y, width, height)),
        _ => Err(format!("expected X,Y,W,H, got '{s}'")),
    }
}

async fn next_update(updates: &mut UnboundedReceiver<SessionUpdate>) -> Result<SessionUpdate> {
    updates.recv().await.context("session worker stopped")
}

/// Get an image into the session library, cropping it first if asked
async fn add_card(
    handle: &SessionHandle,
    updates: &mut UnboundedReceiver<SessionUpdate>,
    path: &Path,
    crop: Option<CropRequest>,
) -> Result<LibraryIndex> {
    match crop {
        None => handle.load_image(path)?,
        Some(request) => {
            let payload = tcg_layout::load_image(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let cropped =
                tokio::task::spawn_blocking(move || tcg_layout::crop_to_card(&payload, &request))
                    .await?
                    .with_context(|| format!("cropping {}", path.display()))?;
            handle.add_image(cropped)?;
        }
    }

    match next_update(updates).await? {
        SessionUpdate::ImageAdded { index } => Ok(index),
        SessionUpdate::Error { message } => bail!(message),
        other => bail!("unexpected update {:?}", other),
    }
}

async fn assign(
    handle: &SessionHandle,
    updates: &mut UnboundedReceiver<SessionUpdate>,
    slot: usize,
    library_index: LibraryIndex,
) -> Result<()> {
    handle.assign(slot, library_index)?;
    match next_update(updates).await? {
        SessionUpdate::SlotChanged { .. } => Ok(()),
        SessionUpdate::Error { message } => bail!(message),
        other => bail!("unexpected update {:?}", other),
    }
}

/// Run an export to completion, cancelling between cards on Ctrl-C
async fn export(
    handle: &SessionHandle,
    updates: &mut UnboundedReceiver<SessionUpdate>,
    options: LayoutOptions,
    mode: LayoutMode,
    output: &Path,
) -> Result<ExportReport> {
    let cancel = handle.export(options, mode, output)?;

    loop {
        tokio::select! {
            update = next_update(updates) => match update? {
                SessionUpdate::Progress { operation, current, total } => {
                    println!("[{current}/{total}] {operation}");
                }
                // Skipped cards are reported from the log
                SessionUpdate::Warning { .. } => {}
                SessionUpdate::ExportComplete { report, .. } => return Ok(report),
                SessionUpdate::Error { message } => bail!(message),
                _ => {}
            },
            _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                eprintln!("Cancelling after the current card...");
                cancel.cancel();
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logger = AppLogger::new(LOG_CAPACITY, cli.log_level());
    logger.clone().init()?;

    let placements = cli.placements()?;
    let crop = cli.crop_request();
    let options = LayoutOptions::from(&cli);
    let mode = LayoutMode::from(&cli);
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(mode.default_filename()));

    let (handle, mut updates) = spawn_session();

    for (slot, path) in &placements {
        let index = add_card(&handle, &mut updates, path, crop).await?;
        assign(&handle, &mut updates, *slot, index).await?;
        log::info!("Slot {} ← {}", slot, path.display());
    }

    let report = export(&handle, &mut updates, options, mode, &output).await?;

    println!(
        "Placed {} cards ({} crop mark lines) → {}",
        report.cards_placed,
        report.line_segments,
        output.display()
    );
    let warnings = logger.warnings();
    if cli.lists_warnings_at_end() && !warnings.is_empty() {
        println!("{} warning(s) during export:", warnings.len());
        for entry in &warnings {
            println!("  {}", entry.message);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slot() {
        assert_eq!(
            parse_slot("4=cards/dragon.png").unwrap(),
            (4, PathBuf::from("cards/dragon.png"))
        );
        assert!(parse_slot("dragon.png").is_err());
        assert!(parse_slot("x=dragon.png").is_err());
        assert!(parse_slot("3=").is_err());
    }

    #[test]
    fn test_parse_crop() {
        assert_eq!(
            parse_crop("10, 20,630,880").unwrap(),
            PixelRect::new(10, 20, 630, 880)
        );
        assert!(parse_crop("10,20,630").is_err());
        assert!(parse_crop("10,20,-1,880").is_err());
    }

    #[test]
    fn test_placements_fill_free_slots() {
        let cli = Cli::parse_from(["tcgl", "a.png", "b.png", "--slot", "0=c.png"]);
        let slots: Vec<usize> = cli.placements().unwrap().iter().map(|p| p.0).collect();
        assert_eq!(slots, vec![0, 1, 2]);
    }

    #[test]
    fn test_placements_reject_duplicates_and_overflow() {
        let cli = Cli::parse_from(["tcgl", "--slot", "2=a.png", "--slot", "2=b.png"]);
        assert!(cli.placements().is_err());

        let mut args = vec!["tcgl".to_string()];
        args.extend((0..10).map(|i| format!("{i}.png")));
        let cli = Cli::parse_from(args);
        assert!(cli.placements().is_err());
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::parse_from(["tcgl", "--spacing", "--single", "a.png"]);
        assert_eq!(LayoutOptions::from(&cli), LayoutOptions::new(true, false));
        assert_eq!(LayoutMode::from(&cli), LayoutMode::SingleCard);
        assert_eq!(cli.log_level(), LevelFilter::Error);
    }

    #[test]
    fn test_crop_help_describes_zoom_order() {
        use clap::CommandFactory;

        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("given before zoom is applied"), "{}", help);
        assert!(help.contains("shrinking it about its center"), "{}", help);
    }

    #[test]
    fn test_skipped_cards_reported_once() {
        let quiet = Cli::parse_from(["tcgl", "a.png"]);
        assert!(quiet.lists_warnings_at_end());

        let verbose = Cli::parse_from(["tcgl", "-v", "a.png"]);
        assert_eq!(verbose.log_level(), LevelFilter::Info);
        assert!(!verbose.lists_warnings_at_end());
    }

    #[test]
    fn test_zoom_needs_crop() {
        assert!(Cli::try_parse_from(["tcgl", "--zoom", "2", "a.png"]).is_err());
        let cli = Cli::try_parse_from(["tcgl", "--crop", "0,0,10,10", "--rotate", "-90", "a.png"])
            .unwrap();
        assert_eq!(cli.crop_request().unwrap().rotation_degrees, -90.0);
    }
}
