use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "storyline", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that a dataset decodes and its ages are ordered.
    Validate(InputArgs),
    /// Print the tick length of every event frame.
    Frames(PlayArgs),
    /// Play a dataset headlessly and print every frame change.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// Input dataset JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input dataset JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timer cadence in milliseconds.
    #[arg(long, default_value_t = storyline::TickRate::DEFAULT_TICK_MS)]
    tick_ms: u32,

    /// Wall time for one simulated year, in milliseconds.
    #[arg(long, default_value_t = storyline::TickRate::DEFAULT_MS_PER_YEAR)]
    ms_per_year: u32,

    /// Print the rendered widget HTML at the end.
    #[arg(long)]
    html: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn read_body(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read dataset '{}'", path.display()))
}

fn read_dataset(path: &Path) -> anyhow::Result<storyline::TimelineDataset> {
    let body = read_body(path)?;
    let ds = storyline::TimelineDataset::from_json(&body)
        .with_context(|| format!("parse dataset '{}'", path.display()))?;
    Ok(ds)
}

fn cmd_validate(args: InputArgs) -> anyhow::Result<()> {
    let ds = read_dataset(&args.in_path)?;
    ds.validate()?;
    eprintln!(
        "ok: {} ({} events, age {})",
        ds.full_name(),
        ds.events.len(),
        ds.age
    );
    Ok(())
}

fn cmd_frames(args: PlayArgs) -> anyhow::Result<()> {
    let ds = read_dataset(&args.in_path)?;
    let rate = storyline::TickRate::new(args.tick_ms, args.ms_per_year)?;
    let durations = storyline::FrameDurations::build(&ds, rate);
    for (event, ticks) in ds.events.iter().zip(durations.as_slice()) {
        println!("{:>8} ticks  age {}", ticks, event.age);
    }
    println!("{:>8} ticks  total", durations.total_ticks());
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let body = read_body(&args.in_path)?;
    let opts = storyline::TimelineOpts {
        url: args.in_path.display().to_string(),
        tick_ms: args.tick_ms,
        ms_per_year: args.ms_per_year,
    };

    let mut timeline = storyline::Timeline::new(
        opts,
        storyline::MemorySurface::new(),
        storyline::ManualTimer::new(),
        storyline::QueuedTransport::new(),
    )?;
    timeline.render(None)?;

    let (request, _) = timeline
        .transport_mut()
        .next_pending()
        .context("timeline did not request its dataset")?;
    timeline.dispatch(storyline::HostEvent::Loaded {
        request,
        body: Ok(body),
    });
    if timeline.dataset().is_none() {
        anyhow::bail!("dataset '{}' could not be loaded", args.in_path.display());
    }

    timeline.play();
    let mut ticks = 0u64;
    let mut shown = timeline.renderer().active_frame();
    print_frame(&timeline, ticks);

    while let Some(id) = timeline.timer_id() {
        timeline.dispatch(storyline::HostEvent::Tick(id));
        ticks += 1;
        let active = timeline.renderer().active_frame();
        if active != shown {
            shown = active;
            print_frame(&timeline, ticks);
        }
    }

    eprintln!(
        "{:?} after {} ticks ({} ms)",
        timeline.state(),
        ticks,
        ticks * u64::from(args.tick_ms)
    );
    if args.html
        && let Some(m) = timeline.renderer().mounted()
    {
        println!("{}", timeline.surface().outer_html(m.root));
    }
    Ok(())
}

type HeadlessTimeline =
    storyline::Timeline<storyline::MemorySurface, storyline::ManualTimer, storyline::QueuedTransport>;

fn print_frame(timeline: &HeadlessTimeline, ticks: u64) {
    let Some(index) = timeline.renderer().active_frame() else {
        return;
    };
    let Some(&node) = timeline.renderer().frame_nodes().get(index) else {
        return;
    };
    println!("[{ticks:>6}] {}", timeline.surface().inner_html(node));
}
