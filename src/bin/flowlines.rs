use std::{
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
    rc::Rc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "flowlines", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a scene file and report what it contains.
    Validate(ValidateArgs),
    /// Print the computed connectors of a scene as JSON.
    Paths(PathsArgs),
    /// Write an SVG or PNG snapshot of a scene at a given reveal step.
    Snapshot(SnapshotArgs),
}

#[derive(Args, Debug)]
struct SceneArg {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the canvas width.
    #[arg(long)]
    width: Option<f64>,

    /// Override the canvas height.
    #[arg(long)]
    height: Option<f64>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Args, Debug)]
struct PathsArgs {
    #[command(flatten)]
    scene: SceneArg,

    /// Print the full render frame (clock, activity flags) instead of the connector list.
    #[arg(long)]
    frame: bool,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    #[command(flatten)]
    scene: SceneArg,

    /// Reveal step to show (0-based).
    #[arg(long, default_value_t = 0)]
    step: u32,

    /// Output path; `.png` rasterizes, anything else is written as SVG.
    #[arg(long)]
    out: PathBuf,

    /// Raster scale for PNG output.
    #[arg(long, default_value_t = 1.0)]
    scale: f32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Paths(args) => cmd_paths(args),
        Command::Snapshot(args) => cmd_snapshot(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_scene(path: &Path) -> anyhow::Result<flowlines::Scene> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let scene: flowlines::Scene = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse scene JSON '{}'", path.display()))?;
    Ok(scene)
}

fn mount(arg: &SceneArg) -> anyhow::Result<flowlines::MountedScene> {
    let mut scene = read_scene(&arg.in_path)?;
    if let Some(w) = arg.width {
        scene.width = w;
    }
    if let Some(h) = arg.height {
        scene.height = h;
    }
    let host = Rc::new(flowlines::HeadlessHost::new());
    let mounted = scene
        .mount(host)
        .with_context(|| format!("mount scene '{}'", arg.in_path.display()))?;
    Ok(mounted)
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;
    scene.validate()?;
    let nodes: usize = scene.layout.rows.iter().map(Vec::len).sum();
    println!(
        "ok: {} connectors, {} nodes, {} steps",
        scene.diagram.connectors.len(),
        nodes,
        scene.diagram.timeline.total_steps
    );
    Ok(())
}

fn cmd_paths(args: PathsArgs) -> anyhow::Result<()> {
    let mounted = mount(&args.scene)?;
    let diagram = mounted.diagram();
    let json = if args.frame {
        serde_json::to_string_pretty(&diagram.frame())?
    } else {
        serde_json::to_string_pretty(&*diagram.computed_connectors())?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("write connectors")?;
    Ok(())
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let mounted = mount(&args.scene)?;
    let timeline = mounted.diagram().sequencer().config();
    if args.step >= timeline.total_steps {
        anyhow::bail!(
            "step {} is outside the {}-step timeline",
            args.step,
            timeline.total_steps
        );
    }
    let elapsed = Duration::try_from_secs_f64(f64::from(args.step) * timeline.step_interval_secs)
        .with_context(|| format!("time to reach step {}", args.step))?;
    mounted.host().advance(elapsed);

    let container = mounted.container();
    let svg = flowlines::render_svg(
        &mounted.diagram().frame(),
        &mounted.node_boxes(),
        container.width(),
        container.height(),
        &flowlines::SvgStyle::default(),
    );

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let is_png = args
        .out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        let img = flowlines::rasterize_svg(&svg, args.scale)?;
        image::save_buffer_with_format(
            &args.out,
            &img.data,
            img.width,
            img.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    } else {
        std::fs::write(&args.out, svg)
            .with_context(|| format!("write svg '{}'", args.out.display()))?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
