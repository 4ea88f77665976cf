use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ropeline::{AssetCaches, AssetLoader, JsonAsset, LoaderOptions, RopeConfig, RopelineResult};

#[derive(Parser, Debug)]
#[command(name = "ropeline", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a rope mesh and dump its buffers as JSON.
    Mesh(MeshArgs),
    /// List the frames of a sprite sheet.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
struct MeshArgs {
    /// Input rope JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JSON path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Asset root (defaults to the input file's directory).
    #[arg(long)]
    root: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Sprite sheet JSON.
    #[arg(long)]
    sheet: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Mesh(args) => cmd_mesh(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

fn cmd_mesh(args: MeshArgs) -> anyhow::Result<()> {
    let cfg = RopeConfig::from_path(&args.in_path)?;
    let opts = LoaderOptions {
        root: args.root.unwrap_or_else(|| parent_dir(&args.in_path)),
    };

    let mut loader = AssetLoader::new(opts.source());
    let mut caches = AssetCaches::new();
    let (rope, _path) = cfg.build(&mut loader, &mut caches)?;
    let json = serde_json::to_string_pretty(&rope.buffers().snapshot())
        .context("serialize buffer snapshot")?;

    match args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&out, json).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let name = args
        .sheet
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("sheet path '{}' has no file name", args.sheet.display()))?;
    let opts = LoaderOptions {
        root: parent_dir(&args.sheet),
    };

    let mut loader = AssetLoader::new(opts.source());
    let mut caches = AssetCaches::new();
    let outcome: Rc<RefCell<Option<RopelineResult<JsonAsset>>>> = Rc::new(RefCell::new(None));
    let slot = outcome.clone();
    loader.load_json(name, move |res| *slot.borrow_mut() = Some(res))?;
    loader.run_until_idle(&mut caches);

    let res = outcome
        .borrow_mut()
        .take()
        .context("sprite sheet load did not complete")?;
    let JsonAsset::SpriteSheet { frames, base, .. } = res? else {
        anyhow::bail!("'{}' is not a sprite sheet", args.sheet.display());
    };

    if let Some(size) = base.size() {
        println!("image {} {}x{}", base.source(), size.width, size.height);
    }
    for frame in frames {
        let Some(tex) = caches.textures.get(&frame) else {
            continue;
        };
        let Some(r) = tex.frame() else {
            continue;
        };
        let mut line = format!("{frame} {} {} {} {}", r.x0, r.y0, r.width(), r.height());
        if let Some(t) = tex.trim() {
            line.push_str(&format!(" trim {} {} {} {}", t.x0, t.y0, t.width(), t.height()));
        }
        println!("{line}");
    }
    Ok(())
}
