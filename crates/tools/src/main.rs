use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use catalog::{FileScalarSlot, FileSceneStore, MapCache};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect sandbox scenes and manage a local scene cache")]
struct Args {
    /// Directory backing the scene cache
    #[arg(long, default_value = ".sandbox-cache")]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print bounds, lane and boundary statistics for a scene JSON file
    Inspect { file: PathBuf },

    /// Replay a JSON-lines event log through a headless viewer
    Replay {
        file: PathBuf,

        /// Restore from and write to the cache directory instead of a scratch cache
        #[arg(long)]
        use_cache: bool,
    },

    /// Manage cached scenes
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Store a scene JSON file under its name
    Put {
        file: PathBuf,

        /// Override the scene name stored in the file
        #[arg(long)]
        name: Option<String>,
    },
    /// Write a cached scene as JSON to stdout or a file
    Get {
        name: String,

        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List cached scene names
    List,
    /// Remove every cached scene
    Clear,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), String> {
    match args.command {
        Command::Inspect { file } => cmd_inspect(&file),
        Command::Replay { file, use_cache } => cmd_replay(&file, use_cache, &args.cache_dir),
        Command::Cache { action } => cmd_cache(action, &args.cache_dir),
    }
}

fn read_scene(path: &Path) -> Result<scene::SceneData, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    tools::parse_scene(&raw)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let s = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{s}");
    Ok(())
}

fn file_cache(dir: &Path) -> MapCache<FileSceneStore, FileScalarSlot> {
    MapCache::new(FileSceneStore::new(dir), FileScalarSlot::in_dir(dir))
}

fn cmd_inspect(file: &Path) -> Result<(), String> {
    let scene = read_scene(file)?;
    print_json(&tools::summarize(&scene))
}

fn cmd_replay(file: &Path, use_cache: bool, cache_dir: &Path) -> Result<(), String> {
    let f = fs::File::open(file).map_err(|e| format!("open {file:?}: {e}"))?;
    let reader = BufReader::new(f);
    let summary = if use_cache {
        tools::replay(reader, file_cache(cache_dir))?
    } else {
        tools::replay(
            reader,
            MapCache::new(catalog::InMemorySceneStore::new(), catalog::InMemorySlot::new()),
        )?
    };
    print_json(&summary)
}

fn cmd_cache(action: CacheAction, dir: &Path) -> Result<(), String> {
    let cache = file_cache(dir);
    pollster::block_on(async {
        match action {
            CacheAction::Put { file, name } => {
                let mut scene = read_scene(&file)?;
                if let Some(name) = name {
                    scene.name = name;
                }
                if scene.name.is_empty() {
                    return Err("scene has no name; pass --name".to_string());
                }
                cache.put(&scene).await.map_err(|e| e.to_string())?;
                cache.remember_last_scene(&scene.name);
                info!(scene = %scene.name, dir = ?dir, "scene cached");
                Ok(())
            }
            CacheAction::Get { name, out } => {
                let scene = cache.get(&name).await.map_err(|e| format!("{name}: {e}"))?;
                match out {
                    Some(path) => {
                        let s = serde_json::to_string(&scene).map_err(|e| e.to_string())?;
                        fs::write(&path, s).map_err(|e| format!("write {path:?}: {e}"))
                    }
                    None => print_json(&scene),
                }
            }
            CacheAction::List => {
                let last = cache.last_scene_name();
                for name in cache.names().await.map_err(|e| e.to_string())? {
                    let marker = if last.as_deref() == Some(name.as_str()) { "*" } else { " " };
                    println!("{marker} {name}");
                }
                Ok(())
            }
            CacheAction::Clear => cache.clear().await.map_err(|e| e.to_string()),
        }
    })
}
