//! Load a `.vrma` file and print its tracks
//!
//! Run with: cargo run --example load_clip -- path/to/clip.vrma

use vrma_loader::{AsyncSpawner, FileFetcher, MockSpawner, VrmaLoader};

fn main() -> anyhow::Result<()> {
    let Some(path) = std::env::args().nth(1) else {
        println!("usage: load_clip <file.vrma>");
        return Ok(());
    };

    println!("vrma_loader v{}", vrma_loader::VERSION);

    let loader = VrmaLoader::new(FileFetcher::new());
    let result = MockSpawner::blocking()
        .block_on(loader.load_async(&path, None))
        .ok_or_else(|| anyhow::anyhow!("spawner did not run the load"))??;

    let Some(clip) = result.clip else {
        println!("{path} contains no animation");
        return Ok(());
    };

    println!("Clip '{}' ({:.3}s, {} tracks)", clip.name, clip.duration, clip.tracks.len());
    for track in &clip.tracks {
        println!("  {:<40} {:>10} x{}", track.name, track.kind().type_name(), track.len());
    }
    Ok(())
}
