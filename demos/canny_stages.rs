use std::{env, error::Error, fs, path::Path, time::Instant};

use canny_stages::{CannyParams, CannyPipeline};
use env_logger::Builder;
use image::open;
use log::info;

fn main() -> Result<(), Box<dyn Error>> {
    Builder::from_default_env().format_timestamp_nanos().init();

    let input = env::args()
        .nth(1)
        .unwrap_or_else(|| "test_image/edge.png".to_string());
    let img = open(&input)?.to_luma8();
    info!("Loading image: {} ({}x{})", input, img.width(), img.height());

    let sigmas = [1.5, 2.5, 3.5];
    let params = CannyParams::new(1.5, 0.1, 0.3);

    let start = Instant::now();
    let runs = CannyPipeline::sweep(&img, &sigmas, params)?;
    info!("Swept {} sigmas in {:?}", runs.len(), start.elapsed());

    for run in &runs {
        let dir = Path::new("images").join(run.params().sigma.to_string());
        fs::create_dir_all(&dir)?;
        for (stage, _) in run.artifacts() {
            let path = dir.join(format!("{}.png", stage.file_stem()));
            run.artifact_luma8(stage).save(&path)?;
            info!("{:>28} -> {}", stage.label(), path.display());
        }
        info!(
            "sigma {}: kernel {:?}, {} edge pixels, saved to {}",
            run.params().sigma,
            run.kernel().weights(),
            run.edge_points().len(),
            dir.display()
        );
    }

    Ok(())
}
