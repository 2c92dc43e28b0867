use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::{App, Arg};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use slabfit_algorithms::segmentation::{extract_slabs, extract_slabs_with_rng, RansacParams};
use slabfit_core::containers::PointCloud;
use slabfit_io::xyz::{XyzReader, XyzWriter};

struct Args {
    pub input_file: PathBuf,
    pub output_file: Option<PathBuf>,
    pub num_planes: usize,
    pub params: RansacParams,
    pub seed: Option<u64>,
}

fn get_args() -> Result<Args> {
    let matches = App::new("extract_planes")
        .version("0.1")
        .about("Fits planar slabs to a point cloud file using RANSAC")
        .arg(
            Arg::with_name("INPUT")
                .short("i")
                .takes_value(true)
                .value_name("INPUT")
                .help("Input point cloud file (xyz format)")
                .required(true),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .short("o")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Write the points not claimed by any plane to this file"),
        )
        .arg(
            Arg::with_name("NUM_PLANES")
                .short("n")
                .long("num-planes")
                .takes_value(true)
                .default_value("5")
                .help("Maximum number of planes to extract"),
        )
        .arg(
            Arg::with_name("ITERATIONS")
                .long("iterations")
                .takes_value(true)
                .default_value("1000")
                .help("Number of RANSAC iterations per plane"),
        )
        .arg(
            Arg::with_name("THICKNESS")
                .short("t")
                .long("thickness")
                .takes_value(true)
                .default_value("0.01")
                .help("Total slab thickness; inliers lie within half of this distance of the plane"),
        )
        .arg(
            Arg::with_name("MIN_POINTS")
                .short("m")
                .long("min-points")
                .takes_value(true)
                .default_value("50")
                .help("A plane is only accepted with strictly more inliers than this"),
        )
        .arg(
            Arg::with_name("SEED")
                .long("seed")
                .takes_value(true)
                .help("Seed for the random number generator, for reproducible runs"),
        )
        .get_matches();

    let input_file = PathBuf::from(matches.value_of("INPUT").unwrap());
    let output_file = matches.value_of("OUTPUT").map(PathBuf::from);
    let num_planes = matches
        .value_of("NUM_PLANES")
        .unwrap()
        .parse()
        .context("Invalid number of planes")?;
    let num_iterations = matches
        .value_of("ITERATIONS")
        .unwrap()
        .parse()
        .context("Invalid number of iterations")?;
    let thickness: f64 = matches
        .value_of("THICKNESS")
        .unwrap()
        .parse()
        .context("Invalid thickness")?;
    let min_inliers = matches
        .value_of("MIN_POINTS")
        .unwrap()
        .parse()
        .context("Invalid minimum number of points")?;
    let seed = matches
        .value_of("SEED")
        .map(|seed| seed.parse().context("Invalid seed"))
        .transpose()?;

    Ok(Args {
        input_file,
        output_file,
        num_planes,
        params: RansacParams {
            num_iterations,
            thickness,
            min_inliers,
        },
        seed,
    })
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = get_args()?;

    let cloud = XyzReader::from_path(&args.input_file)?.read_cloud()?;
    info!(
        "Loaded {} points from {}",
        cloud.len(),
        args.input_file.display()
    );
    if let Some(bounds) = cloud.bounds() {
        info!("Bounds: {:?} to {:?}", bounds.min(), bounds.max());
    }

    let t_start = Instant::now();
    let slabs = match args.seed {
        Some(seed) => extract_slabs_with_rng(
            &cloud,
            args.num_planes,
            &args.params,
            &mut StdRng::seed_from_u64(seed),
        ),
        None => extract_slabs(&cloud, args.num_planes, &args.params),
    };
    info!(
        "Found {} plane(s) in {:.3}s",
        slabs.len(),
        t_start.elapsed().as_secs_f64()
    );

    for (index, estimate) in slabs.iter().enumerate() {
        let normal = estimate.slab.plane().normal();
        println!(
            "plane {}: {} inliers, normal ({:.4} {:.4} {:.4}), offset {:.4}",
            index,
            estimate.inlier_count(),
            normal.x,
            normal.y,
            normal.z,
            estimate.slab.plane().offset()
        );
    }

    if let Some(output_file) = &args.output_file {
        let mut claimed = vec![false; cloud.len()];
        for estimate in &slabs {
            for &index in &estimate.inliers {
                claimed[index] = true;
            }
        }
        let remaining: Vec<_> = cloud
            .points()
            .iter()
            .enumerate()
            .filter(|(index, _)| !claimed[*index])
            .map(|(_, point)| *point)
            .collect();
        let remaining_cloud = PointCloud::from_points(remaining);
        XyzWriter::from_path(output_file)?.write_cloud(&remaining_cloud)?;
        info!(
            "Wrote {} unclaimed point(s) to {}",
            remaining_cloud.len(),
            output_file.display()
        );
    }

    Ok(())
}
