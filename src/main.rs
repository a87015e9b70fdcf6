use std::{env::args, process::ExitCode};
use gex_tool::{load_level, Catalog, DecodeContext, InstanceKind, Scene, SpriteSet};
use log::error;

const USAGE: &str = "usage: gex_tool <map.dfx> [sprite dir] [catalog.json]";

fn print_scene(scene: &Scene, catalog: &Catalog) {
	println!("{}", scene.name);
	println!("data offset {:#x}, atlas {1}x{1}", scene.base_data_offset, scene.atlas.side());
	println!("pickups: {}", scene.pickup_names.join(", "));
	for model in &scene.models {
		let billboard = if catalog.is_billboard(&model.name) { " billboard" } else { "" };
		println!(
			"{:#010x} {:<12} {:>5} vertices {:>5} polygons {:>3} instances{}",
			model.address, model.name, model.vertices.len(), model.polygons.len(), model.instances.len(), billboard,
		);
		for instance in &model.instances {
			if let InstanceKind::Platform { path: Some(path) } = instance.kind {
				println!("    {:#x} follows path {:#x}", instance.address, path);
			}
		}
	}
	for path in &scene.paths {
		println!("path {:#x}: {} points, {} rotations", path.address, path.points.len(), path.rotations.len());
	}
	for miss in &scene.lookup_misses {
		println!("miss: {}", miss);
	}
}

fn run(args: &[String]) -> gex_tool::Result<()> {
	let catalog = match args.get(2) {
		Some(path) => Catalog::from_path(path)?,
		None => Catalog::builtin(),
	};
	let sprites = match args.get(1) {
		Some(dir) => SpriteSet::load(dir)?,
		None => SpriteSet::empty(),
	};
	let ctx = DecodeContext::new(catalog, sprites);
	let scene = load_level(&args[0], &ctx)?;
	print_scene(&scene, &ctx.catalog);
	Ok(())
}

fn main() -> ExitCode {
	env_logger::init();
	let args = args().skip(1).collect::<Vec<_>>();
	if args.is_empty() || args.len() > 3 {
		eprintln!("{}", USAGE);
		return ExitCode::FAILURE;
	}
	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("{}", e);
			eprintln!("{}", e);
			ExitCode::FAILURE
		},
	}
}
