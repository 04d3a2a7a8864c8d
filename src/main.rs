mod apps;
mod hal;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use hal::{Hal, TouchDriver};
use launcher::{AppLauncher, LauncherConfig};
use serde::Serialize;
use shell::{LifecycleManager, LifecycleSnapshot, LockStats, TouchState};
use std::{
	path::PathBuf,
	time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
	/// JSON file with launcher layout overrides.
	#[clap(short, long)]
	config: Option<PathBuf>,
	#[clap(long)]
	page_gap: Option<f32>,
	/// Scheduler tick.
	#[clap(long, default_value_t = 10)]
	tick_ms: u64,
	/// Longest wait for the render or input lock before giving up.
	#[clap(long, default_value_t = 30_000)]
	lock_timeout_ms: u64,
	/// Stop after this long instead of running until interrupted.
	#[clap(long)]
	run_for_ms: Option<u64>,
	/// Print the final shell state as JSON on exit.
	#[clap(long)]
	dump_state: bool,
	/// Don't replay the demo touch script.
	#[clap(long)]
	no_touch_script: bool,
}

#[derive(Debug, Serialize)]
struct StateDump {
	lifecycle: LifecycleSnapshot,
	touch: TouchState,
	exclusive: bool,
	render_lock: LockStats,
}

fn load_config(args: &Args) -> Result<LauncherConfig> {
	let mut config = match &args.config {
		Some(path) => {
			let text = std::fs::read_to_string(path)
				.wrap_err_with(|| format!("reading config {}", path.display()))?;
			serde_json::from_str(&text).wrap_err_with(|| format!("parsing config {}", path.display()))?
		}
		None => LauncherConfig::default(),
	};
	if let Some(page_gap) = args.page_gap {
		config.page_gap = page_gap;
	}
	Ok(config)
}

async fn run(
	hal: &mut Hal,
	shell: &mut LifecycleManager,
	mut touch: Option<TouchDriver>,
	tick: Duration,
	run_for: Option<Duration>,
) -> Result<()> {
	let started = Instant::now();
	let mut interval = tokio::time::interval(tick);
	interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
	loop {
		interval.tick().await;
		if let Some(touch) = &mut touch {
			touch.check()?;
		}
		hal.render_frame()?;
		hal.feed_the_dog();
		shell.update()?;

		if run_for.is_some_and(|limit| started.elapsed() >= limit) {
			info!(elapsed = ?started.elapsed(), "run time reached");
			return Ok(());
		}
	}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.compact()
		.with_env_filter(EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info")))
		.init();
	color_eyre::install()?;
	let args = Args::parse();
	let config = load_config(&args)?;

	let mut hal = Hal::new(
		config.screen_width,
		config.screen_height,
		Duration::from_millis(args.lock_timeout_ms),
	);
	let mut shell = LifecycleManager::new(hal.services());
	shell.install_home(Box::new(AppLauncher::new(config)))?;
	shell.install(Box::<apps::Dummy>::default())?;
	shell.install(Box::<apps::AiAgent>::default())?;
	shell.install(Box::<apps::Sentinel>::default())?;
	shell.install(Box::<apps::Dummy>::default())?;
	shell.install(Box::<apps::Dummy>::default())?;

	let touch = if args.no_touch_script {
		None
	} else {
		Some(hal.spawn_touch_driver(hal::demo_script())?)
	};

	let run_for = args.run_for_ms.map(Duration::from_millis);
	tokio::select! {
		_ = tokio::signal::ctrl_c() => info!("interrupted"),
		result = run(&mut hal, &mut shell, touch, Duration::from_millis(args.tick_ms.max(1)), run_for) => result?,
	}

	if args.dump_state {
		let dump = StateDump {
			lifecycle: shell.snapshot(),
			touch: hal.input().sample()?,
			exclusive: hal.input().is_exclusive_mode()?,
			render_lock: hal.scene().stats(),
		};
		println!("{}", serde_json::to_string_pretty(&dump)?);
	}
	Ok(())
}
