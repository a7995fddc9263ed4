use astar_pool::grid::{Grid, Point, WallConfig, grid_rng, manhattan, random_endpoints};
use astar_pool::{CancelToken, SearchConfig, SearchError, SearchResult, StepSnapshot, Stepper, search};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "astar-pool")]
#[command(about = "astar-pool - concurrent A* over a generated grid")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the search to completion and print the path
    Run {
        #[command(flatten)]
        grid: GridArgs,
        /// Print the grid with the path drawn on it
        #[arg(long)]
        draw: bool,
    },
    /// Step the search and print one JSON snapshot per line
    Step {
        #[command(flatten)]
        grid: GridArgs,
        /// Stop after this many snapshots even if the search is not done
        #[arg(long)]
        max_steps: Option<usize>,
    },
}

#[derive(Args)]
struct GridArgs {
    /// Grid width in cells
    #[arg(long, default_value = "40")]
    width: i32,
    /// Grid height in cells
    #[arg(long, default_value = "24")]
    height: i32,
    /// Number of random-walk wall clusters
    #[arg(long, default_value = "8")]
    clusters: usize,
    /// Cells visited per random walk
    #[arg(long, default_value = "200")]
    walk_steps: usize,
    /// Probability of placing a wall on a visited cell
    #[arg(long, default_value = "0.25")]
    density: f64,
    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,
    /// Start cell as x,y (random if omitted)
    #[arg(long, value_parser = parse_point)]
    start: Option<Point>,
    /// Goal cell as x,y (random if omitted)
    #[arg(long, value_parser = parse_point)]
    goal: Option<Point>,
    /// Number of worker threads (defaults to available parallelism)
    #[arg(long, short = 'j')]
    workers: Option<usize>,
    /// Cancel the search after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in '{}': {}", s, e))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in '{}': {}", s, e))?;
    Ok((x, y))
}

// --- Scenario setup ---

struct Scenario {
    grid: Grid,
    start: Point,
    goal: Point,
    config: SearchConfig,
}

impl GridArgs {
    fn scenario(&self) -> Result<Scenario, Box<dyn std::error::Error>> {
        if self.width < 2 || self.height < 1 {
            return Err(format!("grid {}x{} is too small", self.width, self.height).into());
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(format!("density {} is outside [0, 1]", self.density).into());
        }

        let mut rng = grid_rng(self.seed);
        let (random_start, random_goal) = random_endpoints(self.width, self.height, &mut rng)
            .ok_or("grid needs at least two cells")?;
        let start = self.start.unwrap_or(random_start);
        let goal = self.goal.unwrap_or(random_goal);

        let walls = WallConfig::default()
            .with_clusters(self.clusters)
            .with_steps(self.walk_steps)
            .with_density(self.density);
        let grid = Grid::random(self.width, self.height, &walls, start, goal, &mut rng);
        for p in [start, goal] {
            if !grid.contains(&p) {
                return Err(format!("{:?} is outside the {}x{} grid", p, self.width, self.height).into());
            }
        }

        let cancel = CancelToken::new();
        if let Some(ms) = self.timeout_ms {
            let timer = cancel.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(ms));
                timer.cancel();
            });
        }
        let config = SearchConfig::default()
            .with_workers_option(self.workers)
            .with_cancel(cancel);

        Ok(Scenario {
            grid,
            start,
            goal,
            config,
        })
    }
}

// --- Snapshot rendering ---

#[derive(Serialize)]
struct SnapshotJson {
    step: usize,
    w: i32,
    h: i32,
    walls: Vec<Point>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    open: Vec<Point>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    closed: Vec<Point>,
    current: Option<Point>,
    start: Point,
    goal: Point,
    done: bool,
    found: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    path: Vec<Point>,
}

impl SnapshotJson {
    fn new(scenario: &Scenario, snapshot: StepSnapshot<Point>) -> Self {
        Self {
            step: snapshot.step_index,
            w: scenario.grid.width,
            h: scenario.grid.height,
            walls: scenario.grid.walls().iter().copied().collect(),
            open: snapshot.open.into_iter().collect(),
            closed: snapshot.closed.into_iter().collect(),
            current: snapshot.current,
            start: scenario.start,
            goal: scenario.goal,
            done: snapshot.done,
            found: snapshot.found,
            path: snapshot.path,
        }
    }
}

// --- Commands ---

fn run(args: &GridArgs, draw: bool) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = args.scenario()?;
    println!(
        "Searching {}x{} grid from {:?} to {:?} ({} walls, {} workers)",
        scenario.grid.width,
        scenario.grid.height,
        scenario.start,
        scenario.goal,
        scenario.grid.walls().len(),
        scenario.config.num_workers
    );

    let result = match search(
        &scenario.grid,
        scenario.start,
        scenario.goal,
        manhattan,
        &scenario.config,
    ) {
        Ok(result) => result,
        Err(SearchError::NotFound { expanded_nodes }) => SearchResult::not_found(expanded_nodes),
        Err(err) => return Err(err.into()),
    };

    print!("{}", result);
    if result.found {
        print!("{}", result.statistics.format_summary());
    }
    if draw {
        println!();
        print!("{}", scenario.grid.render(&result.path));
    }
    Ok(())
}

fn step(args: &GridArgs, max_steps: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = args.scenario()?;
    let mut stepper = Stepper::new(
        scenario.grid.clone(),
        scenario.start,
        scenario.goal,
        manhattan,
        &scenario.config,
    )?;

    let mut emitted = 0;
    loop {
        let snapshot = stepper.step()?;
        let done = snapshot.done;
        println!("{}", serde_json::to_string(&SnapshotJson::new(&scenario, snapshot))?);
        emitted += 1;
        if done || max_steps.is_some_and(|max| emitted >= max) {
            break;
        }
    }
    stepper.close();
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let outcome = match &cli.command {
        Commands::Run { grid, draw } => run(grid, *draw),
        Commands::Step { grid, max_steps } => step(grid, *max_steps),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
